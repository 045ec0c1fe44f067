use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::CompressorConfig;
use crate::dsp::{Compressor, Stage};
use crate::params::CompressorParams;

/// How the channels of a bank share gain reduction.
#[derive(ValueEnum, Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChannelMode {
    /// Every channel has its own envelope.
    #[default]
    Independent,
    /// One envelope keyed by the loudest channel of each frame; every channel
    /// receives the same gain, preserving the stereo image.
    Linked,
}

impl std::fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Independent => write!(f, "independent"),
            Self::Linked => write!(f, "linked"),
        }
    }
}

/// A set of compressors, one per channel, driven with the same parameters.
///
/// In [`ChannelMode::Linked`] only the first compressor's envelope is used.
#[derive(Clone, Debug)]
pub struct CompressorBank {
    channels: Vec<Compressor>,
    mode: ChannelMode,
}

impl CompressorBank {
    pub fn new(
        channels: usize,
        params: CompressorParams,
        config: CompressorConfig,
        mode: ChannelMode,
    ) -> Self {
        let channels = channels.max(1);
        Self {
            channels: vec![Compressor::with_config(params, config); channels],
            mode,
        }
    }

    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    pub const fn mode(&self) -> ChannelMode {
        self.mode
    }

    /// Switching modes clears all envelopes.
    pub fn set_mode(&mut self, mode: ChannelMode) {
        if self.mode != mode {
            self.mode = mode;
            self.reset();
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        for comp in &mut self.channels {
            comp.prepare(sample_rate);
        }
    }

    pub fn reset(&mut self) {
        for comp in &mut self.channels {
            comp.reset();
        }
    }

    pub fn channel(&self, index: usize) -> Option<&Compressor> {
        self.channels.get(index)
    }

    pub fn params(&self) -> CompressorParams {
        self.channels[0].params()
    }

    pub fn set_parameters(&mut self, params: CompressorParams) {
        for comp in &mut self.channels {
            comp.set_parameters(params);
        }
    }

    pub fn set_parameters_normalized(&mut self, normalized: [f32; 5]) {
        let [threshold, ratio, attack, release, makeup] = normalized;
        for comp in &mut self.channels {
            comp.set_parameters_normalized(threshold, ratio, attack, release, makeup);
        }
    }

    pub fn set_ratio_preset(&mut self, index: usize) -> Result<(), &'static str> {
        for comp in &mut self.channels {
            comp.set_ratio_preset(index)?;
        }
        Ok(())
    }

    /// Validated named update applied to every channel.
    pub fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), &'static str> {
        for comp in &mut self.channels {
            comp.set_parameter(name, value)?;
        }
        Ok(())
    }

    pub fn get_parameter(&self, name: &str) -> Result<f32, &'static str> {
        self.channels[0].get_parameter(name)
    }

    /// Largest current gain reduction across channels, in dB (non-negative).
    pub fn max_envelope(&self) -> f32 {
        match self.mode {
            ChannelMode::Linked => self.channels[0].current_envelope(),
            ChannelMode::Independent => self
                .channels
                .iter()
                .map(Compressor::current_envelope)
                .fold(0.0, f32::max),
        }
    }

    /// Processes `buffer[channel][frame]` in place. Channels beyond the
    /// bank's width are left untouched. In linked mode the first compressor
    /// drives every channel through [`Compressor::process_buffer`].
    pub fn process_buffer(&mut self, buffer: &mut [&mut [f32]]) {
        match self.mode {
            ChannelMode::Independent => {
                for (comp, channel) in self.channels.iter_mut().zip(buffer.iter_mut()) {
                    comp.process_block(channel);
                }
            }
            ChannelMode::Linked => self.process_linked(buffer),
        }
    }

    fn process_linked(&mut self, buffer: &mut [&mut [f32]]) {
        let width = buffer.len().min(self.channels.len());
        self.channels[0].process_buffer(&mut buffer[..width]);
    }
}
