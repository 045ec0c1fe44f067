use anyhow::{Context, Result, bail};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::{debug, info};
use std::path::Path;

use crate::config::CompressorConfig;
use crate::dsp::{ChannelMode, CompressorBank};
use crate::dsp::common::lin_to_db;
use crate::params::CompressorParams;

const BLOCK_SIZE: usize = 512;

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub params: CompressorParams,
    pub config: CompressorConfig,
    pub mode: ChannelMode,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            params: CompressorParams::default(),
            config: CompressorConfig::default(),
            mode: ChannelMode::Independent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderReport {
    pub frames: usize,
    pub channels: usize,
    pub sample_rate: u32,
    pub input_peak_db: f32,
    pub output_peak_db: f32,
    /// Largest gain reduction seen at any block boundary, in dB.
    pub max_gain_reduction_db: f32,
}

impl std::fmt::Display for RenderReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Frames: {}", self.frames)?;
        writeln!(f, "Channels: {}", self.channels)?;
        writeln!(f, "Sample Rate: {}", self.sample_rate)?;
        writeln!(f, "Input Peak: {:.2} dB", self.input_peak_db)?;
        writeln!(f, "Output Peak: {:.2} dB", self.output_peak_db)?;
        write!(f, "Max Gain Reduction: {:.2} dB", self.max_gain_reduction_db)
    }
}

/// Compresses a WAV file offline and writes the result with the input's
/// channel count, sample rate and sample format.
pub fn render_file(input: &Path, output: &Path, options: &RenderOptions) -> Result<RenderReport> {
    let reader = WavReader::open(input)
        .with_context(|| format!("failed to open input WAV '{}'", input.display()))?;
    let spec = reader.spec();
    let channels = spec.channels as usize;
    if channels == 0 {
        bail!("input WAV '{}' has no channels", input.display());
    }

    debug!("Input spec: {spec:?}");
    let interleaved = read_samples(reader)?;

    let frames = interleaved.len() / channels;
    let mut planar: Vec<Vec<f32>> = (0..channels)
        .map(|ch| {
            interleaved
                .iter()
                .skip(ch)
                .step_by(channels)
                .take(frames)
                .copied()
                .collect()
        })
        .collect();

    let mut bank = CompressorBank::new(channels, options.params, options.config, options.mode);
    bank.prepare(spec.sample_rate as f64);
    info!(
        "Rendering {} frames x {channels} channels at {} Hz ({}, {})",
        frames, spec.sample_rate, options.params, options.mode
    );

    let input_peak = peak(&planar);
    let mut max_reduction = 0.0f32;
    let mut start = 0;
    while start < frames {
        let end = (start + BLOCK_SIZE).min(frames);
        let mut block: Vec<&mut [f32]> = planar.iter_mut().map(|c| &mut c[start..end]).collect();
        bank.process_buffer(&mut block);
        max_reduction = max_reduction.max(bank.max_envelope());
        start = end;
    }
    let output_peak = peak(&planar);

    write_samples(output, spec, &planar, frames)?;

    let report = RenderReport {
        frames,
        channels,
        sample_rate: spec.sample_rate,
        input_peak_db: lin_to_db(input_peak, 1e-10),
        output_peak_db: lin_to_db(output_peak, 1e-10),
        max_gain_reduction_db: max_reduction,
    };
    info!("Rendered '{}'", output.display());
    Ok(report)
}

fn read_samples<R: std::io::Read>(mut reader: WavReader<R>) -> Result<Vec<f32>> {
    let spec = reader.spec();
    match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .context("failed to read float samples"),
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample)?;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()
                .context("failed to read integer samples")
        }
    }
}

fn write_samples(path: &Path, spec: WavSpec, planar: &[Vec<f32>], frames: usize) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).context("failed to create output directory")?;
    }

    let mut writer = WavWriter::create(path, spec)
        .with_context(|| format!("failed to create output WAV '{}'", path.display()))?;

    match spec.sample_format {
        SampleFormat::Float => {
            for frame in 0..frames {
                for channel in planar {
                    writer.write_sample(channel[frame])?;
                }
            }
        }
        SampleFormat::Int => {
            let scale = int_scale(spec.bits_per_sample)?;
            let max = scale - 1.0;
            for frame in 0..frames {
                for channel in planar {
                    let value = (channel[frame] * scale).round().clamp(-scale, max) as i32;
                    writer.write_sample(value)?;
                }
            }
        }
    }

    writer.finalize().context("failed to finalize output WAV")
}

fn int_scale(bits: u16) -> Result<f32> {
    if !(8..=32).contains(&bits) {
        bail!("unsupported integer bit depth: {bits}");
    }
    Ok((1u64 << (bits - 1)) as f32)
}

fn peak(planar: &[Vec<f32>]) -> f32 {
    planar
        .iter()
        .flatten()
        .filter(|s| s.is_finite())
        .fold(0.0f32, |acc, s| acc.max(s.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_scales() {
        assert_eq!(int_scale(16).unwrap(), 32768.0);
        assert_eq!(int_scale(24).unwrap(), 8_388_608.0);
        assert!(int_scale(4).is_err());
    }
}
