use anyhow::{Result, anyhow};
use crossbeam::channel::{Receiver, Sender, TrySendError, bounded};
use log::{debug, error};

use crate::dsp::{ChannelMode, CompressorBank};
use crate::meter::{Meter, MeterHandle, MeterInfo, block_peak};
use crate::params::{CompressorParams, Parameter};

const MESSAGE_CHANNEL_CAPACITY: usize = 64;

/// Control messages delivered to the audio thread.
#[derive(Debug, Clone, Copy)]
pub enum EngineMessage {
    SetParams(CompressorParams),
    SetParameter(Parameter, f32),
    SetNormalized([f32; 5]),
    SetRatioPreset(usize),
    SetMode(ChannelMode),
    Reset,
}

/// Audio-thread owner of a [`CompressorBank`].
///
/// Control changes arrive through an [`EngineHandle`] and are applied at
/// the start of the next block, so a block is always processed with one
/// consistent parameter set.
pub struct Engine {
    bank: CompressorBank,
    rx_updates: Receiver<EngineMessage>,
    meter: Meter,
}

/// Cloneable control side of an [`Engine`]. Never blocks.
#[derive(Clone)]
pub struct EngineHandle {
    tx: Sender<EngineMessage>,
    meter: MeterHandle,
}

impl Engine {
    pub fn new(bank: CompressorBank) -> (Self, EngineHandle) {
        let (tx, rx_updates) = bounded(MESSAGE_CHANNEL_CAPACITY);
        let (meter, meter_handle) = Meter::new();

        (
            Self {
                bank,
                rx_updates,
                meter,
            },
            EngineHandle {
                tx,
                meter: meter_handle,
            },
        )
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.bank.prepare(sample_rate);
        self.meter.reset();
    }

    pub const fn bank(&self) -> &CompressorBank {
        &self.bank
    }

    /// Processes `buffer[channel][frame]` in place.
    pub fn process(&mut self, buffer: &mut [&mut [f32]]) {
        self.handle_messages();

        let input_peak = block_peak(buffer);
        self.bank.process_buffer(buffer);
        let output_peak = block_peak(buffer);

        self.meter
            .publish(input_peak, output_peak, self.bank.max_envelope());
    }

    pub fn handle_messages(&mut self) {
        while let Ok(message) = self.rx_updates.try_recv() {
            match message {
                EngineMessage::SetParams(params) => {
                    self.bank.set_parameters(params);
                    debug!("Parameters set: {params}");
                }
                EngineMessage::SetParameter(parameter, value) => {
                    if let Err(e) = self.bank.set_parameter(parameter.as_str(), value) {
                        error!("Failed to set {parameter} to {value}: {e}");
                    } else {
                        debug!("{parameter} set to {value}");
                    }
                }
                EngineMessage::SetNormalized(normalized) => {
                    self.bank.set_parameters_normalized(normalized);
                    debug!("Normalized parameters set: {}", self.bank.params());
                }
                EngineMessage::SetRatioPreset(index) => {
                    if let Err(e) = self.bank.set_ratio_preset(index) {
                        error!("Failed to select ratio preset {index}: {e}");
                    } else {
                        debug!("Ratio preset {index} selected");
                    }
                }
                EngineMessage::SetMode(mode) => {
                    self.bank.set_mode(mode);
                    debug!("Channel mode: {mode}");
                }
                EngineMessage::Reset => {
                    self.bank.reset();
                    self.meter.reset();
                    debug!("Envelopes reset");
                }
            }
        }
    }
}

impl EngineHandle {
    pub fn send(&self, message: EngineMessage) -> Result<()> {
        self.tx.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => anyhow!("engine message queue is full"),
            TrySendError::Disconnected(_) => anyhow!("engine has been dropped"),
        })
    }

    pub fn set_params(&self, params: CompressorParams) -> Result<()> {
        self.send(EngineMessage::SetParams(params))
    }

    pub fn set_parameter(&self, parameter: Parameter, value: f32) -> Result<()> {
        self.send(EngineMessage::SetParameter(parameter, value))
    }

    pub fn set_normalized(&self, normalized: [f32; 5]) -> Result<()> {
        self.send(EngineMessage::SetNormalized(normalized))
    }

    pub fn set_ratio_preset(&self, index: usize) -> Result<()> {
        self.send(EngineMessage::SetRatioPreset(index))
    }

    pub fn set_mode(&self, mode: ChannelMode) -> Result<()> {
        self.send(EngineMessage::SetMode(mode))
    }

    pub fn reset(&self) -> Result<()> {
        self.send(EngineMessage::Reset)
    }

    pub fn meter(&self) -> MeterInfo {
        self.meter.get_info()
    }
}
