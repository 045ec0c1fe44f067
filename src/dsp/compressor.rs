use log::{debug, warn};

use crate::config::CompressorConfig;
use crate::dsp::Stage;
use crate::dsp::applier::GainApplier;
use crate::dsp::common::{EnvelopeFollower, calculate_coefficient, lin_to_db};
use crate::dsp::detector::LevelDetector;
use crate::dsp::gain_computer::GainComputer;
use crate::dsp::limiter::SoftLimiter;
use crate::params::{self, CompressorParams, Parameter, RATIO_PRESETS};

/// Feed-forward peak compressor for one signal path.
///
/// Per sample: level detection, static gain computation, attack/release
/// smoothing of the gain reduction, makeup gain, then soft limiting.
///
/// The compressor starts uninitialized and passes finite samples through
/// untouched until [`Compressor::prepare`] supplies a sample rate. Processing
/// never allocates, locks or logs.
///
/// One instance carries one envelope. To compress several channels
/// independently give each its own instance, or use
/// [`CompressorBank`](crate::dsp::CompressorBank) which also offers linked
/// stereo behaviour.
#[derive(Clone, Debug)]
pub struct Compressor {
    params: CompressorParams,
    config: CompressorConfig,
    sample_rate: f64,
    detector: LevelDetector,
    gain_computer: GainComputer,
    envelope: EnvelopeFollower,
    applier: GainApplier,
    limiter: SoftLimiter,
    input_level_db: f32,
    output_peak: f32,
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new(CompressorParams::default())
    }
}

impl Compressor {
    pub fn new(params: CompressorParams) -> Self {
        Self::with_config(params, CompressorConfig::default())
    }

    pub fn with_config(params: CompressorParams, config: CompressorConfig) -> Self {
        Self {
            params: params.clamped(&config.ranges),
            config,
            sample_rate: 0.0,
            detector: LevelDetector::from_config(&config),
            gain_computer: GainComputer::new(config.max_reduction_db),
            envelope: EnvelopeFollower::new(0.0, 0.0, config.max_reduction_db),
            applier: GainApplier::from_config(&config),
            limiter: SoftLimiter::from_config(&config),
            input_level_db: config.min_level_db,
            output_peak: 0.0,
        }
    }

    pub const fn config(&self) -> &CompressorConfig {
        &self.config
    }

    /// Swaps the tuning constants. Parameters are re-clamped to the new
    /// ranges and the envelope is cleared.
    pub fn set_config(&mut self, config: CompressorConfig) {
        let sample_rate = self.sample_rate;
        *self = Self::with_config(self.params, config);
        self.sample_rate = sample_rate;
        self.update_coefficients();
    }

    /// Sets the sample rate, recomputes coefficients and clears the envelope.
    /// Must be called before processing.
    pub fn prepare(&mut self, sample_rate: f64) {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            warn!("Ignoring invalid sample rate {sample_rate}");
            return;
        }

        self.sample_rate = sample_rate;
        self.update_coefficients();
        self.reset();
        debug!(
            "Compressor prepared at {sample_rate} Hz (attack coeff {:.6}, release coeff {:.6})",
            self.envelope.attack_coeff(),
            self.envelope.release_coeff()
        );
    }

    /// Clears the envelope only; parameters and coefficients are kept.
    pub const fn reset(&mut self) {
        self.envelope.reset();
        self.input_level_db = self.config.min_level_db;
        self.output_peak = 0.0;
    }

    pub fn is_prepared(&self) -> bool {
        self.sample_rate > 0.0
    }

    pub const fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    #[inline]
    pub fn process_sample(&mut self, input: f32) -> f32 {
        if !self.is_prepared() {
            return if input.is_finite() { input } else { 0.0 };
        }

        match self.compute_gain(input) {
            Some(gain) => self.apply_gain(input, gain),
            None => 0.0,
        }
    }

    /// Processes `buffer[channel][frame]` in place with stereo-linked gain:
    /// each frame is keyed by its loudest finite sample and every channel
    /// receives the same gain. A single channel behaves exactly like
    /// [`Compressor::process_sample`].
    ///
    /// Channels may differ in length; a frame only involves the channels
    /// that reach it.
    pub fn process_buffer(&mut self, buffer: &mut [&mut [f32]]) {
        if !self.is_prepared() {
            for channel in buffer.iter_mut() {
                self.process_block(channel);
            }
            return;
        }

        let frames = buffer.iter().map(|c| c.len()).max().unwrap_or(0);
        for frame in 0..frames {
            // None when no channel has a finite sample here; the envelope
            // is then left alone.
            let key = buffer
                .iter()
                .filter_map(|c| c.get(frame))
                .filter(|s| s.is_finite())
                .map(|s| s.abs())
                .reduce(f32::max);
            let gain = key.and_then(|key| self.compute_gain(key));

            for channel in buffer.iter_mut() {
                if let Some(sample) = channel.get_mut(frame) {
                    *sample = match gain {
                        Some(gain) if sample.is_finite() => self.apply_gain(*sample, gain),
                        _ => 0.0,
                    };
                }
            }
        }
    }

    /// Advances the envelope using `detect` as the key signal and returns
    /// the linear gain to apply, or `None` if `detect` is not finite.
    #[inline]
    pub fn compute_gain(&mut self, detect: f32) -> Option<f32> {
        let level_db = self.detector.detect(detect)?;
        self.input_level_db = level_db;

        let target = self.gain_computer.target_reduction(
            level_db,
            self.params.threshold_db,
            self.params.ratio,
        );
        let envelope_db = self.envelope.process(target);

        Some(self.applier.linear_gain(envelope_db, self.params.makeup_db))
    }

    /// Applies a gain from [`Compressor::compute_gain`] and soft-limits.
    #[inline]
    pub fn apply_gain(&mut self, input: f32, gain: f32) -> f32 {
        let output = self.limiter.process(GainApplier::apply(input, gain));
        self.output_peak = output.abs();
        output
    }

    fn update_coefficients(&mut self) {
        if !self.is_prepared() {
            return;
        }

        let coeff = |time_ms: f32| {
            calculate_coefficient(
                time_ms,
                self.sample_rate,
                self.config.coeff_k,
                self.config.min_time_samples,
            )
            .max(self.config.min_coeff)
            .min(self.config.max_coeff)
        };
        let attack = coeff(self.params.attack_ms);
        let release = coeff(self.params.release_ms);

        self.envelope.set_attack_coeff(attack);
        self.envelope.set_release_coeff(release);
    }

    pub fn set_threshold(&mut self, threshold_db: f32) {
        if threshold_db.is_finite() {
            self.params.threshold_db = self.config.ranges.threshold_db.clamp(threshold_db);
        }
    }

    pub fn set_ratio(&mut self, ratio: f32) {
        if ratio.is_finite() {
            self.params.ratio = self.config.ranges.ratio.clamp(ratio).max(1.0);
        }
    }

    pub fn set_attack(&mut self, attack_ms: f32) {
        if attack_ms.is_finite() {
            self.params.attack_ms = self.config.ranges.attack_ms.clamp(attack_ms);
            self.update_coefficients();
        }
    }

    pub fn set_release(&mut self, release_ms: f32) {
        if release_ms.is_finite() {
            self.params.release_ms = self.config.ranges.release_ms.clamp(release_ms);
            self.update_coefficients();
        }
    }

    pub fn set_makeup_gain(&mut self, makeup_db: f32) {
        if makeup_db.is_finite() {
            self.params.makeup_db = self.config.ranges.makeup_db.clamp(makeup_db);
        }
    }

    /// Sets all five parameters at once with a single coefficient update.
    pub fn set_parameters(&mut self, params: CompressorParams) {
        self.params = params.clamped(&self.config.ranges);
        self.update_coefficients();
    }

    /// Maps five normalized `[0, 1]` values onto the configured ranges.
    pub fn set_parameters_normalized(
        &mut self,
        threshold: f32,
        ratio: f32,
        attack: f32,
        release: f32,
        makeup: f32,
    ) {
        let params = CompressorParams::from_normalized(
            [threshold, ratio, attack, release, makeup],
            &self.config.ranges,
        );
        self.set_parameters(params);
    }

    pub fn set_ratio_preset(&mut self, index: usize) -> Result<(), &'static str> {
        let ratio = RATIO_PRESETS
            .get(index)
            .copied()
            .ok_or("Ratio preset index out of range")?;
        self.set_ratio(ratio);
        Ok(())
    }

    pub fn ratio_preset_index(&self) -> usize {
        params::ratio_preset_index(self.params.ratio)
    }

    pub const fn params(&self) -> CompressorParams {
        self.params
    }

    pub const fn threshold(&self) -> f32 {
        self.params.threshold_db
    }

    pub const fn ratio(&self) -> f32 {
        self.params.ratio
    }

    pub const fn attack(&self) -> f32 {
        self.params.attack_ms
    }

    pub const fn release(&self) -> f32 {
        self.params.release_ms
    }

    pub const fn makeup_gain(&self) -> f32 {
        self.params.makeup_db
    }

    pub const fn attack_coeff(&self) -> f32 {
        self.envelope.attack_coeff()
    }

    pub const fn release_coeff(&self) -> f32 {
        self.envelope.release_coeff()
    }

    /// Smoothed gain reduction in dB (non-negative).
    pub const fn current_envelope(&self) -> f32 {
        self.envelope.value()
    }

    /// Applied gain change in dB, i.e. `-envelope`.
    pub fn current_gain_reduction(&self) -> f32 {
        -self.envelope.value()
    }

    /// Detected level of the last finite input sample.
    pub const fn input_level_db(&self) -> f32 {
        self.input_level_db
    }

    /// Level of the last output sample.
    pub fn output_level_db(&self) -> f32 {
        lin_to_db(self.output_peak, self.config.level_floor)
            .max(self.config.min_level_db)
            .min(self.config.max_level_db)
    }
}

impl Stage for Compressor {
    fn process(&mut self, input: f32) -> f32 {
        self.process_sample(input)
    }

    fn set_parameter(&mut self, name: &str, value: f32) -> Result<(), &'static str> {
        let parameter: Parameter = name.parse()?;
        let ranges = self.config.ranges;
        match parameter {
            Parameter::Threshold => {
                if ranges.threshold_db.contains(value) {
                    self.set_threshold(value);
                    Ok(())
                } else {
                    Err("Threshold is outside the configured dB range")
                }
            }
            Parameter::Ratio => {
                if ranges.ratio.contains(value) {
                    self.set_ratio(value);
                    Ok(())
                } else {
                    Err("Ratio is outside the configured range")
                }
            }
            Parameter::Attack => {
                if ranges.attack_ms.contains(value) {
                    self.set_attack(value);
                    Ok(())
                } else {
                    Err("Attack is outside the configured ms range")
                }
            }
            Parameter::Release => {
                if ranges.release_ms.contains(value) {
                    self.set_release(value);
                    Ok(())
                } else {
                    Err("Release is outside the configured ms range")
                }
            }
            Parameter::Makeup => {
                if ranges.makeup_db.contains(value) {
                    self.set_makeup_gain(value);
                    Ok(())
                } else {
                    Err("Makeup is outside the configured dB range")
                }
            }
        }
    }

    fn get_parameter(&self, name: &str) -> Result<f32, &'static str> {
        let parameter: Parameter = name.parse()?;
        Ok(self.params.get(parameter))
    }
}
