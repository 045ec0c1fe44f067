use crate::config::CompressorConfig;

/// Scaled tanh saturation above a threshold.
///
/// Samples at or below `threshold` in magnitude pass untouched; anything
/// louder becomes `tanh(x * drive) * threshold`, so the output magnitude
/// never exceeds `threshold`.
#[derive(Clone, Debug)]
pub struct SoftLimiter {
    threshold: f32,
    drive: f32,
}

impl SoftLimiter {
    pub const fn new(threshold: f32, drive: f32) -> Self {
        Self { threshold, drive }
    }

    pub const fn from_config(config: &CompressorConfig) -> Self {
        Self::new(config.limiter_threshold, config.limiter_drive)
    }

    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    #[inline]
    pub fn process(&self, input: f32) -> f32 {
        if input.abs() > self.threshold {
            (input * self.drive).tanh() * self.threshold
        } else {
            input
        }
    }
}

impl Default for SoftLimiter {
    fn default() -> Self {
        Self::from_config(&CompressorConfig::default())
    }
}
