use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

/// A closed real-world interval a parameter lives in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Range {
    pub min: f32,
    pub max: f32,
}

impl Range {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Unlike `f32::clamp` this never panics on an inverted range.
    pub fn clamp(&self, value: f32) -> f32 {
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Maps a normalized `[0, 1]` value linearly onto the range.
    /// Out-of-range inputs are clamped, non-finite inputs map to `min`.
    pub fn denormalize(&self, normalized: f32) -> f32 {
        let n = if normalized.is_finite() {
            normalized.clamp(0.0, 1.0)
        } else {
            0.0
        };
        (self.max - self.min).mul_add(n, self.min)
    }

    /// Inverse of [`Range::denormalize`].
    pub fn normalize(&self, value: f32) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.clamp(value) - self.min) / span).clamp(0.0, 1.0)
    }
}

/// Real-world ranges of the five user parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParameterRanges {
    pub threshold_db: Range,
    pub ratio: Range,
    pub attack_ms: Range,
    pub release_ms: Range,
    pub makeup_db: Range,
}

impl Default for ParameterRanges {
    fn default() -> Self {
        Self {
            threshold_db: Range::new(-60.0, 0.0),
            ratio: Range::new(1.0, 20.0),
            attack_ms: Range::new(0.1, 100.0),
            release_ms: Range::new(1.0, 1000.0),
            makeup_db: Range::new(0.0, 18.0),
        }
    }
}

/// Tuning constants of the compressor core.
///
/// Every clamp bound and curve constant the processing path uses lives here,
/// so tuning variants are configurations rather than separate processors.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompressorConfig {
    /// Smallest magnitude fed to `log10`.
    pub level_floor: f32,
    pub min_level_db: f32,
    pub max_level_db: f32,
    /// Upper bound for both the target and the smoothed gain reduction.
    pub max_reduction_db: f32,
    /// Numerator of the one-pole coefficient exponent.
    pub coeff_k: f32,
    /// Lower bound on a time constant expressed in samples.
    pub min_time_samples: f32,
    /// Bounds on the smoothing coefficients. The lower bound only catches
    /// degenerate rates; it must stay below the coefficient of the longest
    /// release or that release stops having an effect.
    pub min_coeff: f32,
    pub max_coeff: f32,
    pub min_gain_db: f32,
    pub max_gain_db: f32,
    pub min_linear_gain: f32,
    pub max_linear_gain: f32,
    pub limiter_threshold: f32,
    pub limiter_drive: f32,
    pub ranges: ParameterRanges,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            level_floor: 1e-10,
            min_level_db: -120.0,
            max_level_db: 20.0,
            max_reduction_db: 60.0,
            coeff_k: 2.2,
            min_time_samples: 1.0,
            min_coeff: 1e-7,
            max_coeff: 0.999,
            min_gain_db: -60.0,
            max_gain_db: 20.0,
            min_linear_gain: 0.001,
            max_linear_gain: 10.0,
            limiter_threshold: 0.95,
            limiter_drive: 0.5,
            ranges: ParameterRanges::default(),
        }
    }
}

impl CompressorConfig {
    /// Textbook one-time-constant tuning: `k = 1`, unclamped coefficients and
    /// a gentler limiter drive.
    pub fn classic() -> Self {
        Self {
            coeff_k: 1.0,
            min_coeff: f32::MIN_POSITIVE,
            max_coeff: 1.0,
            limiter_drive: 0.8,
            ..Self::default()
        }
    }

    // Negated comparisons also reject NaN.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn validate(&self) -> Result<()> {
        if !(self.level_floor > 0.0) {
            bail!("level_floor must be positive, got {}", self.level_floor);
        }
        if self.min_level_db >= self.max_level_db {
            bail!("min_level_db must be below max_level_db");
        }
        if !(self.max_reduction_db > 0.0) {
            bail!("max_reduction_db must be positive");
        }
        if !(self.coeff_k > 0.0) || !(self.min_time_samples > 0.0) {
            bail!("coeff_k and min_time_samples must be positive");
        }
        if !(self.min_coeff > 0.0 && self.min_coeff <= self.max_coeff && self.max_coeff <= 1.0) {
            bail!(
                "coefficient bounds must satisfy 0 < min <= max <= 1, got [{}, {}]",
                self.min_coeff,
                self.max_coeff
            );
        }
        if self.min_gain_db >= self.max_gain_db {
            bail!("min_gain_db must be below max_gain_db");
        }
        if !(self.min_linear_gain > 0.0) || self.min_linear_gain >= self.max_linear_gain {
            bail!("linear gain bounds must satisfy 0 < min < max");
        }
        if !(self.limiter_threshold > 0.0 && self.limiter_threshold <= 1.0) {
            bail!(
                "limiter_threshold must be in (0, 1], got {}",
                self.limiter_threshold
            );
        }
        if !(self.limiter_drive > 0.0) {
            bail!("limiter_drive must be positive");
        }

        let r = &self.ranges;
        for (name, range) in [
            ("threshold", r.threshold_db),
            ("ratio", r.ratio),
            ("attack", r.attack_ms),
            ("release", r.release_ms),
            ("makeup", r.makeup_db),
        ] {
            if !(range.min < range.max) {
                bail!("{name} range is empty: [{}, {}]", range.min, range.max);
            }
        }
        if r.ratio.min < 1.0 {
            bail!("ratio range must not go below 1:1");
        }
        if !(r.attack_ms.min > 0.0 && r.release_ms.min > 0.0) {
            bail!("attack and release ranges must be strictly positive");
        }

        Ok(())
    }
}
