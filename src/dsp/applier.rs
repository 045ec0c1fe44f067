use crate::config::CompressorConfig;
use crate::dsp::common::db_to_lin;

/// Turns the smoothed gain reduction and makeup gain into a bounded linear
/// multiplier and applies it.
#[derive(Clone, Debug)]
pub struct GainApplier {
    min_gain_db: f32,
    max_gain_db: f32,
    min_linear: f32,
    max_linear: f32,
}

impl GainApplier {
    pub const fn new(min_gain_db: f32, max_gain_db: f32, min_linear: f32, max_linear: f32) -> Self {
        Self {
            min_gain_db,
            max_gain_db,
            min_linear,
            max_linear,
        }
    }

    pub const fn from_config(config: &CompressorConfig) -> Self {
        Self::new(
            config.min_gain_db,
            config.max_gain_db,
            config.min_linear_gain,
            config.max_linear_gain,
        )
    }

    /// Linear gain for `envelope_db` of reduction plus `makeup_db`.
    #[inline]
    pub fn linear_gain(&self, envelope_db: f32, makeup_db: f32) -> f32 {
        let gain_db = makeup_db - envelope_db;
        let linear = if gain_db.is_finite() {
            db_to_lin(gain_db.max(self.min_gain_db).min(self.max_gain_db))
        } else {
            1.0
        };
        let linear = if linear.is_finite() { linear } else { 1.0 };
        linear.max(self.min_linear).min(self.max_linear)
    }

    /// `input * gain`, or 0 if the product is not finite.
    #[inline]
    pub fn apply(input: f32, gain: f32) -> f32 {
        let output = input * gain;
        if output.is_finite() { output } else { 0.0 }
    }
}

impl Default for GainApplier {
    fn default() -> Self {
        Self::from_config(&CompressorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_reduction_no_makeup_is_unity() {
        let g = GainApplier::default();
        assert!((g.linear_gain(0.0, 0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn reduction_and_makeup_combine() {
        let g = GainApplier::default();
        // 12 dB reduction, 6 dB makeup -> -6 dB
        assert!((g.linear_gain(12.0, 6.0) - db_to_lin(-6.0)).abs() < 1e-6);
    }

    #[test]
    fn gain_is_bounded() {
        let g = GainApplier::default();
        assert!((g.linear_gain(200.0, 0.0) - 0.001).abs() < 1e-7);
        assert!((g.linear_gain(0.0, 200.0) - 10.0).abs() < 1e-5);
    }

    #[test]
    fn non_finite_gain_falls_back_to_unity() {
        let g = GainApplier::default();
        assert_eq!(g.linear_gain(f32::NAN, 0.0), 1.0);
    }

    #[test]
    fn overflowing_product_is_silenced() {
        assert_eq!(GainApplier::apply(f32::MAX, 10.0), 0.0);
        assert_eq!(GainApplier::apply(0.5, 2.0), 1.0);
    }
}
