/// Convert decibels to linear amplitude.
#[inline]
pub fn db_to_lin(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Convert linear amplitude to decibels, flooring the magnitude at `floor`.
#[inline]
pub fn lin_to_db(linear: f32, floor: f32) -> f32 {
    20.0 * linear.abs().max(floor).log10()
}

/// Calculate a one-pole smoothing coefficient from a time constant in milliseconds.
///
/// Returns `1 - exp(-k / samples)` where `samples = time_ms * 0.001 * sample_rate`,
/// floored at `min_samples`. Larger `k` settles in fewer samples; `k = 1` reaches
/// ~63% of a step after one time constant.
#[inline]
pub fn calculate_coefficient(time_ms: f32, sample_rate: f64, k: f32, min_samples: f32) -> f32 {
    let samples = (time_ms as f64 * 0.001 * sample_rate).max(min_samples as f64);
    (1.0 - (-(k as f64) / samples).exp()) as f32
}

/// One-pole follower over a gain-reduction magnitude in dB.
///
/// Rising targets are tracked with the attack coefficient, falling ones with
/// the release coefficient. The value stays within `[0, max_db]`.
#[derive(Clone, Debug)]
pub struct EnvelopeFollower {
    envelope: f32,
    attack_coeff: f32,
    release_coeff: f32,
    max_db: f32,
}

impl EnvelopeFollower {
    /// Create from pre-computed coefficients.
    pub const fn new(attack_coeff: f32, release_coeff: f32, max_db: f32) -> Self {
        Self {
            envelope: 0.0,
            attack_coeff,
            release_coeff,
            max_db,
        }
    }

    pub const fn set_attack_coeff(&mut self, coeff: f32) {
        self.attack_coeff = coeff;
    }

    pub const fn set_release_coeff(&mut self, coeff: f32) {
        self.release_coeff = coeff;
    }

    pub const fn attack_coeff(&self) -> f32 {
        self.attack_coeff
    }

    pub const fn release_coeff(&self) -> f32 {
        self.release_coeff
    }

    pub const fn value(&self) -> f32 {
        self.envelope
    }

    pub const fn reset(&mut self) {
        self.envelope = 0.0;
    }

    #[inline]
    pub fn process(&mut self, target: f32) -> f32 {
        // A non-finite target would poison every following sample.
        if !target.is_finite() {
            return self.envelope;
        }

        let coeff = if target > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = coeff
            .mul_add(target - self.envelope, self.envelope)
            .max(0.0)
            .min(self.max_db);
        self.envelope
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_conversions() {
        assert!((db_to_lin(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_lin(-20.0) - 0.1).abs() < 1e-6);
        assert!((lin_to_db(0.1, 1e-10) + 20.0).abs() < 1e-4);
        assert!((lin_to_db(0.0, 1e-10) + 200.0).abs() < 1e-3);
    }

    #[test]
    fn coefficient_is_in_unit_interval() {
        for &ms in &[0.0, 0.01, 1.0, 10.0, 100.0, 1000.0] {
            for &sr in &[8_000.0, 44_100.0, 192_000.0] {
                let c = calculate_coefficient(ms, sr, 2.2, 1.0);
                assert!(c > 0.0 && c < 1.0, "coeff {c} for {ms} ms @ {sr}");
            }
        }
    }

    #[test]
    fn coefficient_floors_sample_count() {
        // Zero time collapses to the one-sample floor.
        let c = calculate_coefficient(0.0, 44_100.0, 1.0, 1.0);
        assert!((c - (1.0 - (-1.0f32).exp())).abs() < 1e-6);
    }

    #[test]
    fn longer_times_give_smaller_coefficients() {
        let fast = calculate_coefficient(1.0, 48_000.0, 2.2, 1.0);
        let slow = calculate_coefficient(100.0, 48_000.0, 2.2, 1.0);
        assert!(fast > slow);
    }

    #[test]
    fn follower_attacks_and_releases() {
        let mut env = EnvelopeFollower::new(0.5, 0.1, 60.0);
        assert_eq!(env.process(10.0), 5.0);
        assert_eq!(env.process(10.0), 7.5);
        // Release uses the slower coefficient.
        let v = env.process(0.0);
        assert!((v - 6.75).abs() < 1e-6);
    }

    #[test]
    fn follower_ignores_non_finite_target() {
        let mut env = EnvelopeFollower::new(0.5, 0.5, 60.0);
        env.process(8.0);
        assert_eq!(env.process(f32::NAN), 4.0);
        assert_eq!(env.process(f32::INFINITY), 4.0);
    }

    #[test]
    fn follower_is_clamped() {
        let mut env = EnvelopeFollower::new(1.0, 1.0, 60.0);
        assert_eq!(env.process(100.0), 60.0);
        assert_eq!(env.process(-5.0), 0.0);
    }
}
