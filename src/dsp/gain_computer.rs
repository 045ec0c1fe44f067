/// Static hard-knee downward compression curve.
#[derive(Clone, Debug)]
pub struct GainComputer {
    max_reduction_db: f32,
}

impl GainComputer {
    pub const fn new(max_reduction_db: f32) -> Self {
        Self { max_reduction_db }
    }

    pub const fn max_reduction_db(&self) -> f32 {
        self.max_reduction_db
    }

    /// Target gain reduction in dB (non-negative) for a detected level.
    ///
    /// An N:1 ratio turns N dB above threshold into 1 dB above threshold.
    /// Ratios below 1 are treated as 1, so the curve never expands.
    #[inline]
    pub fn target_reduction(&self, level_db: f32, threshold_db: f32, ratio: f32) -> f32 {
        if level_db <= threshold_db {
            return 0.0;
        }

        let over = level_db - threshold_db;
        let ratio = ratio.max(1.0);
        (over - over / ratio).min(self.max_reduction_db)
    }
}

impl Default for GainComputer {
    fn default() -> Self {
        Self::new(60.0)
    }
}
