use crate::config::CompressorConfig;
use crate::dsp::common::lin_to_db;

/// Instantaneous peak level detector.
#[derive(Clone, Debug)]
pub struct LevelDetector {
    floor: f32,
    min_db: f32,
    max_db: f32,
}

impl LevelDetector {
    pub const fn new(floor: f32, min_db: f32, max_db: f32) -> Self {
        Self {
            floor,
            min_db,
            max_db,
        }
    }

    pub const fn from_config(config: &CompressorConfig) -> Self {
        Self::new(config.level_floor, config.min_level_db, config.max_level_db)
    }

    /// Level of `input` in dB, or `None` when the sample is not finite.
    #[inline]
    pub fn detect(&self, input: f32) -> Option<f32> {
        if !input.is_finite() {
            return None;
        }
        Some(lin_to_db(input, self.floor).max(self.min_db).min(self.max_db))
    }
}

impl Default for LevelDetector {
    fn default() -> Self {
        Self::from_config(&CompressorConfig::default())
    }
}
