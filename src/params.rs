use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::config::ParameterRanges;

/// Preset ratios offered by hosts that expose the ratio as a stepped control.
pub const RATIO_PRESETS: [f32; 8] = [1.0, 2.0, 3.0, 4.0, 6.0, 8.0, 10.0, 20.0];
pub const RATIO_PRESET_NAMES: [&str; 8] = ["1:1", "2:1", "3:1", "4:1", "6:1", "8:1", "10:1", "20:1"];
/// Index of 4:1, reported when the current ratio matches no preset.
pub const DEFAULT_RATIO_PRESET: usize = 3;

/// The five user-facing parameters. This is the state a host persists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CompressorParams {
    pub threshold_db: f32,
    pub ratio: f32,
    pub attack_ms: f32,
    pub release_ms: f32,
    pub makeup_db: f32,
}

impl Default for CompressorParams {
    fn default() -> Self {
        Self {
            threshold_db: -20.0,
            ratio: 4.0,
            attack_ms: 10.0,
            release_ms: 100.0,
            makeup_db: 0.0,
        }
    }
}

impl std::fmt::Display for CompressorParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "threshold {:.1} dB, ratio {:.1}:1, attack {:.1} ms, release {:.1} ms, makeup {:.1} dB",
            self.threshold_db, self.ratio, self.attack_ms, self.release_ms, self.makeup_db
        )
    }
}

impl CompressorParams {
    /// Builds parameters from five normalized `[0, 1]` values.
    pub fn from_normalized(normalized: [f32; 5], ranges: &ParameterRanges) -> Self {
        Self {
            threshold_db: ranges.threshold_db.denormalize(normalized[0]),
            ratio: ranges.ratio.denormalize(normalized[1]),
            attack_ms: ranges.attack_ms.denormalize(normalized[2]),
            release_ms: ranges.release_ms.denormalize(normalized[3]),
            makeup_db: ranges.makeup_db.denormalize(normalized[4]),
        }
    }

    pub fn to_normalized(&self, ranges: &ParameterRanges) -> [f32; 5] {
        [
            ranges.threshold_db.normalize(self.threshold_db),
            ranges.ratio.normalize(self.ratio),
            ranges.attack_ms.normalize(self.attack_ms),
            ranges.release_ms.normalize(self.release_ms),
            ranges.makeup_db.normalize(self.makeup_db),
        ]
    }

    /// Clamps every field into its range. Non-finite fields fall back to the
    /// default value.
    pub fn clamped(&self, ranges: &ParameterRanges) -> Self {
        let defaults = Self::default();
        let pick = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };
        Self {
            threshold_db: ranges
                .threshold_db
                .clamp(pick(self.threshold_db, defaults.threshold_db)),
            ratio: ranges.ratio.clamp(pick(self.ratio, defaults.ratio)),
            attack_ms: ranges.attack_ms.clamp(pick(self.attack_ms, defaults.attack_ms)),
            release_ms: ranges
                .release_ms
                .clamp(pick(self.release_ms, defaults.release_ms)),
            makeup_db: ranges.makeup_db.clamp(pick(self.makeup_db, defaults.makeup_db)),
        }
    }

    pub fn get(&self, parameter: Parameter) -> f32 {
        match parameter {
            Parameter::Threshold => self.threshold_db,
            Parameter::Ratio => self.ratio,
            Parameter::Attack => self.attack_ms,
            Parameter::Release => self.release_ms,
            Parameter::Makeup => self.makeup_db,
        }
    }
}

/// Addresses one of the five parameters by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parameter {
    Threshold,
    Ratio,
    Attack,
    Release,
    Makeup,
}

impl Parameter {
    pub const ALL: [Self; 5] = [
        Self::Threshold,
        Self::Ratio,
        Self::Attack,
        Self::Release,
        Self::Makeup,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::Ratio => "ratio",
            Self::Attack => "attack",
            Self::Release => "release",
            Self::Makeup => "makeup",
        }
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Parameter {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or("Unknown parameter")
    }
}

/// Name of a ratio preset, or `None` for an invalid index.
pub fn ratio_preset_name(index: usize) -> Option<&'static str> {
    RATIO_PRESET_NAMES.get(index).copied()
}

/// Index of the preset within 0.1 of `ratio`, falling back to 4:1.
pub fn ratio_preset_index(ratio: f32) -> usize {
    RATIO_PRESETS
        .iter()
        .position(|preset| (ratio - preset).abs() < 0.1)
        .unwrap_or(DEFAULT_RATIO_PRESET)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_threshold_midpoint() {
        let params =
            CompressorParams::from_normalized([0.5, 0.0, 0.0, 0.0, 0.0], &ParameterRanges::default());
        assert_eq!(params.threshold_db, -30.0);
        assert_eq!(params.ratio, 1.0);
        assert_eq!(params.makeup_db, 0.0);
    }

    #[test]
    fn normalized_mapping_is_deterministic() {
        let ranges = ParameterRanges::default();
        let input = [0.25, 0.75, 0.1, 0.9, 0.33];
        let a = CompressorParams::from_normalized(input, &ranges);
        let b = CompressorParams::from_normalized(input, &ranges);
        assert_eq!(a, b);

        let back = a.to_normalized(&ranges);
        for (x, y) in input.iter().zip(back) {
            assert!((x - y).abs() < 1e-5);
        }
    }

    #[test]
    fn clamped_repairs_out_of_range_values() {
        let params = CompressorParams {
            threshold_db: -100.0,
            ratio: 0.5,
            attack_ms: -3.0,
            release_ms: f32::NAN,
            makeup_db: 40.0,
        }
        .clamped(&ParameterRanges::default());

        assert_eq!(params.threshold_db, -60.0);
        assert_eq!(params.ratio, 1.0);
        assert_eq!(params.attack_ms, 0.1);
        assert_eq!(params.release_ms, 100.0);
        assert_eq!(params.makeup_db, 18.0);
    }

    #[test]
    fn ratio_presets_lookup() {
        assert_eq!(ratio_preset_index(4.0), 3);
        assert_eq!(ratio_preset_index(10.05), 6);
        assert_eq!(ratio_preset_index(5.0), DEFAULT_RATIO_PRESET);
        assert_eq!(ratio_preset_name(7), Some("20:1"));
        assert_eq!(ratio_preset_name(8), None);
    }

    #[test]
    fn parameter_names_parse() {
        assert_eq!("Threshold".parse::<Parameter>(), Ok(Parameter::Threshold));
        assert_eq!("makeup".parse::<Parameter>(), Ok(Parameter::Makeup));
        assert!("knee".parse::<Parameter>().is_err());
    }

    #[test]
    fn params_serialize_as_plain_fields() {
        let json = serde_json::to_string(&CompressorParams::default()).unwrap();
        let back: CompressorParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, CompressorParams::default());
        assert!(json.contains("\"threshold_db\":-20.0"));
    }
}
