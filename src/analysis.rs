//! Static (unsmoothed) behaviour of a parameter set.

use crate::dsp::gain_computer::GainComputer;
use crate::params::CompressorParams;

/// Attack at or below this, combined with the release and ratio limits below,
/// makes the envelope track individual waveform cycles.
const EXTREME_ATTACK_MS: f32 = 2.0;
const EXTREME_RELEASE_MS: f32 = 10.0;
const EXTREME_RATIO: f32 = 8.0;

/// Levels used when no explicit list is given.
pub const DEFAULT_LEVELS_DB: [f32; 5] = [-60.0, -40.0, -20.0, -6.0, -1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    pub input_db: f32,
    pub gain_reduction_db: f32,
    pub output_db: f32,
}

/// Steady-state transfer curve: what each input level settles to once the
/// envelope has converged.
pub fn transfer_curve(
    params: &CompressorParams,
    max_reduction_db: f32,
    levels_db: &[f32],
) -> Vec<CurvePoint> {
    let computer = GainComputer::new(max_reduction_db);
    levels_db
        .iter()
        .map(|&input_db| {
            let gain_reduction_db =
                computer.target_reduction(input_db, params.threshold_db, params.ratio);
            CurvePoint {
                input_db,
                gain_reduction_db,
                output_db: input_db - gain_reduction_db + params.makeup_db,
            }
        })
        .collect()
}

/// True when attack, release and ratio together drive the envelope fast and
/// hard enough to audibly distort (the envelope follows the waveform rather
/// than its loudness).
pub fn is_extreme(params: &CompressorParams) -> bool {
    params.attack_ms <= EXTREME_ATTACK_MS
        && params.release_ms < EXTREME_RELEASE_MS
        && params.ratio > EXTREME_RATIO
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_matches_hard_knee() {
        let params = CompressorParams {
            threshold_db: -35.0,
            ratio: 4.0,
            makeup_db: 0.0,
            ..CompressorParams::default()
        };
        let curve = transfer_curve(&params, 60.0, &DEFAULT_LEVELS_DB);

        assert_eq!(curve.len(), 5);
        assert_eq!(curve[0].gain_reduction_db, 0.0);
        assert_eq!(curve[0].output_db, -60.0);
        // -20 dB is 15 over: 11.25 dB reduction.
        assert!((curve[2].gain_reduction_db - 11.25).abs() < 1e-5);
        assert!((curve[2].output_db + 31.25).abs() < 1e-5);
    }

    #[test]
    fn makeup_shifts_output() {
        let params = CompressorParams {
            makeup_db: 6.0,
            ..CompressorParams::default()
        };
        let curve = transfer_curve(&params, 60.0, &[-40.0]);
        assert_eq!(curve[0].output_db, -34.0);
    }

    #[test]
    fn extreme_settings_detection() {
        let mut params = CompressorParams {
            threshold_db: -35.0,
            ratio: 10.0,
            attack_ms: 0.1,
            release_ms: 1.0,
            makeup_db: 0.0,
        };
        assert!(is_extreme(&params));

        params.ratio = 8.0;
        assert!(!is_extreme(&params));

        assert!(!is_extreme(&CompressorParams::default()));
    }
}
