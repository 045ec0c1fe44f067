use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::dsp::common::lin_to_db;

const SILENCE_DB: f32 = -100.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterInfo {
    /// Current gain change in dB (zero or negative).
    pub gain_reduction_db: f32,
    pub input_peak_db: f32,
    pub output_peak_db: f32,
}

impl Default for MeterInfo {
    fn default() -> Self {
        Self {
            gain_reduction_db: 0.0,
            input_peak_db: SILENCE_DB,
            output_peak_db: SILENCE_DB,
        }
    }
}

/// Audio-side publisher of per-block meter readings.
pub struct Meter {
    info: Arc<ArcSwap<MeterInfo>>,
}

/// Reader side of a [`Meter`], safe to poll from any thread.
#[derive(Clone)]
pub struct MeterHandle {
    info: Arc<ArcSwap<MeterInfo>>,
}

impl Meter {
    pub fn new() -> (Self, MeterHandle) {
        let info = Arc::new(ArcSwap::from_pointee(MeterInfo::default()));
        (
            Self {
                info: Arc::clone(&info),
            },
            MeterHandle { info },
        )
    }

    pub fn publish(&self, input_peak: f32, output_peak: f32, envelope_db: f32) {
        self.info.store(Arc::new(MeterInfo {
            gain_reduction_db: -envelope_db,
            input_peak_db: peak_to_db(input_peak),
            output_peak_db: peak_to_db(output_peak),
        }));
    }

    pub fn reset(&self) {
        self.info.store(Arc::new(MeterInfo::default()));
    }
}

impl MeterHandle {
    pub fn get_info(&self) -> MeterInfo {
        **self.info.load()
    }
}

/// Peak magnitude of a set of channels, skipping non-finite samples.
pub fn block_peak(channels: &[&mut [f32]]) -> f32 {
    channels
        .iter()
        .flat_map(|c| c.iter())
        .filter(|s| s.is_finite())
        .fold(0.0f32, |acc, s| acc.max(s.abs()))
}

fn peak_to_db(peak: f32) -> f32 {
    if peak > 1e-5 {
        lin_to_db(peak, 1e-5)
    } else {
        SILENCE_DB
    }
}

/// Display-rate smoother for a meter reading.
///
/// Runs at the UI refresh rate, not the audio rate: each [`MeterSmoother::tick`]
/// moves the shown value a fixed fraction of the way toward the latest target.
#[derive(Debug, Clone)]
pub struct MeterSmoother {
    current: f32,
    target: f32,
    speed: f32,
}

impl MeterSmoother {
    /// `speed` is the fraction of the remaining distance covered per tick.
    pub fn new(speed: f32) -> Self {
        Self {
            current: 0.0,
            target: 0.0,
            speed: speed.clamp(0.0, 1.0),
        }
    }

    pub const fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    pub fn tick(&mut self) -> f32 {
        if self.target.is_finite() {
            self.current = self.speed.mul_add(self.target - self.current, self.current);
        }
        self.current
    }

    pub const fn value(&self) -> f32 {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meter_publishes_readings() {
        let (meter, handle) = Meter::new();
        assert_eq!(handle.get_info(), MeterInfo::default());

        meter.publish(1.0, 0.1, 6.0);
        let info = handle.get_info();
        assert_eq!(info.gain_reduction_db, -6.0);
        assert!(info.input_peak_db.abs() < 1e-5);
        assert!((info.output_peak_db + 20.0).abs() < 1e-4);

        meter.reset();
        assert_eq!(handle.get_info(), MeterInfo::default());
    }

    #[test]
    fn silence_reads_as_floor() {
        let (meter, handle) = Meter::new();
        meter.publish(0.0, 0.0, 0.0);
        assert_eq!(handle.get_info().input_peak_db, SILENCE_DB);
    }

    #[test]
    fn block_peak_skips_nan() {
        let mut a = [0.1, f32::NAN, -0.7];
        let mut b = [0.3, 0.2, f32::INFINITY];
        assert_eq!(block_peak(&[&mut a[..], &mut b[..]]), 0.7);
    }

    #[test]
    fn smoother_converges_without_overshoot() {
        let mut s = MeterSmoother::new(0.25);
        s.set_target(-12.0);
        let mut prev = s.value();
        for _ in 0..100 {
            let v = s.tick();
            assert!(v <= prev && v >= -12.0);
            prev = v;
        }
        assert!((s.value() + 12.0).abs() < 1e-3);
    }
}
