use anyhow::Result;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use rustcomp::dsp::ChannelMode;
use rustcomp::params::CompressorParams;
use rustcomp::render::{RenderOptions, render_file};
use std::f32::consts::PI;
use std::path::Path;
use tempfile::TempDir;

const SAMPLE_RATE: u32 = 48_000;
const TEST_FREQ: f32 = 220.0;

/// One second of a full-scale sine followed by one second at `quiet`.
fn loud_then_quiet(quiet: f32) -> Vec<f32> {
    (0..SAMPLE_RATE as usize * 2)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let amp = if i < SAMPLE_RATE as usize { 1.0 } else { quiet };
            (2.0 * PI * TEST_FREQ * t).sin() * amp
        })
        .collect()
}

fn write_i16_stereo(path: &Path, mono: &[f32]) -> Result<()> {
    let spec = WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &s in mono {
        let v = (s * i16::MAX as f32) as i16;
        writer.write_sample(v)?;
        writer.write_sample(v)?;
    }
    writer.finalize()?;
    Ok(())
}

#[test]
fn renders_int16_stereo() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out").join("compressed.wav");
    let quiet = 0.05;
    let signal = loud_then_quiet(quiet);
    write_i16_stereo(&input, &signal)?;

    let report = render_file(&input, &output, &RenderOptions::default())?;
    assert_eq!(report.frames, signal.len());
    assert_eq!(report.channels, 2);
    assert_eq!(report.sample_rate, SAMPLE_RATE);
    assert!(report.input_peak_db > -0.1);
    assert!(report.output_peak_db < report.input_peak_db);
    assert!(report.max_gain_reduction_db > 10.0);

    let mut reader = WavReader::open(&output)?;
    assert_eq!(reader.spec().bits_per_sample, 16);
    assert_eq!(reader.spec().channels, 2);
    let samples: Vec<i16> = reader.samples::<i16>().collect::<Result<_, _>>()?;
    assert_eq!(samples.len(), signal.len() * 2);

    // Loud half is squashed well below full scale once the attack has settled.
    let settled = &samples[(SAMPLE_RATE as usize / 2) * 2..SAMPLE_RATE as usize * 2];
    let loud_peak = settled.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0);
    assert!(loud_peak < i16::MAX as u16 / 2, "loud peak {loud_peak}");

    // Quiet tail sits below threshold; once released it passes unchanged.
    let tail = &samples[samples.len() - 2_000..];
    let tail_peak = tail.iter().map(|s| s.unsigned_abs()).max().unwrap_or(0) as f32;
    let expected = quiet * i16::MAX as f32;
    assert!((tail_peak - expected).abs() < 4.0, "tail peak {tail_peak} vs {expected}");

    Ok(())
}

#[test]
fn renders_float_mono_linked() -> Result<()> {
    let dir = TempDir::new()?;
    let input = dir.path().join("in.wav");
    let output = dir.path().join("out.wav");

    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };
    let signal = loud_then_quiet(0.01);
    let mut writer = WavWriter::create(&input, spec)?;
    for &s in &signal {
        writer.write_sample(s)?;
    }
    writer.finalize()?;

    let options = RenderOptions {
        params: CompressorParams {
            threshold_db: -30.0,
            ratio: 10.0,
            ..CompressorParams::default()
        },
        mode: ChannelMode::Linked,
        ..RenderOptions::default()
    };
    let report = render_file(&input, &output, &options)?;
    assert!(report.max_gain_reduction_db > 20.0);

    let mut reader = WavReader::open(&output)?;
    assert_eq!(reader.spec(), spec);
    let out: Vec<f32> = reader.samples::<f32>().collect::<Result<_, _>>()?;
    assert_eq!(out.len(), signal.len());
    assert!(out.iter().all(|s| s.abs() <= 0.95));
    Ok(())
}

#[test]
fn missing_input_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = render_file(
        &dir.path().join("missing.wav"),
        &dir.path().join("out.wav"),
        &RenderOptions::default(),
    );
    assert!(result.is_err());
}
