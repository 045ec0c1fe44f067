use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use log::{info, warn};
use rustcomp::analysis::{DEFAULT_LEVELS_DB, is_extreme, transfer_curve};
use rustcomp::config::CompressorConfig;
use rustcomp::dsp::ChannelMode;
use rustcomp::params::CompressorParams;
use rustcomp::preset::{Manager, Preset};
use rustcomp::render::{RenderOptions, render_file};
use rustcomp::settings::Settings;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "rustcomp")]
#[command(version)]
#[command(about = "A feed-forward dynamics compressor for WAV files.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a WAV file
    Render {
        input: PathBuf,
        #[arg(short, long, help = "Output WAV path")]
        output: Option<PathBuf>,
        #[arg(long, env = "RUSTCOMP_PRESET", help = "Start from a saved preset")]
        preset: Option<String>,
        #[arg(long, value_enum, help = "Independent or stereo-linked channels")]
        mode: Option<ChannelMode>,
        #[arg(long, help = "Use the classic k = 1 envelope tuning")]
        classic: bool,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Print the static transfer curve of a parameter set
    Curve {
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        levels: Vec<f32>,
        #[command(flatten)]
        params: ParamArgs,
    },
    /// Manage saved presets
    Preset {
        #[command(subcommand)]
        action: PresetAction,
    },
}

#[derive(Subcommand, Debug)]
enum PresetAction {
    List,
    Save {
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[command(flatten)]
        params: ParamArgs,
    },
    Delete {
        name: String,
    },
}

#[derive(Args, Debug, Default)]
struct ParamArgs {
    #[arg(long, allow_negative_numbers = true, help = "Threshold in dB")]
    threshold: Option<f32>,
    #[arg(long, help = "Ratio N for N:1")]
    ratio: Option<f32>,
    #[arg(long, help = "Attack time in ms")]
    attack: Option<f32>,
    #[arg(long, help = "Release time in ms")]
    release: Option<f32>,
    #[arg(long, allow_negative_numbers = true, help = "Makeup gain in dB")]
    makeup: Option<f32>,
}

impl ParamArgs {
    fn apply(&self, base: CompressorParams, config: &CompressorConfig) -> CompressorParams {
        CompressorParams {
            threshold_db: self.threshold.unwrap_or(base.threshold_db),
            ratio: self.ratio.unwrap_or(base.ratio),
            attack_ms: self.attack.unwrap_or(base.attack_ms),
            release_ms: self.release.unwrap_or(base.release_ms),
            makeup_db: self.makeup.unwrap_or(base.makeup_db),
        }
        .clamped(&config.ranges)
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    info!("rustcomp v{}", env!("CARGO_PKG_VERSION"));

    let settings = Settings::load().context("failed to load settings")?;
    info!("Settings:\n{settings}");

    match cli.command {
        Command::Render {
            input,
            output,
            preset,
            mode,
            classic,
            params,
        } => {
            let config = if classic {
                CompressorConfig {
                    ranges: settings.tuning.ranges,
                    ..CompressorConfig::classic()
                }
            } else {
                settings.tuning
            };

            let preset = preset.or_else(|| settings.selected_preset.clone());
            let base = match preset {
                Some(name) => {
                    let manager = Manager::new(&settings.preset_dir)?;
                    match manager.get_preset_by_name(&name) {
                        Some(p) => p.params,
                        None => bail!("preset '{name}' not found in {}", settings.preset_dir),
                    }
                }
                None => settings.params,
            };

            let options = RenderOptions {
                params: params.apply(base, &config),
                config,
                mode: mode.unwrap_or(settings.channel_mode),
            };
            if is_extreme(&options.params) {
                warn!("Attack/release/ratio are extreme; expect waveform distortion");
            }

            let output = output.unwrap_or_else(|| default_output(&input, &settings.output_dir));
            let report = render_file(&input, &output, &options).with_context(|| {
                format!("failed to render '{}'", input.display())
            })?;
            println!("{report}");
        }
        Command::Curve { levels, params } => {
            let params = params.apply(settings.params, &settings.tuning);
            let levels = if levels.is_empty() {
                DEFAULT_LEVELS_DB.to_vec()
            } else {
                levels
            };

            println!("{params}");
            if is_extreme(&params) {
                println!("Extreme settings: the envelope will follow the waveform");
            }
            println!("{:>10} {:>12} {:>10}", "input dB", "reduction dB", "output dB");
            for point in transfer_curve(&params, settings.tuning.max_reduction_db, &levels) {
                println!(
                    "{:>10.1} {:>12.1} {:>10.1}",
                    point.input_db, point.gain_reduction_db, point.output_db
                );
            }
        }
        Command::Preset { action } => {
            let mut manager = Manager::new(&settings.preset_dir)?;
            match action {
                PresetAction::List => {
                    for preset in manager.get_presets() {
                        println!("{preset}");
                    }
                }
                PresetAction::Save {
                    name,
                    description,
                    author,
                    params,
                } => {
                    let mut preset =
                        Preset::new(name, params.apply(settings.params, &settings.tuning));
                    if let Some(description) = description {
                        preset = preset.with_description(description);
                    }
                    if let Some(author) = author {
                        preset = preset.with_author(author);
                    }
                    manager.save_preset(&preset)?;
                    info!("Saved preset '{}'", preset.name);
                }
                PresetAction::Delete { name } => {
                    manager.delete_preset(&name)?;
                    info!("Deleted preset '{name}'");
                }
            }
        }
    }

    Ok(())
}

fn default_output(input: &Path, output_dir: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("render");
    PathBuf::from(output_dir).join(format!(
        "{stem}_compressed_{}.wav",
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ))
}
