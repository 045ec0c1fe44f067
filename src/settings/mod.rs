use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::CompressorConfig;
use crate::dsp::ChannelMode;
use crate::params::CompressorParams;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Parameters used when neither a preset nor flags override them.
    pub params: CompressorParams,
    pub tuning: CompressorConfig,
    pub channel_mode: ChannelMode,
    pub preset_dir: String,
    pub output_dir: String,
    pub selected_preset: Option<String>,
}

impl std::fmt::Display for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "------------------------------")?;
        writeln!(f, "Parameters: {}", self.params)?;
        writeln!(f, "Channel Mode: {}", self.channel_mode)?;
        writeln!(
            f,
            "Limiter: {:.2} threshold, {:.2} drive",
            self.tuning.limiter_threshold, self.tuning.limiter_drive
        )?;
        writeln!(f, "Preset Directory: {}", self.preset_dir)?;
        writeln!(f, "Output Directory: {}", self.output_dir)?;
        writeln!(
            f,
            "Selected Preset: {}",
            self.selected_preset.as_deref().unwrap_or("None")
        )?;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            params: CompressorParams::default(),
            tuning: CompressorConfig::default(),
            channel_mode: ChannelMode::Independent,
            preset_dir: "./presets".to_string(),
            output_dir: "./renders".to_string(),
            selected_preset: None,
        }
    }
}

impl Settings {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_settings_path())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_settings_path())
    }

    /// Reads settings from `path`, writing defaults there when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path).context("Failed to read settings file")?;
            let settings: Self =
                serde_json::from_str(&contents).context("Failed to parse settings")?;
            settings
                .tuning
                .validate()
                .context("Invalid tuning in settings")?;
            debug!("Loaded settings from {}", path.display());
            Ok(settings)
        } else {
            info!("No settings file found, using defaults");
            let settings = Self::default();
            // Try to save defaults, but don't fail if we can't
            let _ = settings.save_to(path);
            Ok(settings)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, json).context("Failed to write settings file")?;

        debug!("Saved settings to {}", path.display());
        Ok(())
    }

    fn get_settings_path() -> PathBuf {
        const SETTINGS_FILENAME: &str = "settings.json";

        // Try to use XDG config directory on Linux
        if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(config_dir)
                .join("rustcomp")
                .join(SETTINGS_FILENAME)
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("rustcomp")
                .join(SETTINGS_FILENAME)
        } else {
            // Fallback to current directory
            PathBuf::from(".").join(SETTINGS_FILENAME)
        }
    }
}
