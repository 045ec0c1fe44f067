use super::Preset;
use anyhow::{Context, Result, bail};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

pub struct Manager {
    presets_dir: PathBuf,
    presets: Vec<Preset>,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(preset_dir: P) -> Result<Self> {
        let presets_dir = preset_dir.as_ref().to_path_buf();
        fs::create_dir_all(&presets_dir).context("Failed to create presets directory")?;

        let mut manager = Self {
            presets_dir,
            presets: Vec::new(),
        };

        manager.load_presets()?;

        Ok(manager)
    }

    pub fn load_presets(&mut self) -> Result<()> {
        self.presets.clear();

        if !self.presets_dir.exists() {
            return Ok(());
        }

        for entry in fs::read_dir(&self.presets_dir)? {
            let path = entry?.path();

            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                match load_preset_file(&path) {
                    Ok(preset) => self.presets.push(preset),
                    Err(e) => {
                        warn!("Failed to load preset {}: {e:#}", path.display());
                    }
                }
            }
        }

        self.presets.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(
            "Loaded {} presets from {}",
            self.presets.len(),
            self.presets_dir.display()
        );

        Ok(())
    }

    pub fn save_preset(&mut self, preset: &Preset) -> Result<()> {
        if preset.name.trim().is_empty() {
            bail!("Preset name must not be empty");
        }
        let path = self.preset_path(&preset.name);

        let json = serde_json::to_string_pretty(preset).context("Failed to serialize preset")?;
        fs::write(&path, json).context("Failed to write preset file")?;

        self.load_presets()
    }

    pub fn delete_preset(&mut self, preset_name: &str) -> Result<()> {
        let path = self.preset_path(preset_name);

        if path.exists() {
            fs::remove_file(&path).context("Failed to delete preset file")?;
            self.load_presets()
        } else {
            Err(anyhow::anyhow!("Preset file not found: {preset_name}"))
        }
    }

    pub fn preset_exists(&self, name: &str) -> bool {
        self.presets.iter().any(|p| p.name == name)
    }

    pub fn get_presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn get_preset_by_name(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    fn preset_path(&self, name: &str) -> PathBuf {
        self.presets_dir
            .join(format!("{}.json", sanitize_filename(name)))
    }
}

fn load_preset_file(path: &Path) -> Result<Preset> {
    let content = fs::read_to_string(path).context("Failed to read preset file")?;

    serde_json::from_str(&content).context("Failed to parse preset JSON")
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::CompressorParams;
    use tempfile::TempDir;

    #[test]
    fn save_load_delete() -> Result<()> {
        let dir = TempDir::new()?;
        let mut manager = Manager::new(dir.path())?;
        assert!(manager.get_presets().is_empty());

        let params = CompressorParams {
            threshold_db: -30.0,
            ratio: 8.0,
            ..CompressorParams::default()
        };
        let preset = Preset::new("Vocal Leveler", params).with_author("tester");
        manager.save_preset(&preset)?;

        assert!(dir.path().join("Vocal_Leveler.json").exists());
        assert!(manager.preset_exists("Vocal Leveler"));
        assert_eq!(manager.get_preset_by_name("Vocal Leveler"), Some(&preset));

        // A fresh manager sees the same file.
        let reloaded = Manager::new(dir.path())?;
        assert_eq!(reloaded.get_presets().len(), 1);

        manager.delete_preset("Vocal Leveler")?;
        assert!(!manager.preset_exists("Vocal Leveler"));
        assert!(manager.delete_preset("Vocal Leveler").is_err());
        Ok(())
    }

    #[test]
    fn broken_files_are_skipped() -> Result<()> {
        let dir = TempDir::new()?;
        fs::write(dir.path().join("broken.json"), "{ not json")?;
        fs::write(dir.path().join("notes.txt"), "ignored")?;

        let mut manager = Manager::new(dir.path())?;
        manager.save_preset(&Preset::new("Init", CompressorParams::default()))?;
        assert_eq!(manager.get_presets().len(), 1);
        Ok(())
    }

    #[test]
    fn presets_are_sorted_by_name() -> Result<()> {
        let dir = TempDir::new()?;
        let mut manager = Manager::new(dir.path())?;
        for name in ["Drums", "Bass", "Mix Bus"] {
            manager.save_preset(&Preset::new(name, CompressorParams::default()))?;
        }
        let names: Vec<&str> = manager.get_presets().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Bass", "Drums", "Mix Bus"]);
        Ok(())
    }

    #[test]
    fn blank_names_are_rejected() -> Result<()> {
        let dir = TempDir::new()?;
        let mut manager = Manager::new(dir.path())?;
        assert!(manager.save_preset(&Preset::new("  ", CompressorParams::default())).is_err());
        assert!(manager.get_presets().is_empty());
        Ok(())
    }

    #[test]
    fn sanitizes_names() {
        assert_eq!(sanitize_filename("a/b c.d"), "a_b_c_d");
    }
}
