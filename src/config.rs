//! Layered settings - embedded defaults overlaid by the user's config file
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::audio::DEFAULT_GAIN;
use crate::error::{Error, Result};
use crate::grid::{Grid, Sequence, DEFAULT_CELL_SIZE};
use crate::playback::DEFAULT_STEP_INTERVAL;
use crate::sort::Algorithm;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

#[derive(Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    layout: LayoutConfig,
    #[serde(default)]
    playback: PlaybackConfig,
    #[serde(default)]
    sequence: SequenceConfig,
}

#[derive(Deserialize, Default)]
struct LayoutConfig {
    cell_size: Option<u32>,
}

#[derive(Deserialize, Default)]
struct PlaybackConfig {
    step_interval_ms: Option<u64>,
    gain: Option<f32>,
    algorithm: Option<String>,
}

#[derive(Deserialize, Default)]
struct SequenceConfig {
    initial: Option<String>,
}

/// Resolved settings. Fields that fail to parse fall back to the defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub cell_size: u32,
    pub step_interval: Duration,
    pub gain: f32,
    pub algorithm: Algorithm,
    pub initial: Sequence,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cell_size: DEFAULT_CELL_SIZE,
            step_interval: DEFAULT_STEP_INTERVAL,
            gain: DEFAULT_GAIN,
            algorithm: Algorithm::Bubble,
            initial: Sequence::default(),
        }
    }
}

impl Config {
    /// Embedded defaults overlaid with the user's config file, if any.
    pub fn load() -> Self {
        let mut config = Config::default();
        match toml::from_str::<ConfigFile>(DEFAULT_CONFIG) {
            Ok(base) => config.apply(base),
            Err(e) => log::warn!(target: "config", "embedded config.toml is invalid: {}", e),
        }

        if let Some(path) = user_config_path() {
            if path.exists() {
                match std::fs::read_to_string(&path) {
                    Ok(contents) => match toml::from_str::<ConfigFile>(&contents) {
                        Ok(user) => config.apply(user),
                        Err(e) => {
                            log::warn!(target: "config", "ignoring malformed config {}: {}", path.display(), e)
                        }
                    },
                    Err(e) => {
                        log::warn!(target: "config", "could not read config {}: {}", path.display(), e)
                    }
                }
            }
        }
        config
    }

    /// Parses a config document over the defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| Error::Config(e.to_string()))?;
        let mut config = Config::default();
        config.apply(file);
        Ok(config)
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.initial.clone(), self.cell_size)
    }

    fn apply(&mut self, file: ConfigFile) {
        match file.layout.cell_size {
            Some(0) => log::warn!(target: "config", "cell_size must be positive, keeping {}", self.cell_size),
            Some(size) => self.cell_size = size,
            None => {}
        }

        if let Some(ms) = file.playback.step_interval_ms {
            self.step_interval = Duration::from_millis(ms);
        }
        if let Some(gain) = file.playback.gain {
            self.gain = gain.clamp(0.0, 1.0);
        }
        if let Some(name) = file.playback.algorithm {
            match name.parse() {
                Ok(algorithm) => self.algorithm = algorithm,
                Err(e) => log::warn!(target: "config", "{}, keeping {}", e, self.algorithm),
            }
        }
        if let Some(initial) = file.sequence.initial {
            match initial.parse() {
                Ok(sequence) => self.initial = sequence,
                Err(e) => log::warn!(target: "config", "bad initial sequence: {}", e),
            }
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("music-sort").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_config_matches_defaults() {
        let config = Config::from_toml_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.grid().width(), 350);
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_toml_str(
            "[playback]\nstep_interval_ms = 250\nalgorithm = \"selection\"\n",
        )
        .unwrap();
        assert_eq!(config.step_interval, Duration::from_millis(250));
        assert_eq!(config.algorithm, Algorithm::Selection);
        assert_eq!(config.cell_size, DEFAULT_CELL_SIZE);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_toml_str(
            "[layout]\ncell_size = 0\n[playback]\nalgorithm = \"quick\"\n[sequence]\ninitial = \"xyz\"\n",
        )
        .unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_document_is_error() {
        assert!(matches!(
            Config::from_toml_str("[layout\n"),
            Err(Error::Config(_))
        ));
    }
}
