//! # Configuration System
//!
//! YAML configuration for the MIMO simulator:
//!
//! - Link settings (channel spread, equalizer policy, seed)
//! - Test schedule (built-in sweep or a single custom configuration)
//! - Output locations (recovered payload files, CSV summary)
//! - Logging
//!
//! ## Configuration Search Path
//!
//! Configuration is loaded from the first file found:
//! 1. Path specified via `MIMO_CONFIG` environment variable
//! 2. `./mimo.yaml` (current directory)
//! 3. `~/.config/mimo/config.yaml` (user config)
//! 4. `/etc/mimo/config.yaml` (system config)
//!
//! ## Example Configuration
//!
//! ```yaml
//! link:
//!   channel_sigma: 1.0
//!   seed: 42
//!   zero_singular_value:
//!     mode: clamp
//!     epsilon: 1.0e-9
//!
//! schedule:
//!   mode: custom
//!   tests: 4
//!   nr: 8
//!   nt: 4
//!   noise_level: 2
//!
//! output:
//!   directory: results
//!   write_files: false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::observe::LogConfig;
use crate::pipeline::ZeroSingularValuePolicy;

/// Largest number of tests a run may request.
pub const MAX_TESTS: usize = 61;

/// Error type for configuration operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("config not found: {0}")]
    NotFound(String),
    #[error("failed to read config: {0}")]
    ReadError(String),
    #[error("failed to parse config: {0}")]
    ParseError(String),
    #[error("invalid config: {0}")]
    ValidationError(String),
}

/// Link configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Standard deviation of the channel coefficients
    pub channel_sigma: f64,
    /// Equalizer behavior on a zero singular value
    pub zero_singular_value: ZeroSingularValuePolicy,
    /// RNG seed; `None` seeds every test from OS entropy
    pub seed: Option<u64>,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            channel_sigma: 1.0,
            zero_singular_value: ZeroSingularValuePolicy::ZeroStream,
            seed: None,
        }
    }
}

/// How the per-test antenna configuration is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleMode {
    /// Built-in sweep from 2x4 up to 512x1024, noise level cycling 0..=3
    #[default]
    Default,
    /// The same `nr`, `nt`, `noise_level` for every test
    Custom,
}

impl std::str::FromStr for ScheduleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(ScheduleMode::Default),
            "custom" => Ok(ScheduleMode::Custom),
            other => Err(format!("unknown schedule mode '{}'", other)),
        }
    }
}

/// Test schedule configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub mode: ScheduleMode,
    /// Number of tests to run (1..=61)
    pub tests: usize,
    /// Receive antennas (custom mode)
    pub nr: usize,
    /// Transmit antennas (custom mode)
    pub nt: usize,
    /// Noise level selector 0..=3 (custom mode)
    pub noise_level: u8,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            mode: ScheduleMode::Default,
            tests: 36,
            nr: 4,
            nt: 4,
            noise_level: 0,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for recovered payload files
    pub directory: PathBuf,
    /// CSV summary, one line appended per test
    pub csv: PathBuf,
    /// Write the recovered payload of every test
    pub write_files: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            csv: PathBuf::from("output.csv"),
            write_files: true,
        }
    }
}

/// Complete simulator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MimoConfig {
    pub link: LinkConfig,
    pub schedule: ScheduleConfig,
    pub output: OutputConfig,
    pub logging: LogConfig,
}

impl Default for MimoConfig {
    fn default() -> Self {
        Self {
            link: LinkConfig::default(),
            schedule: ScheduleConfig::default(),
            output: OutputConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl MimoConfig {
    /// Load configuration from the default search path.
    ///
    /// Returns the default config if no file is found.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var("MIMO_CONFIG") {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(ConfigError::NotFound(path.display().to_string()));
            }
            return Self::load_from(&path);
        }

        for path in &Self::config_search_paths() {
            if path.exists() {
                return Self::load_from(path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        Self::parse(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            serde_yaml::to_string(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))
    }

    /// Get configuration search paths.
    pub fn config_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./mimo.yaml")];

        if let Some(dirs) = directories::ProjectDirs::from("", "", "mimo") {
            paths.push(dirs.config_dir().join("config.yaml"));
        }

        paths.push(PathBuf::from("/etc/mimo/config.yaml"));
        paths
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sigma = self.link.channel_sigma;
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(ConfigError::ValidationError(
                "channel_sigma must be positive".to_string(),
            ));
        }

        if let ZeroSingularValuePolicy::Clamp { epsilon } = self.link.zero_singular_value {
            if !epsilon.is_finite() || epsilon <= 0.0 {
                return Err(ConfigError::ValidationError(
                    "clamp epsilon must be positive".to_string(),
                ));
            }
        }

        if !(1..=MAX_TESTS).contains(&self.schedule.tests) {
            return Err(ConfigError::ValidationError(format!(
                "tests must be 1-{}",
                MAX_TESTS
            )));
        }

        if self.schedule.mode == ScheduleMode::Custom {
            if self.schedule.nr == 0 || self.schedule.nt == 0 {
                return Err(ConfigError::ValidationError(
                    "nr and nt must be > 0".to_string(),
                ));
            }
            if self.schedule.noise_level > 3 {
                return Err(ConfigError::ValidationError(
                    "noise_level must be 0-3".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Generate example configuration YAML.
    pub fn example_yaml() -> String {
        let config = Self {
            link: LinkConfig {
                seed: Some(42),
                ..Default::default()
            },
            schedule: ScheduleConfig {
                mode: ScheduleMode::Custom,
                tests: 4,
                nr: 8,
                nt: 4,
                noise_level: 2,
            },
            ..Default::default()
        };

        serde_yaml::to_string(&config).unwrap_or_default()
    }
}
