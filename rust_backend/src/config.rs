//! Engine configuration file support.
//!
//! This module reads analysis defaults from a `greenwave.toml` file. Every
//! section is optional; missing values fall back to the built-in defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::algorithms::{AnalysisOptions, PhaseSelection};
use crate::core::domain::{Direction, TravelSpeeds, DEFAULT_SPEED_KMH};
use crate::core::error::{EngineError, EngineResult};

/// Engine configuration from file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub speeds: SpeedSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub display: DisplaySettings,
    #[serde(default)]
    pub oracle: OracleSettings,
}

/// Default travel speeds, used when a corridor carries none.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedSettings {
    #[serde(default = "default_speed")]
    pub upstream_kmh: f64,
    #[serde(default = "default_speed")]
    pub downstream_kmh: f64,
}

/// Analysis settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSettings {
    #[serde(default)]
    pub phase_selection: PhaseSelection,
}

/// Line colours for the time-distance chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_upstream_color")]
    pub upstream_color: String,
    #[serde(default = "default_downstream_color")]
    pub downstream_color: String,
}

/// Remote offset oracle settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleSettings {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_speed() -> f64 {
    DEFAULT_SPEED_KMH
}

fn default_upstream_color() -> String {
    "#4caf50".to_string()
}

fn default_downstream_color() -> String {
    "#2196f3".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for SpeedSettings {
    fn default() -> Self {
        Self {
            upstream_kmh: default_speed(),
            downstream_kmh: default_speed(),
        }
    }
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            upstream_color: default_upstream_color(),
            downstream_color: default_downstream_color(),
        }
    }
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DisplaySettings {
    pub fn color_for(&self, direction: Direction) -> &str {
        match direction {
            Direction::Upstream => &self.upstream_color,
            Direction::Downstream => &self.downstream_color,
        }
    }
}

impl OracleSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl EngineConfig {
    /// Load engine configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(EngineConfig)` if successful
    /// * `Err(EngineError::ConfigurationError)` if the file cannot be read, parsed or is invalid
    pub fn from_file<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            EngineError::ConfigurationError(format!("Failed to read config file: {}", e))
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse engine configuration from TOML text.
    pub fn from_toml_str(content: &str) -> EngineResult<Self> {
        let config: EngineConfig = toml::from_str(content).map_err(|e| {
            EngineError::ConfigurationError(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// First existing `greenwave.toml` among the standard locations.
    pub fn locate_default() -> Option<PathBuf> {
        [
            PathBuf::from("greenwave.toml"),
            PathBuf::from("rust_backend/greenwave.toml"),
            PathBuf::from("../greenwave.toml"),
        ]
        .into_iter()
        .find(|path| path.exists())
    }

    /// Configured default speeds.
    pub fn default_speeds(&self) -> TravelSpeeds {
        TravelSpeeds::new(self.speeds.upstream_kmh, self.speeds.downstream_kmh)
    }

    /// Options handed to the bandwidth algorithms.
    pub fn to_analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions::default()
            .with_default_speeds(self.default_speeds())
            .with_phase_selection(self.analysis.phase_selection)
    }

    fn validate(&self) -> EngineResult<()> {
        for (key, value) in [
            ("speeds.upstream_kmh", self.speeds.upstream_kmh),
            ("speeds.downstream_kmh", self.speeds.downstream_kmh),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(EngineError::ConfigurationError(format!(
                    "'{}' must be a positive number, got {}",
                    key, value
                )));
            }
        }

        if self.oracle.timeout_secs == 0 {
            return Err(EngineError::ConfigurationError(
                "'oracle.timeout_secs' must be at least 1".to_string(),
            ));
        }

        if let Some(endpoint) = &self.oracle.endpoint {
            if endpoint.trim().is_empty() {
                return Err(EngineError::ConfigurationError(
                    "'oracle.endpoint' must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }
}
