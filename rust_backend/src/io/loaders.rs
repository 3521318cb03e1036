use anyhow::{Context, Result};
use std::path::Path;

use crate::core::domain::Corridor;
use crate::parsing::json_parser;
use crate::parsing::toml_parser;

/// Represents the source format of corridor data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorridorSourceType {
    Json,
    Toml,
}

impl CorridorSourceType {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .context("File has no extension")?;

        match extension.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            _ => anyhow::bail!("Unsupported file format: {}", extension),
        }
    }
}

/// Result of loading corridor data
#[derive(Debug, Clone)]
pub struct CorridorLoadResult {
    pub corridor: Corridor,
    pub source_type: CorridorSourceType,
    pub num_intersections: usize,
}

impl CorridorLoadResult {
    pub fn new(corridor: Corridor, source_type: CorridorSourceType) -> Self {
        let num_intersections = corridor.len();
        Self {
            corridor,
            source_type,
            num_intersections,
        }
    }
}

/// Unified interface for loading corridors from JSON or TOML
pub struct CorridorLoader;

impl CorridorLoader {
    /// Load a corridor from a file (auto-detects JSON or TOML)
    pub fn load_from_file(path: &Path) -> Result<CorridorLoadResult> {
        match CorridorSourceType::from_path(path)? {
            CorridorSourceType::Json => Self::load_from_json(path),
            CorridorSourceType::Toml => Self::load_from_toml(path),
        }
    }

    /// Load a corridor from a JSON file
    pub fn load_from_json(json_path: &Path) -> Result<CorridorLoadResult> {
        let corridor =
            json_parser::parse_corridor_json(json_path).context("Failed to parse JSON file")?;

        log::debug!(
            "Loaded {} intersections from {}",
            corridor.len(),
            json_path.display()
        );
        Ok(CorridorLoadResult::new(corridor, CorridorSourceType::Json))
    }

    /// Load a corridor from a JSON string
    pub fn load_from_json_str(json_str: &str) -> Result<CorridorLoadResult> {
        let corridor = json_parser::parse_corridor_json_str(json_str)
            .context("Failed to parse JSON string")?;

        Ok(CorridorLoadResult::new(corridor, CorridorSourceType::Json))
    }

    /// Load a corridor from a TOML file
    pub fn load_from_toml(toml_path: &Path) -> Result<CorridorLoadResult> {
        let corridor =
            toml_parser::parse_corridor_toml(toml_path).context("Failed to parse TOML file")?;

        log::debug!(
            "Loaded {} intersections from {}",
            corridor.len(),
            toml_path.display()
        );
        Ok(CorridorLoadResult::new(corridor, CorridorSourceType::Toml))
    }

    /// Load a corridor from a TOML string
    pub fn load_from_toml_str(toml_str: &str) -> Result<CorridorLoadResult> {
        let corridor = toml_parser::parse_corridor_toml_str(toml_str)
            .context("Failed to parse TOML string")?;

        Ok(CorridorLoadResult::new(corridor, CorridorSourceType::Toml))
    }
}
