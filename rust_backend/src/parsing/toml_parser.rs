use anyhow::{Context, Result};
use std::path::Path;

use super::document::CorridorDocument;
use crate::core::domain::Corridor;

/// Parse a corridor TOML file.
pub fn parse_corridor_toml(toml_path: &Path) -> Result<Corridor> {
    let content = std::fs::read_to_string(toml_path)
        .with_context(|| format!("Failed to read TOML file: {}", toml_path.display()))?;

    parse_corridor_toml_str(&content)
}

/// Parse a corridor from a TOML string.
///
/// Uses the same camelCase keys as the JSON format, with intersections as an
/// array of tables:
///
/// ```
/// use greenwave_rust::parsing::parse_corridor_toml_str;
///
/// let corridor = parse_corridor_toml_str(r#"
///     cycleTime = 90.0
///     speed = 40.0
///
///     [[intersections]]
///     distance = 0.0
///     greenPhases = [{ direction = "upstream", startTime = 0.0, duration = 35.0 }]
///
///     [[intersections]]
///     distance = 250.0
///     offset = 22.0
///     greenPhases = [{ direction = "upstream", startTime = 0.0, duration = 35.0 }]
/// "#).unwrap();
///
/// assert_eq!(corridor.len(), 2);
/// assert_eq!(corridor.intersections[1].offset, 22.0);
/// ```
pub fn parse_corridor_toml_str(toml_str: &str) -> Result<Corridor> {
    let document: CorridorDocument =
        toml::from_str(toml_str).context("Failed to parse corridor TOML")?;

    document.into_corridor()
}
