use anyhow::{Context, Result};
use serde::Deserialize;

use crate::core::domain::{Corridor, Intersection, TravelSpeeds};

/// Corridor document shared by the JSON and TOML formats.
///
/// Besides the fields of [`Corridor`], a document may carry a single `speed`
/// (km/h, both directions) and a separate `offsets` array, which is how
/// optimised offsets are written back by the planning UI.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorridorDocument {
    pub intersections: Vec<Intersection>,
    #[serde(default)]
    pub cycle_time: Option<f64>,
    #[serde(default)]
    pub speeds: Option<TravelSpeeds>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub offsets: Option<Vec<f64>>,
}

impl CorridorDocument {
    /// Convert the document into a domain corridor, applying `offsets` if present.
    pub fn into_corridor(self) -> Result<Corridor> {
        let mut corridor = Corridor::new(self.intersections);
        corridor.cycle_time = self.cycle_time;
        corridor.speeds = self.speeds.or(self.speed.map(TravelSpeeds::uniform));

        match self.offsets {
            Some(offsets) => corridor
                .with_offsets(&offsets)
                .context("Offsets do not match the intersections"),
            None => Ok(corridor),
        }
    }
}
