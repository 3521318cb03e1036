//! Bandwidth algorithms for green-wave corridors.
//!
//! # Components
//!
//! - [`local_bandwidth`]: Pairwise platoon bandwidth between adjacent intersections
//! - [`chain`]: Corridor-wide diagonal band by chained interval propagation
//! - [`diagonal`]: Display lines for the band edges, split at the cycle seam
//!
//! # Example
//!
//! ```
//! use greenwave_rust::algorithms::{calculate_corridor_bandwidth, AnalysisOptions};
//! use greenwave_rust::core::domain::{Corridor, Direction, GreenPhase, Intersection};
//!
//! let corridor = Corridor::new(vec![
//!     Intersection::new(0.0).with_phase(GreenPhase::new(Direction::Upstream, 0.0, 40.0)),
//!     Intersection::new(0.0).with_phase(GreenPhase::new(Direction::Upstream, 0.0, 40.0)),
//! ])
//! .with_cycle_time(100.0);
//!
//! let result = calculate_corridor_bandwidth(&corridor, &AnalysisOptions::default()).unwrap();
//! assert_eq!(result.up, Some(40.0));
//! assert_eq!(result.down, None);
//! ```

pub mod chain;
pub mod diagonal;
pub mod local_bandwidth;

use serde::{Deserialize, Serialize};

use crate::core::domain::{Corridor, Direction, GreenPhase, Intersection, TravelSpeeds};
use crate::core::error::{EngineError, EngineResult};

pub use chain::{
    chain_bandwidth, chain_bw_down, chain_bw_up, corridor_diagonal, BandPoint, ChainResult,
    DiagonalBand, DiagonalResult,
};
pub use diagonal::{
    build_diagonal_lines, split_at_cycle_boundary, BandEdge, DiagonalLine, LinePoint, LineSegment,
};
pub use local_bandwidth::{calculate_corridor_bandwidth, BandwidthResult};

/// Which green phases of a direction take part in a computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseSelection {
    /// Only the first declared phase per direction.
    #[default]
    FirstOnly,
    /// Every declared phase; the best combination wins.
    BestPair,
}

/// Tunables shared by every bandwidth algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AnalysisOptions {
    pub default_speeds: TravelSpeeds,
    pub phase_selection: PhaseSelection,
}

impl AnalysisOptions {
    pub fn with_phase_selection(mut self, phase_selection: PhaseSelection) -> Self {
        self.phase_selection = phase_selection;
        self
    }

    pub fn with_default_speeds(mut self, speeds: TravelSpeeds) -> Self {
        self.default_speeds = speeds;
        self
    }

    pub(crate) fn phases_for<'a>(
        &self,
        node: &'a Intersection,
        direction: Direction,
    ) -> Vec<&'a GreenPhase> {
        match self.phase_selection {
            PhaseSelection::FirstOnly => node.first_phase(direction).into_iter().collect(),
            PhaseSelection::BestPair => node.phases(direction).collect(),
        }
    }
}

/// Reject corridor data the algorithms cannot place on a cycle.
///
/// Distances must be finite, non-negative and non-decreasing. Offsets and phase
/// starts must be finite, and every duration must lie in `(0, cycle]`. A missing or malformed cycle is
/// left to [`checked_cycle`] so pairs without one are still skipped.
pub(crate) fn check_corridor_data(corridor: &Corridor) -> EngineResult<()> {
    let mut previous: Option<f64> = None;

    for (index, node) in corridor.intersections.iter().enumerate() {
        if !node.distance.is_finite() || node.distance < 0.0 {
            return Err(EngineError::InvalidInput(format!(
                "distance at intersection #{} must be a non-negative number, got {}",
                index, node.distance
            )));
        }
        if let Some(previous) = previous.filter(|&previous| node.distance < previous) {
            return Err(EngineError::InvalidInput(format!(
                "distance at intersection #{} is smaller than the previous {}",
                index, previous
            )));
        }
        previous = Some(node.distance);

        if !node.offset.is_finite() {
            return Err(EngineError::InvalidInput(format!(
                "offset at intersection #{} is not a finite number",
                index
            )));
        }

        let cycle = corridor
            .cycle_for(index)
            .filter(|cycle| cycle.is_finite() && *cycle > 0.0);
        for phase in &node.green_phases {
            if !phase.start_time.is_finite() {
                return Err(EngineError::InvalidInput(format!(
                    "{} phase start at intersection #{} is not a finite number",
                    phase.direction, index
                )));
            }
            let in_range = phase.duration.is_finite()
                && phase.duration > 0.0
                && cycle.map_or(true, |cycle| phase.duration <= cycle);
            if !in_range {
                return Err(EngineError::InvalidInput(format!(
                    "{} phase duration at intersection #{} must lie in (0, cycle], got {}",
                    phase.direction, index, phase.duration
                )));
            }
        }
    }
    Ok(())
}

/// Speed for traffic leaving `index`, rejected unless finite and positive.
pub(crate) fn checked_speed(
    corridor: &Corridor,
    index: usize,
    direction: Direction,
    options: &AnalysisOptions,
) -> EngineResult<f64> {
    let speed = corridor.speed_for(index, direction, &options.default_speeds);
    if !speed.is_finite() || speed <= 0.0 {
        return Err(EngineError::InvalidInput(format!(
            "{} speed at intersection #{} must be positive, got {}",
            direction, index, speed
        )));
    }
    Ok(speed)
}

/// Cycle of `index` if defined, rejected unless finite and positive.
pub(crate) fn checked_cycle(corridor: &Corridor, index: usize) -> EngineResult<Option<f64>> {
    match corridor.cycle_for(index) {
        Some(cycle) if !cycle.is_finite() || cycle <= 0.0 => Err(EngineError::InvalidInput(
            format!("cycle time at intersection #{} must be positive, got {}", index, cycle),
        )),
        other => Ok(other),
    }
}
