//! One-pass corridor analysis.
//!
//! [`analyze_corridor`] validates the corridor, runs the pairwise and chained
//! bandwidth computations for both directions and builds the chart lines.
//! Incomplete signal data never fails the report: a direction whose chain
//! misses a phase or cycle is reported as an empty band with a warning.

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::checksum::corridor_checksum;
use crate::algorithms::{
    build_diagonal_lines, calculate_corridor_bandwidth, chain_bandwidth, AnalysisOptions,
    BandwidthResult, ChainResult, DiagonalLine, DiagonalResult,
};
use crate::config::EngineConfig;
use crate::core::domain::{Corridor, Direction};
use crate::core::error::EngineResult;
use crate::preprocessing::{CorridorValidator, ValidationResult};

/// Everything the time-distance chart needs for one corridor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorridorReport {
    pub checksum: String,
    pub intersection_count: usize,
    pub bandwidth: BandwidthResult,
    pub diagonal: DiagonalResult,
    pub upstream: ChainResult,
    pub downstream: ChainResult,
    pub lines: Vec<DiagonalLine>,
    pub validation: ValidationResult,
    pub warnings: Vec<String>,
}

impl CorridorReport {
    pub fn chain(&self, direction: Direction) -> &ChainResult {
        match direction {
            Direction::Upstream => &self.upstream,
            Direction::Downstream => &self.downstream,
        }
    }

    /// Whether a continuous green wave exists in `direction`.
    pub fn has_green_wave(&self, direction: Direction) -> bool {
        self.chain(direction).is_feasible()
    }
}

/// Analyse a corridor with the given configuration.
///
/// # Errors
/// * `InvalidInput` when validation fails
/// * `ParseError` if the corridor cannot be fingerprinted
pub fn analyze_corridor(corridor: &Corridor, config: &EngineConfig) -> EngineResult<CorridorReport> {
    let options = config.to_analysis_options();
    let validation = CorridorValidator::ensure_valid(corridor, &options)?;
    let checksum = corridor_checksum(corridor)?;

    let bandwidth = calculate_corridor_bandwidth(corridor, &options)?;

    let mut warnings = Vec::new();
    let upstream = run_chain(corridor, Direction::Upstream, &options, &mut warnings)?;
    let downstream = run_chain(corridor, Direction::Downstream, &options, &mut warnings)?;
    let diagonal = DiagonalResult::from_chains(&upstream, &downstream);

    let mut lines = Vec::new();
    for chain in [&upstream, &downstream] {
        if let Some(cycle) = chart_cycle(corridor, chain.direction) {
            lines.extend(build_diagonal_lines(
                chain,
                cycle,
                config.display.color_for(chain.direction),
            ));
        }
    }

    info!(
        "Analysed corridor {} ({} intersections): local up={:?} down={:?}, diagonal up={:?} down={:?}",
        &checksum[..12],
        corridor.len(),
        bandwidth.up,
        bandwidth.down,
        diagonal.width(Direction::Upstream),
        diagonal.width(Direction::Downstream)
    );

    Ok(CorridorReport {
        checksum,
        intersection_count: corridor.len(),
        bandwidth,
        diagonal,
        upstream,
        downstream,
        lines,
        validation,
        warnings,
    })
}

fn run_chain(
    corridor: &Corridor,
    direction: Direction,
    options: &AnalysisOptions,
    warnings: &mut Vec<String>,
) -> EngineResult<ChainResult> {
    match chain_bandwidth(corridor, direction, options) {
        Ok(chain) => {
            if corridor.len() >= 2 && !chain.is_feasible() {
                warnings.push(format!("No continuous {} green wave", direction));
            }
            Ok(chain)
        }
        Err(err) if err.is_missing_data() => {
            warn!("Skipping {} chain: {}", direction, err);
            warnings.push(format!("{} chain skipped: {}", direction, err));
            Ok(ChainResult::empty(direction))
        }
        Err(err) => Err(err),
    }
}

/// The chart's time axis spans the cycle of the first intersection in travel order.
fn chart_cycle(corridor: &Corridor, direction: Direction) -> Option<f64> {
    corridor
        .travel_order(direction)
        .first()
        .and_then(|&index| corridor.cycle_for(index))
}
