//! Offset optimisation through an external oracle.
//!
//! The engine does not search for offsets itself. An [`OffsetOracle`] receives
//! the corridor and the objective weights and answers with one offset per
//! intersection; [`optimize_corridor`] applies them and re-runs the analysis.

use async_trait::async_trait;
use log::info;
use serde::{Deserialize, Serialize};

use super::checksum::corridor_checksum;
use super::corridor::{analyze_corridor, CorridorReport};
use super::weights::OptimizationWeights;
use crate::config::EngineConfig;
use crate::core::domain::Corridor;
use crate::core::error::{EngineError, EngineResult};
use crate::preprocessing::CorridorValidator;
use crate::time::normalize;

/// Payload sent to the oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationRequest {
    pub request_id: String,
    pub corridor: Corridor,
    pub weights: OptimizationWeights,
}

impl OptimizationRequest {
    pub fn new(corridor: &Corridor, weights: OptimizationWeights) -> EngineResult<Self> {
        Ok(Self {
            request_id: corridor_checksum(corridor)?,
            corridor: corridor.clone(),
            weights,
        })
    }
}

/// Oracle answer: one offset in seconds per intersection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResponse {
    pub offsets: Vec<f64>,
}

/// Source of optimised offsets.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait OffsetOracle: Send + Sync {
    /// Compute offsets for the requested corridor.
    ///
    /// # Returns
    /// * `Ok(OptimizationResponse)` - Complete set of offsets
    /// * `Err(EngineError::OracleError)` - If the oracle cannot answer
    async fn optimize(&self, request: &OptimizationRequest) -> EngineResult<OptimizationResponse>;
}

/// Oracle that always answers with the same offsets.
#[derive(Debug, Clone, Default)]
pub struct FixedOffsetsOracle {
    offsets: Vec<f64>,
}

impl FixedOffsetsOracle {
    pub fn new(offsets: Vec<f64>) -> Self {
        Self { offsets }
    }
}

#[async_trait]
impl OffsetOracle for FixedOffsetsOracle {
    async fn optimize(&self, _request: &OptimizationRequest) -> EngineResult<OptimizationResponse> {
        Ok(OptimizationResponse {
            offsets: self.offsets.clone(),
        })
    }
}

/// Corridor with oracle offsets applied and its fresh report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    pub offsets: Vec<f64>,
    pub corridor: Corridor,
    pub report: CorridorReport,
}

/// Ask `oracle` for offsets, apply them and analyse the result.
///
/// Offsets are rebased so the first intersection sits at zero, then folded
/// into each intersection's cycle.
///
/// # Errors
/// * `InvalidInput` if the corridor or weights are invalid
/// * `OracleError` if the oracle fails or answers with the wrong number of
///   offsets or non-finite values
pub async fn optimize_corridor(
    corridor: &Corridor,
    weights: OptimizationWeights,
    oracle: &dyn OffsetOracle,
    config: &EngineConfig,
) -> EngineResult<OptimizationOutcome> {
    weights.validate()?;
    CorridorValidator::ensure_valid(corridor, &config.to_analysis_options())?;

    let request = OptimizationRequest::new(corridor, weights)?;
    let response = oracle.optimize(&request).await?;

    let offsets = rebase_offsets(corridor, &response.offsets)?;
    let optimized = corridor.with_offsets(&offsets)?;
    let report = analyze_corridor(&optimized, config)?;

    info!(
        "Applied oracle offsets {:?} to corridor {}",
        offsets,
        &request.request_id[..12]
    );

    Ok(OptimizationOutcome {
        offsets,
        corridor: optimized,
        report,
    })
}

/// Shift offsets so the first is zero and normalise each into its cycle.
pub fn rebase_offsets(corridor: &Corridor, offsets: &[f64]) -> EngineResult<Vec<f64>> {
    if offsets.len() != corridor.len() {
        return Err(EngineError::OracleError(format!(
            "expected {} offsets, got {}",
            corridor.len(),
            offsets.len()
        )));
    }
    if offsets.iter().any(|offset| !offset.is_finite()) {
        return Err(EngineError::OracleError(
            "offsets must be finite numbers".to_string(),
        ));
    }

    let base = offsets.first().copied().unwrap_or(0.0);
    Ok(offsets
        .iter()
        .enumerate()
        .map(|(index, offset)| {
            let shifted = offset - base;
            match corridor.cycle_for(index) {
                Some(cycle) => normalize(shifted, cycle),
                None => shifted,
            }
        })
        .collect())
}
