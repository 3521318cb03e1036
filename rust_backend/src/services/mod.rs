//! Service layer for analysis and optimisation workflows.
//!
//! Services sit between the loaders and the callers (CLI, web front end).
//! They validate input, run the algorithms and bundle the results.

pub mod checksum;
pub mod corridor;
#[cfg(feature = "remote-oracle")]
pub mod http_oracle;
pub mod oracle;
pub mod weights;

pub use checksum::{calculate_checksum, corridor_checksum};
pub use corridor::{analyze_corridor, CorridorReport};
#[cfg(feature = "remote-oracle")]
pub use http_oracle::HttpOffsetOracle;
pub use oracle::{
    optimize_corridor, rebase_offsets, FixedOffsetsOracle, OffsetOracle, OptimizationOutcome,
    OptimizationRequest, OptimizationResponse,
};
pub use weights::{update_weight, OptimizationWeights, WeightCategory, WeightUpdate};
