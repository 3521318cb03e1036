//! Green-wave corridor bandwidth engine.
//!
//! Given an ordered corridor of signalised intersections with cycle times,
//! green phases, offsets and travel speeds, the engine answers two questions
//! for each direction of travel:
//!
//! * how much green survives between each pair of neighbours
//!   ([`algorithms::calculate_corridor_bandwidth`]), and
//! * whether a single continuous band runs through the whole corridor
//!   ([`algorithms::chain_bw_up`], [`algorithms::chain_bw_down`]).
//!
//! The band edges are also turned into chart lines cut at the cycle seam
//! ([`algorithms::split_at_cycle_boundary`]).
//!
//! # Example
//!
//! ```
//! use greenwave_rust::config::EngineConfig;
//! use greenwave_rust::core::{Corridor, Direction, GreenPhase, Intersection};
//! use greenwave_rust::services::analyze_corridor;
//!
//! let corridor = Corridor::new(vec![
//!     Intersection::new(0.0).with_phase(GreenPhase::new(Direction::Upstream, 0.0, 40.0)),
//!     Intersection::new(300.0).with_phase(GreenPhase::new(Direction::Upstream, 0.0, 40.0)),
//! ])
//! .with_cycle_time(100.0);
//!
//! let report = analyze_corridor(&corridor, &EngineConfig::default()).unwrap();
//! assert_eq!(report.diagonal.diagonal_up_start, vec![18.0]);
//! ```

pub mod algorithms;
pub mod config;
pub mod core;
pub mod io;
pub mod parsing;
pub mod preprocessing;
pub mod services;
pub mod time;
