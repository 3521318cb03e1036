//! Core domain models for green-wave corridor analysis.
//!
//! This module defines the fundamental data structures used throughout the crate,
//! representing intersections, their green phases, and the corridor that chains them.

pub mod domain;
pub mod error;

pub use domain::{Corridor, Direction, GreenPhase, Intersection, TravelSpeeds};
pub use error::{EngineError, EngineResult};
