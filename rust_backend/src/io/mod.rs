//! High-level corridor loading utilities.
//!
//! Loaders combine format detection with the parsers and attach error context
//! so callers get a ready-to-use [`Corridor`](crate::core::domain::Corridor).
//!
//! # Example
//!
//! ```no_run
//! use greenwave_rust::io::loaders::CorridorLoader;
//! use std::path::Path;
//!
//! let result = CorridorLoader::load_from_file(Path::new("corridor.json"))
//!     .expect("Failed to load");
//! println!("Loaded {} intersections", result.num_intersections);
//! ```

pub mod loaders;


pub use loaders::{CorridorLoadResult, CorridorLoader, CorridorSourceType};
