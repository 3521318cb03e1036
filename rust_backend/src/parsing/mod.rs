//! Parsers for corridor input documents.
//!
//! # Parsers
//!
//! - [`json_parser`]: Corridor documents as exported by the planning UI
//! - [`toml_parser`]: Hand-written corridor files
//!
//! Both formats share the document layout in [`document`].
//!
//! # Example
//!
//! ```no_run
//! use greenwave_rust::parsing::json_parser::parse_corridor_json;
//! use std::path::Path;
//!
//! let corridor = parse_corridor_json(Path::new("corridor.json"))
//!     .expect("Failed to parse corridor");
//! ```

pub mod document;
pub mod json_parser;
pub mod toml_parser;

#[cfg(test)]
mod json_parser_tests;

pub use document::CorridorDocument;
pub use json_parser::{parse_corridor_json, parse_corridor_json_str};
pub use toml_parser::{parse_corridor_toml, parse_corridor_toml_str};
