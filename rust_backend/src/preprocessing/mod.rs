//! Input checks run before any bandwidth computation.

pub mod validator;

pub use validator::{CorridorValidator, ValidationResult, ValidationStats};
