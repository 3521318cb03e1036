//! Corridor validation with detailed error and warning reporting.
//!
//! This module checks corridor data before any bandwidth is computed. Errors
//! are preconditions the engine cannot work around (negative or decreasing
//! distances, non-positive speeds or cycles, malformed phases); warnings flag
//! data that is accepted but will not be used the way a user might expect.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::algorithms::{AnalysisOptions, PhaseSelection};
use crate::core::domain::{Corridor, Direction};
use crate::core::error::{EngineError, EngineResult};

/// Validation result with categorized issues and statistics.
///
/// Errors make `is_valid` false, while warnings are informational.
///
/// # Examples
///
/// ```
/// use greenwave_rust::preprocessing::validator::ValidationResult;
///
/// let mut result = ValidationResult::new();
/// assert!(result.is_valid);
///
/// result.add_error("distance must not be negative".to_string());
/// assert!(!result.is_valid);
/// assert_eq!(result.errors.len(), 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub stats: ValidationStats,
}

/// Summary statistics computed during validation.
///
/// # Fields
///
/// * `total_intersections` - Number of intersections in the corridor
/// * `upstream_phases` / `downstream_phases` - Green phases per direction
/// * `missing_upstream` / `missing_downstream` - Intersections without a phase in that direction
/// * `missing_cycle_times` - Intersections with no own or shared cycle
/// * `multi_phase_directions` - Intersection/direction combinations with more than one phase
/// * `corridor_length_m` - Distance from the first to the last intersection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationStats {
    pub total_intersections: usize,
    pub upstream_phases: usize,
    pub downstream_phases: usize,
    pub missing_upstream: usize,
    pub missing_downstream: usize,
    pub missing_cycle_times: usize,
    pub multi_phase_directions: usize,
    pub corridor_length_m: f64,
}

impl ValidationResult {
    /// Creates a new validation result with valid status and empty error/warning lists.
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
            stats: ValidationStats::default(),
        }
    }

    /// Adds a critical error and marks the result as invalid.
    pub fn add_error(&mut self, error: String) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Adds a non-critical warning without invalidating the result.
    pub fn add_warning(&mut self, warning: String) {
        self.warnings.push(warning);
    }

    /// Converts collected errors into a single `InvalidInput` error.
    pub fn into_result(self) -> EngineResult<Self> {
        if self.is_valid {
            Ok(self)
        } else {
            Err(EngineError::InvalidInput(self.errors.join("; ")))
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for corridor input data.
///
/// # Examples
///
/// ```
/// use greenwave_rust::algorithms::AnalysisOptions;
/// use greenwave_rust::core::domain::{Corridor, Direction, GreenPhase, Intersection};
/// use greenwave_rust::preprocessing::validator::CorridorValidator;
///
/// let corridor = Corridor::new(vec![
///     Intersection::new(0.0).with_phase(GreenPhase::new(Direction::Upstream, 0.0, 40.0)),
///     Intersection::new(-5.0),
/// ])
/// .with_cycle_time(100.0);
///
/// let result = CorridorValidator::validate(&corridor, &AnalysisOptions::default());
/// assert!(!result.is_valid);
/// assert_eq!(result.stats.total_intersections, 2);
/// ```
pub struct CorridorValidator;

impl CorridorValidator {
    /// Validates a corridor and collects every issue found.
    ///
    /// Checks performed:
    /// - Distances finite, non-negative and non-decreasing
    /// - Cycle times finite and positive
    /// - Speeds (corridor, intersection and fallback) finite and positive
    /// - Phase start finite, duration in `(0, cycle]`
    /// - Offsets finite
    /// - Warnings for missing phases/cycles, starts outside the cycle,
    ///   duplicate names, and extra phases ignored under first-only selection
    pub fn validate(corridor: &Corridor, options: &AnalysisOptions) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.stats.total_intersections = corridor.len();

        if let (Some(first), Some(last)) = (corridor.intersections.first(), corridor.intersections.last()) {
            result.stats.corridor_length_m = (last.distance - first.distance).abs();
        }

        if let Some(cycle) = corridor.cycle_time {
            if !cycle.is_finite() || cycle <= 0.0 {
                result.add_error(format!("Shared cycle time must be positive, got {}", cycle));
            }
        }

        Self::check_speeds(corridor, options, &mut result);

        let mut seen_names = HashSet::new();
        let mut previous_distance: Option<f64> = None;

        for (index, node) in corridor.intersections.iter().enumerate() {
            let label = node.label(index);

            if !node.distance.is_finite() || node.distance < 0.0 {
                result.add_error(format!(
                    "Intersection {}: distance must be a non-negative number, got {}",
                    label, node.distance
                ));
            } else if let Some(previous) = previous_distance {
                if node.distance < previous {
                    result.add_error(format!(
                        "Intersection {}: distance {} is smaller than the previous {}",
                        label, node.distance, previous
                    ));
                }
            }
            if node.distance.is_finite() {
                previous_distance = Some(node.distance);
            }

            if let Some(name) = &node.name {
                if !seen_names.insert(name.as_str()) {
                    result.add_warning(format!("Duplicate intersection name: {}", name));
                }
            }

            if !node.offset.is_finite() {
                result.add_error(format!("Intersection {}: offset is not a finite number", label));
            }

            let cycle = match node.cycle_time.or(corridor.cycle_time) {
                Some(cycle) if cycle.is_finite() && cycle > 0.0 => Some(cycle),
                Some(cycle) => {
                    if node.cycle_time.is_some() {
                        result.add_error(format!(
                            "Intersection {}: cycle time must be positive, got {}",
                            label, cycle
                        ));
                    }
                    None
                }
                None => {
                    result.stats.missing_cycle_times += 1;
                    result.add_warning(format!(
                        "Intersection {}: no cycle time, its pairs will be skipped",
                        label
                    ));
                    None
                }
            };

            for phase in &node.green_phases {
                if !phase.start_time.is_finite() || phase.start_time < 0.0 {
                    result.add_error(format!(
                        "Intersection {}: {} phase start must be a non-negative number, got {}",
                        label, phase.direction, phase.start_time
                    ));
                }
                if !phase.duration.is_finite() || phase.duration <= 0.0 {
                    result.add_error(format!(
                        "Intersection {}: {} phase duration must be positive, got {}",
                        label, phase.direction, phase.duration
                    ));
                }
                if let Some(cycle) = cycle {
                    if phase.duration > cycle {
                        result.add_error(format!(
                            "Intersection {}: {} phase duration {} exceeds cycle {}",
                            label, phase.direction, phase.duration, cycle
                        ));
                    }
                    if phase.start_time >= cycle {
                        result.add_warning(format!(
                            "Intersection {}: {} phase start {} lies outside the cycle and wraps",
                            label, phase.direction, phase.start_time
                        ));
                    }
                }
            }

            for direction in Direction::ALL {
                let count = node.phase_count(direction);
                match direction {
                    Direction::Upstream => result.stats.upstream_phases += count,
                    Direction::Downstream => result.stats.downstream_phases += count,
                }

                if count == 0 {
                    match direction {
                        Direction::Upstream => result.stats.missing_upstream += 1,
                        Direction::Downstream => result.stats.missing_downstream += 1,
                    }
                    result.add_warning(format!(
                        "Intersection {}: no {} green phase",
                        label, direction
                    ));
                } else if count > 1 {
                    result.stats.multi_phase_directions += 1;
                    if options.phase_selection == PhaseSelection::FirstOnly {
                        result.add_warning(format!(
                            "Intersection {}: {} {} phases, only the first is used",
                            label, count, direction
                        ));
                    }
                }
            }
        }

        result
    }

    /// Validates and fails with `InvalidInput` on the first batch of errors.
    pub fn ensure_valid(corridor: &Corridor, options: &AnalysisOptions) -> EngineResult<ValidationResult> {
        Self::validate(corridor, options).into_result()
    }

    fn check_speeds(corridor: &Corridor, options: &AnalysisOptions, result: &mut ValidationResult) {
        let mut check = |what: String, speed: f64| {
            if !speed.is_finite() || speed <= 0.0 {
                result.add_error(format!("{} must be positive, got {}", what, speed));
            }
        };

        let speeds = corridor.speeds.unwrap_or(options.default_speeds);
        for direction in Direction::ALL {
            check(
                format!("Corridor {} speed", direction),
                speeds.for_direction(direction),
            );
        }

        for (index, node) in corridor.intersections.iter().enumerate() {
            for direction in Direction::ALL {
                if let Some(speed) = node.speed_override(direction) {
                    check(
                        format!("Intersection {} {} speed", node.label(index), direction),
                        speed,
                    );
                }
            }
        }
    }
}
