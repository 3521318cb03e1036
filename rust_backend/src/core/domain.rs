//! Domain models for signalised intersections and the corridor that links them.
//!
//! All times are in seconds and all distances in meters. Speeds are expressed in
//! km/h, the unit traffic engineers enter them in.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::{EngineError, EngineResult};

/// Default corridor travel speed in km/h when neither the corridor nor an
/// intersection specifies one.
pub const DEFAULT_SPEED_KMH: f64 = 50.0;

/// Travel direction along the corridor.
///
/// `Upstream` runs from the first intersection towards the last one,
/// `Downstream` runs back from the last intersection to the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Upstream,
    Downstream,
}

impl Direction {
    /// Both directions, upstream first.
    pub const ALL: [Direction; 2] = [Direction::Upstream, Direction::Downstream];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Upstream => write!(f, "upstream"),
            Direction::Downstream => write!(f, "downstream"),
        }
    }
}

/// A single green interval of a signal, tagged with the direction it serves.
///
/// # Examples
///
/// ```
/// use greenwave_rust::core::domain::{Direction, GreenPhase};
///
/// let phase = GreenPhase::new(Direction::Upstream, 10.0, 40.0);
/// assert_eq!(phase.end_time(), 50.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreenPhase {
    pub direction: Direction,
    pub start_time: f64,
    pub duration: f64,
}

impl GreenPhase {
    pub fn new(direction: Direction, start_time: f64, duration: f64) -> Self {
        Self {
            direction,
            start_time,
            duration,
        }
    }

    /// Raw end of the phase, before offset and cycle wraparound are applied.
    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration
    }
}

/// A signalised intersection located along the corridor.
///
/// # Fields
///
/// * `name` - Optional display label
/// * `distance` - Position along the corridor in meters
/// * `cycle_time` - Cycle length in seconds; falls back to the corridor cycle when absent
/// * `green_phases` - Green intervals for both directions
/// * `upstream_speed` / `downstream_speed` - Optional km/h overrides for traffic departing here
/// * `offset` - Shift in seconds applied to every phase of this signal
///
/// # Examples
///
/// ```
/// use greenwave_rust::core::domain::{Direction, GreenPhase, Intersection};
///
/// let node = Intersection::new(300.0)
///     .with_cycle_time(90.0)
///     .with_phase(GreenPhase::new(Direction::Upstream, 0.0, 40.0))
///     .with_offset(12.0);
///
/// assert_eq!(node.first_phase(Direction::Upstream).map(|p| p.duration), Some(40.0));
/// assert!(node.first_phase(Direction::Downstream).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intersection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub distance: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_time: Option<f64>,
    #[serde(default)]
    pub green_phases: Vec<GreenPhase>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downstream_speed: Option<f64>,
    #[serde(default)]
    pub offset: f64,
}

impl Intersection {
    pub fn new(distance: f64) -> Self {
        Self {
            name: None,
            distance,
            cycle_time: None,
            green_phases: Vec::new(),
            upstream_speed: None,
            downstream_speed: None,
            offset: 0.0,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_cycle_time(mut self, cycle_time: f64) -> Self {
        self.cycle_time = Some(cycle_time);
        self
    }

    pub fn with_phase(mut self, phase: GreenPhase) -> Self {
        self.green_phases.push(phase);
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_speed(mut self, direction: Direction, speed_kmh: f64) -> Self {
        match direction {
            Direction::Upstream => self.upstream_speed = Some(speed_kmh),
            Direction::Downstream => self.downstream_speed = Some(speed_kmh),
        }
        self
    }

    /// Green phases serving `direction`, in declaration order.
    pub fn phases(&self, direction: Direction) -> impl Iterator<Item = &GreenPhase> {
        self.green_phases
            .iter()
            .filter(move |phase| phase.direction == direction)
    }

    pub fn first_phase(&self, direction: Direction) -> Option<&GreenPhase> {
        self.phases(direction).next()
    }

    pub fn phase_count(&self, direction: Direction) -> usize {
        self.phases(direction).count()
    }

    pub fn speed_override(&self, direction: Direction) -> Option<f64> {
        match direction {
            Direction::Upstream => self.upstream_speed,
            Direction::Downstream => self.downstream_speed,
        }
    }

    /// Label used in log lines and validation messages.
    pub fn label(&self, index: usize) -> String {
        match &self.name {
            Some(name) => format!("#{} ({})", index, name),
            None => format!("#{}", index),
        }
    }
}

/// Corridor-wide default travel speeds in km/h.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelSpeeds {
    pub upstream_kmh: f64,
    pub downstream_kmh: f64,
}

impl TravelSpeeds {
    pub fn new(upstream_kmh: f64, downstream_kmh: f64) -> Self {
        Self {
            upstream_kmh,
            downstream_kmh,
        }
    }

    pub fn uniform(speed_kmh: f64) -> Self {
        Self::new(speed_kmh, speed_kmh)
    }

    pub fn for_direction(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Upstream => self.upstream_kmh,
            Direction::Downstream => self.downstream_kmh,
        }
    }
}

impl Default for TravelSpeeds {
    fn default() -> Self {
        Self::uniform(DEFAULT_SPEED_KMH)
    }
}

/// An ordered chain of intersections along one road.
///
/// Intersections are expected in non-decreasing `distance` order; the
/// validator rejects anything else before the engine runs.
///
/// # Examples
///
/// ```
/// use greenwave_rust::core::domain::{Corridor, Direction, Intersection};
///
/// let corridor = Corridor::new(vec![Intersection::new(0.0), Intersection::new(250.0)])
///     .with_cycle_time(100.0);
///
/// assert_eq!(corridor.len(), 2);
/// assert_eq!(corridor.cycle_for(1), Some(100.0));
/// assert_eq!(corridor.travel_order(Direction::Downstream), vec![1, 0]);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Corridor {
    pub intersections: Vec<Intersection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speeds: Option<TravelSpeeds>,
}

impl Corridor {
    pub fn new(intersections: Vec<Intersection>) -> Self {
        Self {
            intersections,
            cycle_time: None,
            speeds: None,
        }
    }

    pub fn with_cycle_time(mut self, cycle_time: f64) -> Self {
        self.cycle_time = Some(cycle_time);
        self
    }

    pub fn with_speeds(mut self, speeds: TravelSpeeds) -> Self {
        self.speeds = Some(speeds);
        self
    }

    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    /// Effective cycle of intersection `index`: its own cycle, else the shared one.
    pub fn cycle_for(&self, index: usize) -> Option<f64> {
        self.intersections
            .get(index)
            .and_then(|node| node.cycle_time)
            .or(self.cycle_time)
    }

    /// Speed in km/h for traffic departing intersection `index` in `direction`.
    ///
    /// Resolution order: the intersection's override, the corridor speeds,
    /// then `fallback`.
    pub fn speed_for(&self, index: usize, direction: Direction, fallback: &TravelSpeeds) -> f64 {
        self.intersections
            .get(index)
            .and_then(|node| node.speed_override(direction))
            .unwrap_or_else(|| {
                self.speeds
                    .unwrap_or(*fallback)
                    .for_direction(direction)
            })
    }

    /// Absolute distance between intersections `from` and `to`.
    pub fn gap(&self, from: usize, to: usize) -> f64 {
        (self.intersections[to].distance - self.intersections[from].distance).abs()
    }

    /// Intersection indices in the order a vehicle travelling `direction` meets them.
    pub fn travel_order(&self, direction: Direction) -> Vec<usize> {
        let n = self.intersections.len();
        match direction {
            Direction::Upstream => (0..n).collect(),
            Direction::Downstream => (0..n).rev().collect(),
        }
    }

    pub fn offsets(&self) -> Vec<f64> {
        self.intersections.iter().map(|node| node.offset).collect()
    }

    /// Returns a copy of the corridor with `offsets` applied, one per intersection.
    pub fn with_offsets(&self, offsets: &[f64]) -> EngineResult<Corridor> {
        if offsets.len() != self.intersections.len() {
            return Err(EngineError::InvalidInput(format!(
                "expected {} offsets, got {}",
                self.intersections.len(),
                offsets.len()
            )));
        }
        if let Some(bad) = offsets.iter().position(|offset| !offset.is_finite()) {
            return Err(EngineError::InvalidInput(format!(
                "offset for intersection #{} is not a finite number",
                bad
            )));
        }

        let mut corridor = self.clone();
        for (node, offset) in corridor.intersections.iter_mut().zip(offsets) {
            node.offset = *offset;
        }
        Ok(corridor)
    }
}
