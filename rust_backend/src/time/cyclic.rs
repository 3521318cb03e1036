use crate::core::domain::GreenPhase;

/// Reduce `time` into `[0, cycle_time)`.
///
/// Negative inputs, which show up after subtracting travel times or applying
/// negative offsets, wrap around to the end of the cycle.
///
/// # Arguments
/// * `time` - Time in seconds, any sign
/// * `cycle_time` - Cycle length in seconds, must be positive
///
/// # Example
/// ```
/// use greenwave_rust::time::normalize;
///
/// assert_eq!(normalize(130.0, 100.0), 30.0);
/// assert_eq!(normalize(-20.0, 100.0), 80.0);
/// ```
#[inline]
pub fn normalize(time: f64, cycle_time: f64) -> f64 {
    ((time % cycle_time) + cycle_time) % cycle_time
}

/// Shortest distance between two instants on a cycle of length `cycle_time`.
///
/// # Example
/// ```
/// use greenwave_rust::time::cyclic_distance;
///
/// assert_eq!(cyclic_distance(95.0, 5.0, 100.0), 10.0);
/// assert_eq!(cyclic_distance(30.0, 10.0, 100.0), 20.0);
/// ```
#[inline]
pub fn cyclic_distance(a: f64, b: f64, cycle_time: f64) -> f64 {
    let forward = normalize(a - b, cycle_time);
    forward.min(cycle_time - forward)
}

/// Convert km/h to m/s.
#[inline]
pub fn kmh_to_mps(speed_kmh: f64) -> f64 {
    speed_kmh / 3.6
}

/// Exact travel time in seconds over `distance_m` at `speed_kmh`.
#[inline]
pub fn travel_time_secs(distance_m: f64, speed_kmh: f64) -> f64 {
    distance_m / kmh_to_mps(speed_kmh)
}

/// Travel time rounded to whole seconds, as used by chain propagation.
///
/// # Example
/// ```
/// use greenwave_rust::time::rounded_travel_time_secs;
///
/// assert_eq!(rounded_travel_time_secs(300.0, 50.0), 22.0);
/// ```
#[inline]
pub fn rounded_travel_time_secs(distance_m: f64, speed_kmh: f64) -> f64 {
    (distance_m * 3.6 / speed_kmh).round()
}

/// A green interval placed on the cycle after applying an intersection offset.
///
/// The window is stored as a normalised start plus a duration so that a
/// full-cycle green (duration == cycle) stays distinguishable from an empty one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CyclicWindow {
    pub start: f64,
    pub duration: f64,
    pub cycle: f64,
}

impl CyclicWindow {
    pub fn new(start: f64, duration: f64, cycle: f64) -> Self {
        Self {
            start: normalize(start, cycle),
            duration,
            cycle,
        }
    }

    /// Window of `phase` shifted by `offset` on a cycle of `cycle` seconds.
    pub fn from_phase(phase: &GreenPhase, offset: f64, cycle: f64) -> Self {
        Self::new(phase.start_time + offset, phase.duration, cycle)
    }

    /// Normalised end; numerically smaller than `start` when the window wraps.
    pub fn end(&self) -> f64 {
        normalize(self.start + self.duration, self.cycle)
    }

    pub fn midpoint(&self) -> f64 {
        normalize(self.start + self.duration / 2.0, self.cycle)
    }

    /// Absolute repetitions `[start + k·cycle, start + k·cycle + duration]` that
    /// touch the closed interval `[lower, upper]`.
    pub fn repetitions_between(&self, lower: f64, upper: f64) -> Vec<(f64, f64)> {
        if upper < lower {
            return Vec::new();
        }
        let first = ((lower - self.start - self.duration) / self.cycle).ceil() as i64;
        let last = ((upper - self.start) / self.cycle).floor() as i64;

        (first..=last)
            .map(|k| {
                let begin = self.start + k as f64 * self.cycle;
                (begin, begin + self.duration)
            })
            .collect()
    }
}
