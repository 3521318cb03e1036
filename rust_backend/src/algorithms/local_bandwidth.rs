//! Pairwise platoon bandwidth between adjacent intersections.
//!
//! For every adjacent pair the midpoint of the departing green is carried to the
//! next signal at corridor speed. The bandwidth is how much of the arrival green
//! is left once the distance between that arrival instant and the centre of the
//! arrival green is taken off, which decays linearly away from perfect alignment.

use log::debug;
use serde::{Deserialize, Serialize};

use super::{check_corridor_data, checked_cycle, checked_speed, AnalysisOptions};
use crate::core::domain::{Corridor, Direction};
use crate::core::error::EngineResult;
use crate::time::{cyclic_distance, normalize, travel_time_secs, CyclicWindow};

/// Per-direction corridor bandwidth and the per-pair values it was derived from.
///
/// `local_up[i]` and `local_down[i]` both describe the pair `(i, i + 1)`; a
/// `None` entry means one of the two signals has no usable phase or cycle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BandwidthResult {
    pub up: Option<f64>,
    pub down: Option<f64>,
    pub local_up: Vec<Option<f64>>,
    pub local_down: Vec<Option<f64>>,
}

impl BandwidthResult {
    pub fn scalar(&self, direction: Direction) -> Option<f64> {
        match direction {
            Direction::Upstream => self.up,
            Direction::Downstream => self.down,
        }
    }

    pub fn local(&self, direction: Direction) -> &[Option<f64>] {
        match direction {
            Direction::Upstream => &self.local_up,
            Direction::Downstream => &self.local_down,
        }
    }
}

/// Compute pairwise bandwidth for both directions of the corridor.
///
/// Upstream pairs depart intersection `i` and arrive at `i + 1`; downstream
/// pairs depart `i + 1` and arrive at `i`. The direction scalar is the minimum
/// over pairs that could be evaluated.
///
/// # Errors
/// `InvalidInput` for non-finite or decreasing distances, non-finite offsets or
/// phase starts, durations outside `(0, cycle]`, and evaluated pairs with a
/// non-positive speed or cycle.
pub fn calculate_corridor_bandwidth(
    corridor: &Corridor,
    options: &AnalysisOptions,
) -> EngineResult<BandwidthResult> {
    check_corridor_data(corridor)?;

    let pairs = corridor.len().saturating_sub(1);
    let mut local_up = Vec::with_capacity(pairs);
    let mut local_down = Vec::with_capacity(pairs);

    for i in 0..pairs {
        local_up.push(pair_bandwidth(corridor, i, i + 1, Direction::Upstream, options)?);
        local_down.push(pair_bandwidth(corridor, i + 1, i, Direction::Downstream, options)?);
    }

    Ok(BandwidthResult {
        up: minimum(&local_up),
        down: minimum(&local_down),
        local_up,
        local_down,
    })
}

/// Bandwidth for traffic leaving `from` and arriving at `to`, `None` if the pair
/// lacks a phase or cycle in `direction`.
fn pair_bandwidth(
    corridor: &Corridor,
    from: usize,
    to: usize,
    direction: Direction,
    options: &AnalysisOptions,
) -> EngineResult<Option<f64>> {
    let (Some(from_cycle), Some(to_cycle)) =
        (checked_cycle(corridor, from)?, checked_cycle(corridor, to)?)
    else {
        debug!("Pair {}->{} ({}): missing cycle time", from, to, direction);
        return Ok(None);
    };

    let departing = &corridor.intersections[from];
    let arriving = &corridor.intersections[to];
    let departures = options.phases_for(departing, direction);
    let arrivals = options.phases_for(arriving, direction);
    if departures.is_empty() || arrivals.is_empty() {
        debug!("Pair {}->{} ({}): missing green phase", from, to, direction);
        return Ok(None);
    }

    let speed = checked_speed(corridor, from, direction, options)?;
    let travel = travel_time_secs(corridor.gap(from, to), speed);

    let best = departures
        .iter()
        .flat_map(|departure| {
            let departure = CyclicWindow::from_phase(departure, departing.offset, from_cycle);
            arrivals.iter().map(move |arrival| {
                let arrival = CyclicWindow::from_phase(arrival, arriving.offset, to_cycle);
                platoon_overlap(&departure, &arrival, travel)
            })
        })
        .reduce(f64::max);

    Ok(best)
}

/// Remaining arrival green around the instant the departure midpoint arrives.
///
/// The miss is measured around the cycle, not as a plain `|arrival - centre|`,
/// so an arrival just past the seam counts as close to a green centred before it.
fn platoon_overlap(departure: &CyclicWindow, arrival: &CyclicWindow, travel: f64) -> f64 {
    let arrival_time = normalize(departure.midpoint() + travel, arrival.cycle);
    let miss = cyclic_distance(arrival_time, arrival.midpoint(), arrival.cycle);

    (arrival.duration - miss).clamp(0.0, arrival.duration)
}

fn minimum(values: &[Option<f64>]) -> Option<f64> {
    values.iter().flatten().copied().reduce(f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::PhaseSelection;
    use crate::core::domain::{GreenPhase, Intersection, TravelSpeeds};
    use crate::core::error::EngineError;
    use proptest::prelude::*;

    fn node(distance: f64, up: Option<(f64, f64)>, down: Option<(f64, f64)>) -> Intersection {
        let mut node = Intersection::new(distance);
        if let Some((start, duration)) = up {
            node = node.with_phase(GreenPhase::new(Direction::Upstream, start, duration));
        }
        if let Some((start, duration)) = down {
            node = node.with_phase(GreenPhase::new(Direction::Downstream, start, duration));
        }
        node
    }

    #[test]
    fn test_aligned_windows_give_full_duration() {
        let corridor = Corridor::new(vec![
            node(0.0, Some((10.0, 30.0)), Some((50.0, 20.0))),
            node(0.0, Some((10.0, 30.0)), Some((50.0, 20.0))),
        ])
        .with_cycle_time(90.0);

        let result = calculate_corridor_bandwidth(&corridor, &AnalysisOptions::default()).unwrap();
        assert_eq!(result.local_up, vec![Some(30.0)]);
        assert_eq!(result.local_down, vec![Some(20.0)]);
        assert_eq!(result.up, Some(30.0));
        assert_eq!(result.down, Some(20.0));
    }

    #[test]
    fn test_offset_shifts_phase() {
        // Second signal shifted by the travel time: 360 m at 36 km/h is 36 s.
        let corridor = Corridor::new(vec![
            node(0.0, Some((0.0, 40.0)), None),
            node(360.0, Some((0.0, 40.0)), None).with_offset(36.0),
        ])
        .with_cycle_time(100.0)
        .with_speeds(TravelSpeeds::uniform(36.0));

        let result = calculate_corridor_bandwidth(&corridor, &AnalysisOptions::default()).unwrap();
        let up = result.up.unwrap();
        assert!((up - 40.0).abs() < 1e-9, "got {}", up);
    }

    #[test]
    fn test_partial_alignment_decays_linearly() {
        // Zero travel; arrival centre is 15 s later than the departure midpoint.
        let corridor = Corridor::new(vec![
            node(0.0, Some((0.0, 40.0)), None),
            node(0.0, Some((15.0, 40.0)), None),
        ])
        .with_cycle_time(100.0);

        let result = calculate_corridor_bandwidth(&corridor, &AnalysisOptions::default()).unwrap();
        assert_eq!(result.up, Some(25.0));
    }

    #[test]
    fn test_arrival_just_past_seam_measured_cyclically() {
        // Departure midpoint lands at 2 s; arrival green centred on 98 s.
        let corridor = Corridor::new(vec![
            node(0.0, Some((82.0, 40.0)), None),
            node(0.0, Some((88.0, 20.0)), None),
        ])
        .with_cycle_time(100.0);

        let result = calculate_corridor_bandwidth(&corridor, &AnalysisOptions::default()).unwrap();
        assert_eq!(result.up, Some(16.0));
    }

    #[test]
    fn test_missing_phase_yields_none_without_affecting_others() {
        let corridor = Corridor::new(vec![
            node(0.0, Some((0.0, 40.0)), None),
            node(0.0, Some((0.0, 40.0)), None),
            node(0.0, None, None),
            node(0.0, Some((0.0, 30.0)), None),
        ])
        .with_cycle_time(100.0);

        let result = calculate_corridor_bandwidth(&corridor, &AnalysisOptions::default()).unwrap();
        assert_eq!(result.local_up, vec![Some(40.0), None, None]);
        assert_eq!(result.up, Some(40.0));
        assert_eq!(result.local_down, vec![None, None, None]);
        assert_eq!(result.down, None);
    }

    #[test]
    fn test_missing_cycle_yields_none() {
        let corridor = Corridor::new(vec![
            node(0.0, Some((0.0, 40.0)), None).with_cycle_time(100.0),
            node(100.0, Some((0.0, 40.0)), None),
        ]);

        let result = calculate_corridor_bandwidth(&corridor, &AnalysisOptions::default()).unwrap();
        assert_eq!(result.local_up, vec![None]);
        assert_eq!(result.up, None);
    }

    #[test]
    fn test_single_intersection_is_empty() {
        let corridor = Corridor::new(vec![node(0.0, Some((0.0, 40.0)), None)]).with_cycle_time(60.0);
        let result = calculate_corridor_bandwidth(&corridor, &AnalysisOptions::default()).unwrap();
        assert_eq!(result, BandwidthResult::default());

        let empty = Corridor::new(vec![]);
        let result = calculate_corridor_bandwidth(&empty, &AnalysisOptions::default()).unwrap();
        assert!(result.local_up.is_empty());
        assert_eq!(result.up, None);
    }

    #[test]
    fn test_zero_speed_is_invalid_input() {
        let corridor = Corridor::new(vec![
            node(0.0, Some((0.0, 40.0)), None),
            node(100.0, Some((0.0, 40.0)), None).with_speed(Direction::Upstream, 0.0),
        ])
        .with_cycle_time(100.0)
        .with_speeds(TravelSpeeds::new(0.0, 50.0));

        let err = calculate_corridor_bandwidth(&corridor, &AnalysisOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_best_pair_considers_later_phases() {
        let corridor = Corridor::new(vec![
            node(0.0, Some((0.0, 20.0)), None),
            node(0.0, Some((50.0, 20.0)), None)
                .with_phase(GreenPhase::new(Direction::Upstream, 0.0, 20.0)),
        ])
        .with_cycle_time(100.0);

        let first_only =
            calculate_corridor_bandwidth(&corridor, &AnalysisOptions::default()).unwrap();
        assert_eq!(first_only.up, Some(0.0));

        let options = AnalysisOptions::default().with_phase_selection(PhaseSelection::BestPair);
        let best = calculate_corridor_bandwidth(&corridor, &options).unwrap();
        assert_eq!(best.up, Some(20.0));
    }

    #[test]
    fn test_result_accessors() {
        let result = BandwidthResult {
            up: Some(12.0),
            down: None,
            local_up: vec![Some(12.0)],
            local_down: vec![None],
        };
        assert_eq!(result.scalar(Direction::Upstream), Some(12.0));
        assert_eq!(result.local(Direction::Downstream), &[None]);

        let json = serde_json::to_value(&result).unwrap();
        assert!(json["down"].is_null());
        assert_eq!(json["local_up"][0], 12.0);
    }

    proptest! {
        #[test]
        fn prop_local_bandwidth_within_arrival_green(
            start_a in 0.0..100.0f64,
            start_b in 0.0..100.0f64,
            dur_a in 1.0..100.0f64,
            dur_b in 1.0..100.0f64,
            gap in 0.0..2000.0f64,
            offset in -200.0..200.0f64,
        ) {
            let corridor = Corridor::new(vec![
                node(0.0, Some((start_a, dur_a)), None),
                node(gap, Some((start_b, dur_b)), None).with_offset(offset),
            ])
            .with_cycle_time(100.0);

            let result = calculate_corridor_bandwidth(&corridor, &AnalysisOptions::default()).unwrap();
            let up = result.up.unwrap();
            prop_assert!(up >= 0.0);
            prop_assert!(up <= dur_b);
        }
    }
}
