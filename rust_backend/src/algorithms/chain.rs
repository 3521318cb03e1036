//! Corridor diagonal band by chained interval propagation.
//!
//! The band starts as the departure green of the first intersection projected
//! forward by the travel time, and is then intersected, intersection after
//! intersection, with every arrival green along the way. The band can only
//! shrink; as soon as it becomes empty no continuous green wave exists and the
//! propagation stops.
//!
//! Green windows repeat every cycle, so the running band is intersected with
//! each repetition it touches. When that splits the band, all surviving pieces
//! are propagated and the widest one is reported.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{check_corridor_data, checked_cycle, checked_speed, AnalysisOptions};
use crate::core::domain::{Corridor, Direction};
use crate::core::error::{EngineError, EngineResult};
use crate::time::{rounded_travel_time_secs, CyclicWindow};

/// Lower and upper edge `(Lc, Uc)` of the feasible band, in absolute seconds at
/// the intersection the band was last folded into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagonalBand {
    pub lower: f64,
    pub upper: f64,
}

impl DiagonalBand {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// `max(0, Uc - Lc)`.
    pub fn width(&self) -> f64 {
        (self.upper - self.lower).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.lower > self.upper
    }

    pub fn shifted(&self, seconds: f64) -> Self {
        Self::new(self.lower + seconds, self.upper + seconds)
    }

    /// Intersection with `[lower, upper]`, `None` when the bounds cross.
    pub fn intersect(&self, lower: f64, upper: f64) -> Option<Self> {
        let band = Self::new(self.lower.max(lower), self.upper.min(upper));
        (!band.is_empty()).then_some(band)
    }
}

/// Band edges at one intersection, back-projected from the final band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPoint {
    pub index: usize,
    pub distance: f64,
    pub low: f64,
    pub top: f64,
}

/// Outcome of chain propagation in one direction.
///
/// `travel_times[k]` is the rounded travel time of the k-th step in travel
/// order and `widths[k]` the widest band width after folding that step in.
/// `band` and `points` are only present for a feasible band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainResult {
    pub direction: Direction,
    pub band: Option<DiagonalBand>,
    pub travel_times: Vec<f64>,
    pub widths: Vec<f64>,
    pub points: Vec<BandPoint>,
}

impl ChainResult {
    pub fn empty(direction: Direction) -> Self {
        Self {
            direction,
            band: None,
            travel_times: Vec::new(),
            widths: Vec::new(),
            points: Vec::new(),
        }
    }

    pub fn width(&self) -> Option<f64> {
        self.band.map(|band| band.width())
    }

    pub fn is_feasible(&self) -> bool {
        self.band.is_some()
    }
}

/// Per-direction corridor band width, as handed to the chart layer.
///
/// Each vector is either empty (no continuous band) or holds a single value.
/// The start and end vectors of a direction always carry the same width.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DiagonalResult {
    pub diagonal_up_start: Vec<f64>,
    pub diagonal_up_end: Vec<f64>,
    pub diagonal_down_start: Vec<f64>,
    pub diagonal_down_end: Vec<f64>,
}

impl DiagonalResult {
    pub fn from_chains(up: &ChainResult, down: &ChainResult) -> Self {
        let up_width: Vec<f64> = up.width().into_iter().collect();
        let down_width: Vec<f64> = down.width().into_iter().collect();
        Self {
            diagonal_up_start: up_width.clone(),
            diagonal_up_end: up_width,
            diagonal_down_start: down_width.clone(),
            diagonal_down_end: down_width,
        }
    }

    pub fn width(&self, direction: Direction) -> Option<f64> {
        match direction {
            Direction::Upstream => self.diagonal_up_start.first().copied(),
            Direction::Downstream => self.diagonal_down_start.first().copied(),
        }
    }
}

/// Propagate the band upstream, first intersection to last.
pub fn chain_bw_up(corridor: &Corridor, options: &AnalysisOptions) -> EngineResult<ChainResult> {
    chain_bandwidth(corridor, Direction::Upstream, options)
}

/// Propagate the band downstream, last intersection to first.
pub fn chain_bw_down(corridor: &Corridor, options: &AnalysisOptions) -> EngineResult<ChainResult> {
    chain_bandwidth(corridor, Direction::Downstream, options)
}

/// Both directions folded into the chart-facing [`DiagonalResult`].
pub fn corridor_diagonal(
    corridor: &Corridor,
    options: &AnalysisOptions,
) -> EngineResult<DiagonalResult> {
    let up = chain_bw_up(corridor, options)?;
    let down = chain_bw_down(corridor, options)?;
    Ok(DiagonalResult::from_chains(&up, &down))
}

/// Chain propagation in `direction`.
///
/// # Errors
/// * `MissingPhase` / `MissingCycleTime` when an intersection on the chain has
///   no phase or cycle for `direction`
/// * `InvalidInput` for non-positive speeds or cycles, and for distances,
///   offsets or phases that cannot be placed on a cycle
///
/// Fewer than two intersections is not an error: the result is simply empty.
pub fn chain_bandwidth(
    corridor: &Corridor,
    direction: Direction,
    options: &AnalysisOptions,
) -> EngineResult<ChainResult> {
    check_corridor_data(corridor)?;

    let order = corridor.travel_order(direction);
    if order.len() < 2 {
        return Ok(ChainResult::empty(direction));
    }

    let windows = order
        .iter()
        .map(|&index| green_windows(corridor, index, direction, options))
        .collect::<EngineResult<Vec<_>>>()?;

    let travel_times = order
        .windows(2)
        .map(|step| {
            let speed = checked_speed(corridor, step[0], direction, options)?;
            Ok(rounded_travel_time_secs(corridor.gap(step[0], step[1]), speed))
        })
        .collect::<EngineResult<Vec<_>>>()?;

    let mut result = ChainResult::empty(direction);
    result.travel_times = travel_times;

    let mut bands: Vec<DiagonalBand> = windows[0]
        .iter()
        .map(|window| DiagonalBand::new(window.start, window.start + window.duration))
        .collect();

    for (step, travel) in result.travel_times.iter().enumerate() {
        let projected: Vec<DiagonalBand> = bands.iter().map(|band| band.shifted(*travel)).collect();
        bands = fold_arrival(&projected, &windows[step + 1]);

        match widest(&bands) {
            Some(best) => {
                debug!(
                    "Chain {} step {}: Lc={:.1} Uc={:.1} width={:.1}",
                    direction,
                    step,
                    best.lower,
                    best.upper,
                    best.width()
                );
                result.widths.push(best.width());
            }
            None => {
                info!(
                    "Chain {} collapsed at intersection {}",
                    direction,
                    order[step + 1]
                );
                return Ok(result);
            }
        }
    }

    if let Some(best) = widest(&bands) {
        result.points = back_project(corridor, &order, &result.travel_times, best);
        result.band = Some(best);
    }
    Ok(result)
}

fn green_windows(
    corridor: &Corridor,
    index: usize,
    direction: Direction,
    options: &AnalysisOptions,
) -> EngineResult<Vec<CyclicWindow>> {
    let cycle = checked_cycle(corridor, index)?.ok_or(EngineError::MissingCycleTime(index))?;
    let node = &corridor.intersections[index];
    let windows: Vec<CyclicWindow> = options
        .phases_for(node, direction)
        .into_iter()
        .map(|phase| CyclicWindow::from_phase(phase, node.offset, cycle))
        .collect();

    if windows.is_empty() {
        return Err(EngineError::MissingPhase { index, direction });
    }
    Ok(windows)
}

/// Intersect each band with every repetition of the arrival greens it touches.
fn fold_arrival(bands: &[DiagonalBand], arrivals: &[CyclicWindow]) -> Vec<DiagonalBand> {
    let mut pieces: Vec<DiagonalBand> = bands
        .iter()
        .flat_map(|band| {
            arrivals.iter().flat_map(move |window| {
                window
                    .repetitions_between(band.lower, band.upper)
                    .into_iter()
                    .filter_map(move |(start, end)| band.intersect(start, end))
            })
        })
        .collect();

    pieces.sort_by(|a, b| a.lower.total_cmp(&b.lower));

    // Overlapping greens of one signal produce overlapping pieces.
    let mut merged: Vec<DiagonalBand> = Vec::with_capacity(pieces.len());
    for piece in pieces {
        match merged.last_mut() {
            Some(last) if piece.lower <= last.upper => last.upper = last.upper.max(piece.upper),
            _ => merged.push(piece),
        }
    }
    merged
}

/// Widest band, earliest on ties.
fn widest(bands: &[DiagonalBand]) -> Option<DiagonalBand> {
    bands.iter().copied().reduce(|best, band| {
        if band.width() > best.width() {
            band
        } else {
            best
        }
    })
}

fn back_project(
    corridor: &Corridor,
    order: &[usize],
    travel_times: &[f64],
    band: DiagonalBand,
) -> Vec<BandPoint> {
    let mut remaining: f64 = travel_times.iter().sum();
    let mut points = Vec::with_capacity(order.len());

    for (position, &index) in order.iter().enumerate() {
        points.push(BandPoint {
            index,
            distance: corridor.intersections[index].distance,
            low: band.lower - remaining,
            top: band.upper - remaining,
        });
        if let Some(travel) = travel_times.get(position) {
            remaining -= travel;
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::PhaseSelection;
    use crate::core::domain::{GreenPhase, Intersection, TravelSpeeds};
    use proptest::prelude::*;

    fn up_node(distance: f64, start: f64, duration: f64) -> Intersection {
        Intersection::new(distance).with_phase(GreenPhase::new(Direction::Upstream, start, duration))
    }

    fn both_node(distance: f64, up: (f64, f64), down: (f64, f64)) -> Intersection {
        Intersection::new(distance)
            .with_phase(GreenPhase::new(Direction::Upstream, up.0, up.1))
            .with_phase(GreenPhase::new(Direction::Downstream, down.0, down.1))
    }

    #[test]
    fn test_two_intersections_overlapping_band() {
        let corridor = Corridor::new(vec![up_node(0.0, 0.0, 40.0), up_node(300.0, 0.0, 40.0)])
            .with_cycle_time(100.0)
            .with_speeds(TravelSpeeds::uniform(50.0));

        let chain = chain_bw_up(&corridor, &AnalysisOptions::default()).unwrap();
        assert_eq!(chain.travel_times, vec![22.0]);
        assert_eq!(chain.band, Some(DiagonalBand::new(22.0, 40.0)));
        assert_eq!(chain.width(), Some(18.0));
    }

    #[test]
    fn test_disjoint_windows_give_empty_band() {
        let corridor = Corridor::new(vec![up_node(0.0, 0.0, 40.0), up_node(300.0, 80.0, 20.0)])
            .with_cycle_time(100.0)
            .with_speeds(TravelSpeeds::uniform(50.0));

        let chain = chain_bw_up(&corridor, &AnalysisOptions::default()).unwrap();
        assert!(!chain.is_feasible());
        assert!(chain.points.is_empty());
        assert!(chain.widths.is_empty());
    }

    #[test]
    fn test_collapse_midway_aborts() {
        let corridor = Corridor::new(vec![
            up_node(0.0, 0.0, 40.0),
            up_node(300.0, 0.0, 40.0),
            up_node(600.0, 70.0, 10.0),
            up_node(900.0, 0.0, 90.0),
        ])
        .with_cycle_time(100.0)
        .with_speeds(TravelSpeeds::uniform(50.0));

        let chain = chain_bw_up(&corridor, &AnalysisOptions::default()).unwrap();
        assert_eq!(chain.band, None);
        assert_eq!(chain.widths, vec![18.0]);

        let diagonal = corridor_diagonal(&corridor, &AnalysisOptions::default());
        // Downstream phases are missing altogether.
        assert!(matches!(
            diagonal,
            Err(EngineError::MissingPhase { direction: Direction::Downstream, .. })
        ));
    }

    #[test]
    fn test_three_intersection_progression() {
        // Offsets follow the 22 s travel time, so the band keeps its full width
        // until the last, shorter green.
        let corridor = Corridor::new(vec![
            up_node(0.0, 0.0, 40.0),
            up_node(300.0, 0.0, 40.0).with_offset(22.0),
            up_node(600.0, 0.0, 30.0).with_offset(44.0),
        ])
        .with_cycle_time(100.0)
        .with_speeds(TravelSpeeds::uniform(50.0));

        let chain = chain_bw_up(&corridor, &AnalysisOptions::default()).unwrap();
        assert_eq!(chain.widths, vec![40.0, 30.0]);
        assert_eq!(chain.band, Some(DiagonalBand::new(44.0, 74.0)));

        let lows: Vec<f64> = chain.points.iter().map(|p| p.low).collect();
        let tops: Vec<f64> = chain.points.iter().map(|p| p.top).collect();
        assert_eq!(lows, vec![0.0, 22.0, 44.0]);
        assert_eq!(tops, vec![30.0, 52.0, 74.0]);
    }

    #[test]
    fn test_window_across_seam_is_aligned() {
        // Departure [68, 108] projected by 22 s lands on [90, 130], which meets
        // the next cycle's green [100, 140].
        let corridor = Corridor::new(vec![up_node(0.0, 68.0, 40.0), up_node(300.0, 0.0, 40.0)])
            .with_cycle_time(100.0)
            .with_speeds(TravelSpeeds::uniform(50.0));

        let chain = chain_bw_up(&corridor, &AnalysisOptions::default()).unwrap();
        assert_eq!(chain.band, Some(DiagonalBand::new(100.0, 130.0)));
        assert_eq!(chain.width(), Some(30.0));
    }

    #[test]
    fn test_touching_windows_give_zero_width_not_empty() {
        let corridor = Corridor::new(vec![up_node(0.0, 0.0, 40.0), up_node(0.0, 40.0, 20.0)])
            .with_cycle_time(100.0);

        let chain = chain_bw_up(&corridor, &AnalysisOptions::default()).unwrap();
        assert!(chain.is_feasible());
        assert_eq!(chain.width(), Some(0.0));
    }

    #[test]
    fn test_downstream_mirror() {
        let corridor = Corridor::new(vec![
            both_node(0.0, (0.0, 40.0), (0.0, 40.0)),
            both_node(300.0, (0.0, 40.0), (0.0, 40.0)).with_speed(Direction::Downstream, 50.0),
        ])
        .with_cycle_time(100.0)
        .with_speeds(TravelSpeeds::new(50.0, 25.0));

        let down = chain_bw_down(&corridor, &AnalysisOptions::default()).unwrap();
        assert_eq!(down.travel_times, vec![22.0]);
        assert_eq!(down.width(), Some(18.0));
        let indices: Vec<usize> = down.points.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 0]);

        let diagonal = corridor_diagonal(&corridor, &AnalysisOptions::default()).unwrap();
        assert_eq!(diagonal.diagonal_up_start, vec![18.0]);
        assert_eq!(diagonal.diagonal_up_end, vec![18.0]);
        assert_eq!(diagonal.diagonal_down_start, diagonal.diagonal_down_end);
        assert_eq!(diagonal.width(Direction::Downstream), Some(18.0));
    }

    #[test]
    fn test_short_corridors_are_empty() {
        let options = AnalysisOptions::default();
        for corridor in [
            Corridor::new(vec![]),
            Corridor::new(vec![up_node(0.0, 0.0, 40.0)]).with_cycle_time(100.0),
        ] {
            let chain = chain_bw_up(&corridor, &options).unwrap();
            assert!(!chain.is_feasible());
            let diagonal = corridor_diagonal(&corridor, &options).unwrap();
            assert_eq!(diagonal, DiagonalResult::default());
        }
    }

    #[test]
    fn test_missing_cycle_is_reported() {
        let corridor = Corridor::new(vec![up_node(0.0, 0.0, 40.0), up_node(300.0, 0.0, 40.0)]);
        let err = chain_bw_up(&corridor, &AnalysisOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::MissingCycleTime(0)));
    }

    #[test]
    fn test_best_pair_uses_every_phase() {
        let corridor = Corridor::new(vec![
            up_node(0.0, 0.0, 40.0),
            up_node(0.0, 60.0, 30.0).with_phase(GreenPhase::new(Direction::Upstream, 10.0, 20.0)),
        ])
        .with_cycle_time(100.0);

        let first_only = chain_bw_up(&corridor, &AnalysisOptions::default()).unwrap();
        assert!(!first_only.is_feasible());

        let options = AnalysisOptions::default().with_phase_selection(PhaseSelection::BestPair);
        let best = chain_bw_up(&corridor, &options).unwrap();
        assert_eq!(best.band, Some(DiagonalBand::new(10.0, 30.0)));
    }

    #[test]
    fn test_fold_merges_overlapping_pieces() {
        let arrivals = [
            CyclicWindow::new(0.0, 30.0, 100.0),
            CyclicWindow::new(20.0, 30.0, 100.0),
        ];
        let merged = fold_arrival(&[DiagonalBand::new(10.0, 60.0)], &arrivals);
        assert_eq!(merged, vec![DiagonalBand::new(10.0, 50.0)]);
    }

    proptest! {
        #[test]
        fn prop_width_never_grows(
            phases in prop::collection::vec((0u32..100, 5u32..100, 0u32..100), 2..8),
            gap in 50.0..800.0f64,
        ) {
            let intersections: Vec<Intersection> = phases
                .iter()
                .enumerate()
                .map(|(i, &(start, duration, offset))| {
                    up_node(i as f64 * gap, start as f64, duration as f64).with_offset(offset as f64)
                })
                .collect();
            let corridor = Corridor::new(intersections).with_cycle_time(100.0);

            let chain = chain_bw_up(&corridor, &AnalysisOptions::default()).unwrap();
            let initial = phases[0].1 as f64;
            let mut previous = initial;
            for width in &chain.widths {
                prop_assert!(*width <= previous + 1e-9);
                previous = *width;
            }
            if let Some(width) = chain.width() {
                prop_assert!(width >= 0.0);
                prop_assert_eq!(chain.widths.len(), phases.len() - 1);
            } else {
                prop_assert!(chain.points.is_empty());
            }
        }
    }
}
