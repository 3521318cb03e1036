//! Display lines for the edges of the diagonal band.
//!
//! The time–distance chart shows a single cycle on its time axis. A band edge
//! that climbs past the end of the cycle is cut at the seam and continued from
//! zero, with the cut position found by linear interpolation along the segment.

use serde::{Deserialize, Serialize};

use super::chain::ChainResult;
use crate::core::domain::Direction;
use crate::time::normalize;

/// Which edge of the band a line traces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandEdge {
    Low,
    Top,
}

/// A point on the time–distance chart: meters along the corridor, seconds in the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    pub distance: f64,
    pub time: f64,
}

impl LinePoint {
    pub fn new(distance: f64, time: f64) -> Self {
        Self { distance, time }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: LinePoint,
    pub end: LinePoint,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagonalLine {
    pub direction: Direction,
    pub edge: BandEdge,
    pub color: String,
    pub segments: Vec<LineSegment>,
}

/// Turn a sequence of edge points into chart segments within `[0, cycle_time]`.
///
/// Points are given in travel order with absolute times. Each segment starts at
/// the normalised time of its first point and rises by the travel delta; when
/// the destination exceeds `cycle_time` the segment is split at
///
/// `x = x0 + (x1 - x0) * (C - t0) / ((t1' + C) - t0)`
///
/// where `t1'` is the destination time wrapped back into the cycle. The first
/// part ends at `(x, C)` and the continuation starts at `(x, 0)`.
///
/// # Example
/// ```
/// use greenwave_rust::algorithms::{split_at_cycle_boundary, LinePoint};
///
/// let segments = split_at_cycle_boundary(
///     &[LinePoint::new(0.0, 80.0), LinePoint::new(400.0, 120.0)],
///     100.0,
/// );
/// assert_eq!(segments.len(), 2);
/// assert_eq!(segments[0].end, LinePoint::new(200.0, 100.0));
/// assert_eq!(segments[1].start, LinePoint::new(200.0, 0.0));
/// assert_eq!(segments[1].end, LinePoint::new(400.0, 20.0));
/// ```
pub fn split_at_cycle_boundary(points: &[LinePoint], cycle_time: f64) -> Vec<LineSegment> {
    let mut segments = Vec::with_capacity(points.len());

    for pair in points.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        let mut start = LinePoint::new(current.distance, normalize(current.time, cycle_time));
        let mut destination = start.time + (next.time - current.time);

        while destination > cycle_time {
            let wrapped = destination - cycle_time;
            let intersect_x = start.distance
                + (next.distance - start.distance) * (cycle_time - start.time)
                    / ((wrapped + cycle_time) - start.time);

            segments.push(LineSegment {
                start,
                end: LinePoint::new(intersect_x, cycle_time),
            });
            start = LinePoint::new(intersect_x, 0.0);
            destination = wrapped;
        }

        segments.push(LineSegment {
            start,
            end: LinePoint::new(next.distance, destination),
        });
    }

    segments
}

/// Low and top edge lines of a feasible chain, in that order.
///
/// An infeasible chain draws nothing.
pub fn build_diagonal_lines(chain: &ChainResult, cycle_time: f64, color: &str) -> Vec<DiagonalLine> {
    if !chain.is_feasible() || chain.points.len() < 2 {
        return Vec::new();
    }

    [BandEdge::Low, BandEdge::Top]
        .into_iter()
        .map(|edge| {
            let points: Vec<LinePoint> = chain
                .points
                .iter()
                .map(|point| {
                    let time = match edge {
                        BandEdge::Low => point.low,
                        BandEdge::Top => point.top,
                    };
                    LinePoint::new(point.distance, time)
                })
                .collect();

            DiagonalLine {
                direction: chain.direction,
                edge,
                color: color.to_string(),
                segments: split_at_cycle_boundary(&points, cycle_time),
            }
        })
        .collect()
}
