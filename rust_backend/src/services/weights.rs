//! Objective weights sent to the offset oracle.
//!
//! The four weights always sum to one. Moving one slider locks it; the
//! remaining share is spread over the categories the user has not touched yet.
//! The set of touched categories travels with the weights instead of living in
//! shared state, so every update is a pure function of its inputs.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, EngineResult};

const SUM_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightCategory {
    UpstreamBandwidth,
    DownstreamBandwidth,
    Stops,
    Delay,
}

impl WeightCategory {
    pub const ALL: [WeightCategory; 4] = [
        WeightCategory::UpstreamBandwidth,
        WeightCategory::DownstreamBandwidth,
        WeightCategory::Stops,
        WeightCategory::Delay,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationWeights {
    pub upstream_bandwidth: f64,
    pub downstream_bandwidth: f64,
    pub stops: f64,
    pub delay: f64,
}

impl Default for OptimizationWeights {
    fn default() -> Self {
        Self {
            upstream_bandwidth: 0.25,
            downstream_bandwidth: 0.25,
            stops: 0.25,
            delay: 0.25,
        }
    }
}

impl OptimizationWeights {
    pub fn get(&self, category: WeightCategory) -> f64 {
        match category {
            WeightCategory::UpstreamBandwidth => self.upstream_bandwidth,
            WeightCategory::DownstreamBandwidth => self.downstream_bandwidth,
            WeightCategory::Stops => self.stops,
            WeightCategory::Delay => self.delay,
        }
    }

    fn set(&mut self, category: WeightCategory, value: f64) {
        match category {
            WeightCategory::UpstreamBandwidth => self.upstream_bandwidth = value,
            WeightCategory::DownstreamBandwidth => self.downstream_bandwidth = value,
            WeightCategory::Stops => self.stops = value,
            WeightCategory::Delay => self.delay = value,
        }
    }

    pub fn total(&self) -> f64 {
        WeightCategory::ALL.iter().map(|&c| self.get(c)).sum()
    }

    /// Checks every weight lies in `[0, 1]` and the weights sum to one.
    pub fn validate(&self) -> EngineResult<()> {
        for category in WeightCategory::ALL {
            let value = self.get(category);
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(EngineError::InvalidInput(format!(
                    "weight {:?} must be within [0, 1], got {}",
                    category, value
                )));
            }
        }
        let total = self.total();
        if (total - 1.0).abs() > 1e-6 {
            return Err(EngineError::InvalidInput(format!(
                "weights must sum to 1, got {}",
                total
            )));
        }
        Ok(())
    }
}

/// Weights after an update, with the categories the user has set so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightUpdate {
    pub weights: OptimizationWeights,
    pub modified: BTreeSet<WeightCategory>,
}

/// Set `category` to `value` and rebalance the others.
///
/// `value` is clamped to `[0, 1]`. The remaining `1 - locked` share, where
/// `locked` is the sum of every modified category, goes to the unmodified
/// categories in proportion to their current weights (equally when they are
/// all zero). If the modified categories already exceed one, they are scaled
/// down to fit next to `value` and the unmodified ones drop to zero. Once
/// every other category is modified, all of them are scaled to fill `1 - value`.
///
/// # Example
/// ```
/// use std::collections::BTreeSet;
/// use greenwave_rust::services::weights::{update_weight, OptimizationWeights, WeightCategory};
///
/// let update = update_weight(
///     &OptimizationWeights::default(),
///     &BTreeSet::new(),
///     WeightCategory::Stops,
///     0.4,
/// )
/// .unwrap();
///
/// assert_eq!(update.weights.stops, 0.4);
/// assert!((update.weights.delay - 0.2).abs() < 1e-9);
/// assert!(update.modified.contains(&WeightCategory::Stops));
/// ```
pub fn update_weight(
    weights: &OptimizationWeights,
    modified: &BTreeSet<WeightCategory>,
    category: WeightCategory,
    value: f64,
) -> EngineResult<WeightUpdate> {
    if !value.is_finite() {
        return Err(EngineError::InvalidInput(format!(
            "weight for {:?} is not a finite number",
            category
        )));
    }
    let value = value.clamp(0.0, 1.0);

    let mut modified = modified.clone();
    modified.insert(category);

    let others: Vec<WeightCategory> = WeightCategory::ALL
        .into_iter()
        .filter(|&c| c != category)
        .collect();
    let (locked, free): (Vec<_>, Vec<_>) = others.into_iter().partition(|c| modified.contains(c));

    let mut next = *weights;
    next.set(category, value);

    let available = 1.0 - value;
    let locked_sum: f64 = locked.iter().map(|&c| weights.get(c)).sum();

    if free.is_empty() {
        spread(&mut next, &locked, available);
    } else if locked_sum > available + SUM_TOLERANCE {
        spread(&mut next, &locked, available);
        for &c in &free {
            next.set(c, 0.0);
        }
    } else {
        spread(&mut next, &free, available - locked_sum);
    }

    Ok(WeightUpdate {
        weights: next,
        modified,
    })
}

/// Distribute `share` over `categories` in proportion to their current weights.
fn spread(weights: &mut OptimizationWeights, categories: &[WeightCategory], share: f64) {
    if categories.is_empty() {
        return;
    }
    let share = share.max(0.0);
    let current: f64 = categories.iter().map(|&c| weights.get(c)).sum();

    for &c in categories {
        let value = if current > SUM_TOLERANCE {
            share * weights.get(c) / current
        } else {
            share / categories.len() as f64
        };
        weights.set(c, value);
    }
}
