use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, warn};

use super::error::{MetricsError, Result, ensure_finite};
use super::types::{ALLOCATION_TOLERANCE, ALLOCATION_TOTAL, Allocation, AllocationSet};

impl AllocationSet {
    /// Validates caller-supplied allocations: unique ids, each percentage in
    /// `0..=100`, summing to the fixed total.
    pub fn new(entries: Vec<Allocation>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(entries.len());
        for entry in &entries {
            if !seen.insert(entry.id.as_str()) {
                return Err(MetricsError::DuplicateAsset(entry.id.clone()));
            }
            if !(entry.percent.is_finite() && (0.0..=ALLOCATION_TOTAL).contains(&entry.percent)) {
                return Err(MetricsError::InvalidParameter {
                    name: "allocation percent",
                    value: entry.percent,
                });
            }
        }

        let set = Self { entries };
        let total = set.total();
        if (total - ALLOCATION_TOTAL).abs() > ALLOCATION_TOLERANCE {
            return Err(MetricsError::OffTotal {
                expected: ALLOCATION_TOTAL,
                actual: total,
            });
        }
        Ok(set)
    }

    pub fn entries(&self) -> &[Allocation] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<f64> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.percent)
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.percent).sum()
    }

    pub fn is_balanced(&self) -> bool {
        (self.total() - ALLOCATION_TOTAL).abs() <= ALLOCATION_TOLERANCE
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RebalanceBranch {
    /// Every other entry absorbed its share of the delta.
    Proportional,
    /// At least one other entry hit the zero floor; the set may fall short of
    /// the total.
    FloorClamped,
    /// The other entries were all zero, so nothing could absorb the delta.
    NoRedistributionRoom,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rebalanced {
    pub allocations: AllocationSet,
    pub branch: RebalanceBranch,
    pub clamped: Vec<String>,
}

/// Sets `changed_id` to `new_value` and spreads the opposite of the change
/// across the other entries in proportion to their current weight, flooring
/// each at zero. No second pass recovers what a floor clamp drops.
pub fn rebalance(set: &AllocationSet, changed_id: &str, new_value: f64) -> Result<Rebalanced> {
    let new_value = ensure_finite("allocation percent", new_value)?;
    let old_value = set
        .get(changed_id)
        .ok_or_else(|| MetricsError::UnknownAsset(changed_id.to_string()))?;

    let delta = new_value - old_value;
    let others_total: f64 = set
        .entries
        .iter()
        .filter(|e| e.id != changed_id)
        .map(|e| e.percent)
        .sum();

    let mut clamped = Vec::new();
    let entries = set
        .entries
        .iter()
        .map(|entry| {
            let percent = if entry.id == changed_id {
                new_value
            } else if others_total == 0.0 {
                entry.percent
            } else {
                let adjusted = entry.percent - delta * (entry.percent / others_total);
                if adjusted < 0.0 {
                    clamped.push(entry.id.clone());
                    0.0
                } else {
                    adjusted
                }
            };
            Allocation {
                id: entry.id.clone(),
                percent,
            }
        })
        .collect();

    let branch = if others_total == 0.0 {
        RebalanceBranch::NoRedistributionRoom
    } else if clamped.is_empty() {
        RebalanceBranch::Proportional
    } else {
        RebalanceBranch::FloorClamped
    };

    let allocations = AllocationSet { entries };
    debug!(changed_id, delta, others_total, ?branch, "rebalanced allocations");
    if !allocations.is_balanced() {
        warn!(
            changed_id,
            total = allocations.total(),
            ?branch,
            "allocations no longer sum to the fixed total"
        );
    }

    Ok(Rebalanced {
        allocations,
        branch,
        clamped,
    })
}

/// Percentage-weighted sum of a per-asset metric, e.g. a blended return.
pub fn weighted_aggregate(set: &AllocationSet, metrics: &BTreeMap<String, f64>) -> Result<f64> {
    let mut aggregate = 0.0;
    for entry in &set.entries {
        let metric = metrics
            .get(&entry.id)
            .ok_or_else(|| MetricsError::MissingMetric(entry.id.clone()))?;
        aggregate += entry.percent / 100.0 * metric;
    }
    Ok(aggregate)
}

/// One caller-owned allocation set, updated read-modify-write under a lock so
/// readers only ever see a fully committed set.
#[derive(Debug)]
pub struct SharedAllocations {
    inner: Mutex<AllocationSet>,
}

impl SharedAllocations {
    pub fn new(set: AllocationSet) -> Self {
        Self {
            inner: Mutex::new(set),
        }
    }

    pub fn snapshot(&self) -> AllocationSet {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, set: AllocationSet) {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = set;
    }

    pub fn set_allocation(&self, changed_id: &str, new_value: f64) -> Result<Rebalanced> {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let outcome = rebalance(&guard, changed_id, new_value)?;
        *guard = outcome.allocations.clone();
        Ok(outcome)
    }

    pub fn weighted_aggregate(&self, metrics: &BTreeMap<String, f64>) -> Result<f64> {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        weighted_aggregate(&guard, metrics)
    }
}
