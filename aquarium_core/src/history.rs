//! Bounded rolling history of temperature samples.
//!
//! Three parallel sequences (water, air, label) are kept in lock-step: every
//! append pushes to all three and, once over capacity, pops the oldest entry
//! of all three. Readers get an owned [`HistorySeries`] copy.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// 24 hours at one sample every 10 minutes.
pub const DEFAULT_CAPACITY: usize = 144;

/// One history point.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub water: f64,
    pub air: f64,
    /// `HH:MM` of the sample instant.
    pub label: String,
}

/// Immutable history view returned to API consumers, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySeries {
    pub water: Vec<f64>,
    pub air: Vec<f64>,
    pub labels: Vec<String>,
}

impl HistorySeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Capacity-bounded FIFO of samples.
#[derive(Debug, Clone)]
pub struct HistoryRing {
    water: VecDeque<f64>,
    air: VecDeque<f64>,
    labels: VecDeque<String>,
    capacity: usize,
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl HistoryRing {
    /// Capacity is fixed for the ring's lifetime; clamped to at least 1.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        // Storage grows on demand past the default window.
        let reserve = capacity.min(DEFAULT_CAPACITY);
        Self {
            water: VecDeque::with_capacity(reserve),
            air: VecDeque::with_capacity(reserve),
            labels: VecDeque::with_capacity(reserve),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Append a sample, evicting the oldest one when over capacity.
    /// Returns true when an eviction happened.
    pub fn append(&mut self, sample: Sample) -> bool {
        self.water.push_back(sample.water);
        self.air.push_back(sample.air);
        self.labels.push_back(sample.label);
        if self.labels.len() > self.capacity {
            self.water.pop_front();
            self.air.pop_front();
            self.labels.pop_front();
            return true;
        }
        false
    }

    pub fn snapshot(&self) -> HistorySeries {
        HistorySeries {
            water: self.water.iter().copied().collect(),
            air: self.air.iter().copied().collect(),
            labels: self.labels.iter().cloned().collect(),
        }
    }
}
