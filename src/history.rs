// src/history.rs
//
// Bounded, append-only history of recent measurements for plotting and export.
// Holds the last HISTORY_CAPACITY entries; the oldest is evicted on overflow.

use std::collections::VecDeque;

use serde::Serialize;

/// Maximum number of retained measurements
pub const HISTORY_CAPACITY: usize = 600;

/// One measurement point, stamped with wall-clock time at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// Microseconds since the Unix epoch
    pub timestamp_us: u64,
    pub position: i32,
    pub velocity: f64,
    pub temperature: f64,
}

/// Parallel series for plotting, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistoryColumns {
    pub timestamps_us: Vec<u64>,
    pub positions: Vec<i32>,
    pub velocities: Vec<f64>,
    pub temperatures: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct TimeSeriesHistory {
    entries: VecDeque<HistoryEntry>,
}

impl Default for TimeSeriesHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSeriesHistory {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Append a measurement, evicting the oldest one when full.
    pub fn append(&mut self, timestamp_us: u64, position: i32, velocity: f64, temperature: f64) {
        if self.entries.len() == HISTORY_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(HistoryEntry {
            timestamp_us,
            position,
            velocity,
            temperature,
        });
    }

    /// Point-in-time copy of the history, oldest first.
    pub fn snapshot(&self) -> Vec<HistoryEntry> {
        self.entries.iter().copied().collect()
    }

    pub fn columns(&self) -> HistoryColumns {
        let mut columns = HistoryColumns {
            timestamps_us: Vec::with_capacity(self.entries.len()),
            positions: Vec::with_capacity(self.entries.len()),
            velocities: Vec::with_capacity(self.entries.len()),
            temperatures: Vec::with_capacity(self.entries.len()),
        };
        for entry in &self.entries {
            columns.timestamps_us.push(entry.timestamp_us);
            columns.positions.push(entry.position);
            columns.velocities.push(entry.velocity);
            columns.temperatures.push(entry.temperature);
        }
        columns
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        HISTORY_CAPACITY
    }
}
