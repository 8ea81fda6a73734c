//! Bounded in-memory log of recent predictions.
//!
//! Entries live for the lifetime of the process only; the oldest entry is
//! evicted once capacity is reached.

use parking_lot::RwLock;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::domain::PredictionRecord;

#[derive(Clone)]
pub struct PredictionLog {
    entries: Arc<RwLock<VecDeque<PredictionRecord>>>,
    capacity: usize,
}

impl PredictionLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn record(&self, entry: PredictionRecord) {
        let mut entries = self.entries.write();
        if entries.len() == self.capacity {
            entries.pop_back();
        }
        entries.push_front(entry);
    }

    /// Total entry count and a newest-first slice, read under one lock
    pub fn page(&self, offset: usize, limit: usize) -> (usize, Vec<PredictionRecord>) {
        let entries = self.entries.read();
        let items = entries.iter().skip(offset).take(limit).cloned().collect();
        (entries.len(), items)
    }
}
