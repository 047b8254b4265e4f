//! Bounded transition log

use std::collections::VecDeque;

use crate::types::TransitionRecord;

/// Transitions kept for diagnostics.
pub const HISTORY_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
pub(crate) struct TransitionLog {
    capacity: usize,
    records: VecDeque<TransitionRecord>,
}

impl Default for TransitionLog {
    fn default() -> Self {
        Self::new(HISTORY_CAPACITY)
    }
}

impl TransitionLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: VecDeque::new(),
        }
    }

    pub fn push(&mut self, record: TransitionRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// The `limit` most recent records, oldest first.
    pub fn recent(&self, limit: usize) -> Vec<TransitionRecord> {
        let skip = self.records.len().saturating_sub(limit);
        self.records.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}
