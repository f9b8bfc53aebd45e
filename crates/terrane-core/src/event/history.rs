//! Bounded event history.

use std::collections::VecDeque;

use super::EventRecord;

/// Fixed-capacity ring buffer of dispatched events.
///
/// Once `capacity` is reached every push evicts the oldest record. A capacity
/// of zero keeps nothing.
#[derive(Debug, Clone)]
pub struct EventHistory {
    records: VecDeque<EventRecord>,
    capacity: usize,
}

impl EventHistory {
    /// Create an empty history holding at most `capacity` records.
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity.min(1024)),
            capacity,
        }
    }

    /// Append a record, evicting from the front when full.
    pub fn push(&mut self, record: EventRecord) {
        if self.capacity == 0 {
            return;
        }
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Records oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &EventRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
