//! Generic, string-keyed event bus.
//!
//! Events carry a free-form JSON payload. Every dispatched event is stamped
//! with its name, a UTC timestamp and a monotonically increasing sequence
//! number before listeners see it, and a copy is kept in a bounded history.

mod bus;
mod history;

pub use bus::EventBus;
pub use history::EventHistory;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::alloc::IndexMap;

/// A dispatched event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    /// Event name, e.g. `geometryAdded`.
    pub name: String,
    /// Free-form payload.
    pub payload: Value,
    /// Time of dispatch.
    pub timestamp: DateTime<Utc>,
    /// Dispatch order within the owning bus.
    pub sequence: u64,
}

impl EventRecord {
    /// Stamp a new record with the current time.
    pub fn new(name: impl Into<String>, payload: Value, sequence: u64) -> Self {
        Self {
            name: name.into(),
            payload,
            timestamp: Utc::now(),
            sequence,
        }
    }

    /// Timestamp formatted as ISO 8601 with millisecond precision.
    pub fn iso_timestamp(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Token identifying one registered listener.
///
/// Returned by [`EventBus::on`] and [`EventBus::once`]; pass it to
/// [`EventBus::off`] to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub(crate) u64);

impl ListenerId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Introspection entry for a registered listener.
#[derive(Debug, Clone, PartialEq)]
pub struct ListenerInfo {
    pub id: ListenerId,
    pub event: String,
    pub once: bool,
    pub registered_at: DateTime<Utc>,
}

/// Snapshot of bus activity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventStats {
    /// Events dispatched since the bus was created.
    pub total_dispatched: u64,
    /// Records currently held in history.
    pub history_len: usize,
    pub history_capacity: usize,
    /// History record count per event name, in first-seen order.
    pub events_by_name: IndexMap<String, usize>,
    /// Live listener count per event name, in registration order.
    pub listeners_by_name: IndexMap<String, usize>,
}

impl EventStats {
    pub fn total_listeners(&self) -> usize {
        self.listeners_by_name.values().sum()
    }
}
