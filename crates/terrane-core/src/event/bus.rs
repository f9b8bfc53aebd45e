use std::time::Duration;

use chrono::Utc;
use serde_json::Value;

use super::{EventHistory, EventRecord, EventStats, ListenerId, ListenerInfo};
use crate::alloc::{HashMap, IndexMap};
use crate::config::DEFAULT_HISTORY_CAPACITY;

type Callback = Box<dyn FnMut(&EventRecord)>;

struct Handler {
    id: ListenerId,
    once: bool,
    callback: Callback,
}

/// Synchronous event bus with bounded history.
///
/// Listeners for an event run in registration order on the calling thread.
/// The dispatch table and the introspection registry are kept separately:
/// the former owns the callbacks, the latter only describes them.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use terrane_core::EventBus;
///
/// let mut bus = EventBus::new();
/// let id = bus.on("geometryAdded", |event| {
///     assert_eq!(event.payload["count"], 1);
/// });
/// bus.trigger("geometryAdded", json!({ "count": 1 }));
/// bus.off("geometryAdded", Some(id));
/// assert_eq!(bus.listener_count(Some("geometryAdded")), 0);
/// ```
pub struct EventBus {
    handlers: HashMap<String, Vec<Handler>>,
    registry: IndexMap<String, Vec<ListenerInfo>>,
    history: EventHistory,
    next_listener: u64,
    dispatched: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("registry", &self.registry)
            .field("history_len", &self.history.len())
            .field("dispatched", &self.dispatched)
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create a bus with the default history capacity.
    pub fn new() -> Self {
        Self::with_history_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// Create a bus keeping at most `capacity` events in history.
    pub fn with_history_capacity(capacity: usize) -> Self {
        Self {
            handlers: HashMap::new(),
            registry: IndexMap::default(),
            history: EventHistory::new(capacity),
            next_listener: 0,
            dispatched: 0,
        }
    }

    /// Register a listener for `name`.
    pub fn on(&mut self, name: impl Into<String>, callback: impl FnMut(&EventRecord) + 'static) -> ListenerId {
        self.register(name.into(), false, Box::new(callback))
    }

    /// Register a listener that is dropped after its first delivery.
    pub fn once(&mut self, name: impl Into<String>, callback: impl FnMut(&EventRecord) + 'static) -> ListenerId {
        self.register(name.into(), true, Box::new(callback))
    }

    fn register(&mut self, name: String, once: bool, callback: Callback) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;

        self.registry.entry(name.clone()).or_default().push(ListenerInfo {
            id,
            event: name.clone(),
            once,
            registered_at: Utc::now(),
        });
        self.handlers
            .entry(name)
            .or_default()
            .push(Handler { id, once, callback });

        id
    }

    /// Remove one listener (`Some(id)`) or every listener (`None`) for `name`.
    ///
    /// Returns the number of listeners removed.
    pub fn off(&mut self, name: &str, listener: Option<ListenerId>) -> usize {
        let removed = match self.handlers.get_mut(name) {
            Some(handlers) => {
                let before = handlers.len();
                match listener {
                    Some(id) => handlers.retain(|h| h.id != id),
                    None => handlers.clear(),
                }
                before - handlers.len()
            }
            None => 0,
        };

        if let Some(infos) = self.registry.get_mut(name) {
            match listener {
                Some(id) => infos.retain(|info| info.id != id),
                None => infos.clear(),
            }
        }
        self.prune(name);

        removed
    }

    /// Remove every listener for every event.
    pub fn off_all(&mut self) -> usize {
        let removed = self.handlers.values().map(Vec::len).sum();
        self.handlers.clear();
        self.registry.clear();
        removed
    }

    fn prune(&mut self, name: &str) {
        if self.handlers.get(name).is_some_and(Vec::is_empty) {
            self.handlers.remove(name);
        }
        if self.registry.get(name).is_some_and(Vec::is_empty) {
            self.registry.shift_remove(name);
        }
    }

    /// Dispatch an event to every listener registered for `name`.
    ///
    /// The record is stamped, appended to history and then delivered. The
    /// returned record is the one listeners saw.
    pub fn trigger(&mut self, name: impl Into<String>, payload: Value) -> EventRecord {
        let record = EventRecord::new(name, payload, self.dispatched);
        self.dispatched += 1;
        self.history.push(record.clone());

        let mut fired_once = Vec::new();
        if let Some(handlers) = self.handlers.get_mut(&record.name) {
            for handler in handlers.iter_mut() {
                (handler.callback)(&record);
                if handler.once {
                    fired_once.push(handler.id);
                }
            }
            handlers.retain(|h| !h.once);
        }

        if !fired_once.is_empty() {
            if let Some(infos) = self.registry.get_mut(&record.name) {
                infos.retain(|info| !fired_once.contains(&info.id));
            }
            self.prune(&record.name);
        }

        tracing::trace!(
            event = %record.name,
            sequence = record.sequence,
            "event dispatched"
        );

        record
    }

    /// Dispatch `events` strictly in order, pausing `delay` between entries.
    ///
    /// A zero delay yields to the executor instead of arming a timer. The
    /// future resolves once the last entry has been dispatched.
    pub async fn trigger_sequence<I, N>(&mut self, events: I, delay: Duration) -> Vec<EventRecord>
    where
        I: IntoIterator<Item = (N, Value)>,
        N: Into<String>,
    {
        let mut dispatched = Vec::new();
        for (index, (name, payload)) in events.into_iter().enumerate() {
            if index > 0 {
                pause(delay).await;
            }
            dispatched.push(self.trigger(name, payload));
        }
        dispatched
    }

    /// Listeners registered for `name`, in registration order.
    pub fn listeners(&self, name: &str) -> Vec<ListenerInfo> {
        self.registry.get(name).cloned().unwrap_or_default()
    }

    /// Listener count for one event, or for all events with `None`.
    pub fn listener_count(&self, name: Option<&str>) -> usize {
        match name {
            Some(name) => self.registry.get(name).map_or(0, Vec::len),
            None => self.registry.values().map(Vec::len).sum(),
        }
    }

    /// Names with at least one listener.
    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.registry.keys().map(String::as_str)
    }

    pub fn event_stats(&self) -> EventStats {
        let mut events_by_name: IndexMap<String, usize> = IndexMap::default();
        for record in self.history.iter() {
            *events_by_name.entry(record.name.clone()).or_default() += 1;
        }

        EventStats {
            total_dispatched: self.dispatched,
            history_len: self.history.len(),
            history_capacity: self.history.capacity(),
            events_by_name,
            listeners_by_name: self
                .registry
                .iter()
                .map(|(name, infos)| (name.clone(), infos.len()))
                .collect(),
        }
    }

    /// Dispatched events, oldest first.
    pub fn history(&self) -> Vec<&EventRecord> {
        self.history.iter().collect()
    }

    /// Dispatched events named `name`, oldest first.
    pub fn history_for(&self, name: &str) -> Vec<&EventRecord> {
        self.history.iter().filter(|r| r.name == name).collect()
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn history_capacity(&self) -> usize {
        self.history.capacity()
    }
}

async fn pause(delay: Duration) {
    if delay.is_zero() {
        futures_lite::future::yield_now().await;
    } else {
        smol::Timer::after(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl FnMut(&EventRecord) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |event: &EventRecord| sink.borrow_mut().push(event.name.clone()))
    }

    #[test]
    fn test_trigger_delivers_in_registration_order() {
        let mut bus = EventBus::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let order = order.clone();
            bus.on("ping", move |_| order.borrow_mut().push(tag));
        }

        bus.trigger("ping", Value::Null);
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_trigger_stamps_name_and_history() {
        let mut bus = EventBus::new();
        let record = bus.trigger("cleared", json!({}));
        assert_eq!(record.name, "cleared");
        assert_eq!(bus.history().len(), 1);
        assert_eq!(bus.history()[0], &record);
        assert!(record.iso_timestamp().ends_with('Z'));
    }

    #[test]
    fn test_once_fires_a_single_time() {
        let mut bus = EventBus::new();
        let (seen, callback) = recorder();
        bus.once("ping", callback);
        assert_eq!(bus.listener_count(Some("ping")), 1);

        bus.trigger("ping", Value::Null);
        bus.trigger("ping", Value::Null);

        assert_eq!(seen.borrow().len(), 1);
        assert_eq!(bus.listener_count(Some("ping")), 0);
    }

    #[test]
    fn test_off_single_listener() {
        let mut bus = EventBus::new();
        let (seen_a, a) = recorder();
        let (seen_b, b) = recorder();
        let id_a = bus.on("ping", a);
        bus.on("ping", b);

        assert_eq!(bus.off("ping", Some(id_a)), 1);
        bus.trigger("ping", Value::Null);

        assert!(seen_a.borrow().is_empty());
        assert_eq!(seen_b.borrow().len(), 1);
    }

    #[test]
    fn test_off_without_id_removes_all_for_name() {
        let mut bus = EventBus::new();
        bus.on("ping", |_| {});
        bus.on("ping", |_| {});
        bus.on("pong", |_| {});

        assert_eq!(bus.off("ping", None), 2);
        assert_eq!(bus.listener_count(None), 1);
        assert_eq!(bus.off("missing", None), 0);
    }

    #[test]
    fn test_off_all() {
        let mut bus = EventBus::new();
        bus.on("ping", |_| {});
        bus.once("pong", |_| {});
        assert_eq!(bus.off_all(), 2);
        assert_eq!(bus.listener_count(None), 0);
        assert_eq!(bus.event_names().count(), 0);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut bus = EventBus::with_history_capacity(2);
        for n in 0..5 {
            bus.trigger("tick", json!(n));
        }
        let payloads: Vec<_> = bus.history().iter().map(|r| r.payload.clone()).collect();
        assert_eq!(payloads, vec![json!(3), json!(4)]);
        assert_eq!(bus.event_stats().total_dispatched, 5);
    }

    #[test]
    fn test_event_stats() {
        let mut bus = EventBus::new();
        bus.on("a", |_| {});
        bus.on("a", |_| {});
        bus.on("b", |_| {});
        bus.trigger("a", Value::Null);
        bus.trigger("a", Value::Null);
        bus.trigger("c", Value::Null);

        let stats = bus.event_stats();
        assert_eq!(stats.history_len, 3);
        assert_eq!(stats.events_by_name.get("a"), Some(&2));
        assert_eq!(stats.events_by_name.get("c"), Some(&1));
        assert_eq!(stats.listeners_by_name.get("a"), Some(&2));
        assert_eq!(stats.total_listeners(), 3);
    }

    #[test]
    fn test_listener_introspection() {
        let mut bus = EventBus::new();
        let id = bus.once("ping", |_| {});
        let infos = bus.listeners("ping");
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].id, id);
        assert!(infos[0].once);
        assert!(bus.listeners("missing").is_empty());
    }

    #[test]
    fn test_trigger_sequence_zero_delay() {
        let mut bus = EventBus::new();
        let (seen, callback) = recorder();
        bus.on("a", callback);

        let records = futures_lite::future::block_on(bus.trigger_sequence(
            vec![("a", json!(1)), ("b", json!(2)), ("a", json!(3))],
            Duration::ZERO,
        ));

        assert_eq!(records.len(), 3);
        assert_eq!(seen.borrow().len(), 2);
        let names: Vec<_> = bus.history().iter().map(|r| r.name.clone()).collect();
        assert_eq!(names, vec!["a", "b", "a"]);
    }
}
