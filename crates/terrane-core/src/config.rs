use crate::geodesy::CLOSURE_TOLERANCE_DEG;

/// Default number of events kept in the event history ring buffer.
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Configuration shared by the Terrane components.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Maximum number of [`EventRecord`](crate::EventRecord)s kept in history.
    pub history_capacity: usize,
    /// Angular tolerance (degrees) used by the ring-closure test.
    pub closure_tolerance: f64,
    /// Whether renderers log every drawable create/remove.
    pub debug_renderers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            closure_tolerance: CLOSURE_TOLERANCE_DEG,
            debug_renderers: false,
        }
    }
}

impl Config {
    /// Set the event history capacity.
    pub fn with_history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = capacity;
        self
    }

    /// Set the ring-closure tolerance in degrees.
    pub fn with_closure_tolerance(mut self, tolerance: f64) -> Self {
        self.closure_tolerance = tolerance;
        self
    }

    /// Enable or disable renderer debug logging.
    pub fn with_debug_renderers(mut self, enabled: bool) -> Self {
        self.debug_renderers = enabled;
        self
    }
}
