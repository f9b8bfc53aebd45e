//! Terrane Core
//!
//! This crate contains the leaf functionality shared by the Terrane crates:
//! geodesic math over longitude/latitude, the event bus, configuration and
//! logging/profiling setup.

pub mod alloc;
pub mod config;
pub mod event;
pub mod geodesy;
pub mod logging;
pub mod profiling;

pub use config::Config;
pub use event::{EventBus, EventRecord, EventStats, ListenerId, ListenerInfo};
pub use geodesy::LngLat;
