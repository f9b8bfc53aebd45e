//! Terrane - geographic feature management for interactive maps
//!
//! Terrane keeps an in-memory collection of GeoJSON-style features, renders
//! each one onto a map through a per-kind renderer and reports every change
//! on an event bus:
//!
//! - **Store**: identity-keyed records with per-kind indices and cached bounds
//! - **Renderers**: points, lines, polygons, circles and free-hand drawings,
//!   with length, perimeter and area computed on the way
//! - **Events**: batched `geometryAdded` / `geometryUpdated` / `geometryRemoved`
//!   events plus interaction events, with a bounded history
//!
//! The map itself is abstracted behind [`MapSurface`](terrane_geometry::MapSurface);
//! Terrane never manages tiles or the viewport beyond fitting it to bounds.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use terrane::prelude::*;
//!
//! terrane::logging::init();
//!
//! let mut manager = GeometryManager::new(Arc::new(MyLeafletBridge::new()));
//! manager.events_mut().on("geometryAdded", |event| {
//!     println!("added {}", event.payload["count"]);
//! });
//!
//! manager.load_geojson_str(include_str!("zones.geojson"));
//! manager.fit_to_bounds();
//! ```

pub mod events;
pub mod manager;

// Re-export sub-crates
pub use terrane_core as core;
pub use terrane_core::{logging, profiling};
pub use terrane_geometry as geometry;

pub use events::GeometryEvent;
pub use manager::{GeometryManager, ManagerConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::events::GeometryEvent;
    pub use crate::manager::{GeometryManager, ManagerConfig};

    pub use terrane_core::{Config, EventBus, EventRecord, ListenerId, LngLat};

    pub use terrane_geometry::{
        AddOptions, Bounds, DrawableHandle, ExportOptions, Feature, FeatureCollection, Geometry,
        GeometryError, GeometryId, GeometryKind, GeometryRecord, GeometryRenderer, MapSurface,
        RecordFilter, RenderMetadata, Style, SurfaceError, UpdateOptions, presets,
    };
}
