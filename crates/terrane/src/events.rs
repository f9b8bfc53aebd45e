//! Lifecycle events emitted by [`GeometryManager`](crate::GeometryManager).
//!
//! Events travel over the untyped [`EventBus`](terrane_core::EventBus) as a
//! name plus JSON payload; [`GeometryEvent`] is the typed view used to build
//! them.

use serde_json::{Value, json};
use terrane_geometry::{Feature, GeometryId};

pub const GEOMETRY_ADDED: &str = "geometryAdded";
pub const GEOMETRY_UPDATED: &str = "geometryUpdated";
pub const GEOMETRY_REMOVED: &str = "geometryRemoved";
pub const GEOMETRY_CLICKED: &str = "geometryClicked";
pub const GEOMETRY_HOVERED: &str = "geometryHovered";
pub const GEOMETRY_UNHOVERED: &str = "geometryUnhovered";
pub const CLEARED: &str = "cleared";
pub const ERROR: &str = "error";

/// A geometry lifecycle or interaction event.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryEvent {
    /// One batch of features was added.
    Added { uuids: Vec<GeometryId> },
    Updated { uuids: Vec<GeometryId> },
    Removed { uuids: Vec<GeometryId> },
    Clicked { uuid: GeometryId, geometry: Feature },
    Hovered { uuid: GeometryId, geometry: Feature },
    Unhovered { uuid: GeometryId, geometry: Feature },
    /// Every geometry was removed.
    Cleared,
    /// A failure that did not abort the operation in progress.
    Error { message: String },
}

impl GeometryEvent {
    /// Bus event name.
    pub fn name(&self) -> &'static str {
        match self {
            GeometryEvent::Added { .. } => GEOMETRY_ADDED,
            GeometryEvent::Updated { .. } => GEOMETRY_UPDATED,
            GeometryEvent::Removed { .. } => GEOMETRY_REMOVED,
            GeometryEvent::Clicked { .. } => GEOMETRY_CLICKED,
            GeometryEvent::Hovered { .. } => GEOMETRY_HOVERED,
            GeometryEvent::Unhovered { .. } => GEOMETRY_UNHOVERED,
            GeometryEvent::Cleared => CLEARED,
            GeometryEvent::Error { .. } => ERROR,
        }
    }

    /// Bus payload.
    ///
    /// Batch events carry `{ uuids, count }`, interaction events
    /// `{ uuid, geometry }` with the feature as GeoJSON.
    pub fn payload(&self) -> Value {
        match self {
            GeometryEvent::Added { uuids }
            | GeometryEvent::Updated { uuids }
            | GeometryEvent::Removed { uuids } => json!({
                "uuids": uuids,
                "count": uuids.len(),
            }),
            GeometryEvent::Clicked { uuid, geometry }
            | GeometryEvent::Hovered { uuid, geometry }
            | GeometryEvent::Unhovered { uuid, geometry } => json!({
                "uuid": uuid,
                "geometry": geometry.to_value(),
            }),
            GeometryEvent::Cleared => json!({}),
            GeometryEvent::Error { message } => json!({ "message": message }),
        }
    }
}
