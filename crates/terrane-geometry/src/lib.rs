//! Terrane Geometry
//!
//! The geometry layer of Terrane:
//!
//! - [`Feature`] / [`FeatureCollection`]: GeoJSON-compatible input and output
//! - [`GeometryStore`]: identity-keyed storage with per-kind indices and cached bounds
//! - [`GeometryRenderer`]: per-kind renderers that turn features into drawables
//!   on a [`MapSurface`]
//!
//! # Example
//!
//! ```
//! use terrane_geometry::{AddOptions, Feature, GeometryStore};
//!
//! let mut store = GeometryStore::new();
//! store.add(Feature::point(-63.9039, -8.7619), AddOptions::new());
//! store.add(Feature::point(-63.8000, -8.7000), AddOptions::new());
//!
//! let bounds = store.calculate_bounds().unwrap();
//! assert_eq!(bounds.max_lng, -63.8);
//! ```

pub mod bounds;
pub mod error;
pub mod feature;
pub mod record;
pub mod renderer;
pub mod store;
pub mod style;
pub mod surface;

pub use bounds::Bounds;
pub use error::{GeometryError, GeometryResult, SurfaceError};
pub use feature::{Feature, FeatureCollection, Geometry, GeometryKind};
pub use record::{GeometryId, GeometryRecord};
pub use renderer::{
    CircleRenderer, DrawingRenderer, GeometryRenderer, LineStringRenderer, PointRenderer,
    PolygonRenderer, RemovalSummary, RenderMetadata, RendererCore, RendererRegistry,
};
pub use store::{AddOptions, ExportOptions, GeometryStore, RecordFilter, StoreStats, UpdateOptions};
pub use style::{Style, presets};
pub use surface::{DrawableHandle, DrawableShape, MapSurface};
