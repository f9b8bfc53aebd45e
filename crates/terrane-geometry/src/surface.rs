//! The map surface collaborator.
//!
//! The surface is whatever actually draws on a map: a widget, a web bridge,
//! a test double. Terrane never manages tiles, zoom or panning; it only asks
//! the surface to create and remove drawables and to frame a bounding box.

use serde::Serialize;
use terrane_core::LngLat;

use crate::{Bounds, Style, SurfaceError};

/// Opaque reference to a drawable living on the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawableHandle(u64);

impl DrawableHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }
}

/// Shape of a drawable as created on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawableShape {
    Point,
    Polyline,
    Polygon,
    Circle,
}

/// Operations Terrane consumes from the map surface.
///
/// Methods take `&self` so one surface can be shared (via `Arc`) by every
/// renderer; implementations use interior mutability for their own state.
///
/// # Example
///
/// ```rust,no_run
/// use terrane_core::LngLat;
/// use terrane_geometry::{MapSurface, Style};
///
/// fn mark(surface: &dyn MapSurface) {
///     let handle = surface
///         .create_point(LngLat::new(-63.9, -8.76), &Style::new())
///         .expect("surface rejected point");
///     surface.remove_drawable(handle).ok();
/// }
/// ```
pub trait MapSurface: Send + Sync {
    /// Create a point marker.
    fn create_point(&self, position: LngLat, style: &Style) -> Result<DrawableHandle, SurfaceError>;

    /// Create an open polyline through `path`.
    fn create_line(&self, path: &[LngLat], style: &Style) -> Result<DrawableHandle, SurfaceError>;

    /// Create a filled polygon from its outer ring.
    fn create_polygon(&self, ring: &[LngLat], style: &Style) -> Result<DrawableHandle, SurfaceError>;

    /// Create a circle of `radius` meters.
    fn create_circle(
        &self,
        center: LngLat,
        radius: f64,
        style: &Style,
    ) -> Result<DrawableHandle, SurfaceError>;

    /// Remove a drawable previously created by this surface.
    fn remove_drawable(&self, handle: DrawableHandle) -> Result<(), SurfaceError>;

    /// Bounds of a drawable, if it is still on the surface.
    fn drawable_bounds(&self, handle: DrawableHandle) -> Option<Bounds>;

    /// Position of a single-coordinate drawable (point, circle center).
    fn drawable_position(&self, handle: DrawableHandle) -> Option<LngLat>;

    /// Fit the visible viewport to `bounds`.
    fn fit_bounds(&self, bounds: Bounds);
}
