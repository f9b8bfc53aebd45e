//! Per-kind renderers.
//!
//! A renderer turns a stored feature into one drawable on the [`MapSurface`]
//! and remembers the handle plus the metrics it computed on the way. There is
//! one renderer per [`GeometryKind`], composed in a [`RendererRegistry`].
//!
//! All renderers share their bookkeeping through [`RendererCore`]; the trait's
//! default methods delegate to it, so an implementation only has to provide
//! [`GeometryRenderer::render`].
//!
//! [`MapSurface`]: crate::MapSurface

mod base;
mod circle;
mod drawing;
mod line;
mod point;
mod polygon;
mod registry;

use serde::Serialize;
use terrane_core::LngLat;

use crate::{DrawableHandle, DrawableShape, Feature, GeometryId, GeometryKind, GeometryResult, Style};

pub use base::{RemovalSummary, RenderedEntry, RendererCore};
pub use circle::CircleRenderer;
pub use drawing::DrawingRenderer;
pub use line::LineStringRenderer;
pub use point::PointRenderer;
pub use polygon::PolygonRenderer;
pub use registry::RendererRegistry;

/// Metrics computed while rendering one geometry.
///
/// Lengths are in meters and areas in square meters.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderMetadata {
    pub shape: DrawableShape,
    pub length: f64,
    pub perimeter: f64,
    pub area: f64,
    pub is_closed: bool,
    pub vertex_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub centroid: Option<LngLat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

impl RenderMetadata {
    /// Metadata with every metric zeroed.
    pub fn new(shape: DrawableShape, vertex_count: usize) -> Self {
        Self {
            shape,
            length: 0.0,
            perimeter: 0.0,
            area: 0.0,
            is_closed: false,
            vertex_count,
            centroid: None,
            radius: None,
        }
    }
}

/// Renders one kind of geometry onto the map surface.
///
/// Renderers are `Send + Sync` so a registry can be moved to whichever thread
/// owns the map.
pub trait GeometryRenderer: Send + Sync {
    fn core(&self) -> &RendererCore;

    fn core_mut(&mut self) -> &mut RendererCore;

    /// Create (or recreate) the drawable for `id`.
    ///
    /// `style` is merged over the default style. Rendering an identity that
    /// already has a drawable replaces it.
    fn render(
        &mut self,
        id: &GeometryId,
        feature: &Feature,
        style: Option<&Style>,
    ) -> GeometryResult<DrawableHandle>;

    fn kind(&self) -> GeometryKind {
        self.core().kind()
    }

    /// Render several features with the same style override.
    ///
    /// Failures are logged and skipped; the returned handles are for the
    /// features that rendered.
    fn render_batch(
        &mut self,
        items: &[(GeometryId, Feature)],
        style: Option<&Style>,
    ) -> Vec<DrawableHandle> {
        items
            .iter()
            .filter_map(|(id, feature)| match self.render(id, feature, style) {
                Ok(handle) => Some(handle),
                Err(err) => {
                    tracing::error!("{}", err);
                    None
                }
            })
            .collect()
    }

    /// Re-render `id` from an updated feature.
    fn update(
        &mut self,
        id: &GeometryId,
        feature: &Feature,
        style: Option<&Style>,
    ) -> GeometryResult<DrawableHandle> {
        self.render(id, feature, style)
    }

    /// Remove the drawable for `id`. Returns `Ok(false)` if nothing was rendered.
    fn remove(&mut self, id: &GeometryId) -> GeometryResult<bool> {
        self.core_mut().remove(id)
    }

    /// Remove every drawable this renderer owns.
    fn remove_all(&mut self) -> RemovalSummary {
        self.core_mut().remove_all()
    }

    fn set_default_style(&mut self, style: Style) {
        self.core_mut().set_default_style(style);
    }

    fn default_style(&self) -> &Style {
        self.core().default_style()
    }

    fn handle(&self, id: &GeometryId) -> Option<DrawableHandle> {
        self.core().entry(id).map(|entry| entry.handle)
    }

    fn metadata(&self, id: &GeometryId) -> Option<&RenderMetadata> {
        self.core().entry(id).map(|entry| &entry.metadata)
    }

    fn rendered_count(&self) -> usize {
        self.core().len()
    }

    /// Log every drawable created and removed at `debug` level.
    fn set_debug(&mut self, enabled: bool) {
        self.core_mut().set_debug(enabled);
    }

    /// Whether the rendered geometry for `id` contains `point`.
    ///
    /// `None` for unknown identities and for kinds without an area test.
    fn contains_point(&self, id: &GeometryId, point: LngLat) -> Option<bool> {
        let _ = (id, point);
        None
    }
}
