use std::sync::Arc;

use terrane_core::geodesy::{self, CLOSURE_TOLERANCE_DEG};

use crate::{
    DrawableHandle, DrawableShape, Feature, Geometry, GeometryId, GeometryKind, GeometryResult,
    MapSurface, Style, presets,
};

use super::polygon::ring_metadata;
use super::{GeometryRenderer, RenderMetadata, RendererCore};

/// Renders free-hand `Drawing` features.
///
/// Every render re-runs the ring-closure test on the current coordinates: a
/// closed drawing becomes a filled polygon with area and perimeter, an open
/// one a polyline with length only.
#[derive(Debug)]
pub struct DrawingRenderer {
    core: RendererCore,
    closure_tolerance: f64,
}

impl DrawingRenderer {
    pub fn new(surface: Arc<dyn MapSurface>) -> Self {
        Self {
            core: RendererCore::new(surface, GeometryKind::Drawing, presets::drawing()),
            closure_tolerance: CLOSURE_TOLERANCE_DEG,
        }
    }

    /// Override the per-axis closure tolerance in degrees.
    pub fn with_closure_tolerance(mut self, tolerance: f64) -> Self {
        self.closure_tolerance = tolerance;
        self
    }

    pub fn closure_tolerance(&self) -> f64 {
        self.closure_tolerance
    }
}

impl GeometryRenderer for DrawingRenderer {
    fn core(&self) -> &RendererCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut RendererCore {
        &mut self.core
    }

    fn render(
        &mut self,
        id: &GeometryId,
        feature: &Feature,
        style: Option<&Style>,
    ) -> GeometryResult<DrawableHandle> {
        let path = match &feature.geometry {
            Geometry::Drawing(path) => path.as_slice(),
            other => return Err(self.core.mismatch(other.kind())),
        };

        let style = self.core.resolve_style(style);
        if geodesy::is_ring_closed_with(path, self.closure_tolerance) {
            tracing::trace!(%id, "drawing classified closed");
            self.core.replace(id, ring_metadata(path), |surface| {
                surface.create_polygon(path, &style)
            })
        } else {
            tracing::trace!(%id, "drawing classified open");
            let metadata = RenderMetadata {
                length: geodesy::path_length(path),
                centroid: geodesy::centroid(path),
                ..RenderMetadata::new(DrawableShape::Polyline, path.len())
            };
            self.core
                .replace(id, metadata, |surface| surface.create_line(path, &style))
        }
    }
}
