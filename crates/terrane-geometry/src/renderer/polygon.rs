use std::sync::Arc;

use terrane_core::{LngLat, geodesy};

use crate::{
    DrawableHandle, DrawableShape, Feature, Geometry, GeometryId, GeometryKind, GeometryResult,
    MapSurface, Style, presets,
};

use super::{GeometryRenderer, RenderMetadata, RendererCore};

/// Renders `Polygon` features from their outer ring. Holes are not drawn.
#[derive(Debug)]
pub struct PolygonRenderer {
    core: RendererCore,
}

impl PolygonRenderer {
    pub fn new(surface: Arc<dyn MapSurface>) -> Self {
        Self {
            core: RendererCore::new(surface, GeometryKind::Polygon, presets::polygon()),
        }
    }
}

/// Metrics for a ring drawn as a filled polygon.
pub(super) fn ring_metadata(ring: &[LngLat]) -> RenderMetadata {
    let perimeter = geodesy::ring_perimeter(ring);
    RenderMetadata {
        length: perimeter,
        perimeter,
        area: geodesy::ring_area(ring),
        is_closed: true,
        centroid: geodesy::centroid(ring),
        ..RenderMetadata::new(DrawableShape::Polygon, ring.len())
    }
}

impl GeometryRenderer for PolygonRenderer {
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
        let ring = match &feature.geometry {
            Geometry::Polygon(rings) => rings.first().map(Vec::as_slice).unwrap_or(&[]),
            other => return Err(self.core.mismatch(other.kind())),
        };

        let metadata = ring_metadata(ring);
        let style = self.core.resolve_style(style);
        self.core
            .replace(id, metadata, |surface| surface.create_polygon(ring, &style))
    }
}
