use std::f64::consts::PI;
use std::sync::Arc;

use terrane_core::{LngLat, geodesy};

use crate::{
    DrawableHandle, DrawableShape, Feature, Geometry, GeometryId, GeometryKind, GeometryResult,
    MapSurface, Style, presets,
};

use super::{GeometryRenderer, RenderMetadata, RendererCore};

/// Renders `Circle` features as surface circles of a radius in meters.
#[derive(Debug)]
pub struct CircleRenderer {
    core: RendererCore,
}

impl CircleRenderer {
    pub fn new(surface: Arc<dyn MapSurface>) -> Self {
        Self {
            core: RendererCore::new(surface, GeometryKind::Circle, presets::circle()),
        }
    }
}

impl GeometryRenderer for CircleRenderer {
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
        let (center, radius) = match &feature.geometry {
            Geometry::Circle { center, radius } => (*center, *radius),
            other => return Err(self.core.mismatch(other.kind())),
        };

        let perimeter = 2.0 * PI * radius;
        let metadata = RenderMetadata {
            length: perimeter,
            perimeter,
            area: PI * radius * radius,
            is_closed: true,
            centroid: Some(center),
            radius: Some(radius),
            ..RenderMetadata::new(DrawableShape::Circle, 1)
        };
        let style = self.core.resolve_style(style);
        self.core
            .replace(id, metadata, |surface| surface.create_circle(center, radius, &style))
    }

    fn contains_point(&self, id: &GeometryId, point: LngLat) -> Option<bool> {
        let metadata = &self.core.entry(id)?.metadata;
        let (center, radius) = (metadata.centroid?, metadata.radius?);
        Some(geodesy::point_in_circle(point, center, radius))
    }
}
