use std::sync::Arc;

use crate::{
    DrawableHandle, DrawableShape, Feature, Geometry, GeometryId, GeometryKind, GeometryResult,
    MapSurface, Style, presets,
};

use super::{GeometryRenderer, RenderMetadata, RendererCore};

/// Renders `Point` features as markers.
#[derive(Debug)]
pub struct PointRenderer {
    core: RendererCore,
}

impl PointRenderer {
    pub fn new(surface: Arc<dyn MapSurface>) -> Self {
        Self {
            core: RendererCore::new(surface, GeometryKind::Point, presets::point()),
        }
    }
}

impl GeometryRenderer for PointRenderer {
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
        let position = match &feature.geometry {
            Geometry::Point(position) => *position,
            other => return Err(self.core.mismatch(other.kind())),
        };

        let metadata = RenderMetadata {
            centroid: Some(position),
            ..RenderMetadata::new(DrawableShape::Point, 1)
        };
        let style = self.core.resolve_style(style);
        self.core
            .replace(id, metadata, |surface| surface.create_point(position, &style))
    }
}
