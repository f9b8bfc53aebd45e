use std::sync::Arc;

use terrane_core::geodesy;

use crate::{
    DrawableHandle, DrawableShape, Feature, Geometry, GeometryId, GeometryKind, GeometryResult,
    MapSurface, Style, presets,
};

use super::{GeometryRenderer, RenderMetadata, RendererCore};

/// Renders `LineString` features as polylines.
#[derive(Debug)]
pub struct LineStringRenderer {
    core: RendererCore,
}

impl LineStringRenderer {
    pub fn new(surface: Arc<dyn MapSurface>) -> Self {
        Self {
            core: RendererCore::new(surface, GeometryKind::LineString, presets::line()),
        }
    }
}

impl GeometryRenderer for LineStringRenderer {
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
            Geometry::LineString(path) => path.as_slice(),
            other => return Err(self.core.mismatch(other.kind())),
        };

        let metadata = RenderMetadata {
            length: geodesy::path_length(path),
            centroid: geodesy::centroid(path),
            ..RenderMetadata::new(DrawableShape::Polyline, path.len())
        };
        let style = self.core.resolve_style(style);
        self.core
            .replace(id, metadata, |surface| surface.create_line(path, &style))
    }
}
