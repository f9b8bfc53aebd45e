use std::sync::Arc;

use terrane_core::Config;
use terrane_core::alloc::IndexMap;

use crate::{DrawableHandle, GeometryId, GeometryKind, MapSurface};

use super::{
    CircleRenderer, DrawingRenderer, GeometryRenderer, LineStringRenderer, PointRenderer,
    PolygonRenderer, RemovalSummary,
};

/// Renderers keyed by the kind they draw.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use terrane_core::Config;
/// use terrane_geometry::{GeometryKind, RendererRegistry};
/// # use terrane_core::LngLat;
/// # use terrane_geometry::*;
/// # struct NullSurface;
/// # impl MapSurface for NullSurface {
/// #     fn create_point(&self, _: LngLat, _: &Style) -> Result<DrawableHandle, SurfaceError> { Ok(DrawableHandle::new(1)) }
/// #     fn create_line(&self, _: &[LngLat], _: &Style) -> Result<DrawableHandle, SurfaceError> { Ok(DrawableHandle::new(1)) }
/// #     fn create_polygon(&self, _: &[LngLat], _: &Style) -> Result<DrawableHandle, SurfaceError> { Ok(DrawableHandle::new(1)) }
/// #     fn create_circle(&self, _: LngLat, _: f64, _: &Style) -> Result<DrawableHandle, SurfaceError> { Ok(DrawableHandle::new(1)) }
/// #     fn remove_drawable(&self, _: DrawableHandle) -> Result<(), SurfaceError> { Ok(()) }
/// #     fn drawable_bounds(&self, _: DrawableHandle) -> Option<Bounds> { None }
/// #     fn drawable_position(&self, _: DrawableHandle) -> Option<LngLat> { None }
/// #     fn fit_bounds(&self, _: Bounds) {}
/// # }
///
/// let registry = RendererRegistry::with_defaults(Arc::new(NullSurface), &Config::default());
/// assert_eq!(registry.len(), GeometryKind::ALL.len());
/// assert!(registry.get(GeometryKind::Drawing).is_some());
/// ```
#[derive(Default)]
pub struct RendererRegistry {
    renderers: IndexMap<GeometryKind, Box<dyn GeometryRenderer>>,
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("kinds", &self.renderers.keys().collect::<Vec<_>>())
            .field("rendered", &self.rendered_count())
            .finish()
    }
}

impl RendererRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in renderer for every kind.
    pub fn with_defaults(surface: Arc<dyn MapSurface>, config: &Config) -> Self {
        let mut registry = Self::new();
        for kind in GeometryKind::ALL {
            let mut renderer = default_renderer(kind, Arc::clone(&surface), config);
            renderer.set_debug(config.debug_renderers);
            registry.register(renderer);
        }
        registry
    }

    /// Register a renderer for the kind it reports, returning the one it replaces.
    pub fn register(
        &mut self,
        renderer: Box<dyn GeometryRenderer>,
    ) -> Option<Box<dyn GeometryRenderer>> {
        let kind = renderer.kind();
        tracing::debug!(%kind, "renderer registered");
        self.renderers.insert(kind, renderer)
    }

    pub fn unregister(&mut self, kind: GeometryKind) -> Option<Box<dyn GeometryRenderer>> {
        self.renderers.shift_remove(&kind)
    }

    pub fn get(&self, kind: GeometryKind) -> Option<&dyn GeometryRenderer> {
        self.renderers.get(&kind).map(|renderer| &**renderer)
    }

    pub fn get_mut(&mut self, kind: GeometryKind) -> Option<&mut dyn GeometryRenderer> {
        match self.renderers.get_mut(&kind) {
            Some(renderer) => Some(&mut **renderer),
            None => None,
        }
    }

    pub fn contains(&self, kind: GeometryKind) -> bool {
        self.renderers.contains_key(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = GeometryKind> + '_ {
        self.renderers.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    /// Drawables across every renderer.
    pub fn rendered_count(&self) -> usize {
        self.renderers.values().map(|r| r.rendered_count()).sum()
    }

    /// Remove every drawable from every renderer.
    pub fn remove_all(&mut self) -> RemovalSummary {
        self.renderers
            .values_mut()
            .map(|r| r.remove_all())
            .fold(RemovalSummary::default(), RemovalSummary::merge)
    }

    pub fn set_debug(&mut self, enabled: bool) {
        for renderer in self.renderers.values_mut() {
            renderer.set_debug(enabled);
        }
    }

    /// The renderer holding a drawable for `id`, and that drawable.
    pub fn find_handle(&self, id: &GeometryId) -> Option<(GeometryKind, DrawableHandle)> {
        self.renderers
            .iter()
            .find_map(|(kind, renderer)| renderer.handle(id).map(|handle| (*kind, handle)))
    }
}

fn default_renderer(
    kind: GeometryKind,
    surface: Arc<dyn MapSurface>,
    config: &Config,
) -> Box<dyn GeometryRenderer> {
    match kind {
        GeometryKind::Point => Box::new(PointRenderer::new(surface)),
        GeometryKind::LineString => Box::new(LineStringRenderer::new(surface)),
        GeometryKind::Polygon => Box::new(PolygonRenderer::new(surface)),
        GeometryKind::Circle => Box::new(CircleRenderer::new(surface)),
        GeometryKind::Drawing => Box::new(
            DrawingRenderer::new(surface).with_closure_tolerance(config.closure_tolerance),
        ),
    }
}
