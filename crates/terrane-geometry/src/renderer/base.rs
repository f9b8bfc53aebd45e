//! Bookkeeping shared by every renderer.

use std::sync::Arc;

use terrane_core::LngLat;
use terrane_core::alloc::HashMap;

use crate::{
    DrawableHandle, GeometryError, GeometryId, GeometryKind, GeometryResult, MapSurface,
    RenderMetadata, Style,
};

/// A drawable currently owned by a renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedEntry {
    pub handle: DrawableHandle,
    pub metadata: RenderMetadata,
}

/// Outcome of removing every drawable a renderer owns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemovalSummary {
    /// Entries dropped from the renderer.
    pub removed: usize,
    /// Surface failures hit along the way.
    pub errors: Vec<GeometryError>,
}

impl RemovalSummary {
    pub fn merge(mut self, other: RemovalSummary) -> Self {
        self.removed += other.removed;
        self.errors.extend(other.errors);
        self
    }
}

/// Renderer state: the surface, default style and identity → drawable map.
///
/// Guarantees at most one live drawable per identity: [`replace`](Self::replace)
/// removes any existing drawable before creating the new one.
pub struct RendererCore {
    surface: Arc<dyn MapSurface>,
    kind: GeometryKind,
    default_style: Style,
    entries: HashMap<GeometryId, RenderedEntry>,
    debug: bool,
}

impl std::fmt::Debug for RendererCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererCore")
            .field("kind", &self.kind)
            .field("default_style", &self.default_style)
            .field("rendered", &self.entries.len())
            .field("debug", &self.debug)
            .finish()
    }
}

impl RendererCore {
    pub fn new(surface: Arc<dyn MapSurface>, kind: GeometryKind, default_style: Style) -> Self {
        Self {
            surface,
            kind,
            default_style,
            entries: HashMap::default(),
            debug: false,
        }
    }

    pub fn surface(&self) -> &dyn MapSurface {
        self.surface.as_ref()
    }

    pub fn kind(&self) -> GeometryKind {
        self.kind
    }

    pub fn default_style(&self) -> &Style {
        &self.default_style
    }

    pub fn set_default_style(&mut self, style: Style) {
        self.default_style = style;
    }

    pub fn set_debug(&mut self, enabled: bool) {
        self.debug = enabled;
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Default style with `overrides` applied.
    pub fn resolve_style(&self, overrides: Option<&Style>) -> Style {
        match overrides {
            Some(overrides) => self.default_style.merged(overrides),
            None => self.default_style.clone(),
        }
    }

    pub fn entry(&self, id: &GeometryId) -> Option<&RenderedEntry> {
        self.entries.get(id)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&GeometryId, &RenderedEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Error for a feature of `found` kind handed to this renderer.
    pub fn mismatch(&self, found: GeometryKind) -> GeometryError {
        GeometryError::KindMismatch {
            expected: self.kind,
            found,
        }
    }

    /// Swap the drawable for `id` with a freshly created one.
    ///
    /// Any live drawable is removed first. `create` receives the surface and is
    /// only called after the old drawable is gone; if the surface refuses to
    /// remove it, nothing is created.
    pub fn replace<F>(
        &mut self,
        id: &GeometryId,
        metadata: RenderMetadata,
        create: F,
    ) -> GeometryResult<DrawableHandle>
    where
        F: FnOnce(&dyn MapSurface) -> Result<DrawableHandle, crate::SurfaceError>,
    {
        self.remove(id)?;

        let handle = create(self.surface.as_ref()).map_err(|source| GeometryError::Render {
            id: id.clone(),
            source,
        })?;

        if self.debug {
            tracing::debug!(
                kind = %self.kind,
                %id,
                handle = handle.raw(),
                shape = ?metadata.shape,
                "drawable created"
            );
        }

        self.entries
            .insert(id.clone(), RenderedEntry { handle, metadata });
        Ok(handle)
    }

    /// Remove the drawable for `id`. Returns `Ok(false)` if there was none.
    ///
    /// The entry is dropped even when the surface refuses the removal; the
    /// refusal comes back as [`GeometryError::Render`].
    pub fn remove(&mut self, id: &GeometryId) -> GeometryResult<bool> {
        let Some(entry) = self.entries.remove(id) else {
            return Ok(false);
        };

        self.surface
            .remove_drawable(entry.handle)
            .map_err(|source| GeometryError::Render {
                id: id.clone(),
                source,
            })?;

        if self.debug {
            tracing::debug!(kind = %self.kind, %id, handle = entry.handle.raw(), "drawable removed");
        }
        Ok(true)
    }

    /// Remove every drawable, collecting surface failures instead of stopping.
    pub fn remove_all(&mut self) -> RemovalSummary {
        let ids: Vec<GeometryId> = self.entries.keys().cloned().collect();
        let mut summary = RemovalSummary::default();
        for id in &ids {
            match self.remove(id) {
                Ok(removed) => summary.removed += usize::from(removed),
                Err(err) => {
                    summary.removed += 1;
                    summary.errors.push(err);
                }
            }
        }
        summary
    }

    /// Surface position of the drawable for `id`.
    pub fn position(&self, id: &GeometryId) -> Option<LngLat> {
        self.entries
            .get(id)
            .and_then(|entry| self.surface.drawable_position(entry.handle))
    }
}
