//! Geometry orchestration.
//!
//! [`GeometryManager`] composes the store, the renderer registry and the event
//! bus. Every public operation runs to completion synchronously: input is
//! normalized to a list of features, each feature is stored and rendered, and
//! one aggregated event describes the batch.

use std::sync::Arc;

use serde_json::Value;
use terrane_core::alloc::IndexMap;
use terrane_core::geodesy;
use terrane_core::profiling::profile_function;
use terrane_core::{Config, EventBus, EventRecord, LngLat};
use terrane_geometry::{
    AddOptions, Bounds, ExportOptions, Feature, FeatureCollection, Geometry, GeometryError,
    GeometryId, GeometryKind, GeometryRecord, GeometryStore, MapSurface, RenderMetadata,
    RendererRegistry, Style, UpdateOptions,
};

use crate::events::GeometryEvent;

/// Configuration for a [`GeometryManager`].
#[derive(Debug, Clone, Default)]
pub struct ManagerConfig {
    /// Shared component configuration.
    pub core: Config,
    /// Fit the map to the stored bounds after every successful add.
    pub fit_on_load: bool,
    /// Default style overrides per kind, replacing the built-in presets.
    pub styles: IndexMap<GeometryKind, Style>,
}

impl ManagerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_core(mut self, core: Config) -> Self {
        self.core = core;
        self
    }

    pub fn with_fit_on_load(mut self, enabled: bool) -> Self {
        self.fit_on_load = enabled;
        self
    }

    pub fn with_style(mut self, kind: GeometryKind, style: Style) -> Self {
        self.styles.insert(kind, style);
        self
    }
}

/// Stores, renders and announces geographic features.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use serde_json::json;
/// use terrane::prelude::*;
/// use terrane_test_utils::MockMapSurface;
///
/// let surface = Arc::new(MockMapSurface::new());
/// let mut manager = GeometryManager::new(surface.clone());
///
/// let ids = manager.add_geojson(
///     &json!({
///         "type": "Feature",
///         "geometry": { "type": "Point", "coordinates": [-63.9039, -8.7619] },
///         "properties": {}
///     }),
///     AddOptions::new(),
/// );
///
/// assert_eq!(ids.len(), 1);
/// assert_eq!(surface.live_count(), 1);
/// assert_eq!(manager.events().history_for("geometryAdded").len(), 1);
/// ```
pub struct GeometryManager {
    store: GeometryStore,
    renderers: RendererRegistry,
    events: EventBus,
    surface: Arc<dyn MapSurface>,
    config: ManagerConfig,
}

impl std::fmt::Debug for GeometryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeometryManager")
            .field("store", &self.store.stats())
            .field("renderers", &self.renderers)
            .field("events", &self.events)
            .field("config", &self.config)
            .finish()
    }
}

impl GeometryManager {
    /// A manager with the default configuration.
    pub fn new(surface: Arc<dyn MapSurface>) -> Self {
        Self::with_config(surface, ManagerConfig::default())
    }

    pub fn with_config(surface: Arc<dyn MapSurface>, config: ManagerConfig) -> Self {
        let mut renderers = RendererRegistry::with_defaults(Arc::clone(&surface), &config.core);
        for (kind, style) in &config.styles {
            if let Some(renderer) = renderers.get_mut(*kind) {
                renderer.set_default_style(style.clone());
            }
        }

        Self {
            store: GeometryStore::new(),
            renderers,
            events: EventBus::with_history_capacity(config.core.history_capacity),
            surface,
            config,
        }
    }

    /// Add a GeoJSON `Feature` or `FeatureCollection`.
    ///
    /// Malformed features are skipped with a warning; any other input adds
    /// nothing. `options.id` only applies when the input holds one feature.
    /// Emits one `geometryAdded` event listing every added identity; a feature
    /// supplied under an existing identity replaces that record and is listed
    /// in a `geometryUpdated` event instead.
    pub fn add_geojson(&mut self, input: &Value, options: AddOptions) -> Vec<GeometryId> {
        profile_function!();

        let items = normalize(input);
        let options = if items.len() > 1 {
            AddOptions { id: None, ..options }
        } else {
            options
        };

        let mut stored = Vec::with_capacity(items.len());
        for item in items {
            match Feature::from_value(item) {
                Ok(feature) => stored.extend(self.insert(feature, options.clone())),
                Err(err) => tracing::warn!("Skipped feature: {}", err),
            }
        }
        self.finish_add(stored)
    }

    /// Add already-parsed features as one batch. `options.id` is ignored.
    pub fn add_features(
        &mut self,
        features: impl IntoIterator<Item = Feature>,
        options: AddOptions,
    ) -> Vec<GeometryId> {
        profile_function!();

        let options = AddOptions { id: None, ..options };
        let stored = features
            .into_iter()
            .filter_map(|feature| self.insert(feature, options.clone()))
            .collect();
        self.finish_add(stored)
    }

    /// Add one feature.
    pub fn add_feature(&mut self, feature: Feature, options: AddOptions) -> Option<GeometryId> {
        let stored = self.insert(feature, options)?;
        self.finish_add(vec![stored]).pop()
    }

    /// Parse GeoJSON text and add it.
    ///
    /// Text that is not JSON emits an `error` event and adds nothing.
    pub fn load_geojson_str(&mut self, text: &str) -> Vec<GeometryId> {
        match serde_json::from_str::<Value>(text) {
            Ok(value) => self.add_geojson(&value, AddOptions::new()),
            Err(err) => {
                self.report(GeometryError::from(err));
                Vec::new()
            }
        }
    }

    /// Replace the feature stored under `id` with a GeoJSON feature.
    pub fn update_geometry(&mut self, id: &GeometryId, input: &Value, options: UpdateOptions) -> bool {
        match Feature::from_value(input) {
            Ok(feature) => self.update_feature(id, feature, options),
            Err(err) => {
                tracing::warn!(%id, "Rejected update: {}", err);
                false
            }
        }
    }

    /// Replace the feature stored under `id`.
    pub fn update_feature(&mut self, id: &GeometryId, feature: Feature, options: UpdateOptions) -> bool {
        let updated = self.apply_update(id, feature, options);
        if updated {
            self.emit(GeometryEvent::Updated {
                uuids: vec![id.clone()],
            });
        }
        updated
    }

    /// Apply several updates; emits one `geometryUpdated` event.
    ///
    /// Returns the identities that were updated.
    pub fn update_batch(
        &mut self,
        items: impl IntoIterator<Item = (GeometryId, Value)>,
        options: UpdateOptions,
    ) -> Vec<GeometryId> {
        profile_function!();

        let mut updated = Vec::new();
        for (id, input) in items {
            let applied = match Feature::from_value(&input) {
                Ok(feature) => self.apply_update(&id, feature, options.clone()),
                Err(err) => {
                    tracing::warn!(%id, "Rejected update: {}", err);
                    false
                }
            };
            if applied {
                updated.push(id);
            }
        }

        if !updated.is_empty() {
            self.emit(GeometryEvent::Updated {
                uuids: updated.clone(),
            });
        }
        updated
    }

    /// Remove one geometry and its drawable.
    ///
    /// A drawable the surface refuses to remove is reported as an `error`
    /// event; the record is removed regardless.
    pub fn remove_geometry(&mut self, id: &GeometryId) -> bool {
        let removed = self.detach_and_remove(id);
        if removed {
            self.emit(GeometryEvent::Removed {
                uuids: vec![id.clone()],
            });
        }
        removed
    }

    /// Remove several geometries; emits one `geometryRemoved` event.
    ///
    /// Unknown identities are skipped. Returns the identities removed.
    pub fn remove_batch<'a>(&mut self, ids: impl IntoIterator<Item = &'a GeometryId>) -> Vec<GeometryId> {
        let removed: Vec<GeometryId> = ids
            .into_iter()
            .filter(|id| self.detach_and_remove(id))
            .cloned()
            .collect();

        if !removed.is_empty() {
            self.emit(GeometryEvent::Removed {
                uuids: removed.clone(),
            });
        }
        removed
    }

    /// Remove every geometry and drawable; always emits `cleared`.
    ///
    /// Drawables the surface refuses to remove are reported as `error` events.
    pub fn clear(&mut self) -> usize {
        let summary = self.renderers.remove_all();
        for err in summary.errors {
            self.report(err);
        }
        let removed = self.store.clear();
        tracing::debug!(removed, drawables = summary.removed, "geometries cleared");
        self.emit(GeometryEvent::Cleared);
        removed
    }

    /// Announce a click on `id`. Returns `false` for unknown identities.
    pub fn click(&mut self, id: &GeometryId) -> bool {
        self.interact(id, |uuid, geometry| GeometryEvent::Clicked { uuid, geometry })
    }

    pub fn hover(&mut self, id: &GeometryId) -> bool {
        self.interact(id, |uuid, geometry| GeometryEvent::Hovered { uuid, geometry })
    }

    pub fn unhover(&mut self, id: &GeometryId) -> bool {
        self.interact(id, |uuid, geometry| GeometryEvent::Unhovered { uuid, geometry })
    }

    /// Fit the map surface to every stored coordinate.
    ///
    /// Returns the bounds used, or `None` (and leaves the map alone) when empty.
    pub fn fit_to_bounds(&self) -> Option<Bounds> {
        let bounds = self.store.calculate_bounds()?;
        self.surface.fit_bounds(bounds);
        Some(bounds)
    }

    /// Circles whose area contains `point`.
    pub fn circles_containing(&self, point: LngLat) -> Vec<GeometryId> {
        let renderer = self.renderers.get(GeometryKind::Circle);
        self.store
            .get_by_type(GeometryKind::Circle)
            .into_iter()
            .filter(|record| {
                renderer
                    .and_then(|r| r.contains_point(&record.id, point))
                    .unwrap_or_else(|| match record.feature.geometry {
                        Geometry::Circle { center, radius } => {
                            geodesy::point_in_circle(point, center, radius)
                        }
                        _ => false,
                    })
            })
            .map(|record| record.id.clone())
            .collect()
    }

    /// Metrics computed when `id` was last rendered.
    pub fn metadata(&self, id: &GeometryId) -> Option<&RenderMetadata> {
        let kind = self.store.get(id)?.kind;
        self.renderers.get(kind)?.metadata(id)
    }

    pub fn get(&self, id: &GeometryId) -> Option<&GeometryRecord> {
        self.store.get(id)
    }

    pub fn export(&self, options: &ExportOptions) -> FeatureCollection {
        self.store.export_as_collection(options)
    }

    /// Export as a GeoJSON `FeatureCollection` value.
    pub fn export_geojson(&self, options: &ExportOptions) -> Value {
        self.export(options).to_value()
    }

    /// Replace the default style of the renderer for `kind`.
    ///
    /// Applies to drawables created from now on.
    pub fn set_default_style(&mut self, kind: GeometryKind, style: Style) -> bool {
        match self.renderers.get_mut(kind) {
            Some(renderer) => {
                renderer.set_default_style(style);
                true
            }
            None => false,
        }
    }

    pub fn store(&self) -> &GeometryStore {
        &self.store
    }

    pub fn renderers(&self) -> &RendererRegistry {
        &self.renderers
    }

    pub fn renderers_mut(&mut self) -> &mut RendererRegistry {
        &mut self.renderers
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn surface(&self) -> &Arc<dyn MapSurface> {
        &self.surface
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Dispatch a lifecycle event on the bus.
    pub fn emit(&mut self, event: GeometryEvent) -> EventRecord {
        self.events.trigger(event.name(), event.payload())
    }

    /// Announce one add call: fresh identities in `geometryAdded`, replaced
    /// ones in `geometryUpdated`. Returns every identity in input order.
    fn finish_add(&mut self, stored: Vec<Stored>) -> Vec<GeometryId> {
        let mut added = Vec::new();
        let mut replaced = Vec::new();
        for item in &stored {
            match item {
                Stored::Added(id) => added.push(id.clone()),
                Stored::Replaced(id) => replaced.push(id.clone()),
            }
        }

        if !added.is_empty() {
            self.emit(GeometryEvent::Added { uuids: added });
        }
        if !replaced.is_empty() {
            self.emit(GeometryEvent::Updated { uuids: replaced });
        }
        if !stored.is_empty() && self.config.fit_on_load {
            self.fit_to_bounds();
        }

        stored.into_iter().map(Stored::into_id).collect()
    }

    /// Store and render one feature.
    ///
    /// A fresh record whose drawable cannot be created is rolled back. A
    /// replaced record keeps its new data, like any other update.
    fn insert(&mut self, feature: Feature, options: AddOptions) -> Option<Stored> {
        let previous_kind = options
            .id
            .as_ref()
            .and_then(|id| self.store.get(id))
            .map(|record| record.kind);

        let id = self.store.add(feature, options)?;
        if let Err(err) = self.render_record(&id, previous_kind) {
            self.report(err);
            if previous_kind.is_none() {
                self.store.remove(&id);
                return None;
            }
        }

        Some(match previous_kind {
            Some(_) => Stored::Replaced(id),
            None => Stored::Added(id),
        })
    }

    fn apply_update(&mut self, id: &GeometryId, feature: Feature, options: UpdateOptions) -> bool {
        let Some(previous_kind) = self.store.get(id).map(|record| record.kind) else {
            tracing::debug!("{}", GeometryError::NotFound { id: id.clone() });
            return false;
        };
        if !self.store.update(id, feature, options) {
            return false;
        }
        if let Err(err) = self.render_record(id, Some(previous_kind)) {
            self.report(err);
        }
        true
    }

    /// (Re)create the drawable for a stored record.
    ///
    /// When the kind changed the drawable owned by the previous kind's
    /// renderer is removed first.
    fn render_record(
        &mut self,
        id: &GeometryId,
        previous_kind: Option<GeometryKind>,
    ) -> Result<(), GeometryError> {
        let Some(kind) = self.store.get(id).map(|record| record.kind) else {
            return Err(GeometryError::NotFound { id: id.clone() });
        };

        if let Some(previous) = previous_kind.filter(|previous| *previous != kind) {
            self.remove_drawable(previous, id);
        }

        let Some(record) = self.store.get(id) else {
            return Err(GeometryError::NotFound { id: id.clone() });
        };
        let Some(renderer) = self.renderers.get_mut(kind) else {
            tracing::warn!(%id, %kind, "No renderer registered; geometry stored without a drawable");
            self.store.detach_drawable(id);
            return Ok(());
        };

        match renderer.render(id, &record.feature, record.style.as_ref()) {
            Ok(handle) => {
                self.store.attach_drawable(id, handle);
                tracing::trace!(%id, %kind, handle = handle.raw(), "geometry rendered");
                Ok(())
            }
            Err(err) => {
                self.store.detach_drawable(id);
                Err(err)
            }
        }
    }

    fn detach_and_remove(&mut self, id: &GeometryId) -> bool {
        let Some(kind) = self.store.get(id).map(|record| record.kind) else {
            return false;
        };
        self.remove_drawable(kind, id);
        self.store.remove(id)
    }

    /// Drop the drawable `kind`'s renderer holds for `id`, reporting a
    /// refused removal.
    fn remove_drawable(&mut self, kind: GeometryKind, id: &GeometryId) {
        let result = match self.renderers.get_mut(kind) {
            Some(renderer) => renderer.remove(id),
            None => return,
        };
        if let Err(err) = result {
            self.report(err);
        }
    }

    fn interact(
        &mut self,
        id: &GeometryId,
        event: fn(GeometryId, Feature) -> GeometryEvent,
    ) -> bool {
        let Some(record) = self.store.get(id) else {
            return false;
        };
        let event = event(id.clone(), record.feature.clone());
        self.emit(event);
        true
    }

    fn report(&mut self, err: GeometryError) {
        tracing::error!("{}", err);
        self.emit(GeometryEvent::Error {
            message: err.to_string(),
        });
    }
}

/// How one feature landed in the store.
enum Stored {
    Added(GeometryId),
    Replaced(GeometryId),
}

impl Stored {
    fn into_id(self) -> GeometryId {
        match self {
            Stored::Added(id) | Stored::Replaced(id) => id,
        }
    }
}

/// Features contained in a GeoJSON value.
///
/// A `Feature` (or any object with a `geometry` member) is a one-element list,
/// a `FeatureCollection` its `features` array; anything else is empty.
fn normalize(input: &Value) -> Vec<&Value> {
    match input.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => input
            .get("features")
            .and_then(Value::as_array)
            .map(|features| features.iter().collect())
            .unwrap_or_default(),
        Some("Feature") => vec![input],
        None if input.get("geometry").is_some() => vec![input],
        _ => Vec::new(),
    }
}
