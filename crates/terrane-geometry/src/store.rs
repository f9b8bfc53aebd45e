//! Identity-keyed geometry storage with per-kind indices.
//!
//! The store keeps three views of the same data in lockstep:
//!
//! - `records`: identity → [`GeometryRecord`], in insertion order
//! - `buckets`: kind → identities of that kind
//! - `counts`: kind → bucket cardinality
//!
//! Every mutating method updates all three before returning and marks the
//! bounds cache dirty. Malformed input is rejected with a warning and a
//! failure sentinel, never a panic.

use std::cell::Cell;

use chrono::Utc;
use serde_json::{Map, Value, json};
use terrane_core::alloc::{HashMap, IndexMap, IndexSet};
use terrane_core::profiling::profile_function;

use crate::bounds::BoundsCache;
use crate::{
    Bounds, DrawableHandle, Feature, FeatureCollection, GeometryError, GeometryId, GeometryKind,
    GeometryRecord, GeometryResult, Style,
};

/// Reserved property namespace added by [`GeometryStore::export_as_collection`].
pub const INTERNAL_PROPERTY: &str = "_internal";

/// Options for [`GeometryStore::add`].
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Identity to use instead of a generated one.
    ///
    /// An identity that already exists turns the add into an update.
    pub id: Option<GeometryId>,
    pub style: Option<Style>,
    pub metadata: Map<String, Value>,
}

impl AddOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<GeometryId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Options for [`GeometryStore::update`].
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Replaces the record's style when set.
    pub style: Option<Style>,
    /// Merged into (or, with `replace_metadata`, replaces) the record metadata.
    pub metadata: Map<String, Value>,
    pub replace_metadata: bool,
}

impl UpdateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn replacing_metadata(mut self) -> Self {
        self.replace_metadata = true;
        self
    }
}

impl From<AddOptions> for UpdateOptions {
    fn from(options: AddOptions) -> Self {
        Self {
            style: options.style,
            metadata: options.metadata,
            replace_metadata: false,
        }
    }
}

/// Filter for [`GeometryStore::get_all`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub kind: Option<GeometryKind>,
    /// Feature property that must equal the given value.
    pub property: Option<(String, Value)>,
    /// Whether the record must (or must not) have a drawable attached.
    pub rendered: Option<bool>,
}

impl RecordFilter {
    pub fn kind(kind: GeometryKind) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.property = Some((key.into(), value.into()));
        self
    }

    pub fn with_rendered(mut self, rendered: bool) -> Self {
        self.rendered = Some(rendered);
        self
    }

    fn matches(&self, record: &GeometryRecord) -> bool {
        self.kind.is_none_or(|kind| record.kind == kind)
            && self
                .property
                .as_ref()
                .is_none_or(|(key, value)| record.property(key) == Some(value))
            && self.rendered.is_none_or(|rendered| record.is_rendered() == rendered)
    }
}

/// Options for [`GeometryStore::export_as_collection`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Add the reserved `_internal` namespace to every feature's properties.
    pub include_metadata: bool,
    /// Export only this kind.
    pub kind: Option<GeometryKind>,
}

impl ExportOptions {
    pub fn with_metadata() -> Self {
        Self {
            include_metadata: true,
            kind: None,
        }
    }
}

/// Snapshot of store cardinalities.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreStats {
    pub total: usize,
    pub by_kind: IndexMap<GeometryKind, usize>,
    /// Records with a drawable attached.
    pub rendered: usize,
}

/// In-memory geometry store.
///
/// # Example
///
/// ```
/// use terrane_geometry::{AddOptions, Feature, GeometryKind, GeometryStore};
///
/// let mut store = GeometryStore::new();
/// let id = store.add(Feature::point(-63.9039, -8.7619), AddOptions::new()).unwrap();
///
/// assert_eq!(store.count_by_type(GeometryKind::Point), 1);
/// assert!(store.remove(&id));
/// assert!(!store.remove(&id));
/// ```
#[derive(Debug)]
pub struct GeometryStore {
    records: IndexMap<GeometryId, GeometryRecord>,
    buckets: HashMap<GeometryKind, IndexSet<GeometryId>>,
    counts: HashMap<GeometryKind, usize>,
    bounds: Cell<BoundsCache>,
}

impl Default for GeometryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            records: IndexMap::default(),
            buckets: GeometryKind::ALL
                .into_iter()
                .map(|kind| (kind, IndexSet::default()))
                .collect(),
            counts: GeometryKind::ALL.into_iter().map(|kind| (kind, 0)).collect(),
            bounds: Cell::new(BoundsCache::Dirty),
        }
    }

    /// Check a feature against the structural rules without storing it.
    pub fn validate(&self, feature: &Feature) -> GeometryResult<()> {
        feature.validate()
    }

    /// Store a feature and return its identity.
    ///
    /// Returns `None` (and stores nothing) when the feature is malformed or the
    /// supplied identity is empty. A supplied identity that already exists
    /// updates that record instead.
    pub fn add(&mut self, feature: Feature, options: AddOptions) -> Option<GeometryId> {
        profile_function!();

        if let Err(err) = feature.validate() {
            tracing::warn!("Rejected feature: {}", err);
            return None;
        }

        let AddOptions { id, style, metadata } = options;
        if id.as_ref().is_some_and(|id| id.as_str().is_empty()) {
            tracing::warn!("Rejected feature: supplied identity is empty");
            return None;
        }
        if let Some(id) = id.as_ref().filter(|id| self.records.contains_key(*id)) {
            tracing::trace!(%id, "add with existing id routed to update");
            let updated = self.update(
                id,
                feature,
                UpdateOptions {
                    style,
                    metadata,
                    replace_metadata: false,
                },
            );
            return updated.then(|| id.clone());
        }

        let id = id.unwrap_or_else(GeometryId::generate);
        let kind = feature.kind();
        let record = GeometryRecord::new(id.clone(), feature, style, metadata);

        self.records.insert(id.clone(), record);
        self.index_insert(kind, &id);
        self.invalidate_bounds();

        tracing::trace!(%id, %kind, "geometry added");
        Some(id)
    }

    /// Store several features, skipping malformed ones.
    ///
    /// `options.id` is ignored; style and metadata apply to every feature.
    /// Compare the returned length with the input to detect rejections.
    pub fn add_batch(
        &mut self,
        features: impl IntoIterator<Item = Feature>,
        options: AddOptions,
    ) -> Vec<GeometryId> {
        profile_function!();

        let template = AddOptions { id: None, ..options };
        features
            .into_iter()
            .filter_map(|feature| self.add(feature, template.clone()))
            .collect()
    }

    pub fn get(&self, id: &GeometryId) -> Option<&GeometryRecord> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &GeometryId) -> bool {
        self.records.contains_key(id)
    }

    /// Records matching `filter`, in insertion order.
    pub fn get_all(&self, filter: &RecordFilter) -> Vec<&GeometryRecord> {
        match filter.kind {
            Some(kind) => self
                .get_by_type(kind)
                .into_iter()
                .filter(|record| filter.matches(record))
                .collect(),
            None => self
                .records
                .values()
                .filter(|record| filter.matches(record))
                .collect(),
        }
    }

    /// Records of one kind, in the order they entered the bucket.
    pub fn get_by_type(&self, kind: GeometryKind) -> Vec<&GeometryRecord> {
        self.buckets
            .get(&kind)
            .map(|bucket| bucket.iter().filter_map(|id| self.records.get(id)).collect())
            .unwrap_or_default()
    }

    /// Identities in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &GeometryId> {
        self.records.keys()
    }

    /// Replace a record's feature.
    ///
    /// Returns `false` for unknown identities and malformed features, leaving
    /// the store untouched. A change of kind moves the identity between
    /// buckets within this call.
    pub fn update(&mut self, id: &GeometryId, feature: Feature, options: UpdateOptions) -> bool {
        profile_function!();

        if let Err(err) = feature.validate() {
            tracing::warn!(%id, "Rejected update: {}", err);
            return false;
        }

        let Some(record) = self.records.get_mut(id) else {
            tracing::debug!("{}", GeometryError::NotFound { id: id.clone() });
            return false;
        };

        let old_kind = record.kind;
        let new_kind = feature.kind();

        record.feature = feature;
        record.kind = new_kind;
        record.updated_at = Utc::now();
        if let Some(style) = options.style {
            record.style = Some(style);
        }
        if options.replace_metadata {
            record.metadata = options.metadata;
        } else {
            record.metadata.extend(options.metadata);
        }

        if old_kind != new_kind {
            self.index_remove(old_kind, id);
            self.index_insert(new_kind, id);
            tracing::trace!(%id, from = %old_kind, to = %new_kind, "geometry reclassified");
        }
        self.invalidate_bounds();

        true
    }

    /// Remember the drawable a renderer created for `id`.
    ///
    /// Coordinates are unchanged, so the bounds cache stays valid.
    pub fn attach_drawable(&mut self, id: &GeometryId, handle: DrawableHandle) -> bool {
        match self.records.get_mut(id) {
            Some(record) => {
                record.drawable = Some(handle);
                true
            }
            None => false,
        }
    }

    /// Forget the drawable reference for `id`, returning it.
    pub fn detach_drawable(&mut self, id: &GeometryId) -> Option<DrawableHandle> {
        self.records.get_mut(id).and_then(|record| record.drawable.take())
    }

    /// Delete a record. Returns `false` if it did not exist.
    pub fn remove(&mut self, id: &GeometryId) -> bool {
        profile_function!();

        match self.records.shift_remove(id) {
            Some(record) => {
                self.index_remove(record.kind, id);
                self.invalidate_bounds();
                tracing::trace!(%id, "geometry removed");
                true
            }
            None => false,
        }
    }

    /// Delete several records; returns how many existed.
    pub fn remove_batch<'a>(&mut self, ids: impl IntoIterator<Item = &'a GeometryId>) -> usize {
        ids.into_iter().filter(|id| self.remove(id)).count()
    }

    /// Delete everything; returns how many records existed.
    pub fn clear(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        self.buckets.values_mut().for_each(IndexSet::clear);
        self.counts.values_mut().for_each(|count| *count = 0);
        self.invalidate_bounds();
        removed
    }

    /// Records whose feature property `key` equals `value`.
    pub fn search_by_property(&self, key: &str, value: &Value) -> Vec<&GeometryRecord> {
        self.records
            .values()
            .filter(|record| record.property(key) == Some(value))
            .collect()
    }

    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    pub fn count_by_type(&self, kind: GeometryKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            total: self.total_count(),
            by_kind: GeometryKind::ALL
                .into_iter()
                .map(|kind| (kind, self.count_by_type(kind)))
                .collect(),
            rendered: self.records.values().filter(|r| r.is_rendered()).count(),
        }
    }

    /// Export stored features as a collection, in insertion order.
    pub fn export_as_collection(&self, options: &ExportOptions) -> FeatureCollection {
        self.records
            .values()
            .filter(|record| options.kind.is_none_or(|kind| record.kind == kind))
            .map(|record| {
                let mut feature = record.feature.clone();
                if options.include_metadata {
                    feature.properties.insert(
                        INTERNAL_PROPERTY.to_string(),
                        json!({
                            "id": record.id,
                            "kind": record.kind,
                            "metadata": record.metadata,
                            "createdAt": record.created_at,
                            "updatedAt": record.updated_at,
                        }),
                    );
                }
                feature
            })
            .collect()
    }

    /// Bounding box of every stored coordinate, or `None` when empty.
    ///
    /// Computed on first read after a mutation and cached until the next one.
    pub fn calculate_bounds(&self) -> Option<Bounds> {
        if let BoundsCache::Valid(bounds) = self.bounds.get() {
            return bounds;
        }

        profile_function!();
        let bounds = Bounds::from_points(
            self.records
                .values()
                .flat_map(|record| record.feature.geometry.extent_points()),
        );
        self.bounds.set(BoundsCache::Valid(bounds));
        bounds
    }

    /// Whether the next [`calculate_bounds`](Self::calculate_bounds) recomputes.
    pub fn bounds_dirty(&self) -> bool {
        self.bounds.get() == BoundsCache::Dirty
    }

    fn invalidate_bounds(&self) {
        self.bounds.set(BoundsCache::Dirty);
    }

    fn index_insert(&mut self, kind: GeometryKind, id: &GeometryId) {
        if self.buckets.entry(kind).or_default().insert(id.clone()) {
            *self.counts.entry(kind).or_default() += 1;
        }
    }

    fn index_remove(&mut self, kind: GeometryKind, id: &GeometryId) {
        let removed = self
            .buckets
            .get_mut(&kind)
            .is_some_and(|bucket| bucket.shift_remove(id));
        if removed {
            if let Some(count) = self.counts.get_mut(&kind) {
                *count -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrane_core::LngLat;

    fn assert_consistent(store: &GeometryStore) {
        let sum: usize = GeometryKind::ALL
            .into_iter()
            .map(|kind| store.count_by_type(kind))
            .sum();
        assert_eq!(store.total_count(), sum);
        for kind in GeometryKind::ALL {
            assert_eq!(store.count_by_type(kind), store.get_by_type(kind).len());
        }
    }

    fn path() -> Vec<LngLat> {
        vec![LngLat::new(0.0, 0.0), LngLat::new(1.0, 1.0), LngLat::new(2.0, 0.0)]
    }

    #[test]
    fn test_add_generates_identity() {
        let mut store = GeometryStore::new();
        let id = store.add(Feature::point(1.0, 2.0), AddOptions::new()).unwrap();
        assert!(store.contains(&id));
        assert_eq!(store.get(&id).unwrap().kind, GeometryKind::Point);
        assert_consistent(&store);
    }

    #[test]
    fn test_add_rejects_malformed_without_mutation() {
        let mut store = GeometryStore::new();
        let result = store.add(Feature::line_string([LngLat::new(0.0, 0.0)]), AddOptions::new());
        assert!(result.is_none());
        assert!(store.is_empty());
        assert_consistent(&store);
    }

    #[test]
    fn test_add_rejects_empty_identity() {
        let mut store = GeometryStore::new();
        let result = store.add(Feature::point(1.0, 2.0), AddOptions::new().with_id(""));
        assert!(result.is_none());
        assert!(store.is_empty());
        assert_consistent(&store);
    }

    #[test]
    fn test_duplicate_identity_routes_to_update() {
        let mut store = GeometryStore::new();
        let id = store
            .add(Feature::point(1.0, 2.0), AddOptions::new().with_id("site"))
            .unwrap();
        let again = store
            .add(Feature::line_string(path()), AddOptions::new().with_id("site"))
            .unwrap();

        assert_eq!(id, again);
        assert_eq!(store.total_count(), 1);
        assert_eq!(store.count_by_type(GeometryKind::Point), 0);
        assert_eq!(store.count_by_type(GeometryKind::LineString), 1);
        assert_consistent(&store);
    }

    #[test]
    fn test_update_moves_bucket() {
        let mut store = GeometryStore::new();
        let id = store.add(Feature::line_string(path()), AddOptions::new()).unwrap();
        let created_at = store.get(&id).unwrap().created_at;

        assert!(store.update(&id, Feature::drawing(path()), UpdateOptions::new()));

        let record = store.get(&id).unwrap();
        assert_eq!(record.kind, GeometryKind::Drawing);
        assert_eq!(record.created_at, created_at);
        assert!(record.updated_at >= created_at);
        assert_eq!(store.count_by_type(GeometryKind::LineString), 0);
        assert_eq!(store.count_by_type(GeometryKind::Drawing), 1);
        assert_consistent(&store);
    }

    #[test]
    fn test_update_unknown_or_malformed_is_noop() {
        let mut store = GeometryStore::new();
        let id = store.add(Feature::point(1.0, 2.0), AddOptions::new()).unwrap();

        assert!(!store.update(&GeometryId::from("missing"), Feature::point(0.0, 0.0), UpdateOptions::new()));
        assert!(!store.update(&id, Feature::circle(LngLat::new(0.0, 0.0), -1.0), UpdateOptions::new()));
        assert_eq!(store.get(&id).unwrap().feature, Feature::point(1.0, 2.0));
    }

    #[test]
    fn test_update_metadata_merge_and_replace() {
        let mut store = GeometryStore::new();
        let id = store
            .add(Feature::point(1.0, 2.0), AddOptions::new().with_metadata("owner", "ops"))
            .unwrap();

        store.update(&id, Feature::point(1.0, 2.0), UpdateOptions::new().with_metadata("zone", 4));
        let metadata = &store.get(&id).unwrap().metadata;
        assert_eq!(metadata.get("owner"), Some(&Value::from("ops")));
        assert_eq!(metadata.get("zone"), Some(&Value::from(4)));

        store.update(
            &id,
            Feature::point(1.0, 2.0),
            UpdateOptions::new().with_metadata("zone", 5).replacing_metadata(),
        );
        let metadata = &store.get(&id).unwrap().metadata;
        assert!(metadata.get("owner").is_none());
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = GeometryStore::new();
        let id = store.add(Feature::point(1.0, 2.0), AddOptions::new()).unwrap();
        store.add(Feature::point(3.0, 4.0), AddOptions::new()).unwrap();

        assert!(store.remove(&id));
        let stats = store.stats();
        assert!(!store.remove(&id));
        assert_eq!(store.stats(), stats);
        assert_consistent(&store);
    }

    #[test]
    fn test_remove_batch_and_clear() {
        let mut store = GeometryStore::new();
        let ids = store.add_batch(
            vec![
                Feature::point(1.0, 2.0),
                Feature::line_string(path()),
                Feature::polygon(path()),
            ],
            AddOptions::new(),
        );
        assert_eq!(ids.len(), 3);

        let missing = GeometryId::from("missing");
        assert_eq!(store.remove_batch([&ids[0], &missing]), 1);
        assert_eq!(store.clear(), 2);
        assert!(store.is_empty());
        assert_consistent(&store);
    }

    #[test]
    fn test_bounds_cache_invalidation() {
        let mut store = GeometryStore::new();
        assert!(store.calculate_bounds().is_none());

        let id = store.add(Feature::point(1.0, 1.0), AddOptions::new()).unwrap();
        assert!(store.bounds_dirty());
        assert_eq!(store.calculate_bounds().unwrap().max_lng, 1.0);
        assert!(!store.bounds_dirty());

        store.attach_drawable(&id, DrawableHandle::new(1));
        assert!(!store.bounds_dirty());

        store.add(Feature::point(5.0, -2.0), AddOptions::new());
        assert!(store.bounds_dirty());
        let bounds = store.calculate_bounds().unwrap();
        assert_eq!(bounds.max_lng, 5.0);
        assert_eq!(bounds.min_lat, -2.0);
    }

    #[test]
    fn test_bounds_ignore_polygon_holes() {
        let mut store = GeometryStore::new();
        let outer = vec![
            LngLat::new(0.0, 0.0),
            LngLat::new(4.0, 0.0),
            LngLat::new(4.0, 4.0),
            LngLat::new(0.0, 0.0),
        ];
        let hole = vec![
            LngLat::new(10.0, 10.0),
            LngLat::new(11.0, 10.0),
            LngLat::new(11.0, 11.0),
            LngLat::new(10.0, 10.0),
        ];
        store.add(
            Feature::new(crate::Geometry::Polygon(vec![outer, hole])),
            AddOptions::new(),
        );
        assert_eq!(store.calculate_bounds().unwrap().max_lng, 4.0);
    }

    #[test]
    fn test_search_and_filter() {
        let mut store = GeometryStore::new();
        store.add(Feature::point(1.0, 2.0).with_property("status", "active"), AddOptions::new());
        let id = store
            .add(Feature::polygon(path()).with_property("status", "active"), AddOptions::new())
            .unwrap();
        store.add(Feature::point(3.0, 4.0).with_property("status", "retired"), AddOptions::new());
        store.attach_drawable(&id, DrawableHandle::new(9));

        assert_eq!(store.search_by_property("status", &Value::from("active")).len(), 2);
        assert_eq!(
            store
                .get_all(&RecordFilter::kind(GeometryKind::Point).with_property("status", "active"))
                .len(),
            1
        );
        let rendered = store.get_all(&RecordFilter::default().with_rendered(true));
        assert_eq!(rendered.len(), 1);
        assert_eq!(rendered[0].id, id);
        assert_eq!(store.get_all(&RecordFilter::default()).len(), 3);
    }

    #[test]
    fn test_export_with_metadata() {
        let mut store = GeometryStore::new();
        let id = store
            .add(Feature::point(1.0, 2.0), AddOptions::new().with_metadata("source", "survey"))
            .unwrap();

        let plain = store.export_as_collection(&ExportOptions::default());
        assert!(!plain.features[0].properties.contains_key(INTERNAL_PROPERTY));

        let exported = store.export_as_collection(&ExportOptions::with_metadata());
        let internal = &exported.features[0].properties[INTERNAL_PROPERTY];
        assert_eq!(internal["id"], Value::from(id.as_str()));
        assert_eq!(internal["kind"], "Point");
        assert_eq!(internal["metadata"]["source"], "survey");
    }

    #[test]
    fn test_detach_drawable() {
        let mut store = GeometryStore::new();
        let id = store.add(Feature::point(1.0, 2.0), AddOptions::new()).unwrap();
        assert!(store.attach_drawable(&id, DrawableHandle::new(3)));
        assert_eq!(store.detach_drawable(&id), Some(DrawableHandle::new(3)));
        assert_eq!(store.detach_drawable(&id), None);
        assert!(!store.attach_drawable(&GeometryId::from("missing"), DrawableHandle::new(1)));
    }
}
