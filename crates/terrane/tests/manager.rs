//! End-to-end behavior of the geometry manager against the mock surface.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use terrane::events::{CLEARED, ERROR, GEOMETRY_ADDED, GEOMETRY_REMOVED, GEOMETRY_UPDATED};
use terrane::prelude::*;
use terrane_test_utils::{MockMapSurface, fixtures};

fn setup() -> (Arc<MockMapSurface>, GeometryManager) {
    let surface = Arc::new(MockMapSurface::new());
    let manager = GeometryManager::new(surface.clone());
    (surface, manager)
}

fn payloads(manager: &GeometryManager, name: &str) -> Vec<Value> {
    manager
        .events()
        .history_for(name)
        .into_iter()
        .map(|record| record.payload.clone())
        .collect()
}

// ====================
// Adding
// ====================

#[test]
fn test_point_and_circle_scenario() {
    let (surface, mut manager) = setup();
    let collection = json!({
        "type": "FeatureCollection",
        "features": [fixtures::point_geojson(), fixtures::circle_geojson(500.0)]
    });

    let ids = manager.add_geojson(&collection, AddOptions::new());

    assert_eq!(ids.len(), 2);
    assert_eq!(manager.store().count_by_type(GeometryKind::Point), 1);
    assert_eq!(manager.store().count_by_type(GeometryKind::Circle), 1);
    assert_eq!(surface.live_count(), 2);

    let bounds = manager.store().calculate_bounds().unwrap();
    assert_eq!(bounds.min_lng, -63.9039);
    assert_eq!(bounds.max_lng, -63.89);
    assert_eq!(bounds.min_lat, -8.7619);
    assert_eq!(bounds.max_lat, -8.75);
}

#[test]
fn test_one_aggregated_added_event_per_call() {
    let (_, mut manager) = setup();
    let collection: FeatureCollection = fixtures::one_of_each().into_iter().collect();

    let ids = manager.add_geojson(&collection.to_value(), AddOptions::new());

    let added = payloads(&manager, GEOMETRY_ADDED);
    assert_eq!(added.len(), 1);
    assert_eq!(added[0]["count"], 5);
    let uuids: Vec<&str> = added[0]["uuids"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    let expected: Vec<&str> = ids.iter().map(GeometryId::as_str).collect();
    assert_eq!(uuids, expected);
}

#[test]
fn test_malformed_features_are_skipped() {
    let (surface, mut manager) = setup();

    let ids = manager.add_geojson(&fixtures::mixed_collection(), AddOptions::new());

    assert_eq!(ids.len(), 1);
    assert_eq!(manager.store().total_count(), 1);
    assert_eq!(surface.live_count(), 1);
    assert_eq!(payloads(&manager, GEOMETRY_ADDED)[0]["count"], 1);
}

#[test]
fn test_unrecognized_input_adds_nothing() {
    let (_, mut manager) = setup();

    assert!(manager.add_geojson(&json!({ "type": "Topology" }), AddOptions::new()).is_empty());
    assert!(manager.add_geojson(&json!(42), AddOptions::new()).is_empty());
    assert!(manager.events().history().is_empty());
}

#[test]
fn test_load_invalid_json_emits_error() {
    let (_, mut manager) = setup();

    let ids = manager.load_geojson_str("{ not json");

    assert!(ids.is_empty());
    let errors = payloads(&manager, ERROR);
    assert_eq!(errors.len(), 1);
    assert!(errors[0]["message"].as_str().unwrap().starts_with("Invalid GeoJSON"));
}

#[test]
fn test_render_failure_rolls_back_and_continues() {
    let (surface, mut manager) = setup();
    surface.fail_next_creates(1);

    let ids = manager.add_features(
        vec![fixtures::point_feature(), fixtures::line_feature()],
        AddOptions::new(),
    );

    assert_eq!(ids.len(), 1);
    assert_eq!(manager.store().total_count(), 1);
    assert_eq!(manager.store().count_by_type(GeometryKind::Point), 0);
    assert_eq!(manager.store().count_by_type(GeometryKind::LineString), 1);
    assert_eq!(payloads(&manager, ERROR).len(), 1);
    assert_eq!(payloads(&manager, GEOMETRY_ADDED)[0]["count"], 1);
}

#[test]
fn test_drawable_handle_written_back() {
    let (surface, mut manager) = setup();
    let id = manager
        .add_feature(fixtures::polygon_feature(), AddOptions::new())
        .unwrap();

    let handle = manager.get(&id).unwrap().drawable.unwrap();
    assert!(surface.is_live(handle));
    assert_eq!(manager.renderers().find_handle(&id), Some((GeometryKind::Polygon, handle)));
}

#[test]
fn test_missing_renderer_keeps_record_undrawn() {
    let (surface, mut manager) = setup();
    manager.renderers_mut().unregister(GeometryKind::Drawing);

    let id = manager
        .add_feature(fixtures::closed_drawing(), AddOptions::new())
        .unwrap();

    assert!(manager.get(&id).is_some());
    assert!(!manager.get(&id).unwrap().is_rendered());
    assert_eq!(surface.live_count(), 0);
}

#[test]
fn test_style_override_from_options() {
    let (surface, mut manager) = setup();
    manager.add_feature(
        fixtures::line_feature(),
        AddOptions::new().with_style(Style::new().with_color("#123456")),
    );

    let call = surface.last_call().unwrap();
    assert_eq!(call.style().unwrap().color.as_deref(), Some("#123456"));
    assert_eq!(call.style().unwrap().weight, presets::line().weight);
}

// ====================
// Updating
// ====================

#[test]
fn test_closed_then_opened_drawing() {
    let (surface, mut manager) = setup();
    let id = manager
        .add_feature(fixtures::closed_drawing(), AddOptions::new())
        .unwrap();

    let metadata = manager.metadata(&id).unwrap();
    assert!(metadata.is_closed);
    assert!(metadata.area > 0.0);

    assert!(manager.update_feature(&id, fixtures::open_drawing(), UpdateOptions::new()));

    let metadata = manager.metadata(&id).unwrap();
    assert!(!metadata.is_closed);
    assert_eq!(metadata.area, 0.0);
    assert_eq!(surface.live_count(), 1);
}

#[test]
fn test_update_across_kinds_moves_drawable() {
    let (surface, mut manager) = setup();
    let id = manager
        .add_feature(fixtures::point_feature(), AddOptions::new())
        .unwrap();

    let updated = manager.update_geometry(&id, &fixtures::circle_geojson(300.0), UpdateOptions::new());

    assert!(updated);
    assert_eq!(surface.live_count(), 1);
    assert!(manager.renderers().get(GeometryKind::Point).unwrap().handle(&id).is_none());
    assert!(manager.renderers().get(GeometryKind::Circle).unwrap().handle(&id).is_some());
    assert_eq!(manager.store().count_by_type(GeometryKind::Circle), 1);
    assert_eq!(payloads(&manager, GEOMETRY_UPDATED)[0]["uuids"][0], id.as_str());
}

#[test]
fn test_duplicate_identity_add_updates() {
    let (surface, mut manager) = setup();
    manager.add_feature(fixtures::point_feature(), AddOptions::new().with_id("site"));
    manager.add_feature(fixtures::circle_feature(100.0), AddOptions::new().with_id("site"));

    assert_eq!(manager.store().total_count(), 1);
    assert_eq!(surface.live_count(), 1);
    assert_eq!(
        manager.renderers().find_handle(&GeometryId::from("site")).map(|(kind, _)| kind),
        Some(GeometryKind::Circle)
    );

    let added = payloads(&manager, GEOMETRY_ADDED);
    assert_eq!(added.len(), 1);
    assert_eq!(added[0]["uuids"], json!(["site"]));
    let updated = payloads(&manager, GEOMETRY_UPDATED);
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0]["uuids"], json!(["site"]));
}

#[test]
fn test_duplicate_identity_render_failure_counts_as_update() {
    let (surface, mut manager) = setup();
    manager.add_feature(fixtures::point_feature(), AddOptions::new().with_id("site"));

    surface.fail_next_creates(1);
    let id = manager.add_feature(fixtures::circle_feature(100.0), AddOptions::new().with_id("site"));

    assert_eq!(id, Some(GeometryId::from("site")));
    assert_eq!(manager.store().count_by_type(GeometryKind::Circle), 1);
    assert!(!manager.get(&GeometryId::from("site")).unwrap().is_rendered());
    assert_eq!(payloads(&manager, GEOMETRY_ADDED).len(), 1);
    assert_eq!(payloads(&manager, GEOMETRY_UPDATED).len(), 1);
    assert_eq!(payloads(&manager, ERROR).len(), 1);
}

#[test]
fn test_update_batch_reports_only_successes() {
    let (_, mut manager) = setup();
    let ids = manager.add_features(
        vec![fixtures::point_feature(), fixtures::point_feature()],
        AddOptions::new(),
    );

    let updated = manager.update_batch(
        vec![
            (ids[0].clone(), fixtures::point_geojson()),
            (GeometryId::from("missing"), fixtures::point_geojson()),
            (ids[1].clone(), json!({ "geometry": { "type": "Point" } })),
        ],
        UpdateOptions::new(),
    );

    assert_eq!(updated, vec![ids[0].clone()]);
    let events = payloads(&manager, GEOMETRY_UPDATED);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["count"], 1);
}

// ====================
// Removing
// ====================

#[test]
fn test_remove_batch_and_idempotence() {
    let (surface, mut manager) = setup();
    let ids = manager.add_features(fixtures::one_of_each(), AddOptions::new());

    let removed = manager.remove_batch(&ids[..2]);
    assert_eq!(removed.len(), 2);
    assert_eq!(surface.live_count(), 3);

    assert!(!manager.remove_geometry(&ids[0]));
    assert!(manager.remove_geometry(&ids[2]));

    let events = payloads(&manager, GEOMETRY_REMOVED);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["count"], 2);
    assert_eq!(events[1]["count"], 1);
}

#[test]
fn test_clear_removes_every_drawable() {
    let (surface, mut manager) = setup();
    manager.add_features(fixtures::one_of_each(), AddOptions::new());

    assert_eq!(manager.clear(), 5);
    assert_eq!(surface.live_count(), 0);
    assert!(manager.store().is_empty());
    assert_eq!(manager.renderers().rendered_count(), 0);
    assert_eq!(payloads(&manager, CLEARED), vec![json!({})]);
}

#[test]
fn test_refused_removal_emits_error() {
    let (surface, mut manager) = setup();
    let id = manager
        .add_feature(fixtures::point_feature(), AddOptions::new())
        .unwrap();

    surface.fail_next_removes(1);
    assert!(manager.remove_geometry(&id));

    assert!(manager.get(&id).is_none());
    assert_eq!(manager.renderers().rendered_count(), 0);
    let errors = payloads(&manager, ERROR);
    assert_eq!(errors.len(), 1);
    assert!(errors[0]["message"].as_str().unwrap().contains(id.as_str()));
    assert_eq!(payloads(&manager, GEOMETRY_REMOVED).len(), 1);
}

#[test]
fn test_drawable_gone_from_surface_emits_error_on_remove() {
    let (surface, mut manager) = setup();
    let id = manager
        .add_feature(fixtures::point_feature(), AddOptions::new())
        .unwrap();
    let handle = manager.get(&id).unwrap().drawable.unwrap();
    surface.remove_drawable(handle).unwrap();

    assert!(manager.remove_geometry(&id));
    assert_eq!(payloads(&manager, ERROR).len(), 1);
    assert_eq!(payloads(&manager, GEOMETRY_REMOVED).len(), 1);
}

#[test]
fn test_clear_reports_refused_removals() {
    let (surface, mut manager) = setup();
    manager.add_features(fixtures::one_of_each(), AddOptions::new());

    surface.fail_next_removes(2);
    assert_eq!(manager.clear(), 5);

    assert!(manager.store().is_empty());
    assert_eq!(manager.renderers().rendered_count(), 0);
    assert_eq!(payloads(&manager, ERROR).len(), 2);
    assert_eq!(payloads(&manager, CLEARED).len(), 1);
}

#[test]
fn test_kind_change_reports_refused_removal() {
    let (surface, mut manager) = setup();
    let id = manager
        .add_feature(fixtures::point_feature(), AddOptions::new())
        .unwrap();

    surface.fail_next_removes(1);
    assert!(manager.update_feature(&id, fixtures::circle_feature(50.0), UpdateOptions::new()));

    assert_eq!(payloads(&manager, ERROR).len(), 1);
    assert_eq!(
        manager.renderers().find_handle(&id).map(|(kind, _)| kind),
        Some(GeometryKind::Circle)
    );
}

// ====================
// Interaction, viewport and export
// ====================

#[test]
fn test_interaction_events() {
    let (_, mut manager) = setup();
    let id = manager
        .add_feature(fixtures::point_feature(), AddOptions::new())
        .unwrap();

    let clicks = Rc::new(RefCell::new(Vec::new()));
    let sink = clicks.clone();
    manager.events_mut().on("geometryClicked", move |event| {
        sink.borrow_mut().push(event.payload["uuid"].clone());
    });

    assert!(manager.click(&id));
    assert!(manager.hover(&id));
    assert!(manager.unhover(&id));
    assert!(!manager.click(&GeometryId::from("missing")));

    assert_eq!(*clicks.borrow(), vec![Value::from(id.as_str())]);
    let hovered = payloads(&manager, "geometryHovered");
    assert_eq!(hovered[0]["geometry"]["properties"]["name"], "Porto Velho");
    assert_eq!(payloads(&manager, "geometryUnhovered").len(), 1);
}

#[test]
fn test_fit_to_bounds() {
    let (surface, mut manager) = setup();
    assert!(manager.fit_to_bounds().is_none());
    assert!(surface.viewport().is_none());

    manager.add_features(fixtures::one_of_each(), AddOptions::new());
    let bounds = manager.fit_to_bounds().unwrap();
    assert_eq!(surface.viewport(), Some(bounds));
}

#[test]
fn test_fit_on_load() {
    let surface = Arc::new(MockMapSurface::new());
    let mut manager = GeometryManager::with_config(
        surface.clone(),
        ManagerConfig::new().with_fit_on_load(true),
    );

    manager.add_geojson(&fixtures::point_geojson(), AddOptions::new());
    assert!(surface.viewport().is_some());
}

#[test]
fn test_circles_containing() {
    let (_, mut manager) = setup();
    let center = LngLat::new(0.0, 0.0);
    let near = manager
        .add_feature(Feature::circle(center, 1000.0), AddOptions::new())
        .unwrap();
    manager.add_feature(Feature::circle(LngLat::new(1.0, 1.0), 1000.0), AddOptions::new());

    assert_eq!(manager.circles_containing(LngLat::new(0.005, 0.0)), vec![near]);
    assert!(manager.circles_containing(LngLat::new(0.5, 0.5)).is_empty());
}

#[test]
fn test_configured_styles_apply() {
    let surface = Arc::new(MockMapSurface::new());
    let style = Style::stroke("#000000", 1.0);
    let mut manager = GeometryManager::with_config(
        surface.clone(),
        ManagerConfig::new().with_style(GeometryKind::Point, style.clone()),
    );

    manager.add_feature(fixtures::point_feature(), AddOptions::new());
    assert_eq!(surface.last_call().unwrap().style(), Some(&style));

    assert!(manager.set_default_style(GeometryKind::Point, presets::highlight()));
    manager.add_feature(fixtures::point_feature(), AddOptions::new());
    assert_eq!(surface.last_call().unwrap().style(), Some(&presets::highlight()));
}

#[test]
fn test_export_round_trip_through_manager() {
    let (_, mut manager) = setup();
    manager.add_features(fixtures::one_of_each(), AddOptions::new());

    let exported = manager.export_geojson(&ExportOptions::with_metadata());
    assert_eq!(exported["features"].as_array().unwrap().len(), 5);
    assert!(exported["features"][0]["properties"]["_internal"]["createdAt"].is_string());

    let (_, mut copy) = setup();
    let ids = copy.add_geojson(&manager.export_geojson(&ExportOptions::default()), AddOptions::new());
    assert_eq!(ids.len(), 5);
    for kind in GeometryKind::ALL {
        assert_eq!(copy.store().count_by_type(kind), manager.store().count_by_type(kind));
    }
}

// ====================
// Sequenced events
// ====================

#[test]
fn test_sequenced_events_keep_order() {
    let (_, mut manager) = setup();
    let events = vec![
        ("geometryAdded", json!({ "count": 1 })),
        ("geometryUpdated", json!({ "count": 1 })),
        ("geometryRemoved", json!({ "count": 1 })),
    ];

    futures_lite::future::block_on(
        manager
            .events_mut()
            .trigger_sequence(events, Duration::ZERO),
    );

    let history = manager.events().history();
    let names: Vec<_> = history.iter().map(|record| record.name.as_str()).collect();
    assert_eq!(names, vec!["geometryAdded", "geometryUpdated", "geometryRemoved"]);
    assert!(history.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));
}
