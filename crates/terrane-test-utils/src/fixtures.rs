//! Sample features and GeoJSON documents.
//!
//! Coordinates are around Porto Velho, Brazil, unless stated otherwise.

use serde_json::{Value, json};
use terrane_core::LngLat;
use terrane_geometry::Feature;

/// Side of a ~1 km square at the equator, in degrees.
pub const KM_SQUARE_SIDE_DEG: f64 = 1000.0 / 111_194.93;

/// Shift applied to the last vertex to open a closed ring.
pub const OPENING_SHIFT_DEG: f64 = 0.01;

pub fn city_center() -> LngLat {
    LngLat::new(-63.9039, -8.7619)
}

/// A ~1 km square at the equator, closed (first vertex repeated).
pub fn km_square() -> Vec<LngLat> {
    let d = KM_SQUARE_SIDE_DEG;
    vec![
        LngLat::new(0.0, 0.0),
        LngLat::new(d, 0.0),
        LngLat::new(d, d),
        LngLat::new(0.0, d),
        LngLat::new(0.0, 0.0),
    ]
}

/// A closed ring around the city center.
pub fn closed_ring() -> Vec<LngLat> {
    vec![
        LngLat::new(-63.91, -8.77),
        LngLat::new(-63.89, -8.77),
        LngLat::new(-63.89, -8.75),
        LngLat::new(-63.91, -8.75),
        LngLat::new(-63.91, -8.77),
    ]
}

/// [`closed_ring`] with the last vertex shifted by [`OPENING_SHIFT_DEG`].
pub fn opened_ring() -> Vec<LngLat> {
    let mut ring = closed_ring();
    if let Some(last) = ring.last_mut() {
        last.lng += OPENING_SHIFT_DEG;
        last.lat += OPENING_SHIFT_DEG;
    }
    ring
}

pub fn point_feature() -> Feature {
    Feature::point(-63.9039, -8.7619).with_property("name", "Porto Velho")
}

pub fn line_feature() -> Feature {
    Feature::line_string([
        LngLat::new(-63.90, -8.76),
        LngLat::new(-63.88, -8.75),
        LngLat::new(-63.86, -8.74),
    ])
    .with_property("name", "Avenida")
}

pub fn polygon_feature() -> Feature {
    Feature::polygon(closed_ring()).with_property("name", "Centro")
}

pub fn circle_feature(radius: f64) -> Feature {
    Feature::circle(LngLat::new(-63.8900, -8.7500), radius).with_property("name", "Buffer")
}

pub fn closed_drawing() -> Feature {
    Feature::drawing(closed_ring())
}

pub fn open_drawing() -> Feature {
    Feature::drawing(opened_ring())
}

/// One feature of every kind.
pub fn one_of_each() -> Vec<Feature> {
    vec![
        point_feature(),
        line_feature(),
        polygon_feature(),
        circle_feature(500.0),
        closed_drawing(),
    ]
}

/// A GeoJSON point feature document.
pub fn point_geojson() -> Value {
    json!({
        "type": "Feature",
        "geometry": { "type": "Point", "coordinates": [-63.9039, -8.7619] },
        "properties": { "name": "Porto Velho" }
    })
}

/// A GeoJSON circle feature document with the radius on the geometry.
pub fn circle_geojson(radius: f64) -> Value {
    json!({
        "type": "Feature",
        "geometry": {
            "type": "Circle",
            "coordinates": [-63.8900, -8.7500],
            "properties": { "radius": radius }
        },
        "properties": {}
    })
}

/// A collection holding one well-formed and one malformed feature.
pub fn mixed_collection() -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [
            point_geojson(),
            { "type": "Feature", "geometry": { "type": "LineString" }, "properties": {} }
        ]
    })
}
