//! Geodesic helpers over geographic longitude/latitude.
//!
//! Everything here is a pure function on [`LngLat`] slices. Distances use the
//! Haversine formula on a sphere of radius [`EARTH_RADIUS_M`]; areas use a
//! small-region spherical approximation, which is accurate while features stay
//! small relative to the Earth's radius.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Angular tolerance (degrees, per axis) for treating a ring as closed.
///
/// This is a fixed heuristic that absorbs floating round-trip error between
/// the first and last vertex. It has no geodesic derivation.
pub const CLOSURE_TOLERANCE_DEG: f64 = 1e-5;

/// A geographic position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub const fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }

    /// Build from a GeoJSON position slice (`[lng, lat, ...]`).
    ///
    /// Extra ordinates (altitude) are ignored.
    pub fn from_slice(position: &[f64]) -> Option<Self> {
        match position {
            [lng, lat, ..] => Some(Self::new(*lng, *lat)),
            _ => None,
        }
    }

    /// GeoJSON position order.
    pub fn to_array(self) -> [f64; 2] {
        [self.lng, self.lat]
    }

    pub fn is_finite(&self) -> bool {
        self.lng.is_finite() && self.lat.is_finite()
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &LngLat) -> f64 {
        haversine_distance(*self, *other)
    }
}

impl From<[f64; 2]> for LngLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self::new(lng, lat)
    }
}

/// Great-circle distance between two positions in meters (Haversine).
pub fn haversine_distance(a: LngLat, b: LngLat) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Whether the first and last vertices coincide within [`CLOSURE_TOLERANCE_DEG`].
///
/// A ring with fewer than three points is never closed.
pub fn is_ring_closed(ring: &[LngLat]) -> bool {
    is_ring_closed_with(ring, CLOSURE_TOLERANCE_DEG)
}

/// [`is_ring_closed`] with an explicit per-axis tolerance in degrees.
pub fn is_ring_closed_with(ring: &[LngLat], tolerance: f64) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let (first, last) = (ring[0], ring[ring.len() - 1]);
    (first.lng - last.lng).abs() < tolerance && (first.lat - last.lat).abs() < tolerance
}

/// Sum of consecutive great-circle segment lengths in meters.
pub fn path_length(path: &[LngLat]) -> f64 {
    path.windows(2)
        .map(|pair| haversine_distance(pair[0], pair[1]))
        .sum()
}

/// Path length plus the segment closing the ring (last back to first).
///
/// For a ring whose closing vertex is already repeated the extra segment is
/// zero-length.
pub fn ring_perimeter(ring: &[LngLat]) -> f64 {
    match (ring.first(), ring.last()) {
        (Some(first), Some(last)) if ring.len() >= 2 => {
            path_length(ring) + haversine_distance(*last, *first)
        }
        _ => 0.0,
    }
}

/// Approximate area of a ring in square meters.
///
/// Accumulates `Δλ · (2 + sin φ₁ + sin φ₂)` over every edge (the ring is
/// closed implicitly), scales by `R² / 2` and takes the absolute value. This is
/// a small-region spherical approximation; winding order does not matter.
pub fn ring_area(ring: &[LngLat]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }

    let mut total = 0.0;
    for i in 0..n {
        let p1 = ring[i];
        let p2 = ring[(i + 1) % n];
        let d_lng = (p2.lng - p1.lng).to_radians();
        total += d_lng * (2.0 + p1.lat.to_radians().sin() + p2.lat.to_radians().sin());
    }

    (total * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs()
}

/// Arithmetic mean of the vertices.
///
/// A repeated closing vertex is counted once so closed rings are not biased
/// towards their start point.
pub fn centroid(points: &[LngLat]) -> Option<LngLat> {
    let points = match points {
        [] => return None,
        [first, rest @ .., last] if !rest.is_empty() && first == last => &points[..points.len() - 1],
        _ => points,
    };

    let count = points.len() as f64;
    let (lng, lat) = points
        .iter()
        .fold((0.0, 0.0), |(lng, lat), p| (lng + p.lng, lat + p.lat));
    Some(LngLat::new(lng / count, lat / count))
}

/// Whether `point` lies within `radius_m` meters of `center`.
pub fn point_in_circle(point: LngLat, center: LngLat, radius_m: f64) -> bool {
    haversine_distance(point, center) <= radius_m
}
