//! Geographic bounding boxes.

use serde::{Deserialize, Serialize};
use terrane_core::LngLat;

/// Axis-aligned longitude/latitude box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_lng: f64,
    pub min_lat: f64,
    pub max_lng: f64,
    pub max_lat: f64,
}

impl Bounds {
    /// A zero-area box around one position.
    pub fn from_point(point: LngLat) -> Self {
        Self {
            min_lng: point.lng,
            min_lat: point.lat,
            max_lng: point.lng,
            max_lat: point.lat,
        }
    }

    /// Smallest box containing every point, or `None` for no points.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a LngLat>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = Self::from_point(*points.next()?);
        Some(points.fold(first, |bounds, point| bounds.extended(*point)))
    }

    /// This box grown to include `point`.
    pub fn extended(self, point: LngLat) -> Self {
        Self {
            min_lng: self.min_lng.min(point.lng),
            min_lat: self.min_lat.min(point.lat),
            max_lng: self.max_lng.max(point.lng),
            max_lat: self.max_lat.max(point.lat),
        }
    }

    /// Smallest box containing both boxes.
    pub fn union(self, other: Bounds) -> Self {
        Self {
            min_lng: self.min_lng.min(other.min_lng),
            min_lat: self.min_lat.min(other.min_lat),
            max_lng: self.max_lng.max(other.max_lng),
            max_lat: self.max_lat.max(other.max_lat),
        }
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: LngLat) -> bool {
        (self.min_lng..=self.max_lng).contains(&point.lng)
            && (self.min_lat..=self.max_lat).contains(&point.lat)
    }

    pub fn center(&self) -> LngLat {
        LngLat::new(
            (self.min_lng + self.max_lng) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    pub fn south_west(&self) -> LngLat {
        LngLat::new(self.min_lng, self.min_lat)
    }

    pub fn north_east(&self) -> LngLat {
        LngLat::new(self.max_lng, self.max_lat)
    }
}

/// Lazily computed bounds with an explicit dirty state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub(crate) enum BoundsCache {
    /// Contents changed since the last computation.
    #[default]
    Dirty,
    /// Matches current contents; `None` means the store is empty.
    Valid(Option<Bounds>),
}
