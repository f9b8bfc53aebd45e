//! GeoJSON-compatible feature model.
//!
//! Besides the standard `Point`, `LineString` and `Polygon` types the model
//! understands two extensions:
//!
//! - `Circle`: a `[lng, lat]` center with a `radius` in meters, read from
//!   `geometry.properties.radius` first and `feature.properties.radius` second.
//! - `Drawing`: a free-hand path shaped like a `LineString` whose open/closed
//!   classification is decided when it is rendered.
//!
//! Parsing goes through [`Feature::from_value`]; every parsed feature has
//! already passed [`Feature::validate`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use terrane_core::LngLat;

use crate::error::{GeometryError, GeometryResult};

/// Minimum vertices for a `LineString` or `Drawing`.
pub const MIN_PATH_POINTS: usize = 2;

/// Minimum vertices for a polygon's outer ring.
pub const MIN_RING_POINTS: usize = 3;

/// Classification tag of a geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
    Polygon,
    Circle,
    Drawing,
}

impl GeometryKind {
    /// Every kind, in index order.
    pub const ALL: [GeometryKind; 5] = [
        GeometryKind::Point,
        GeometryKind::LineString,
        GeometryKind::Polygon,
        GeometryKind::Circle,
        GeometryKind::Drawing,
    ];

    /// The GeoJSON `type` string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            GeometryKind::Point => "Point",
            GeometryKind::LineString => "LineString",
            GeometryKind::Polygon => "Polygon",
            GeometryKind::Circle => "Circle",
            GeometryKind::Drawing => "Drawing",
        }
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GeometryKind {
    type Err = GeometryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeometryKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| GeometryError::UnknownKind { kind: s.to_string() })
    }
}

/// Typed geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(LngLat),
    LineString(Vec<LngLat>),
    /// Outer ring first; any further rings are holes, kept but ignored.
    Polygon(Vec<Vec<LngLat>>),
    Circle {
        center: LngLat,
        /// Radius in meters.
        radius: f64,
    },
    Drawing(Vec<LngLat>),
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::Circle { .. } => GeometryKind::Circle,
            Geometry::Drawing(_) => GeometryKind::Drawing,
        }
    }

    /// Coordinates that contribute to bounds.
    ///
    /// Points and circles contribute their single position, paths every vertex,
    /// polygons their outer ring only.
    pub fn extent_points(&self) -> &[LngLat] {
        match self {
            Geometry::Point(position) => std::slice::from_ref(position),
            Geometry::Circle { center, .. } => std::slice::from_ref(center),
            Geometry::LineString(path) | Geometry::Drawing(path) => path,
            Geometry::Polygon(rings) => rings.first().map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// The outer ring of a polygon.
    pub fn outer_ring(&self) -> Option<&[LngLat]> {
        match self {
            Geometry::Polygon(rings) => rings.first().map(Vec::as_slice),
            _ => None,
        }
    }

    fn validate(&self) -> GeometryResult<()> {
        match self {
            Geometry::Point(position) => check_finite(std::slice::from_ref(position)),
            Geometry::LineString(path) | Geometry::Drawing(path) => {
                if path.len() < MIN_PATH_POINTS {
                    return Err(GeometryError::validation(format!(
                        "{} needs at least {} positions, got {}",
                        self.kind(),
                        MIN_PATH_POINTS,
                        path.len()
                    )));
                }
                check_finite(path.as_slice())
            }
            Geometry::Polygon(rings) => {
                let outer = rings
                    .first()
                    .ok_or_else(|| GeometryError::validation("Polygon has no outer ring"))?;
                if outer.len() < MIN_RING_POINTS {
                    return Err(GeometryError::validation(format!(
                        "Polygon outer ring needs at least {} positions, got {}",
                        MIN_RING_POINTS,
                        outer.len()
                    )));
                }
                rings.iter().try_for_each(|ring| check_finite(ring.as_slice()))
            }
            Geometry::Circle { center, radius } => {
                if !(radius.is_finite() && *radius > 0.0) {
                    return Err(GeometryError::validation(format!(
                        "Circle radius must be a positive number of meters, got {}",
                        radius
                    )));
                }
                check_finite(std::slice::from_ref(center))
            }
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Geometry::Point(position) => json!({
                "type": "Point",
                "coordinates": position.to_array(),
            }),
            Geometry::LineString(path) => json!({
                "type": "LineString",
                "coordinates": positions(path.as_slice()),
            }),
            Geometry::Drawing(path) => json!({
                "type": "Drawing",
                "coordinates": positions(path.as_slice()),
            }),
            Geometry::Polygon(rings) => json!({
                "type": "Polygon",
                "coordinates": rings.iter().map(|ring| positions(ring.as_slice())).collect::<Vec<_>>(),
            }),
            Geometry::Circle { center, radius } => json!({
                "type": "Circle",
                "coordinates": center.to_array(),
                "properties": { "radius": radius },
            }),
        }
    }
}

/// A geometry paired with free-form properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Feature {
    /// Foreign `id` member, preserved verbatim.
    pub id: Option<Value>,
    pub geometry: Geometry,
    pub properties: Map<String, Value>,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            geometry,
            properties: Map::new(),
        }
    }

    pub fn point(lng: f64, lat: f64) -> Self {
        Self::new(Geometry::Point(LngLat::new(lng, lat)))
    }

    pub fn line_string(path: impl IntoIterator<Item = LngLat>) -> Self {
        Self::new(Geometry::LineString(path.into_iter().collect()))
    }

    /// A polygon with a single outer ring.
    pub fn polygon(ring: impl IntoIterator<Item = LngLat>) -> Self {
        Self::new(Geometry::Polygon(vec![ring.into_iter().collect()]))
    }

    pub fn circle(center: LngLat, radius: f64) -> Self {
        Self::new(Geometry::Circle { center, radius })
    }

    pub fn drawing(path: impl IntoIterator<Item = LngLat>) -> Self {
        Self::new(Geometry::Drawing(path.into_iter().collect()))
    }

    /// Set a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Set the foreign `id` member.
    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn kind(&self) -> GeometryKind {
        self.geometry.kind()
    }

    /// Check the structural constraints of the geometry.
    pub fn validate(&self) -> GeometryResult<()> {
        self.geometry.validate()
    }

    /// Parse and validate a GeoJSON `Feature` object.
    pub fn from_value(value: &Value) -> GeometryResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| GeometryError::validation("feature must be a JSON object"))?;

        let properties = match object.get("properties") {
            Some(Value::Object(map)) => map.clone(),
            Some(Value::Null) | None => Map::new(),
            Some(_) => return Err(GeometryError::validation("properties must be an object")),
        };

        let geometry = object
            .get("geometry")
            .and_then(Value::as_object)
            .ok_or_else(|| GeometryError::validation("feature has no geometry object"))?;

        let kind: GeometryKind = geometry
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| GeometryError::validation("geometry has no type"))?
            .parse()?;

        let coordinates = match geometry.get("coordinates") {
            Some(coordinates @ Value::Array(_)) => coordinates,
            _ => {
                return Err(GeometryError::validation(format!(
                    "{} geometry has no coordinate array",
                    kind
                )));
            }
        };

        let geometry = match kind {
            GeometryKind::Point => Geometry::Point(parse_position(coordinates)?),
            GeometryKind::LineString => Geometry::LineString(parse_path(coordinates)?),
            GeometryKind::Drawing => Geometry::Drawing(parse_path(coordinates)?),
            GeometryKind::Polygon => Geometry::Polygon(
                as_array(coordinates)?
                    .iter()
                    .map(parse_path)
                    .collect::<GeometryResult<_>>()?,
            ),
            GeometryKind::Circle => {
                let radius = geometry
                    .get("properties")
                    .and_then(|p| p.get("radius"))
                    .and_then(Value::as_f64)
                    .or_else(|| properties.get("radius").and_then(Value::as_f64))
                    .ok_or_else(|| GeometryError::validation("Circle has no numeric radius"))?;
                Geometry::Circle {
                    center: parse_position(coordinates)?,
                    radius,
                }
            }
        };

        let feature = Feature {
            id: object.get("id").filter(|id| !id.is_null()).cloned(),
            geometry,
            properties,
        };
        feature.validate()?;
        Ok(feature)
    }

    /// Serialize to a GeoJSON `Feature` object.
    pub fn to_value(&self) -> Value {
        let mut object = Map::new();
        object.insert("type".into(), Value::from("Feature"));
        if let Some(id) = &self.id {
            object.insert("id".into(), id.clone());
        }
        object.insert("geometry".into(), self.geometry.to_value());
        object.insert("properties".into(), Value::Object(self.properties.clone()));
        Value::Object(object)
    }
}

impl TryFrom<Value> for Feature {
    type Error = GeometryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Feature::from_value(&value)
    }
}

impl From<Feature> for Value {
    fn from(feature: Feature) -> Self {
        feature.to_value()
    }
}

/// An ordered list of features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Serialize to a GeoJSON `FeatureCollection` object.
    pub fn to_value(&self) -> Value {
        json!({
            "type": "FeatureCollection",
            "features": self.features.iter().map(Feature::to_value).collect::<Vec<_>>(),
        })
    }
}

impl TryFrom<Value> for FeatureCollection {
    type Error = GeometryError;

    /// Strict conversion: any malformed member fails the whole collection.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let features = value
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| GeometryError::validation("collection has no features array"))?
            .iter()
            .map(Feature::from_value)
            .collect::<GeometryResult<_>>()?;
        Ok(Self { features })
    }
}

impl From<FeatureCollection> for Value {
    fn from(collection: FeatureCollection) -> Self {
        collection.to_value()
    }
}

impl FromIterator<Feature> for FeatureCollection {
    fn from_iter<T: IntoIterator<Item = Feature>>(iter: T) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}

fn check_finite(points: &[LngLat]) -> GeometryResult<()> {
    if points.iter().all(LngLat::is_finite) {
        Ok(())
    } else {
        Err(GeometryError::validation("coordinates must be finite numbers"))
    }
}

fn positions(points: &[LngLat]) -> Value {
    points.iter().map(|p| json!(p.to_array())).collect()
}

fn as_array(value: &Value) -> GeometryResult<&Vec<Value>> {
    value
        .as_array()
        .ok_or_else(|| GeometryError::validation("expected a coordinate array"))
}

fn parse_position(value: &Value) -> GeometryResult<LngLat> {
    let ordinates = as_array(value)?
        .iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| GeometryError::validation("position ordinates must be numbers"))
        })
        .collect::<GeometryResult<Vec<f64>>>()?;
    LngLat::from_slice(&ordinates)
        .ok_or_else(|| GeometryError::validation("position needs [lng, lat]"))
}

fn parse_path(value: &Value) -> GeometryResult<Vec<LngLat>> {
    as_array(value)?.iter().map(parse_position).collect()
}
