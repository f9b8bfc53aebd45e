//! Stored geometry records and their identities.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{DrawableHandle, Feature, GeometryKind, Style};

/// Stable identity of a stored geometry.
///
/// Generated identities are UUID v4 strings; callers may supply any token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeometryId(String);

impl GeometryId {
    /// A fresh random identity.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GeometryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for GeometryId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for GeometryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A feature held by the [`GeometryStore`](crate::GeometryStore).
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryRecord {
    pub id: GeometryId,
    /// The feature as last added or updated.
    pub feature: Feature,
    /// Always equal to `feature.kind()`.
    pub kind: GeometryKind,
    /// Style overrides merged over the renderer's default style.
    pub style: Option<Style>,
    /// Free-form metadata, separate from the feature's own properties.
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Drawable owned by a renderer; the store only keeps the reference.
    pub drawable: Option<DrawableHandle>,
}

impl GeometryRecord {
    pub(crate) fn new(
        id: GeometryId,
        feature: Feature,
        style: Option<Style>,
        metadata: Map<String, Value>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            kind: feature.kind(),
            feature,
            style,
            metadata,
            created_at: now,
            updated_at: now,
            drawable: None,
        }
    }

    pub fn is_rendered(&self) -> bool {
        self.drawable.is_some()
    }

    /// Value of a feature property.
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.feature.properties.get(key)
    }
}
