//! Error types for geometry operations.
//!
//! Public store and orchestrator operations never return these to the caller
//! directly: validation failures become `None`/`false`, render failures become
//! `error` events. The typed errors exist so the failure reason can be logged
//! and re-surfaced.

use std::fmt;

use crate::{GeometryId, GeometryKind};

/// Failure reported by the map surface collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceError {
    pub message: String,
}

impl SurfaceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Map surface error: {}", self.message)
    }
}

impl std::error::Error for SurfaceError {}

/// Errors that can occur while validating, storing or rendering geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The feature is structurally malformed.
    Validation {
        /// Description of what is wrong.
        reason: String,
    },

    /// The geometry `type` is not one of the recognized kinds.
    UnknownKind {
        /// The type string as supplied.
        kind: String,
    },

    /// No record or drawable exists for the identity.
    NotFound {
        id: GeometryId,
    },

    /// A renderer was handed a feature of a different kind.
    KindMismatch {
        expected: GeometryKind,
        found: GeometryKind,
    },

    /// The map surface failed to create or remove a drawable.
    Render {
        id: GeometryId,
        source: SurfaceError,
    },

    /// Input text was not valid JSON.
    Parse {
        message: String,
    },
}

impl GeometryError {
    pub(crate) fn validation(reason: impl Into<String>) -> Self {
        GeometryError::Validation {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::Validation { reason } => {
                write!(f, "Invalid feature: {}", reason)
            }
            GeometryError::UnknownKind { kind } => {
                write!(f, "Unrecognized geometry type: {}", kind)
            }
            GeometryError::NotFound { id } => {
                write!(f, "Geometry not found: {}", id)
            }
            GeometryError::KindMismatch { expected, found } => {
                write!(f, "Renderer for {} cannot draw {}", expected, found)
            }
            GeometryError::Render { id, source } => {
                write!(f, "Failed to render {}: {}", id, source.message)
            }
            GeometryError::Parse { message } => {
                write!(f, "Invalid GeoJSON: {}", message)
            }
        }
    }
}

impl std::error::Error for GeometryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeometryError::Render { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for GeometryError {
    fn from(err: serde_json::Error) -> Self {
        GeometryError::Parse {
            message: err.to_string(),
        }
    }
}

/// Result type alias for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;
