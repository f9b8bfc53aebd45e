//! Test utilities for Terrane.
//!
//! - `MockMapSurface`: a [`MapSurface`](terrane_geometry::MapSurface) that
//!   records every call instead of drawing (requires the `mock` feature)
//! - [`fixtures`]: ready-made features and GeoJSON documents
//!
//! # Example
//!
//! ```rust
//! # #[cfg(feature = "mock")]
//! # {
//! use std::sync::Arc;
//! use terrane_core::LngLat;
//! use terrane_geometry::{MapSurface, Style};
//! use terrane_test_utils::MockMapSurface;
//!
//! let mock = Arc::new(MockMapSurface::new());
//! mock.create_point(LngLat::new(-63.9, -8.76), &Style::new()).unwrap();
//!
//! assert_eq!(mock.live_count(), 1);
//! assert_eq!(mock.count_creates(), 1);
//! # }
//! ```

pub mod fixtures;
#[cfg(feature = "mock")]
pub mod mock_surface;

#[cfg(feature = "mock")]
pub use mock_surface::*;
