//! Mock implementation of MapSurface for testing.
//!
//! Records every surface call and keeps the set of live drawables so tests can
//! check that no drawable leaks.

use parking_lot::Mutex;
use terrane_core::LngLat;
use terrane_core::alloc::IndexMap;
use terrane_geometry::{Bounds, DrawableHandle, DrawableShape, MapSurface, Style, SurfaceError};

/// Records a surface operation for verification in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCall {
    CreatePoint {
        position: LngLat,
        style: Style,
    },
    CreateLine {
        path: Vec<LngLat>,
        style: Style,
    },
    CreatePolygon {
        ring: Vec<LngLat>,
        style: Style,
    },
    CreateCircle {
        center: LngLat,
        radius: f64,
        style: Style,
    },
    RemoveDrawable {
        handle: DrawableHandle,
    },
    FitBounds {
        bounds: Bounds,
    },
}

impl SurfaceCall {
    pub fn is_create(&self) -> bool {
        matches!(
            self,
            SurfaceCall::CreatePoint { .. }
                | SurfaceCall::CreateLine { .. }
                | SurfaceCall::CreatePolygon { .. }
                | SurfaceCall::CreateCircle { .. }
        )
    }

    /// Style passed to a create call.
    pub fn style(&self) -> Option<&Style> {
        match self {
            SurfaceCall::CreatePoint { style, .. }
            | SurfaceCall::CreateLine { style, .. }
            | SurfaceCall::CreatePolygon { style, .. }
            | SurfaceCall::CreateCircle { style, .. } => Some(style),
            _ => None,
        }
    }
}

/// A drawable currently on the mock surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MockDrawable {
    pub shape: DrawableShape,
    pub points: Vec<LngLat>,
    pub radius: Option<f64>,
}

/// Mock implementation of [`MapSurface`] for testing.
///
/// Methods take `&self`; state lives behind `parking_lot::Mutex` so the mock
/// can be shared through an `Arc` like a real surface.
///
/// # Example
///
/// ```rust
/// use terrane_core::LngLat;
/// use terrane_geometry::{MapSurface, Style};
/// use terrane_test_utils::MockMapSurface;
///
/// let mock = MockMapSurface::new();
/// mock.fail_next_creates(1);
///
/// assert!(mock.create_point(LngLat::new(0.0, 0.0), &Style::new()).is_err());
/// assert!(mock.create_point(LngLat::new(0.0, 0.0), &Style::new()).is_ok());
/// ```
#[derive(Debug, Default)]
pub struct MockMapSurface {
    /// Recorded calls for verification
    calls: Mutex<Vec<SurfaceCall>>,

    /// Drawables created and not yet removed
    live: Mutex<IndexMap<DrawableHandle, MockDrawable>>,

    /// Counter for generating handles
    next_handle: Mutex<u64>,

    /// Number of upcoming create calls that fail
    pending_failures: Mutex<usize>,

    /// Number of upcoming remove calls that fail
    pending_remove_failures: Mutex<usize>,

    /// Last viewport requested through `fit_bounds`
    viewport: Mutex<Option<Bounds>>,
}

impl MockMapSurface {
    /// Create a new mock surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `count` create calls return an error.
    pub fn fail_next_creates(&self, count: usize) {
        *self.pending_failures.lock() = count;
    }

    /// Make the next `count` remove calls return an error, leaving the
    /// drawable on the surface.
    pub fn fail_next_removes(&self, count: usize) {
        *self.pending_remove_failures.lock() = count;
    }

    /// Get a copy of all recorded calls.
    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().clone()
    }

    /// Clear recorded calls, keeping live drawables.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }

    pub fn count_creates(&self) -> usize {
        self.calls.lock().iter().filter(|c| c.is_create()).count()
    }

    pub fn count_removes(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, SurfaceCall::RemoveDrawable { .. }))
            .count()
    }

    /// Number of drawables currently on the surface.
    pub fn live_count(&self) -> usize {
        self.live.lock().len()
    }

    pub fn is_live(&self, handle: DrawableHandle) -> bool {
        self.live.lock().contains_key(&handle)
    }

    pub fn drawable(&self, handle: DrawableHandle) -> Option<MockDrawable> {
        self.live.lock().get(&handle).cloned()
    }

    pub fn last_call(&self) -> Option<SurfaceCall> {
        self.calls.lock().last().cloned()
    }

    /// Bounds passed to the last `fit_bounds` call.
    pub fn viewport(&self) -> Option<Bounds> {
        *self.viewport.lock()
    }

    fn create(&self, call: SurfaceCall, drawable: MockDrawable) -> Result<DrawableHandle, SurfaceError> {
        self.calls.lock().push(call);

        {
            let mut failures = self.pending_failures.lock();
            if *failures > 0 {
                *failures -= 1;
                return Err(SurfaceError::new("mock surface rejected drawable"));
            }
        }

        let handle = {
            let mut next = self.next_handle.lock();
            *next += 1;
            DrawableHandle::new(*next)
        };
        self.live.lock().insert(handle, drawable);
        Ok(handle)
    }
}

impl MapSurface for MockMapSurface {
    fn create_point(&self, position: LngLat, style: &Style) -> Result<DrawableHandle, SurfaceError> {
        self.create(
            SurfaceCall::CreatePoint {
                position,
                style: style.clone(),
            },
            MockDrawable {
                shape: DrawableShape::Point,
                points: vec![position],
                radius: None,
            },
        )
    }

    fn create_line(&self, path: &[LngLat], style: &Style) -> Result<DrawableHandle, SurfaceError> {
        self.create(
            SurfaceCall::CreateLine {
                path: path.to_vec(),
                style: style.clone(),
            },
            MockDrawable {
                shape: DrawableShape::Polyline,
                points: path.to_vec(),
                radius: None,
            },
        )
    }

    fn create_polygon(&self, ring: &[LngLat], style: &Style) -> Result<DrawableHandle, SurfaceError> {
        self.create(
            SurfaceCall::CreatePolygon {
                ring: ring.to_vec(),
                style: style.clone(),
            },
            MockDrawable {
                shape: DrawableShape::Polygon,
                points: ring.to_vec(),
                radius: None,
            },
        )
    }

    fn create_circle(
        &self,
        center: LngLat,
        radius: f64,
        style: &Style,
    ) -> Result<DrawableHandle, SurfaceError> {
        self.create(
            SurfaceCall::CreateCircle {
                center,
                radius,
                style: style.clone(),
            },
            MockDrawable {
                shape: DrawableShape::Circle,
                points: vec![center],
                radius: Some(radius),
            },
        )
    }

    fn remove_drawable(&self, handle: DrawableHandle) -> Result<(), SurfaceError> {
        self.calls.lock().push(SurfaceCall::RemoveDrawable { handle });

        {
            let mut failures = self.pending_remove_failures.lock();
            if *failures > 0 {
                *failures -= 1;
                return Err(SurfaceError::new("mock surface refused removal"));
            }
        }

        match self.live.lock().shift_remove(&handle) {
            Some(_) => Ok(()),
            None => Err(SurfaceError::new(format!("unknown drawable {}", handle.raw()))),
        }
    }

    fn drawable_bounds(&self, handle: DrawableHandle) -> Option<Bounds> {
        self.live
            .lock()
            .get(&handle)
            .and_then(|drawable| Bounds::from_points(&drawable.points))
    }

    fn drawable_position(&self, handle: DrawableHandle) -> Option<LngLat> {
        self.live
            .lock()
            .get(&handle)
            .filter(|d| matches!(d.shape, DrawableShape::Point | DrawableShape::Circle))
            .and_then(|d| d.points.first().copied())
    }

    fn fit_bounds(&self, bounds: Bounds) {
        self.calls.lock().push(SurfaceCall::FitBounds { bounds });
        *self.viewport.lock() = Some(bounds);
    }
}
