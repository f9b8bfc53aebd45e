//! Basic geometry management example.
//!
//! This example shows:
//! - Implementing a map surface that prints instead of drawing
//! - Loading GeoJSON text with mixed geometry kinds
//! - Listening for lifecycle events
//! - Reading render metrics and fitting the viewport

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use terrane::prelude::*;

/// A surface that prints every call.
#[derive(Default)]
struct PrintSurface {
    next: AtomicU64,
}

impl PrintSurface {
    fn handle(&self, what: &str, style: &Style) -> Result<DrawableHandle, SurfaceError> {
        let handle = DrawableHandle::new(self.next.fetch_add(1, Ordering::Relaxed) + 1);
        println!(
            "  [surface] create {} #{} (color {:?})",
            what,
            handle.raw(),
            style.color
        );
        Ok(handle)
    }
}

impl MapSurface for PrintSurface {
    fn create_point(&self, _position: LngLat, style: &Style) -> Result<DrawableHandle, SurfaceError> {
        self.handle("point", style)
    }

    fn create_line(&self, path: &[LngLat], style: &Style) -> Result<DrawableHandle, SurfaceError> {
        self.handle(&format!("line of {} vertices", path.len()), style)
    }

    fn create_polygon(&self, ring: &[LngLat], style: &Style) -> Result<DrawableHandle, SurfaceError> {
        self.handle(&format!("polygon of {} vertices", ring.len()), style)
    }

    fn create_circle(
        &self,
        _center: LngLat,
        radius: f64,
        style: &Style,
    ) -> Result<DrawableHandle, SurfaceError> {
        self.handle(&format!("circle of {} m", radius), style)
    }

    fn remove_drawable(&self, handle: DrawableHandle) -> Result<(), SurfaceError> {
        println!("  [surface] remove #{}", handle.raw());
        Ok(())
    }

    fn drawable_bounds(&self, _handle: DrawableHandle) -> Option<Bounds> {
        None
    }

    fn drawable_position(&self, _handle: DrawableHandle) -> Option<LngLat> {
        None
    }

    fn fit_bounds(&self, bounds: Bounds) {
        println!(
            "  [surface] fit {:?} .. {:?}",
            bounds.south_west(),
            bounds.north_east()
        );
    }
}

const ZONES: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    { "type": "Feature",
      "geometry": { "type": "Point", "coordinates": [-63.9039, -8.7619] },
      "properties": { "name": "Porto Velho" } },
    { "type": "Feature",
      "geometry": { "type": "Circle", "coordinates": [-63.89, -8.75], "properties": { "radius": 500 } },
      "properties": { "name": "Buffer" } },
    { "type": "Feature",
      "geometry": { "type": "Drawing",
                    "coordinates": [[-63.91, -8.77], [-63.89, -8.77], [-63.89, -8.75], [-63.91, -8.77]] },
      "properties": { "name": "Sketch" } },
    { "type": "Feature",
      "geometry": { "type": "LineString", "coordinates": [[-63.9, -8.76]] },
      "properties": { "name": "Too short" } }
  ]
}"#;

fn main() {
    terrane::logging::init();

    let mut manager = GeometryManager::new(Arc::new(PrintSurface::default()));
    manager.events_mut().on("geometryAdded", |event| {
        println!("event {} at {}: {}", event.name, event.iso_timestamp(), event.payload);
    });

    println!("\n=== Loading ===\n");
    let ids = manager.load_geojson_str(ZONES);
    println!("\nadded {} of 4 features", ids.len());

    println!("\n=== Metrics ===\n");
    for id in &ids {
        let (Some(record), Some(metadata)) = (manager.get(id), manager.metadata(id)) else {
            continue;
        };
        println!(
            "{:<12} {:<10} closed={:<5} length={:>9.1} m  area={:>12.1} m²",
            record.property("name").and_then(|v| v.as_str()).unwrap_or("-"),
            record.kind.as_str(),
            metadata.is_closed,
            metadata.length,
            metadata.area
        );
    }

    println!("\n=== Viewport ===\n");
    manager.fit_to_bounds();

    println!("\n=== Clear ===\n");
    manager.clear();

    let stats = manager.events().event_stats();
    println!("\n{} events dispatched", stats.total_dispatched);
}
