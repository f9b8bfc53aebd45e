//! Benchmarks for store mutation and cached bounds.

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use terrane_core::LngLat;
use terrane_geometry::{AddOptions, Feature, GeometryKind, GeometryStore, UpdateOptions};

fn features(count: usize) -> Vec<Feature> {
    (0..count)
        .map(|i| {
            let offset = i as f64 * 1e-4;
            match i % 3 {
                0 => Feature::point(-63.9 + offset, -8.76),
                1 => Feature::line_string([
                    LngLat::new(-63.9 + offset, -8.76),
                    LngLat::new(-63.8 + offset, -8.75),
                ]),
                _ => Feature::circle(LngLat::new(-63.9, -8.76 + offset), 250.0),
            }
        })
        .collect()
}

fn populated(count: usize) -> GeometryStore {
    let mut store = GeometryStore::new();
    store.add_batch(features(count), AddOptions::new());
    store
}

fn bench_add_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_add_batch");

    for size in [100, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter_batched(
                || features(size),
                |features| {
                    let mut store = GeometryStore::new();
                    black_box(store.add_batch(features, AddOptions::new()))
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_bounds(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_bounds");

    for size in [1_000, 10_000] {
        let store = populated(size);

        group.bench_with_input(BenchmarkId::new("cached", size), &store, |b, store| {
            store.calculate_bounds();
            b.iter(|| black_box(store.calculate_bounds()));
        });

        group.bench_with_input(BenchmarkId::new("after_update", size), &size, |b, &size| {
            b.iter_batched(
                || {
                    let store = populated(size);
                    let id = store.ids().next().cloned();
                    (store, id)
                },
                |(mut store, id)| {
                    if let Some(id) = id {
                        store.update(&id, Feature::point(0.0, 0.0), UpdateOptions::new());
                    }
                    black_box(store.calculate_bounds())
                },
                BatchSize::LargeInput,
            );
        });
    }

    group.finish();
}

fn bench_reclassify(c: &mut Criterion) {
    let mut store = populated(10_000);
    let ids: Vec<_> = store
        .get_by_type(GeometryKind::Point)
        .into_iter()
        .map(|record| record.id.clone())
        .collect();

    c.bench_function("store_reclassify_point_to_circle", |b| {
        let mut i = 0;
        b.iter(|| {
            let id = &ids[i % ids.len()];
            i += 1;
            let feature = if i % 2 == 0 {
                Feature::point(-63.9, -8.76)
            } else {
                Feature::circle(LngLat::new(-63.9, -8.76), 100.0)
            };
            black_box(store.update(id, feature, UpdateOptions::new()))
        });
    });
}

criterion_group!(benches, bench_add_batch, bench_bounds, bench_reclassify);
criterion_main!(benches);
