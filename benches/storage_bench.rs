//! Benchmarks for Embercask storage operations

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;
use tempfile::TempDir;

use embercask::engine::Engine;
use embercask::segment::SegmentReader;

fn bench_engine_set(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let engine = Engine::open_path(temp.path()).unwrap();

    let mut i = 0u64;
    c.bench_function("engine_set", |b| {
        b.iter(|| {
            let key = format!("key{}", i % 1000);
            engine.set(black_box(&key), black_box(json!(i))).unwrap();
            i += 1;
        })
    });
}

fn bench_engine_get(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let engine = Engine::open_path(temp.path()).unwrap();
    for i in 0..1000u64 {
        engine
            .set(&format!("key{}", i), json!({"seq": i, "payload": "x".repeat(64)}))
            .unwrap();
    }

    let mut i = 0u64;
    c.bench_function("engine_get", |b| {
        b.iter(|| {
            let key = format!("key{}", i % 1000);
            black_box(engine.get(black_box(&key)).unwrap());
            i += 1;
        })
    });
}

fn bench_segment_scan(c: &mut Criterion) {
    let temp = TempDir::new().unwrap();
    let engine = Engine::open_path(temp.path()).unwrap();
    for i in 0..1000u64 {
        engine
            .set(&format!("key{}", i), json!("x".repeat(128)))
            .unwrap();
    }
    let path = engine.segment_path().to_path_buf();

    let reader = SegmentReader::new(16384);
    c.bench_function("segment_scan_1000", |b| {
        b.iter(|| {
            black_box(reader.scan(black_box(&path)).unwrap());
        })
    });
}

criterion_group!(benches, bench_engine_set, bench_engine_get, bench_segment_scan);
criterion_main!(benches);
