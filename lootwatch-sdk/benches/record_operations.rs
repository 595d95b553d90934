use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lootwatch_sdk::HealthState;

/// Benchmark on_event latency (hot path: one call per consumed line)
fn bench_on_event(c: &mut Criterion) {
    let state = HealthState::new();
    state.reset(1, 1);
    let mut ts = 1_700_000_000_000u64;

    c.bench_function("on_event", |b| {
        b.iter(|| {
            ts += 7;
            state.on_event(black_box(ts));
        });
    });
}

/// Benchmark update_io latency
fn bench_update_io(c: &mut Criterion) {
    let state = HealthState::new();
    state.reset(1, 1);

    c.bench_function("update_io", |b| {
        b.iter(|| {
            state.update_io(
                black_box(1_700_000_000_000),
                black_box(4096),
                black_box(2048),
                black_box(512),
                black_box(false),
            );
        });
    });
}

/// Benchmark pushing into the error ring (message packing included)
fn bench_on_parse_error(c: &mut Criterion) {
    let state = HealthState::new();
    state.reset(1, 1);

    c.bench_function("on_parse_error", |b| {
        b.iter(|| {
            state.on_parse_error(black_box("unexpected token near 'Opalo'"));
        });
    });
}

criterion_group!(benches, bench_on_event, bench_update_io, bench_on_parse_error);
criterion_main!(benches);
