use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use criterion::{BatchSize, Criterion, black_box, criterion_group, criterion_main};

use redlilium_runtime::{EventBus, impl_event};

// ---------------------------------------------------------------------------
// Helper event types
// ---------------------------------------------------------------------------

#[derive(Clone, Copy)]
struct Moved {
    x: f32,
    y: f32,
}
impl_event!(Moved);

fn bus_with_handlers(count: usize) -> (EventBus, Arc<AtomicU64>) {
    let bus = EventBus::new();
    let hits = Arc::new(AtomicU64::new(0));
    for _ in 0..count {
        let hits = hits.clone();
        bus.subscribe(move |m: &Moved| {
            black_box(m.x + m.y);
            hits.fetch_add(1, Ordering::Relaxed);
        });
    }
    (bus, hits)
}

// ---------------------------------------------------------------------------
// Synchronous dispatch
// ---------------------------------------------------------------------------

fn bench_send_single_handler(c: &mut Criterion) {
    let (bus, _) = bus_with_handlers(1);
    c.bench_function("send_1_handler", |b| {
        b.iter(|| bus.send(black_box(Moved { x: 1.0, y: 2.0 })))
    });
}

fn bench_send_many_handlers(c: &mut Criterion) {
    let (bus, _) = bus_with_handlers(32);
    c.bench_function("send_32_handlers", |b| {
        b.iter(|| bus.send(black_box(Moved { x: 1.0, y: 2.0 })))
    });
}

// ---------------------------------------------------------------------------
// Deferred delivery
// ---------------------------------------------------------------------------

fn bench_post_and_drain_1k(c: &mut Criterion) {
    c.bench_function("post_drain_1k", |b| {
        b.iter_batched(
            || bus_with_handlers(4).0,
            |bus| {
                for i in 0..1_000 {
                    bus.post(Moved {
                        x: i as f32,
                        y: 0.0,
                    });
                }
                black_box(bus.drain())
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_send_single_handler,
    bench_send_many_handlers,
    bench_post_and_drain_1k,
);
criterion_main!(benches);
