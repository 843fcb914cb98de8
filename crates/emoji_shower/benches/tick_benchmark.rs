//! Benchmark for the per-frame particle update.
//!
//! TARGET: a full default session (120 particles) ticks well under 1 ms.
//!
//! Run with: cargo bench --package emoji_shower --bench tick_benchmark

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use emoji_shower::ui::{OverlayRenderer, Rect};
use emoji_shower::{ConfigOverride, ManualHost, ShowerController};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn running_shower(per_burst: u32) -> ShowerController<ManualHost, ChaCha8Rng> {
    let mut shower = ShowerController::with_rng(
        ManualHost::new(Rect::viewport(1920.0, 1080.0)),
        ChaCha8Rng::seed_from_u64(0xC0FFEE),
    );
    let mut config = ConfigOverride::with_emojis(["🎉", "✨", "https://example.com/star.png"]);
    config.particle_count = Some(per_burst);
    config.enable_spin = Some(true);
    config.duration = Some(u64::MAX / 2);
    shower.trigger(Some(&config));
    // Every burst fired (8 × 200 ms)
    shower.run_until(1400);
    shower
}

fn benchmark_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_tick");

    for per_burst in [15u32, 125, 1250] {
        let mut shower = running_shower(per_burst);
        let live = shower.live_particle_count() as u64;
        group.throughput(Throughput::Elements(live));
        group.bench_with_input(BenchmarkId::from_parameter(live), &live, |b, _| {
            b.iter(|| black_box(shower.advance(16)));
        });
    }

    group.finish();
}

fn benchmark_render(c: &mut Criterion) {
    let shower = running_shower(15);
    let mut renderer = OverlayRenderer::new();

    c.bench_function("render_default_session", |b| {
        b.iter(|| {
            let batches = shower.render(&mut renderer);
            black_box(batches.map(|batches| batches.len()));
        });
    });
}

criterion_group!(benches, benchmark_tick, benchmark_render);
criterion_main!(benches);
