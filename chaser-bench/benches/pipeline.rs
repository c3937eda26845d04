// Per-frame cost of the locate / decide / dispatch pipeline

use chaser_bench::{ball_frame, dark_frame, rgb_ball_frame};
use chaser_core::{PixelMatch, PolicyThresholds};
use chaser_drive::{decide, FrameHandler, JsonLinesSink};
use chaser_eye::{locate, Locator};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io;
use std::sync::Arc;

fn benchmark_locate(c: &mut Criterion) {
    let mut group = c.benchmark_group("locate");

    for &(width, height) in &[(160usize, 120usize), (640, 480), (1280, 720)] {
        let frame = ball_frame(width, height, width / 2, height / 2, height / 10);
        group.throughput(Throughput::Bytes(frame.pixels().len() as u64));
        group.bench_with_input(
            BenchmarkId::new("mono_ball", format!("{}x{}", width, height)),
            &frame,
            |b, frame| b.iter(|| locate(black_box(frame), 255)),
        );
    }

    let dark = dark_frame(640, 480);
    group.bench_function("mono_dark_640x480", |b| b.iter(|| locate(black_box(&dark), 255)));

    let rgb = rgb_ball_frame(640, 480, 320, 240, 48);
    group.bench_function("rgb_ball_640x480", |b| b.iter(|| locate(black_box(&rgb), 255)));

    let at_least = Locator::with_matching(PixelMatch::AtLeast);
    let frame = ball_frame(640, 480, 320, 240, 48);
    group.bench_function("at_least_640x480", |b| {
        b.iter(|| at_least.locate(black_box(&frame), 200))
    });

    group.finish();
}

fn benchmark_decide(c: &mut Criterion) {
    let thresholds = PolicyThresholds::default();
    let detection = locate(&ball_frame(640, 480, 100, 240, 48), 255);

    c.bench_function("decide", |b| {
        b.iter(|| decide(black_box(detection), black_box(640), &thresholds))
    });
}

fn benchmark_handler(c: &mut Criterion) {
    let handler = FrameHandler::new(
        Arc::new(JsonLinesSink::new(io::sink())),
        PolicyThresholds::default(),
        Locator::default(),
    );
    let frame = ball_frame(640, 480, 500, 240, 48);

    c.bench_function("handle_640x480", |b| b.iter(|| handler.handle(black_box(&frame))));
}

criterion_group!(benches, benchmark_locate, benchmark_decide, benchmark_handler);
criterion_main!(benches);
