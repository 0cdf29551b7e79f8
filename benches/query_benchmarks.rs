use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use runtrack::config::{PowerSettings, SmoothingSettings};
use runtrack::query::{point_at_distance, point_at_time};
use runtrack::{power, smoothing, Track, TrackPoint};

// `point_at_time` runs once per animation frame, so it is measured against
// track sizes typical of long 1 Hz recordings.

fn create_track(points: usize) -> Track {
    let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    let raw = (0..points)
        .map(|i| {
            let i_f = i as f64;
            TrackPoint::new(
                46.0 + i_f * 0.00003,
                7.0 + (i_f / 50.0).sin() * 0.0005,
                500.0 + (i_f / 120.0).sin() * 40.0,
                start + Duration::seconds(i as i64),
            )
            .with_hr(140.0 + (i_f / 300.0).sin() * 15.0)
        })
        .collect();
    Track::new("benchmark", raw)
}

fn bench_point_queries(c: &mut Criterion) {
    let mut group = c.benchmark_group("Point Queries");

    for &size in &[1_000, 10_000, 50_000] {
        let track = create_track(size);
        let duration = track.duration_ms();
        let distance = track.distance_km();

        // One lookup per simulated frame across the whole track
        group.throughput(Throughput::Elements(100));
        group.bench_with_input(BenchmarkId::new("point_at_time", size), &track, |b, track| {
            b.iter(|| {
                for frame in 0..100 {
                    let _ = point_at_time(track, black_box(duration * frame / 100));
                }
            });
        });
        group.bench_with_input(BenchmarkId::new("point_at_distance", size), &track, |b, track| {
            b.iter(|| {
                for frame in 0..100 {
                    let _ = point_at_distance(track, black_box(distance * frame as f64 / 100.0));
                }
            });
        });
    }

    group.finish();
}

fn bench_derived_signals(c: &mut Criterion) {
    let mut group = c.benchmark_group("Derived Signals");
    let track = create_track(10_000);

    group.throughput(Throughput::Elements(track.len() as u64));
    group.bench_function("smooth_30s", |b| {
        b.iter(|| smoothing::smooth(black_box(track.points()), 30.0, &SmoothingSettings::default()));
    });
    group.bench_function("estimate_power", |b| {
        b.iter(|| power::estimate_power(black_box(track.points()), 70.0, &PowerSettings::default()));
    });
    group.bench_function("recompute", |b| {
        b.iter(|| runtrack::metrics::recompute(black_box(track.points().to_vec())));
    });

    group.finish();
}

criterion_group!(benches, bench_point_queries, bench_derived_signals);
criterion_main!(benches);
