//! Arbitrary-range statistics for selections and suggested segments

use crate::models::{SegmentStats, Track, TrackPoint};
use crate::query::{pace_min_per_km, point_at_distance};

/// Points covering `[start_km, end_km]` (clamped to the track).
///
/// Every recorded point inside the closed range is kept, including stationary
/// samples sitting exactly on a boundary. A boundary is interpolated only when
/// no recorded point lies on it.
pub(crate) fn points_in_range(track: &Track, start_km: f64, end_km: f64) -> Vec<TrackPoint> {
    let start_km = start_km.max(0.0);
    let end_km = end_km.min(track.distance_km());
    if !(start_km < end_km) {
        return Vec::new();
    }

    let points = track.points();
    let lo = points.partition_point(|p| p.cumulative_distance < start_km);
    let hi = points.partition_point(|p| p.cumulative_distance <= end_km);
    let inside = &points[lo..hi];

    let mut selected = Vec::with_capacity(inside.len() + 2);

    if inside.first().map_or(true, |p| p.cumulative_distance > start_km) {
        match point_at_distance(track, start_km) {
            Some(p) => selected.push(p),
            None => return Vec::new(),
        }
    }

    selected.extend_from_slice(inside);

    if inside.last().map_or(true, |p| p.cumulative_distance < end_km) {
        match point_at_distance(track, end_km) {
            Some(p) => selected.push(p),
            None => return Vec::new(),
        }
    }

    selected
}

/// Average, minimum and maximum of the values present
fn summarize(values: impl Iterator<Item = Option<f64>>) -> Option<(f64, f64, f64)> {
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for v in values.flatten() {
        count += 1;
        sum += v;
        min = min.min(v);
        max = max.max(v);
    }

    (count > 0).then(|| (sum / count as f64, min, max))
}

/// Statistics for the part of `track` between `start_km` and `end_km`.
///
/// Returns `None` when the range selects fewer than 2 points. Elevation gain and
/// loss are plain sums of consecutive deltas; use `elevation::elevation_stats`
/// for the noise-filtered totals. Sensor averages only cover points carrying the
/// field and are absent when none does.
pub fn segment_stats(track: &Track, start_km: f64, end_km: f64) -> Option<SegmentStats> {
    let points = points_in_range(track, start_km, end_km);
    if points.len() < 2 {
        return None;
    }

    let first = &points[0];
    let last = &points[points.len() - 1];
    let distance_km = last.cumulative_distance - first.cumulative_distance;
    let duration_ms = last.millis_since(first);

    let mut min_pace: Option<f64> = None;
    let mut max_pace: Option<f64> = None;
    let mut elevation_gain = 0.0;
    let mut elevation_loss = 0.0;

    for pair in points.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);

        let pace = pace_min_per_km(b.millis_since(a), b.cumulative_distance - a.cumulative_distance);
        if pace > 0.0 {
            min_pace = Some(min_pace.map_or(pace, |m| m.min(pace)));
            max_pace = Some(max_pace.map_or(pace, |m| m.max(pace)));
        }

        let delta = b.ele - a.ele;
        if delta > 0.0 {
            elevation_gain += delta;
        } else {
            elevation_loss -= delta;
        }
    }

    let min_elevation = points.iter().map(|p| p.ele).fold(f64::INFINITY, f64::min);
    let max_elevation = points.iter().map(|p| p.ele).fold(f64::NEG_INFINITY, f64::max);

    let hr = summarize(points.iter().map(|p| p.hr));
    let power = summarize(points.iter().map(|p| p.power));
    let cadence = summarize(points.iter().map(|p| p.cad));

    Some(SegmentStats {
        distance_km,
        duration_ms,
        avg_pace: pace_min_per_km(duration_ms, distance_km),
        min_pace,
        max_pace,
        elevation_gain,
        elevation_loss,
        min_elevation,
        max_elevation,
        avg_hr: hr.map(|(avg, _, _)| avg),
        min_hr: hr.map(|(_, min, _)| min),
        max_hr: hr.map(|(_, _, max)| max),
        avg_power: power.map(|(avg, _, _)| avg),
        avg_cadence: cadence.map(|(avg, _, _)| avg),
    })
}
