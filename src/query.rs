//! Random-access query layer
//!
//! Interpolated lookups by distance (driven by hover and drag) and by elapsed
//! time (driven by the playback loop, every frame). Both rely on the track's
//! monotonic cumulative distance and timestamps and use binary search.

use chrono::{DateTime, Duration, Utc};

use crate::config::QuerySettings;
use crate::models::{TimedPoint, Track, TrackPoint};

/// Distance deltas below this are treated as no movement (km)
const MIN_DISTANCE_DELTA_KM: f64 = 1e-6;

/// Interpolate an optional sensor field.
///
/// Both present interpolates, one present passes it through, neither stays absent.
pub(crate) fn lerp_optional(a: Option<f64>, b: Option<f64>, frac: f64) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(lerp(a, b, frac)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

fn lerp(a: f64, b: f64, frac: f64) -> f64 {
    a + (b - a) * frac
}

fn lerp_time(a: DateTime<Utc>, b: DateTime<Utc>, frac: f64) -> DateTime<Utc> {
    let span_ms = (b - a).num_milliseconds() as f64;
    a + Duration::milliseconds((span_ms * frac).round() as i64)
}

/// Every field of the point `frac` of the way from `p1` to `p2`
fn interpolate(p1: &TrackPoint, p2: &TrackPoint, frac: f64) -> TrackPoint {
    TrackPoint {
        lat: lerp(p1.lat, p2.lat, frac),
        lon: lerp(p1.lon, p2.lon, frac),
        ele: lerp(p1.ele, p2.ele, frac),
        time: lerp_time(p1.time, p2.time, frac),
        cumulative_distance: lerp(p1.cumulative_distance, p2.cumulative_distance, frac),
        hr: lerp_optional(p1.hr, p2.hr, frac),
        cad: lerp_optional(p1.cad, p2.cad, frac),
        power: lerp_optional(p1.power, p2.power, frac),
    }
}

/// Pace in minutes per kilometer, 0 when the distance is negligible
pub fn pace_min_per_km(elapsed_ms: i64, distance_km: f64) -> f64 {
    if distance_km <= MIN_DISTANCE_DELTA_KM || elapsed_ms <= 0 {
        return 0.0;
    }
    (elapsed_ms as f64 / 60_000.0) / distance_km
}

/// Point at `target_km` from the start of the track.
///
/// Returns `None` outside `[0, distance]` or for tracks with fewer than 2 points.
/// The ends are returned exactly; anything in between is interpolated within the
/// bracketing pair.
pub fn point_at_distance(track: &Track, target_km: f64) -> Option<TrackPoint> {
    let points = track.points();
    if points.len() < 2 || !target_km.is_finite() {
        return None;
    }
    if target_km < 0.0 || target_km > track.distance_km() {
        return None;
    }

    let first = &points[0];
    let last = &points[points.len() - 1];
    if target_km <= first.cumulative_distance {
        return Some(first.clone());
    }
    if target_km >= last.cumulative_distance {
        return Some(last.clone());
    }

    // First index whose distance reaches the target; the ends were handled above
    let upper = points.partition_point(|p| p.cumulative_distance < target_km);
    let p1 = &points[upper - 1];
    let p2 = &points[upper];

    let span = p2.cumulative_distance - p1.cumulative_distance;
    if span <= 0.0 {
        return Some(p1.clone());
    }

    let frac = (target_km - p1.cumulative_distance) / span;
    let mut point = interpolate(p1, p2, frac);
    point.cumulative_distance = target_km;
    Some(point)
}

/// Point at `offset_ms` after the track's first fix, with the pace of the
/// bracketing pair.
///
/// This is the per-frame playback path. Offsets at or before the start and at
/// or after the end return the exact end points with pace 0.
pub fn point_at_time(track: &Track, offset_ms: i64) -> Option<TimedPoint> {
    let points = track.points();
    if points.len() < 2 {
        return None;
    }

    let first = &points[0];
    let last = &points[points.len() - 1];
    if offset_ms <= 0 {
        return Some(TimedPoint {
            point: first.clone(),
            pace: 0.0,
        });
    }
    if offset_ms >= track.duration_ms() {
        return Some(TimedPoint {
            point: last.clone(),
            pace: 0.0,
        });
    }

    let target = first.time + Duration::milliseconds(offset_ms);
    let upper = points.partition_point(|p| p.time < target).clamp(1, points.len() - 1);
    let p1 = &points[upper - 1];
    let p2 = &points[upper];

    let span_ms = p2.millis_since(p1);
    let frac = if span_ms > 0 {
        (target - p1.time).num_milliseconds() as f64 / span_ms as f64
    } else {
        0.0
    };

    let mut point = interpolate(p1, p2, frac);
    point.time = target;

    let pace = pace_min_per_km(span_ms, p2.cumulative_distance - p1.cumulative_distance);

    Some(TimedPoint { point, pace })
}

/// Pace over the last `lookback_m` meters ending at `at_km`, in minutes per km.
///
/// Returns 0 near the start of the track, where the window would be unstable,
/// and whenever the window's distance or time is negligible. A window reaching
/// back past the start of the track has no start point and also yields 0.
/// Callers widen the lookback at higher playback speeds.
pub fn smoothed_pace(track: &Track, at_km: f64, lookback_m: f64) -> f64 {
    smoothed_pace_with(track, at_km, lookback_m, &QuerySettings::default())
}

/// `smoothed_pace` with explicit tuning
pub fn smoothed_pace_with(
    track: &Track,
    at_km: f64,
    lookback_m: f64,
    settings: &QuerySettings,
) -> f64 {
    if at_km < settings.smoothed_pace_min_km {
        return 0.0;
    }

    let window_start_km = at_km - lookback_m / 1000.0;
    let (Some(current), Some(earlier)) = (
        point_at_distance(track, at_km),
        point_at_distance(track, window_start_km),
    ) else {
        return 0.0;
    };

    let distance = current.cumulative_distance - earlier.cumulative_distance;
    let elapsed_ms = current.millis_since(&earlier);
    pace_min_per_km(elapsed_ms, distance)
}
