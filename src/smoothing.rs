//! Time-window smoothing of elevation, heart rate and speed

use serde::Serialize;

use crate::config::SmoothingSettings;
use crate::models::TrackPoint;
use crate::query::pace_min_per_km;

/// Speed and pace around a point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PointMetrics {
    /// Kilometers per hour
    pub speed_kmh: f64,
    /// Minutes per kilometer, 0 when no distance was covered
    pub pace_min_per_km: f64,
}

impl PointMetrics {
    const ZERO: PointMetrics = PointMetrics {
        speed_kmh: 0.0,
        pace_min_per_km: 0.0,
    };

    fn between(from: &TrackPoint, to: &TrackPoint) -> Self {
        let elapsed_ms = to.millis_since(from);
        let distance_km = to.cumulative_distance - from.cumulative_distance;
        if elapsed_ms <= 0 {
            return Self::ZERO;
        }
        Self {
            speed_kmh: (distance_km / (elapsed_ms as f64 / 3_600_000.0)).max(0.0),
            pace_min_per_km: pace_min_per_km(elapsed_ms, distance_km),
        }
    }
}

/// Average elevation and heart rate over a `window_seconds` time window.
///
/// Each point is averaged with every point within half the window either side
/// of its timestamp, searching at most `settings.search_radius` indices away.
/// Heart rate uses its own count of samples that carry it and is only rewritten
/// on points that have one. A point whose window holds fewer than 2 samples is
/// left as is. Windows of 1 second or less change nothing.
pub fn smooth(
    points: &[TrackPoint],
    window_seconds: f64,
    settings: &SmoothingSettings,
) -> Vec<TrackPoint> {
    if window_seconds <= 1.0 || points.len() < 2 {
        return points.to_vec();
    }

    let half_window_ms = (window_seconds * 1000.0 / 2.0).round() as i64;
    let radius = settings.search_radius;

    points
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let lo = i.saturating_sub(radius);
            let hi = (i + radius).min(points.len() - 1);

            let mut ele_sum = 0.0;
            let mut ele_count = 0usize;
            let mut hr_sum = 0.0;
            let mut hr_count = 0usize;

            for other in &points[lo..=hi] {
                if other.millis_since(point).abs() > half_window_ms {
                    continue;
                }
                ele_sum += other.ele;
                ele_count += 1;
                if let Some(hr) = other.hr {
                    hr_sum += hr;
                    hr_count += 1;
                }
            }

            let mut smoothed = point.clone();
            if ele_count >= 2 {
                smoothed.ele = ele_sum / ele_count as f64;
            }
            if point.hr.is_some() && hr_count >= 2 {
                smoothed.hr = Some(hr_sum / hr_count as f64);
            }
            smoothed
        })
        .collect()
}

/// Speed and pace at `index`, averaged over a `window_seconds` time window.
///
/// The window grows backward and forward from `index` one point at a time while
/// the neighbor stays within half the window. Without a window, at the first
/// point, or when the window holds only `index` itself, the leg into `index`
/// (or out of it, for the first point) is used instead. Returns `None` for an
/// index outside `points` or fewer than 2 points.
pub fn metrics_at(points: &[TrackPoint], index: usize, window_seconds: f64) -> Option<PointMetrics> {
    if points.len() < 2 || index >= points.len() {
        return None;
    }

    let consecutive = || {
        if index == 0 {
            PointMetrics::between(&points[0], &points[1])
        } else {
            PointMetrics::between(&points[index - 1], &points[index])
        }
    };

    if index == 0 || window_seconds <= 0.0 {
        return Some(consecutive());
    }

    let half_window_ms = (window_seconds * 1000.0 / 2.0).round() as i64;
    let center = &points[index];

    let mut lo = index;
    while lo > 0 && center.millis_since(&points[lo - 1]) <= half_window_ms {
        lo -= 1;
    }
    let mut hi = index;
    while hi + 1 < points.len() && points[hi + 1].millis_since(center) <= half_window_ms {
        hi += 1;
    }

    if lo == hi {
        return Some(consecutive());
    }

    Some(PointMetrics::between(&points[lo], &points[hi]))
}
