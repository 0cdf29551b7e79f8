//! Metrics recomputation
//!
//! Rebuilds cumulative distance and total duration for a point sequence. This is
//! the only place that stamps `cumulative_distance` on points owned by a track;
//! every editing operation routes its output through here via `Track::new`.

use crate::geodesy;
use crate::models::TrackPoint;

/// Points with freshly stamped distances plus the derived summary
#[derive(Debug, Clone, PartialEq)]
pub struct Recomputed {
    pub points: Vec<TrackPoint>,
    pub distance_km: f64,
    pub duration_ms: i64,
}

/// Recompute cumulative distance and duration for `points`.
///
/// Input distances are ignored. Fewer than 2 points are returned unchanged with
/// zero distance and duration.
pub fn recompute(mut points: Vec<TrackPoint>) -> Recomputed {
    if points.len() < 2 {
        return Recomputed {
            points,
            distance_km: 0.0,
            duration_ms: 0,
        };
    }

    let mut total = 0.0;
    points[0].cumulative_distance = 0.0;
    for i in 1..points.len() {
        total += geodesy::distance_km(&points[i - 1], &points[i]);
        points[i].cumulative_distance = total;
    }

    let duration_ms = points[points.len() - 1].millis_since(&points[0]);

    Recomputed {
        points,
        distance_km: total,
        duration_ms,
    }
}
