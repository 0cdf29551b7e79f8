//! Elevation gain and loss with hysteresis
//!
//! Summing every positive delta overstates climbing badly on noisy GPS or
//! barometric data. The filter here tracks the current valley and peak and only
//! commits a climb (or descent) once the profile reverses from the tracked
//! extremum by more than the threshold. The final open climb or descent is
//! flushed at the end.

use serde::{Deserialize, Serialize};

use crate::models::TrackPoint;

/// Noise-filtered elevation totals in meters
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElevationStats {
    pub gain: f64,
    pub loss: f64,
}

/// Elevation gain and loss of `points` using a `threshold_m` hysteresis
pub fn elevation_stats(points: &[TrackPoint], threshold_m: f64) -> ElevationStats {
    hysteresis(points.iter().map(|p| p.ele), threshold_m)
}

fn hysteresis(mut elevations: impl Iterator<Item = f64>, threshold_m: f64) -> ElevationStats {
    let mut stats = ElevationStats::default();
    let Some(first) = elevations.next() else {
        return stats;
    };

    let mut valley = first;
    let mut peak = first;
    let mut climbing = true;

    for ele in elevations {
        if climbing {
            if ele > peak {
                peak = ele;
            } else if peak - ele > threshold_m {
                stats.gain += peak - valley;
                valley = ele;
                climbing = false;
            }
        } else if ele < valley {
            valley = ele;
        } else if ele - valley > threshold_m {
            stats.loss += peak - valley;
            peak = ele;
            climbing = true;
        }
    }

    if climbing {
        stats.gain += peak - valley;
    } else {
        stats.loss += peak - valley;
    }

    stats
}
