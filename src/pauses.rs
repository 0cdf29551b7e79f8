//! Pause detection
//!
//! A pause is a run of consecutive slow legs (below `max_speed_kmh`) that lasts
//! at least `min_duration_secs` and is closed by the athlete moving again. A
//! slow stretch still open when the track ends is not reported; that policy is
//! kept as is until product decides otherwise.

use crate::config::PauseSettings;
use crate::geodesy;
use crate::models::{PauseSegment, Track};

/// Legs shorter than this count as infinitely fast rather than stopped (ms)
const MIN_LEG_MS: i64 = 1;

/// Find pauses in a single forward pass over the track's legs
pub fn find_pauses<'a>(track: &'a Track, settings: &PauseSettings) -> Vec<PauseSegment<'a>> {
    let points = track.points();
    let min_duration_ms = (settings.min_duration_secs * 1000.0).round() as i64;

    let mut pauses = Vec::new();
    let mut candidate_start: Option<usize> = None;

    for i in 1..points.len() {
        let (prev, curr) = (&points[i - 1], &points[i]);
        let elapsed_ms = curr.millis_since(prev);

        let speed_kmh = if elapsed_ms < MIN_LEG_MS {
            f64::INFINITY
        } else {
            geodesy::distance_km(prev, curr) / (elapsed_ms as f64 / 3_600_000.0)
        };

        if speed_kmh < settings.max_speed_kmh {
            candidate_start.get_or_insert(i - 1);
            continue;
        }

        if let Some(start_index) = candidate_start.take() {
            let end_index = i - 1;
            let duration_ms = points[end_index].millis_since(&points[start_index]);
            if duration_ms >= min_duration_ms {
                pauses.push(PauseSegment {
                    start: &points[start_index],
                    end: &points[end_index],
                    start_index,
                    end_index,
                    duration_ms,
                });
            }
        }
    }

    if let Some(start_index) = candidate_start {
        tracing::debug!(start_index, "dropping pause still open at track end");
    }

    pauses
}

/// Track duration minus detected pauses, in milliseconds
pub fn moving_duration_ms(track: &Track, settings: &PauseSettings) -> i64 {
    let paused: i64 = find_pauses(track, settings).iter().map(|p| p.duration_ms).sum();
    (track.duration_ms() - paused).max(0)
}
