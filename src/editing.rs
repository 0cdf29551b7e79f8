//! Track editing operations
//!
//! Every operation is a pure transform: it borrows its input and returns a new
//! track built through `Track::new`, so derived fields are always recomputed.
//! Degenerate input (empty track, inverted range) yields a clone of the input,
//! identity included.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::config::RepairSettings;
use crate::geodesy;
use crate::models::{Track, TrackPoint};
use crate::segment::points_in_range;

/// Outcome of a GPS outlier repair pass
#[derive(Debug, Clone, PartialEq)]
pub struct RepairResult {
    pub track: Track,
    pub corrected_count: usize,
}

fn shift_time(mut point: TrackPoint, by: Duration) -> TrackPoint {
    point.time = point.time + by;
    point
}

fn rebuild(source: &Track, points: Vec<TrackPoint>) -> Track {
    Track::new(source.name(), points).with_color(source.color())
}

/// Remove the distance range `[start_km, end_km]` and splice the remainder.
///
/// The result keeps the input's start time and every leg keeps the duration it
/// had in the input. The leg across the splice takes the duration of the leg that
/// originally led into the first point after the gap. Points after the gap
/// therefore move back by a single shift: onto the last point kept before the
/// gap, or onto the original start time for a prefix cut. A suffix cut needs no
/// shift.
pub fn cut(track: &Track, start_km: f64, end_km: f64) -> Track {
    // `!(a < b)` also rejects NaN bounds
    if track.is_empty() || !(start_km < end_km) {
        return track.clone();
    }

    let points = track.points();
    let kept_before = points.partition_point(|p| p.cumulative_distance < start_km);
    let first_after = points.partition_point(|p| p.cumulative_distance <= end_km);

    if kept_before == first_after {
        debug!(start_km, end_km, "cut range contains no points");
        return track.clone();
    }

    let shift = match points.get(first_after) {
        None => Duration::zero(),
        Some(resume) => {
            let landing = match kept_before {
                0 => points[0].time,
                n => points[n - 1].time + (resume.time - points[first_after - 1].time),
            };
            resume.time - landing
        }
    };

    let mut spliced = Vec::with_capacity(points.len() - (first_after - kept_before));
    spliced.extend_from_slice(&points[..kept_before]);
    spliced.extend(points[first_after..].iter().cloned().map(|p| shift_time(p, -shift)));

    debug!(
        removed = first_after - kept_before,
        shift_ms = shift.num_milliseconds(),
        "cut distance range"
    );

    rebuild(track, spliced)
}

/// Keep only `[start_km, end_km]`, re-based to distance 0 and time 0.
///
/// Every recorded point inside the closed range survives. Where no recorded
/// point sits on a boundary one is interpolated, so the result starts and ends
/// exactly at the requested distances (clamped to the track). The first point of
/// the result sits at the Unix epoch, making its timestamps elapsed time. A range
/// that selects fewer than 2 points yields an empty track.
pub fn trim_to_range(track: &Track, start_km: f64, end_km: f64) -> Track {
    if track.len() < 2 || !(start_km < end_km) {
        return track.clone();
    }

    let selected = points_in_range(track, start_km, end_km);
    if selected.len() < 2 {
        return rebuild(track, Vec::new());
    }

    let offset = selected[0].time - DateTime::<Utc>::UNIX_EPOCH;
    let rebased = selected.into_iter().map(|p| shift_time(p, -offset)).collect();

    rebuild(track, rebased)
}

/// Concatenate tracks in start-time order.
///
/// Each track after the first is shifted so it begins exactly one second after
/// the previous track's last point, keeping timestamps strictly increasing across
/// every seam while preserving each track's internal timing. Empty tracks are
/// skipped. The result is named after its parts and uses the default color.
pub fn merge(tracks: &[Track]) -> Track {
    let mut ordered: Vec<&Track> = tracks.iter().filter(|t| !t.is_empty()).collect();
    ordered.sort_by_key(|t| t.start_time());

    let name = ordered.iter().map(|t| t.name()).collect::<Vec<_>>().join(" + ");
    let seam_gap = Duration::seconds(1);

    let mut points: Vec<TrackPoint> = Vec::with_capacity(ordered.iter().map(|t| t.len()).sum());
    for part in ordered {
        let shift = match (points.last(), part.first()) {
            (Some(prev), Some(first)) => prev.time + seam_gap - first.time,
            _ => Duration::zero(),
        };
        debug!(part = part.name(), shift_ms = shift.num_milliseconds(), "merging track");
        points.extend(part.points().iter().cloned().map(|p| shift_time(p, shift)));
    }

    Track::new(name, points)
}

/// Replace interior points whose implied speed from their predecessor exceeds
/// `settings.max_speed_kmh` with the midpoint of their two neighbors.
///
/// Single pass over the original points: a corrected point is never used when
/// judging or correcting the next one. Points are corrected, not removed. When
/// nothing needs correcting the input track is returned as is.
pub fn repair_gps_outliers(track: &Track, settings: &RepairSettings) -> RepairResult {
    let original = track.points();
    if original.len() < 3 {
        return RepairResult {
            track: track.clone(),
            corrected_count: 0,
        };
    }

    let mut repaired = original.to_vec();
    let mut corrected_count = 0;

    for i in 1..original.len() - 1 {
        let (prev, curr, next) = (&original[i - 1], &original[i], &original[i + 1]);

        let elapsed_ms = curr.millis_since(prev);
        if elapsed_ms <= 0 {
            continue;
        }

        let speed_kmh = geodesy::distance_km(prev, curr) / (elapsed_ms as f64 / 3_600_000.0);
        if speed_kmh > settings.max_speed_kmh {
            let fixed = &mut repaired[i];
            fixed.lat = (prev.lat + next.lat) / 2.0;
            fixed.lon = (prev.lon + next.lon) / 2.0;
            fixed.ele = (prev.ele + next.ele) / 2.0;
            corrected_count += 1;
        }
    }

    if corrected_count == 0 {
        return RepairResult {
            track: track.clone(),
            corrected_count,
        };
    }

    debug!(corrected_count, track = track.name(), "repaired GPS outliers");

    RepairResult {
        track: rebuild(track, repaired),
        corrected_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn start() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    /// Due north every 10 s, ~111 m apart (40 km/h)
    fn line(name: &str, n: usize, t0: DateTime<Utc>) -> Track {
        let points = (0..n)
            .map(|i| {
                TrackPoint::new(47.0 + i as f64 * 0.001, 8.0, 500.0, t0 + Duration::seconds(10 * i as i64))
            })
            .collect();
        Track::new(name, points)
    }

    #[test]
    fn test_cut_invalid_range_returns_input() {
        let track = line("run", 10, start());
        assert_eq!(cut(&track, 0.5, 0.5), track);
        assert_eq!(cut(&track, 0.6, 0.2), track);
        assert_eq!(cut(&track, f64::NAN, 0.2), track);

        let empty = Track::empty("none");
        assert_eq!(cut(&empty, 0.0, 1.0), empty);
    }

    #[test]
    fn test_cut_closes_time_gap() {
        let track = line("run", 10, start());
        let p = track.points();
        // Removes points 3..=5
        let cut_start = (p[2].cumulative_distance() + p[3].cumulative_distance()) / 2.0;
        let cut_end = (p[5].cumulative_distance() + p[6].cumulative_distance()) / 2.0;

        let result = cut(&track, cut_start, cut_end);

        assert_eq!(result.len(), 7);
        assert_ne!(result.id(), track.id());
        let r = result.points();
        assert_eq!(r[2].lat, p[2].lat);
        assert_eq!(r[3].lat, p[6].lat);
        assert_eq!(r[3].millis_since(&r[2]), p[6].millis_since(&p[5]));
        assert_eq!(result.duration_ms(), track.duration_ms() - 30_000);
        assert!(result.validate().is_ok());
    }

    #[test]
    fn test_cut_prefix_keeps_start_time() {
        let track = line("run", 10, start());
        let p = track.points();

        let result = cut(&track, 0.0, p[3].cumulative_distance());

        assert_eq!(result.len(), 6);
        assert_eq!(result.first().unwrap().lat, p[4].lat);
        assert_eq!(result.start_time(), track.start_time());
        assert_eq!(result.first().unwrap().cumulative_distance(), 0.0);
    }

    #[test]
    fn test_cut_keeps_start_time_and_leg_durations() {
        let gaps = [10, 20, 5, 40, 15, 25, 30];
        let mut time = start();
        let mut points = vec![TrackPoint::new(47.0, 8.0, 500.0, time)];
        for (i, gap) in gaps.iter().enumerate() {
            time = time + Duration::seconds(*gap);
            points.push(TrackPoint::new(47.0 + (i + 1) as f64 * 0.001, 8.0, 500.0, time));
        }
        let track = Track::new("uneven", points);
        let p = track.points();
        let legs = |t: &Track| -> Vec<i64> {
            t.points().windows(2).map(|w| w[1].millis_since(&w[0]) / 1000).collect()
        };

        // Prefix: point 3 becomes the first point at the old start time
        let prefix = cut(&track, 0.0, p[2].cumulative_distance());
        assert_eq!(prefix.start_time(), track.start_time());
        assert_eq!(prefix.first().unwrap().lat, p[3].lat);
        assert_eq!(legs(&prefix), vec![40, 15, 25, 30]);

        // Interior: points 3 and 4 go, the splice leg keeps the 4 -> 5 duration
        let from = (p[2].cumulative_distance() + p[3].cumulative_distance()) / 2.0;
        let to = (p[4].cumulative_distance() + p[5].cumulative_distance()) / 2.0;
        let interior = cut(&track, from, to);
        assert_eq!(interior.start_time(), track.start_time());
        assert_eq!(legs(&interior), vec![10, 20, 15, 25, 30]);

        // Suffix: nothing moves
        let suffix = cut(&track, p[5].cumulative_distance(), track.distance_km());
        assert_eq!(legs(&suffix), vec![10, 20, 5, 40]);
    }

    #[test]
    fn test_cut_suffix() {
        let track = line("run", 10, start());
        let p = track.points();

        let result = cut(&track, p[7].cumulative_distance(), track.distance_km() + 5.0);

        assert_eq!(result.len(), 7);
        assert_eq!(result.last().unwrap().time, p[6].time);
    }

    #[test]
    fn test_trim_rebases_and_interpolates_bounds() {
        let track = line("run", 10, start());
        let p = track.points();
        let from = (p[1].cumulative_distance() + p[2].cumulative_distance()) / 2.0;
        let to = (p[6].cumulative_distance() + p[7].cumulative_distance()) / 2.0;

        let trimmed = trim_to_range(&track, from, to);

        // interpolated start, points 2..=6, interpolated end
        assert_eq!(trimmed.len(), 7);
        assert_eq!(trimmed.start_time(), Some(DateTime::<Utc>::UNIX_EPOCH));
        assert_eq!(trimmed.first().unwrap().cumulative_distance(), 0.0);
        assert!((trimmed.distance_km() - (to - from)).abs() < 1e-6);
        assert_eq!(trimmed.duration_ms(), 50_000);
    }

    #[test]
    fn test_trim_outside_track_is_empty() {
        let track = line("run", 10, start());
        let trimmed = trim_to_range(&track, track.distance_km() + 1.0, track.distance_km() + 2.0);
        assert!(trimmed.is_empty());
        assert_eq!(trimmed.distance_km(), 0.0);
        assert_eq!(trimmed.duration_ms(), 0);
    }

    #[test]
    fn test_trim_degenerate_range_returns_input() {
        let track = line("run", 10, start());
        assert_eq!(trim_to_range(&track, 0.4, 0.1), track);
    }

    #[test]
    fn test_merge_orders_and_offsets() {
        let late = line("evening", 4, start() + Duration::hours(8));
        let early = line("morning", 3, start());

        let merged = merge(&[late.clone(), early.clone()]);

        assert_eq!(merged.name(), "morning + evening");
        assert_eq!(merged.len(), 7);
        let m = merged.points();
        assert_eq!(m[3].millis_since(&m[2]), 1_000);
        assert_eq!(m[4].millis_since(&m[3]), 10_000);
        assert_eq!(merged.duration_ms(), early.duration_ms() + 1_000 + late.duration_ms());
        assert!(merged.validate().is_ok());
    }

    #[test]
    fn test_merge_overlapping_tracks_moves_later_one_forward() {
        let a = line("a", 5, start());
        let b = line("b", 5, start() + Duration::seconds(5));

        let merged = merge(&[a, b]);

        let m = merged.points();
        assert_eq!(m[5].millis_since(&m[4]), 1_000);
        assert!(m.windows(2).all(|w| w[1].time > w[0].time));
    }

    #[test]
    fn test_merge_nothing() {
        let merged = merge(&[]);
        assert!(merged.is_empty());
        assert_eq!(merged.name(), "");
    }

    #[test]
    fn test_repair_replaces_spike_with_neighbor_midpoint() {
        let track = line("run", 6, start());
        let mut points = track.points().to_vec();
        points[3].lat += 0.05; // ~5.5 km jump in 10 s
        points[3].ele = 900.0;
        let noisy = Track::new("noisy", points.clone());

        let result = repair_gps_outliers(&noisy, &RepairSettings { max_speed_kmh: 45.0 });

        assert!(result.corrected_count >= 1);
        let fixed = &result.track.points()[3];
        assert!((fixed.lat - (points[2].lat + points[4].lat) / 2.0).abs() < 1e-12);
        assert_eq!(fixed.ele, 500.0);
        assert_eq!(result.track.len(), 6);
        assert!(result.track.distance_km() < noisy.distance_km());
    }

    #[test]
    fn test_repair_judges_against_original_predecessor() {
        let track = line("run", 6, start());
        let mut points = track.points().to_vec();
        points[3].lat += 0.05;
        let noisy = Track::new("noisy", points);

        let result = repair_gps_outliers(&noisy, &RepairSettings::default());

        // Point 4 is judged against the original spike at 3, so it is corrected too
        assert_eq!(result.corrected_count, 2);
    }

    #[test]
    fn test_repair_clean_track_is_unchanged() {
        let track = line("run", 6, start());
        let result = repair_gps_outliers(&track, &RepairSettings { max_speed_kmh: 50.0 });
        assert_eq!(result.corrected_count, 0);
        assert_eq!(result.track, track);
    }
}
