use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{Result, TrackError};
use crate::models::Track;

/// Read a track from a JSON file.
///
/// Derived fields are recomputed on load. A track whose points break the
/// ordering invariants is still returned, with a warning logged.
pub fn read_track<P: AsRef<Path>>(path: P) -> Result<Track> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(TrackError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let reader = BufReader::new(fs::File::open(path)?);
    let track: Track = serde_json::from_reader(reader)?;

    if let Err(e) = track.validate() {
        tracing::warn!(path = %path.display(), error = %e, "Loaded track violates invariants");
    }
    tracing::debug!(
        path = %path.display(),
        points = track.len(),
        distance_km = track.distance_km(),
        "Track loaded"
    );

    Ok(track)
}

/// Write a track as pretty-printed JSON
pub fn write_track<P: AsRef<Path>>(track: &Track, path: P) -> Result<()> {
    let mut writer = BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, track)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrackPoint;
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::tempdir;

    fn sample() -> Track {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let points = (0..5)
            .map(|i| {
                TrackPoint::new(47.0 + i as f64 * 0.001, 8.0, 400.0, start + Duration::seconds(30 * i))
                    .with_hr(140.0 + i as f64)
            })
            .collect();
        Track::new("lunch run", points).with_color("#ff0000")
    }

    #[test]
    fn test_write_then_read_keeps_identity() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("track.json");
        let track = sample();

        write_track(&track, &path).unwrap();
        let loaded = read_track(&path).unwrap();

        assert_eq!(loaded.id(), track.id());
        assert_eq!(loaded.name(), "lunch run");
        assert_eq!(loaded.color(), "#ff0000");
        assert_eq!(loaded.points()[3].hr, Some(143.0));
        assert!((loaded.distance_km() - track.distance_km()).abs() < 1e-12);
    }

    #[test]
    fn test_untrusted_distances_are_recomputed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tampered.json");
        let json = r#"{
            "name": "tampered",
            "distance_km": 999.0,
            "points": [
                {"lat": 0.0, "lon": 0.0, "ele": 0.0, "time": "2024-05-01T08:00:00Z", "cumulative_distance": 50.0},
                {"lat": 0.0, "lon": 0.01, "ele": 0.0, "time": "2024-05-01T08:05:00Z", "cumulative_distance": 80.0}
            ]
        }"#;
        fs::write(&path, json).unwrap();

        let track = read_track(&path).unwrap();

        assert_eq!(track.points()[0].cumulative_distance(), 0.0);
        assert!((track.distance_km() - 1.112).abs() < 0.01);
        assert_eq!(track.duration_ms(), 300_000);
        assert_eq!(track.color(), crate::models::DEFAULT_TRACK_COLOR);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_track(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, TrackError::FileNotFound { .. }));
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(read_track(&path).unwrap_err(), TrackError::Json(_)));
    }
}
