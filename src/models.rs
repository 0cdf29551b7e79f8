use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, TrackError};
use crate::metrics;

/// Color given to tracks that do not carry one of their own
pub const DEFAULT_TRACK_COLOR: &str = "#3b82f6";

/// A single GPS fix with its derived fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Latitude in decimal degrees
    pub lat: f64,

    /// Longitude in decimal degrees
    pub lon: f64,

    /// Elevation in meters
    pub ele: f64,

    /// Absolute timestamp of the fix
    pub time: DateTime<Utc>,

    /// Kilometers from the first point of the owning track.
    /// Only `metrics::recompute` stamps this for points inside a track.
    #[serde(default)]
    pub(crate) cumulative_distance: f64,

    /// Heart rate in beats per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hr: Option<f64>,

    /// Cadence in steps per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cad: Option<f64>,

    /// Estimated running power in watts (derived, never measured)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<f64>,
}

impl TrackPoint {
    pub fn new(lat: f64, lon: f64, ele: f64, time: DateTime<Utc>) -> Self {
        Self {
            lat,
            lon,
            ele,
            time,
            cumulative_distance: 0.0,
            hr: None,
            cad: None,
            power: None,
        }
    }

    pub fn with_hr(mut self, hr: f64) -> Self {
        self.hr = Some(hr);
        self
    }

    pub fn with_cadence(mut self, cad: f64) -> Self {
        self.cad = Some(cad);
        self
    }

    pub fn with_power(mut self, power: f64) -> Self {
        self.power = Some(power);
        self
    }

    /// Kilometers from the first point of the track this point came from
    pub fn cumulative_distance(&self) -> f64 {
        self.cumulative_distance
    }

    /// Milliseconds elapsed from `earlier` to this point
    pub fn millis_since(&self, earlier: &TrackPoint) -> i64 {
        (self.time - earlier.time).num_milliseconds()
    }
}

/// An ordered, internally consistent sequence of track points.
///
/// `distance_km` and `duration_ms` always equal the values derivable from the
/// points. A track is never changed in place: editing operations return a new
/// track, and every track built from new points receives a fresh `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "TrackRecord")]
pub struct Track {
    id: Uuid,
    name: String,
    color: String,
    points: Vec<TrackPoint>,
    distance_km: f64,
    duration_ms: i64,
}

/// Serialized shape of a track; summary fields on input are ignored
#[derive(Deserialize)]
struct TrackRecord {
    #[serde(default)]
    id: Option<Uuid>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    points: Vec<TrackPoint>,
}

impl From<TrackRecord> for Track {
    fn from(record: TrackRecord) -> Self {
        let mut track = Track::new(record.name, record.points);
        if let Some(id) = record.id {
            track.id = id;
        }
        if let Some(color) = record.color {
            track.color = color;
        }
        track
    }
}

impl Track {
    /// Build a track from raw points, recomputing every derived field
    pub fn new(name: impl Into<String>, points: Vec<TrackPoint>) -> Self {
        let recomputed = metrics::recompute(points);
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: DEFAULT_TRACK_COLOR.to_string(),
            points: recomputed.points,
            distance_km: recomputed.distance_km,
            duration_ms: recomputed.duration_ms,
        }
    }

    /// A track with no points
    pub fn empty(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    /// Same points and identity under a different display color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    /// Total distance in kilometers
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Elapsed time from first to last point in milliseconds
    pub fn duration_ms(&self) -> i64 {
        self.duration_ms
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&TrackPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TrackPoint> {
        self.points.last()
    }

    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        self.points.first().map(|p| p.time)
    }

    /// Consume the track, returning its points
    pub fn into_points(self) -> Vec<TrackPoint> {
        self.points
    }

    /// Check the structural invariants every exposed track must satisfy
    pub fn validate(&self) -> Result<()> {
        const EPSILON_KM: f64 = 1e-9;

        if self.points.len() < 2 {
            if self.distance_km != 0.0 || self.duration_ms != 0 {
                return Err(TrackError::InvariantViolation {
                    index: 0,
                    reason: "tracks with fewer than 2 points must have zero distance and duration"
                        .to_string(),
                });
            }
            return Ok(());
        }

        if self.points[0].cumulative_distance != 0.0 {
            return Err(TrackError::InvariantViolation {
                index: 0,
                reason: "first point must start at distance 0".to_string(),
            });
        }

        for (i, pair) in self.points.windows(2).enumerate() {
            let (prev, curr) = (&pair[0], &pair[1]);
            if curr.time < prev.time {
                return Err(TrackError::InvariantViolation {
                    index: i + 1,
                    reason: format!("time goes backwards ({} < {})", curr.time, prev.time),
                });
            }
            if curr.cumulative_distance + EPSILON_KM < prev.cumulative_distance {
                return Err(TrackError::InvariantViolation {
                    index: i + 1,
                    reason: "cumulative distance decreases".to_string(),
                });
            }
        }

        let (first, last) = (&self.points[0], &self.points[self.points.len() - 1]);
        if (self.distance_km - last.cumulative_distance).abs() > EPSILON_KM {
            return Err(TrackError::InvariantViolation {
                index: self.points.len() - 1,
                reason: "distance does not match the last point".to_string(),
            });
        }
        if self.duration_ms != last.millis_since(first) {
            return Err(TrackError::InvariantViolation {
                index: self.points.len() - 1,
                reason: "duration does not match the point timestamps".to_string(),
            });
        }

        Ok(())
    }
}

/// A time point looked up by elapsed time, with the pace of its bracketing pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimedPoint {
    pub point: TrackPoint,
    /// Minutes per kilometer, 0 when undefined
    pub pace: f64,
}

/// A low-speed interval, borrowed from the track it was detected in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PauseSegment<'a> {
    pub start: &'a TrackPoint,
    pub end: &'a TrackPoint,
    pub start_index: usize,
    pub end_index: usize,
    pub duration_ms: i64,
}

/// Statistics for an arbitrary distance range of a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentStats {
    /// Distance covered in kilometers
    pub distance_km: f64,

    /// Elapsed time in milliseconds
    pub duration_ms: i64,

    /// Average pace in minutes per kilometer
    pub avg_pace: f64,

    /// Fastest pace between consecutive points
    pub min_pace: Option<f64>,

    /// Slowest pace between consecutive points
    pub max_pace: Option<f64>,

    /// Sum of positive elevation deltas in meters
    pub elevation_gain: f64,

    /// Sum of negative elevation deltas in meters (positive number)
    pub elevation_loss: f64,

    pub min_elevation: f64,
    pub max_elevation: f64,

    pub avg_hr: Option<f64>,
    pub min_hr: Option<f64>,
    pub max_hr: Option<f64>,

    pub avg_power: Option<f64>,

    pub avg_cadence: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn point(lat: f64, secs: i64) -> TrackPoint {
        let time = Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap();
        TrackPoint::new(lat, 8.0, 400.0, time)
    }

    #[test]
    fn test_new_track_recomputes_summary() {
        let track = Track::new("run", vec![point(47.0, 0), point(47.001, 10), point(47.002, 20)]);

        assert_eq!(track.len(), 3);
        assert_eq!(track.duration_ms(), 20_000);
        assert!((track.distance_km() - track.last().unwrap().cumulative_distance()).abs() < 1e-12);
        assert_eq!(track.color(), DEFAULT_TRACK_COLOR);
        assert!(track.validate().is_ok());
    }

    #[test]
    fn test_each_new_track_has_its_own_identity() {
        let a = Track::new("a", vec![point(47.0, 0), point(47.001, 10)]);
        let b = Track::new("a", a.points().to_vec());
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_deserialization_ignores_untrusted_distances() {
        let json = r#"{
            "name": "import",
            "distance_km": 999.0,
            "points": [
                {"lat": 47.0, "lon": 8.0, "ele": 400.0, "time": "2024-05-01T07:00:00Z", "cumulative_distance": 5.0},
                {"lat": 47.001, "lon": 8.0, "ele": 401.0, "time": "2024-05-01T07:00:10Z", "hr": 140.0}
            ]
        }"#;

        let track: Track = serde_json::from_str(json).unwrap();

        assert_eq!(track.first().unwrap().cumulative_distance(), 0.0);
        assert!(track.distance_km() < 0.2);
        assert_eq!(track.duration_ms(), 10_000);
        assert_eq!(track.points()[1].hr, Some(140.0));
    }

    #[test]
    fn test_validate_detects_backwards_time() {
        let track = Track::new("bad", vec![point(47.0, 10), point(47.001, 0)]);
        match track.validate() {
            Err(TrackError::InvariantViolation { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected invariant violation, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_track() {
        let track = Track::empty("nothing");
        assert!(track.is_empty());
        assert_eq!(track.distance_km(), 0.0);
        assert_eq!(track.duration_ms(), 0);
        assert!(track.start_time().is_none());
        assert!(track.validate().is_ok());
    }
}
