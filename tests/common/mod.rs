#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use runtrack::geodesy::EARTH_RADIUS_KM;
use runtrack::{Track, TrackPoint};

#[derive(Debug, Clone, Copy)]
pub enum Step {
    North,
    East,
    West,
    Stay,
}

pub fn start_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_714_550_400, 0).unwrap()
}

pub fn km_to_deg(km: f64) -> f64 {
    (km / EARTH_RADIUS_KM).to_degrees()
}

/// Walk from the equator and prime meridian, one `step_km` move every `step_secs`
pub fn walk(name: &str, legs: &[(Step, usize)], step_km: f64, step_secs: i64) -> Track {
    walk_from(name, start_time(), legs, step_km, step_secs)
}

pub fn walk_from(
    name: &str,
    t0: DateTime<Utc>,
    legs: &[(Step, usize)],
    step_km: f64,
    step_secs: i64,
) -> Track {
    let step_deg = km_to_deg(step_km);
    let (mut lat, mut lon) = (0.0, 0.0);
    let mut time = t0;
    let mut points = vec![TrackPoint::new(lat, lon, 100.0, time)];

    for &(step, count) in legs {
        for _ in 0..count {
            match step {
                Step::North => lat += step_deg,
                Step::East => lon += step_deg,
                Step::West => lon -= step_deg,
                Step::Stay => {}
            }
            time = time + Duration::seconds(step_secs);
            points.push(TrackPoint::new(lat, lon, 100.0, time));
        }
    }

    Track::new(name, points)
}

/// 10 km with a 1 km out-and-back spur between km 2 and km 4, 100 m every 30 s
pub fn spur_track() -> Track {
    walk(
        "spur",
        &[(Step::North, 20), (Step::East, 10), (Step::West, 10), (Step::North, 60)],
        0.1,
        30,
    )
}

/// 1 Hz at about 10.8 km/h with a stop of `stop_secs` after 60 s; `resume` false
/// ends the track while still stopped
pub fn stop_and_go(stop_secs: usize, resume: bool) -> Track {
    let mut legs = vec![(Step::North, 60), (Step::Stay, stop_secs)];
    if resume {
        legs.push((Step::North, 60));
    }
    walk("stop and go", &legs, 0.003, 1)
}
