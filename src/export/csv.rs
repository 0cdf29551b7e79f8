use serde::Serialize;
use std::path::Path;

use crate::error::Result;
use crate::models::Track;

#[derive(Serialize)]
struct PointRow {
    elapsed_s: f64,
    lat: f64,
    lon: f64,
    ele: f64,
    distance_km: f64,
    hr: Option<f64>,
    cad: Option<f64>,
    power: Option<f64>,
}

/// Write one CSV row per point; missing sensor values are left empty
pub fn write_points_csv<P: AsRef<Path>>(track: &Track, path: P) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    if let Some(first) = track.first() {
        for point in track.points() {
            writer.serialize(PointRow {
                elapsed_s: point.millis_since(first) as f64 / 1000.0,
                lat: point.lat,
                lon: point.lon,
                ele: point.ele,
                distance_km: point.cumulative_distance(),
                hr: point.hr,
                cad: point.cad,
                power: point.power,
            })?;
        }
    }

    writer.flush()?;
    Ok(())
}
