//! Metric-to-color gradient mapping for route rendering
//!
//! Each leg between consecutive points gets a value for the chosen metric. Values
//! are normalized into the `[min, max]` observed across the track and mapped onto
//! a hue or lightness ramp. Heart-rate zones use fixed colors per zone instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::{Track, TrackPoint};
use crate::query::{lerp_optional, pace_min_per_km};
use crate::zones::{HrZone, HrZoneCalculator};

/// Metric driving the route color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMetric {
    Pace,
    Speed,
    Elevation,
    HeartRate,
    Power,
    HrZone,
}

impl FromStr for ColorMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pace" => Ok(ColorMetric::Pace),
            "speed" => Ok(ColorMetric::Speed),
            "elevation" | "ele" => Ok(ColorMetric::Elevation),
            "heartrate" | "heart-rate" | "hr" => Ok(ColorMetric::HeartRate),
            "power" => Ok(ColorMetric::Power),
            "hrzone" | "hr-zone" | "zone" => Ok(ColorMetric::HrZone),
            _ => Err(format!("Invalid color metric: {}", s)),
        }
    }
}

/// An HSL color; hue in degrees, saturation and lightness in percent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    pub const fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    /// Legs with no value for the metric
    pub const NO_DATA: Hsl = Hsl::new(0.0, 0.0, 75.0);
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "hsl({:.0}, {:.0}%, {:.0}%)", self.h, self.s, self.l)
    }
}

/// Zone colors, Z1 to Z5
const ZONE_COLORS: [Hsl; 5] = [
    Hsl::new(0.0, 0.0, 62.0),
    Hsl::new(210.0, 80.0, 55.0),
    Hsl::new(120.0, 60.0, 45.0),
    Hsl::new(30.0, 90.0, 55.0),
    Hsl::new(0.0, 85.0, 50.0),
];

/// A colored leg from `start_index` to `start_index + 1`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColoredSegment {
    pub start_index: usize,
    pub end_index: usize,
    pub value: Option<f64>,
    pub color: Hsl,
}

fn leg_value(a: &TrackPoint, b: &TrackPoint, metric: ColorMetric) -> Option<f64> {
    let elapsed_ms = b.millis_since(a);
    let distance_km = b.cumulative_distance - a.cumulative_distance;
    match metric {
        ColorMetric::Pace => {
            let pace = pace_min_per_km(elapsed_ms, distance_km);
            (pace > 0.0).then_some(pace)
        }
        ColorMetric::Speed => {
            (elapsed_ms > 0).then(|| distance_km / (elapsed_ms as f64 / 3_600_000.0))
        }
        ColorMetric::Elevation => Some((a.ele + b.ele) / 2.0),
        ColorMetric::HeartRate | ColorMetric::HrZone => lerp_optional(a.hr, b.hr, 0.5),
        ColorMetric::Power => lerp_optional(a.power, b.power, 0.5),
    }
}

/// Map a normalized ratio in `[0, 1]` to the metric's ramp
fn ramp(metric: ColorMetric, ratio: f64) -> Hsl {
    match metric {
        // Fast legs (low pace) red, slow legs green
        ColorMetric::Pace => Hsl::new(120.0 * ratio, 85.0, 45.0),
        // Slow legs green, fast legs red
        ColorMetric::Speed => Hsl::new(120.0 * (1.0 - ratio), 85.0, 45.0),
        ColorMetric::Elevation => Hsl::new(30.0, 60.0, 80.0 - 50.0 * ratio),
        ColorMetric::HeartRate => Hsl::new(60.0 * (1.0 - ratio), 90.0, 50.0),
        ColorMetric::Power => Hsl::new(270.0, 70.0, 80.0 - 50.0 * ratio),
        ColorMetric::HrZone => Hsl::NO_DATA,
    }
}

/// Fixed color for a heart rate zone
pub fn zone_color(zone: HrZone) -> Hsl {
    ZONE_COLORS[zone.number() as usize - 1]
}

/// One colored segment per leg of `track` for `metric`
pub fn colored_segments(track: &Track, metric: ColorMetric, zones: &HrZoneCalculator) -> Vec<ColoredSegment> {
    let points = track.points();
    let values: Vec<Option<f64>> = points
        .windows(2)
        .map(|pair| leg_value(&pair[0], &pair[1], metric))
        .collect();

    let (min, max) = values
        .iter()
        .flatten()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;

    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            let color = match (metric, value) {
                (_, None) => Hsl::NO_DATA,
                (ColorMetric::HrZone, Some(hr)) => zone_color(zones.zone_for(hr)),
                (_, Some(v)) => {
                    let ratio = if range > 0.0 { (v - min) / range } else { 0.5 };
                    ramp(metric, ratio)
                }
            };
            ColoredSegment {
                start_index: i,
                end_index: i + 1,
                value,
                color,
            }
        })
        .collect()
}
