//! Running power estimation
//!
//! Speed and gradient come from a symmetric index window around each point,
//! which keeps a single noisy sample from dominating. Gradient feeds Minetti's
//! energy cost of running (J/kg/m), clamped against extreme-gradient artifacts;
//! metabolic power is cost × speed × body mass and mechanical power is a fixed
//! running-efficiency share of that.
//!
//! Reference: Minetti, A.E. et al. (2002). Energy cost of walking and running at
//! extreme uphill and downhill slopes. J Appl Physiol 93: 1039-1046.

use crate::config::PowerSettings;
use crate::models::{Track, TrackPoint};

/// Minetti's polynomial energy cost for `gradient` (rise/run), unclamped
pub fn minetti_cost(gradient: f64) -> f64 {
    let i = gradient;
    155.4 * i.powi(5) - 30.4 * i.powi(4) - 43.3 * i.powi(3) + 46.3 * i.powi(2) + 19.5 * i + 3.6
}

/// Energy cost of running at `gradient`, clamped to the configured bounds
pub fn energy_cost(gradient: f64, settings: &PowerSettings) -> f64 {
    minetti_cost(gradient).clamp(settings.ec_min, settings.ec_max)
}

/// Mechanical power in watts at `speed_mps` on `gradient` for `weight_kg`
pub fn mechanical_power(speed_mps: f64, gradient: f64, weight_kg: f64, settings: &PowerSettings) -> f64 {
    let metabolic = energy_cost(gradient, settings) * speed_mps * weight_kg;
    (metabolic * settings.efficiency).max(0.0)
}

/// Power at `index`, or 0 when the window would run off either end of the track
fn power_at(points: &[TrackPoint], index: usize, weight_kg: f64, settings: &PowerSettings) -> f64 {
    let lookback = settings.lookback;
    if index < lookback || index + lookback >= points.len() {
        return 0.0;
    }

    let from = &points[index - lookback];
    let to = &points[index + lookback];

    let run_m = (to.cumulative_distance - from.cumulative_distance) * 1000.0;
    let elapsed_s = to.millis_since(from) as f64 / 1000.0;
    if run_m <= 0.0 || elapsed_s <= 0.0 {
        return 0.0;
    }

    let speed_mps = run_m / elapsed_s;
    let gradient = (to.ele - from.ele) / run_m;
    mechanical_power(speed_mps, gradient, weight_kg, settings)
}

/// Copy of `points` with `power` set on every point
pub fn estimate_power(points: &[TrackPoint], weight_kg: f64, settings: &PowerSettings) -> Vec<TrackPoint> {
    (0..points.len())
        .map(|i| {
            let mut point = points[i].clone();
            point.power = Some(power_at(points, i, weight_kg, settings));
            point
        })
        .collect()
}

/// New track whose points carry estimated power
pub fn with_estimated_power(track: &Track, weight_kg: f64, settings: &PowerSettings) -> Track {
    let points = estimate_power(track.points(), weight_kg, settings);
    Track::new(track.name(), points).with_color(track.color())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geodesy::EARTH_RADIUS_KM;
    use chrono::{Duration, TimeZone, Utc};

    /// Due north at a constant speed and gradient, 1 Hz
    fn incline(n: usize, speed_mps: f64, gradient: f64) -> Track {
        let start = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let step_deg = (speed_mps / 1000.0 / EARTH_RADIUS_KM).to_degrees();
        let points = (0..n)
            .map(|i| {
                TrackPoint::new(
                    45.0 + step_deg * i as f64,
                    7.0,
                    500.0 + gradient * speed_mps * i as f64,
                    start + Duration::seconds(i as i64),
                )
            })
            .collect();
        Track::new("incline", points)
    }

    #[test]
    fn test_flat_cost_is_polynomial_constant() {
        assert!((minetti_cost(0.0) - 3.6).abs() < 1e-12);
    }

    #[test]
    fn test_steep_gradient_is_clamped() {
        let settings = PowerSettings::default();
        assert!(minetti_cost(0.5) > 20.0);
        assert_eq!(energy_cost(0.5, &settings), 20.0);
        assert_eq!(energy_cost(-0.5, &settings), minetti_cost(-0.5));
        assert_eq!(energy_cost(-3.0, &settings), 2.0);
    }

    #[test]
    fn test_flat_running_power() {
        let settings = PowerSettings::default();
        let track = incline(10, 3.0, 0.0);

        let points = estimate_power(track.points(), 70.0, &settings);

        // 3.6 J/kg/m × 3 m/s × 70 kg × 0.31
        let expected = 3.6 * 3.0 * 70.0 * 0.31;
        for p in &points[2..8] {
            let w = p.power.unwrap();
            assert!((w - expected).abs() < 1.0, "power {}", w);
        }
    }

    #[test]
    fn test_edges_have_zero_power() {
        let track = incline(10, 3.0, 0.05);
        let points = estimate_power(track.points(), 70.0, &PowerSettings::default());

        for i in [0, 1, 8, 9] {
            assert_eq!(points[i].power, Some(0.0));
        }
        assert!(points[5].power.unwrap() > 0.0);
    }

    #[test]
    fn test_pathological_gradient_stays_bounded() {
        let settings = PowerSettings::default();
        let track = incline(10, 2.0, 0.5);

        let points = estimate_power(track.points(), 70.0, &settings);

        let ceiling = settings.ec_max * 2.0 * 70.0 * settings.efficiency;
        for p in &points {
            let w = p.power.unwrap();
            assert!(w >= 0.0);
            assert!(w <= ceiling + 1.0, "power {} above ceiling {}", w, ceiling);
        }
    }

    #[test]
    fn test_downhill_power_is_non_negative() {
        let points = estimate_power(incline(10, 4.0, -0.4).points(), 80.0, &PowerSettings::default());
        assert!(points.iter().all(|p| p.power.unwrap() >= 0.0));
    }

    #[test]
    fn test_short_track_all_zero() {
        let points = estimate_power(incline(4, 3.0, 0.0).points(), 70.0, &PowerSettings::default());
        assert!(points.iter().all(|p| p.power == Some(0.0)));
    }

    #[test]
    fn test_track_level_estimate() {
        let track = incline(10, 3.0, 0.0);
        let powered = with_estimated_power(&track, 70.0, &PowerSettings::default());
        assert_eq!(powered.len(), track.len());
        assert!((powered.distance_km() - track.distance_km()).abs() < 1e-12);
        assert!(powered.points()[4].power.unwrap() > 0.0);
    }
}
