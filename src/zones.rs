use serde::{Deserialize, Serialize};

use crate::config::ZoneSettings;
use crate::error::{Result, TrackError};

/// Heart rate zone, bounded by fractions of max HR
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HrZone {
    /// Recovery
    Z1,
    /// Aerobic base
    Z2,
    /// Tempo
    Z3,
    /// Threshold
    Z4,
    /// VO2 max
    Z5,
}

impl HrZone {
    /// Zone number, 1 to 5
    pub fn number(&self) -> u8 {
        match self {
            HrZone::Z1 => 1,
            HrZone::Z2 => 2,
            HrZone::Z3 => 3,
            HrZone::Z4 => 4,
            HrZone::Z5 => 5,
        }
    }
}

/// Classifies heart rates against max-HR zone boundaries
#[derive(Debug, Clone, PartialEq)]
pub struct HrZoneCalculator {
    max_hr: f64,
    bounds: [f64; 4],
}

impl HrZoneCalculator {
    /// Build a calculator, validating the configured max HR and boundaries
    pub fn new(settings: &ZoneSettings) -> Result<Self> {
        Self::validate_heart_rate(settings.max_hr)?;

        let ascending = settings.bounds.windows(2).all(|w| w[0] < w[1]);
        let in_range = settings.bounds.iter().all(|b| *b > 0.0 && *b <= 1.0);
        if !ascending || !in_range {
            return Err(TrackError::Configuration(format!(
                "HR zone bounds must be ascending fractions of max HR, got {:?}",
                settings.bounds
            )));
        }

        Ok(Self {
            max_hr: settings.max_hr,
            bounds: settings.bounds,
        })
    }

    pub fn max_hr(&self) -> f64 {
        self.max_hr
    }

    /// Upper heart rate (bpm) of zones 1 to 4
    pub fn zone_ceilings(&self) -> [f64; 4] {
        self.bounds.map(|b| b * self.max_hr)
    }

    /// Determine which zone a given heart rate falls into
    pub fn zone_for(&self, hr: f64) -> HrZone {
        let fraction = hr / self.max_hr;
        if fraction < self.bounds[0] {
            HrZone::Z1
        } else if fraction < self.bounds[1] {
            HrZone::Z2
        } else if fraction < self.bounds[2] {
            HrZone::Z3
        } else if fraction < self.bounds[3] {
            HrZone::Z4
        } else {
            HrZone::Z5
        }
    }

    fn validate_heart_rate(hr: f64) -> Result<()> {
        if !(100.0..=250.0).contains(&hr) {
            return Err(TrackError::Configuration(format!(
                "Max HR must be between 100 and 250 bpm, got {}",
                hr
            )));
        }
        Ok(())
    }
}
