//! Engine tuning configuration
//!
//! Every domain threshold the engine uses lives here as a named constant with a
//! matching settings field, so a sport or sensor profile can override it from a
//! TOML file without touching the algorithms.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Implied speed above which a GPS fix is treated as an outlier (km/h)
pub const DEFAULT_OUTLIER_SPEED_KMH: f64 = 45.0;

/// Shortest low-speed interval reported as a pause (seconds)
pub const DEFAULT_PAUSE_MIN_DURATION_SECS: f64 = 10.0;

/// Speed below which the athlete counts as stopped (km/h)
pub const DEFAULT_PAUSE_MAX_SPEED_KMH: f64 = 1.5;

/// Reversal needed before an elevation climb or descent is committed (meters)
pub const DEFAULT_HYSTERESIS_THRESHOLD_M: f64 = 4.0;

/// Index half-width of the speed/gradient window used for power
pub const DEFAULT_POWER_LOOKBACK: usize = 2;

/// Lower clamp for Minetti energy cost (J/kg/m)
pub const MINETTI_EC_MIN: f64 = 2.0;

/// Upper clamp for Minetti energy cost (J/kg/m)
pub const MINETTI_EC_MAX: f64 = 20.0;

/// Share of metabolic power that ends up as mechanical power
pub const RUNNING_EFFICIENCY: f64 = 0.31;

/// Body mass used when none is configured (kg)
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;

/// How many indices either side of a point the time-window smoother inspects
pub const DEFAULT_SMOOTHING_SEARCH_RADIUS: usize = 100;

/// Distance from the start below which smoothed pace is not reported (km)
pub const SMOOTHED_PACE_MIN_KM: f64 = 0.05;

/// Default lookback for smoothed pace (meters)
pub const DEFAULT_PACE_LOOKBACK_M: f64 = 200.0;

/// Heart-rate zone boundaries as fractions of max HR (Z1|Z2|Z3|Z4|Z5)
pub const DEFAULT_HR_ZONE_BOUNDS: [f64; 4] = [0.60, 0.70, 0.80, 0.90];

/// Max HR used for zone coloring when none is configured
pub const DEFAULT_MAX_HR: f64 = 190.0;

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub repair: RepairSettings,
    pub pauses: PauseSettings,
    pub elevation: ElevationSettings,
    pub power: PowerSettings,
    pub smoothing: SmoothingSettings,
    pub query: QuerySettings,
    pub zones: ZoneSettings,
}

/// GPS outlier repair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairSettings {
    /// Implied speed above which a point is replaced by its neighbors' midpoint
    pub max_speed_kmh: f64,
}

/// Pause detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PauseSettings {
    pub min_duration_secs: f64,
    pub max_speed_kmh: f64,
}

/// Hysteresis elevation filter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElevationSettings {
    pub threshold_m: f64,
}

/// Running power estimate (Minetti energy-cost model)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerSettings {
    pub lookback: usize,
    pub ec_min: f64,
    pub ec_max: f64,
    pub efficiency: f64,
    pub weight_kg: f64,
}

/// Time-window smoothing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingSettings {
    pub search_radius: usize,
}

/// Random-access query tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    pub smoothed_pace_min_km: f64,
    pub pace_lookback_m: f64,
}

/// Heart-rate zone coloring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneSettings {
    pub max_hr: f64,
    pub bounds: [f64; 4],
}

impl Default for RepairSettings {
    fn default() -> Self {
        Self {
            max_speed_kmh: DEFAULT_OUTLIER_SPEED_KMH,
        }
    }
}

impl Default for PauseSettings {
    fn default() -> Self {
        Self {
            min_duration_secs: DEFAULT_PAUSE_MIN_DURATION_SECS,
            max_speed_kmh: DEFAULT_PAUSE_MAX_SPEED_KMH,
        }
    }
}

impl Default for ElevationSettings {
    fn default() -> Self {
        Self {
            threshold_m: DEFAULT_HYSTERESIS_THRESHOLD_M,
        }
    }
}

impl Default for PowerSettings {
    fn default() -> Self {
        Self {
            lookback: DEFAULT_POWER_LOOKBACK,
            ec_min: MINETTI_EC_MIN,
            ec_max: MINETTI_EC_MAX,
            efficiency: RUNNING_EFFICIENCY,
            weight_kg: DEFAULT_WEIGHT_KG,
        }
    }
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        Self {
            search_radius: DEFAULT_SMOOTHING_SEARCH_RADIUS,
        }
    }
}

impl Default for QuerySettings {
    fn default() -> Self {
        Self {
            smoothed_pace_min_km: SMOOTHED_PACE_MIN_KM,
            pace_lookback_m: DEFAULT_PACE_LOOKBACK_M,
        }
    }
}

impl Default for ZoneSettings {
    fn default() -> Self {
        Self {
            max_hr: DEFAULT_MAX_HR,
            bounds: DEFAULT_HR_ZONE_BOUNDS,
        }
    }
}

/// Configuration management implementation
impl EngineConfig {
    /// Load configuration from TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config: EngineConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml_content = toml::to_string_pretty(self)
            .with_context(|| "Failed to serialize configuration to TOML")?;

        fs::write(&path, toml_content).with_context(|| {
            format!("Failed to write config file: {}", path.as_ref().display())
        })?;

        Ok(())
    }

    /// Get default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".runtrack")
            .join("config.toml")
    }

    /// Load configuration with fallback to defaults
    pub fn load_or_default() -> Self {
        let config_path = Self::default_config_path();
        if !config_path.exists() {
            return Self::default();
        }

        match Self::load_from_file(&config_path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    path = %config_path.display(),
                    error = %e,
                    "Config file not usable, using defaults"
                );
                Self::default()
            }
        }
    }
}
