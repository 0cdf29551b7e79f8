//! GPS track engine: random-access queries, segment statistics, pure editing
//! operations and derived signals (pauses, smoothing, elevation, power, colors)
//! over immutable tracks.

pub mod colors;
pub mod config;
pub mod editing;
pub mod elevation;
pub mod error;
pub mod export;
pub mod geodesy;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod pauses;
pub mod power;
pub mod query;
pub mod segment;
pub mod smoothing;
pub mod zones;

// Re-export commonly used types for convenience
pub use config::EngineConfig;
pub use editing::{cut, merge, repair_gps_outliers, trim_to_range, RepairResult};
pub use error::{Result, TrackError};
pub use logging::{LogConfig, LogFormat, LogLevel};
pub use models::*;
pub use query::{point_at_distance, point_at_time, smoothed_pace};
pub use zones::{HrZone, HrZoneCalculator};
