//! Unified error hierarchy for runtrack
//!
//! The geometry engine itself never fails: misses are reported as `None` and
//! degenerate edits hand back their input. These errors cover the edges of the
//! crate where real faults can happen (files, configuration, untrusted input).

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for all runtrack operations
#[derive(Debug, Error)]
pub enum TrackError {
    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Track JSON could not be read or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Configuration serialize error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// CSV export errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A track failed one of its structural invariants
    #[error("Invariant violated at point {index}: {reason}")]
    InvariantViolation { index: usize, reason: String },

    /// A caller-supplied argument was unusable
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Input file missing
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },
}

/// Result type alias for runtrack operations
pub type Result<T> = std::result::Result<T, TrackError>;

impl TrackError {
    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TrackError::FileNotFound { .. } => ErrorSeverity::Warning,
            TrackError::InvariantViolation { .. } => ErrorSeverity::Warning,
            TrackError::InvalidArgument(_) => ErrorSeverity::Warning,
            TrackError::Configuration(_)
            | TrackError::ConfigParse(_)
            | TrackError::ConfigSerialize(_) => ErrorSeverity::Error,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            TrackError::FileNotFound { path } => {
                format!("Could not find track file: {}", path.display())
            }
            TrackError::Json(e) => {
                format!("Track file is not valid track JSON: {}", e)
            }
            TrackError::ConfigParse(e) => {
                format!("Configuration file is invalid: {}", e)
            }
            TrackError::InvariantViolation { index, reason } => {
                format!("Track data is inconsistent near point {}: {}", index, reason)
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
