//! Track persistence and export
//!
//! JSON is the native interchange format: reading goes through `Track::new`, so
//! cumulative distances and summary fields in the file are never trusted. CSV is
//! write-only, one row per point.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, TrackError};
use crate::models::Track;

pub mod csv;
pub mod json;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for ExportFormat {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(TrackError::InvalidArgument(format!("Unsupported format: {}", s))),
        }
    }
}

/// Write `track` to `path` in `format`
pub fn export_track<P: AsRef<Path>>(track: &Track, format: ExportFormat, path: P) -> Result<()> {
    tracing::debug!(
        track = %track.id(),
        format = ?format,
        path = %path.as_ref().display(),
        "Exporting track"
    );
    match format {
        ExportFormat::Json => json::write_track(track, path),
        ExportFormat::Csv => csv::write_points_csv(track, path),
    }
}
