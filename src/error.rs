//! Error types for the dashboard pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for loading and exporting dashboard data.
///
/// Empty filter results are not errors: an empty `Vec` is a normal outcome
/// and never travels through this type.
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Required input source does not exist
    #[error("Input not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// Required column missing or a non-date value malformed
    #[error("Failed to parse {source_name}: {detail}")]
    Parse { source_name: String, detail: String },

    /// Filter selection that cannot be applied
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Reading or writing a file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writing CSV output failed
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Serializing JSON output failed
    #[error("Failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl DashboardError {
    pub fn parse(source_name: impl Into<String>, detail: impl Into<String>) -> Self {
        DashboardError::Parse {
            source_name: source_name.into(),
            detail: detail.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DashboardError::NotFound { .. })
    }
}

/// Type alias for Results using DashboardError
pub type Result<T> = std::result::Result<T, DashboardError>;
