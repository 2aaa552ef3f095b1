use std::path::PathBuf;

use thiserror::Error;

/// Every way the analysis core can refuse a request.
///
/// The core never substitutes a default value for a failed computation and
/// never prints; callers (the presentation layer) own user-facing messaging.
#[derive(Debug, Error)]
pub enum EdaError {
    /// Source file could not be read at all.
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source file was read but its content is not a valid dataset.
    #[error("malformed dataset file {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("dataset has no rows")]
    EmptyDataset,

    /// Too few valid values for the requested statistic.
    #[error("not enough data: {0}")]
    InsufficientData(String),

    /// Multivariate analyses need at least two numeric columns.
    #[error("need at least 2 numeric columns, found {0}")]
    InsufficientColumns(usize),

    #[error("required columns missing: {}", .0.join(", "))]
    RequiredColumnsMissing(Vec<String>),

    #[error("no such column: {0}")]
    UnknownColumn(String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}

pub type Result<T> = std::result::Result<T, EdaError>;
