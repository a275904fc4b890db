use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the fuel insights crates.
#[derive(Error, Debug)]
pub enum InsightsError {
    /// The fill-up source is missing a column or holds an unparseable,
    /// negative or zero-gallon value. The whole load fails.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Too few records to derive any metric.
    #[error("Not enough fill-up records: need at least {required}, found {found}")]
    EmptyInput { required: usize, found: usize },

    /// A regression or rolling window is undefined for the given series.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the fuel crates.
pub type Result<T> = std::result::Result<T, InsightsError>;
