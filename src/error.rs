//! Error types for Trueno-AB
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trueno-AB error types
#[derive(Error, Debug)]
pub enum Error {
    /// Alternative name/weight has the wrong shape
    #[error("Invalid alternative: {0}\nAlternatives must be a non-empty string or a single {{\"name\": weight}} pair")]
    InvalidAlternative(String),

    /// Experiment definition cannot be used
    #[error("Invalid experiment: {0}")]
    InvalidExperiment(String),

    /// Catalog has no experiment with this name
    #[error("Experiment not found: {0}")]
    ExperimentNotFound(String),

    /// Recorded info could not be parsed (recovered as an empty map by `Variant::extra_info`)
    #[error("Malformed recorded info: {0}")]
    MalformedAuxiliaryData(String),

    /// Counter store failure (connectivity, timeout, type mismatch)
    #[error("Counter store error: {0}")]
    Store(String),

    /// JSON encode/decode error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
