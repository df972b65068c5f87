//! Error types for the diagency-core crate.

use thiserror::Error;

/// Error type for the diagency model.
#[derive(Debug, Error)]
pub enum Error {
    /// A required field was absent (or `null`) in a payload.
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A field was present but did not hold an acceptable value.
    #[error("Invalid value for field {field}: {value}")]
    InvalidField {
        /// The offending field name.
        field: &'static str,
        /// The rejected value, rendered as JSON.
        value: String,
    },

    /// An invitation payload matched neither the credential nor the
    /// verification marker.
    #[error("Unknown preview format: {0}")]
    UnknownFormat(String),

    /// Serialization error
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Result type for the diagency model.
pub type Result<T> = std::result::Result<T, Error>;
