//! Error types for the diagency-client crate.

use thiserror::Error;

/// The main error type for diagency-client operations.
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the model crate.
    #[error("Model error: {0}")]
    Core(#[from] diagency_core::Error),

    /// The request could not be sent or the response could not be read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The agency answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// The HTTP status code.
        status: u16,
        /// The message extracted from the error body.
        message: String,
        /// The raw error body.
        body: String,
    },

    /// The agency answered with a status this call cannot use, such as a
    /// redirect or an empty body where content was required.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The client configuration is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The token endpoint rejected the grant.
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// An error occurred during serialization or deserialization.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A specialized Result type for diagency-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of wallet construction.
#[derive(Error, Debug)]
pub enum WalletError {
    /// The initialization descriptor could not be read.
    #[error("Wallet data initialization failed: {0}")]
    DataInitializationFailed(String),

    /// Authentication against the token endpoint failed.
    #[error("Failed to parse authentication response: {0}")]
    FailedToParse(#[source] Error),

    /// Fetching wallet state failed.
    #[error("Failed to fetch {resource}: {source}")]
    General {
        /// The resource whose fetch failed first.
        resource: &'static str,
        /// The underlying failure.
        #[source]
        source: Error,
    },
}

impl WalletError {
    pub(crate) fn general(resource: &'static str) -> impl FnOnce(Error) -> Self {
        move |source| Self::General { resource, source }
    }
}
