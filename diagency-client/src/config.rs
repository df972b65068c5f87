//! Client configuration and the wallet initialization descriptor.

use std::time::Duration;

use diagency_core::VerificationState;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, WalletError};

/// Path prefix of every agency resource.
pub const API_PATH: &str = "diagency/v1.0/diagency";

/// Configuration for the agency HTTP client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// The request timeout in seconds
    pub timeout: u64,
    /// The user agent sent with every request
    pub user_agent: String,
    /// State used to filter verifications when building a wallet
    pub verification_state: VerificationState,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: 30,
            user_agent: format!("diagency-client/{}", env!("CARGO_PKG_VERSION")),
            verification_state: VerificationState::default(),
        }
    }
}

impl ClientConfig {
    /// The request timeout as a duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Builds the HTTP client described by this configuration.
    ///
    /// Redirects are not followed so that the `Location` target can be
    /// surfaced to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn build_http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(self.timeout())
            .user_agent(self.user_agent.clone())
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::InvalidConfig(e.to_string()))
    }
}

/// Wallet initialization descriptor, usually scanned from a QR code.
///
/// ```json
/// {
///   "serviceBaseUrl": "https://agency.example",
///   "tokenUrl": "https://agency.example/oauth2/token",
///   "clientId": "wallet-app"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitDescriptor {
    /// Base URL of the agency service.
    pub service_base_url: String,
    /// The OAuth token endpoint, also used for refreshes.
    pub token_url: String,
    /// The OAuth client identifier.
    pub client_id: String,
    /// The OAuth client secret, for confidential clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    /// Display name of the agency.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl InitDescriptor {
    /// Parses a descriptor from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `DataInitializationFailed` if the text is not a descriptor or a
    /// required value is empty.
    pub fn from_json(raw: &str) -> std::result::Result<Self, WalletError> {
        let descriptor: Self = serde_json::from_str(raw)
            .map_err(|e| WalletError::DataInitializationFailed(e.to_string()))?;

        for (field, value) in [
            ("serviceBaseUrl", &descriptor.service_base_url),
            ("tokenUrl", &descriptor.token_url),
            ("clientId", &descriptor.client_id),
        ] {
            if value.trim().is_empty() {
                return Err(WalletError::DataInitializationFailed(format!(
                    "{field} must not be empty"
                )));
            }
        }

        Ok(descriptor)
    }

    /// The base URL with any trailing slash removed.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.service_base_url.trim_end_matches('/')
    }
}
