//! Token acquisition for the agency API.
//!
//! The wallet only needs two grants: the resource-owner password grant to
//! sign in, and the refresh-token grant to renew the access token. Both are
//! behind the [`TokenProvider`] trait so that callers can plug in their own
//! OAuth stack.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// An access/refresh token pair.
///
/// `Debug` output redacts both tokens.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// The bearer token sent with every agency request.
    pub access_token: String,
    /// The token used to obtain a new access token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// The token type, normally `Bearer`.
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// Lifetime of the access token in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    /// Granted scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

impl std::fmt::Debug for TokenInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenInfo")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("scope", &self.scope)
            .finish()
    }
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl TokenInfo {
    /// Creates a bearer token without a refresh token.
    #[must_use]
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            token_type: default_token_type(),
            expires_in: None,
            scope: None,
        }
    }
}

/// The OAuth client a token request is made on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCredentials {
    /// The token endpoint.
    pub token_url: String,
    /// The client identifier.
    pub client_id: String,
    /// The client secret, for confidential clients.
    pub client_secret: Option<String>,
}

/// Obtains and refreshes tokens.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Signs in with a username and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the grant is rejected or the response is not a
    /// token.
    async fn authenticate(
        &self,
        client: &ClientCredentials,
        username: &str,
        password: &str,
    ) -> Result<TokenInfo>;

    /// Exchanges a refresh token for a new token pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the grant is rejected or the response is not a
    /// token.
    async fn refresh(&self, client: &ClientCredentials, refresh_token: &str) -> Result<TokenInfo>;
}

/// [`TokenProvider`] speaking form-encoded OAuth 2.0 to the token endpoint.
#[derive(Debug, Clone)]
pub struct OAuthTokenProvider {
    http: reqwest::Client,
}

impl OAuthTokenProvider {
    /// Creates a provider using `http` for token requests.
    #[must_use]
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn grant(&self, client: &ClientCredentials, params: &[(&str, &str)]) -> Result<TokenInfo> {
        let mut form: Vec<(&str, &str)> = params.to_vec();
        form.push(("client_id", client.client_id.as_str()));
        if let Some(secret) = &client.client_secret {
            form.push(("client_secret", secret.as_str()));
        }

        debug!(url = %client.token_url, "Requesting token");
        let response = self.http.post(&client.token_url).form(&form).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let reason = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|value| {
                    value
                        .get("error_description")
                        .or_else(|| value.get("error"))
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .unwrap_or_else(|| format!("token endpoint returned status code {}", status.as_u16()));
            warn!(status = status.as_u16(), %reason, "Token request rejected");
            return Err(Error::Authentication(reason));
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl TokenProvider for OAuthTokenProvider {
    async fn authenticate(
        &self,
        client: &ClientCredentials,
        username: &str,
        password: &str,
    ) -> Result<TokenInfo> {
        self.grant(
            client,
            &[
                ("grant_type", "password"),
                ("username", username),
                ("password", password),
            ],
        )
        .await
    }

    async fn refresh(&self, client: &ClientCredentials, refresh_token: &str) -> Result<TokenInfo> {
        self.grant(
            client,
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
        )
        .await
    }
}
