//! Thin accessors for the five agency resources.
//!
//! Each accessor borrows the [`RestClient`] and maps one resource path under
//! `{base}/diagency/v1.0/diagency`. They hold no state of their own; the token
//! is passed to every call.
//!
//! # Examples
//!
//! ```rust,no_run
//! use diagency_client::{AgencyApi, ClientConfig, RestClient};
//! use diagency_core::CredentialState;
//!
//! async fn stored(token: &str) -> diagency_client::Result<usize> {
//!     let rest = RestClient::new("https://agency.example", &ClientConfig::default())?;
//!     let api = AgencyApi::new(rest);
//!     let credentials = api.credentials().list(token, Some(CredentialState::Stored)).await?;
//!     Ok(credentials.len())
//! }
//! ```

mod agents;
mod connections;
mod credentials;
mod invitations;
mod verifications;

use diagency_core::ListResponse;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{error::Result, rest::RestClient};

pub use agents::Agents;
pub use connections::Connections;
pub use credentials::Credentials;
pub use invitations::Invitations;
pub use verifications::Verifications;

/// Entry point to the agency resources.
#[derive(Debug, Clone)]
pub struct AgencyApi {
    rest: RestClient,
}

impl AgencyApi {
    /// Wraps a REST client.
    #[must_use]
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }

    /// The underlying REST client.
    #[must_use]
    pub fn rest(&self) -> &RestClient {
        &self.rest
    }

    /// The `agents` resource.
    #[must_use]
    pub fn agents(&self) -> Agents<'_> {
        Agents::new(&self.rest)
    }

    /// The `connections` resource.
    #[must_use]
    pub fn connections(&self) -> Connections<'_> {
        Connections::new(&self.rest)
    }

    /// The `credentials` resource.
    #[must_use]
    pub fn credentials(&self) -> Credentials<'_> {
        Credentials::new(&self.rest)
    }

    /// The `invitations` resource and the invitation processor.
    #[must_use]
    pub fn invitations(&self) -> Invitations<'_> {
        Invitations::new(&self.rest)
    }

    /// The `verifications` resource.
    #[must_use]
    pub fn verifications(&self) -> Verifications<'_> {
        Verifications::new(&self.rest)
    }
}

/// Fetches a list resource, optionally filtered by state, and unwraps the
/// `{count, items}` envelope.
async fn list<T: DeserializeOwned>(
    rest: &RestClient,
    resource: &str,
    token: &str,
    state: Option<&str>,
) -> Result<Vec<T>> {
    let mut url = rest.endpoint(resource);
    if let Some(state) = state {
        url = format!("{url}?state={state}");
    }

    let list: ListResponse<T> = rest.get(&url, token).await?;
    debug!(resource, count = list.count, "Fetched list");
    Ok(list.into_items())
}
