use diagency_core::{Credential, CredentialState, CredentialUpdate};

use crate::{
    error::Result,
    rest::{Reply, RestClient},
};

/// Accessor for `credentials`.
#[derive(Debug, Clone, Copy)]
pub struct Credentials<'a> {
    rest: &'a RestClient,
}

impl<'a> Credentials<'a> {
    pub(crate) fn new(rest: &'a RestClient) -> Self {
        Self { rest }
    }

    /// Lists credentials, optionally only those in `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or any credential fails to
    /// decode.
    pub async fn list(
        &self,
        token: &str,
        state: Option<CredentialState>,
    ) -> Result<Vec<Credential>> {
        super::list(self.rest, "credentials", token, state.map(CredentialState::encode)).await
    }

    /// Fetches one credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the credential fails to
    /// decode.
    pub async fn get(&self, token: &str, id: &str) -> Result<Credential> {
        self.rest
            .get(&self.rest.item_endpoint("credentials", id)?, token)
            .await
    }

    /// Requests a state change on a credential.
    ///
    /// When the agency answers without a body the credential is fetched again.
    ///
    /// # Errors
    ///
    /// Returns an error if either request fails.
    pub async fn update(
        &self,
        token: &str,
        id: &str,
        update: &CredentialUpdate,
    ) -> Result<Credential> {
        let url = self.rest.item_endpoint("credentials", id)?;
        match self.rest.patch(&url, token, update).await? {
            Reply::NoContent => self.get(token, id).await,
            reply => reply.into_content(),
        }
    }

    /// Deletes a credential.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete(&self, token: &str, id: &str) -> Result<()> {
        self.rest
            .delete(&self.rest.item_endpoint("credentials", id)?, token)
            .await
    }
}
