use diagency_core::{VerificationInfo, VerificationState, VerificationUpdate};

use crate::{
    error::Result,
    rest::{Reply, RestClient},
};

/// Accessor for `verifications`.
#[derive(Debug, Clone, Copy)]
pub struct Verifications<'a> {
    rest: &'a RestClient,
}

impl<'a> Verifications<'a> {
    pub(crate) fn new(rest: &'a RestClient) -> Self {
        Self { rest }
    }

    /// Lists verifications, optionally only those in `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a record cannot be decoded.
    pub async fn list(
        &self,
        token: &str,
        state: Option<VerificationState>,
    ) -> Result<Vec<VerificationInfo>> {
        super::list(self.rest, "verifications", token, state.map(VerificationState::encode)).await
    }

    /// Fetches one verification.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the record cannot be decoded.
    pub async fn get(&self, token: &str, id: &str) -> Result<VerificationInfo> {
        self.rest
            .get(&self.rest.item_endpoint("verifications", id)?, token)
            .await
    }

    /// Requests a state change on a verification.
    ///
    /// When the agency answers without a body the record is fetched again.
    ///
    /// # Errors
    ///
    /// Returns an error if either request fails.
    pub async fn update(
        &self,
        token: &str,
        id: &str,
        state: VerificationState,
    ) -> Result<VerificationInfo> {
        let url = self.rest.item_endpoint("verifications", id)?;
        match self.rest.patch(&url, token, &VerificationUpdate::new(state)).await? {
            Reply::NoContent => self.get(token, id).await,
            reply => reply.into_content(),
        }
    }

    /// Deletes a verification.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete(&self, token: &str, id: &str) -> Result<()> {
        self.rest
            .delete(&self.rest.item_endpoint("verifications", id)?, token)
            .await
    }
}
