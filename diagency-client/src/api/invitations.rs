use diagency_core::{InvitationInfo, InvitationProcessRequest};
use serde_json::Value;

use crate::{error::Result, rest::RestClient};

/// Accessor for `invitations` and `invitation_processor`.
#[derive(Debug, Clone, Copy)]
pub struct Invitations<'a> {
    rest: &'a RestClient,
}

impl<'a> Invitations<'a> {
    pub(crate) fn new(rest: &'a RestClient) -> Self {
        Self { rest }
    }

    /// Lists invitations.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a record cannot be decoded.
    pub async fn list(&self, token: &str) -> Result<Vec<InvitationInfo>> {
        super::list(self.rest, "invitations", token, None).await
    }

    /// Fetches one invitation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the record cannot be decoded.
    pub async fn get(&self, token: &str, id: &str) -> Result<InvitationInfo> {
        self.rest
            .get(&self.rest.item_endpoint("invitations", id)?, token)
            .await
    }

    /// Deletes an invitation.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete(&self, token: &str, id: &str) -> Result<()> {
        self.rest
            .delete(&self.rest.item_endpoint("invitations", id)?, token)
            .await
    }

    /// Submits an invitation URL to the processor and returns the raw preview.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not JSON.
    pub async fn process(&self, token: &str, request: &InvitationProcessRequest) -> Result<Value> {
        self.rest
            .post(&self.rest.endpoint("invitation_processor"), token, request)
            .await
    }
}
