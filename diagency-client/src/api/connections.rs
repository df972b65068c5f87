use diagency_core::{ConnectionInfo, ConnectionState, ConnectionUpdate};

use crate::{
    error::Result,
    rest::{Reply, RestClient},
};

/// Accessor for `connections`.
#[derive(Debug, Clone, Copy)]
pub struct Connections<'a> {
    rest: &'a RestClient,
}

impl<'a> Connections<'a> {
    pub(crate) fn new(rest: &'a RestClient) -> Self {
        Self { rest }
    }

    /// Lists connections, optionally only those in `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or a record cannot be decoded.
    pub async fn list(
        &self,
        token: &str,
        state: Option<ConnectionState>,
    ) -> Result<Vec<ConnectionInfo>> {
        super::list(self.rest, "connections", token, state.map(ConnectionState::encode)).await
    }

    /// Fetches one connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the record cannot be decoded.
    pub async fn get(&self, token: &str, id: &str) -> Result<ConnectionInfo> {
        self.rest
            .get(&self.rest.item_endpoint("connections", id)?, token)
            .await
    }

    /// Requests a state change (and optional property merge) on a connection.
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
        update: &ConnectionUpdate,
    ) -> Result<ConnectionInfo> {
        let url = self.rest.item_endpoint("connections", id)?;
        match self.rest.patch(&url, token, update).await? {
            Reply::NoContent => self.get(token, id).await,
            reply => reply.into_content(),
        }
    }

    /// Deletes a connection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete(&self, token: &str, id: &str) -> Result<()> {
        self.rest
            .delete(&self.rest.item_endpoint("connections", id)?, token)
            .await
    }
}
