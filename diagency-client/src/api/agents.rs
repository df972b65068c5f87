use diagency_core::AgentInfo;

use crate::{error::Result, rest::RestClient};

/// Accessor for `agents`.
#[derive(Debug, Clone, Copy)]
pub struct Agents<'a> {
    rest: &'a RestClient,
}

impl<'a> Agents<'a> {
    pub(crate) fn new(rest: &'a RestClient) -> Self {
        Self { rest }
    }

    /// Fetches the wallet's own agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not an agent.
    pub async fn me(&self, token: &str) -> Result<AgentInfo> {
        self.rest.get(&self.rest.endpoint("agents/me"), token).await
    }
}
