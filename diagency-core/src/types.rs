//! Agent, invitation and envelope records returned by the agency API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The wallet's own agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentInfo {
    /// The agent identifier.
    pub id: String,
    /// The agent's display name.
    pub name: String,
    /// The agent's service endpoint.
    pub url: String,
    /// The agent's public DID, if it has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,
    /// When the agent was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<String>,
    /// Agent-specific metadata.
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// An invitation issued by, or pending for, the wallet's agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvitationInfo {
    /// The invitation identifier.
    pub id: String,
    /// The invitation URL.
    pub url: String,
    /// A shortened form of `url`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_url: Option<String>,
    /// The recipient key embedded in the invitation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_key: Option<String>,
    /// Agent-specific metadata.
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// The `{count, items}` envelope wrapping every list response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    /// Number of records reported by the server.
    #[serde(default)]
    pub count: usize,
    /// The records.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> ListResponse<T> {
    /// Discards the envelope.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Body of `POST invitation_processor`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationProcessRequest {
    /// The invitation URL.
    pub url: String,
    /// `true` previews the invitation without committing any state.
    pub inspect: bool,
}
