//! Pairwise connection records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::state::{ConnectionRole, ConnectionState};

/// One end of a connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConnectionAgentInfo {
    /// The agent's display name.
    #[serde(default)]
    pub name: String,
    /// The agent's service endpoint.
    #[serde(default)]
    pub url: String,
    /// The pairwise DID used on this connection, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub did: Option<String>,
    /// The DID document for `did`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub did_doc: Option<Value>,
    /// Agent-specific metadata.
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// A pairwise connection between this wallet's agent and a remote agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// The connection identifier.
    pub id: String,
    /// The current state of the connection.
    pub state: ConnectionState,
    /// Which side of the connection this agent is on.
    pub role: ConnectionRole,
    /// This agent's end of the connection.
    pub local: ConnectionAgentInfo,
    /// The remote agent's end of the connection.
    pub remote: ConnectionAgentInfo,
}

impl ConnectionInfo {
    /// Returns true once the DID exchange has completed.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }
}

/// Body of `PATCH connections/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionUpdate {
    /// The requested state.
    pub state: ConnectionState,
    /// Properties to merge into the connection record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
}

impl ConnectionUpdate {
    /// Creates an update that only changes the state.
    #[must_use]
    pub fn new(state: ConnectionState) -> Self {
        Self {
            state,
            properties: None,
        }
    }

    /// Adds a property to the update.
    #[must_use]
    pub fn property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties
            .get_or_insert_with(Map::new)
            .insert(key.into(), Value::String(value.into()));
        self
    }
}
