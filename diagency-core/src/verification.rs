//! Verification (proof request) records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    connection::ConnectionInfo,
    state::{VerificationRole, VerificationState},
};

/// A verification exchange between a verifier and this wallet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationInfo {
    /// The verification identifier.
    pub id: String,
    /// Current state of the exchange.
    pub state: VerificationState,
    /// Which side of the exchange this agent is on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<VerificationRole>,
    /// DID of the verifying agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifier_did: Option<String>,
    /// The connection the request arrived on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionInfo>,
    /// Preview of what is being asked for, as sent by the agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
    /// The underlying proof request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof_request: Option<Value>,
    /// Agent-specific metadata.
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// Body of `PATCH verifications/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationUpdate {
    /// The requested state.
    pub state: VerificationState,
}

impl VerificationUpdate {
    /// Creates an update requesting `state`.
    #[must_use]
    pub fn new(state: VerificationState) -> Self {
        Self { state }
    }
}
