//! The in-memory wallet snapshot.

use diagency_core::{AgentInfo, ConnectionInfo, Credential, InvitationInfo, VerificationInfo};
use tracing::debug;

use crate::token::{ClientCredentials, TokenInfo};

/// A wallet: the agency session plus the records fetched for it.
///
/// Built by [`WalletProvider::initiate`](crate::WalletProvider::initiate) and
/// updated in place by [`WalletService`](crate::WalletService) as actions
/// complete. `credentials` only ever holds credentials in the `stored` state.
#[derive(Clone, PartialEq)]
pub struct Wallet {
    /// Token endpoint used for refreshes.
    pub refresh_uri: String,
    /// Base URL of the agency.
    pub base_uri: String,
    /// OAuth client identifier.
    pub client_id: String,
    /// OAuth client secret, for confidential clients.
    pub client_secret: Option<String>,
    /// The current token pair.
    pub token: TokenInfo,
    /// The wallet's own agent.
    pub agent: AgentInfo,
    /// All connections.
    pub connections: Vec<ConnectionInfo>,
    /// All pending invitations.
    pub invitations: Vec<InvitationInfo>,
    /// Stored credentials.
    pub credentials: Vec<Credential>,
    /// Verifications. Fetched in the configured filter state, then updated
    /// in place as actions move them to other states.
    pub verifications: Vec<VerificationInfo>,
}

impl std::fmt::Debug for Wallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("refresh_uri", &self.refresh_uri)
            .field("base_uri", &self.base_uri)
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .field("token", &self.token)
            .field("agent", &self.agent)
            .field("connections", &self.connections)
            .field("invitations", &self.invitations)
            .field("credentials", &self.credentials)
            .field("verifications", &self.verifications)
            .finish()
    }
}

impl Wallet {
    /// The OAuth client this wallet authenticates as.
    #[must_use]
    pub fn client_credentials(&self) -> ClientCredentials {
        ClientCredentials {
            token_url: self.refresh_uri.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }

    /// Looks up a stored credential.
    #[must_use]
    pub fn credential(&self, id: &str) -> Option<&Credential> {
        self.credentials.iter().find(|c| c.id() == id)
    }

    /// Looks up a verification.
    #[must_use]
    pub fn verification(&self, id: &str) -> Option<&VerificationInfo> {
        self.verifications.iter().find(|v| v.id == id)
    }

    /// Records the latest view of a credential.
    ///
    /// A stored credential is inserted or replaced; a credential in any other
    /// state is dropped from the wallet.
    pub fn record_credential(&mut self, credential: Credential) {
        let position = self.credentials.iter().position(|c| c.id() == credential.id());
        match (position, credential.is_stored()) {
            (Some(index), true) => self.credentials[index] = credential,
            (None, true) => self.credentials.push(credential),
            (Some(index), false) => {
                self.credentials.remove(index);
            }
            (None, false) => {}
        }
    }

    /// Removes a credential. Returns whether it was present.
    pub fn remove_credential(&mut self, id: &str) -> bool {
        let before = self.credentials.len();
        self.credentials.retain(|c| c.id() != id);
        before != self.credentials.len()
    }

    /// Records the latest view of a verification, replacing any earlier one.
    pub fn record_verification(&mut self, verification: VerificationInfo) {
        match self.verifications.iter_mut().find(|v| v.id == verification.id) {
            Some(existing) => *existing = verification,
            None => self.verifications.push(verification),
        }
    }

    /// Drops invitations addressed by `url`, matching either the full or the
    /// short form.
    pub fn remove_invitation(&mut self, url: &str) {
        let before = self.invitations.len();
        self.invitations
            .retain(|i| i.url != url && i.short_url.as_deref() != Some(url));
        debug!(url, removed = before - self.invitations.len(), "Dropped invitation");
    }
}
