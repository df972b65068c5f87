//! Action-driven state transitions on an open wallet.
//!
//! Each action maps to one or more agency calls followed by an update of the
//! local wallet:
//!
//! | Action | Agency calls | Resulting state |
//! |---|---|---|
//! | Accept credential | process invitation, then `PATCH credentials/{id}` | `accepted` |
//! | Reject credential | `PATCH credentials/{id}` | `rejected` |
//! | Generate proof | process invitation, then `PATCH verifications/{id}` | `proof_generated` |
//! | Share proof | `PATCH verifications/{id}` | `proof_shared` |
//! | Reject proof | `PATCH verifications/{id}` | `failed` |
//!
//! Where an invitation is processed it is always committed before the state
//! update is sent, so local state never runs ahead of the agent.
//!
//! The service owns the [`Wallet`] and every mutating call takes `&mut self`,
//! which makes token refresh single-writer.

use std::sync::Arc;

use diagency_core::{
    ConnectionInfo, ConnectionUpdate, Credential, CredentialPreviewInfo, CredentialState,
    CredentialUpdate, PreviewDescriptor, VerificationInfo, VerificationPreviewInfo,
    VerificationState,
};
use tracing::{info, instrument, warn};

use crate::{
    aggregator::{fetch_records, WalletProvider},
    api::AgencyApi,
    config::ClientConfig,
    error::{Error, Result, WalletError},
    processor::InvitationProcessor,
    rest::RestClient,
    token::{TokenInfo, TokenProvider},
    wallet::Wallet,
};

/// What to do with a previewed credential offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialAction {
    /// Accept the offer.
    Accept,
    /// Reject the offer.
    Reject,
}

impl CredentialAction {
    /// The credential state this action requests.
    #[must_use]
    pub fn target_state(self) -> CredentialState {
        match self {
            Self::Accept => CredentialState::Accepted,
            Self::Reject => CredentialState::Rejected,
        }
    }
}

/// What to do with a verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationAction {
    /// Generate a proof for the request.
    Generate,
    /// Share a generated proof with the verifier.
    Share,
    /// Decline the request.
    Reject,
}

impl VerificationAction {
    /// The verification state this action requests.
    #[must_use]
    pub fn target_state(self) -> VerificationState {
        match self {
            Self::Generate => VerificationState::ProofGenerated,
            Self::Share => VerificationState::ProofShared,
            Self::Reject => VerificationState::Failed,
        }
    }
}

/// Drives credential and verification exchanges for one wallet.
pub struct WalletService {
    api: AgencyApi,
    wallet: Wallet,
    token_provider: Arc<dyn TokenProvider>,
    verification_state: VerificationState,
}

impl WalletService {
    /// Creates a service for `wallet`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        wallet: Wallet,
        config: &ClientConfig,
        token_provider: Arc<dyn TokenProvider>,
    ) -> Result<Self> {
        let rest = RestClient::new(wallet.base_uri.clone(), config)?;
        Ok(Self {
            api: AgencyApi::new(rest),
            wallet,
            token_provider,
            verification_state: config.verification_state,
        })
    }

    /// Creates a service for a wallet opened by `provider`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_provider(provider: &WalletProvider, wallet: Wallet) -> Result<Self> {
        Self::new(wallet, provider.config(), provider.token_provider())
    }

    /// The wallet.
    #[must_use]
    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    /// Consumes the service, returning the wallet.
    #[must_use]
    pub fn into_wallet(self) -> Wallet {
        self.wallet
    }

    /// The agency resources.
    #[must_use]
    pub fn api(&self) -> &AgencyApi {
        &self.api
    }

    /// The current access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.wallet.token.access_token
    }

    /// Previews an invitation without committing anything.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload cannot be
    /// classified.
    pub async fn preview(&self, url: &str) -> Result<PreviewDescriptor> {
        InvitationProcessor::new(&self.api)
            .inspect(self.access_token(), url)
            .await
    }

    /// Applies `action` to a previewed credential offer.
    ///
    /// Accepting commits the invitation before requesting the state change;
    /// rejecting only requests the state change. The offer's invitation is
    /// dropped from the wallet either way.
    ///
    /// # Errors
    ///
    /// Returns an error if any agency call fails. Local state is untouched
    /// on failure.
    #[instrument(skip(self, preview), fields(id = %preview.id))]
    pub async fn credential_action(
        &mut self,
        preview: &CredentialPreviewInfo,
        action: CredentialAction,
    ) -> Result<Credential> {
        let token = self.wallet.token.access_token.clone();

        if action == CredentialAction::Accept {
            InvitationProcessor::new(&self.api)
                .process(&token, &preview.url)
                .await?;
        }

        let credential = self
            .api
            .credentials()
            .update(&token, &preview.id, &CredentialUpdate::new(action.target_state()))
            .await?;

        info!(state = %credential.state(), "Credential updated");
        self.wallet.remove_invitation(&preview.url);
        self.wallet.record_credential(credential.clone());
        Ok(credential)
    }

    /// Accepts a credential offer.
    ///
    /// # Errors
    ///
    /// See [`WalletService::credential_action`].
    pub async fn accept_credential(&mut self, preview: &CredentialPreviewInfo) -> Result<Credential> {
        self.credential_action(preview, CredentialAction::Accept).await
    }

    /// Rejects a credential offer.
    ///
    /// # Errors
    ///
    /// See [`WalletService::credential_action`].
    pub async fn reject_credential(&mut self, preview: &CredentialPreviewInfo) -> Result<Credential> {
        self.credential_action(preview, CredentialAction::Reject).await
    }

    /// Applies `action` to a verification request.
    ///
    /// Generating a proof commits the request invitation first; sharing and
    /// rejecting only request the state change on `preview.id`.
    ///
    /// # Errors
    ///
    /// Returns an error if any agency call fails. Local state is untouched
    /// on failure.
    #[instrument(skip(self, preview), fields(id = %preview.id))]
    pub async fn verification_action(
        &mut self,
        preview: &VerificationPreviewInfo,
        action: VerificationAction,
    ) -> Result<VerificationInfo> {
        let token = self.wallet.token.access_token.clone();

        if action == VerificationAction::Generate {
            InvitationProcessor::new(&self.api)
                .process(&token, &preview.url)
                .await?;
        }

        let verification = self.update_verification(&token, &preview.id, action).await?;
        if action == VerificationAction::Generate {
            self.wallet.remove_invitation(&preview.url);
        }
        Ok(verification)
    }

    /// Generates a proof for a previewed verification request.
    ///
    /// # Errors
    ///
    /// See [`WalletService::verification_action`].
    pub async fn generate_proof(
        &mut self,
        preview: &VerificationPreviewInfo,
    ) -> Result<VerificationInfo> {
        self.verification_action(preview, VerificationAction::Generate)
            .await
    }

    /// Shares a generated proof.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn share_proof(&mut self, verification_id: &str) -> Result<VerificationInfo> {
        let token = self.wallet.token.access_token.clone();
        self.update_verification(&token, verification_id, VerificationAction::Share)
            .await
    }

    /// Declines a verification request, whatever its current state.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn reject_proof(&mut self, verification_id: &str) -> Result<VerificationInfo> {
        let token = self.wallet.token.access_token.clone();
        self.update_verification(&token, verification_id, VerificationAction::Reject)
            .await
    }

    async fn update_verification(
        &mut self,
        token: &str,
        id: &str,
        action: VerificationAction,
    ) -> Result<VerificationInfo> {
        let verification = self
            .api
            .verifications()
            .update(token, id, action.target_state())
            .await?;

        info!(id, ?action, state = %verification.state, "Verification updated");
        self.wallet.record_verification(verification.clone());
        Ok(verification)
    }

    /// Requests a state change on a connection and records the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub async fn update_connection(
        &mut self,
        id: &str,
        update: &ConnectionUpdate,
    ) -> Result<ConnectionInfo> {
        let token = self.wallet.token.access_token.clone();
        let connection = self.api.connections().update(&token, id, update).await?;

        info!(id, state = %connection.state, "Connection updated");
        match self.wallet.connections.iter_mut().find(|c| c.id == connection.id) {
            Some(existing) => *existing = connection.clone(),
            None => self.wallet.connections.push(connection.clone()),
        }
        Ok(connection)
    }

    /// Deletes a credential on the agent and from the wallet.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub async fn delete_credential(&mut self, id: &str) -> Result<()> {
        let token = self.wallet.token.access_token.clone();
        self.api.credentials().delete(&token, id).await?;
        self.wallet.remove_credential(id);
        info!(id, "Credential deleted");
        Ok(())
    }

    /// Exchanges the refresh token for a new token pair.
    ///
    /// On success the wallet's token is replaced and returned. If the new
    /// pair carries no refresh token the previous one is kept. On failure the
    /// previous token is retained.
    ///
    /// # Errors
    ///
    /// Returns `Authentication` if the wallet has no refresh token, or the
    /// provider's error.
    #[instrument(skip(self))]
    pub async fn refresh_token(&mut self) -> Result<TokenInfo> {
        let refresh_token = self
            .wallet
            .token
            .refresh_token
            .clone()
            .ok_or_else(|| Error::Authentication("wallet has no refresh token".into()))?;

        let mut token = self
            .token_provider
            .refresh(&self.wallet.client_credentials(), &refresh_token)
            .await
            .map_err(|e| {
                warn!(error = %e, "Token refresh failed");
                e
            })?;
        if token.refresh_token.is_none() {
            token.refresh_token = Some(refresh_token);
        }

        info!("Access token refreshed");
        self.wallet.token = token.clone();
        Ok(token)
    }

    /// Fetches all wallet records again with the current token.
    ///
    /// The wallet is only replaced if all five fetches succeed.
    ///
    /// # Errors
    ///
    /// Returns `General` naming the first resource whose fetch failed.
    pub async fn reload(&mut self) -> std::result::Result<(), WalletError> {
        let records = fetch_records(
            &self.api,
            &self.wallet.token.access_token,
            self.verification_state,
        )
        .await?;

        self.wallet.agent = records.agent;
        self.wallet.connections = records.connections;
        self.wallet.invitations = records.invitations;
        self.wallet.credentials = records.credentials;
        self.wallet.verifications = records.verifications;
        Ok(())
    }
}
