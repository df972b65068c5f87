//! Wallet construction.
//!
//! Building a wallet takes three steps: read the initialization descriptor,
//! sign in with the password grant, then fetch the agent, connections,
//! invitations, credentials and verifications concurrently.
//!
//! The five fetches run on the calling task through `tokio::try_join!`. The
//! first failure completes the join and drops the other in-flight requests,
//! and no wallet is produced: construction is all or nothing.

use std::sync::Arc;

use diagency_core::{
    AgentInfo, ConnectionInfo, Credential, InvitationInfo, VerificationInfo, VerificationState,
};
use futures::TryFutureExt;
use tracing::{info, instrument, warn};

use crate::{
    api::AgencyApi,
    config::{ClientConfig, InitDescriptor},
    error::WalletError,
    rest::RestClient,
    token::{ClientCredentials, OAuthTokenProvider, TokenProvider},
    wallet::Wallet,
};

/// What the user supplies to open a wallet.
#[derive(Clone)]
pub struct WalletLogin {
    /// The initialization descriptor JSON.
    pub descriptor: String,
    /// The account name.
    pub username: String,
    /// The account password.
    pub password: String,
}

impl std::fmt::Debug for WalletLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletLogin")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// The records making up a wallet, as fetched from the agency.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WalletRecords {
    pub(crate) agent: AgentInfo,
    pub(crate) connections: Vec<ConnectionInfo>,
    pub(crate) invitations: Vec<InvitationInfo>,
    pub(crate) credentials: Vec<Credential>,
    pub(crate) verifications: Vec<VerificationInfo>,
}

/// Fetches all wallet records concurrently, keeping only stored credentials.
pub(crate) async fn fetch_records(
    api: &AgencyApi,
    token: &str,
    verification_state: VerificationState,
) -> Result<WalletRecords, WalletError> {
    let agents = api.agents();
    let connections = api.connections();
    let invitations = api.invitations();
    let credentials = api.credentials();
    let verifications = api.verifications();

    let (agent, connections, invitations, credentials, verifications) = tokio::try_join!(
        agents.me(token).map_err(WalletError::general("agent")),
        connections.list(token, None).map_err(WalletError::general("connections")),
        invitations.list(token).map_err(WalletError::general("invitations")),
        credentials.list(token, None).map_err(WalletError::general("credentials")),
        verifications
            .list(token, Some(verification_state))
            .map_err(WalletError::general("verifications")),
    )
    .map_err(|e| {
        warn!(error = %e, "Wallet fetch failed");
        e
    })?;

    let fetched = credentials.len();
    let credentials: Vec<Credential> = credentials.into_iter().filter(Credential::is_stored).collect();
    info!(
        connections = connections.len(),
        invitations = invitations.len(),
        credentials = credentials.len(),
        skipped_credentials = fetched - credentials.len(),
        verifications = verifications.len(),
        "Fetched wallet records"
    );

    Ok(WalletRecords {
        agent,
        connections,
        invitations,
        credentials,
        verifications,
    })
}

/// Opens wallets against an agency.
///
/// # Examples
///
/// ```rust,no_run
/// use diagency_client::{ClientConfig, WalletLogin, WalletProvider};
///
/// async fn open() -> Result<(), diagency_client::WalletError> {
///     let provider = WalletProvider::new(ClientConfig::default())?;
///     let wallet = provider
///         .initiate(&WalletLogin {
///             descriptor: std::fs::read_to_string("agency.json").unwrap_or_default(),
///             username: "alice".into(),
///             password: "secret".into(),
///         })
///         .await?;
///     println!("{} stored credentials", wallet.credentials.len());
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct WalletProvider {
    config: ClientConfig,
    token_provider: Arc<dyn TokenProvider>,
}

impl WalletProvider {
    /// Creates a provider that authenticates with [`OAuthTokenProvider`].
    ///
    /// # Errors
    ///
    /// Returns `DataInitializationFailed` if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, WalletError> {
        let http = config
            .build_http_client()
            .map_err(|e| WalletError::DataInitializationFailed(e.to_string()))?;
        Ok(Self::with_token_provider(config, Arc::new(OAuthTokenProvider::new(http))))
    }

    /// Creates a provider with a custom token provider.
    #[must_use]
    pub fn with_token_provider(config: ClientConfig, token_provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            config,
            token_provider,
        }
    }

    /// The client configuration.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The token provider wallets are opened with.
    #[must_use]
    pub fn token_provider(&self) -> Arc<dyn TokenProvider> {
        Arc::clone(&self.token_provider)
    }

    /// Signs in and builds a wallet.
    ///
    /// # Errors
    ///
    /// - `DataInitializationFailed` if the descriptor cannot be read
    /// - `FailedToParse` if authentication fails
    /// - `General` if any of the five fetches fails
    #[instrument(skip(self), fields(username = %login.username))]
    pub async fn initiate(&self, login: &WalletLogin) -> Result<Wallet, WalletError> {
        let descriptor = InitDescriptor::from_json(&login.descriptor)?;
        let rest = RestClient::new(descriptor.base_url(), &self.config)
            .map_err(|e| WalletError::DataInitializationFailed(e.to_string()))?;

        let client = ClientCredentials {
            token_url: descriptor.token_url.clone(),
            client_id: descriptor.client_id.clone(),
            client_secret: descriptor.client_secret.clone(),
        };
        let token = self
            .token_provider
            .authenticate(&client, &login.username, &login.password)
            .await
            .map_err(|e| {
                warn!(error = %e, "Authentication failed");
                WalletError::FailedToParse(e)
            })?;

        let api = AgencyApi::new(rest);
        let records =
            fetch_records(&api, &token.access_token, self.config.verification_state).await?;

        info!(agent = %records.agent.name, "Wallet initiated");
        Ok(Wallet {
            refresh_uri: client.token_url,
            base_uri: api.rest().base_url().to_string(),
            client_id: client.client_id,
            client_secret: client.client_secret,
            token,
            agent: records.agent,
            connections: records.connections,
            invitations: records.invitations,
            credentials: records.credentials,
            verifications: records.verifications,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{descriptor, mount_wallet, StaticTokenProvider};
    use diagency_core::CredentialState;
    use pretty_assertions::assert_eq;
    use std::time::Duration;
    use wiremock::{
        matchers::{method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn provider() -> WalletProvider {
        WalletProvider::with_token_provider(
            ClientConfig::default(),
            Arc::new(StaticTokenProvider::new("access-1")),
        )
    }

    fn login(server: &MockServer) -> WalletLogin {
        WalletLogin {
            descriptor: descriptor(server),
            username: "alice".into(),
            password: "secret".into(),
        }
    }

    #[tokio::test]
    async fn test_initiate_keeps_only_stored_credentials() {
        let mock_server = MockServer::start().await;
        mount_wallet(&mock_server).await;

        let wallet = provider().initiate(&login(&mock_server)).await.unwrap();

        assert_eq!(wallet.agent.name, "holder");
        assert_eq!(wallet.connections.len(), 1);
        assert_eq!(wallet.invitations.len(), 1);
        assert_eq!(wallet.credentials.len(), 2);
        assert!(wallet
            .credentials
            .iter()
            .all(|c| c.state() == CredentialState::Stored));
        assert_eq!(wallet.verifications.len(), 1);
        assert_eq!(wallet.token.access_token, "access-1");
        assert_eq!(wallet.base_uri, mock_server.uri());
        assert_eq!(wallet.client_id, "wallet-app");
    }

    #[tokio::test]
    async fn test_verifications_filtered_by_configured_state() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/diagency/v1.0/diagency/verifications"))
            .and(query_param("state", "proof_shared"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"count": 0, "items": []}),
            ))
            .expect(1)
            .mount(&mock_server)
            .await;
        mount_wallet(&mock_server).await;

        let config = ClientConfig {
            verification_state: VerificationState::ProofShared,
            ..ClientConfig::default()
        };
        let provider = WalletProvider::with_token_provider(
            config,
            Arc::new(StaticTokenProvider::new("access-1")),
        );

        let wallet = provider.initiate(&login(&mock_server)).await.unwrap();
        assert!(wallet.verifications.is_empty());
    }

    #[tokio::test]
    async fn test_bad_descriptor() {
        let err = provider()
            .initiate(&WalletLogin {
                descriptor: "{}".into(),
                username: "alice".into(),
                password: "secret".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, WalletError::DataInitializationFailed(_)));
    }

    #[tokio::test]
    async fn test_authentication_failure() {
        let mock_server = MockServer::start().await;

        let provider = WalletProvider::with_token_provider(
            ClientConfig::default(),
            Arc::new(StaticTokenProvider::failing()),
        );
        let err = provider.initiate(&login(&mock_server)).await.unwrap_err();
        assert!(matches!(err, WalletError::FailedToParse(_)));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_general() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/diagency/v1.0/diagency/invitations"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        mount_wallet(&mock_server).await;

        let err = provider().initiate(&login(&mock_server)).await.unwrap_err();
        match err {
            WalletError::General { resource, source } => {
                assert_eq!(resource, "invitations");
                assert!(matches!(source, crate::Error::Api { status: 500, .. }));
            }
            other => panic!("expected a general error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_first_failure_does_not_wait_for_siblings() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/diagency/v1.0/diagency/agents/me"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/diagency/v1.0/diagency/credentials"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"count": 0, "items": []}))
                    .set_delay(Duration::from_secs(20)),
            )
            .mount(&mock_server)
            .await;
        mount_wallet(&mock_server).await;

        let err = tokio::time::timeout(
            Duration::from_secs(5),
            provider().initiate(&login(&mock_server)),
        )
        .await
        .expect("initiate waited for the delayed fetch")
        .unwrap_err();

        match err {
            WalletError::General { resource, source } => {
                assert_eq!(resource, "agent");
                assert!(matches!(source, crate::Error::Api { status: 503, .. }));
            }
            other => panic!("expected a general error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_password_grant_against_token_endpoint() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "access-1",
                "refresh_token": "refresh-1"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        mount_wallet(&mock_server).await;

        let provider = WalletProvider::new(ClientConfig::default()).unwrap();
        let wallet = provider.initiate(&login(&mock_server)).await.unwrap();
        assert_eq!(wallet.token.refresh_token.as_deref(), Some("refresh-1"));
    }
}
