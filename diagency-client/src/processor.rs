//! Invitation preview and processing.
//!
//! The agency exposes one endpoint for both phases of handling an invitation.
//! With `inspect = true` it only describes the invitation; with
//! `inspect = false` it commits the offer or request on the agent. Forgetting
//! to set the flag moves remote state, so the two phases are also exposed as
//! separate methods with the flag fixed.

use diagency_core::{InvitationProcessRequest, PreviewDescriptor};
use tracing::{debug, info, instrument};

use crate::{api::AgencyApi, error::Result};

/// Previews and processes invitation URLs.
#[derive(Debug, Clone, Copy)]
pub struct InvitationProcessor<'a> {
    api: &'a AgencyApi,
}

impl<'a> InvitationProcessor<'a> {
    /// Creates a processor on top of `api`.
    #[must_use]
    pub fn new(api: &'a AgencyApi) -> Self {
        Self { api }
    }

    /// Describes an invitation without committing any state.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload cannot be
    /// classified.
    pub async fn inspect(&self, token: &str, url: &str) -> Result<PreviewDescriptor> {
        self.process_invitation(token, url, true).await
    }

    /// Commits an invitation on the agent.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload cannot be
    /// classified.
    pub async fn process(&self, token: &str, url: &str) -> Result<PreviewDescriptor> {
        self.process_invitation(token, url, false).await
    }

    /// Submits `url` to the invitation processor.
    ///
    /// Prefer [`InvitationProcessor::inspect`] and
    /// [`InvitationProcessor::process`], which fix the flag.
    ///
    /// # Arguments
    ///
    /// * `token` - The access token
    /// * `url` - The invitation URL
    /// * `inspect` - `true` to preview only, `false` to commit
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The agency answers with an error status
    /// - The body is not JSON
    /// - The payload carries neither preview marker
    #[instrument(level = "debug", skip(self, token))]
    pub async fn process_invitation(
        &self,
        token: &str,
        url: &str,
        inspect: bool,
    ) -> Result<PreviewDescriptor> {
        let request = InvitationProcessRequest {
            url: url.to_string(),
            inspect,
        };

        let payload = self.api.invitations().process(token, &request).await?;
        let preview = PreviewDescriptor::from_json(payload)?;

        if inspect {
            debug!(id = preview.id(), kind = ?preview.kind(), "Inspected invitation");
        } else {
            info!(id = preview.id(), kind = ?preview.kind(), "Processed invitation");
        }
        Ok(preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{api, credential_preview_json, verification_preview_json};
    use diagency_core::PreviewKind;
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const PROCESSOR: &str = "/diagency/v1.0/diagency/invitation_processor";

    #[tokio::test]
    async fn test_inspect_does_not_commit() {
        let mock_server = MockServer::start().await;
        let offer = "https://issuer.example/offer/1";

        Mock::given(method("POST"))
            .and(path(PROCESSOR))
            .and(body_json(json!({"url": offer, "inspect": true})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(credential_preview_json("cred-1", offer)),
            )
            .expect(2)
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path(PROCESSOR))
            .and(body_json(json!({"url": offer, "inspect": false})))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&mock_server)
            .await;

        let api = api(&mock_server);
        let processor = InvitationProcessor::new(&api);

        let first = processor.inspect("token", offer).await.unwrap();
        let PreviewDescriptor::Credential(info) = &first else {
            panic!("expected a credential preview, got {first:?}");
        };
        assert_eq!(info.id, "cred-1");
        assert_eq!(info.label.as_deref(), Some("Employer"));

        let second = processor.inspect("token", offer).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_process_commits() {
        let mock_server = MockServer::start().await;
        let request = "https://verifier.example/proof/1";

        Mock::given(method("POST"))
            .and(path(PROCESSOR))
            .and(body_json(json!({"url": request, "inspect": false})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(verification_preview_json("v1", request)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = api(&mock_server);
        let preview = InvitationProcessor::new(&api)
            .process("token", request)
            .await
            .unwrap();
        assert_eq!(preview.kind(), PreviewKind::Verification);
        assert_eq!(preview.url(), request);
    }

    #[tokio::test]
    async fn test_unclassified_payload() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(PROCESSOR))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": "x", "url": "y"})),
            )
            .mount(&mock_server)
            .await;

        let api = api(&mock_server);
        let err = InvitationProcessor::new(&api)
            .inspect("token", "y")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Core(diagency_core::Error::UnknownFormat(_))
        ));
    }

    #[tokio::test]
    async fn test_error_status_propagates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(PROCESSOR))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "expired"})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let api = api(&mock_server);
        let err = InvitationProcessor::new(&api)
            .process("token", "https://issuer.example/offer/old")
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Api { status: 400, .. }));
    }
}
