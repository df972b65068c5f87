//! Classification of invitation previews.
//!
//! Invitation payloads carry no type field, so a payload is classified by
//! looking for the attachment marker of each protocol in its JSON text. The
//! marker literals are part of the wire contract with the agency; changing them
//! breaks compatibility.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// Attachment key present in presentation (proof) requests.
pub const VERIFICATION_MARKER: &str = "request_presentations~attach";

/// Attachment key present in credential offers and connection invitations.
pub const CREDENTIAL_MARKER: &str = "requests~attach";

/// Preview of a credential offer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialPreviewInfo {
    /// The offer identifier (the credential id on the agent).
    pub id: String,
    /// The invitation URL to process when accepting.
    pub url: String,
    /// Issuer supplied label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Issuer supplied comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// The complete payload as received.
    #[serde(skip)]
    pub json_representation: Value,
}

/// Preview of a verification (proof) request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationPreviewInfo {
    /// The request identifier (the verification id on the agent).
    pub id: String,
    /// The invitation URL to process when generating the proof.
    pub url: String,
    /// Verifier supplied label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Verifier supplied comment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    /// The complete payload as received.
    #[serde(skip)]
    pub json_representation: Value,
}

/// A classified invitation preview.
#[derive(Debug, Clone, PartialEq)]
pub enum PreviewDescriptor {
    /// A credential offer.
    Credential(CredentialPreviewInfo),
    /// A verification request.
    Verification(VerificationPreviewInfo),
}

/// The kind of invitation a payload holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    /// Credential offer or connection invitation.
    Credential,
    /// Presentation (proof) request.
    Verification,
}

/// Classifies raw invitation JSON text by its attachment marker.
///
/// A payload carrying both markers classifies as a verification.
///
/// # Errors
///
/// Returns `UnknownFormat` if neither marker is present.
pub fn classify(raw: &str) -> Result<PreviewKind> {
    if raw.contains(VERIFICATION_MARKER) {
        Ok(PreviewKind::Verification)
    } else if raw.contains(CREDENTIAL_MARKER) {
        Ok(PreviewKind::Credential)
    } else {
        Err(Error::UnknownFormat(truncate(raw)))
    }
}

impl PreviewDescriptor {
    /// Classifies and decodes an invitation payload.
    ///
    /// # Errors
    ///
    /// - `UnknownFormat` if the payload carries neither marker
    /// - a serialization error if `id` or `url` is missing
    pub fn from_json(value: Value) -> Result<Self> {
        let kind = classify(&value.to_string())?;
        debug!(?kind, "Classified invitation preview");

        let descriptor = match kind {
            PreviewKind::Credential => {
                let mut info = CredentialPreviewInfo::deserialize(&value)?;
                info.json_representation = value;
                Self::Credential(info)
            }
            PreviewKind::Verification => {
                let mut info = VerificationPreviewInfo::deserialize(&value)?;
                info.json_representation = value;
                Self::Verification(info)
            }
        };
        Ok(descriptor)
    }

    /// Parses and classifies raw invitation JSON text.
    ///
    /// # Errors
    ///
    /// Fails if the text is not JSON or cannot be classified.
    pub fn from_text(raw: &str) -> Result<Self> {
        classify(raw)?;
        Self::from_json(serde_json::from_str(raw)?)
    }

    /// The preview identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Credential(info) => &info.id,
            Self::Verification(info) => &info.id,
        }
    }

    /// The invitation URL.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            Self::Credential(info) => &info.url,
            Self::Verification(info) => &info.url,
        }
    }

    /// The kind of invitation.
    #[must_use]
    pub fn kind(&self) -> PreviewKind {
        match self {
            Self::Credential(_) => PreviewKind::Credential,
            Self::Verification(_) => PreviewKind::Verification,
        }
    }

    /// The payload as received.
    #[must_use]
    pub fn json_representation(&self) -> &Value {
        match self {
            Self::Credential(info) => &info.json_representation,
            Self::Verification(info) => &info.json_representation,
        }
    }
}

fn truncate(raw: &str) -> String {
    raw.chars().take(64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_markers() {
        assert_eq!(
            classify(r#"{"request_presentations~attach": []}"#).unwrap(),
            PreviewKind::Verification
        );
        assert_eq!(
            classify(r#"{"requests~attach": []}"#).unwrap(),
            PreviewKind::Credential
        );
        assert!(matches!(
            classify(r#"{"offers~attach": []}"#),
            Err(Error::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_marker_anywhere_in_payload() {
        let nested = json!({
            "id": "v1",
            "url": "https://agency.example/v1",
            "info": {"request": {"request_presentations~attach": [{"@id": "libindy"}]}}
        });
        assert_eq!(classify(&nested.to_string()).unwrap(), PreviewKind::Verification);
    }

    #[test]
    fn test_credential_preview() {
        let payload = json!({
            "id": "cred-1",
            "url": "https://agency.example/offer",
            "label": "Employer",
            "requests~attach": [{"@id": "0"}]
        });

        let descriptor = PreviewDescriptor::from_json(payload.clone()).unwrap();
        let PreviewDescriptor::Credential(info) = &descriptor else {
            panic!("expected a credential preview, got {descriptor:?}");
        };
        assert_eq!(info.label.as_deref(), Some("Employer"));
        assert_eq!(info.comment, None);
        assert_eq!(descriptor.json_representation(), &payload);
        assert_eq!(descriptor.url(), "https://agency.example/offer");
    }

    #[test]
    fn test_verification_preview_from_text() {
        let raw = r#"{"id":"v1","url":"https://agency.example/proof","request_presentations~attach":[]}"#;
        let descriptor = PreviewDescriptor::from_text(raw).unwrap();
        assert_eq!(descriptor.kind(), PreviewKind::Verification);
        assert_eq!(descriptor.id(), "v1");
    }

    #[test]
    fn test_unclassified_preview() {
        let err = PreviewDescriptor::from_json(json!({"id": "x", "url": "y"})).unwrap_err();
        assert!(matches!(err, Error::UnknownFormat(_)));
    }

    #[test]
    fn test_preview_requires_url() {
        let result = PreviewDescriptor::from_json(json!({"id": "x", "requests~attach": []}));
        assert!(matches!(result, Err(Error::Serialization(_))));
    }
}
