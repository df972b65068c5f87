//! Data model for a digital-credential exchange wallet.
//!
//! This crate holds the records exchanged with a diagency agent: connections,
//! format-polymorphic credentials, verifications, invitations and previews,
//! together with the state machines that govern them.
//!
//! # Architecture
//!
//! - `state`: wire-string backed state and role enumerations
//! - `connection`: pairwise connection records
//! - `credential`: the Indy / JSON-LD / mDoc credential union and its codec
//! - `verification`: proof request records
//! - `preview`: content-based classification of invitation previews
//! - `types`: agent, invitation and list envelope records
//! - `error`: error types
//!
//! # Examples
//!
//! ```rust
//! use diagency_core::{Credential, CredentialState};
//! use serde_json::json;
//!
//! let credential = Credential::from_json(&json!({
//!     "format": "jsonld",
//!     "id": "cred-1",
//!     "role": "holder",
//!     "state": "stored",
//!     "issuer_did": "did:example:issuer",
//!     "cred_json": {},
//!     "connection": {
//!         "id": "conn-1",
//!         "state": "connected",
//!         "role": "invitee",
//!         "local": {},
//!         "remote": {}
//!     },
//!     "properties": {}
//! }))?;
//! assert_eq!(credential.state(), CredentialState::Stored);
//! # Ok::<(), diagency_core::Error>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod connection;
pub mod credential;
pub mod error;
pub mod preview;
pub mod state;
pub mod types;
pub mod verification;


pub use connection::{ConnectionAgentInfo, ConnectionInfo, ConnectionUpdate};
pub use credential::{
    Credential, CredentialDetails, CredentialUpdate, IndyCredential, JsonLdCredential,
    MdocCredential,
};
pub use error::{Error, Result};
pub use preview::{
    classify, CredentialPreviewInfo, PreviewDescriptor, PreviewKind, VerificationPreviewInfo,
    CREDENTIAL_MARKER, VERIFICATION_MARKER,
};
pub use state::{
    ConnectionRole, ConnectionState, CredentialFormat, CredentialRole, CredentialState,
    VerificationRole, VerificationState,
};
pub use types::{AgentInfo, InvitationInfo, InvitationProcessRequest, ListResponse};
pub use verification::{VerificationInfo, VerificationUpdate};
