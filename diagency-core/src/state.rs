//! Wire-string backed state and role enumerations.
//!
//! Every enumeration here is declared from a single static table mapping the
//! canonical (lowercase) wire string to its variant. Decoding is
//! case-insensitive and total: `None` or an unrecognised string decodes to
//! `None`. Encoding always yields the canonical lowercase form.
//!
//! Serde uses the same table, so a state embedded in a larger payload accepts
//! any casing and is always written back in canonical form.
//!
//! # Examples
//!
//! ```rust
//! use diagency_core::state::ConnectionState;
//!
//! assert_eq!(ConnectionState::decode(Some("CONNECTED")), Some(ConnectionState::Connected));
//! assert_eq!(ConnectionState::decode(Some("garbage")), None);
//! assert_eq!(ConnectionState::Connected.encode(), "connected");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Wire string to variant table. Keys are lowercase.
            pub const VALUES: &'static [(&'static str, $name)] = &[
                $( ($wire, $name::$variant), )+
            ];

            /// Decodes a wire string, ignoring ASCII case.
            ///
            /// Returns `None` for `None` or for any string outside the value set.
            #[must_use]
            pub fn decode(raw: Option<&str>) -> Option<Self> {
                let raw = raw?;
                Self::VALUES
                    .iter()
                    .find(|(wire, _)| wire.eq_ignore_ascii_case(raw))
                    .map(|(_, value)| *value)
            }

            /// Returns the canonical lowercase wire string.
            #[must_use]
            pub const fn encode(self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.encode())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::decode(Some(s)).ok_or_else(|| Error::InvalidField {
                    field: stringify!($name),
                    value: s.to_string(),
                })
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.encode())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::decode(Some(&raw)).ok_or_else(|| {
                    serde::de::Error::custom(format!(
                        "unknown {} value: {raw}",
                        stringify!($name)
                    ))
                })
            }
        }
    };
}

wire_enum! {
    /// State of a pairwise connection with a remote agent.
    ConnectionState {
        /// An invitation has been received and not yet acted upon.
        InboundInvitation => "inbound_invitation",
        /// This wallet has committed to the connection offer.
        OutboundOffer => "outbound_offer",
        /// The remote agent has offered the connection.
        InboundOffer => "inbound_offer",
        /// The DID exchange response has been sent.
        DidExchangeResponseSent => "did_exchange_response_sent",
        /// The connection is established.
        Connected => "connected",
        /// The connection was rejected.
        Rejected => "rejected",
    }
}

wire_enum! {
    /// State of a credential exchange.
    CredentialState {
        /// This wallet has sent an offer.
        OutboundOffer => "outbound_offer",
        /// An offer has been received.
        InboundOffer => "inbound_offer",
        /// The holder accepted the offer.
        Accepted => "accepted",
        /// The holder rejected the offer.
        Rejected => "rejected",
        /// The issuer has issued the credential.
        Issued => "issued",
        /// The credential is received and persisted by the agent.
        Stored => "stored",
        /// The exchange failed.
        Failed => "failed",
        /// The credential was deleted.
        Deleted => "deleted",
    }
}

wire_enum! {
    /// State of a verification (proof) exchange.
    VerificationState {
        /// A verification request was sent by this agent.
        OutboundVerificationRequest => "outbound_verification_request",
        /// A verification request was received.
        InboundVerificationRequest => "inbound_verification_request",
        /// A proof request was sent by this agent.
        OutboundProofRequest => "outbound_proof_request",
        /// A proof request was received.
        InboundProofRequest => "inbound_proof_request",
        /// The holder generated a proof.
        ProofGenerated => "proof_generated",
        /// The holder shared the generated proof.
        ProofShared => "proof_shared",
        /// The verifier accepted the proof.
        Passed => "passed",
        /// The proof was rejected or verification failed.
        Failed => "failed",
        /// The verification was deleted.
        Deleted => "deleted",
    }
}

wire_enum! {
    /// Which side of a connection this agent is on.
    ConnectionRole {
        /// The agent created the invitation.
        Inviter => "inviter",
        /// The agent accepted an invitation.
        Invitee => "invitee",
    }
}

wire_enum! {
    /// Which side of a credential exchange this agent is on.
    CredentialRole {
        /// The issuing agent.
        Issuer => "issuer",
        /// The receiving agent.
        Holder => "holder",
    }
}

wire_enum! {
    /// Which side of a verification this agent is on.
    VerificationRole {
        /// The requesting agent.
        Verifier => "verifier",
        /// The agent presenting the proof.
        Prover => "prover",
    }
}

wire_enum! {
    /// Credential wire format discriminator.
    CredentialFormat {
        /// Hyperledger Indy (AnonCreds) credential.
        Indy => "indy",
        /// W3C JSON-LD verifiable credential.
        JsonLd => "jsonld",
        /// ISO 18013-5 mobile document.
        Mdoc => "mso_mdoc",
    }
}

/// Wallets list `passed` verifications unless configured otherwise.
impl Default for VerificationState {
    fn default() -> Self {
        Self::Passed
    }
}
