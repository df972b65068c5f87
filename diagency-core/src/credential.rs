//! Format-polymorphic credential records.
//!
//! A credential arrives as a flat JSON object whose `format` field selects one
//! of three variants. The discriminator is read before anything else and is the
//! only dispatch key; a missing or unknown `format` is an error, never a
//! default. Each variant then validates its own required fields.
//!
//! # Wire shape
//!
//! ```json
//! {
//!   "format": "indy",
//!   "id": "cred-1",
//!   "role": "holder",
//!   "state": "stored",
//!   "issuer_did": "did:sov:issuer",
//!   "cred_json": { "attrs": { "name": "Alice" } },
//!   "cred_def_id": "issuer:3:CL:1:default",
//!   "schema_name": "identity",
//!   "schema_version": "1.0",
//!   "connection": { ... },
//!   "properties": {}
//! }
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::{
    connection::ConnectionInfo,
    error::{Error, Result},
    state::{CredentialFormat, CredentialRole, CredentialState},
};

const FORMAT: &str = "format";
const ID: &str = "id";
const ROLE: &str = "role";
const STATE: &str = "state";
const ISSUER_DID: &str = "issuer_did";
const CRED_JSON: &str = "cred_json";
const CONNECTION: &str = "connection";
const PROPERTIES: &str = "properties";
const CRED_DEF_ID: &str = "cred_def_id";
const SCHEMA_NAME: &str = "schema_name";
const SCHEMA_VERSION: &str = "schema_version";
const DOC_TYPE: &str = "doc_type";

/// Fields shared by every credential format.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialDetails {
    /// Identifier, unique within a wallet.
    pub id: String,
    /// Which side of the exchange this agent is on.
    pub role: CredentialRole,
    /// Current exchange state.
    pub state: CredentialState,
    /// DID of the issuing agent.
    pub issuer_did: String,
    /// The claims payload. Its shape is format specific and is not inspected.
    pub json_representation: Value,
    /// The connection the credential was exchanged over.
    pub connection: ConnectionInfo,
    /// Issuer-specific metadata.
    pub properties: Map<String, Value>,
}

/// An Indy (`AnonCreds`) credential.
#[derive(Debug, Clone, PartialEq)]
pub struct IndyCredential {
    /// Shared credential fields.
    pub details: CredentialDetails,
    /// The credential definition the credential was issued against.
    pub credential_definition_id: String,
    /// Name of the underlying schema.
    pub schema_name: String,
    /// Version of the underlying schema.
    pub schema_version: String,
}

/// A W3C JSON-LD credential.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonLdCredential {
    /// Shared credential fields.
    pub details: CredentialDetails,
}

/// An ISO 18013-5 mobile document.
#[derive(Debug, Clone, PartialEq)]
pub struct MdocCredential {
    /// Shared credential fields.
    pub details: CredentialDetails,
    /// The mdoc document type, e.g. `org.iso.18013.5.1.mDL`.
    pub doc_type: Option<String>,
}

/// A credential held by (or offered to) the wallet.
#[derive(Debug, Clone, PartialEq)]
pub enum Credential {
    /// Indy credential.
    Indy(IndyCredential),
    /// JSON-LD credential.
    JsonLd(JsonLdCredential),
    /// mDoc credential.
    Mdoc(MdocCredential),
}

impl Credential {
    /// Decodes a credential from its wire JSON.
    ///
    /// # Errors
    ///
    /// - `MissingField` if `format` or any shared field is absent
    /// - `InvalidField` if `format`, `role` or `state` is not a known value, or
    ///   a field has the wrong JSON type
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| Error::InvalidField {
            field: "credential",
            value: value.to_string(),
        })?;

        let format = required_str(object, FORMAT)?;
        let format = CredentialFormat::decode(Some(format)).ok_or_else(|| Error::InvalidField {
            field: FORMAT,
            value: format.to_string(),
        })?;

        let credential = match format {
            CredentialFormat::Indy => Self::Indy(IndyCredential {
                details: CredentialDetails::from_json(object)?,
                credential_definition_id: optional_str(object, CRED_DEF_ID),
                schema_name: optional_str(object, SCHEMA_NAME),
                schema_version: optional_str(object, SCHEMA_VERSION),
            }),
            CredentialFormat::JsonLd => Self::JsonLd(JsonLdCredential {
                details: CredentialDetails::from_json(object)?,
            }),
            CredentialFormat::Mdoc => Self::Mdoc(MdocCredential {
                details: CredentialDetails::from_json(object)?,
                doc_type: object.get(DOC_TYPE).and_then(Value::as_str).map(str::to_string),
            }),
        };

        Ok(credential)
    }

    /// Encodes the credential to its wire JSON.
    ///
    /// Shared fields, `connection` and `properties` are always emitted, even
    /// when empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded connection cannot be serialized.
    pub fn to_json(&self) -> Result<Value> {
        let mut object = Map::new();
        object.insert(FORMAT.into(), Value::from(self.format().encode()));
        self.details().write_json(&mut object)?;

        match self {
            Self::Indy(indy) => {
                object.insert(CRED_DEF_ID.into(), Value::from(indy.credential_definition_id.clone()));
                object.insert(SCHEMA_NAME.into(), Value::from(indy.schema_name.clone()));
                object.insert(SCHEMA_VERSION.into(), Value::from(indy.schema_version.clone()));
            }
            Self::JsonLd(_) => {}
            Self::Mdoc(mdoc) => {
                if let Some(doc_type) = &mdoc.doc_type {
                    object.insert(DOC_TYPE.into(), Value::from(doc_type.clone()));
                }
            }
        }

        Ok(Value::Object(object))
    }

    /// The wire format of this credential.
    #[must_use]
    pub fn format(&self) -> CredentialFormat {
        match self {
            Self::Indy(_) => CredentialFormat::Indy,
            Self::JsonLd(_) => CredentialFormat::JsonLd,
            Self::Mdoc(_) => CredentialFormat::Mdoc,
        }
    }

    /// Fields shared by all formats.
    #[must_use]
    pub fn details(&self) -> &CredentialDetails {
        match self {
            Self::Indy(c) => &c.details,
            Self::JsonLd(c) => &c.details,
            Self::Mdoc(c) => &c.details,
        }
    }

    /// The credential identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.details().id
    }

    /// The current exchange state.
    #[must_use]
    pub fn state(&self) -> CredentialState {
        self.details().state
    }

    /// Returns true when the credential has been received and persisted.
    #[must_use]
    pub fn is_stored(&self) -> bool {
        self.state() == CredentialState::Stored
    }
}

impl CredentialDetails {
    fn from_json(object: &Map<String, Value>) -> Result<Self> {
        let id = required_str(object, ID)?.to_string();

        let role = required_str(object, ROLE)?;
        let role = CredentialRole::decode(Some(role)).ok_or_else(|| Error::InvalidField {
            field: ROLE,
            value: role.to_string(),
        })?;

        let state = required_str(object, STATE)?;
        let state = CredentialState::decode(Some(state)).ok_or_else(|| Error::InvalidField {
            field: STATE,
            value: state.to_string(),
        })?;

        let issuer_did = required_str(object, ISSUER_DID)?.to_string();
        let json_representation = required(object, CRED_JSON)?.clone();
        let connection = ConnectionInfo::deserialize(required(object, CONNECTION)?)?;

        let properties = match required(object, PROPERTIES)? {
            Value::Object(properties) => properties.clone(),
            other => {
                return Err(Error::InvalidField {
                    field: PROPERTIES,
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            id,
            role,
            state,
            issuer_did,
            json_representation,
            connection,
            properties,
        })
    }

    fn write_json(&self, object: &mut Map<String, Value>) -> Result<()> {
        object.insert(ID.into(), Value::from(self.id.clone()));
        object.insert(ROLE.into(), Value::from(self.role.encode()));
        object.insert(STATE.into(), Value::from(self.state.encode()));
        object.insert(ISSUER_DID.into(), Value::from(self.issuer_did.clone()));
        object.insert(CRED_JSON.into(), self.json_representation.clone());
        object.insert(CONNECTION.into(), serde_json::to_value(&self.connection)?);
        object.insert(PROPERTIES.into(), Value::Object(self.properties.clone()));
        Ok(())
    }
}

/// Returns the value of `field`, treating JSON `null` as absent.
fn required<'a>(object: &'a Map<String, Value>, field: &'static str) -> Result<&'a Value> {
    match object.get(field) {
        None | Some(Value::Null) => Err(Error::MissingField(field)),
        Some(value) => Ok(value),
    }
}

fn required_str<'a>(object: &'a Map<String, Value>, field: &'static str) -> Result<&'a str> {
    let value = required(object, field)?;
    value.as_str().ok_or_else(|| Error::InvalidField {
        field,
        value: value.to_string(),
    })
}

fn optional_str(object: &Map<String, Value>, field: &str) -> String {
    object
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

impl Serialize for Credential {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Credential {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Value> for Credential {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_json(&value)
    }
}

/// Body of `PATCH credentials/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialUpdate {
    /// The requested state.
    pub state: CredentialState,
    /// Properties to merge into the credential record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
}

impl CredentialUpdate {
    /// Creates an update that only changes the state.
    #[must_use]
    pub fn new(state: CredentialState) -> Self {
        Self {
            state,
            properties: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{connection_json, credential_json};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_indy_deserialization() {
        let credential = Credential::from_json(&credential_json("indy", "cred-1", "STORED")).unwrap();

        let Credential::Indy(indy) = &credential else {
            panic!("expected an indy credential, got {credential:?}");
        };
        assert_eq!(indy.credential_definition_id, "issuer:3:CL:12:default");
        assert_eq!(indy.schema_name, "identity");
        assert_eq!(indy.schema_version, "1.0");
        assert_eq!(credential.id(), "cred-1");
        assert!(credential.is_stored());
        assert_eq!(credential.details().role, CredentialRole::Holder);
    }

    #[test]
    fn test_indy_fields_default_to_empty() {
        let mut payload = credential_json("indy", "cred-2", "issued");
        let object = payload.as_object_mut().unwrap();
        object.remove(CRED_DEF_ID);
        object.remove(SCHEMA_NAME);
        object.remove(SCHEMA_VERSION);

        let Credential::Indy(indy) = Credential::from_json(&payload).unwrap() else {
            panic!("expected an indy credential");
        };
        assert_eq!(indy.credential_definition_id, "");
        assert_eq!(indy.schema_name, "");
        assert_eq!(indy.schema_version, "");
    }

    #[test]
    fn test_format_dispatch() {
        let jsonld = Credential::from_json(&credential_json("JSONLD", "a", "stored")).unwrap();
        assert_eq!(jsonld.format(), CredentialFormat::JsonLd);

        let mut mdoc = credential_json("mso_mdoc", "b", "stored");
        mdoc[DOC_TYPE] = json!("org.iso.18013.5.1.mDL");
        let Credential::Mdoc(mdoc) = Credential::from_json(&mdoc).unwrap() else {
            panic!("expected an mdoc credential");
        };
        assert_eq!(mdoc.doc_type.as_deref(), Some("org.iso.18013.5.1.mDL"));
    }

    #[test]
    fn test_missing_format_is_an_error() {
        let mut payload = credential_json("indy", "cred-1", "stored");
        payload.as_object_mut().unwrap().remove(FORMAT);

        let err = Credential::from_json(&payload).unwrap_err();
        assert!(matches!(err, Error::MissingField("format")));
    }

    #[test]
    fn test_unknown_format_is_an_error() {
        let payload = credential_json("bbs", "cred-1", "stored");
        let err = Credential::from_json(&payload).unwrap_err();
        assert!(matches!(err, Error::InvalidField { field: "format", .. }));
    }

    #[test]
    fn test_missing_shared_fields() {
        for field in [ID, ROLE, STATE, ISSUER_DID, CRED_JSON, CONNECTION, PROPERTIES] {
            for format in ["indy", "jsonld", "mso_mdoc"] {
                let mut payload = credential_json(format, "cred-1", "stored");
                payload.as_object_mut().unwrap().remove(field);

                match Credential::from_json(&payload) {
                    Err(Error::MissingField(missing)) => assert_eq!(missing, field),
                    other => panic!("expected missing {field} for {format}, got {other:?}"),
                }
            }
        }
    }

    #[test]
    fn test_null_counts_as_missing() {
        let mut payload = credential_json("jsonld", "cred-1", "stored");
        payload[CRED_JSON] = Value::Null;
        assert!(matches!(
            Credential::from_json(&payload),
            Err(Error::MissingField("cred_json"))
        ));
    }

    #[test]
    fn test_serialization_is_stable() {
        for format in ["INDY", "jsonld", "mso_mdoc"] {
            let first = Credential::from_json(&credential_json(format, "cred-1", "Stored")).unwrap();
            let encoded = first.to_json().unwrap();
            let second = Credential::from_json(&encoded).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_serialization_keeps_empty_bags() {
        let mut payload = credential_json("jsonld", "cred-1", "stored");
        payload[PROPERTIES] = json!({});

        let encoded = Credential::from_json(&payload).unwrap().to_json().unwrap();
        assert_eq!(encoded[PROPERTIES], json!({}));
        assert_eq!(encoded[CONNECTION]["id"], connection_json()["id"]);
        assert_eq!(encoded[FORMAT], json!("jsonld"));
        assert_eq!(encoded[STATE], json!("stored"));
    }

    #[test]
    fn test_serde_impls() {
        let payload = credential_json("indy", "cred-1", "accepted");
        let credential: Credential = serde_json::from_value(payload).unwrap();
        assert_eq!(credential.state(), CredentialState::Accepted);

        let text = serde_json::to_string(&credential).unwrap();
        assert!(text.contains("\"schema_name\":\"identity\""));

        let list: Vec<Credential> =
            serde_json::from_value(json!([credential_json("jsonld", "x", "stored")])).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_credential_update_body() {
        let update = CredentialUpdate::new(CredentialState::Accepted);
        assert_eq!(serde_json::to_value(update).unwrap(), json!({"state": "accepted"}));
    }
}
