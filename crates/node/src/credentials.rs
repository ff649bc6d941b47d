use mexcnode_core::*;
use serde_json::Value;

/// Credential type name the node asks the host for.
pub const MEXC_API_CREDENTIAL: &str = "mexcApi";

pub const API_KEY_FIELD: &str = "mexcApiKey";
pub const SECRET_KEY_FIELD: &str = "mexcSecretKey";

/// MEXC API key pair, stored and encrypted by the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct MexcApi;

impl MexcApi {
    /// Pull the key pair out of decrypted credential data.
    pub fn credential(data: &CredentialData) -> Result<Credential, NodeError> {
        Ok(Credential::new(
            required_field(data, API_KEY_FIELD)?,
            required_field(data, SECRET_KEY_FIELD)?,
        ))
    }
}

fn required_field(data: &CredentialData, field: &str) -> Result<String, NodeError> {
    match data.get(field) {
        Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
        Some(Value::String(_)) | Some(Value::Null) | None => Err(NodeError::Credentials(format!(
            "'{}' is missing from the {} credentials",
            field, MEXC_API_CREDENTIAL
        ))),
        Some(_) => Err(NodeError::Credentials(format!("'{}' must be a string", field))),
    }
}

impl CredentialType for MexcApi {
    fn description(&self) -> CredentialTypeDescription {
        CredentialTypeDescription {
            name: MEXC_API_CREDENTIAL.to_string(),
            display_name: "MEXC API".to_string(),
            documentation_url: "https://github.com/glazec/n8n-nodes-mexc".to_string(),
            properties: vec![
                NodeProperty::string("API Key", API_KEY_FIELD, "")
                    .password()
                    .required()
                    .with_description("API Key for MEXC"),
                NodeProperty::string("Secret Key", SECRET_KEY_FIELD, "")
                    .password()
                    .required()
                    .with_description("API Secret for MEXC"),
            ],
        }
    }
}
