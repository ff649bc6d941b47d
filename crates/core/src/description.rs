//! Declarative metadata a node or credential type hands to the workflow host.
//!
//! These types only describe fields and options; they serialize to the
//! camelCase JSON the host renders its editor from.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Kind of value a property holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyType {
    String,
    Number,
    Options,
}

/// One entry of a dropdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyOption {
    pub name: String,
    pub value: Value,
}

impl PropertyOption {
    pub fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: Value::String(value.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeOptions {
    /// Mask the value in the editor.
    #[serde(default)]
    pub password: bool,
}

/// A single user-facing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeProperty {
    pub display_name: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyType,
    pub default: Value,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<PropertyOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_options: Option<TypeOptions>,
}

impl NodeProperty {
    fn base(display_name: &str, name: &str, kind: PropertyType, default: Value) -> Self {
        Self {
            display_name: display_name.to_string(),
            name: name.to_string(),
            kind,
            default,
            required: false,
            description: None,
            options: Vec::new(),
            type_options: None,
        }
    }

    pub fn string(display_name: &str, name: &str, default: &str) -> Self {
        Self::base(
            display_name,
            name,
            PropertyType::String,
            Value::String(default.to_string()),
        )
    }

    pub fn number(display_name: &str, name: &str, default: i64) -> Self {
        Self::base(display_name, name, PropertyType::Number, Value::from(default))
    }

    pub fn options(
        display_name: &str,
        name: &str,
        default: &str,
        options: Vec<PropertyOption>,
    ) -> Self {
        let mut property = Self::base(
            display_name,
            name,
            PropertyType::Options,
            Value::String(default.to_string()),
        );
        property.options = options;
        property
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn password(mut self) -> Self {
        self.type_options = Some(TypeOptions { password: true });
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Whether `value` is one of the declared dropdown values.
    pub fn allows(&self, value: &Value) -> bool {
        self.kind != PropertyType::Options || self.options.iter().any(|o| &o.value == value)
    }
}

/// Reference from a node to a credential type it needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialReference {
    pub name: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefaults {
    pub name: String,
}

/// Everything the host needs to list, render, and wire up a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTypeDescription {
    pub display_name: String,
    pub name: String,
    pub icon: String,
    pub group: Vec<String>,
    pub version: u32,
    pub description: String,
    pub defaults: NodeDefaults,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub credentials: Vec<CredentialReference>,
    pub properties: Vec<NodeProperty>,
}

impl NodeTypeDescription {
    pub fn property(&self, name: &str) -> Option<&NodeProperty> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Schema of a host-managed credential.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialTypeDescription {
    pub name: String,
    pub display_name: String,
    pub documentation_url: String,
    pub properties: Vec<NodeProperty>,
}
