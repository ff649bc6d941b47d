use async_trait::async_trait;
use mexcnode_core::*;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// In-process stand-in for the workflow host.
///
/// Parameters resolve per item in this order: a node-level parameter set with
/// `with_parameter`, then a field of the same name on the item's json, then
/// the property default from the node description. An explicit parameter
/// always wins over item data.
pub struct LocalExecution {
    node_name: String,
    description: NodeTypeDescription,
    items: Vec<NodeExecutionData>,
    parameters: Map<String, Value>,
    credentials: HashMap<String, CredentialData>,
    continue_on_fail: bool,
    credential_fetches: AtomicUsize,
}

impl LocalExecution {
    pub fn new(description: NodeTypeDescription, items: Vec<NodeExecutionData>) -> Self {
        Self {
            node_name: description.defaults.name.clone(),
            description,
            items,
            parameters: Map::new(),
            credentials: HashMap::new(),
            continue_on_fail: false,
            credential_fetches: AtomicUsize::new(0),
        }
    }

    pub fn with_node_name(mut self, name: &str) -> Self {
        self.node_name = name.to_string();
        self
    }

    pub fn with_parameter(mut self, name: &str, value: Value) -> Self {
        self.parameters.insert(name.to_string(), value);
        self
    }

    pub fn with_credentials(mut self, credential_type: &str, data: CredentialData) -> Self {
        self.credentials.insert(credential_type.to_string(), data);
        self
    }

    pub fn with_continue_on_fail(mut self, continue_on_fail: bool) -> Self {
        self.continue_on_fail = continue_on_fail;
        self
    }

    /// How many times the node asked for credentials.
    pub fn credential_fetches(&self) -> usize {
        self.credential_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecuteFunctions for LocalExecution {
    fn node_name(&self) -> &str {
        &self.node_name
    }

    fn input_data(&self) -> &[NodeExecutionData] {
        &self.items
    }

    fn node_parameter(&self, name: &str, item_index: usize) -> Result<Value, NodeError> {
        let item = self.items.get(item_index).ok_or_else(|| {
            NodeError::parameter(name, format!("no input item at index {}", item_index))
        })?;

        if let Some(value) = self.parameters.get(name) {
            return Ok(value.clone());
        }
        if let Some(value) = item.json.get(name) {
            return Ok(value.clone());
        }
        self.description
            .property(name)
            .map(|p| p.default.clone())
            .ok_or_else(|| NodeError::parameter(name, "unknown parameter"))
    }

    async fn credentials(&self, credential_type: &str) -> Result<CredentialData, NodeError> {
        self.credential_fetches.fetch_add(1, Ordering::SeqCst);
        debug!(credential_type, "Credentials requested");
        self.credentials.get(credential_type).cloned().ok_or_else(|| {
            NodeError::Credentials(format!("no credentials of type '{}' configured", credential_type))
        })
    }

    fn continue_on_fail(&self) -> bool {
        self.continue_on_fail
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn description() -> NodeTypeDescription {
        NodeTypeDescription {
            display_name: "Test".to_string(),
            name: "test".to_string(),
            icon: String::new(),
            group: vec![],
            version: 1,
            description: String::new(),
            defaults: NodeDefaults {
                name: "Test".to_string(),
            },
            inputs: vec!["main".to_string()],
            outputs: vec!["main".to_string()],
            credentials: vec![],
            properties: vec![NodeProperty::string("Symbol", "symbol", "BTCUSDT")],
        }
    }

    #[test]
    fn test_parameter_resolution_order() {
        let items = vec![
            NodeExecutionData::new(json!({ "symbol": "ethusdt" })),
            NodeExecutionData::new(json!({})),
        ];
        let exec = LocalExecution::new(description(), items.clone());
        assert_eq!(exec.node_parameter("symbol", 0).unwrap(), json!("ethusdt"));
        assert_eq!(exec.node_parameter("symbol", 1).unwrap(), json!("BTCUSDT"));

        let exec = LocalExecution::new(description(), items).with_parameter("symbol", json!("mxusdt"));
        assert_eq!(exec.node_parameter("symbol", 0).unwrap(), json!("mxusdt"));
        assert_eq!(exec.node_parameter("symbol", 1).unwrap(), json!("mxusdt"));
    }

    #[test]
    fn test_unknown_parameter_and_index() {
        let exec = LocalExecution::new(description(), vec![NodeExecutionData::new(json!({}))]);
        assert!(exec.node_parameter("nope", 0).is_err());
        assert!(exec.node_parameter("symbol", 5).is_err());
    }

    #[tokio::test]
    async fn test_credentials_are_counted() {
        let exec = LocalExecution::new(description(), vec![])
            .with_credentials("mexcApi", Map::new());
        assert!(exec.credentials("mexcApi").await.is_ok());
        assert!(exec.credentials("other").await.is_err());
        assert_eq!(exec.credential_fetches(), 2);
    }
}
