use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error annotation attached to an item when the node continues on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemError {
    pub message: String,
    pub item_index: usize,
}

/// One unit of workflow data flowing into or out of a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeExecutionData {
    pub json: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ItemError>,
    /// Index of the input item this entry was produced from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paired_item: Option<usize>,
}

impl NodeExecutionData {
    pub fn new(json: Value) -> Self {
        Self {
            json,
            error: None,
            paired_item: None,
        }
    }

    pub fn paired(json: Value, item_index: usize) -> Self {
        Self {
            json,
            error: None,
            paired_item: Some(item_index),
        }
    }

    /// An input item carried through to the output with an error attached.
    pub fn failed(json: Value, item_index: usize, message: impl Into<String>) -> Self {
        Self {
            json,
            error: Some(ItemError {
                message: message.into(),
                item_index,
            }),
            paired_item: Some(item_index),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Node output: one list of items per output connector.
pub type NodeOutput = Vec<Vec<NodeExecutionData>>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_item_round_trips_host_shape() {
        let item: NodeExecutionData = serde_json::from_value(json!({ "json": { "a": 1 } })).unwrap();
        assert_eq!(item.json, json!({ "a": 1 }));
        assert!(!item.is_error());
        assert_eq!(serde_json::to_value(&item).unwrap(), json!({ "json": { "a": 1 } }));
    }

    #[test]
    fn test_failed_item_serializes_annotation() {
        let item = NodeExecutionData::failed(json!({ "symbol": "x" }), 2, "boom");
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["error"]["message"], "boom");
        assert_eq!(value["error"]["itemIndex"], 2);
        assert_eq!(value["pairedItem"], 2);
    }
}
