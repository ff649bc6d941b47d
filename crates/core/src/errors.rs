// ---------------------------------------------------------------------------
// Exchange errors
// ---------------------------------------------------------------------------

/// Errors that can occur while talking to the exchange.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("Order rejected ({code}): {message}")]
    Rejected { code: i64, message: String },
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Invalid exchange response: {0}")]
    Parse(String),
    #[error("Exchange error: {0}")]
    Other(String),
}

// ---------------------------------------------------------------------------
// Node errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong while the node handles one item.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    #[error(transparent)]
    Exchange(#[from] ExchangeError),
    #[error("Invalid parameter '{name}': {message}")]
    Parameter { name: String, message: String },
    #[error("Credentials error: {0}")]
    Credentials(String),
}

impl NodeError {
    pub fn parameter(name: &str, message: impl Into<String>) -> Self {
        NodeError::Parameter {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

/// A fatal error for a whole node execution.
///
/// `item_index` is fixed when the error is built: `at_item` for failures
/// while processing an item, `new` for failures before the item loop (such as
/// missing credentials).
#[derive(Debug, thiserror::Error)]
#[error("{node}: {source}")]
pub struct NodeOperationError {
    pub node: String,
    pub item_index: Option<usize>,
    #[source]
    pub source: NodeError,
}

impl NodeOperationError {
    pub fn new(node: &str, source: NodeError) -> Self {
        Self {
            node: node.to_string(),
            item_index: None,
            source,
        }
    }

    pub fn at_item(node: &str, item_index: usize, source: NodeError) -> Self {
        Self {
            node: node.to_string(),
            item_index: Some(item_index),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_error_carries_index() {
        let err = NodeOperationError::at_item(
            "Mexc",
            3,
            ExchangeError::Rejected {
                code: 30004,
                message: "Insufficient position".to_string(),
            }
            .into(),
        );
        assert_eq!(err.item_index, Some(3));
        assert_eq!(
            err.to_string(),
            "Mexc: Order rejected (30004): Insufficient position"
        );
    }

    #[test]
    fn test_setup_error_has_no_index() {
        let err = NodeOperationError::new("Mexc", NodeError::Credentials("missing".into()));
        assert_eq!(err.item_index, None);
    }
}
