use crate::description::*;
use crate::errors::*;
use crate::items::*;
use crate::models::*;
use async_trait::async_trait;
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Exchange Traits
// ---------------------------------------------------------------------------

/// A spot exchange that accepts orders.
#[async_trait]
pub trait SpotExchange: Send + Sync {
    /// Short exchange name for logs.
    fn name(&self) -> &str;

    /// Submit an order and return the exchange's raw acknowledgement.
    async fn new_order(&self, request: &OrderRequest) -> Result<Value, ExchangeError>;
}

/// Builds an authenticated exchange client from a credential.
pub trait ExchangeConnector: Send + Sync {
    fn connect(&self, credential: &Credential) -> Result<Box<dyn SpotExchange>, ExchangeError>;
}

// ---------------------------------------------------------------------------
// Host Traits
// ---------------------------------------------------------------------------

/// Decrypted credential fields as handed over by the host.
pub type CredentialData = Map<String, Value>;

/// What the host exposes to a node while it executes.
#[async_trait]
pub trait ExecuteFunctions: Send + Sync {
    /// Name of the node instance in the workflow.
    fn node_name(&self) -> &str;

    /// Items arriving on the main input.
    fn input_data(&self) -> &[NodeExecutionData];

    /// Resolve a parameter for a given item.
    fn node_parameter(&self, name: &str, item_index: usize) -> Result<Value, NodeError>;

    /// Fetch the decrypted credential of the given type.
    async fn credentials(&self, credential_type: &str) -> Result<CredentialData, NodeError>;

    /// Whether item failures should be recorded instead of aborting.
    fn continue_on_fail(&self) -> bool {
        false
    }
}

/// A node the host can describe and run.
#[async_trait]
pub trait NodeType: Send + Sync {
    fn description(&self) -> NodeTypeDescription;

    async fn execute(&self, ctx: &dyn ExecuteFunctions) -> Result<NodeOutput, NodeOperationError>;
}

/// A credential schema the host stores values for.
pub trait CredentialType: Send + Sync {
    fn description(&self) -> CredentialTypeDescription;
}
