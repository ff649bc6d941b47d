use async_trait::async_trait;
use mexcnode_core::*;
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, warn};

use crate::credentials::{MexcApi, MEXC_API_CREDENTIAL};
use crate::params::read_order_request;

/// Places one MEXC spot limit order per input item.
pub struct MexcNode {
    connector: Arc<dyn ExchangeConnector>,
}

impl MexcNode {
    pub fn new(connector: impl ExchangeConnector + 'static) -> Self {
        Self {
            connector: Arc::new(connector),
        }
    }

    pub fn with_connector(connector: Arc<dyn ExchangeConnector>) -> Self {
        Self { connector }
    }
}

/// Read parameters for one item and submit the order.
async fn trade(
    ctx: &dyn ExecuteFunctions,
    exchange: &dyn SpotExchange,
    item_index: usize,
) -> Result<Value, NodeError> {
    let request = read_order_request(ctx, item_index)?;
    info!(
        item = item_index,
        exchange = exchange.name(),
        symbol = %request.symbol(),
        side = request.side().as_str(),
        time_in_force = request.time_in_force().as_str(),
        "Submitting order"
    );
    Ok(exchange.new_order(&request).await?)
}

#[async_trait]
impl NodeType for MexcNode {
    fn description(&self) -> NodeTypeDescription {
        NodeTypeDescription {
            display_name: "Mexc".to_string(),
            name: "Mexc".to_string(),
            icon: "file:mexc-logo.svg".to_string(),
            group: vec!["utility".to_string()],
            version: 1,
            description: "Trade on Mexc".to_string(),
            defaults: NodeDefaults {
                name: "Mexc".to_string(),
            },
            inputs: vec!["main".to_string()],
            outputs: vec!["main".to_string()],
            credentials: vec![CredentialReference {
                name: MEXC_API_CREDENTIAL.to_string(),
                required: true,
            }],
            properties: vec![
                NodeProperty::string("Token Trading Pair", "symbol", "BTCUSDT")
                    .required()
                    .with_description("The token trading pair on MEXC"),
                NodeProperty::options(
                    "Trade Side",
                    "side",
                    "BUY",
                    vec![
                        PropertyOption::new("Buy", "BUY"),
                        PropertyOption::new("Sell", "SELL"),
                    ],
                ),
                NodeProperty::options(
                    "Order Type",
                    "type",
                    "LIMIT",
                    vec![PropertyOption::new("Limit", "LIMIT")],
                ),
                NodeProperty::options(
                    "Time in Force",
                    "timeInForce",
                    "GTC",
                    vec![
                        PropertyOption::new("Good Till Cancel", "GTC"),
                        PropertyOption::new("Immediate or Cancel", "IOC"),
                        PropertyOption::new("Fill or Kill", "FOK"),
                    ],
                ),
                NodeProperty::number("Quantity", "quantity", 1)
                    .with_description("The quantity of the order"),
                NodeProperty::number("Price", "price", 1)
                    .with_description("The price of the order"),
            ],
        }
    }

    async fn execute(&self, ctx: &dyn ExecuteFunctions) -> Result<NodeOutput, NodeOperationError> {
        let node = ctx.node_name().to_string();

        let data = ctx
            .credentials(MEXC_API_CREDENTIAL)
            .await
            .map_err(|e| NodeOperationError::new(&node, e))?;
        let credential = MexcApi::credential(&data).map_err(|e| NodeOperationError::new(&node, e))?;
        let exchange = self
            .connector
            .connect(&credential)
            .map_err(|e| NodeOperationError::new(&node, e.into()))?;

        let items = ctx.input_data();
        info!(node = %node, items = items.len(), "Executing node");

        let mut output = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            match trade(ctx, exchange.as_ref(), i).await {
                Ok(result) => output.push(NodeExecutionData::paired(result, i)),
                Err(e) if ctx.continue_on_fail() => {
                    warn!(node = %node, item = i, error = %e, "Item failed, continuing");
                    output.push(NodeExecutionData::failed(item.json.clone(), i, e.to_string()));
                }
                Err(e) => {
                    warn!(node = %node, item = i, error = %e, "Item failed, aborting");
                    return Err(NodeOperationError::at_item(&node, i, e));
                }
            }
        }

        Ok(vec![output])
    }
}
