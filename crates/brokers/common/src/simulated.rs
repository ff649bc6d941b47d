use async_trait::async_trait;
use chrono::Utc;
use mexcnode_core::*;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

/// Configuration for the simulated exchange.
#[derive(Debug, Clone)]
pub struct SimulatedExchangeConfig {
    /// Name reported in logs.
    pub name: String,
    /// Reject orders with a zero or negative quantity or price, like a real
    /// venue would.
    pub reject_non_positive: bool,
}

impl Default for SimulatedExchangeConfig {
    fn default() -> Self {
        Self {
            name: "simulated".to_string(),
            reject_non_positive: true,
        }
    }
}

#[derive(Debug, Default)]
struct SimulatedState {
    submitted: Vec<OrderRequest>,
    acknowledged: Vec<Value>,
    connections: Vec<String>,
    /// Submission index -> (code, message) to reject with.
    scripted_rejections: HashMap<usize, (i64, String)>,
    rejected_symbols: HashMap<String, (i64, String)>,
}

/// An in-memory spot exchange.
///
/// Acknowledges every order with a MEXC-shaped response and keeps a log of
/// what was submitted. Clones share the same log, so a test can hand one
/// clone to the node and inspect another afterwards.
#[derive(Debug, Clone)]
pub struct SimulatedExchange {
    config: SimulatedExchangeConfig,
    state: Arc<Mutex<SimulatedState>>,
}

impl Default for SimulatedExchange {
    fn default() -> Self {
        Self::new(SimulatedExchangeConfig::default())
    }
}

impl SimulatedExchange {
    pub fn new(config: SimulatedExchangeConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(SimulatedState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, SimulatedState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reject the n-th submission (zero-based) with the given error.
    pub fn reject_nth(&self, index: usize, code: i64, message: &str) {
        self.state()
            .scripted_rejections
            .insert(index, (code, message.to_string()));
    }

    /// Reject every order for a symbol.
    pub fn reject_symbol(&self, symbol: &str, code: i64, message: &str) {
        self.state()
            .rejected_symbols
            .insert(symbol.to_uppercase(), (code, message.to_string()));
    }

    /// Every order received so far, rejected ones included.
    pub fn submitted(&self) -> Vec<OrderRequest> {
        self.state().submitted.clone()
    }

    /// Every acknowledgement returned so far, in order.
    pub fn acknowledged(&self) -> Vec<Value> {
        self.state().acknowledged.clone()
    }

    /// API keys of every `connect` call, in order.
    pub fn connections(&self) -> Vec<String> {
        self.state().connections.clone()
    }

    /// Build the acknowledgement body for an accepted order.
    fn acknowledge(&self, request: &OrderRequest) -> Value {
        json!({
            "symbol": request.symbol(),
            "orderId": Uuid::new_v4().simple().to_string(),
            "orderListId": -1,
            "price": request.price().to_string(),
            "origQty": request.quantity().to_string(),
            "type": request.order_type().as_str(),
            "side": request.side().as_str(),
            "transactTime": Utc::now().timestamp_millis(),
        })
    }
}

#[async_trait]
impl SpotExchange for SimulatedExchange {
    fn name(&self) -> &str {
        &self.config.name
    }

    async fn new_order(&self, request: &OrderRequest) -> Result<Value, ExchangeError> {
        let mut state = self.state();
        let index = state.submitted.len();
        state.submitted.push(request.clone());

        let rejection = state
            .scripted_rejections
            .remove(&index)
            .or_else(|| state.rejected_symbols.get(request.symbol()).cloned());
        drop(state);

        if let Some((code, message)) = rejection {
            debug!(symbol = %request.symbol(), code, "Simulated rejection");
            return Err(ExchangeError::Rejected { code, message });
        }

        if self.config.reject_non_positive
            && (request.quantity() <= Decimal::ZERO || request.price() <= Decimal::ZERO)
        {
            return Err(ExchangeError::Rejected {
                code: 400,
                message: "quantity and price must be positive".to_string(),
            });
        }

        let ack = self.acknowledge(request);
        self.state().acknowledged.push(ack.clone());
        Ok(ack)
    }
}

impl ExchangeConnector for SimulatedExchange {
    fn connect(&self, credential: &Credential) -> Result<Box<dyn SpotExchange>, ExchangeError> {
        self.state().connections.push(credential.api_key.clone());
        Ok(Box::new(self.clone()))
    }
}
