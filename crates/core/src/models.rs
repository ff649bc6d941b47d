use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

/// The type of order. Only limit orders are placed by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    Limit,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Limit => "LIMIT",
        }
    }
}

/// How long an unfilled order stays on the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeInForce {
    /// Good till cancel.
    Gtc,
    /// Immediate or cancel.
    Ioc,
    /// Fill or kill.
    Fok,
}

impl TimeInForce {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Gtc => "GTC",
            TimeInForce::Ioc => "IOC",
            TimeInForce::Fok => "FOK",
        }
    }
}

/// A spot order ready to be sent to the exchange.
///
/// Built once per workflow item and never modified afterwards. The symbol is
/// upper-cased on construction, so `ethusdt` and `EthUsdt` both submit as
/// `ETHUSDT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    symbol: String,
    side: Side,
    #[serde(rename = "type")]
    order_type: OrderType,
    time_in_force: TimeInForce,
    quantity: Decimal,
    price: Decimal,
}

impl OrderRequest {
    pub fn new(
        symbol: &str,
        side: Side,
        order_type: OrderType,
        time_in_force: TimeInForce,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            side,
            order_type,
            time_in_force,
            quantity,
            price,
        }
    }

    /// Create a new limit order.
    pub fn limit(
        symbol: &str,
        side: Side,
        time_in_force: TimeInForce,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self::new(symbol, side, OrderType::Limit, time_in_force, quantity, price)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn order_type(&self) -> OrderType {
        self.order_type
    }

    pub fn time_in_force(&self) -> TimeInForce {
        self.time_in_force
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn price(&self) -> Decimal {
        self.price
    }
}

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// API key pair injected by the host for one execution.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub api_key: String,
    pub api_secret: String,
}

impl Credential {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &"<redacted>")
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_symbol_is_upper_cased() {
        for input in ["btcusdt", "BtcUsdt", "BTCUSDT"] {
            let order = OrderRequest::limit(input, Side::Buy, TimeInForce::Gtc, dec!(1), dec!(2));
            assert_eq!(order.symbol(), "BTCUSDT");
        }
        let padded = OrderRequest::limit(" btcusdt ", Side::Buy, TimeInForce::Gtc, dec!(1), dec!(2));
        assert_eq!(padded.symbol(), " BTCUSDT ");
    }

    #[test]
    fn test_enums_use_exchange_spelling() {
        assert_eq!(serde_json::to_value(Side::Sell).unwrap(), "SELL");
        assert_eq!(serde_json::to_value(TimeInForce::Ioc).unwrap(), "IOC");
        assert_eq!(
            serde_json::from_value::<TimeInForce>("FOK".into()).unwrap(),
            TimeInForce::Fok
        );
        assert!(serde_json::from_value::<Side>("HOLD".into()).is_err());
    }

    #[test]
    fn test_order_request_serializes_type_field() {
        let order = OrderRequest::limit("ethusdt", Side::Buy, TimeInForce::Gtc, dec!(1), dec!(2000));
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["symbol"], "ETHUSDT");
        assert_eq!(json["type"], "LIMIT");
        assert_eq!(json["timeInForce"], "GTC");
        assert_eq!(json["price"], "2000");
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let cred = Credential::new("my-key", "my-secret");
        let printed = format!("{:?}", cred);
        assert!(!printed.contains("my-key"));
        assert!(!printed.contains("my-secret"));
    }
}
