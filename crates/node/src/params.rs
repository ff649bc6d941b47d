//! Reading node parameters into an `OrderRequest`.
//!
//! Values are only checked for shape. Ranges (zero or negative quantities,
//! prices off the tick grid) are left for the exchange to reject.

use mexcnode_core::*;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Read the six order parameters for one item.
pub fn read_order_request(
    ctx: &dyn ExecuteFunctions,
    item_index: usize,
) -> Result<OrderRequest, NodeError> {
    let symbol = string_param(ctx, "symbol", item_index)?;
    let side: Side = enum_param(ctx, "side", item_index)?;
    let order_type: OrderType = enum_param(ctx, "type", item_index)?;
    let time_in_force: TimeInForce = enum_param(ctx, "timeInForce", item_index)?;
    let quantity = decimal_param(ctx, "quantity", item_index)?;
    let price = decimal_param(ctx, "price", item_index)?;

    Ok(OrderRequest::new(
        &symbol,
        side,
        order_type,
        time_in_force,
        quantity,
        price,
    ))
}

fn string_param(ctx: &dyn ExecuteFunctions, name: &str, item_index: usize) -> Result<String, NodeError> {
    match ctx.node_parameter(name, item_index)? {
        Value::String(s) => Ok(s),
        other => Err(NodeError::parameter(name, format!("expected a string, got {}", other))),
    }
}

fn enum_param<T: DeserializeOwned>(
    ctx: &dyn ExecuteFunctions,
    name: &str,
    item_index: usize,
) -> Result<T, NodeError> {
    let value = ctx.node_parameter(name, item_index)?;
    serde_json::from_value(value.clone())
        .map_err(|_| NodeError::parameter(name, format!("unsupported value {}", value)))
}

fn decimal_param(ctx: &dyn ExecuteFunctions, name: &str, item_index: usize) -> Result<Decimal, NodeError> {
    let value = ctx.node_parameter(name, item_index)?;
    parse_decimal(&value).ok_or_else(|| NodeError::parameter(name, format!("not a number: {}", value)))
}

/// Read a JSON number (or numeric string) without going through `f64`
/// formatting, so `0.1` stays `0.1`.
///
/// Values that do not fit a `Decimal` exactly are refused rather than
/// rounded.
pub fn parse_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str_exact(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}
