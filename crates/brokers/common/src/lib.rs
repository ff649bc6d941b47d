//! Exchange adapters shared across the workspace.

pub mod simulated;

pub use simulated::{SimulatedExchange, SimulatedExchangeConfig};
