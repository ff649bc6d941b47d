//! The MEXC workflow node.
//!
//! `MexcNode` places one limit order per input item through whatever
//! `ExchangeConnector` it is built with; `MexcApi` declares the credential it
//! needs. `LocalExecution` runs the node in-process without a workflow host.

pub mod credentials;
pub mod host;
pub mod node;
pub mod params;

pub use credentials::{MexcApi, MEXC_API_CREDENTIAL};
pub use host::LocalExecution;
pub use node::MexcNode;
