//! MEXC spot exchange adapter.
//!
//! Signed REST calls against the v3 spot API. Only order placement is
//! implemented.

pub mod client;
pub mod signing;

pub use client::{MexcConfig, MexcConnector, MexcSpotClient};
