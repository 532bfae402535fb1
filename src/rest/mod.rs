//! Signed REST access to the exchange's spot API.
//!
//! [`RestClient`] owns the credentials and signs every private call; it covers
//! the server clock, account and market data reads, and the order
//! place/fetch/cancel endpoints. Order parameters are validated in full
//! before anything goes on the wire.

mod client;
mod config;
mod order;
mod policy;

pub use client::RestClient;
pub use config::{Config, RawConfig, TradingType};
pub use order::{CandleRequest, OrderParams, OrderRequest, OrderShape, truncate_candles};
pub use policy::{KeyVersion, Policies, TimePolicy};
