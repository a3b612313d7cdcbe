//! Publishers feed the broker.
//!
//! Anything holding a [`crate::broker::BrokerHandle`] can publish; this
//! module provides the periodic one the server runs by default.

pub mod ticker;

pub use ticker::Ticker;
