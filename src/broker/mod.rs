//! The broker coordinates every registered client.
//!
//! [`Broker`] is the plain state: the active set and the register,
//! unregister and broadcast operations over it. [`service`] runs that state
//! inside one serialized task, reachable only through a cloneable
//! [`BrokerHandle`], so the active set is never touched from two places at
//! once.

pub mod engine;
pub mod service;

pub use engine::Broker;
pub use service::{BrokerHandle, spawn};
