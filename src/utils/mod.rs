//! The `utils` module provides definitions shared across the `pushhub` crate:
//! the error taxonomy and the tracing bootstrap.

pub mod error;
pub mod logging;

#[cfg(test)]
mod tests;
