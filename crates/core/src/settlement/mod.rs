//! Debt settlement.
//!
//! Resolves net balances into a short list of directed payments.

pub mod resolver;

#[cfg(test)]
mod props;

pub use resolver::{Settlement, SettlementResolver};
