//! Net balance aggregation.
//!
//! Folds payer credits and split debits from many expenses into one signed
//! balance per member:
//! - positive: the group owes the member
//! - negative: the member owes the group

pub mod aggregator;
pub mod sheet;

#[cfg(test)]
mod props;

pub use aggregator::BalanceAggregator;
pub use sheet::{BalanceSheet, Tolerance};
