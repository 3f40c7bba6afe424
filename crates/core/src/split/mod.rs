//! Expense splitting by share weights.
//!
//! Turns one expense's total and a weight map into per-member owed amounts
//! that always sum back to the total.

pub mod calculator;

#[cfg(test)]
mod props;

pub use calculator::{Allocation, SplitCalculator};
