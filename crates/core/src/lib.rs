//! Core business logic for Tally.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All amounts are integer minor units; nothing here touches floating point.
//!
//! # Modules
//!
//! - `group` - Members, expenses, and split records
//! - `split` - Weighted division of one expense
//! - `balance` - Net balance aggregation across expenses
//! - `settlement` - Greedy resolution of balances into payments
//! - `engine` - The full pipeline and its report

pub mod balance;
pub mod engine;
pub mod error;
pub mod group;
pub mod settlement;
pub mod split;

pub use balance::{BalanceAggregator, BalanceSheet, Tolerance};
pub use engine::{GroupReport, SettlementEngine};
pub use error::EngineError;
pub use group::{Expense, ExpenseRecord, Member, Roster, Split};
pub use settlement::{Settlement, SettlementResolver};
pub use split::{Allocation, SplitCalculator};
