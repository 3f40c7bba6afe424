//! Settlement pipeline.
//!
//! Runs split → aggregate → settle over a complete group record set and
//! packages the results for the balances and settle-up views.

pub mod report;
pub mod service;

pub use report::{
    BreakdownLine, ExpenseBreakdown, GroupReport, GroupSummary, MemberPosition, SettlementLine,
};
pub use service::SettlementEngine;
