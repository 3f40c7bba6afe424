//! Group records supplied by the membership and persistence collaborators.

pub mod types;

pub use types::{DEFAULT_CATEGORY, Expense, ExpenseRecord, Member, Roster, Split};
