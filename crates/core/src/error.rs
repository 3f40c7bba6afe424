//! Engine error types.
//!
//! Every variant is a deterministic validation failure on malformed input.
//! Nothing here is retryable and no operation returns a partial result
//! alongside an error.

use tally_shared::AppError;
use tally_shared::types::{ExpenseId, MemberId, Money};
use thiserror::Error;

/// Errors that can occur while splitting, aggregating, or settling.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    // ========== Split Errors ==========
    /// Expense amount must be strictly positive.
    #[error("Expense amount must be positive, got {0}")]
    InvalidAmount(Money),

    /// No member carries a positive weight.
    #[error("At least one member must have shares > 0")]
    NoShares,

    /// A weight is negative.
    #[error("Weight for member {member} must not be negative, got {weight}")]
    InvalidWeight {
        /// The member with the bad weight.
        member: MemberId,
        /// The rejected weight.
        weight: i64,
    },

    /// The same member appears twice in one expense's splits.
    #[error("Member {member} appears more than once in the splits of expense {expense}")]
    DuplicateSplit {
        /// The expense being split.
        expense: ExpenseId,
        /// The repeated member.
        member: MemberId,
    },

    /// A split record points at a different expense than the one it was supplied with.
    #[error("Split for expense {split_expense} was supplied with expense {expense}")]
    MismatchedSplit {
        /// The expense the split was attached to.
        expense: ExpenseId,
        /// The expense the split record names.
        split_expense: ExpenseId,
    },

    // ========== Membership Errors ==========
    /// A payer or split member is not on the roster.
    #[error("Member {0} is not part of the group")]
    UnknownMember(MemberId),

    /// The roster lists the same member twice.
    #[error("Member {0} is listed more than once")]
    DuplicateMember(MemberId),

    // ========== Balance Errors ==========
    /// Net balances do not sum to zero.
    #[error("Balances do not sum to zero (total {total})")]
    UnbalancedInput {
        /// The offending total, in minor units.
        total: Money,
    },

    /// A running total left the 64-bit minor-unit range.
    #[error("Amount overflowed the supported range")]
    Overflow,
}

impl EngineError {
    /// Returns the stable error code for callers.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::NoShares => "NO_SHARES",
            Self::InvalidWeight { .. } => "INVALID_WEIGHT",
            Self::DuplicateSplit { .. } => "DUPLICATE_SPLIT",
            Self::MismatchedSplit { .. } => "MISMATCHED_SPLIT",
            Self::UnknownMember(_) => "UNKNOWN_MEMBER",
            Self::DuplicateMember(_) => "DUPLICATE_MEMBER",
            Self::UnbalancedInput { .. } => "UNBALANCED_INPUT",
            Self::Overflow => "OVERFLOW",
        }
    }

    /// Returns true if this error is retryable. Engine errors never are.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        false
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::UnknownMember(_) => Self::NotFound(err.to_string()),
            EngineError::Overflow => Self::Internal(err.to_string()),
            _ => Self::Validation(err.to_string()),
        }
    }
}
