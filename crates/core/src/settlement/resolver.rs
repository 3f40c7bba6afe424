//! Greedy largest-first settlement.
//!
//! Creditors and debtors each sit in a max-heap keyed by remaining amount, ties
//! broken by ascending member ID. Every step pairs the largest creditor with the
//! largest debtor and settles the smaller magnitude, so each payment retires at
//! least one side. With an exact tolerance the final payment retires both,
//! giving at most `n - 1` payments for `n` unsettled members.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};
use tally_shared::types::{MemberId, Money};
use tracing::trace;

use crate::balance::{BalanceSheet, Tolerance};
use crate::error::EngineError;

/// One directed payment: `from` pays `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// The paying member (a debtor).
    pub from: MemberId,
    /// The receiving member (a creditor).
    pub to: MemberId,
    /// Amount in minor units. Always positive.
    pub amount: Money,
}

impl Settlement {
    /// Creates a settlement.
    #[must_use]
    pub const fn new(from: MemberId, to: MemberId, amount: Money) -> Self {
        Self { from, to, amount }
    }
}

/// Remaining magnitude for one side of the matching.
///
/// Held unsigned so a debt of `i64::MIN` has a representable magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Position {
    remaining: u64,
    member: MemberId,
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        // Larger amount wins; on equal amounts the lower ID wins.
        self.remaining
            .cmp(&other.remaining)
            .then_with(|| other.member.cmp(&self.member))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Settlement resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementResolver {
    tolerance: Tolerance,
}

impl SettlementResolver {
    /// Creates a resolver with the given tolerance.
    #[must_use]
    pub const fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    /// Resolves balances into payments.
    ///
    /// Members within tolerance of zero take no part. The output order is the
    /// order in which payments were matched.
    ///
    /// # Errors
    ///
    /// - `UnbalancedInput` if the balances do not sum to zero within tolerance
    /// - `Overflow` if the total leaves the 64-bit range
    pub fn resolve(&self, balances: &BalanceSheet) -> Result<Vec<Settlement>, EngineError> {
        let total = balances.total()?;
        if !self.tolerance.is_negligible(total) {
            return Err(EngineError::UnbalancedInput { total });
        }

        let mut creditors = BinaryHeap::new();
        let mut debtors = BinaryHeap::new();
        for (member, balance) in balances.iter() {
            if self.tolerance.is_negligible(balance) {
                continue;
            }
            let position = Position {
                remaining: balance.minor().unsigned_abs(),
                member,
            };
            if balance.is_positive() {
                creditors.push(position);
            } else {
                debtors.push(position);
            }
        }

        let mut settlements =
            Vec::with_capacity((creditors.len() + debtors.len()).saturating_sub(1));

        loop {
            let (Some(creditor), Some(debtor)) = (creditors.peek().copied(), debtors.peek().copied())
            else {
                break;
            };
            creditors.pop();
            debtors.pop();

            // A creditor never exceeds `i64::MAX`, so neither does the payment.
            let amount = creditor.remaining.min(debtor.remaining);
            let payment = i64::try_from(amount).map_err(|_| EngineError::Overflow)?;
            trace!(
                from = %debtor.member,
                to = %creditor.member,
                amount = payment,
                "matched settlement"
            );
            settlements.push(Settlement::new(
                debtor.member,
                creditor.member,
                Money::from_minor(payment),
            ));

            let credit_left = creditor.remaining - amount;
            if !self.tolerance.is_negligible_units(credit_left) {
                creditors.push(Position {
                    remaining: credit_left,
                    ..creditor
                });
            }
            let debt_left = debtor.remaining - amount;
            if !self.tolerance.is_negligible_units(debt_left) {
                debtors.push(Position {
                    remaining: debt_left,
                    ..debtor
                });
            }
        }

        Ok(settlements)
    }
}
