//! Folds expenses and their allocations into a balance sheet.

use rayon::prelude::*;
use tally_shared::EngineConfig;
use tracing::debug;

use super::sheet::{BalanceSheet, Tolerance};
use crate::error::EngineError;
use crate::group::{Expense, Roster};
use crate::split::Allocation;

/// Balance aggregator.
///
/// Stateless apart from its settings; every call recomputes from scratch.
#[derive(Debug, Clone, Copy)]
pub struct BalanceAggregator {
    tolerance: Tolerance,
    parallel_threshold: usize,
}

impl BalanceAggregator {
    /// Creates an aggregator.
    #[must_use]
    pub const fn new(tolerance: Tolerance, parallel_threshold: usize) -> Self {
        Self {
            tolerance,
            parallel_threshold,
        }
    }

    /// Builds an aggregator from engine configuration.
    #[must_use]
    pub const fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            Tolerance::from_config(&config.settlement),
            config.aggregation.parallel_threshold,
        )
    }

    /// Computes net balances over every payer and split member.
    ///
    /// The payer is credited the full amount, each participant is debited
    /// their owed amount. A payer who also participates nets both.
    ///
    /// # Errors
    ///
    /// - `UnknownMember` for the first payer or participant (in input order)
    ///   missing from the roster
    /// - `UnbalancedInput` if the resulting balances do not sum to zero
    /// - `Overflow` if a balance leaves the 64-bit range
    pub fn aggregate(
        &self,
        roster: &Roster,
        entries: &[(&Expense, &Allocation)],
    ) -> Result<BalanceSheet, EngineError> {
        // Membership first, in input order.
        for (expense, allocation) in entries {
            roster.require(expense.payer)?;
            allocation
                .members()
                .try_for_each(|member| roster.require(member))?;
        }

        let sheet = if entries.len() >= self.parallel_threshold {
            debug!(expenses = entries.len(), "aggregating balances in parallel");
            entries
                .par_iter()
                .map(|(expense, allocation)| Self::expense_sheet(expense, allocation))
                .try_reduce(BalanceSheet::new, BalanceSheet::merge)?
        } else {
            entries
                .iter()
                .map(|(expense, allocation)| Self::expense_sheet(expense, allocation))
                .try_fold(BalanceSheet::new(), |acc, sheet| acc.merge(sheet?))?
        };

        let total = sheet.total()?;
        if !self.tolerance.is_negligible(total) {
            return Err(EngineError::UnbalancedInput { total });
        }

        Ok(sheet)
    }

    /// Balance effect of a single expense.
    fn expense_sheet(expense: &Expense, allocation: &Allocation) -> Result<BalanceSheet, EngineError> {
        let mut sheet = BalanceSheet::new();
        sheet.credit(expense.payer, expense.amount)?;
        for (member, owed) in allocation.iter() {
            sheet.debit(member, owed)?;
        }
        Ok(sheet)
    }
}

impl Default for BalanceAggregator {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}
