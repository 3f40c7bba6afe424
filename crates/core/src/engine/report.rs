//! Group report types.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::{Currency, ExpenseId, MemberId, Money};

use crate::balance::BalanceSheet;
use crate::error::EngineError;
use crate::group::{Expense, ExpenseRecord, Roster};
use crate::settlement::Settlement;
use crate::split::Allocation;

/// What one member paid and owes across the group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberPosition {
    /// Sum of expenses this member paid for.
    pub paid: Money,
    /// Sum of this member's shares.
    pub owed: Money,
    /// `paid - owed`.
    pub net: Money,
}

/// Group totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Sum of all expense amounts.
    pub total_spent: Money,
    /// Number of expenses.
    pub expense_count: usize,
    /// Per-member paid and owed figures.
    pub positions: BTreeMap<MemberId, MemberPosition>,
}

impl GroupSummary {
    pub(crate) fn from_entries(entries: &[(&Expense, &Allocation)]) -> Result<Self, EngineError> {
        let mut summary = Self {
            expense_count: entries.len(),
            ..Self::default()
        };

        for (expense, allocation) in entries {
            summary.total_spent = summary
                .total_spent
                .checked_add(expense.amount)
                .ok_or(EngineError::Overflow)?;

            let payer = summary.positions.entry(expense.payer).or_default();
            payer.paid = payer
                .paid
                .checked_add(expense.amount)
                .ok_or(EngineError::Overflow)?;

            for (member, share) in allocation.iter() {
                let position = summary.positions.entry(member).or_default();
                position.owed = position
                    .owed
                    .checked_add(share)
                    .ok_or(EngineError::Overflow)?;
            }
        }

        for position in summary.positions.values_mut() {
            position.net = position
                .paid
                .checked_sub(position.owed)
                .ok_or(EngineError::Overflow)?;
        }

        Ok(summary)
    }

    /// Position for a member, or all zeros if they never appear.
    #[must_use]
    pub fn position(&self, member: MemberId) -> MemberPosition {
        self.positions.get(&member).copied().unwrap_or_default()
    }
}

/// One member's part of an expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownLine {
    /// The member.
    pub member: MemberId,
    /// The member's weight.
    pub shares: i64,
    /// The member's computed share of the expense.
    pub amount: Money,
    /// Whether this member paid the expense.
    pub is_payer: bool,
}

/// How a single expense was divided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseBreakdown {
    /// The expense.
    pub expense_id: ExpenseId,
    /// Sum of all weights. Wider than a single weight so it cannot overflow.
    pub total_shares: i128,
    /// One line per weighted member, by member ID.
    pub lines: Vec<BreakdownLine>,
}

impl ExpenseBreakdown {
    /// Builds the breakdown from a record and its allocation.
    ///
    /// Only members present in the allocation get a line, so zero-weight
    /// splits are left out.
    pub(crate) fn new(record: &ExpenseRecord, allocation: &Allocation) -> Self {
        let shares: BTreeMap<MemberId, i64> = record
            .splits
            .iter()
            .map(|split| (split.member_id, split.shares))
            .collect();

        let lines = allocation
            .iter()
            .map(|(member, amount)| BreakdownLine {
                member,
                shares: shares.get(&member).copied().unwrap_or_default(),
                amount,
                is_payer: member == record.expense.payer,
            })
            .collect::<Vec<_>>();

        Self {
            expense_id: record.expense.id,
            total_shares: lines.iter().map(|line| i128::from(line.shares)).sum(),
            lines,
        }
    }
}

/// A settlement with names and a decimal amount for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementLine {
    /// Paying member.
    pub from: MemberId,
    /// Paying member's display name.
    pub from_name: String,
    /// Receiving member.
    pub to: MemberId,
    /// Receiving member's display name.
    pub to_name: String,
    /// Amount in minor units.
    pub amount: Money,
    /// Amount in major units.
    pub display_amount: Decimal,
}

/// Everything the balances and settle-up views need.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupReport {
    /// Net balance per member.
    pub balances: BalanceSheet,
    /// Payments that settle the group, in matching order.
    pub settlements: Vec<Settlement>,
    /// Group totals.
    pub summary: GroupSummary,
    /// Per-expense split detail, in input order.
    pub breakdowns: Vec<ExpenseBreakdown>,
}

impl GroupReport {
    /// Settlements rendered with display names.
    ///
    /// Members missing from the roster show as `"?"`.
    #[must_use]
    pub fn settlement_lines(&self, roster: &Roster, currency: Currency) -> Vec<SettlementLine> {
        self.settlements
            .iter()
            .map(|s| SettlementLine {
                from: s.from,
                from_name: roster.display_name(s.from).to_owned(),
                to: s.to,
                to_name: roster.display_name(s.to).to_owned(),
                amount: s.amount,
                display_amount: s.amount.to_decimal(currency),
            })
            .collect()
    }

    /// Payments the member has to make.
    pub fn payments_from(&self, member: MemberId) -> impl Iterator<Item = &Settlement> + '_ {
        self.settlements.iter().filter(move |s| s.from == member)
    }

    /// Payments the member will receive.
    pub fn payments_to(&self, member: MemberId) -> impl Iterator<Item = &Settlement> + '_ {
        self.settlements.iter().filter(move |s| s.to == member)
    }
}
