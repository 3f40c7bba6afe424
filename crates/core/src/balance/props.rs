//! Property-based tests for balance aggregation.
//!
//! - Zero-sum: balances over any valid record set sum to zero
//! - Order independence: shuffling expenses does not change balances
//! - Parallel and sequential folds agree

use proptest::prelude::*;
use tally_shared::types::{ExpenseId, MemberId, Money};

use super::aggregator::BalanceAggregator;
use super::sheet::Tolerance;
use crate::group::{Expense, ExpenseRecord, Member, Roster};
use crate::split::{Allocation, SplitCalculator};

const MEMBERS: u128 = 6;

fn roster() -> Roster {
    Roster::new((1..=MEMBERS).map(|id| Member::new(MemberId::from_u128(id), format!("m{id}"))))
        .unwrap()
}

/// Strategy for one expense: amount, payer, and a weight per member (at least one positive).
fn expense_record(id: u128) -> impl Strategy<Value = ExpenseRecord> {
    (
        1i64..1_000_000,
        1..=MEMBERS,
        prop::collection::vec(0i64..5, MEMBERS as usize),
    )
        .prop_filter("at least one positive weight", |(_, _, w)| w.iter().any(|x| *x > 0))
        .prop_map(move |(amount, payer, weights)| {
            let expense = Expense::new(
                ExpenseId::from_u128(id),
                "generated",
                Money::from_minor(amount),
                MemberId::from_u128(payer),
                chrono::DateTime::<chrono::Utc>::UNIX_EPOCH,
            );
            let shares = weights
                .into_iter()
                .zip(1..=MEMBERS)
                .map(|(w, m)| (MemberId::from_u128(m), w));
            ExpenseRecord::with_shares(expense, shares)
        })
}

fn expense_records() -> impl Strategy<Value = Vec<ExpenseRecord>> {
    (1usize..20).prop_flat_map(|n| {
        (0..n)
            .map(|i| expense_record(i as u128))
            .collect::<Vec<_>>()
    })
}

fn allocate_all(records: &[ExpenseRecord]) -> Vec<Allocation> {
    records
        .iter()
        .map(|r| SplitCalculator::allocate_record(r).unwrap())
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* valid record set, balances SHALL sum to exactly zero.
    #[test]
    fn prop_balances_sum_to_zero(records in expense_records()) {
        let allocations = allocate_all(&records);
        let entries: Vec<_> = records.iter().zip(&allocations).map(|(r, a)| (&r.expense, a)).collect();

        let sheet = BalanceAggregator::default().aggregate(&roster(), &entries).unwrap();
        prop_assert_eq!(sheet.total().unwrap(), Money::ZERO);
    }

    /// *For any* record set, reversing expense order SHALL not change balances.
    #[test]
    fn prop_aggregation_order_independent(records in expense_records()) {
        let allocations = allocate_all(&records);
        let forward: Vec<_> = records.iter().zip(&allocations).map(|(r, a)| (&r.expense, a)).collect();
        let backward: Vec<_> = forward.iter().rev().copied().collect();

        let aggregator = BalanceAggregator::default();
        prop_assert_eq!(
            aggregator.aggregate(&roster(), &forward).unwrap(),
            aggregator.aggregate(&roster(), &backward).unwrap()
        );
    }

    /// *For any* record set, the parallel fold SHALL equal the sequential fold.
    #[test]
    fn prop_parallel_matches_sequential(records in expense_records()) {
        let allocations = allocate_all(&records);
        let entries: Vec<_> = records.iter().zip(&allocations).map(|(r, a)| (&r.expense, a)).collect();

        let sequential = BalanceAggregator::new(Tolerance::EXACT, usize::MAX).aggregate(&roster(), &entries);
        let parallel = BalanceAggregator::new(Tolerance::EXACT, 1).aggregate(&roster(), &entries);
        prop_assert_eq!(sequential, parallel);
    }
}
