//! Property-based tests for the settlement resolver.
//!
//! - Settlement correctness: replaying payments zeroes every balance
//! - Minimality: at most `n - 1` payments for `n` unsettled members
//! - Every payment is positive and flows debtor to creditor
//! - Determinism: identical input gives identical output

use proptest::prelude::*;
use tally_shared::types::{MemberId, Money};

use super::resolver::SettlementResolver;
use crate::balance::{BalanceSheet, Tolerance};

/// Strategy to generate a zero-sum balance sheet over up to 15 members.
///
/// The last member absorbs the negated sum of the others.
fn zero_sum_sheet() -> impl Strategy<Value = BalanceSheet> {
    prop::collection::vec(-100_000i64..100_000, 1..15).prop_map(|amounts| {
        let closing: i64 = -amounts.iter().sum::<i64>();
        amounts
            .into_iter()
            .chain(std::iter::once(closing))
            .enumerate()
            .map(|(i, units)| (MemberId::from_u128(i as u128 + 1), Money::from_minor(units)))
            .collect()
    })
}

/// Strategy where many balances share the same magnitude, to stress tie-breaks.
fn tied_sheet() -> impl Strategy<Value = BalanceSheet> {
    (1usize..6, 1usize..6, 1i64..50).prop_map(|(creditors, debtors, unit)| {
        // creditors * debtors * unit on each side keeps the sheet balanced.
        let credit = Money::from_minor(unit * debtors as i64);
        let debt = Money::from_minor(-unit * creditors as i64);
        (0..creditors)
            .map(|_| credit)
            .chain((0..debtors).map(|_| debt))
            .enumerate()
            .map(|(i, amount)| (MemberId::from_u128(i as u128 + 1), amount))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* zero-sum sheet, replaying the payments SHALL settle every member.
    #[test]
    fn prop_replay_settles_everyone(sheet in zero_sum_sheet()) {
        let settlements = SettlementResolver::default().resolve(&sheet).unwrap();
        let after = sheet.replay(&settlements).unwrap();
        prop_assert!(after.is_settled(Tolerance::EXACT), "left over: {:?}", after);
    }

    /// *For any* zero-sum sheet, the payments SHALL rebuild exactly the unsettled balances.
    #[test]
    fn prop_payments_reproduce_balances(sheet in zero_sum_sheet()) {
        let settlements = SettlementResolver::default().resolve(&sheet).unwrap();
        prop_assert_eq!(
            BalanceSheet::from_settlements(&settlements).unwrap(),
            sheet.outstanding(Tolerance::EXACT)
        );
    }

    /// *For any* sheet with `n` unsettled members, at most `n - 1` payments SHALL be emitted.
    #[test]
    fn prop_at_most_n_minus_one_payments(sheet in zero_sum_sheet()) {
        let unsettled = sheet.outstanding(Tolerance::EXACT).len();
        let settlements = SettlementResolver::default().resolve(&sheet).unwrap();
        prop_assert!(settlements.len() <= unsettled.saturating_sub(1));
    }

    /// *For any* sheet, every payment SHALL be positive and flow from a debtor to a creditor.
    #[test]
    fn prop_payments_flow_debtor_to_creditor(sheet in zero_sum_sheet()) {
        let settlements = SettlementResolver::default().resolve(&sheet).unwrap();
        for s in &settlements {
            prop_assert!(s.amount.is_positive());
            prop_assert!(sheet.get(s.from).is_negative());
            prop_assert!(sheet.get(s.to).is_positive());
        }
    }

    /// *For any* sheet, resolving twice SHALL yield the same payments.
    #[test]
    fn prop_resolution_is_deterministic(sheet in zero_sum_sheet()) {
        let resolver = SettlementResolver::default();
        prop_assert_eq!(resolver.resolve(&sheet).unwrap(), resolver.resolve(&sheet).unwrap());
    }

    /// *For any* fully tied sheet, the first payment SHALL pair the lowest-ID debtor
    /// with the lowest-ID creditor.
    #[test]
    fn prop_ties_resolve_by_ascending_id(sheet in tied_sheet()) {
        let settlements = SettlementResolver::default().resolve(&sheet).unwrap();
        let first_creditor = sheet.iter().find(|(_, b)| b.is_positive()).map(|(m, _)| m);
        let first_debtor = sheet.iter().find(|(_, b)| b.is_negative()).map(|(m, _)| m);

        prop_assert_eq!(settlements.first().map(|s| s.to), first_creditor);
        prop_assert_eq!(settlements.first().map(|s| s.from), first_debtor);
    }
}
