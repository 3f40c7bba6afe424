//! Property-based tests for the split calculator.
//!
//! - Conservation: owed amounts sum to the expense total exactly
//! - Fairness: every member is within one unit of their exact share
//! - Zero weights never appear in the result

use std::collections::BTreeMap;

use proptest::prelude::*;
use tally_shared::types::{MemberId, Money};

use super::calculator::SplitCalculator;

/// Strategy to generate positive amounts (0.01 to 1,000,000.00 in cents).
fn positive_amount() -> impl Strategy<Value = i64> {
    1i64..100_000_000i64
}

/// Strategy to generate 1-12 members with weights 0-10, at least one positive.
fn weight_map() -> impl Strategy<Value = BTreeMap<MemberId, i64>> {
    prop::collection::btree_map(1u128..50, 0i64..=10, 1..12)
        .prop_filter("at least one positive weight", |m| m.values().any(|w| *w > 0))
        .prop_map(|m| {
            m.into_iter()
                .map(|(id, w)| (MemberId::from_u128(id), w))
                .collect()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* amount and weights, owed amounts SHALL sum to the amount exactly.
    #[test]
    fn prop_allocation_conserves_total(
        amount in positive_amount(),
        weights in weight_map(),
    ) {
        let allocation = SplitCalculator::allocate(Money::from_minor(amount), &weights).unwrap();
        prop_assert_eq!(allocation.total(), Money::from_minor(amount));
    }

    /// *For any* member, the owed amount SHALL be the floor or ceiling of the exact share.
    #[test]
    fn prop_allocation_within_one_unit_of_exact_share(
        amount in positive_amount(),
        weights in weight_map(),
    ) {
        let allocation = SplitCalculator::allocate(Money::from_minor(amount), &weights).unwrap();
        let total_weight: i128 = weights.values().map(|w| i128::from(*w)).sum();

        for (member, owed) in allocation.iter() {
            let exact_scaled = i128::from(amount) * i128::from(weights[&member]);
            let floor = exact_scaled / total_weight;
            let owed = i128::from(owed.minor());
            prop_assert!(
                owed == floor || owed == floor + 1,
                "member {} owes {} but exact floor is {}",
                member, owed, floor
            );
        }
    }

    /// *For any* weight map, exactly the positively weighted members SHALL be allocated.
    #[test]
    fn prop_zero_weights_excluded(
        amount in positive_amount(),
        weights in weight_map(),
    ) {
        let allocation = SplitCalculator::allocate(Money::from_minor(amount), &weights).unwrap();
        let expected: Vec<MemberId> = weights
            .iter()
            .filter(|(_, w)| **w > 0)
            .map(|(m, _)| *m)
            .collect();
        prop_assert_eq!(allocation.members().collect::<Vec<_>>(), expected);
    }

    /// *For any* input, allocating twice SHALL produce the same result.
    #[test]
    fn prop_allocation_is_deterministic(
        amount in positive_amount(),
        weights in weight_map(),
    ) {
        let first = SplitCalculator::allocate(Money::from_minor(amount), &weights).unwrap();
        let second = SplitCalculator::allocate(Money::from_minor(amount), &weights).unwrap();
        prop_assert_eq!(first, second);
    }
}
