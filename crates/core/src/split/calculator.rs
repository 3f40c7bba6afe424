//! Weighted split using the Largest Remainder Method.
//!
//! Each member first receives `floor(total * weight / total_weight)` minor units.
//! The units left over (always fewer than the number of weighted members) go one
//! each to the members with the largest fractional remainders, ties broken by
//! ascending member ID, so the allocation sums to the total exactly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tally_shared::types::{MemberId, Money};

use crate::error::EngineError;
use crate::group::ExpenseRecord;

/// Owed amounts for one expense, keyed by member.
///
/// Members with zero weight are absent, never present with a zero amount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Allocation {
    owed: BTreeMap<MemberId, Money>,
}

impl Allocation {
    /// Amount owed by a member, if they take part.
    #[must_use]
    pub fn get(&self, member: MemberId) -> Option<Money> {
        self.owed.get(&member).copied()
    }

    /// `(member, owed)` pairs in ascending member order.
    pub fn iter(&self) -> impl Iterator<Item = (MemberId, Money)> + '_ {
        self.owed.iter().map(|(member, amount)| (*member, *amount))
    }

    /// Participating members in ascending order.
    pub fn members(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.owed.keys().copied()
    }

    /// Sum of all owed amounts.
    #[must_use]
    pub fn total(&self) -> Money {
        self.owed.values().sum()
    }

    /// Number of participating members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.owed.len()
    }

    /// Returns true if nobody takes part.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.owed.is_empty()
    }
}

/// Split calculator.
pub struct SplitCalculator;

impl SplitCalculator {
    /// Splits `total` across members in proportion to their weights.
    ///
    /// # Errors
    ///
    /// - `InvalidAmount` if `total <= 0`
    /// - `InvalidWeight` if any weight is negative
    /// - `NoShares` if no weight is positive
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use tally_core::split::SplitCalculator;
    /// use tally_shared::types::{MemberId, Money};
    ///
    /// let a = MemberId::from_u128(1);
    /// let b = MemberId::from_u128(2);
    /// let weights = BTreeMap::from([(a, 1), (b, 2)]);
    ///
    /// // 100 / 3 parts: floors are 33 and 66, the spare unit goes to b.
    /// let owed = SplitCalculator::allocate(Money::from_minor(100), &weights).unwrap();
    /// assert_eq!(owed.get(a), Some(Money::from_minor(33)));
    /// assert_eq!(owed.get(b), Some(Money::from_minor(67)));
    /// ```
    pub fn allocate(
        total: Money,
        weights: &BTreeMap<MemberId, i64>,
    ) -> Result<Allocation, EngineError> {
        if !total.is_positive() {
            return Err(EngineError::InvalidAmount(total));
        }
        if let Some((&member, &weight)) = weights.iter().find(|(_, weight)| **weight < 0) {
            return Err(EngineError::InvalidWeight { member, weight });
        }

        let total_weight: i128 = weights.values().map(|w| i128::from(*w)).sum();
        if total_weight == 0 {
            return Err(EngineError::NoShares);
        }

        let amount = i128::from(total.minor());
        let mut floors: Vec<(MemberId, i128)> = Vec::with_capacity(weights.len());
        let mut remainders: Vec<(MemberId, i128)> = Vec::with_capacity(weights.len());

        for (&member, &weight) in weights.iter().filter(|(_, weight)| **weight > 0) {
            let exact = amount * i128::from(weight);
            floors.push((member, exact / total_weight));
            remainders.push((member, exact % total_weight));
        }

        let allocated: i128 = floors.iter().map(|(_, floor)| floor).sum();
        let leftover = usize::try_from(amount - allocated).map_err(|_| EngineError::Overflow)?;

        // Largest remainder first, then ascending member ID.
        remainders.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        let mut owed = floors.into_iter().collect::<BTreeMap<_, _>>();
        for (member, _) in remainders.iter().take(leftover) {
            if let Some(units) = owed.get_mut(member) {
                *units += 1;
            }
        }

        let owed = owed
            .into_iter()
            .map(|(member, units)| {
                i64::try_from(units)
                    .map(|units| (member, Money::from_minor(units)))
                    .map_err(|_| EngineError::Overflow)
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Allocation { owed })
    }

    /// Validates an expense record's splits and allocates its amount.
    ///
    /// # Errors
    ///
    /// Record-shape errors from [`ExpenseRecord::weights`], then everything
    /// [`SplitCalculator::allocate`] rejects.
    pub fn allocate_record(record: &ExpenseRecord) -> Result<Allocation, EngineError> {
        let weights = record.weights()?;
        Self::allocate(record.expense.amount, &weights)
    }
}
