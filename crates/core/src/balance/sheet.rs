//! Per-member net balances.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tally_shared::config::SettlementConfig;
use tally_shared::types::{MemberId, Money};

use crate::error::EngineError;
use crate::settlement::Settlement;

/// Tolerance below which a balance counts as settled.
///
/// A value `x` is negligible when `|x| < epsilon`. With the default epsilon of
/// one minor unit only an exact zero is negligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tolerance {
    epsilon: i64,
}

impl Tolerance {
    /// One minor unit: only exact zero is negligible.
    pub const EXACT: Self = Self { epsilon: 1 };

    /// Creates a tolerance. Values below one are raised to one.
    #[must_use]
    pub const fn new(epsilon: i64) -> Self {
        Self {
            epsilon: if epsilon < 1 { 1 } else { epsilon },
        }
    }

    /// Builds the tolerance from settlement configuration.
    #[must_use]
    pub const fn from_config(config: &SettlementConfig) -> Self {
        Self::new(config.epsilon_units)
    }

    /// Epsilon in minor units.
    #[must_use]
    pub const fn epsilon(self) -> i64 {
        self.epsilon
    }

    /// Returns true if the amount is within epsilon of zero.
    #[must_use]
    pub const fn is_negligible(self, amount: Money) -> bool {
        self.is_negligible_units(amount.minor().unsigned_abs())
    }

    /// Returns true if a magnitude in minor units is below epsilon.
    #[must_use]
    pub const fn is_negligible_units(self, units: u64) -> bool {
        units < self.epsilon.unsigned_abs()
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::EXACT
    }
}

/// Net balance per member, ordered by member ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceSheet {
    balances: BTreeMap<MemberId, Money>,
}

impl BalanceSheet {
    /// Creates an empty sheet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance for a member; zero if the member never appeared.
    #[must_use]
    pub fn get(&self, member: MemberId) -> Money {
        self.balances.get(&member).copied().unwrap_or(Money::ZERO)
    }

    /// Returns true if the member has an entry.
    #[must_use]
    pub fn contains(&self, member: MemberId) -> bool {
        self.balances.contains_key(&member)
    }

    /// `(member, balance)` pairs in ascending member order.
    pub fn iter(&self) -> impl Iterator<Item = (MemberId, Money)> + '_ {
        self.balances.iter().map(|(member, amount)| (*member, *amount))
    }

    /// Number of members with an entry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Returns true if no member has an entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Increases a member's balance.
    pub fn credit(&mut self, member: MemberId, amount: Money) -> Result<(), EngineError> {
        let slot = self.balances.entry(member).or_default();
        *slot = slot.checked_add(amount).ok_or(EngineError::Overflow)?;
        Ok(())
    }

    /// Decreases a member's balance.
    pub fn debit(&mut self, member: MemberId, amount: Money) -> Result<(), EngineError> {
        let slot = self.balances.entry(member).or_default();
        *slot = slot.checked_sub(amount).ok_or(EngineError::Overflow)?;
        Ok(())
    }

    /// Adds every entry of `other` into this sheet.
    pub fn merge(mut self, other: Self) -> Result<Self, EngineError> {
        for (member, amount) in other.balances {
            self.credit(member, amount)?;
        }
        Ok(self)
    }

    /// Sum of all balances. Zero for a consistent sheet.
    pub fn total(&self) -> Result<Money, EngineError> {
        self.balances
            .values()
            .try_fold(Money::ZERO, |acc, amount| acc.checked_add(*amount))
            .ok_or(EngineError::Overflow)
    }

    /// Returns true if every balance is negligible.
    #[must_use]
    pub fn is_settled(&self, tolerance: Tolerance) -> bool {
        self.balances.values().all(|amount| tolerance.is_negligible(*amount))
    }

    /// Members whose balance is not negligible.
    #[must_use]
    pub fn outstanding(&self, tolerance: Tolerance) -> Self {
        self.balances
            .iter()
            .filter(|(_, amount)| !tolerance.is_negligible(**amount))
            .map(|(member, amount)| (*member, *amount))
            .collect()
    }

    /// Records a payment: the payer's balance moves up, the payee's down.
    pub fn apply(&mut self, settlement: &Settlement) -> Result<(), EngineError> {
        self.credit(settlement.from, settlement.amount)?;
        self.debit(settlement.to, settlement.amount)
    }

    /// Returns the sheet left after every payment is made.
    pub fn replay(&self, settlements: &[Settlement]) -> Result<Self, EngineError> {
        let mut after = self.clone();
        for settlement in settlements {
            after.apply(settlement)?;
        }
        Ok(after)
    }

    /// Rebuilds the balances a list of payments would settle, starting from zero.
    ///
    /// For a valid settlement list this equals `outstanding()` of the sheet it
    /// was resolved from.
    pub fn from_settlements(settlements: &[Settlement]) -> Result<Self, EngineError> {
        let mut sheet = Self::new();
        for settlement in settlements {
            sheet.debit(settlement.from, settlement.amount)?;
            sheet.credit(settlement.to, settlement.amount)?;
        }
        Ok(sheet.outstanding(Tolerance::EXACT))
    }
}

impl FromIterator<(MemberId, Money)> for BalanceSheet {
    fn from_iter<I: IntoIterator<Item = (MemberId, Money)>>(iter: I) -> Self {
        Self {
            balances: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(n: u128) -> MemberId {
        MemberId::from_u128(n)
    }

    fn sheet(pairs: &[(u128, i64)]) -> BalanceSheet {
        pairs
            .iter()
            .map(|&(m, units)| (member(m), Money::from_minor(units)))
            .collect()
    }

    #[test]
    fn test_tolerance_exact_only_accepts_zero() {
        let tol = Tolerance::EXACT;
        assert!(tol.is_negligible(Money::ZERO));
        assert!(!tol.is_negligible(Money::from_minor(1)));
        assert!(!tol.is_negligible(Money::from_minor(-1)));
    }

    #[test]
    fn test_tolerance_wider_epsilon() {
        let tol = Tolerance::new(3);
        assert!(tol.is_negligible(Money::from_minor(2)));
        assert!(tol.is_negligible(Money::from_minor(-2)));
        assert!(!tol.is_negligible(Money::from_minor(3)));
    }

    #[test]
    fn test_tolerance_clamps_to_one() {
        assert_eq!(Tolerance::new(0), Tolerance::EXACT);
        assert_eq!(Tolerance::new(-5).epsilon(), 1);
        assert!(!Tolerance::new(1).is_negligible(Money::from_minor(i64::MIN)));
        assert!(!Tolerance::EXACT.is_negligible_units(i64::MIN.unsigned_abs()));
        assert!(Tolerance::new(3).is_negligible_units(2));
    }

    #[test]
    fn test_credit_and_debit() {
        let mut s = BalanceSheet::new();
        s.credit(member(1), Money::from_minor(3000)).unwrap();
        s.debit(member(1), Money::from_minor(1000)).unwrap();
        s.debit(member(2), Money::from_minor(2000)).unwrap();

        assert_eq!(s.get(member(1)), Money::from_minor(2000));
        assert_eq!(s.get(member(2)), Money::from_minor(-2000));
        assert_eq!(s.get(member(3)), Money::ZERO);
        assert!(!s.contains(member(3)));
        assert_eq!(s.total().unwrap(), Money::ZERO);
    }

    #[test]
    fn test_credit_overflow() {
        let mut s = sheet(&[(1, i64::MAX)]);
        assert_eq!(s.credit(member(1), Money::from_minor(1)), Err(EngineError::Overflow));
    }

    #[test]
    fn test_merge_adds_entries() {
        let merged = sheet(&[(1, 100), (2, -100)])
            .merge(sheet(&[(2, 50), (3, -50)]))
            .unwrap();
        assert_eq!(merged, sheet(&[(1, 100), (2, -50), (3, -50)]));
    }

    #[test]
    fn test_outstanding_drops_negligible() {
        let s = sheet(&[(1, 0), (2, 500), (3, -500)]);
        assert_eq!(s.outstanding(Tolerance::EXACT), sheet(&[(2, 500), (3, -500)]));
    }

    #[test]
    fn test_replay_settles_sheet() {
        let s = sheet(&[(1, 2000), (2, -1000), (3, -1000)]);
        let payments = [
            Settlement::new(member(2), member(1), Money::from_minor(1000)),
            Settlement::new(member(3), member(1), Money::from_minor(1000)),
        ];

        let after = s.replay(&payments).unwrap();
        assert!(after.is_settled(Tolerance::EXACT));
        assert_eq!(BalanceSheet::from_settlements(&payments).unwrap(), s);
    }
}
