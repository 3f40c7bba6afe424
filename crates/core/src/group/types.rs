//! Members, expenses, and splits.
//!
//! These are plain input records. The engine never mutates them; it only
//! validates their shape before computing anything.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tally_shared::types::{ExpenseId, MemberId, Money};

use crate::error::EngineError;

/// Category assigned to expenses created without one.
pub const DEFAULT_CATEGORY: &str = "General";

/// A member of a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// The member ID.
    pub id: MemberId,
    /// Display name.
    pub name: String,
}

impl Member {
    /// Creates a new member.
    #[must_use]
    pub fn new(id: MemberId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The set of valid members for one group, keyed by ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Member>", into = "Vec<Member>")]
pub struct Roster {
    members: BTreeMap<MemberId, Member>,
}

impl Roster {
    /// Placeholder shown for IDs that are not on the roster.
    pub const UNKNOWN_NAME: &'static str = "?";

    /// Builds a roster, rejecting repeated member IDs.
    pub fn new(members: impl IntoIterator<Item = Member>) -> Result<Self, EngineError> {
        let mut by_id = BTreeMap::new();
        for member in members {
            match by_id.entry(member.id) {
                Entry::Occupied(_) => return Err(EngineError::DuplicateMember(member.id)),
                Entry::Vacant(slot) => {
                    slot.insert(member);
                }
            }
        }
        Ok(Self { members: by_id })
    }

    /// Returns true if the member belongs to the group.
    #[must_use]
    pub fn contains(&self, id: MemberId) -> bool {
        self.members.contains_key(&id)
    }

    /// Fails with `UnknownMember` unless the member belongs to the group.
    pub fn require(&self, id: MemberId) -> Result<(), EngineError> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(EngineError::UnknownMember(id))
        }
    }

    /// Looks up a member.
    #[must_use]
    pub fn get(&self, id: MemberId) -> Option<&Member> {
        self.members.get(&id)
    }

    /// Display name for a member, or `"?"` when unknown.
    #[must_use]
    pub fn display_name(&self, id: MemberId) -> &str {
        self.get(id).map_or(Self::UNKNOWN_NAME, |m| m.name.as_str())
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the roster has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members in ascending ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Member> {
        self.members.values()
    }
}

impl TryFrom<Vec<Member>> for Roster {
    type Error = EngineError;

    fn try_from(members: Vec<Member>) -> Result<Self, Self::Error> {
        Self::new(members)
    }
}

impl From<Roster> for Vec<Member> {
    fn from(roster: Roster) -> Self {
        roster.members.into_values().collect()
    }
}

/// A shared expense paid by one member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    /// The expense ID.
    pub id: ExpenseId,
    /// Short label, e.g. "Groceries".
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Category label.
    pub category: String,
    /// Total amount in minor units.
    pub amount: Money,
    /// Member who paid.
    pub payer: MemberId,
    /// When the expense was recorded.
    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Creates an expense in the default category with no description.
    #[must_use]
    pub fn new(
        id: ExpenseId,
        name: impl Into<String>,
        amount: Money,
        payer: MemberId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: None,
            category: DEFAULT_CATEGORY.to_string(),
            amount,
            payer,
            created_at,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

/// One member's share count in one expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    /// The expense this split belongs to.
    pub expense_id: ExpenseId,
    /// The member who owes a part.
    pub member_id: MemberId,
    /// Number of parts. Zero excludes the member.
    pub shares: i64,
}

impl Split {
    /// Creates a split.
    #[must_use]
    pub const fn new(expense_id: ExpenseId, member_id: MemberId, shares: i64) -> Self {
        Self {
            expense_id,
            member_id,
            shares,
        }
    }
}

/// An expense together with its split records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    /// The expense.
    pub expense: Expense,
    /// Its splits.
    pub splits: Vec<Split>,
}

impl ExpenseRecord {
    /// Pairs an expense with its splits.
    #[must_use]
    pub fn new(expense: Expense, splits: Vec<Split>) -> Self {
        Self { expense, splits }
    }

    /// Builds a record from `(member, shares)` pairs.
    #[must_use]
    pub fn with_shares(expense: Expense, shares: impl IntoIterator<Item = (MemberId, i64)>) -> Self {
        let splits = shares
            .into_iter()
            .map(|(member, count)| Split::new(expense.id, member, count))
            .collect();
        Self { expense, splits }
    }

    /// Collects the splits into a weight map.
    ///
    /// # Errors
    ///
    /// `MismatchedSplit` if a split names another expense, `DuplicateSplit` if a
    /// member appears twice. Weight values themselves are checked by the split
    /// calculator.
    pub fn weights(&self) -> Result<BTreeMap<MemberId, i64>, EngineError> {
        let mut weights = BTreeMap::new();
        for split in &self.splits {
            if split.expense_id != self.expense.id {
                return Err(EngineError::MismatchedSplit {
                    expense: self.expense.id,
                    split_expense: split.expense_id,
                });
            }
            if weights.insert(split.member_id, split.shares).is_some() {
                return Err(EngineError::DuplicateSplit {
                    expense: self.expense.id,
                    member: split.member_id,
                });
            }
        }
        Ok(weights)
    }

    /// Fails with `UnknownMember` if the payer or any split member is off the roster.
    ///
    /// Members are checked payer first, then splits in record order.
    pub fn check_members(&self, roster: &Roster) -> Result<(), EngineError> {
        roster.require(self.expense.payer)?;
        self.splits
            .iter()
            .try_for_each(|split| roster.require(split.member_id))
    }
}
