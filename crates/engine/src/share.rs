//! Cost shares and the event status rule.
//!
//! An event costs `total_spend`, split evenly among the **current** members of
//! its group. The share is never stored: it is recomputed from the live
//! membership every time it is needed, so a group growing or shrinking changes
//! what each member owes.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{EngineError, MoneyCents};

/// Per-member share of an event cost.
///
/// The value is kept as the exact fraction `total / members`; comparisons
/// against a spending limit never round. Use [`Share::amount`] to show it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Share {
    total: MoneyCents,
    members: u64,
}

impl Share {
    /// Share of `total` among `members` people. With no members the share is 0.
    pub fn of(total: MoneyCents, members: usize) -> Self {
        Self {
            total,
            members: members as u64,
        }
    }

    pub fn members(&self) -> u64 {
        self.members
    }

    /// The share rounded to the nearest cent.
    pub fn amount(&self) -> MoneyCents {
        if self.members == 0 {
            return MoneyCents::ZERO;
        }
        let total = i128::from(self.total.cents());
        let members = i128::from(self.members);
        let rounded = (2 * total + members).div_euclid(2 * members);
        MoneyCents::new(rounded as i64)
    }

    /// Returns `true` when somebody whose limit is `max_spend` can pay the share.
    pub fn is_covered_by(&self, max_spend: MoneyCents) -> bool {
        if self.members == 0 {
            return max_spend >= MoneyCents::ZERO;
        }
        i128::from(max_spend.cents()) * i128::from(self.members)
            >= i128::from(self.total.cents())
    }
}

impl fmt::Display for Share {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.amount().fmt(f)
    }
}

/// Whether every group member can currently afford an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventStatus {
    #[default]
    Pending,
    Active,
}

impl EventStatus {
    /// Canonical status string stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Active => "Active",
        }
    }

    pub fn is_active(self) -> bool {
        self == Self::Active
    }
}

impl TryFrom<&str> for EventStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Pending" => Ok(Self::Pending),
            "Active" => Ok(Self::Active),
            other => Err(EngineError::InvalidName(format!(
                "invalid event status: {other}"
            ))),
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The one status rule: `Active` iff every member's limit covers the share.
///
/// `member_max_spends` holds the `max_spend` of each current group member; its
/// length is the member count used for the share.
pub fn derive_status(total_spend: MoneyCents, member_max_spends: &[MoneyCents]) -> EventStatus {
    let share = Share::of(total_spend, member_max_spends.len());
    if member_max_spends
        .iter()
        .all(|max_spend| share.is_covered_by(*max_spend))
    {
        EventStatus::Active
    } else {
        EventStatus::Pending
    }
}
