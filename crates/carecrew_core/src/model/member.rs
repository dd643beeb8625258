//! Family roster model.
//!
//! # Responsibility
//! - Define the fixed household roster and role vocabulary.
//! - Track which roster entry is currently acting.
//!
//! # Invariants
//! - Roster ids are unique and stable.
//! - `ActingMember` always points at a valid roster index.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stable identifier of a roster entry (`m1`, `f1`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for MemberId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Fixed household roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyRole {
    Mother,
    Father,
    Grandmother,
    Grandfather,
}

impl FamilyRole {
    /// Hebrew display label used by the household.
    pub fn label_he(self) -> &'static str {
        match self {
            Self::Mother => "אמא",
            Self::Father => "אבא",
            Self::Grandmother => "סבתא",
            Self::Grandfather => "סבא",
        }
    }
}

/// One roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilyMember {
    pub id: MemberId,
    pub name: &'static str,
    pub role: FamilyRole,
    /// Avatar image URL.
    pub avatar: String,
    /// Admins may edit and delete shifts and tasks.
    pub is_admin: bool,
}

const AVATAR_BASE_URL: &str = "https://api.dicebear.com/7.x/avataaars/svg?seed=";
const DEFAULT_ACTING_INDEX: usize = 2;

static ROSTER: Lazy<Vec<FamilyMember>> = Lazy::new(|| {
    vec![
        member("m1", "אמא", FamilyRole::Mother, "Mom", true),
        member("f1", "אבא", FamilyRole::Father, "Dad", true),
        member("g1", "סבתא", FamilyRole::Grandmother, "Grandma", false),
        member("g2", "סבא", FamilyRole::Grandfather, "Grandpa", false),
    ]
});

fn member(
    id: &str,
    name: &'static str,
    role: FamilyRole,
    avatar_seed: &str,
    is_admin: bool,
) -> FamilyMember {
    FamilyMember {
        id: MemberId::new(id),
        name,
        role,
        avatar: format!("{AVATAR_BASE_URL}{avatar_seed}"),
        is_admin,
    }
}

/// Returns the fixed household roster in display order.
pub fn household_roster() -> &'static [FamilyMember] {
    ROSTER.as_slice()
}

/// Looks up one roster entry by id.
pub fn find_member(id: &MemberId) -> Option<&'static FamilyMember> {
    household_roster().iter().find(|member| &member.id == id)
}

pub fn is_known_member(id: &MemberId) -> bool {
    find_member(id).is_some()
}

/// Cursor over the roster selecting who is currently acting.
///
/// Local role toggle only; callers pass `current().id` explicitly into
/// every assignment operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingMember {
    index: usize,
}

impl Default for ActingMember {
    fn default() -> Self {
        Self {
            index: DEFAULT_ACTING_INDEX,
        }
    }
}

impl ActingMember {
    /// Starts acting as the given member, if it is on the roster.
    pub fn for_member(id: &MemberId) -> Option<Self> {
        household_roster()
            .iter()
            .position(|member| &member.id == id)
            .map(|index| Self { index })
    }

    pub fn current(&self) -> &'static FamilyMember {
        &household_roster()[self.index]
    }

    /// Advances to the next roster entry, wrapping around.
    pub fn cycle(&mut self) -> &'static FamilyMember {
        self.index = (self.index + 1) % household_roster().len();
        self.current()
    }
}
