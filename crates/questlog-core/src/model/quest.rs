use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::wire::ItemError;

/// Remote quest number (`api_no`), unique within a store.
pub type QuestId = i32;

// ---------------------------------------------------------------------------
// QuestState
// ---------------------------------------------------------------------------

/// Progress of a quest as reported by the remote `api_state` integer.
///
/// Cleared quests have no state: they are absent from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum QuestState {
    None = 1,
    TakenOn = 2,
    Accomplished = 3,
}

impl QuestState {
    /// Return the remote integer for this state.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        self as i32
    }

    /// Decode the remote integer, `None` for anything unknown.
    #[must_use]
    pub const fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            1 => Some(Self::None),
            2 => Some(Self::TakenOn),
            3 => Some(Self::Accomplished),
            _ => None,
        }
    }

    /// True for quests occupying an execution slot.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::TakenOn | Self::Accomplished)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::TakenOn => "taken_on",
            Self::Accomplished => "accomplished",
        }
    }
}

impl fmt::Display for QuestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Quest category (`api_type`). Category tabs use the same integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(pub i32);

impl Category {
    pub const DAILY: Self = Self(1);
    pub const WEEKLY: Self = Self(2);
    pub const MONTHLY: Self = Self(3);
    pub const ONCE: Self = Self(4);
    pub const OTHER: Self = Self(5);

    /// Known display name, if any.
    #[must_use]
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            1 => Some("daily"),
            2 => Some("weekly"),
            3 => Some("monthly"),
            4 => Some("once"),
            5 => Some("other"),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "type-{}", self.0),
        }
    }
}

// ---------------------------------------------------------------------------
// RawQuest
// ---------------------------------------------------------------------------

/// Quest payload exactly as the remote list reports it.
///
/// Fields the engine does not interpret are preserved via
/// `#[serde(flatten)]` so the record can be redisplayed or rebuilt verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuest {
    pub api_no: QuestId,
    #[serde(default)]
    pub api_category: i32,
    // Required: an element without a type or state is discarded, not zeroed.
    pub api_type: i32,
    pub api_state: i32,
    #[serde(default)]
    pub api_title: String,
    #[serde(default)]
    pub api_detail: String,
    #[serde(default)]
    pub api_get_material: Vec<i32>,
    #[serde(default)]
    pub api_bonus_flag: i32,
    #[serde(default)]
    pub api_progress_flag: i32,
    #[serde(default)]
    pub api_invalid_flag: i32,

    /// Unknown fields preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Quest
// ---------------------------------------------------------------------------

/// A quest record held by the store.
///
/// `id`, `category` and `state` are derived from `raw` at construction and
/// never drift from it: the only way to change a quest is to rebuild it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quest {
    id: QuestId,
    category: Category,
    state: QuestState,
    raw: RawQuest,
}

impl Quest {
    /// Build a quest from its payload.
    ///
    /// # Errors
    ///
    /// Returns [`ItemError::UnknownState`] if `api_state` is not a known state.
    pub fn from_raw(raw: RawQuest) -> Result<Self, ItemError> {
        let state = QuestState::from_raw(raw.api_state).ok_or(ItemError::UnknownState {
            id: raw.api_no,
            state: raw.api_state,
        })?;
        Ok(Self {
            id: raw.api_no,
            category: Category(raw.api_type),
            state,
            raw,
        })
    }

    #[must_use]
    pub const fn id(&self) -> QuestId {
        self.id
    }

    #[must_use]
    pub const fn category(&self) -> Category {
        self.category
    }

    #[must_use]
    pub const fn state(&self) -> QuestState {
        self.state
    }

    #[must_use]
    pub const fn raw(&self) -> &RawQuest {
        &self.raw
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.raw.api_title
    }

    /// Consume the quest, returning its payload.
    #[must_use]
    pub fn into_raw(self) -> RawQuest {
        self.raw
    }
}

impl fmt::Display for Quest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} ({})",
            self.id, self.category, self.raw.api_title, self.state
        )
    }
}
