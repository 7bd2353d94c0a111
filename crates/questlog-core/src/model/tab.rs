use serde::{Deserialize, Serialize};
use std::fmt;

use super::quest::Category;

/// Tab selector sent with a quest list request (`api_tab_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum Tab {
    /// Every quest, unscoped.
    All,
    /// Quests currently taken on or accomplished.
    Active,
    /// Quests of one category.
    Category(Category),
}

impl Tab {
    pub const ALL_ID: i32 = 0;
    pub const ACTIVE_ID: i32 = 9;

    #[must_use]
    pub const fn from_id(id: i32) -> Self {
        match id {
            Self::ALL_ID => Self::All,
            Self::ACTIVE_ID => Self::Active,
            other => Self::Category(Category(other)),
        }
    }

    #[must_use]
    pub const fn id(self) -> i32 {
        match self {
            Self::All => Self::ALL_ID,
            Self::Active => Self::ACTIVE_ID,
            Self::Category(category) => category.0,
        }
    }
}

impl From<i32> for Tab {
    fn from(id: i32) -> Self {
        Self::from_id(id)
    }
}

impl From<Tab> for i32 {
    fn from(tab: Tab) -> Self {
        tab.id()
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("all"),
            Self::Active => f.write_str("active"),
            Self::Category(category) => write!(f, "{category}"),
        }
    }
}
