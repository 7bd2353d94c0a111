//! Derived views published after every store mutation.
//!
//! Both views are rebuilt from scratch; nothing is patched incrementally.

use serde::Serialize;

use crate::model::Quest;
use crate::store::QuestStore;

/// One entry of the current-quest view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CurrentEntry {
    /// A taken-on or accomplished quest held locally.
    Known(Quest),
    /// An execution slot whose quest has not been seen yet. Serializes as
    /// `null`.
    Unknown,
}

impl CurrentEntry {
    #[must_use]
    pub const fn quest(&self) -> Option<&Quest> {
        match self {
            Self::Known(quest) => Some(quest),
            Self::Unknown => None,
        }
    }

    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}

/// Snapshot of both derived views.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Views {
    /// Every held quest, ascending by id.
    pub all: Vec<Quest>,
    /// Active quests ascending by id, padded with placeholders up to the
    /// execution slot count.
    pub current: Vec<CurrentEntry>,
}

/// Rebuild both views from `store`, padding the current view to
/// `exec_slots` entries.
///
/// Active quests beyond `exec_slots` are kept; padding only ever adds.
#[must_use]
pub fn derive_views(store: &QuestStore, exec_slots: usize) -> Views {
    let mut all = store.all();
    all.sort_by_key(Quest::id);

    let mut current: Vec<CurrentEntry> = all
        .iter()
        .filter(|quest| quest.state().is_active())
        .cloned()
        .map(CurrentEntry::Known)
        .collect();
    if current.len() < exec_slots {
        current.resize(exec_slots, CurrentEntry::Unknown);
    }

    Views { all, current }
}
