//! Canonical quest collection keyed by id.
//!
//! # Invariants
//!
//! - At most one quest per id. Every write goes through this module, so the
//!   map key is the only place uniqueness has to be enforced.
//! - Readers get shared references or owned copies; nothing outside the
//!   store can mutate a held quest in place.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::model::{Quest, QuestId, RawQuest};
use crate::wire::ItemError;

/// Deduplicated quest set. Internally unordered.
#[derive(Debug, Clone, Default)]
pub struct QuestStore {
    quests: HashMap<QuestId, Quest>,
}

impl QuestStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `quest` unless its id is already held.
    ///
    /// Returns `true` if the quest was inserted. An existing record is never
    /// overwritten.
    pub fn insert_if_absent(&mut self, quest: Quest) -> bool {
        match self.quests.entry(quest.id()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(quest);
                true
            }
        }
    }

    /// Remove the quest with `id`, returning it if it was held.
    pub fn remove(&mut self, id: QuestId) -> Option<Quest> {
        self.quests.remove(&id)
    }

    /// Rebuild the quest with `id` from a mutated copy of its payload.
    ///
    /// Returns `Ok(false)` when no quest has that id. The mutator may not
    /// change `api_no`; the rebuilt quest keeps the original id.
    ///
    /// # Errors
    ///
    /// Returns the [`ItemError`] from rebuilding if the mutated payload is
    /// not a valid quest. The original record is left in place.
    pub fn replace<F>(&mut self, id: QuestId, mutate: F) -> Result<bool, ItemError>
    where
        F: FnOnce(&mut RawQuest),
    {
        let Some(existing) = self.quests.get(&id) else {
            return Ok(false);
        };

        let mut raw = existing.raw().clone();
        mutate(&mut raw);
        raw.api_no = id;
        let rebuilt = Quest::from_raw(raw)?;

        self.quests.insert(id, rebuilt);
        Ok(true)
    }

    /// Drop every quest.
    pub fn clear(&mut self) {
        self.quests.clear();
    }

    #[must_use]
    pub fn get(&self, id: QuestId) -> Option<&Quest> {
        self.quests.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: QuestId) -> bool {
        self.quests.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.quests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    /// Iterate held quests in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values()
    }

    /// Owned copy of every held quest, unordered.
    #[must_use]
    pub fn all(&self) -> Vec<Quest> {
        self.quests.values().cloned().collect()
    }
}
