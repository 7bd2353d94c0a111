//! Reconciliation of one quest list page against the store.
//!
//! # Merge Semantics
//!
//! A page is a partial, tab-scoped view: it replaces the quests the store
//! holds at the same position of the same tab and says nothing about any
//! other position. The merge therefore:
//!
//! 1. Groups the store the way the remote paginates the requested tab
//!    (see [`crate::grouper`]) and locates the slot for the page number.
//! 2. Removes every quest in that slot, except on the active tab. The active
//!    tab cuts across categories, and its slot members are owned by the
//!    category positions they occupy.
//! 3. Inserts each decoded quest from the page whose id is not already held.
//!    A held id is never refreshed by a page.
//!
//! An unscoped page with no `api_list` at all resets the store.
//!
//! Items that fail to decode are skipped one at a time; the rest of the page
//! still merges.

use tracing::debug;

use crate::grouper::{Scope, find_page, group_by_page};
use crate::model::{Quest, QuestId, Tab};
use crate::store::QuestStore;
use crate::wire::{ItemError, PageSnapshot};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Counters describing one merged page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Quests held in the located slot before the merge.
    pub slot_len: usize,
    /// Slot quests removed from the store.
    pub removed: usize,
    /// Page quests inserted into the store.
    pub inserted: usize,
    /// Page quests skipped because their id was already held.
    pub kept_existing: usize,
    /// Page items discarded as undecodable or invalid.
    pub discarded: usize,
}

/// What a page did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Unscoped page without a list: the store was cleared.
    Reset {
        /// Quests dropped by the reset.
        cleared: usize,
    },
    /// The page was reconciled into the store.
    Merged(MergeStats),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Reconcile `page` into `store`, grouping by `page_size`.
///
/// Never fails: undecodable items are counted in
/// [`MergeStats::discarded`] and otherwise ignored.
pub fn merge_page(store: &mut QuestStore, page: &PageSnapshot, page_size: usize) -> MergeOutcome {
    if page.tab == Tab::All && page.items.is_none() {
        let cleared = store.len();
        store.clear();
        debug!(cleared, "unscoped page without quest list, store reset");
        return MergeOutcome::Reset { cleared };
    }

    let slot = located_slot(store, page, page_size);
    let mut stats = MergeStats {
        slot_len: slot.len(),
        ..MergeStats::default()
    };
    debug!(
        tab = %page.tab,
        page = page.page,
        slot = ?slot,
        "located local slot for page"
    );

    if page.tab != Tab::Active {
        for id in &slot {
            if store.remove(*id).is_some() {
                stats.removed += 1;
            }
        }
    }

    for quest in decode_quests(page, &mut stats) {
        if store.insert_if_absent(quest) {
            stats.inserted += 1;
        } else {
            stats.kept_existing += 1;
        }
    }

    MergeOutcome::Merged(stats)
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Ids the store holds at the page's position within its tab.
fn located_slot(store: &QuestStore, page: &PageSnapshot, page_size: usize) -> Vec<QuestId> {
    let Some(index) = page.slot_index() else {
        return Vec::new();
    };
    let groups = group_by_page(store.iter(), Scope::from(page.tab), page_size);
    find_page(&groups, index)
        .map(|group| group.quests.iter().map(|q| q.id()).collect())
        .unwrap_or_default()
}

fn decode_quests(page: &PageSnapshot, stats: &mut MergeStats) -> Vec<Quest> {
    let mut quests = Vec::new();
    for item in page.items.iter().flatten() {
        let decoded = item
            .as_ref()
            .map_err(Clone::clone)
            .and_then(|raw| Quest::from_raw(raw.clone()));
        match decoded {
            Ok(quest) => quests.push(quest),
            Err(err) => {
                stats.discarded += 1;
                log_discarded(page, &err);
            }
        }
    }
    quests
}

fn log_discarded(page: &PageSnapshot, err: &ItemError) {
    debug!(
        tab = %page.tab,
        page = page.page,
        code = %err.code(),
        error = %err,
        "discarding quest list item"
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
