//! Event handlers and the published aggregate state.
//!
//! [`QuestTracker`] is the single writer over the quest store. Every handler
//! runs one whole transaction (decode, locate slot, remove, insert, derive
//! views, publish) before returning, and none of them report failure to the
//! caller: malformed input is logged and the last good state is kept.
//!
//! # Published state
//!
//! | property  | initial | meaning                                            |
//! |-----------|---------|----------------------------------------------------|
//! | `all`     | `[]`    | every held quest, ascending by id                  |
//! | `current` | `[]`    | active quests padded to the last exec count        |
//! | `untaken` | `true`  | no quest list page processed yet                   |
//! | `empty`   | `false` | the last unscoped page reported no quests at all   |
//!
//! Events are expected in arrival order from one stream. When several
//! threads deliver events, wrap the tracker in a [`SharedTracker`].

use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::ErrorCode;
use crate::events::InboundEvent;
use crate::merge::{MergeOutcome, MergeStats, merge_page};
use crate::model::{Quest, QuestId, QuestState, Tab};
use crate::observable::Property;
use crate::store::QuestStore;
use crate::views::{CurrentEntry, Views, derive_views};
use crate::wire::{PageSnapshot, decode_page};

// ---------------------------------------------------------------------------
// HandleOutcome
// ---------------------------------------------------------------------------

/// What a handler did. Informational only; handlers never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandleOutcome {
    /// A page was merged.
    Merged(MergeStats),
    /// An unscoped page without a list cleared the store.
    Reset { cleared: usize },
    /// The event was unusable and dropped; state is unchanged.
    Dropped { code: ErrorCode, reason: String },
    /// A claim was processed. `removed` is false for unknown ids.
    Claimed { removed: bool },
    /// A stop was processed. `found` is false for unknown ids.
    Stopped { found: bool },
}

// ---------------------------------------------------------------------------
// QuestTracker
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct QuestTracker {
    config: EngineConfig,
    store: QuestStore,
    exec_slots: usize,
    all: Property<Vec<Quest>>,
    current: Property<Vec<CurrentEntry>>,
    untaken: Property<bool>,
    empty: Property<bool>,
}

impl Default for QuestTracker {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl QuestTracker {
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            store: QuestStore::new(),
            exec_slots: 0,
            all: Property::new(Vec::new()),
            current: Property::new(Vec::new()),
            untaken: Property::new(true),
            empty: Property::new(false),
        }
    }

    // -----------------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------------

    /// Dispatch one inbound event.
    pub fn apply(&mut self, event: &InboundEvent) -> HandleOutcome {
        match event {
            InboundEvent::PageReceived { tab, payload } => {
                self.on_page_received(*tab, payload.as_bytes())
            }
            InboundEvent::ItemClaimed { quest_id } => self.on_item_claimed(*quest_id),
            InboundEvent::QuestStopped { quest_id } => self.on_quest_stopped(*quest_id),
        }
    }

    /// Decode a quest list response for `tab` and merge it.
    ///
    /// An unusable envelope drops the event and leaves every property as it
    /// was.
    pub fn on_page_received(&mut self, tab: Tab, payload: &[u8]) -> HandleOutcome {
        match decode_page(payload, tab) {
            Ok(page) => self.merge(&page),
            Err(err) => {
                warn!(
                    tab = %tab,
                    code = %err.code(),
                    error = %err,
                    "dropping quest list event"
                );
                HandleOutcome::Dropped {
                    code: err.code(),
                    reason: err.to_string(),
                }
            }
        }
    }

    /// Merge an already decoded page and republish.
    pub fn merge(&mut self, page: &PageSnapshot) -> HandleOutcome {
        self.dump_store("before merge");
        let outcome = merge_page(&mut self.store, page, self.config.page_size);
        self.dump_store("after merge");

        self.untaken.set(false);
        let outcome = match outcome {
            MergeOutcome::Reset { cleared } => {
                // No quests are taken at all, so no execution slot is pending.
                self.empty.set(true);
                self.exec_slots = 0;
                info!(cleared, "quest list reports no quests, store reset");
                HandleOutcome::Reset { cleared }
            }
            MergeOutcome::Merged(stats) => {
                self.empty.set(false);
                self.exec_slots = page.exec_slots();
                debug!(
                    tab = %page.tab,
                    page = page.page,
                    exec_count = page.exec_count,
                    removed = stats.removed,
                    inserted = stats.inserted,
                    kept_existing = stats.kept_existing,
                    discarded = stats.discarded,
                    "merged quest list page"
                );
                HandleOutcome::Merged(stats)
            }
        };
        self.publish_views();
        outcome
    }

    /// Rewards for `id` were claimed: the quest is cleared.
    pub fn on_item_claimed(&mut self, id: QuestId) -> HandleOutcome {
        let removed = self.store.remove(id).is_some();
        debug!(quest_id = id, removed, "quest claimed");
        self.publish_views();
        HandleOutcome::Claimed { removed }
    }

    /// `id` was stopped: it returns to the untaken pool with its payload
    /// intact. Unknown ids are ignored.
    pub fn on_quest_stopped(&mut self, id: QuestId) -> HandleOutcome {
        let rebuilt = self
            .store
            .replace(id, |raw| raw.api_state = QuestState::None.as_raw());
        match rebuilt {
            Ok(found) => {
                debug!(quest_id = id, found, "quest stopped");
                if found {
                    self.publish_views();
                }
                HandleOutcome::Stopped { found }
            }
            Err(err) => {
                warn!(quest_id = id, code = %err.code(), error = %err, "quest stop not applied");
                HandleOutcome::Dropped {
                    code: err.code(),
                    reason: err.to_string(),
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Published state
    // -----------------------------------------------------------------------

    /// Every held quest, ascending by id.
    #[must_use]
    pub fn all(&self) -> &[Quest] {
        self.all.value()
    }

    /// Active quests ascending by id, padded with placeholders.
    #[must_use]
    pub fn current(&self) -> &[CurrentEntry] {
        self.current.value()
    }

    #[must_use]
    pub fn is_untaken(&self) -> bool {
        *self.untaken.value()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self.empty.value()
    }

    /// Execution slot count the current view is padded to.
    #[must_use]
    pub const fn exec_slots(&self) -> usize {
        self.exec_slots
    }

    /// Owned copy of both views.
    #[must_use]
    pub fn views(&self) -> Views {
        Views {
            all: self.all.get(),
            current: self.current.get(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn subscribe_all(&mut self) -> Receiver<Vec<Quest>> {
        self.all.subscribe()
    }

    pub fn subscribe_current(&mut self) -> Receiver<Vec<CurrentEntry>> {
        self.current.subscribe()
    }

    pub fn subscribe_untaken(&mut self) -> Receiver<bool> {
        self.untaken.subscribe()
    }

    pub fn subscribe_empty(&mut self) -> Receiver<bool> {
        self.empty.subscribe()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn publish_views(&mut self) {
        let Views { all, current } = derive_views(&self.store, self.exec_slots);
        self.all.set(all);
        self.current.set(current);
    }

    fn dump_store(&self, label: &str) {
        if !self.config.log_store_dumps {
            return;
        }
        let mut quests: Vec<&Quest> = self.store.iter().collect();
        quests.sort_by_key(|q| q.id());
        for quest in quests {
            debug!(stage = label, %quest, "store");
        }
    }
}

// ---------------------------------------------------------------------------
// SharedTracker
// ---------------------------------------------------------------------------

/// A tracker shared across threads.
///
/// Each handler holds the lock for its whole transaction, so slot location
/// and removal can never interleave with another event.
#[derive(Debug, Clone, Default)]
pub struct SharedTracker {
    inner: Arc<Mutex<QuestTracker>>,
}

impl SharedTracker {
    #[must_use]
    pub fn new(tracker: QuestTracker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    pub fn apply(&self, event: &InboundEvent) -> HandleOutcome {
        self.lock().apply(event)
    }

    pub fn on_page_received(&self, tab: Tab, payload: &[u8]) -> HandleOutcome {
        self.lock().on_page_received(tab, payload)
    }

    pub fn on_item_claimed(&self, id: QuestId) -> HandleOutcome {
        self.lock().on_item_claimed(id)
    }

    pub fn on_quest_stopped(&self, id: QuestId) -> HandleOutcome {
        self.lock().on_quest_stopped(id)
    }

    /// Run `f` with exclusive access, e.g. to read views or subscribe.
    pub fn with<R>(&self, f: impl FnOnce(&mut QuestTracker) -> R) -> R {
        f(&mut self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, QuestTracker> {
        self.inner.lock().unwrap_or_else(|poisoned| {
            // Handlers finish or drop whole transactions, so the held state
            // is the last published one.
            warn!(
                code = %ErrorCode::InternalUnexpected,
                "quest tracker lock poisoned, continuing with last state"
            );
            poisoned.into_inner()
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
