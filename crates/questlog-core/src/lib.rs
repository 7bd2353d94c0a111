//! questlog-core library.
//!
//! Reconciles paginated, tab-scoped quest list responses into one local
//! store and publishes two derived views: every held quest, and the quests
//! currently taken on or accomplished.
//!
//! The entry point is [`tracker::QuestTracker`]: feed it
//! [`events::InboundEvent`]s in arrival order and read or subscribe to its
//! published state.
//!
//! # Conventions
//!
//! - **Errors**: Library errors are `thiserror` enums carrying an
//!   [`error::ErrorCode`]. Event handlers never fail; they log and drop.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`). Dropped
//!   events log their error code at `warn`.

pub mod config;
pub mod error;
pub mod events;
pub mod grouper;
pub mod merge;
pub mod model;
pub mod observable;
pub mod store;
pub mod tracker;
pub mod views;
pub mod wire;

#[cfg(test)]
mod test_support;

pub use events::InboundEvent;
pub use model::{Category, Quest, QuestId, QuestState, Tab};
pub use tracker::{HandleOutcome, QuestTracker, SharedTracker};
pub use views::{CurrentEntry, Views};
