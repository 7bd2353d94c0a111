//! Quest records and the tab selector used by quest list requests.

pub mod quest;
pub mod tab;

pub use quest::{Category, Quest, QuestId, QuestState, RawQuest};
pub use tab::Tab;
