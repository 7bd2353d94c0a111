//! Builders shared by unit tests.

use std::collections::BTreeMap;

use crate::model::{Category, Quest, QuestId, QuestState, RawQuest};

pub fn raw(id: QuestId, category: Category, state: QuestState) -> RawQuest {
    RawQuest {
        api_no: id,
        api_category: 1,
        api_type: category.0,
        api_state: state.as_raw(),
        api_title: format!("q{id}"),
        api_detail: format!("detail for {id}"),
        api_get_material: vec![10, 20, 30, 40],
        api_bonus_flag: 1,
        api_progress_flag: 0,
        api_invalid_flag: 0,
        extra: BTreeMap::new(),
    }
}

pub fn quest(id: QuestId, category: Category, state: QuestState) -> Quest {
    Quest::from_raw(raw(id, category, state)).expect("known state")
}

pub fn ids(quests: &[Quest]) -> Vec<QuestId> {
    quests.iter().map(Quest::id).collect()
}
