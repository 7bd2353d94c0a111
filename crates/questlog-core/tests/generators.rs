#![allow(dead_code)]

use proptest::prelude::*;
use questlog_core::model::{Category, QuestId, QuestState, RawQuest, Tab};
use questlog_core::events::InboundEvent;
use serde_json::{Value, json};
use std::collections::BTreeMap;

pub const PAGE_SIZE: usize = 5;

pub fn arb_state() -> impl Strategy<Value = QuestState> + Clone {
    prop_oneof![
        Just(QuestState::None),
        Just(QuestState::TakenOn),
        Just(QuestState::Accomplished),
    ]
}

pub fn arb_category() -> impl Strategy<Value = Category> + Clone {
    (1i32..=5).prop_map(Category)
}

pub fn arb_tab() -> impl Strategy<Value = Tab> + Clone {
    prop_oneof![
        Just(Tab::All),
        Just(Tab::Active),
        arb_category().prop_map(Tab::Category),
    ]
}

pub fn raw_quest(id: QuestId, category: Category, state: QuestState) -> RawQuest {
    serde_json::from_value(json!({
        "api_no": id,
        "api_category": 1,
        "api_type": category.0,
        "api_state": state.as_raw(),
        "api_title": format!("quest {id}"),
        "api_detail": format!("detail {id}"),
        "api_get_material": [id, 0, 0, 0],
        "api_bonus_flag": 1,
        "api_progress_flag": 0,
        "api_invalid_flag": 0,
    }))
    .expect("valid raw quest")
}

/// A set of quests with distinct ids drawn from `1..max_id`, ascending by id.
pub fn arb_quests(max_id: QuestId, max_len: usize) -> impl Strategy<Value = Vec<RawQuest>> + Clone {
    prop::collection::btree_map(1..max_id, (arb_category(), arb_state()), 0..max_len).prop_map(
        |entries| {
            entries
                .into_iter()
                .map(|(id, (category, state))| raw_quest(id, category, state))
                .collect()
        },
    )
}

/// Response body for one quest list page. `None` omits `api_list`.
pub fn page_payload(page: i32, exec_count: i32, items: Option<&[RawQuest]>) -> String {
    let mut data = json!({
        "api_count": items.map_or(0, <[RawQuest]>::len),
        "api_page_count": 1,
        "api_disp_page": page,
        "api_exec_count": exec_count,
    });
    if let Some(items) = items {
        data["api_list"] = Value::Array(
            items
                .iter()
                .map(|raw| serde_json::to_value(raw).expect("encode raw quest"))
                .collect(),
        );
    }
    format!(
        "svdata={}",
        json!({ "api_result": 1, "api_result_msg": "ok", "api_data": data })
    )
}

// ---------------------------------------------------------------------------
// Remote model
// ---------------------------------------------------------------------------

/// The remote's authoritative quest set, paginated the way the remote does.
#[derive(Debug, Clone)]
pub struct Remote {
    pub quests: BTreeMap<QuestId, RawQuest>,
    pub exec_count: i32,
}

impl Remote {
    pub fn new(quests: Vec<RawQuest>, exec_count: i32) -> Self {
        Self {
            quests: quests.into_iter().map(|raw| (raw.api_no, raw)).collect(),
            exec_count,
        }
    }

    pub fn scoped(&self, tab: Tab) -> Vec<RawQuest> {
        self.quests
            .values()
            .filter(|raw| match tab {
                Tab::All => true,
                Tab::Active => raw.api_state != QuestState::None.as_raw(),
                Tab::Category(category) => raw.api_type == category.0,
            })
            .cloned()
            .collect()
    }

    pub fn page_count(&self, tab: Tab) -> i32 {
        let pages = self.scoped(tab).len().div_ceil(PAGE_SIZE);
        i32::try_from(pages).expect("small page count")
    }

    /// Page `page` (1-based) of `tab`, or an empty list past the end.
    pub fn page(&self, tab: Tab, page: i32) -> Vec<RawQuest> {
        let index = usize::try_from(page - 1).expect("page starts at 1");
        self.scoped(tab)
            .chunks(PAGE_SIZE)
            .nth(index)
            .map(<[RawQuest]>::to_vec)
            .unwrap_or_default()
    }

    pub fn page_payload(&self, tab: Tab, page: i32) -> String {
        let items = self.page(tab, page);
        page_payload(page, self.exec_count, Some(items.as_slice()))
    }

    /// Events fetching every page of `tab` in order.
    pub fn fetch_all(&self, tab: Tab) -> Vec<InboundEvent> {
        (1..=self.page_count(tab).max(1))
            .map(|page| InboundEvent::PageReceived {
                tab,
                payload: self.page_payload(tab, page),
            })
            .collect()
    }

    pub fn ids(&self) -> Vec<QuestId> {
        self.quests.keys().copied().collect()
    }
}

pub fn arb_remote(max_id: QuestId, max_len: usize) -> impl Strategy<Value = Remote> + Clone {
    (arb_quests(max_id, max_len), 0i32..8).prop_map(|(quests, exec)| Remote::new(quests, exec))
}

// ---------------------------------------------------------------------------
// Arbitrary event streams
// ---------------------------------------------------------------------------

/// Any event, including pages that contradict earlier ones, unknown ids and
/// unusable payloads.
pub fn arb_event() -> impl Strategy<Value = InboundEvent> + Clone {
    let page = (
        arb_tab(),
        0i32..5,
        -1i32..7,
        prop::option::weighted(0.9, arb_quests(40, 8)),
    )
        .prop_map(|(tab, page, exec, items)| InboundEvent::PageReceived {
            tab,
            payload: page_payload(page, exec, items.as_deref()),
        });
    let garbage = prop_oneof![
        Just("svdata={\"api_result\":".to_string()),
        Just("<html>504 Gateway Timeout</html>".to_string()),
        Just("svdata={\"api_result\":100}".to_string()),
    ];

    prop_oneof![
        6 => page,
        2 => (1i32..40).prop_map(|quest_id| InboundEvent::ItemClaimed { quest_id }),
        2 => (1i32..40).prop_map(|quest_id| InboundEvent::QuestStopped { quest_id }),
        1 => (arb_tab(), garbage).prop_map(|(tab, payload)| InboundEvent::PageReceived { tab, payload }),
    ]
}

pub fn arb_events(max_len: usize) -> impl Strategy<Value = Vec<InboundEvent>> + Clone {
    prop::collection::vec(arb_event(), 0..max_len)
}
