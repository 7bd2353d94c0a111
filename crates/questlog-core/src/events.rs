//! Inbound events, already demultiplexed by API endpoint.

use serde::{Deserialize, Serialize};

use crate::model::{QuestId, Tab};
use crate::wire::{WireError, form_int};

/// Quest list fetch. The request carries `api_tab_id`.
pub const QUEST_LIST_PATH: &str = "api_get_member/questlist";
/// Reward claim for a completed quest. The request carries `api_quest_id`.
pub const CLEAR_ITEM_GET_PATH: &str = "api_req_quest/clearitemget";
/// Quest abandoned by the player. The request carries `api_quest_id`.
pub const QUEST_STOP_PATH: &str = "api_req_quest/stop";

/// One event from the interception layer.
///
/// Serialized as one JSON object per line, tagged by `kind`, so captured
/// sessions can be stored and replayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InboundEvent {
    /// A quest list page arrived for `tab`.
    PageReceived {
        tab: Tab,
        /// Response body, `svdata=` prefix included or not.
        payload: String,
    },
    /// Rewards were claimed; the quest is cleared.
    ItemClaimed { quest_id: QuestId },
    /// The player stopped a quest; it returns to the untaken pool.
    QuestStopped { quest_id: QuestId },
}

impl InboundEvent {
    /// Map an intercepted exchange to an event.
    ///
    /// `path` is matched by suffix so both `/kcsapi/...` and bare forms work.
    /// Returns `Ok(None)` for endpoints the tracker does not consume.
    ///
    /// # Errors
    ///
    /// Returns [`WireError::MissingField`] when a consumed endpoint's request
    /// body lacks its id field.
    pub fn from_request(
        path: &str,
        request_body: &str,
        response_body: &str,
    ) -> Result<Option<Self>, WireError> {
        let path = path.trim_end_matches('/');
        let event = if path.ends_with(QUEST_LIST_PATH) {
            Self::PageReceived {
                tab: Tab::from_id(form_int(request_body, "api_tab_id")?),
                payload: response_body.to_string(),
            }
        } else if path.ends_with(CLEAR_ITEM_GET_PATH) {
            Self::ItemClaimed {
                quest_id: form_int(request_body, "api_quest_id")?,
            }
        } else if path.ends_with(QUEST_STOP_PATH) {
            Self::QuestStopped {
                quest_id: form_int(request_body, "api_quest_id")?,
            }
        } else {
            return Ok(None);
        };
        Ok(Some(event))
    }

    /// Short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::PageReceived { .. } => "page_received",
            Self::ItemClaimed { .. } => "item_claimed",
            Self::QuestStopped { .. } => "quest_stopped",
        }
    }
}
