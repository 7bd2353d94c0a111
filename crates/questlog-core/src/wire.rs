//! Decoding of quest list responses and quest request bodies.
//!
//! A quest list response is a JSON document, optionally prefixed with
//! `svdata=`, shaped like:
//!
//! ```text
//! {"api_result":1,"api_data":{
//!     "api_count":12,"api_page_count":3,"api_disp_page":1,"api_exec_count":2,
//!     "api_list":[{...},{...},-1,-1]}}
//! ```
//!
//! # Tolerance
//!
//! The remote pads a short final page with `-1` sentinels, so every
//! `api_list` element is decoded on its own and reported as a
//! [`PageItem`]. A bad element never fails the page. Only envelope damage
//! (bad encoding, missing `api_data`, missing counters) fails the decode,
//! in which case the caller drops the whole event.
//!
//! A missing or `null` `api_list` is meaningful: on the unscoped tab it
//! reports that no quests are taken at all.

use serde_json::Value;
use std::borrow::Cow;

use crate::error::ErrorCode;
use crate::model::{QuestId, RawQuest, Tab};

/// Prefix the remote puts in front of every JSON response body.
pub const RESPONSE_PREFIX: &str = "svdata=";

/// Largest `api_exec_count` accepted. The remote allows a handful of quests
/// in execution; anything above this is a damaged counter.
pub const MAX_EXEC_SLOTS: usize = 64;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Envelope-level failures. The whole event is dropped.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Payload bytes are not UTF-8.
    #[error("payload is not valid UTF-8: {0}")]
    NotUtf8(#[from] std::str::Utf8Error),

    /// Payload is not a JSON document.
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document has no `api_data` object.
    #[error("payload has no api_data object")]
    MissingData,

    /// A page counter is missing or not an integer.
    #[error("counter `{0}` is missing or not an integer")]
    BadCounter(&'static str),

    /// A page counter decoded but lies outside its accepted range.
    #[error("counter `{key}` is {value}, above the limit of {max}")]
    CounterOutOfRange {
        key: &'static str,
        value: i32,
        max: usize,
    },

    /// `api_list` is present but is not an array.
    #[error("api_list is not an array")]
    ListNotArray,

    /// A request body lacks a field or carries a non-integer value.
    #[error("request body has no valid `{0}` field")]
    MissingField(&'static str),
}

impl WireError {
    /// Machine-readable code for this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotUtf8(_) => ErrorCode::PayloadNotUtf8,
            Self::Json(_) => ErrorCode::PayloadNotJson,
            Self::MissingData => ErrorCode::EnvelopeMissingData,
            Self::BadCounter(_) => ErrorCode::EnvelopeBadCounter,
            Self::CounterOutOfRange { .. } => ErrorCode::EnvelopeCounterOutOfRange,
            Self::ListNotArray => ErrorCode::EnvelopeBadList,
            Self::MissingField(_) => ErrorCode::RequestFieldMissing,
        }
    }
}

/// Per-item failures. The item is discarded and the page survives.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemError {
    /// The element is not a quest object (e.g. the `-1` filler).
    #[error("item {index} could not be decoded: {reason}")]
    Undecodable {
        /// Position within `api_list`.
        index: usize,
        /// Decoder message.
        reason: String,
    },

    /// The element decoded but its `api_state` is not a known state.
    #[error("quest {id} has unknown state {state}")]
    UnknownState {
        /// Quest number.
        id: QuestId,
        /// Raw state integer.
        state: i32,
    },
}

impl ItemError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Undecodable { .. } => ErrorCode::ItemUndecodable,
            Self::UnknownState { .. } => ErrorCode::ItemUnknownState,
        }
    }
}

// ---------------------------------------------------------------------------
// PageSnapshot
// ---------------------------------------------------------------------------

/// Outcome of decoding one `api_list` element.
pub type PageItem = Result<RawQuest, ItemError>;

/// One decoded quest list page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    /// Tab the page was requested for.
    pub tab: Tab,
    /// 1-based page number (`api_disp_page`).
    pub page: i32,
    /// Total quests in the tab (`api_count`).
    pub count: i32,
    /// Total pages in the tab (`api_page_count`).
    pub page_count: i32,
    /// Quests the remote considers in execution (`api_exec_count`).
    pub exec_count: i32,
    /// `None` when `api_list` was absent or `null`.
    pub items: Option<Vec<PageItem>>,
}

impl PageSnapshot {
    /// Items that decoded successfully, in page order.
    pub fn decoded(&self) -> impl Iterator<Item = &RawQuest> {
        self.items.iter().flatten().filter_map(|item| item.as_ref().ok())
    }

    /// Number of elements discarded by the decoder.
    #[must_use]
    pub fn discarded(&self) -> usize {
        self.items
            .iter()
            .flatten()
            .filter(|item| item.is_err())
            .count()
    }

    /// Execution slot count, with negative values read as zero and large
    /// ones capped at [`MAX_EXEC_SLOTS`].
    #[must_use]
    pub fn exec_slots(&self) -> usize {
        usize::try_from(self.exec_count)
            .unwrap_or(0)
            .min(MAX_EXEC_SLOTS)
    }

    /// 0-based slot index for `page`, `None` when `page` is below 1.
    #[must_use]
    pub fn slot_index(&self) -> Option<usize> {
        usize::try_from(self.page).ok()?.checked_sub(1)
    }
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Decode a quest list response body requested for `tab`.
///
/// # Errors
///
/// Returns a [`WireError`] when the envelope itself is unusable. Individual
/// `api_list` elements never produce an error here; see [`PageItem`].
pub fn decode_page(payload: &[u8], tab: Tab) -> Result<PageSnapshot, WireError> {
    let text = std::str::from_utf8(payload)?;
    let trimmed = text.trim_start();
    let body = trimmed.strip_prefix(RESPONSE_PREFIX).unwrap_or(trimmed);

    let document: Value = serde_json::from_str(body)?;
    let data = document
        .get("api_data")
        .filter(|data| data.is_object())
        .ok_or(WireError::MissingData)?;

    let items = match data.get("api_list") {
        None | Some(Value::Null) => None,
        Some(Value::Array(elements)) => Some(
            elements
                .iter()
                .enumerate()
                .map(|(index, element)| decode_item(index, element))
                .collect(),
        ),
        Some(_) => return Err(WireError::ListNotArray),
    };

    let exec_count = counter(data, "api_exec_count")?;
    if usize::try_from(exec_count).is_ok_and(|slots| slots > MAX_EXEC_SLOTS) {
        return Err(WireError::CounterOutOfRange {
            key: "api_exec_count",
            value: exec_count,
            max: MAX_EXEC_SLOTS,
        });
    }

    Ok(PageSnapshot {
        tab,
        page: counter(data, "api_disp_page")?,
        count: counter(data, "api_count")?,
        page_count: counter(data, "api_page_count")?,
        exec_count,
        items,
    })
}

fn decode_item(index: usize, element: &Value) -> PageItem {
    serde_json::from_value::<RawQuest>(element.clone()).map_err(|e| ItemError::Undecodable {
        index,
        reason: e.to_string(),
    })
}

/// Read an integer counter, accepting numeric strings as the remote
/// occasionally sends them quoted.
fn counter(data: &Value, key: &'static str) -> Result<i32, WireError> {
    let value = data.get(key).ok_or(WireError::BadCounter(key))?;
    let parsed = match value {
        Value::Number(n) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    };
    parsed.ok_or(WireError::BadCounter(key))
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Look up a field in an `application/x-www-form-urlencoded` body.
///
/// Keys and values are percent-decoded; the remote client encodes `_` as
/// `%5F`. Returns the first match.
#[must_use]
pub fn form_field<'a>(body: &'a str, key: &str) -> Option<Cow<'a, str>> {
    body.split('&').find_map(|pair| {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        let decoded_key = decode_component(raw_key)?;
        if decoded_key != key {
            return None;
        }
        decode_component(raw_value)
    })
}

/// Read an integer form field such as `api_tab_id` or `api_quest_id`.
///
/// # Errors
///
/// Returns [`WireError::MissingField`] if the key is absent or its value is
/// not an integer.
pub fn form_int(body: &str, key: &'static str) -> Result<i32, WireError> {
    form_field(body, key)
        .and_then(|value| value.trim().parse::<i32>().ok())
        .ok_or(WireError::MissingField(key))
}

fn decode_component(raw: &str) -> Option<Cow<'_, str>> {
    if raw.contains('+') {
        let spaced = raw.replace('+', " ");
        return urlencoding::decode(&spaced)
            .ok()
            .map(|decoded| Cow::Owned(decoded.into_owned()));
    }
    urlencoding::decode(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    fn page_json(list: &str) -> String {
        format!(
            r#"svdata={{"api_result":1,"api_result_msg":"ok","api_data":{{"api_count":7,"api_page_count":2,"api_disp_page":2,"api_exec_count":3,"api_list":{list}}}}}"#
        )
    }

    fn quest_json(id: i32, state: i32) -> String {
        format!(
            r#"{{"api_no":{id},"api_category":1,"api_type":2,"api_state":{state},"api_title":"q{id}","api_detail":"","api_get_material":[0,0,0,0],"api_bonus_flag":1,"api_progress_flag":0,"api_invalid_flag":0}}"#
        )
    }

    #[test]
    fn decodes_counters_and_items() {
        let body = page_json(&format!("[{},{}]", quest_json(201, 2), quest_json(205, 1)));
        let page = decode_page(body.as_bytes(), Tab::Category(Category::WEEKLY)).expect("decode");

        assert_eq!(page.tab, Tab::Category(Category::WEEKLY));
        assert_eq!(page.page, 2);
        assert_eq!(page.count, 7);
        assert_eq!(page.page_count, 2);
        assert_eq!(page.exec_count, 3);
        assert_eq!(page.slot_index(), Some(1));
        let ids: Vec<_> = page.decoded().map(|raw| raw.api_no).collect();
        assert_eq!(ids, vec![201, 205]);
        assert_eq!(page.discarded(), 0);
    }

    #[test]
    fn sentinel_filler_is_discarded_per_item() {
        let body = page_json(&format!("[{},{},-1,-1,-1]", quest_json(201, 2), quest_json(205, 1)));
        let page = decode_page(body.as_bytes(), Tab::All).expect("decode");

        let items = page.items.as_ref().expect("list present");
        assert_eq!(items.len(), 5);
        assert_eq!(page.decoded().count(), 2);
        assert_eq!(page.discarded(), 3);
        assert!(matches!(items[2], Err(ItemError::Undecodable { index: 2, .. })));
    }

    #[test]
    fn absent_and_null_list_are_none() {
        let absent = r#"{"api_data":{"api_count":0,"api_page_count":0,"api_disp_page":1,"api_exec_count":0}}"#;
        let page = decode_page(absent.as_bytes(), Tab::All).expect("decode");
        assert!(page.items.is_none());

        let null = page_json("null");
        let page = decode_page(null.as_bytes(), Tab::All).expect("decode");
        assert!(page.items.is_none());
    }

    #[test]
    fn empty_list_is_present_but_empty() {
        let page = decode_page(page_json("[]").as_bytes(), Tab::All).expect("decode");
        assert_eq!(page.items.as_deref().map(<[PageItem]>::len), Some(0));
    }

    #[test]
    fn quoted_counters_are_accepted() {
        let body = r#"{"api_data":{"api_count":"4","api_page_count":"1","api_disp_page":" 1","api_exec_count":"2","api_list":[]}}"#;
        let page = decode_page(body.as_bytes(), Tab::Active).expect("decode");
        assert_eq!(page.exec_count, 2);
        assert_eq!(page.page, 1);
    }

    #[test]
    fn envelope_failures_are_errors() {
        assert!(matches!(
            decode_page(b"svdata=<html>", Tab::All),
            Err(WireError::Json(_))
        ));
        assert!(matches!(
            decode_page(&[0xff, 0xfe], Tab::All),
            Err(WireError::NotUtf8(_))
        ));
        assert!(matches!(
            decode_page(br#"{"api_result":100}"#, Tab::All),
            Err(WireError::MissingData)
        ));
        assert!(matches!(
            decode_page(br#"{"api_data":{"api_count":1}}"#, Tab::All),
            Err(WireError::BadCounter("api_disp_page"))
        ));
        let bad_list = r#"{"api_data":{"api_count":1,"api_page_count":1,"api_disp_page":1,"api_exec_count":0,"api_list":5}}"#;
        let err = decode_page(bad_list.as_bytes(), Tab::All).expect_err("list must be an array");
        assert_eq!(err.code(), ErrorCode::EnvelopeBadList);
    }

    #[test]
    fn negative_exec_count_has_no_slots() {
        let body = r#"{"api_data":{"api_count":0,"api_page_count":0,"api_disp_page":0,"api_exec_count":-1}}"#;
        let page = decode_page(body.as_bytes(), Tab::All).expect("decode");
        assert_eq!(page.exec_slots(), 0);
        assert_eq!(page.slot_index(), None);
    }

    #[test]
    fn oversized_exec_count_fails_the_envelope() {
        let body = r#"{"api_data":{"api_count":0,"api_page_count":0,"api_disp_page":1,"api_exec_count":2147483647,"api_list":[]}}"#;
        let err = decode_page(body.as_bytes(), Tab::Active).expect_err("exec count too large");
        assert!(matches!(
            err,
            WireError::CounterOutOfRange {
                key: "api_exec_count",
                value: i32::MAX,
                max: MAX_EXEC_SLOTS,
            }
        ));
        assert_eq!(err.code(), ErrorCode::EnvelopeCounterOutOfRange);

        let at_limit = format!(
            r#"{{"api_data":{{"api_count":0,"api_page_count":0,"api_disp_page":1,"api_exec_count":{MAX_EXEC_SLOTS}}}}}"#
        );
        let page = decode_page(at_limit.as_bytes(), Tab::Active).expect("limit is accepted");
        assert_eq!(page.exec_slots(), MAX_EXEC_SLOTS);
    }

    #[test]
    fn element_without_type_or_state_is_discarded() {
        let list = format!(
            r#"[{},{{"api_no":7,"api_type":1,"api_title":"no state"}},{{"api_no":8,"api_state":1}}]"#,
            quest_json(201, 2)
        );
        let page = decode_page(page_json(&list).as_bytes(), Tab::All).expect("decode");

        let ids: Vec<_> = page.decoded().map(|raw| raw.api_no).collect();
        assert_eq!(ids, vec![201]);
        let items = page.items.as_ref().expect("list present");
        assert!(matches!(items[1], Err(ItemError::Undecodable { index: 1, .. })));
        assert!(matches!(items[2], Err(ItemError::Undecodable { index: 2, .. })));
    }

    #[test]
    fn exec_slots_are_capped_for_built_pages() {
        let page = PageSnapshot {
            tab: Tab::Active,
            page: 1,
            count: 0,
            page_count: 0,
            exec_count: i32::MAX,
            items: Some(Vec::new()),
        };
        assert_eq!(page.exec_slots(), MAX_EXEC_SLOTS);
    }

    #[test]
    fn form_fields_are_percent_decoded() {
        let body = "api%5Ftoken=abc123&api%5Fverno=1&api%5Ftab%5Fid=9";
        assert_eq!(form_field(body, "api_tab_id").as_deref(), Some("9"));
        assert_eq!(form_int(body, "api_tab_id").expect("present"), 9);
        assert_eq!(form_field(body, "api_token").as_deref(), Some("abc123"));
    }

    #[test]
    fn form_int_reports_missing_or_invalid() {
        assert!(matches!(
            form_int("api_verno=1", "api_quest_id"),
            Err(WireError::MissingField("api_quest_id"))
        ));
        assert!(matches!(
            form_int("api_quest_id=abc", "api_quest_id"),
            Err(WireError::MissingField("api_quest_id"))
        ));
        assert_eq!(form_int("api_quest_id=214", "api_quest_id").expect("present"), 214);
    }
}
