#![no_main]

use libfuzzer_sys::fuzz_target;
use questlog_core::QuestTracker;
use questlog_core::model::Tab;
use questlog_core::wire::decode_page;

fuzz_target!(|data: &[u8]| {
    let Some((&tab, payload)) = data.split_first() else {
        return;
    };
    let tab = Tab::from_id(i32::from(tab % 11));

    if let Ok(page) = decode_page(payload, tab) {
        assert!(page.decoded().count() + page.discarded() == page.items.as_ref().map_or(0, Vec::len));
    }

    let mut tracker = QuestTracker::default();
    tracker.on_page_received(tab, payload);
    let ids: Vec<_> = tracker.all().iter().map(|quest| quest.id()).collect();
    assert!(ids.windows(2).all(|pair| pair[0] < pair[1]));
});
