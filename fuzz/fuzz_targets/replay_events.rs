#![no_main]

use libfuzzer_sys::fuzz_target;
use questlog_core::{InboundEvent, QuestTracker};

// Input is a JSON-lines event stream; lines that do not parse are skipped.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let mut tracker = QuestTracker::default();
    for line in text.lines() {
        let Ok(event) = serde_json::from_str::<InboundEvent>(line) else {
            continue;
        };
        tracker.apply(&event);

        let all = tracker.all();
        assert!(all.windows(2).all(|pair| pair[0].id() < pair[1].id()));
        let active = all.iter().filter(|quest| quest.state().is_active()).count();
        let known = tracker.current().iter().filter(|entry| !entry.is_placeholder()).count();
        assert_eq!(known, active);
        assert!(tracker.current().len() >= tracker.exec_slots());
    }
});
