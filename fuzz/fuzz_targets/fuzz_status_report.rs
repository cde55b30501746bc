//! Fuzz target: enrollment status classification
//!
//! Feeds arbitrary payloads through `classify` on the result topic and
//! checks that a `success` report always carries a non-empty key.
//!
//! cargo fuzz run fuzz_status_report

#![no_main]

use libfuzzer_sys::fuzz_target;
use lockconsole::classify::{EnrollmentReport, Incoming, classify};
use lockconsole::config::TopicConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = std::str::from_utf8(data) else {
        return;
    };
    let topics = TopicConfig::default();

    if let Ok(Incoming::Report(EnrollmentReport::Success { key, .. })) =
        classify(&topics, &topics.add_result, payload)
    {
        assert!(!key.as_str().is_empty(), "success without an identifier");
        assert_ne!(key.as_str(), "FINGER_", "finger success without a slot");
    }

    // The lock-log topic never fails.
    assert!(classify(&topics, &topics.lock_log, payload).is_ok());
});
