//! Fuzz target: unlock-log annotation
//!
//! Arbitrary text must annotate without panicking (no slicing off a char
//! boundary), and text without identifiers must come back unchanged.
//!
//! cargo fuzz run fuzz_unlock_annotator

#![no_main]

use libfuzzer_sys::fuzz_target;
use lockconsole::annotate::{annotate, find_identifiers};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let idents = find_identifiers(&text);

    for pair in idents.windows(2) {
        assert!(pair[0].span.end <= pair[1].span.start, "overlapping identifiers");
    }

    let out = annotate(&text, |_| "N");
    if idents.is_empty() {
        assert_eq!(out, text);
    }
});
