//! Fuzz target for TIMIT `.phn` parsing, with and without a sample rate.
//!
//! Run with:
//!   cargo +nightly fuzz run timit_phn_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use seqlabel::ir::io_timit_phn::{fuzz_parse_phn_line, Timit};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    // .phn files are plain text; skip non-UTF-8 input.
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let _ = Timit::from_phn_str(text, "fuzz.phn", None);
    let _ = Timit::from_phn_str(text, "fuzz.phn", Some(16000));
    if let Some(line) = text.lines().next() {
        let _ = fuzz_parse_phn_line(line);
    }
});
