//! Fuzz target for Audacity label track parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run audacity_txt_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use seqlabel::ir::io_audacity_txt::AudacityLabels;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let _ = AudacityLabels::from_txt_str(text, "fuzz.txt");
});
