//! Fuzz target for simple-seq CSV parsing.
//!
//! Run with:
//!   cargo +nightly fuzz run simple_seq_csv_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use seqlabel::ir::io_simple_seq::SimpleSeq;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = SimpleSeq::from_csv_slice(data, "fuzz.csv");
});
