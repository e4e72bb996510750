//! Fuzz target for generic-seq CSV parsing.
//!
//! Arbitrary bytes go through CSV decoding, schema validation and
//! annotation reconstruction. Only panics and hangs count as failures.
//!
//! Run with:
//!   cargo +nightly fuzz run generic_seq_csv_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use seqlabel::ir::io_generic_seq::from_generic_seq_csv_slice;

fuzz_target!(|data: &[u8]| {
    // Cap input size to avoid OOM on very large inputs.
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = from_generic_seq_csv_slice(data);
});
