#![allow(dead_code)]

use seqlabel::ir::{Annotation, Bounds, Segment, Sequence, Units};
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// Labels with characters that need CSV quoting, and numeric-looking ones.
pub fn arb_label() -> BoxedStrategy<String> {
    prop_oneof![
        "[a-z]{1,3}",
        "[0-9]{1,2}",
        "[a-z]{1,2}[ ,\"][a-z]{1,2}",
        Just("h#".to_string()),
    ]
    .boxed()
}

pub fn arb_units() -> BoxedStrategy<Units> {
    prop_oneof![Just(Units::Seconds), Just(Units::Samples), Just(Units::Both)].boxed()
}

fn arb_bounds(units: Units) -> BoxedStrategy<Bounds> {
    match units {
        Units::Seconds => (0.0f64..1.0e4, 0.0f64..10.0)
            .prop_map(|(onset, dur)| Bounds::seconds(onset, onset + dur))
            .boxed(),
        Units::Samples => (0u64..10_000_000, 0u64..100_000)
            .prop_map(|(onset, dur)| Bounds::samples(onset, onset + dur))
            .boxed(),
        Units::Both => (0u64..10_000_000, 0u64..100_000, prop_oneof![Just(16_000u32), Just(32_000u32), Just(44_100u32)])
            .prop_map(|(onset, dur, rate)| Bounds::from_samples_at_rate(onset, onset + dur, rate))
            .boxed(),
    }
}

pub fn arb_segment(units: Units) -> BoxedStrategy<Segment> {
    (arb_label(), arb_bounds(units))
        .prop_map(|(label, bounds)| Segment::new(label, bounds).expect("generated segment is valid"))
        .boxed()
}

pub fn arb_sequence(max_segments: usize) -> BoxedStrategy<Sequence> {
    arb_units()
        .prop_flat_map(move |units| prop::collection::vec(arb_segment(units), 1..=max_segments))
        .prop_map(|segments| Sequence::new(segments).expect("generated sequence is valid"))
        .boxed()
}

/// Annotations with distinct paths, each with 1..=`max_seqs` sequences.
pub fn arb_annotations(
    max_annots: usize,
    max_seqs: usize,
    max_segments: usize,
) -> BoxedStrategy<Vec<Annotation>> {
    let annot = (
        prop::collection::vec(arb_sequence(max_segments), 1..=max_seqs),
        prop::option::of("[a-z]{1,6}"),
    );
    prop::collection::vec(annot, 1..=max_annots)
        .prop_map(|items| {
            items
                .into_iter()
                .enumerate()
                .map(|(i, (seqs, notated))| {
                    let path = format!("bird{}/song{}.txt", i % 3, i);
                    let annot = Annotation::with_seqs(path, seqs).expect("at least one sequence");
                    match notated {
                        Some(stem) => annot.with_notated_path(format!("audio/{}.wav", stem)),
                        None => annot,
                    }
                })
                .collect()
        })
        .boxed()
}

/// Seconds-only, single-sequence annotations (what per-file seconds formats hold).
pub fn arb_seconds_sequence(max_segments: usize) -> BoxedStrategy<Sequence> {
    prop::collection::vec(arb_segment(Units::Seconds), 1..=max_segments)
        .prop_map(|segments| Sequence::new(segments).expect("generated sequence is valid"))
        .boxed()
}
