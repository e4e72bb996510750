//! Intermediate Representation (IR) for seqlabel.
//!
//! This module defines the canonical, format-agnostic representation of
//! sequence annotations: labeled time intervals ([`Segment`]) grouped into
//! [`Sequence`]s, attached to an annotation file by an [`Annotation`].
//! Every format conversion passes through it.
//!
//! # Design Principles
//!
//! 1. **Valid by construction**: a `Segment` always carries at least one
//!    complete unit pair with onset <= offset, and a `Sequence` is never
//!    empty and never mixes unit conventions.
//!
//! 2. **Units are explicit**: times are seconds, sample indices, or both,
//!    expressed by the [`Bounds`] sum type rather than nullable fields.
//!
//! 3. **One tabular form**: [`io_generic_seq`] flattens annotations into a
//!    validated table and rebuilds them exactly.
//!
//! # Example
//!
//! ```
//! use seqlabel::ir::{Annotation, Segment, Sequence};
//!
//! let seq = Sequence::new(vec![
//!     Segment::from_seconds("a", 0.0, 1.0)?,
//!     Segment::from_seconds("b", 1.0, 2.0)?,
//! ])?;
//! let annot = Annotation::new("bird1.txt", seq).with_notated_path("bird1.wav");
//! assert_eq!(annot.segment_count(), 2);
//! # Ok::<(), seqlabel::SeqLabelError>(())
//! ```

mod adapter;
pub mod io_audacity_txt;
pub mod io_generic_seq;
pub mod io_json;
pub mod io_simple_seq;
pub mod io_timit_phn;
mod model;
mod units;

// Re-export core types for convenient access
pub use adapter::SeqFormat;
pub use model::{Annotation, Segment, Seqs, Sequence};
pub use units::{Bounds, Units};
