//! Core annotation model for the seqlabel intermediate representation.
//!
//! Every format reader produces [`Annotation`]s and every writer consumes
//! them. An annotation is one source file's worth of labeled intervals:
//! [`Segment`]s grouped into one or more [`Sequence`]s.
//!
//! Unlike a flat table, the model does not allow half-specified data:
//! segments always hold a complete unit pair, sequences are never empty
//! and never mix unit conventions.

use serde::{Deserialize, Deserializer, Serialize};

use super::units::{Bounds, Units};
use crate::error::SeqLabelError;

/// One labeled time interval.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SegmentRepr", into = "SegmentRepr")]
pub struct Segment {
    label: String,
    bounds: Bounds,
}

impl Segment {
    /// Creates a segment, checking the label and the bounds.
    ///
    /// # Errors
    /// Returns [`SeqLabelError::InvalidSegment`] for an empty label, for
    /// negative or non-finite seconds, or when onset comes after offset.
    pub fn new(label: impl Into<String>, bounds: Bounds) -> Result<Self, SeqLabelError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(SeqLabelError::InvalidSegment {
                label,
                message: "label is empty or blank".to_string(),
            });
        }
        bounds
            .check()
            .map_err(|message| SeqLabelError::InvalidSegment {
                label: label.clone(),
                message,
            })?;
        Ok(Self { label, bounds })
    }

    /// Creates a segment with onset/offset in seconds.
    pub fn from_seconds(
        label: impl Into<String>,
        onset_s: f64,
        offset_s: f64,
    ) -> Result<Self, SeqLabelError> {
        Self::new(label, Bounds::seconds(onset_s, offset_s))
    }

    /// Creates a segment with onset/offset as sample indices.
    pub fn from_samples(
        label: impl Into<String>,
        onset_sample: u64,
        offset_sample: u64,
    ) -> Result<Self, SeqLabelError> {
        Self::new(label, Bounds::samples(onset_sample, offset_sample))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn units(&self) -> Units {
        self.bounds.units()
    }

    pub fn onset_s(&self) -> Option<f64> {
        self.bounds.onset_s()
    }

    pub fn offset_s(&self) -> Option<f64> {
        self.bounds.offset_s()
    }

    pub fn onset_sample(&self) -> Option<u64> {
        self.bounds.onset_sample()
    }

    pub fn offset_sample(&self) -> Option<u64> {
        self.bounds.offset_sample()
    }
}

/// Flat serde shape of a segment: label plus whichever unit fields exist.
#[derive(Serialize, Deserialize)]
struct SegmentRepr {
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    onset_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    offset_s: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    onset_sample: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    offset_sample: Option<u64>,
}

impl TryFrom<SegmentRepr> for Segment {
    type Error = SeqLabelError;

    fn try_from(repr: SegmentRepr) -> Result<Self, Self::Error> {
        let bounds = Bounds::from_parts(
            repr.onset_s,
            repr.offset_s,
            repr.onset_sample,
            repr.offset_sample,
        )
        .map_err(|message| SeqLabelError::InvalidSegment {
            label: repr.label.clone(),
            message,
        })?;
        Segment::new(repr.label, bounds)
    }
}

impl From<Segment> for SegmentRepr {
    fn from(segment: Segment) -> Self {
        SegmentRepr {
            onset_s: segment.onset_s(),
            offset_s: segment.offset_s(),
            onset_sample: segment.onset_sample(),
            offset_sample: segment.offset_sample(),
            label: segment.label,
        }
    }
}

/// An ordered, non-empty run of segments sharing one unit convention.
///
/// Segments may overlap; order is insertion order and is never re-sorted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Segment>", into = "Vec<Segment>")]
pub struct Sequence {
    segments: Vec<Segment>,
}

impl Sequence {
    /// Creates a sequence from segments.
    ///
    /// # Errors
    /// Returns [`SeqLabelError::InvalidSequence`] if `segments` is empty or
    /// if the segments do not all carry the same [`Units`].
    pub fn new(segments: Vec<Segment>) -> Result<Self, SeqLabelError> {
        let Some(first) = segments.first() else {
            return Err(SeqLabelError::InvalidSequence {
                message: "a sequence needs at least one segment".to_string(),
            });
        };
        let units = first.units();
        if let Some((idx, odd)) = segments
            .iter()
            .enumerate()
            .find(|(_, seg)| seg.units() != units)
        {
            return Err(SeqLabelError::InvalidSequence {
                message: format!(
                    "segment {} ('{}') uses {} but the sequence uses {}",
                    idx,
                    odd.label(),
                    odd.units(),
                    units
                ),
            });
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Unit convention shared by every segment.
    pub fn units(&self) -> Units {
        // Non-empty by construction.
        self.segments[0].units()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(Segment::label)
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }
}

impl TryFrom<Vec<Segment>> for Sequence {
    type Error = SeqLabelError;

    fn try_from(segments: Vec<Segment>) -> Result<Self, Self::Error> {
        Sequence::new(segments)
    }
}

impl From<Sequence> for Vec<Segment> {
    fn from(seq: Sequence) -> Self {
        seq.segments
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// The sequence payload of an annotation: one sequence, or several.
///
/// Equality compares the sequences in order, so `Multi(vec![s])` equals
/// `Single(s)`. The generic-seq table cannot tell the two apart.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum Seqs {
    Single(Sequence),
    Multi(Vec<Sequence>),
}

impl Seqs {
    /// Collapses a list of sequences: one becomes `Single`, more become
    /// `Multi`, none gives `None`.
    pub fn from_vec(mut seqs: Vec<Sequence>) -> Option<Self> {
        match seqs.len() {
            0 => None,
            1 => seqs.pop().map(Seqs::Single),
            _ => Some(Seqs::Multi(seqs)),
        }
    }

    pub fn as_slice(&self) -> &[Sequence] {
        match self {
            Seqs::Single(seq) => std::slice::from_ref(seq),
            Seqs::Multi(seqs) => seqs,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Returns true when more than one sequence is held.
    pub fn is_multi(&self) -> bool {
        self.len() > 1
    }
}

impl PartialEq for Seqs {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SeqsRepr {
    Single(Sequence),
    Multi(Vec<Sequence>),
}

impl<'de> Deserialize<'de> for Seqs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match SeqsRepr::deserialize(deserializer)? {
            SeqsRepr::Single(seq) => Ok(Seqs::Single(seq)),
            SeqsRepr::Multi(seqs) if seqs.is_empty() => Err(serde::de::Error::custom(
                "an annotation needs at least one sequence",
            )),
            SeqsRepr::Multi(seqs) => Ok(Seqs::Multi(seqs)),
        }
    }
}

impl From<Sequence> for Seqs {
    fn from(seq: Sequence) -> Self {
        Seqs::Single(seq)
    }
}

/// One source file's annotations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Path of the annotation file this came from.
    pub annot_path: String,

    /// Optional path of the audio (or other data) file being annotated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notated_path: Option<String>,

    /// The annotated sequence(s).
    pub seq: Seqs,
}

impl Annotation {
    /// Creates an annotation holding a single sequence.
    pub fn new(annot_path: impl Into<String>, seq: Sequence) -> Self {
        Self {
            annot_path: annot_path.into(),
            notated_path: None,
            seq: Seqs::Single(seq),
        }
    }

    /// Creates an annotation from a list of sequences.
    ///
    /// # Errors
    /// Returns [`SeqLabelError::EmptyAnnotation`] if `seqs` is empty.
    pub fn with_seqs(
        annot_path: impl Into<String>,
        seqs: Vec<Sequence>,
    ) -> Result<Self, SeqLabelError> {
        let annot_path = annot_path.into();
        match Seqs::from_vec(seqs) {
            Some(seq) => Ok(Self {
                annot_path,
                notated_path: None,
                seq,
            }),
            None => Err(SeqLabelError::EmptyAnnotation { annot_path }),
        }
    }

    /// Sets the notated (audio) file path.
    pub fn with_notated_path(mut self, notated_path: impl Into<String>) -> Self {
        self.notated_path = Some(notated_path.into());
        self
    }

    pub fn sequences(&self) -> &[Sequence] {
        self.seq.as_slice()
    }

    /// Total number of segments across all sequences.
    pub fn segment_count(&self) -> usize {
        self.sequences().iter().map(Sequence::len).sum()
    }
}
