//! TIMIT phone transcription (`.phn`) reader and writer.
//!
//! A `.phn` file lists one phone per line as whitespace-separated
//! `begin end label`, where `begin` and `end` are sample indices into the
//! matching audio file:
//!
//! ```text
//! 0 3050 h#
//! 3050 4559 sh
//! 4559 5723 ix
//! ```
//!
//! Without a sample rate the segments carry sample units only. With one,
//! seconds are derived as `sample / rate` and the segments carry both.
//!
//! # Format Limitations
//!
//! A `.phn` file holds exactly one sequence and has no place for the audio
//! file path, and labels cannot contain whitespace. Writing requires sample
//! units; seconds-only annotations are rejected rather than guessed at.

use std::fs;
use std::path::Path;

use super::adapter::SeqFormat;
use super::model::{Annotation, Segment, Seqs, Sequence};
use super::units::Bounds;
use crate::error::SeqLabelError;

const FORMAT: &str = "timit";

/// One parsed `.phn` file.
#[derive(Clone, Debug, PartialEq)]
pub struct Timit {
    pub annot_path: String,
    pub notated_path: Option<String>,
    pub seq: Sequence,
}

impl Timit {
    /// Loads a `.phn` file.
    ///
    /// # Arguments
    /// * `path` - Path to the `.phn` file
    /// * `notated_path` - Optional path of the audio file it annotates
    /// * `samplerate` - Optional sample rate (Hz) for deriving seconds
    pub fn from_file(
        path: &Path,
        notated_path: Option<&str>,
        samplerate: Option<u32>,
    ) -> Result<Self, SeqLabelError> {
        let text = fs::read_to_string(path).map_err(SeqLabelError::Io)?;
        let seq = parse_phn(&text, path, samplerate)?;
        log::debug!("read {} phone(s) from {}", seq.len(), path.display());
        Ok(Self {
            annot_path: path.to_string_lossy().into_owned(),
            notated_path: notated_path.map(str::to_string),
            seq,
        })
    }

    /// Parses `.phn` text. `annot_path` is recorded as given.
    pub fn from_phn_str(
        text: &str,
        annot_path: &str,
        samplerate: Option<u32>,
    ) -> Result<Self, SeqLabelError> {
        Ok(Self {
            annot_path: annot_path.to_string(),
            notated_path: None,
            seq: parse_phn(text, Path::new(annot_path), samplerate)?,
        })
    }

    /// Takes the single sequence of an IR annotation.
    ///
    /// # Errors
    /// Returns [`SeqLabelError::UnsupportedTarget`] for multi-sequence
    /// annotations and for sequences without sample units.
    pub fn from_annot(annot: &Annotation) -> Result<Self, SeqLabelError> {
        let seq = match &annot.seq {
            Seqs::Single(seq) => seq,
            Seqs::Multi(seqs) if seqs.len() == 1 => &seqs[0],
            Seqs::Multi(seqs) => {
                return Err(SeqLabelError::UnsupportedTarget {
                    format: FORMAT,
                    message: format!(
                        "'{}' has {} sequences; a .phn file holds one",
                        annot.annot_path,
                        seqs.len()
                    ),
                })
            }
        };
        if !seq.units().has_samples() {
            return Err(SeqLabelError::UnsupportedTarget {
                format: FORMAT,
                message: format!(
                    "'{}' has no sample indices; a .phn file stores sample indices only",
                    annot.annot_path
                ),
            });
        }
        Ok(Self {
            annot_path: annot.annot_path.clone(),
            notated_path: annot.notated_path.clone(),
            seq: seq.clone(),
        })
    }

    /// Renders the `.phn` text.
    pub fn to_phn_string(&self) -> Result<String, SeqLabelError> {
        let mut out = String::new();
        for segment in &self.seq {
            let (Some(onset), Some(offset)) = (segment.onset_sample(), segment.offset_sample())
            else {
                return Err(SeqLabelError::UnsupportedTarget {
                    format: FORMAT,
                    message: format!("segment '{}' has no sample indices", segment.label()),
                });
            };
            if segment.label().chars().any(char::is_whitespace) {
                return Err(SeqLabelError::UnsupportedTarget {
                    format: FORMAT,
                    message: format!("label '{}' contains whitespace", segment.label()),
                });
            }
            out.push_str(&format!("{} {} {}\n", onset, offset, segment.label()));
        }
        Ok(out)
    }

    pub fn to_file(&self, path: &Path) -> Result<(), SeqLabelError> {
        fs::write(path, self.to_phn_string()?).map_err(SeqLabelError::Io)
    }
}

impl SeqFormat for Timit {
    const NAME: &'static str = FORMAT;
    const EXTENSION: &'static str = "phn";

    fn to_annot(&self) -> Vec<Annotation> {
        let annot = Annotation::new(self.annot_path.clone(), self.seq.clone());
        vec![match &self.notated_path {
            Some(notated) => annot.with_notated_path(notated.clone()),
            None => annot,
        }]
    }
}

fn parse_phn(text: &str, path: &Path, samplerate: Option<u32>) -> Result<Sequence, SeqLabelError> {
    if samplerate == Some(0) {
        return Err(format_err(path, 0, "sample rate must be positive".to_string()));
    }

    let mut segments = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if let Some(segment) = parse_phn_line(line, path, idx + 1, samplerate)? {
            segments.push(segment);
        }
    }

    if segments.is_empty() {
        return Err(format_err(path, 0, "file contains no phones".to_string()));
    }
    Sequence::new(segments)
}

/// Parses one `begin end label` line. Blank lines yield `None`.
fn parse_phn_line(
    line: &str,
    path: &Path,
    line_no: usize,
    samplerate: Option<u32>,
) -> Result<Option<Segment>, SeqLabelError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.is_empty() {
        return Ok(None);
    }
    let [begin, end, label] = fields.as_slice() else {
        return Err(format_err(
            path,
            line_no,
            format!("expected 'begin end label', got {} field(s)", fields.len()),
        ));
    };
    let parse_index = |field: &str| {
        field.parse::<u64>().map_err(|e| {
            format_err(path, line_no, format!("invalid sample index '{}': {}", field, e))
        })
    };
    let (onset, offset) = (parse_index(*begin)?, parse_index(*end)?);

    let bounds = match samplerate {
        Some(rate) => Bounds::from_samples_at_rate(onset, offset, rate),
        None => Bounds::samples(onset, offset),
    };
    Segment::new(*label, bounds)
        .map(Some)
        .map_err(|e| format_err(path, line_no, e.to_string()))
}

/// Fuzz-only entrypoint for single-line `.phn` parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_phn_line(input: &str) -> Result<(), SeqLabelError> {
    let _ = parse_phn_line(input, Path::new("<fuzz>"), 1, Some(16000))?;
    Ok(())
}

fn format_err(path: &Path, line: usize, message: String) -> SeqLabelError {
    SeqLabelError::FormatParse {
        format: FORMAT,
        path: path.to_path_buf(),
        line,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Units;

    const PHN: &str = "0 3050 h#\n3050 4559 sh\n4559 5723 ix\n";

    #[test]
    fn test_parse_samples_only() {
        let timit = Timit::from_phn_str(PHN, "sa1.phn", None).unwrap();
        assert_eq!(timit.seq.len(), 3);
        assert_eq!(timit.seq.units(), Units::Samples);
        assert_eq!(timit.seq.segments()[1].onset_sample(), Some(3050));
        assert_eq!(timit.seq.segments()[1].label(), "sh");
    }

    #[test]
    fn test_parse_with_samplerate_adds_seconds() {
        let timit = Timit::from_phn_str("0 16000 h#\n", "sa1.phn", Some(16000)).unwrap();
        let seg = &timit.seq.segments()[0];
        assert_eq!(seg.units(), Units::Both);
        assert_eq!(seg.offset_s(), Some(1.0));
    }

    #[test]
    fn test_blank_lines_skipped_and_bad_lines_located() {
        assert!(Timit::from_phn_str("\n0 10 a\n\n", "x.phn", None).is_ok());

        let err = Timit::from_phn_str("0 10 a\n10 x b\n", "x.phn", None).unwrap_err();
        assert!(matches!(err, SeqLabelError::FormatParse { line: 2, .. }));

        let err = Timit::from_phn_str("0 10\n", "x.phn", None).unwrap_err();
        assert!(matches!(err, SeqLabelError::FormatParse { line: 1, .. }));
    }

    #[test]
    fn test_reversed_interval_rejected() {
        let err = Timit::from_phn_str("20 10 a\n", "x.phn", None).unwrap_err();
        assert!(matches!(err, SeqLabelError::FormatParse { line: 1, .. }));
    }

    #[test]
    fn test_empty_file_rejected() {
        assert!(Timit::from_phn_str("\n\n", "x.phn", None).is_err());
    }

    #[test]
    fn test_write_round_trip() {
        let timit = Timit::from_phn_str(PHN, "sa1.phn", None).unwrap();
        assert_eq!(timit.to_phn_string().unwrap(), PHN);
    }

    #[test]
    fn test_from_annot_requires_samples() {
        let seq = Sequence::new(vec![Segment::from_seconds("a", 0.0, 1.0).unwrap()]).unwrap();
        let err = Timit::from_annot(&Annotation::new("a.txt", seq)).unwrap_err();
        assert!(matches!(err, SeqLabelError::UnsupportedTarget { .. }));
    }

    #[test]
    fn test_from_annot_rejects_multi() {
        let seq = Sequence::new(vec![Segment::from_samples("a", 0, 1).unwrap()]).unwrap();
        let annot = Annotation::with_seqs("a.phn", vec![seq.clone(), seq]).unwrap();
        assert!(Timit::from_annot(&annot).is_err());
    }

    #[test]
    fn test_to_annot_keeps_notated_path() {
        let mut timit = Timit::from_phn_str(PHN, "sa1.phn", None).unwrap();
        timit.notated_path = Some("sa1.wav".to_string());
        let annots = timit.to_annot();
        assert_eq!(annots.len(), 1);
        assert_eq!(annots[0].notated_path.as_deref(), Some("sa1.wav"));
        assert_eq!(annots[0].segment_count(), 3);
    }
}
