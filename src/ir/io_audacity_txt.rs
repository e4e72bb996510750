//! Audacity label track (`.txt`) reader and writer.
//!
//! Audacity exports labels as tab-separated `onset\toffset\tlabel` lines,
//! with times in seconds. Labels made in the spectrogram view add a second
//! line starting with `\` that holds the frequency range; those lines are
//! skipped.
//!
//! ```text
//! 0.500000	0.750000	chirp
//! \	1200.000000	4800.000000
//! 1.250000	1.600000	trill
//! ```
//!
//! # Format Limitations
//!
//! One sequence per file, seconds only. Sample indices and the audio file
//! path are not represented; labels cannot contain tabs or line breaks.

use std::fs;
use std::path::Path;

use super::adapter::SeqFormat;
use super::model::{Annotation, Segment, Seqs, Sequence};
use crate::error::SeqLabelError;
use crate::table::format_float;

const FORMAT: &str = "audacity";

/// One parsed Audacity label track.
#[derive(Clone, Debug, PartialEq)]
pub struct AudacityLabels {
    pub annot_path: String,
    pub notated_path: Option<String>,
    pub seq: Sequence,
}

impl AudacityLabels {
    pub fn from_file(path: &Path, notated_path: Option<&str>) -> Result<Self, SeqLabelError> {
        let text = fs::read_to_string(path).map_err(SeqLabelError::Io)?;
        let seq = parse_labels(&text, path)?;
        log::debug!("read {} label(s) from {}", seq.len(), path.display());
        Ok(Self {
            annot_path: path.to_string_lossy().into_owned(),
            notated_path: notated_path.map(str::to_string),
            seq,
        })
    }

    /// Parses label track text. `annot_path` is recorded as given.
    pub fn from_txt_str(text: &str, annot_path: &str) -> Result<Self, SeqLabelError> {
        Ok(Self {
            annot_path: annot_path.to_string(),
            notated_path: None,
            seq: parse_labels(text, Path::new(annot_path))?,
        })
    }

    /// Takes the single sequence of an IR annotation.
    ///
    /// # Errors
    /// Returns [`SeqLabelError::UnsupportedTarget`] for multi-sequence
    /// annotations and for sequences without seconds.
    pub fn from_annot(annot: &Annotation) -> Result<Self, SeqLabelError> {
        let seq = match &annot.seq {
            Seqs::Single(seq) => seq,
            Seqs::Multi(seqs) if seqs.len() == 1 => &seqs[0],
            Seqs::Multi(seqs) => {
                return Err(SeqLabelError::UnsupportedTarget {
                    format: FORMAT,
                    message: format!(
                        "'{}' has {} sequences; a label track holds one",
                        annot.annot_path,
                        seqs.len()
                    ),
                })
            }
        };
        if !seq.units().has_seconds() {
            return Err(SeqLabelError::UnsupportedTarget {
                format: FORMAT,
                message: format!(
                    "'{}' has no times in seconds; pass a sample rate when reading it",
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

    /// Renders the label track text.
    pub fn to_txt_string(&self) -> Result<String, SeqLabelError> {
        let mut out = String::new();
        for segment in &self.seq {
            let (Some(onset), Some(offset)) = (segment.onset_s(), segment.offset_s()) else {
                return Err(SeqLabelError::UnsupportedTarget {
                    format: FORMAT,
                    message: format!("segment '{}' has no times in seconds", segment.label()),
                });
            };
            if segment.label().contains(['\t', '\n', '\r']) {
                return Err(SeqLabelError::UnsupportedTarget {
                    format: FORMAT,
                    message: format!("label {:?} contains a tab or line break", segment.label()),
                });
            }
            out.push_str(&format!(
                "{}\t{}\t{}\n",
                format_float(onset),
                format_float(offset),
                segment.label()
            ));
        }
        Ok(out)
    }

    pub fn to_file(&self, path: &Path) -> Result<(), SeqLabelError> {
        fs::write(path, self.to_txt_string()?).map_err(SeqLabelError::Io)
    }
}

impl SeqFormat for AudacityLabels {
    const NAME: &'static str = FORMAT;
    const EXTENSION: &'static str = "txt";

    fn to_annot(&self) -> Vec<Annotation> {
        let mut annot = Annotation::new(self.annot_path.clone(), self.seq.clone());
        annot.notated_path = self.notated_path.clone();
        vec![annot]
    }
}

fn parse_labels(text: &str, path: &Path) -> Result<Sequence, SeqLabelError> {
    let parse_err = |line: usize, message: String| SeqLabelError::FormatParse {
        format: FORMAT,
        path: path.to_path_buf(),
        line,
        message,
    };

    let mut segments = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim().is_empty() || line.starts_with('\\') {
            continue;
        }

        let mut fields = line.splitn(3, '\t');
        let (Some(onset), Some(offset)) = (fields.next(), fields.next()) else {
            return Err(parse_err(
                line_no,
                "expected 'onset<TAB>offset<TAB>label'".to_string(),
            ));
        };
        let label = fields.next().unwrap_or_default();

        let parse_time = |field: &str| {
            field
                .trim()
                .parse::<f64>()
                .map_err(|e| parse_err(line_no, format!("invalid time '{}': {}", field, e)))
        };
        let segment = Segment::from_seconds(label, parse_time(onset)?, parse_time(offset)?)
            .map_err(|e| parse_err(line_no, e.to_string()))?;
        segments.push(segment);
    }

    if segments.is_empty() {
        return Err(parse_err(0, "file contains no labels".to_string()));
    }
    Sequence::new(segments)
}
