//! Simple sequence CSV reader and writer.
//!
//! The smallest useful sequence format: one CSV file per annotation with the
//! header `onset_s,offset_s,label` and one row per segment, times in
//! seconds.
//!
//! ```text
//! onset_s,offset_s,label
//! 0.0,0.1,a
//! 0.2,0.35,b
//! ```
//!
//! # Format Limitations
//!
//! One sequence per file, seconds only, no audio file path.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::adapter::SeqFormat;
use super::model::{Annotation, Segment, Seqs, Sequence};
use crate::error::SeqLabelError;
use crate::table::format_float;

const FORMAT: &str = "simple-seq";

/// A single row of a simple-seq CSV file.
#[derive(Debug, Deserialize)]
struct SimpleRow {
    onset_s: f64,
    offset_s: f64,
    label: String,
}

/// Write-side row; floats are pre-rendered so they never use exponents.
#[derive(Debug, Serialize)]
struct SimpleRowOut<'a> {
    onset_s: String,
    offset_s: String,
    label: &'a str,
}

/// One parsed simple-seq file.
#[derive(Clone, Debug, PartialEq)]
pub struct SimpleSeq {
    pub annot_path: String,
    pub notated_path: Option<String>,
    pub seq: Sequence,
}

impl SimpleSeq {
    pub fn from_file(path: &Path, notated_path: Option<&str>) -> Result<Self, SeqLabelError> {
        let file = File::open(path).map_err(SeqLabelError::Io)?;
        let seq = parse_rows(BufReader::new(file), path)?;
        log::debug!("read {} row(s) from {}", seq.len(), path.display());
        Ok(Self {
            annot_path: path.to_string_lossy().into_owned(),
            notated_path: notated_path.map(str::to_string),
            seq,
        })
    }

    /// Parses simple-seq CSV text. `annot_path` is recorded as given.
    pub fn from_csv_str(csv: &str, annot_path: &str) -> Result<Self, SeqLabelError> {
        Self::from_csv_slice(csv.as_bytes(), annot_path)
    }

    /// Parses simple-seq CSV bytes.
    ///
    /// Useful for fuzzing.
    pub fn from_csv_slice(bytes: &[u8], annot_path: &str) -> Result<Self, SeqLabelError> {
        Ok(Self {
            annot_path: annot_path.to_string(),
            notated_path: None,
            seq: parse_rows(bytes, Path::new(annot_path))?,
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
                        "'{}' has {} sequences; a simple-seq file holds one",
                        annot.annot_path,
                        seqs.len()
                    ),
                })
            }
        };
        if !seq.units().has_seconds() {
            return Err(SeqLabelError::UnsupportedTarget {
                format: FORMAT,
                message: format!("'{}' has no times in seconds", annot.annot_path),
            });
        }
        Ok(Self {
            annot_path: annot.annot_path.clone(),
            notated_path: annot.notated_path.clone(),
            seq: seq.clone(),
        })
    }

    pub fn to_csv_string(&self) -> Result<String, SeqLabelError> {
        let dummy_path = Path::new("<string>");
        let bytes = self.dump(Vec::new(), dummy_path)?;
        String::from_utf8(bytes).map_err(|e| {
            SeqLabelError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }

    pub fn to_file(&self, path: &Path) -> Result<(), SeqLabelError> {
        let file = File::create(path).map_err(SeqLabelError::Io)?;
        self.dump(BufWriter::new(file), path)?
            .flush()
            .map_err(SeqLabelError::Io)
    }

    fn dump<W: Write>(&self, writer: W, path: &Path) -> Result<W, SeqLabelError> {
        let write_err = |source| SeqLabelError::CsvWrite {
            path: path.to_path_buf(),
            source,
        };

        let mut csv_writer = csv::Writer::from_writer(writer);
        for segment in &self.seq {
            let (Some(onset), Some(offset)) = (segment.onset_s(), segment.offset_s()) else {
                return Err(SeqLabelError::UnsupportedTarget {
                    format: FORMAT,
                    message: format!("segment '{}' has no times in seconds", segment.label()),
                });
            };
            csv_writer
                .serialize(SimpleRowOut {
                    onset_s: format_float(onset),
                    offset_s: format_float(offset),
                    label: segment.label(),
                })
                .map_err(write_err)?;
        }

        csv_writer
            .into_inner()
            .map_err(|e| SeqLabelError::Io(e.into_error()))
    }
}

impl SeqFormat for SimpleSeq {
    const NAME: &'static str = FORMAT;
    const EXTENSION: &'static str = "csv";

    fn to_annot(&self) -> Vec<Annotation> {
        let mut annot = Annotation::new(self.annot_path.clone(), self.seq.clone());
        annot.notated_path = self.notated_path.clone();
        vec![annot]
    }
}

fn parse_rows<R: Read>(reader: R, path: &Path) -> Result<Sequence, SeqLabelError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut segments = Vec::new();

    for (idx, result) in csv_reader.deserialize().enumerate() {
        let row: SimpleRow = result.map_err(|source| SeqLabelError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        let segment = Segment::from_seconds(row.label, row.onset_s, row.offset_s).map_err(|e| {
            SeqLabelError::FormatParse {
                format: FORMAT,
                path: path.to_path_buf(),
                // Header is line 1.
                line: idx + 2,
                message: e.to_string(),
            }
        })?;
        segments.push(segment);
    }

    if segments.is_empty() {
        return Err(SeqLabelError::FormatParse {
            format: FORMAT,
            path: path.to_path_buf(),
            line: 0,
            message: "file contains no rows".to_string(),
        });
    }
    Sequence::new(segments)
}
