//! JSON serialization for the seqlabel IR ("seq-json").
//!
//! This provides a lossless JSON dump of an annotation collection. It is
//! useful for:
//! - Debugging conversions by inspecting the intermediate representation
//! - Exchanging annotations between seqlabel instances
//!
//! Deserialization goes through the same checked constructors as the rest
//! of the IR, so a document with an empty label, a reversed interval or an
//! empty sequence is rejected.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::adapter::SeqFormat;
use super::model::Annotation;
use crate::error::SeqLabelError;

/// Top-level seq-json document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SeqJson {
    pub annotations: Vec<Annotation>,
}

impl SeqJson {
    pub fn from_file(path: &Path) -> Result<Self, SeqLabelError> {
        read_seq_json(path).map(|annotations| Self { annotations })
    }

    pub fn to_file(&self, path: &Path) -> Result<(), SeqLabelError> {
        write_seq_json(path, &self.annotations)
    }
}

impl SeqFormat for SeqJson {
    const NAME: &'static str = "seq-json";
    const EXTENSION: &'static str = "json";

    fn to_annot(&self) -> Vec<Annotation> {
        self.annotations.clone()
    }
}

/// Borrowed view used for writing without cloning the annotations.
#[derive(Serialize)]
struct SeqJsonRef<'a> {
    annotations: &'a [Annotation],
}

/// Reads annotations from a seq-json file.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
pub fn read_seq_json(path: &Path) -> Result<Vec<Annotation>, SeqLabelError> {
    let file = File::open(path).map_err(SeqLabelError::Io)?;
    let reader = BufReader::new(file);

    let doc: SeqJson =
        serde_json::from_reader(reader).map_err(|source| SeqLabelError::SeqJsonParse {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!(
        "read {} annotation(s) from {}",
        doc.annotations.len(),
        path.display()
    );
    Ok(doc.annotations)
}

/// Writes annotations to a seq-json file (pretty-printed).
pub fn write_seq_json(path: &Path, annotations: &[Annotation]) -> Result<(), SeqLabelError> {
    let file = File::create(path).map_err(SeqLabelError::Io)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, &SeqJsonRef { annotations }).map_err(|source| {
        SeqLabelError::SeqJsonWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(SeqLabelError::Io)
}

/// Reads annotations from a seq-json string.
///
/// Useful for testing without file I/O.
pub fn from_json_str(json: &str) -> Result<Vec<Annotation>, serde_json::Error> {
    serde_json::from_str::<SeqJson>(json).map(|doc| doc.annotations)
}

/// Reads annotations from seq-json bytes.
///
/// Useful for fuzzing.
pub fn from_json_slice(bytes: &[u8]) -> Result<Vec<Annotation>, serde_json::Error> {
    serde_json::from_slice::<SeqJson>(bytes).map(|doc| doc.annotations)
}

/// Writes annotations to a seq-json string.
///
/// Useful for testing without file I/O.
pub fn to_json_string(annotations: &[Annotation]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&SeqJsonRef { annotations })
}
