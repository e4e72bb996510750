use std::path::PathBuf;
use thiserror::Error;

use crate::conversion::ConversionReport;
use crate::validation::SchemaError;

/// The main error type for seqlabel operations.
#[derive(Debug, Error)]
pub enum SeqLabelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema validation failed: {0}")]
    Schema(#[from] SchemaError),

    #[error("Failed to parse CSV from {path}: {source}")]
    CsvParse {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to write CSV to {path}: {source}")]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to parse seq JSON from {path}: {source}")]
    SeqJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write seq JSON to {path}: {source}")]
    SeqJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse {format} file {path} at line {line}: {message}")]
    FormatParse {
        format: &'static str,
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("Invalid segment '{label}': {message}")]
    InvalidSegment { label: String, message: String },

    #[error("Invalid sequence: {message}")]
    InvalidSequence { message: String },

    #[error("Annotation '{annot_path}' has no sequences")]
    EmptyAnnotation { annot_path: String },

    #[error("Annotation '{annot_path}' has a blank notated_path")]
    BlankNotatedPath { annot_path: String },

    #[error("Inconsistent notated_path for '{annot_path}': '{first}' vs '{other}'")]
    InconsistentNotatedPath {
        annot_path: String,
        first: String,
        other: String,
    },

    #[error("Cannot rebuild annotation '{annot_path}' sequence {sequence} (data row {row}): {source}")]
    Reconstruction {
        annot_path: String,
        sequence: u64,
        row: usize,
        #[source]
        source: Box<SeqLabelError>,
    },

    #[error("Column '{column}' has {actual} row(s), expected {expected}")]
    TableShape {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Cannot write {format}: {message}")]
    UnsupportedTarget {
        format: &'static str,
        message: String,
    },

    #[error("Conversion from {from} to {to} is not possible ({error_count} error(s))")]
    ConversionBlocked {
        from: String,
        to: String,
        error_count: usize,
        report: Box<ConversionReport>,
    },

    #[error("Lossy conversion from {from} to {to} ({warning_count} warning(s)); pass --allow-lossy to proceed")]
    LossyConversion {
        from: String,
        to: String,
        warning_count: usize,
        report: Box<ConversionReport>,
    },
}
