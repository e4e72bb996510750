//! Conversion report types for tracking lossiness and policy decisions.
//!
//! This module provides structured reporting for format conversions,
//! similar to how `validation::SchemaError` reports table problems.

use serde::Serialize;
use std::fmt;

/// A report generated before a format conversion runs.
///
/// Tracks input/output counts, blocking errors, lossiness warnings and
/// policy decisions, so users can see exactly what a conversion does.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversionReport {
    /// Source format name.
    pub from: String,
    /// Target format name.
    pub to: String,
    /// Counts from the input annotations.
    pub input: ConversionCounts,
    /// Counts in the output (annotations sharing a path merge, etc.).
    pub output: ConversionCounts,
    /// Issues discovered during conversion analysis.
    pub issues: Vec<ConversionIssue>,
}

impl ConversionReport {
    /// Create a new empty report for a conversion between formats.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            ..Default::default()
        }
    }

    /// Add an issue to the report.
    pub fn add(&mut self, issue: ConversionIssue) {
        self.issues.push(issue);
    }

    fn count(&self, severity: ConversionSeverity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }

    /// Count of error-level issues (the conversion cannot be done).
    pub fn error_count(&self) -> usize {
        self.count(ConversionSeverity::Error)
    }

    /// Count of warning-level issues (true lossiness).
    pub fn warning_count(&self) -> usize {
        self.count(ConversionSeverity::Warning)
    }

    /// Count of info-level issues (policy decisions, notes).
    pub fn info_count(&self) -> usize {
        self.count(ConversionSeverity::Info)
    }

    /// Returns true if the target format cannot represent the input at all.
    pub fn is_blocked(&self) -> bool {
        self.error_count() > 0
    }

    /// Returns true if this conversion would lose information.
    pub fn is_lossy(&self) -> bool {
        self.warning_count() > 0
    }

    /// Iterate over warning messages.
    pub fn lossy_messages(&self) -> impl Iterator<Item = &str> {
        self.messages(ConversionSeverity::Warning)
    }

    fn messages(&self, severity: ConversionSeverity) -> impl Iterator<Item = &str> {
        self.issues
            .iter()
            .filter(move |i| i.severity == severity)
            .map(|i| i.message.as_str())
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Conversion {} -> {}", self.from, self.to)?;
        writeln!(
            f,
            "  {} annotations, {} sequences, {} segments",
            self.input.annotations, self.input.sequences, self.input.segments
        )?;

        // Show output counts if they differ from input
        if self.output != self.input {
            writeln!(
                f,
                "  output: {} annotations, {} sequences, {} segments",
                self.output.annotations, self.output.sequences, self.output.segments
            )?;
        }

        for (severity, title) in [
            (ConversionSeverity::Error, "Errors"),
            (ConversionSeverity::Warning, "Warnings"),
            (ConversionSeverity::Info, "Notes"),
        ] {
            let count = self.count(severity);
            if count == 0 {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "{} ({}):", title, count)?;
            for message in self.messages(severity) {
                writeln!(f, "  - {}", message)?;
            }
        }

        Ok(())
    }
}

/// Counts of annotation elements.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConversionCounts {
    pub annotations: usize,
    pub sequences: usize,
    pub segments: usize,
}

/// A single issue discovered during conversion analysis.
#[derive(Clone, Debug, Serialize)]
pub struct ConversionIssue {
    pub severity: ConversionSeverity,
    pub code: ConversionIssueCode,
    pub message: String,
}

impl ConversionIssue {
    /// Create an error-level issue (the conversion cannot proceed).
    pub fn error(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Error,
            code,
            message: message.into(),
        }
    }

    /// Create a warning-level issue (indicates lossiness).
    pub fn warning(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Create an info-level issue (policy note, does not block).
    pub fn info(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Info,
            code,
            message: message.into(),
        }
    }
}

/// Severity level for conversion issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionSeverity {
    /// The target format cannot hold the input; the conversion is refused.
    Error,
    /// A warning indicates information loss; requires `--allow-lossy`.
    Warning,
    /// An info note describes policy decisions; does not block conversion.
    Info,
}

/// Stable issue codes for programmatic consumption.
///
/// These codes are part of the JSON schema and should remain stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionIssueCode {
    // Blocking
    /// The target needs seconds but some sequences only have sample indices.
    MissingSeconds,
    /// The target needs sample indices but some sequences only have seconds.
    MissingSamples,
    /// The target holds one sequence per file.
    MultiSequenceUnsupported,
    /// Two annotations would be written to the same output file.
    OutputNameCollision,

    // Lossiness
    /// Sample indices will be dropped.
    DropSampleValues,
    /// Times in seconds will be dropped.
    DropSecondsValues,
    /// The notated (audio) file path will be dropped.
    DropNotatedPath,
    /// Distinct annotations share an `annot_path` and merge when read back.
    DuplicateAnnotPath,
    /// Distinct paths collapse to the same basename.
    BasenameCollision,

    // Policy decisions (Info level)
    /// Paths are written as their final component only.
    BasenamePaths,
    /// TIMIT reader derives seconds from the sample rate.
    TimitReaderSecondsFromSamplerate,
    /// Audacity reader skips spectral selection lines.
    AudacityReaderSkipsSpectralLines,
    /// Per-file writers name each output after its annotation file.
    PerFileOutputNaming,
}
