//! Conversion between sequence annotation formats.
//!
//! This module provides structured reporting for conversions, tracking what
//! information is preserved, lost or refused according to deterministic
//! policies, plus the format dispatch used to load and save annotations.

pub mod report;

pub use report::{
    ConversionCounts, ConversionIssue, ConversionIssueCode, ConversionReport, ConversionSeverity,
};

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::SeqLabelError;
use crate::ir::io_audacity_txt::AudacityLabels;
use crate::ir::io_generic_seq::{read_generic_seq_csv, write_generic_seq_csv, GenericSeq};
use crate::ir::io_json::{read_seq_json, write_seq_json, SeqJson};
use crate::ir::io_simple_seq::SimpleSeq;
use crate::ir::io_timit_phn::Timit;
use crate::ir::{Annotation, SeqFormat, Units};

/// Format identifier for conversion reporting and dispatch.
///
/// This mirrors the CLI's format argument but is decoupled from clap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    GenericSeq,
    SeqJson,
    Timit,
    Audacity,
    SimpleSeq,
}

/// Classification of how lossy a format is relative to the IR.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IrLossiness {
    /// Format can represent everything in the IR (round-trip safe).
    Lossless,
    /// Format may lose some information depending on the annotations.
    Conditional,
}

impl Format {
    /// Human-readable name for the format.
    pub fn name(&self) -> &'static str {
        match self {
            Format::GenericSeq => GenericSeq::NAME,
            Format::SeqJson => SeqJson::NAME,
            Format::Timit => Timit::NAME,
            Format::Audacity => AudacityLabels::NAME,
            Format::SimpleSeq => SimpleSeq::NAME,
        }
    }

    /// File extension (without the dot) files of this format use.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::GenericSeq => GenericSeq::EXTENSION,
            Format::SeqJson => SeqJson::EXTENSION,
            Format::Timit => Timit::EXTENSION,
            Format::Audacity => AudacityLabels::EXTENSION,
            Format::SimpleSeq => SimpleSeq::EXTENSION,
        }
    }

    /// Whether one file holds many annotations (as opposed to one per file).
    pub fn is_collection(&self) -> bool {
        matches!(self, Format::GenericSeq | Format::SeqJson)
    }

    /// Whether the format stores times in seconds.
    pub fn stores_seconds(&self) -> bool {
        !matches!(self, Format::Timit)
    }

    /// Whether the format stores sample indices.
    pub fn stores_samples(&self) -> bool {
        matches!(self, Format::GenericSeq | Format::SeqJson | Format::Timit)
    }

    /// Whether an annotation may hold more than one sequence.
    pub fn supports_multi_seq(&self) -> bool {
        self.is_collection()
    }

    /// Whether the audio file path is kept.
    pub fn supports_notated_path(&self) -> bool {
        self.is_collection()
    }

    /// How lossy this format is relative to the IR.
    ///
    /// - `GenericSeq`, `SeqJson`: Lossless
    /// - per-file formats: Conditional (one sequence, one unit family, no
    ///   audio path)
    pub fn lossiness_relative_to_ir(&self) -> IrLossiness {
        if self.is_collection() {
            IrLossiness::Lossless
        } else {
            IrLossiness::Conditional
        }
    }
}

/// Options that change how annotations are read or written.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Write `annot_path`/`notated_path` as their final component only.
    pub basename: bool,
    /// Sample rate (Hz) used to derive seconds when reading TIMIT files.
    pub samplerate: Option<u32>,
}

/// Build a conversion report analyzing what will happen during conversion.
///
/// This function examines the annotations and target format to determine:
/// - Input/output counts
/// - What cannot be written at all (errors)
/// - What information will be lost (warnings)
/// - What policy decisions apply (info notes)
pub fn build_conversion_report(
    annotations: &[Annotation],
    from: Format,
    to: Format,
    opts: &ConvertOptions,
) -> ConversionReport {
    let mut report = ConversionReport::new(from.name(), to.name());
    report.input = counts(annotations);
    report.output = report.input.clone();

    check_units(annotations, to, &mut report);
    check_structure(annotations, to, &mut report);
    check_paths(annotations, to, opts, &mut report);

    // Add policy notes based on source format
    match from {
        Format::Timit => {
            if let Some(rate) = opts.samplerate {
                report.add(ConversionIssue::info(
                    ConversionIssueCode::TimitReaderSecondsFromSamplerate,
                    format!("TIMIT reader derives seconds as sample / {} Hz", rate),
                ));
            }
        }
        Format::Audacity => report.add(ConversionIssue::info(
            ConversionIssueCode::AudacityReaderSkipsSpectralLines,
            "Audacity reader skips spectral selection lines (starting with '\\')",
        )),
        Format::GenericSeq | Format::SeqJson | Format::SimpleSeq => {}
    }

    // Add policy notes based on target format
    if !to.is_collection() {
        report.add(ConversionIssue::info(
            ConversionIssueCode::PerFileOutputNaming,
            format!(
                "{} writer creates one <stem>.{} file per annotation in the output directory",
                to.name(),
                to.extension()
            ),
        ));
    }

    report
}

fn counts(annotations: &[Annotation]) -> ConversionCounts {
    ConversionCounts {
        annotations: annotations.len(),
        sequences: annotations.iter().map(|a| a.sequences().len()).sum(),
        segments: annotations.iter().map(Annotation::segment_count).sum(),
    }
}

fn units_of(annotations: &[Annotation]) -> impl Iterator<Item = Units> + '_ {
    annotations
        .iter()
        .flat_map(|a| a.sequences().iter().map(|s| s.units()))
}

/// Unit families the target cannot store, or needs but does not get.
fn check_units(annotations: &[Annotation], to: Format, report: &mut ConversionReport) {
    let mut missing_seconds = 0;
    let mut missing_samples = 0;
    let mut dropped_seconds = 0;
    let mut dropped_samples = 0;

    for units in units_of(annotations) {
        let storable = (units.has_seconds() && to.stores_seconds())
            || (units.has_samples() && to.stores_samples());
        if !storable {
            if to.stores_seconds() {
                missing_seconds += 1;
            } else {
                missing_samples += 1;
            }
            continue;
        }
        if units.has_seconds() && !to.stores_seconds() {
            dropped_seconds += 1;
        }
        if units.has_samples() && !to.stores_samples() {
            dropped_samples += 1;
        }
    }

    if missing_seconds > 0 {
        report.add(ConversionIssue::error(
            ConversionIssueCode::MissingSeconds,
            format!(
                "{} sequence(s) have only sample indices but {} stores seconds; \
                 read them with a sample rate",
                missing_seconds,
                to.name()
            ),
        ));
    }
    if missing_samples > 0 {
        report.add(ConversionIssue::error(
            ConversionIssueCode::MissingSamples,
            format!(
                "{} sequence(s) have only seconds but {} stores sample indices",
                missing_samples,
                to.name()
            ),
        ));
    }
    if dropped_seconds > 0 {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::DropSecondsValues,
            format!("{} sequence(s) will lose their times in seconds", dropped_seconds),
        ));
    }
    if dropped_samples > 0 {
        report.add(ConversionIssue::warning(
            ConversionIssueCode::DropSampleValues,
            format!("{} sequence(s) will lose their sample indices", dropped_samples),
        ));
    }
}

fn check_structure(annotations: &[Annotation], to: Format, report: &mut ConversionReport) {
    if !to.supports_multi_seq() {
        let multi = annotations.iter().filter(|a| a.seq.is_multi()).count();
        if multi > 0 {
            report.add(ConversionIssue::error(
                ConversionIssueCode::MultiSequenceUnsupported,
                format!(
                    "{} annotation(s) hold more than one sequence; {} holds one per file",
                    multi,
                    to.name()
                ),
            ));
        }
    }

    if !to.supports_notated_path() {
        let with_notated = annotations
            .iter()
            .filter(|a| a.notated_path.is_some())
            .count();
        if with_notated > 0 {
            report.add(ConversionIssue::warning(
                ConversionIssueCode::DropNotatedPath,
                format!("{} annotation(s) will lose their notated_path", with_notated),
            ));
        }
    }
}

/// Path clashes: merged annotations, basename collisions, output file names.
fn check_paths(
    annotations: &[Annotation],
    to: Format,
    opts: &ConvertOptions,
    report: &mut ConversionReport,
) {
    if to.is_collection() {
        let duplicates = duplicate_count(annotations.iter().map(|a| a.annot_path.clone()));
        if duplicates > 0 && to == Format::GenericSeq {
            report.add(ConversionIssue::warning(
                ConversionIssueCode::DuplicateAnnotPath,
                format!(
                    "{} annotation(s) share an annot_path with an earlier one and will be \
                     merged when the table is read back",
                    duplicates
                ),
            ));
        }

        if opts.basename && to == Format::GenericSeq {
            let distinct: HashSet<&str> =
                annotations.iter().map(|a| a.annot_path.as_str()).collect();
            let collisions =
                duplicate_count(distinct.into_iter().map(|p| basename(p).to_string()));
            if collisions > 0 {
                report.add(ConversionIssue::warning(
                    ConversionIssueCode::BasenameCollision,
                    format!(
                        "{} distinct annot_path value(s) collide with another after taking \
                         the basename",
                        collisions
                    ),
                ));
            }
            report.add(ConversionIssue::info(
                ConversionIssueCode::BasenamePaths,
                "annot_path and notated_path are written as their final path component",
            ));
        }

        if to == Format::GenericSeq {
            report.output = merged_counts(annotations, opts.basename);
        }
    } else {
        let collisions =
            duplicate_count(annotations.iter().map(|a| output_file_name(&a.annot_path, to)));
        if collisions > 0 {
            report.add(ConversionIssue::error(
                ConversionIssueCode::OutputNameCollision,
                format!(
                    "{} annotation(s) would overwrite another output file with the same name",
                    collisions
                ),
            ));
        }
    }
}

/// Number of items equal to an earlier item.
fn duplicate_count(items: impl Iterator<Item = String>) -> usize {
    let mut seen = HashSet::new();
    items.filter(|item| !seen.insert(item.clone())).count()
}

/// Counts after the generic-seq table merges annotations by path.
fn merged_counts(annotations: &[Annotation], use_basename: bool) -> ConversionCounts {
    // path -> number of sequence indices used
    let mut groups: HashMap<String, usize> = HashMap::new();
    for annot in annotations {
        let key = if use_basename {
            basename(&annot.annot_path).to_string()
        } else {
            annot.annot_path.clone()
        };
        let n_seqs = groups.entry(key).or_default();
        *n_seqs = (*n_seqs).max(annot.sequences().len());
    }
    ConversionCounts {
        annotations: groups.len(),
        sequences: groups.values().sum(),
        segments: annotations.iter().map(Annotation::segment_count).sum(),
    }
}

fn basename(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
}

/// Output file name for one annotation in a per-file format.
pub fn output_file_name(annot_path: &str, to: Format) -> String {
    let stem = Path::new(annot_path)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "annotation".to_string());
    format!("{}.{}", stem, to.extension())
}

// ============================================================================
// Loading and saving
// ============================================================================

/// Expands directories into the files of `format` they contain.
///
/// Files given explicitly are kept whatever their extension. Directory
/// contents are filtered by the format's extension (case-insensitive) and
/// visited in file name order.
pub fn collect_input_files(inputs: &[PathBuf], format: Format) -> Result<Vec<PathBuf>, SeqLabelError> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }
        for entry in WalkDir::new(input).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                SeqLabelError::Io(e.into_io_error().unwrap_or_else(|| {
                    std::io::Error::other(format!("cannot walk {}", input.display()))
                }))
            })?;
            let matches_ext = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(format.extension()));
            if entry.file_type().is_file() && matches_ext {
                files.push(entry.into_path());
            }
        }
    }
    log::debug!("{} input file(s) for {}", files.len(), format.name());
    Ok(files)
}

/// Loads annotations from files and directories in the given format.
pub fn load_annotations(
    format: Format,
    inputs: &[PathBuf],
    opts: &ConvertOptions,
) -> Result<Vec<Annotation>, SeqLabelError> {
    let files = collect_input_files(inputs, format)?;
    let mut annotations = Vec::new();
    for path in &files {
        match format {
            Format::GenericSeq => annotations.extend(read_generic_seq_csv(path)?),
            Format::SeqJson => annotations.extend(read_seq_json(path)?),
            Format::Timit => {
                annotations.extend(Timit::from_file(path, None, opts.samplerate)?.to_annot())
            }
            Format::Audacity => annotations.extend(AudacityLabels::from_file(path, None)?.to_annot()),
            Format::SimpleSeq => annotations.extend(SimpleSeq::from_file(path, None)?.to_annot()),
        }
    }
    log::info!(
        "loaded {} annotation(s) from {} {} file(s)",
        annotations.len(),
        files.len(),
        format.name()
    );
    Ok(annotations)
}

/// Saves annotations in the given format.
///
/// Collection formats write the single file `output`. Per-file formats
/// treat `output` as a directory (created if needed) and write one file per
/// annotation, named by [`output_file_name`]. Returns the files written.
pub fn save_annotations(
    format: Format,
    annotations: &[Annotation],
    output: &Path,
    opts: &ConvertOptions,
) -> Result<Vec<PathBuf>, SeqLabelError> {
    match format {
        Format::GenericSeq => {
            write_generic_seq_csv(output, annotations, opts.basename)?;
            Ok(vec![output.to_path_buf()])
        }
        Format::SeqJson => {
            write_seq_json(output, annotations)?;
            Ok(vec![output.to_path_buf()])
        }
        Format::Timit | Format::Audacity | Format::SimpleSeq => {
            fs::create_dir_all(output).map_err(SeqLabelError::Io)?;
            // Resolve every target first so nothing is written for a
            // collection that cannot be converted.
            let mut pending = BTreeMap::new();
            for annot in annotations {
                let file = output.join(output_file_name(&annot.annot_path, format));
                let target = PerFileTarget::from_annot(format, annot)?;
                if pending.insert(file.clone(), target).is_some() {
                    return Err(SeqLabelError::UnsupportedTarget {
                        format: format.name(),
                        message: format!("two annotations map to {}", file.display()),
                    });
                }
            }
            for (file, target) in &pending {
                target.to_file(file)?;
            }
            log::info!(
                "wrote {} {} file(s) to {}",
                pending.len(),
                format.name(),
                output.display()
            );
            Ok(pending.into_keys().collect())
        }
    }
}

/// A single-annotation file ready to be written.
enum PerFileTarget {
    Timit(Timit),
    Audacity(AudacityLabels),
    SimpleSeq(SimpleSeq),
}

impl PerFileTarget {
    fn from_annot(format: Format, annot: &Annotation) -> Result<Self, SeqLabelError> {
        match format {
            Format::Timit => Timit::from_annot(annot).map(Self::Timit),
            Format::Audacity => AudacityLabels::from_annot(annot).map(Self::Audacity),
            Format::SimpleSeq => SimpleSeq::from_annot(annot).map(Self::SimpleSeq),
            Format::GenericSeq | Format::SeqJson => Err(SeqLabelError::UnsupportedTarget {
                format: format.name(),
                message: "not a per-file format".to_string(),
            }),
        }
    }

    fn to_file(&self, path: &Path) -> Result<(), SeqLabelError> {
        match self {
            Self::Timit(t) => t.to_file(path),
            Self::Audacity(a) => a.to_file(path),
            Self::SimpleSeq(s) => s.to_file(path),
        }
    }
}
