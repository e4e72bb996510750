//! Generic-seq CSV: the tabular form of the seqlabel IR.
//!
//! One row per [`Segment`], with two grouping keys that let the annotation
//! structure be rebuilt from flat rows:
//! - `annot_path`: which annotation the row belongs to
//! - `sequence`: which sequence (0-based) within that annotation
//!
//! Columns: `annot_path`, `notated_path` (optional), `sequence`, `label`,
//! and `onset_s`/`offset_s` and/or `onset_sample`/`offset_sample`.
//!
//! # Unit coverage
//!
//! The unit columns written are the union over all segments in the input.
//! A segment lacking a unit leaves those cells empty, which still
//! validates: the pair rules are per column, the completeness rule per row.
//!
//! # Deterministic reconstruction
//!
//! - Annotations come back in first-seen order of `annot_path`
//! - Sequences come back in ascending `sequence` order, not file order
//! - Segments keep their row order within a sequence
//!
//! Writing then reading (without basename mode) returns equal annotations.
//! Both directions pass through [`validate`]; a schema failure on read is
//! returned unchanged as [`SeqLabelError::Schema`].

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use super::adapter::SeqFormat;
use super::model::{Annotation, Segment, Seqs, Sequence};
use super::units::Bounds;
use crate::error::SeqLabelError;
use crate::table::io_csv::{read_table_csv, table_from_csv_slice, table_to_csv_string, write_table_csv};
use crate::table::{Column, ColumnName, Table};
use crate::validation::{validate, SchemaError, SchemaViolation, ValidatedTable, ViolationCode};

/// One flattened segment: the row shape of the generic-seq table.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentRow {
    pub annot_path: String,
    pub notated_path: Option<String>,
    pub sequence: u64,
    pub label: String,
    pub onset_s: Option<f64>,
    pub offset_s: Option<f64>,
    pub onset_sample: Option<u64>,
    pub offset_sample: Option<u64>,
}

// ============================================================================
// Public API
// ============================================================================

/// A collection of annotations stored as one generic-seq CSV.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenericSeq {
    pub annots: Vec<Annotation>,
}

impl GenericSeq {
    pub fn new(annots: Vec<Annotation>) -> Self {
        Self { annots }
    }

    /// Loads annotations from a generic-seq CSV file.
    pub fn from_file(path: &Path) -> Result<Self, SeqLabelError> {
        read_generic_seq_csv(path).map(Self::new)
    }

    /// Saves the annotations, optionally with basename paths.
    pub fn to_file(&self, path: &Path, basename: bool) -> Result<(), SeqLabelError> {
        write_generic_seq_csv(path, &self.annots, basename)
    }

    /// The validated table form of the annotations.
    pub fn to_table(&self, basename: bool) -> Result<ValidatedTable, SeqLabelError> {
        annotations_to_table(&self.annots, basename)
    }
}

impl SeqFormat for GenericSeq {
    const NAME: &'static str = "generic-seq";
    const EXTENSION: &'static str = "csv";

    fn to_annot(&self) -> Vec<Annotation> {
        self.annots.clone()
    }
}

/// Reads annotations from a generic-seq CSV file.
///
/// # Errors
/// Returns [`SeqLabelError::Schema`] if the table breaks the schema, a
/// reconstruction error if rows cannot form valid segments/sequences, or
/// an I/O or CSV error.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use seqlabel::ir::io_generic_seq::read_generic_seq_csv;
///
/// let annots = read_generic_seq_csv(Path::new("annotations.csv"))?;
/// # Ok::<(), seqlabel::SeqLabelError>(())
/// ```
pub fn read_generic_seq_csv(path: &Path) -> Result<Vec<Annotation>, SeqLabelError> {
    let table = validate(read_table_csv(path)?)?;
    let annots = table_to_annotations(&table)?;
    log::info!(
        "read {} annotation(s) from {} row(s) in {}",
        annots.len(),
        table.n_rows(),
        path.display()
    );
    Ok(annots)
}

/// Writes annotations to a generic-seq CSV file.
///
/// With `basename`, `annot_path` and `notated_path` are written as their
/// final path component only. A failed write leaves no guarantee about the
/// destination's contents.
pub fn write_generic_seq_csv(
    path: &Path,
    annotations: &[Annotation],
    basename: bool,
) -> Result<(), SeqLabelError> {
    let table = annotations_to_table(annotations, basename)?;
    write_table_csv(path, &table)?;
    log::info!(
        "wrote {} row(s) for {} annotation(s) to {}",
        table.n_rows(),
        annotations.len(),
        path.display()
    );
    Ok(())
}

/// Reads annotations from a generic-seq CSV string.
///
/// Useful for testing without file I/O.
pub fn from_generic_seq_csv_str(csv: &str) -> Result<Vec<Annotation>, SeqLabelError> {
    from_generic_seq_csv_slice(csv.as_bytes())
}

/// Reads annotations from generic-seq CSV bytes.
///
/// Useful for fuzzing and processing raw bytes without requiring UTF-8 upfront.
pub fn from_generic_seq_csv_slice(bytes: &[u8]) -> Result<Vec<Annotation>, SeqLabelError> {
    let table = validate(table_from_csv_slice(bytes)?)?;
    table_to_annotations(&table)
}

/// Writes annotations to a generic-seq CSV string.
///
/// Useful for testing without file I/O.
pub fn to_generic_seq_csv_string(
    annotations: &[Annotation],
    basename: bool,
) -> Result<String, SeqLabelError> {
    table_to_csv_string(annotations_to_table(annotations, basename)?.table())
}

// ============================================================================
// Conversion: annotations -> rows
// ============================================================================

/// Flattens annotations into a validated table, one row per segment.
///
/// # Errors
/// Returns [`SeqLabelError::EmptyAnnotation`] for an annotation without
/// sequences (it would vanish from the table), and a schema error if the
/// flattened table does not validate (for example, an empty input, which
/// has no unit columns). A blank `notated_path` is rejected with
/// [`SeqLabelError::BlankNotatedPath`], since the table reads it back as null.
pub fn annotations_to_table(
    annotations: &[Annotation],
    basename: bool,
) -> Result<ValidatedTable, SeqLabelError> {
    if let Some(empty) = annotations.iter().find(|a| a.seq.is_empty()) {
        return Err(SeqLabelError::EmptyAnnotation {
            annot_path: empty.annot_path.clone(),
        });
    }
    if let Some(blank) = annotations
        .iter()
        .find(|a| a.notated_path.as_deref().is_some_and(|p| p.trim().is_empty()))
    {
        return Err(SeqLabelError::BlankNotatedPath {
            annot_path: blank.annot_path.clone(),
        });
    }

    for path in duplicate_paths(annotations, basename) {
        log::warn!(
            "annot_path '{}' is shared by more than one annotation; \
             they will be merged when the table is read back",
            path
        );
    }
    let rows = annotations_to_rows(annotations, basename);
    Ok(validate(rows_to_table(&rows)?)?)
}

/// Flattens annotations into rows, preserving annotation, sequence and
/// segment order.
pub fn annotations_to_rows(annotations: &[Annotation], basename: bool) -> Vec<SegmentRow> {
    let mut rows = Vec::with_capacity(annotations.iter().map(Annotation::segment_count).sum());

    for annot in annotations {
        let annot_path = render_path(&annot.annot_path, basename);
        let notated_path = annot
            .notated_path
            .as_deref()
            .map(|p| render_path(p, basename));

        for (seq_idx, seq) in annot.sequences().iter().enumerate() {
            for segment in seq {
                rows.push(SegmentRow {
                    annot_path: annot_path.clone(),
                    notated_path: notated_path.clone(),
                    sequence: seq_idx as u64,
                    label: segment.label().to_string(),
                    onset_s: segment.onset_s(),
                    offset_s: segment.offset_s(),
                    onset_sample: segment.onset_sample(),
                    offset_sample: segment.offset_sample(),
                });
            }
        }
    }
    rows
}

/// Builds the (unvalidated) table for a set of rows.
///
/// `notated_path` and each unit pair are emitted only if some row uses them.
pub fn rows_to_table(rows: &[SegmentRow]) -> Result<Table, SeqLabelError> {
    let has_notated = rows.iter().any(|r| r.notated_path.is_some());
    let has_seconds = rows.iter().any(|r| r.onset_s.is_some() || r.offset_s.is_some());
    let has_samples = rows
        .iter()
        .any(|r| r.onset_sample.is_some() || r.offset_sample.is_some());

    let mut columns = vec![Column::text(
        ColumnName::AnnotPath,
        rows.iter().map(|r| Some(r.annot_path.clone())).collect(),
    )];
    if has_notated {
        columns.push(Column::text(
            ColumnName::NotatedPath,
            rows.iter().map(|r| r.notated_path.clone()).collect(),
        ));
    }
    columns.push(Column::uint(
        ColumnName::Sequence,
        rows.iter().map(|r| Some(r.sequence)).collect(),
    ));
    columns.push(Column::text(
        ColumnName::Label,
        rows.iter().map(|r| Some(r.label.clone())).collect(),
    ));
    if has_seconds {
        columns.push(Column::float(
            ColumnName::OnsetS,
            rows.iter().map(|r| r.onset_s).collect(),
        ));
        columns.push(Column::float(
            ColumnName::OffsetS,
            rows.iter().map(|r| r.offset_s).collect(),
        ));
    }
    if has_samples {
        columns.push(Column::uint(
            ColumnName::OnsetSample,
            rows.iter().map(|r| r.onset_sample).collect(),
        ));
        columns.push(Column::uint(
            ColumnName::OffsetSample,
            rows.iter().map(|r| r.offset_sample).collect(),
        ));
    }

    Table::from_columns(columns)
}

/// Final path component of `path` in basename mode, `path` otherwise.
fn render_path(path: &str, basename: bool) -> String {
    if !basename {
        return path.to_string();
    }
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Rendered `annot_path` values used by more than one annotation, in
/// first-seen order. Such annotations merge on read.
fn duplicate_paths(annotations: &[Annotation], basename: bool) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut duplicates = Vec::new();
    for annot in annotations {
        let path = render_path(&annot.annot_path, basename);
        let count = seen.entry(path.clone()).or_insert(0);
        *count += 1;
        if *count == 2 {
            duplicates.push(path);
        }
    }
    duplicates
}

// ============================================================================
// Conversion: rows -> annotations
// ============================================================================

/// Reads the rows out of a validated table.
pub fn table_rows(table: &ValidatedTable) -> Result<Vec<SegmentRow>, SeqLabelError> {
    let annot_paths = required(table.text(ColumnName::AnnotPath), ColumnName::AnnotPath)?;
    let sequences = required(table.uint(ColumnName::Sequence), ColumnName::Sequence)?;
    let labels = required(table.text(ColumnName::Label), ColumnName::Label)?;
    let notated_paths = table.text(ColumnName::NotatedPath);
    let onsets_s = table.float(ColumnName::OnsetS);
    let offsets_s = table.float(ColumnName::OffsetS);
    let onsets_sample = table.uint(ColumnName::OnsetSample);
    let offsets_sample = table.uint(ColumnName::OffsetSample);

    let mut rows = Vec::with_capacity(table.n_rows());
    for i in 0..table.n_rows() {
        let (Some(annot_path), Some(sequence), Some(label)) =
            (&annot_paths[i], sequences[i], &labels[i])
        else {
            return Err(null_cell(i));
        };
        rows.push(SegmentRow {
            annot_path: annot_path.clone(),
            notated_path: notated_paths.and_then(|col| col[i].clone()),
            sequence,
            label: label.clone(),
            onset_s: onsets_s.and_then(|col| col[i]),
            offset_s: offsets_s.and_then(|col| col[i]),
            onset_sample: onsets_sample.and_then(|col| col[i]),
            offset_sample: offsets_sample.and_then(|col| col[i]),
        });
    }
    Ok(rows)
}

fn required<T>(column: Option<T>, name: ColumnName) -> Result<T, SeqLabelError> {
    column.ok_or_else(|| {
        SchemaError::single(SchemaViolation::column(
            ViolationCode::MissingRequiredColumn,
            name.as_str(),
            format!("required {} column is missing", name.dtype()),
        ))
        .into()
    })
}

fn null_cell(row: usize) -> SeqLabelError {
    SchemaError::single(SchemaViolation::rows(
        ViolationCode::NullValue,
        vec![row],
        "annot_path, sequence and label may not be empty",
    ))
    .into()
}

/// Row indices of one annotation, split by sequence index.
struct AnnotGroup<'a> {
    annot_path: &'a str,
    /// Sequence index -> row indices, iterated in ascending index order.
    sequences: BTreeMap<u64, Vec<usize>>,
}

/// Groups rows by `annot_path` (first-seen order), then by `sequence`.
fn group_rows(rows: &[SegmentRow]) -> Vec<AnnotGroup<'_>> {
    let mut groups: Vec<AnnotGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (i, row) in rows.iter().enumerate() {
        let slot = *index.entry(row.annot_path.as_str()).or_insert_with(|| {
            groups.push(AnnotGroup {
                annot_path: row.annot_path.as_str(),
                sequences: BTreeMap::new(),
            });
            groups.len() - 1
        });
        groups[slot].sequences.entry(row.sequence).or_default().push(i);
    }
    groups
}

/// Rebuilds annotations from a validated table.
///
/// # Errors
/// - [`SeqLabelError::InconsistentNotatedPath`] if one annotation's rows
///   disagree on `notated_path`
/// - [`SeqLabelError::Reconstruction`] if a row does not form a valid
///   segment (for example, onset after offset) or a sequence mixes units
pub fn table_to_annotations(table: &ValidatedTable) -> Result<Vec<Annotation>, SeqLabelError> {
    let rows = table_rows(table)?;
    let groups = group_rows(&rows);
    log::debug!(
        "grouped {} row(s) into {} annotation(s)",
        rows.len(),
        groups.len()
    );

    groups
        .iter()
        .map(|group| build_annotation(group, &rows))
        .collect()
}

fn build_annotation(group: &AnnotGroup<'_>, rows: &[SegmentRow]) -> Result<Annotation, SeqLabelError> {
    let notated_path = consistent_notated_path(group, rows)?;

    let mut sequences = Vec::with_capacity(group.sequences.len());
    for (&seq_idx, row_ids) in &group.sequences {
        let rebuild_err = |row: usize, source: SeqLabelError| SeqLabelError::Reconstruction {
            annot_path: group.annot_path.to_string(),
            sequence: seq_idx,
            row,
            source: Box::new(source),
        };

        let segments = row_ids
            .iter()
            .map(|&i| segment_from_row(&rows[i]).map_err(|e| rebuild_err(i + 1, e)))
            .collect::<Result<Vec<_>, _>>()?;
        let first_row = row_ids.first().map_or(1, |&i| i + 1);
        sequences.push(Sequence::new(segments).map_err(|e| rebuild_err(first_row, e))?);
    }

    let seq = Seqs::from_vec(sequences).ok_or_else(|| SeqLabelError::EmptyAnnotation {
        annot_path: group.annot_path.to_string(),
    })?;
    Ok(Annotation {
        annot_path: group.annot_path.to_string(),
        notated_path,
        seq,
    })
}

/// First non-null `notated_path` of the group; any other non-null value must
/// match it.
fn consistent_notated_path(
    group: &AnnotGroup<'_>,
    rows: &[SegmentRow],
) -> Result<Option<String>, SeqLabelError> {
    let mut row_ids: Vec<usize> = group.sequences.values().flatten().copied().collect();
    row_ids.sort_unstable();

    let mut first: Option<&str> = None;
    for path in row_ids.iter().filter_map(|&i| rows[i].notated_path.as_deref()) {
        match first {
            None => first = Some(path),
            Some(expected) if expected != path => {
                return Err(SeqLabelError::InconsistentNotatedPath {
                    annot_path: group.annot_path.to_string(),
                    first: expected.to_string(),
                    other: path.to_string(),
                });
            }
            Some(_) => {}
        }
    }
    Ok(first.map(str::to_string))
}

fn segment_from_row(row: &SegmentRow) -> Result<Segment, SeqLabelError> {
    let bounds = Bounds::from_parts(row.onset_s, row.offset_s, row.onset_sample, row.offset_sample)
        .map_err(|message| SeqLabelError::InvalidSegment {
            label: row.label.clone(),
            message,
        })?;
    Segment::new(row.label.clone(), bounds)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Units;

    fn seq_s(items: &[(&str, f64, f64)]) -> Sequence {
        Sequence::new(
            items
                .iter()
                .map(|(l, on, off)| Segment::from_seconds(*l, *on, *off).unwrap())
                .collect(),
        )
        .unwrap()
    }

    fn seq_i(items: &[(&str, u64, u64)]) -> Sequence {
        Sequence::new(
            items
                .iter()
                .map(|(l, on, off)| Segment::from_samples(*l, *on, *off).unwrap())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_two_segment_scenario() {
        let annot = Annotation::new("x.ext", seq_s(&[("a", 0.0, 1.0), ("b", 1.0, 2.0)]));

        let csv = to_generic_seq_csv_string(std::slice::from_ref(&annot), false).unwrap();
        assert_eq!(
            csv,
            "annot_path,sequence,label,onset_s,offset_s\n\
             x.ext,0,a,0.0,1.0\n\
             x.ext,0,b,1.0,2.0\n"
        );

        let restored = from_generic_seq_csv_str(&csv).unwrap();
        assert_eq!(restored, vec![annot]);
        assert_eq!(restored[0].sequences().len(), 1);
        assert_eq!(restored[0].segment_count(), 2);
    }

    #[test]
    fn test_seconds_only_has_no_sample_columns() {
        let table =
            annotations_to_table(&[Annotation::new("a.not.mat", seq_s(&[("i", 0.1, 0.2)]))], false)
                .unwrap();
        assert!(table.has_column(ColumnName::OnsetS));
        assert!(!table.has_column(ColumnName::OnsetSample));
        assert!(!table.has_column(ColumnName::NotatedPath));
    }

    #[test]
    fn test_samples_only_has_no_seconds_columns() {
        let table = annotations_to_table(&[Annotation::new("a.phn", seq_i(&[("h#", 0, 2400)]))], false)
            .unwrap();
        assert!(table.has_column(ColumnName::OffsetSample));
        assert!(!table.has_column(ColumnName::OffsetS));
    }

    #[test]
    fn test_mixed_coverage_is_union_and_round_trips() {
        let both = Sequence::new(vec![
            Segment::new("0", Bounds::from_samples_at_rate(32000, 48000, 32000)).unwrap(),
        ])
        .unwrap();
        let annots = vec![
            Annotation::new("a.txt", seq_s(&[("a", 0.0, 0.5)])).with_notated_path("a.wav"),
            Annotation::new("b.phn", seq_i(&[("b", 10, 20)])),
            Annotation::new("c.xml", both),
        ];

        let table = annotations_to_table(&annots, false).unwrap();
        let names: Vec<_> = table.column_names().collect();
        assert_eq!(
            names,
            [
                "annot_path",
                "notated_path",
                "sequence",
                "label",
                "onset_s",
                "offset_s",
                "onset_sample",
                "offset_sample"
            ]
        );

        let restored = table_to_annotations(&table).unwrap();
        assert_eq!(restored, annots);
        assert_eq!(restored[2].sequences()[0].units(), Units::Both);
        assert_eq!(restored[1].notated_path, None);
    }

    #[test]
    fn test_multi_sequence_round_trip() {
        let annot = Annotation::with_seqs(
            "song.xml",
            vec![seq_s(&[("a", 0.0, 1.0)]), seq_s(&[("b", 2.0, 3.0), ("c", 3.0, 4.0)])],
        )
        .unwrap();
        let csv = to_generic_seq_csv_string(std::slice::from_ref(&annot), false).unwrap();
        let restored = from_generic_seq_csv_str(&csv).unwrap();

        assert_eq!(restored, vec![annot]);
        assert!(restored[0].seq.is_multi());
    }

    #[test]
    fn test_sequences_sorted_by_index_not_file_order() {
        let csv = "annot_path,sequence,label,onset_s,offset_s\n\
                   a.wav,1,second,2.0,3.0\n\
                   a.wav,0,first,0.0,1.0\n";
        let annots = from_generic_seq_csv_str(csv).unwrap();
        let seqs = annots[0].sequences();
        assert_eq!(seqs.len(), 2);
        assert_eq!(seqs[0].segments()[0].label(), "first");
        assert_eq!(seqs[1].segments()[0].label(), "second");
    }

    #[test]
    fn test_annotations_in_first_seen_order() {
        let csv = "annot_path,sequence,label,onset_sample,offset_sample\n\
                   z.phn,0,a,0,1\n\
                   a.phn,0,b,0,1\n\
                   z.phn,0,c,1,2\n";
        let annots = from_generic_seq_csv_str(csv).unwrap();
        let paths: Vec<_> = annots.iter().map(|a| a.annot_path.as_str()).collect();
        assert_eq!(paths, ["z.phn", "a.phn"]);
        let labels: Vec<_> = annots[0].sequences()[0].labels().collect();
        assert_eq!(labels, ["a", "c"]);
    }

    #[test]
    fn test_basename_mode() {
        let annot = Annotation::new("/data/bird1/day1/song.not.mat", seq_s(&[("a", 0.0, 1.0)]))
            .with_notated_path("/data/bird1/day1/song.cbin");

        let csv = to_generic_seq_csv_string(std::slice::from_ref(&annot), true).unwrap();
        assert!(csv.contains("song.not.mat,song.cbin,0,a"));
        assert!(!csv.contains("/data"));

        let restored = from_generic_seq_csv_str(&csv).unwrap();
        assert_eq!(restored[0].annot_path, "song.not.mat");
        assert_eq!(restored[0].seq, annot.seq);
    }

    #[test]
    fn test_numeric_labels_round_trip_as_strings() {
        let annot = Annotation::new("a.csv", seq_i(&[("0", 0, 10), ("1", 10, 20), ("01", 20, 30)]));
        let csv = to_generic_seq_csv_string(std::slice::from_ref(&annot), false).unwrap();
        let restored = from_generic_seq_csv_str(&csv).unwrap();
        let labels: Vec<_> = restored[0].sequences()[0].labels().collect();
        assert_eq!(labels, ["0", "1", "01"]);
    }

    #[test]
    fn test_inconsistent_notated_path_rejected() {
        let csv = "annot_path,notated_path,sequence,label,onset_s,offset_s\n\
                   a.txt,a.wav,0,x,0.0,1.0\n\
                   a.txt,,0,y,1.0,2.0\n\
                   a.txt,b.wav,0,z,2.0,3.0\n";
        let err = from_generic_seq_csv_str(csv).unwrap_err();
        assert!(matches!(
            err,
            SeqLabelError::InconsistentNotatedPath { ref first, ref other, .. }
                if first == "a.wav" && other == "b.wav"
        ));
    }

    #[test]
    fn test_notated_path_taken_from_first_non_null() {
        let csv = "annot_path,notated_path,sequence,label,onset_s,offset_s\n\
                   a.txt,,0,x,0.0,1.0\n\
                   a.txt,a.wav,0,y,1.0,2.0\n";
        let annots = from_generic_seq_csv_str(csv).unwrap();
        assert_eq!(annots[0].notated_path.as_deref(), Some("a.wav"));
    }

    #[test]
    fn test_reversed_bounds_fail_reconstruction_not_validation() {
        let csv = "annot_path,sequence,label,onset_s,offset_s\n\
                   a.txt,0,x,0.0,1.0\n\
                   a.txt,0,y,3.0,2.0\n";
        let table = validate(table_from_csv_slice(csv.as_bytes()).unwrap()).unwrap();
        let err = table_to_annotations(&table).unwrap_err();
        assert!(matches!(err, SeqLabelError::Reconstruction { row: 2, sequence: 0, .. }));
    }

    #[test]
    fn test_mixed_units_within_sequence_rejected() {
        let csv = "annot_path,sequence,label,onset_s,offset_s,onset_sample,offset_sample\n\
                   a.txt,0,x,0.0,1.0,,\n\
                   a.txt,0,y,,,10,20\n";
        let err = from_generic_seq_csv_str(csv).unwrap_err();
        assert!(matches!(err, SeqLabelError::Reconstruction { .. }));
    }

    #[test]
    fn test_schema_error_propagates_unchanged() {
        let csv = "annot_path,sequence,onset_s,offset_s\na.txt,0,0.0,1.0\n";
        let err = from_generic_seq_csv_str(csv).unwrap_err();
        let SeqLabelError::Schema(schema) = err else {
            panic!("expected schema error, got {err:?}");
        };
        assert!(schema.has(ViolationCode::MissingRequiredColumn));
    }

    #[test]
    fn test_empty_multi_annotation_rejected() {
        let annot = Annotation {
            annot_path: "empty.txt".into(),
            notated_path: None,
            seq: Seqs::Multi(vec![]),
        };
        let err = annotations_to_table(&[annot], false).unwrap_err();
        assert!(matches!(err, SeqLabelError::EmptyAnnotation { .. }));
    }

    #[test]
    fn test_empty_input_has_no_unit_columns() {
        let err = annotations_to_table(&[], false).unwrap_err();
        let SeqLabelError::Schema(schema) = err else {
            panic!("expected schema error");
        };
        assert!(schema.has(ViolationCode::MissingUnitColumns));
    }

    #[test]
    fn test_blank_notated_path_rejected_on_write() {
        for blank in ["", "  "] {
            let annot = Annotation::new("x.txt", seq_s(&[("a", 0.0, 1.0)])).with_notated_path(blank);
            let err = to_generic_seq_csv_string(&[annot], false).unwrap_err();
            assert!(
                matches!(err, SeqLabelError::BlankNotatedPath { ref annot_path } if annot_path == "x.txt"),
                "unexpected error for {blank:?}: {err:?}"
            );
        }
    }

    #[test]
    fn test_padded_notated_path_round_trips() {
        let annots = vec![Annotation::new("x.txt", seq_s(&[("a", 0.0, 1.0)])).with_notated_path(" x.wav")];
        let csv = to_generic_seq_csv_string(&annots, false).unwrap();
        assert_eq!(from_generic_seq_csv_str(&csv).unwrap(), annots);
    }

    #[test]
    fn test_duplicate_paths_found_for_adjacent_annotations() {
        let annots = vec![
            Annotation::new("a/song.txt", seq_s(&[("a", 0.0, 1.0)])),
            Annotation::new("b/song.txt", seq_s(&[("b", 0.0, 1.0)])),
            Annotation::new("c/other.txt", seq_s(&[("c", 0.0, 1.0)])),
        ];
        assert!(duplicate_paths(&annots, false).is_empty());
        assert_eq!(duplicate_paths(&annots, true), ["song.txt"]);

        let repeated = vec![
            Annotation::new("x.txt", seq_s(&[("a", 0.0, 1.0)])),
            Annotation::new("x.txt", seq_s(&[("b", 1.0, 2.0)])),
            Annotation::new("x.txt", seq_s(&[("c", 2.0, 3.0)])),
        ];
        assert_eq!(duplicate_paths(&repeated, false), ["x.txt"]);
    }

    #[test]
    fn test_reconstruction_error_names_data_row() {
        let csv = "annot_path,sequence,label,onset_s,offset_s\n\
                   a.txt,0,x,0.0,1.0\n\
                   a.txt,0,y,3.0,2.0\n";
        let err = from_generic_seq_csv_str(csv).unwrap_err();
        assert!(err.to_string().contains("(data row 2)"), "{err}");
    }

    #[test]
    fn test_table_round_trip_is_stable() {
        let annots = vec![Annotation::with_seqs(
            "a/b.txt",
            vec![seq_s(&[("a", 0.0, 0.1)]), seq_s(&[("b", 0.3, 0.30000000000000004)])],
        )
        .unwrap()];
        let table = annotations_to_table(&annots, false).unwrap();
        let csv = table_to_csv_string(&table).unwrap();
        let reread = validate(table_from_csv_slice(csv.as_bytes()).unwrap()).unwrap();
        assert_eq!(reread, table);
    }
}
