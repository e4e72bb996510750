//! A small column-oriented table for the generic-seq schema.
//!
//! Tables come from two places: CSV text (every column starts out as
//! [`ColumnData::Text`]) and the row codec (columns already typed). The
//! validator accepts either and hands back a normalized table whose
//! columns carry the dtype the schema names.

pub mod io_csv;

use std::fmt;

use crate::error::SeqLabelError;

/// The recognized columns of the generic-seq table, in canonical order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ColumnName {
    AnnotPath,
    NotatedPath,
    Sequence,
    Label,
    OnsetS,
    OffsetS,
    OnsetSample,
    OffsetSample,
}

impl ColumnName {
    /// Every recognized column, in the order normalized tables use.
    pub const ALL: [ColumnName; 8] = [
        ColumnName::AnnotPath,
        ColumnName::NotatedPath,
        ColumnName::Sequence,
        ColumnName::Label,
        ColumnName::OnsetS,
        ColumnName::OffsetS,
        ColumnName::OnsetSample,
        ColumnName::OffsetSample,
    ];

    /// Columns every table must have.
    pub const REQUIRED: [ColumnName; 3] =
        [ColumnName::AnnotPath, ColumnName::Sequence, ColumnName::Label];

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnName::AnnotPath => "annot_path",
            ColumnName::NotatedPath => "notated_path",
            ColumnName::Sequence => "sequence",
            ColumnName::Label => "label",
            ColumnName::OnsetS => "onset_s",
            ColumnName::OffsetS => "offset_s",
            ColumnName::OnsetSample => "onset_sample",
            ColumnName::OffsetSample => "offset_sample",
        }
    }

    /// Looks up a recognized column by its header name.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|col| col.as_str() == name)
    }

    /// The dtype values of this column normalize to.
    pub fn dtype(self) -> DType {
        match self {
            ColumnName::AnnotPath | ColumnName::NotatedPath | ColumnName::Label => DType::Text,
            ColumnName::Sequence | ColumnName::OnsetSample | ColumnName::OffsetSample => {
                DType::UInt
            }
            ColumnName::OnsetS | ColumnName::OffsetS => DType::Float,
        }
    }

    /// Whether cells of this column may be empty.
    pub fn nullable(self) -> bool {
        !Self::REQUIRED.contains(&self)
    }
}

impl fmt::Display for ColumnName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value type of a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DType {
    Text,
    UInt,
    Float,
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DType::Text => "string",
            DType::UInt => "non-negative integer",
            DType::Float => "non-negative float",
        };
        f.write_str(name)
    }
}

/// Cell values of one column; `None` is a null cell.
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnData {
    Text(Vec<Option<String>>),
    UInt(Vec<Option<u64>>),
    Float(Vec<Option<f64>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.len(),
            ColumnData::UInt(v) => v.len(),
            ColumnData::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DType {
        match self {
            ColumnData::Text(_) => DType::Text,
            ColumnData::UInt(_) => DType::UInt,
            ColumnData::Float(_) => DType::Float,
        }
    }

    /// Returns true if the cell at `row` is null. Blank strings count as null,
    /// since delimited text cannot tell them apart.
    pub fn is_null(&self, row: usize) -> bool {
        match self {
            ColumnData::Text(v) => match v.get(row) {
                Some(Some(cell)) => cell.trim().is_empty(),
                _ => true,
            },
            ColumnData::UInt(v) => !matches!(v.get(row), Some(Some(_))),
            ColumnData::Float(v) => !matches!(v.get(row), Some(Some(_))),
        }
    }

    /// Renders the cell at `row` as delimited-text, empty for null.
    pub fn render(&self, row: usize) -> String {
        match self {
            ColumnData::Text(v) => v.get(row).cloned().flatten().unwrap_or_default(),
            ColumnData::UInt(v) => v
                .get(row)
                .copied()
                .flatten()
                .map(|n| n.to_string())
                .unwrap_or_default(),
            ColumnData::Float(v) => v
                .get(row)
                .copied()
                .flatten()
                .map(format_float)
                .unwrap_or_default(),
        }
    }
}

/// Formats a float as plain decimal text that parses back to the same value.
///
/// Always carries a decimal point (`1.0`, not `1`) and never uses an exponent.
pub fn format_float(value: f64) -> String {
    let mut text = value.to_string();
    if value.is_finite() && !text.contains('.') {
        text.push_str(".0");
    }
    text
}

/// A named column.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn text(name: ColumnName, values: Vec<Option<String>>) -> Self {
        Self::new(name.as_str(), ColumnData::Text(values))
    }

    pub fn uint(name: ColumnName, values: Vec<Option<u64>>) -> Self {
        Self::new(name.as_str(), ColumnData::UInt(values))
    }

    pub fn float(name: ColumnName, values: Vec<Option<f64>>) -> Self {
        Self::new(name.as_str(), ColumnData::Float(values))
    }
}

/// Ordered columns of equal length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Creates an empty table with no columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from columns, which must all have the same length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, SeqLabelError> {
        let mut table = Self::new();
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    /// Appends a column. The first column fixes the row count.
    ///
    /// # Errors
    /// Returns [`SeqLabelError::TableShape`] if the column length differs
    /// from the existing row count.
    pub fn push_column(&mut self, column: Column) -> Result<(), SeqLabelError> {
        let len = column.data.len();
        if self.columns.is_empty() {
            self.n_rows = len;
        } else if len != self.n_rows {
            return Err(SeqLabelError::TableShape {
                column: column.name,
                expected: self.n_rows,
                actual: len,
            });
        }
        self.columns.push(column);
        Ok(())
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// First column with the given name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: ColumnName) -> bool {
        self.column(name.as_str()).is_some()
    }

    /// Values of a text column, if present with that dtype.
    pub fn text(&self, name: ColumnName) -> Option<&[Option<String>]> {
        match &self.column(name.as_str())?.data {
            ColumnData::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Values of an integer column, if present with that dtype.
    pub fn uint(&self, name: ColumnName) -> Option<&[Option<u64>]> {
        match &self.column(name.as_str())?.data {
            ColumnData::UInt(v) => Some(v),
            _ => None,
        }
    }

    /// Values of a float column, if present with that dtype.
    pub fn float(&self, name: ColumnName) -> Option<&[Option<f64>]> {
        match &self.column(name.as_str())?.data {
            ColumnData::Float(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    /// Reassembles columns taken from a table of `n_rows` rows, each
    /// transformed without changing its length.
    pub(crate) fn from_same_shape(columns: Vec<Column>, n_rows: usize) -> Self {
        debug_assert!(columns.iter().all(|c| c.data.len() == n_rows));
        Self { columns, n_rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_name_lookup() {
        assert_eq!(ColumnName::parse("onset_s"), Some(ColumnName::OnsetS));
        assert_eq!(ColumnName::parse("invalid"), None);
        for col in ColumnName::ALL {
            assert_eq!(ColumnName::parse(col.as_str()), Some(col));
        }
    }

    #[test]
    fn test_nullability() {
        assert!(!ColumnName::Label.nullable());
        assert!(!ColumnName::Sequence.nullable());
        assert!(ColumnName::NotatedPath.nullable());
        assert!(ColumnName::OnsetSample.nullable());
    }

    #[test]
    fn test_format_float_is_plain_decimal() {
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(0.25), "0.25");
        assert_eq!(format_float(1e-7), "0.0000001");
        assert_eq!(format_float(1e21), "1000000000000000000000.0");
    }

    #[test]
    fn test_ragged_column_rejected() {
        let err = Table::from_columns(vec![
            Column::text(ColumnName::Label, vec![Some("a".into()), Some("b".into())]),
            Column::uint(ColumnName::Sequence, vec![Some(0)]),
        ])
        .unwrap_err();
        assert!(matches!(err, SeqLabelError::TableShape { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_typed_accessors() {
        let table = Table::from_columns(vec![
            Column::text(ColumnName::Label, vec![Some("a".into())]),
            Column::float(ColumnName::OnsetS, vec![None]),
        ])
        .unwrap();
        assert_eq!(table.n_rows(), 1);
        assert!(table.text(ColumnName::Label).is_some());
        assert!(table.uint(ColumnName::Label).is_none());
        assert!(table.float(ColumnName::OnsetS).unwrap()[0].is_none());
        assert!(table.column("offset_s").is_none());
    }

    #[test]
    fn test_empty_text_is_null() {
        let data = ColumnData::Text(vec![Some(String::new()), Some("x".into()), None]);
        assert!(data.is_null(0));
        assert!(!data.is_null(1));
        assert!(data.is_null(2));
    }
}
