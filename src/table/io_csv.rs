//! Delimited-text persistence for [`Table`].
//!
//! This layer only moves cells between text and memory. Every column read
//! from text is [`ColumnData::Text`]; dtypes are the validator's business.
//! Empty cells load as nulls and nulls are written as empty cells.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use super::{Column, ColumnData, Table};
use crate::error::SeqLabelError;

/// Reads a table from a comma-separated file with a header row.
///
/// # Errors
/// Returns an error if the file cannot be opened or the CSV is malformed
/// (for example, a row with a different number of fields than the header).
pub fn read_table_csv(path: &Path) -> Result<Table, SeqLabelError> {
    let file = File::open(path).map_err(SeqLabelError::Io)?;
    load(BufReader::new(file), path)
}

/// Reads a table from CSV bytes.
pub fn table_from_csv_slice(bytes: &[u8]) -> Result<Table, SeqLabelError> {
    load(bytes, Path::new("<bytes>"))
}

/// Writes a table as a comma-separated file with a header row.
///
/// Strings are quoted only when they contain the delimiter, a quote or a
/// line break. On error the destination may hold partial output.
pub fn write_table_csv(path: &Path, table: &Table) -> Result<(), SeqLabelError> {
    let file = File::create(path).map_err(SeqLabelError::Io)?;
    dump(BufWriter::new(file), table, path)?
        .flush()
        .map_err(SeqLabelError::Io)
}

/// Writes a table to a CSV string.
pub fn table_to_csv_string(table: &Table) -> Result<String, SeqLabelError> {
    let dummy_path = Path::new("<string>");
    let bytes = dump(Vec::new(), table, dummy_path)?;
    String::from_utf8(bytes).map_err(|e| {
        SeqLabelError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    })
}

fn load<R: Read>(reader: R, path: &Path) -> Result<Table, SeqLabelError> {
    let parse_err = |source| SeqLabelError::CsvParse {
        path: path.to_path_buf(),
        source,
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let headers = csv_reader.headers().map_err(parse_err)?.clone();
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for result in csv_reader.records() {
        let record = result.map_err(parse_err)?;
        for (values, field) in cells.iter_mut().zip(record.iter()) {
            values.push((!field.is_empty()).then(|| field.to_string()));
        }
    }

    let columns = headers
        .iter()
        .zip(cells)
        .map(|(name, values)| Column::new(name, ColumnData::Text(values)))
        .collect();

    let table = Table::from_columns(columns)?;
    log::debug!(
        "loaded {} row(s) x {} column(s) from {}",
        table.n_rows(),
        table.n_cols(),
        path.display()
    );
    Ok(table)
}

fn dump<W: Write>(writer: W, table: &Table, path: &Path) -> Result<W, SeqLabelError> {
    let write_err = |source| SeqLabelError::CsvWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(table.column_names())
        .map_err(write_err)?;

    for row in 0..table.n_rows() {
        csv_writer
            .write_record(table.columns().iter().map(|col| col.data.render(row)))
            .map_err(write_err)?;
    }

    csv_writer
        .into_inner()
        .map_err(|e| SeqLabelError::Io(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::ColumnName;

    #[test]
    fn test_load_keeps_text_and_nulls() {
        let csv = "annot_path,sequence,label,onset_s,offset_s\n\
                   a.wav,0,0,0.5,\n\
                   a.wav,0,\"b,c\",1.0,2.0\n";
        let table = table_from_csv_slice(csv.as_bytes()).unwrap();

        assert_eq!(table.n_rows(), 2);
        let labels = table.text(ColumnName::Label).unwrap();
        assert_eq!(labels[0].as_deref(), Some("0"));
        assert_eq!(labels[1].as_deref(), Some("b,c"));
        assert_eq!(table.text(ColumnName::OffsetS).unwrap()[0], None);
    }

    #[test]
    fn test_header_only_file_has_zero_rows() {
        let table = table_from_csv_slice(b"annot_path,sequence,label\n").unwrap();
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.n_cols(), 3);
    }

    #[test]
    fn test_ragged_row_is_parse_error() {
        let result = table_from_csv_slice(b"a,b\n1,2,3\n");
        assert!(matches!(result, Err(SeqLabelError::CsvParse { .. })));
    }

    #[test]
    fn test_dump_quotes_only_when_needed() {
        let table = Table::from_columns(vec![
            Column::text(
                ColumnName::Label,
                vec![Some("plain".into()), Some("with,comma".into())],
            ),
            Column::float(ColumnName::OnsetS, vec![Some(1.0), None]),
        ])
        .unwrap();

        let text = table_to_csv_string(&table).unwrap();
        assert_eq!(text, "label,onset_s\nplain,1.0\n\"with,comma\",\n");
    }
}
