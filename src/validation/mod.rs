//! Schema validation for generic-seq tables.
//!
//! Validation is a fixed, ordered list of [`Rule`]s. Each rule inspects the
//! whole table and returns typed [`SchemaViolation`]s; every rule runs, so a
//! failing table reports all of its problems at once instead of the first.
//!
//! The rules check:
//! - Column set: only recognized names, no duplicates, required columns
//! - Unit pairs: `onset_s`/`offset_s` and `onset_sample`/`offset_sample`
//!   appear together, and at least one pair appears
//! - Cells: dtype and nullability per column
//! - Rows: every row fills at least one unit pair, and never half of one
//!
//! Onset/offset ordering is not a schema rule. It is a model invariant,
//! checked when segments are rebuilt from the table.

mod report;

pub use report::{SchemaError, SchemaViolation, ViolationCode, ViolationContext};

use std::collections::{BTreeMap, HashSet};
use std::ops::Deref;

use crate::table::{format_float, Column, ColumnData, ColumnName, DType, Table};

/// A table that passed every rule, with columns in canonical order and
/// normalized dtypes.
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedTable(Table);

impl ValidatedTable {
    pub fn table(&self) -> &Table {
        &self.0
    }

    pub fn into_inner(self) -> Table {
        self.0
    }
}

impl Deref for ValidatedTable {
    type Target = Table;

    fn deref(&self) -> &Table {
        &self.0
    }
}

/// One named schema rule.
#[derive(Clone, Copy)]
pub struct Rule {
    /// Stable rule name, used in logs.
    pub name: &'static str,
    /// Inspects a table and returns every violation of this rule.
    pub check: fn(&Table) -> Vec<SchemaViolation>,
}

/// The generic-seq schema, in evaluation order.
pub const RULES: &[Rule] = &[
    Rule {
        name: "column_membership",
        check: check_column_membership,
    },
    Rule {
        name: "required_columns",
        check: check_required_columns,
    },
    Rule {
        name: "seconds_pair",
        check: check_seconds_pair,
    },
    Rule {
        name: "samples_pair",
        check: check_samples_pair,
    },
    Rule {
        name: "unit_pair_present",
        check: check_unit_pair_present,
    },
    Rule {
        name: "column_types",
        check: check_column_types,
    },
    Rule {
        name: "row_units",
        check: check_row_units,
    },
];

/// Validates a table against the generic-seq schema.
///
/// On success the returned table holds the same data with columns in
/// canonical order and every column coerced to its schema dtype. Validating
/// an already validated table returns it unchanged.
///
/// # Errors
/// Returns a [`SchemaError`] listing every violation found.
pub fn validate(table: Table) -> Result<ValidatedTable, SchemaError> {
    let mut violations = Vec::new();
    for rule in RULES {
        let found = (rule.check)(&table);
        if !found.is_empty() {
            log::debug!("rule '{}' found {} violation(s)", rule.name, found.len());
        }
        violations.extend(found);
    }
    if !violations.is_empty() {
        return Err(SchemaError::new(violations));
    }
    normalize(table)
}

/// Reorders columns canonically and coerces each to its schema dtype.
fn normalize(table: Table) -> Result<ValidatedTable, SchemaError> {
    let n_rows = table.n_rows();
    let mut by_name: BTreeMap<ColumnName, Column> = BTreeMap::new();
    for column in table.into_columns() {
        if let Some(name) = ColumnName::parse(&column.name) {
            by_name.insert(name, column);
        }
    }

    let columns = by_name
        .into_iter()
        .map(|(name, column)| Ok(Column::new(name.as_str(), coerce(name, &column.data)?)))
        .collect::<Result<Vec<_>, SchemaError>>()?;
    Ok(ValidatedTable(Table::from_same_shape(columns, n_rows)))
}

// ============================================================================
// Column set rules
// ============================================================================

fn check_column_membership(table: &Table) -> Vec<SchemaViolation> {
    let mut violations = Vec::new();
    let mut seen = HashSet::new();

    for name in table.column_names() {
        if ColumnName::parse(name).is_none() {
            violations.push(SchemaViolation::column(
                ViolationCode::UnknownColumn,
                name,
                format!(
                    "unrecognized column (allowed: {})",
                    ColumnName::ALL.map(ColumnName::as_str).join(", ")
                ),
            ));
        } else if !seen.insert(name) {
            violations.push(SchemaViolation::column(
                ViolationCode::DuplicateColumn,
                name,
                "column appears more than once",
            ));
        }
    }
    violations
}

fn check_required_columns(table: &Table) -> Vec<SchemaViolation> {
    ColumnName::REQUIRED
        .into_iter()
        .filter(|col| !table.has_column(*col))
        .map(|col| {
            SchemaViolation::column(
                ViolationCode::MissingRequiredColumn,
                col.as_str(),
                "required column is missing",
            )
        })
        .collect()
}

fn check_pair(
    table: &Table,
    onset: ColumnName,
    offset: ColumnName,
    code: ViolationCode,
) -> Vec<SchemaViolation> {
    match (table.has_column(onset), table.has_column(offset)) {
        (true, false) => vec![SchemaViolation::column(
            code,
            onset.as_str(),
            format!("'{}' is present without '{}'", onset, offset),
        )],
        (false, true) => vec![SchemaViolation::column(
            code,
            offset.as_str(),
            format!("'{}' is present without '{}'", offset, onset),
        )],
        _ => Vec::new(),
    }
}

fn check_seconds_pair(table: &Table) -> Vec<SchemaViolation> {
    check_pair(
        table,
        ColumnName::OnsetS,
        ColumnName::OffsetS,
        ViolationCode::UnpairedSecondsColumn,
    )
}

fn check_samples_pair(table: &Table) -> Vec<SchemaViolation> {
    check_pair(
        table,
        ColumnName::OnsetSample,
        ColumnName::OffsetSample,
        ViolationCode::UnpairedSampleColumn,
    )
}

fn check_unit_pair_present(table: &Table) -> Vec<SchemaViolation> {
    let unit_columns = [
        ColumnName::OnsetS,
        ColumnName::OffsetS,
        ColumnName::OnsetSample,
        ColumnName::OffsetSample,
    ];
    if unit_columns.iter().any(|col| table.has_column(*col)) {
        return Vec::new();
    }
    vec![SchemaViolation::table(
        ViolationCode::MissingUnitColumns,
        "no onset/offset columns: need onset_s/offset_s, onset_sample/offset_sample, or both",
    )]
}

// ============================================================================
// Cell rules
// ============================================================================

fn check_column_types(table: &Table) -> Vec<SchemaViolation> {
    let mut seen = HashSet::new();
    table
        .columns()
        .iter()
        .filter_map(|column| {
            let name = ColumnName::parse(&column.name)?;
            // Duplicates are reported by the membership rule.
            seen.insert(name).then_some((name, column))
        })
        .flat_map(|(name, column)| match coerce(name, &column.data) {
            Ok(_) => Vec::new(),
            Err(err) => err.violations,
        })
        .collect()
}

/// Offending rows per violation code, for one column.
#[derive(Default)]
struct CellIssues {
    rows: BTreeMap<ViolationCode, Vec<usize>>,
}

impl CellIssues {
    fn add(&mut self, code: ViolationCode, row: usize) {
        self.rows.entry(code).or_default().push(row);
    }

    fn into_result(self, name: ColumnName, data: ColumnData) -> Result<ColumnData, SchemaError> {
        if self.rows.is_empty() {
            return Ok(data);
        }
        let violations = self
            .rows
            .into_iter()
            .map(|(code, rows)| {
                let message = match code {
                    ViolationCode::NullValue => "column may not contain empty values".to_string(),
                    ViolationCode::NegativeValue => "values must be non-negative".to_string(),
                    ViolationCode::NonFiniteValue => "values must be finite".to_string(),
                    _ => format!("values must be of type {}", name.dtype()),
                };
                SchemaViolation::cells(code, name.as_str(), rows, message)
            })
            .collect();
        Err(SchemaError::new(violations))
    }
}

/// Coerces a column to the dtype its schema entry names.
///
/// The same function backs the type rule and normalization, so anything the
/// rule accepts is guaranteed to normalize.
fn coerce(name: ColumnName, data: &ColumnData) -> Result<ColumnData, SchemaError> {
    match name.dtype() {
        DType::Text => coerce_text(name, data),
        DType::UInt => coerce_uint(name, data),
        DType::Float => coerce_float(name, data),
    }
}

fn coerce_text(name: ColumnName, data: &ColumnData) -> Result<ColumnData, SchemaError> {
    let values: Vec<Option<String>> = match data {
        ColumnData::Text(v) => v
            .iter()
            .map(|cell| cell.clone().filter(|s| !s.trim().is_empty()))
            .collect(),
        ColumnData::UInt(v) => v.iter().map(|cell| cell.map(|n| n.to_string())).collect(),
        ColumnData::Float(v) => v.iter().map(|cell| cell.map(format_float)).collect(),
    };

    let mut issues = CellIssues::default();
    if !name.nullable() {
        for (row, cell) in values.iter().enumerate() {
            if cell.is_none() {
                issues.add(ViolationCode::NullValue, row);
            }
        }
    }
    issues.into_result(name, ColumnData::Text(values))
}

fn coerce_uint(name: ColumnName, data: &ColumnData) -> Result<ColumnData, SchemaError> {
    let mut issues = CellIssues::default();
    let values: Vec<Option<u64>> = match data {
        ColumnData::UInt(v) => v.clone(),
        ColumnData::Float(v) => v
            .iter()
            .enumerate()
            .map(|(row, cell)| cell.and_then(|x| float_to_uint(x, row, &mut issues)))
            .collect(),
        ColumnData::Text(v) => v
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                let text = cell.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
                parse_uint(text, row, &mut issues)
            })
            .collect(),
    };

    if !name.nullable() {
        for row in 0..data.len() {
            if data.is_null(row) {
                issues.add(ViolationCode::NullValue, row);
            }
        }
    }
    issues.into_result(name, ColumnData::UInt(values))
}

/// Parses integer text. Integral float text such as `3.0` is accepted,
/// since tabular tools write nullable integer columns that way.
fn parse_uint(text: &str, row: usize, issues: &mut CellIssues) -> Option<u64> {
    if let Ok(n) = text.parse::<u64>() {
        return Some(n);
    }
    if text.starts_with('-') && text[1..].parse::<u64>().is_ok() {
        issues.add(ViolationCode::NegativeValue, row);
        return None;
    }
    match text.parse::<f64>() {
        Ok(x) => float_to_uint(x, row, issues),
        Err(_) => {
            issues.add(ViolationCode::InvalidInteger, row);
            None
        }
    }
}

/// Largest float below which every integer is exactly representable.
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

fn float_to_uint(x: f64, row: usize, issues: &mut CellIssues) -> Option<u64> {
    if !x.is_finite() || x.fract() != 0.0 || x > MAX_EXACT_FLOAT_INT {
        issues.add(ViolationCode::InvalidInteger, row);
        None
    } else if x < 0.0 {
        issues.add(ViolationCode::NegativeValue, row);
        None
    } else {
        Some(x as u64)
    }
}

fn coerce_float(name: ColumnName, data: &ColumnData) -> Result<ColumnData, SchemaError> {
    let mut issues = CellIssues::default();
    let values: Vec<Option<f64>> = match data {
        ColumnData::UInt(v) => v.iter().map(|cell| cell.map(|n| n as f64)).collect(),
        ColumnData::Float(v) => v
            .iter()
            .enumerate()
            .map(|(row, cell)| cell.and_then(|x| check_float(x, row, &mut issues)))
            .collect(),
        ColumnData::Text(v) => v
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                let text = cell.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
                match text.parse::<f64>() {
                    Ok(x) => check_float(x, row, &mut issues),
                    Err(_) => {
                        issues.add(ViolationCode::InvalidFloat, row);
                        None
                    }
                }
            })
            .collect(),
    };

    if !name.nullable() {
        for row in 0..data.len() {
            if data.is_null(row) {
                issues.add(ViolationCode::NullValue, row);
            }
        }
    }
    issues.into_result(name, ColumnData::Float(values))
}

fn check_float(x: f64, row: usize, issues: &mut CellIssues) -> Option<f64> {
    if !x.is_finite() {
        issues.add(ViolationCode::NonFiniteValue, row);
        None
    } else if x < 0.0 {
        issues.add(ViolationCode::NegativeValue, row);
        None
    } else {
        Some(x)
    }
}

// ============================================================================
// Row rules
// ============================================================================

fn check_row_units(table: &Table) -> Vec<SchemaViolation> {
    let pair = |onset: ColumnName, offset: ColumnName| {
        Some((
            &table.column(onset.as_str())?.data,
            &table.column(offset.as_str())?.data,
        ))
    };
    let pairs: Vec<(&ColumnData, &ColumnData)> = [
        pair(ColumnName::OnsetS, ColumnName::OffsetS),
        pair(ColumnName::OnsetSample, ColumnName::OffsetSample),
    ]
    .into_iter()
    .flatten()
    .collect();

    // No complete pair of columns is reported by the column set rules.
    if pairs.is_empty() {
        return Vec::new();
    }

    let mut incomplete = Vec::new();
    let mut empty = Vec::new();
    for row in 0..table.n_rows() {
        let mut any_complete = false;
        for (onset, offset) in &pairs {
            match (onset.is_null(row), offset.is_null(row)) {
                (false, false) => any_complete = true,
                (true, true) => {}
                _ => incomplete.push(row),
            }
        }
        if !any_complete {
            empty.push(row);
        }
    }
    incomplete.dedup();

    let mut violations = Vec::new();
    if !incomplete.is_empty() {
        violations.push(SchemaViolation::rows(
            ViolationCode::IncompleteUnitPair,
            incomplete,
            "onset and offset must both be set or both be empty",
        ));
    }
    if !empty.is_empty() {
        violations.push(SchemaViolation::rows(
            ViolationCode::NoUnitsInRow,
            empty,
            "row has no onset/offset in seconds or samples",
        ));
    }
    violations
}
