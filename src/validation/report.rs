//! Schema violation types for structured error reporting.
//!
//! A failed validation yields one [`SchemaError`] listing every violation
//! found, each with a stable code and the column (and rows) it concerns.

use std::fmt;

use serde::Serialize;

/// Number of offending rows listed in a message before eliding the rest.
const MAX_LISTED_ROWS: usize = 5;

/// All schema violations found in one table.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SchemaError {
    pub violations: Vec<SchemaViolation>,
}

impl SchemaError {
    pub fn new(violations: Vec<SchemaViolation>) -> Self {
        Self { violations }
    }

    /// A schema error holding a single violation.
    pub fn single(violation: SchemaViolation) -> Self {
        Self {
            violations: vec![violation],
        }
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns true if any violation has the given code.
    pub fn has(&self, code: ViolationCode) -> bool {
        self.violations.iter().any(|v| v.code == code)
    }

    /// Violations concerning the given column.
    pub fn for_column<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a SchemaViolation> {
        self.violations
            .iter()
            .filter(move |v| v.context.column() == Some(column))
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violation(s)", self.violations.len())?;
        for violation in &self.violations {
            write!(f, "; {}", violation)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaError {}

/// One broken schema rule.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SchemaViolation {
    /// A stable code for the rule that failed.
    pub code: ViolationCode,

    /// A human-readable description.
    pub message: String,

    /// Where in the table the violation was found.
    pub context: ViolationContext,
}

impl SchemaViolation {
    pub fn new(code: ViolationCode, message: impl Into<String>, context: ViolationContext) -> Self {
        Self {
            code,
            message: message.into(),
            context,
        }
    }

    /// A violation about the table's column set as a whole.
    pub fn table(code: ViolationCode, message: impl Into<String>) -> Self {
        Self::new(code, message, ViolationContext::Table)
    }

    /// A violation about one column.
    pub fn column(code: ViolationCode, column: &str, message: impl Into<String>) -> Self {
        Self::new(
            code,
            message,
            ViolationContext::Column {
                name: column.to_string(),
            },
        )
    }

    /// A violation about specific cells of one column.
    pub fn cells(
        code: ViolationCode,
        column: &str,
        rows: Vec<usize>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(
            code,
            message,
            ViolationContext::Cells {
                column: column.to_string(),
                rows,
            },
        )
    }

    /// A violation about whole rows.
    pub fn rows(code: ViolationCode, rows: Vec<usize>, message: impl Into<String>) -> Self {
        Self::new(code, message, ViolationContext::Rows { rows })
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}: {}", self.code, self.context, self.message)
    }
}

/// A stable code identifying the broken rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationCode {
    // Column set rules
    /// A column name outside the recognized set.
    UnknownColumn,
    /// The same column name appears more than once.
    DuplicateColumn,
    /// `annot_path`, `sequence` or `label` is missing.
    MissingRequiredColumn,
    /// Only one of `onset_s`/`offset_s` is present.
    UnpairedSecondsColumn,
    /// Only one of `onset_sample`/`offset_sample` is present.
    UnpairedSampleColumn,
    /// Neither the seconds pair nor the sample pair is present.
    MissingUnitColumns,

    // Cell rules
    /// A null cell in a non-nullable column.
    NullValue,
    /// A cell that does not parse as an integer.
    InvalidInteger,
    /// A cell that does not parse as a float.
    InvalidFloat,
    /// A negative number in a non-negative column.
    NegativeValue,
    /// NaN or infinity in a float column.
    NonFiniteValue,

    // Row rules
    /// A row fills one half of a unit pair but not the other.
    IncompleteUnitPair,
    /// A row has no complete unit pair at all.
    NoUnitsInRow,
}

/// Where a violation was found.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViolationContext {
    /// The table's column set.
    Table,
    /// A whole column.
    Column { name: String },
    /// Some cells of a column (0-based data rows).
    Cells { column: String, rows: Vec<usize> },
    /// Whole rows (0-based data rows).
    Rows { rows: Vec<usize> },
}

impl ViolationContext {
    /// The column this context points at, if any.
    pub fn column(&self) -> Option<&str> {
        match self {
            ViolationContext::Column { name } => Some(name),
            ViolationContext::Cells { column, .. } => Some(column),
            ViolationContext::Table | ViolationContext::Rows { .. } => None,
        }
    }
}

impl fmt::Display for ViolationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationContext::Table => write!(f, "table"),
            ViolationContext::Column { name } => write!(f, "column '{}'", name),
            ViolationContext::Cells { column, rows } => {
                write!(f, "column '{}' ", column)?;
                write_rows(f, rows)
            }
            ViolationContext::Rows { rows } => write_rows(f, rows),
        }
    }
}

fn write_rows(f: &mut fmt::Formatter<'_>, rows: &[usize]) -> fmt::Result {
    let listed: Vec<String> = rows
        .iter()
        .take(MAX_LISTED_ROWS)
        .map(|r| r.to_string())
        .collect();
    write!(f, "row(s) {}", listed.join(", "))?;
    if rows.len() > MAX_LISTED_ROWS {
        write!(f, " and {} more", rows.len() - MAX_LISTED_ROWS)?;
    }
    Ok(())
}
