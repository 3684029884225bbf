//! Declarative cleaning operations.
//!
//! A [`CleanOp`] names one cleaning primitive and its arguments, so a
//! chain of them can be stored as JSON and replayed against any table.

use serde::{Deserialize, Serialize};

use super::clean;
use crate::error::TableResult;
use crate::table::{Table, DEFAULT_DATE_FORMATS};

/// All available cleaning operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CleanOp {
    /// Coerce named columns to dates
    ConvertDatetime {
        columns: Vec<String>,
        #[serde(default)]
        formats: Option<Vec<String>>,
    },

    /// Fill numeric nulls with the column median
    FillMissingNumeric,

    /// Fill text nulls with "NA"
    FillMissingCategorical,

    /// Trim and uppercase named text columns
    StandardizeText { columns: Vec<String> },

    /// Rewrite column names to lower_snake_case
    CanonicalizeColumnNames,

    /// Stringify and trim cells (all text columns when none named)
    TrimSpaces {
        #[serde(default)]
        columns: Option<Vec<String>>,
    },
}

impl CleanOp {
    /// Apply this operation to a table in place
    pub fn apply(&self, table: &mut Table) -> TableResult<()> {
        match self {
            CleanOp::ConvertDatetime { columns, formats } => {
                let columns = as_strs(columns);
                match formats {
                    Some(formats) => {
                        clean::convert_datetime_with_formats(table, &columns, formats.as_slice())
                    }
                    None => {
                        clean::convert_datetime_with_formats(table, &columns, DEFAULT_DATE_FORMATS)
                    }
                }
            }
            CleanOp::FillMissingNumeric => {
                clean::fill_missing_numeric(table);
                Ok(())
            }
            CleanOp::FillMissingCategorical => {
                clean::fill_missing_categorical(table);
                Ok(())
            }
            CleanOp::StandardizeText { columns } => {
                clean::standardize_text(table, &as_strs(columns));
                Ok(())
            }
            CleanOp::CanonicalizeColumnNames => clean::canonicalize_column_names(table),
            CleanOp::TrimSpaces { columns } => {
                let columns = columns.as_deref().map(as_strs);
                clean::trim_spaces(table, columns.as_deref());
                Ok(())
            }
        }
    }

    /// Snake-case name, as used in the JSON `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            CleanOp::ConvertDatetime { .. } => "convert_datetime",
            CleanOp::FillMissingNumeric => "fill_missing_numeric",
            CleanOp::FillMissingCategorical => "fill_missing_categorical",
            CleanOp::StandardizeText { .. } => "standardize_text",
            CleanOp::CanonicalizeColumnNames => "canonicalize_column_names",
            CleanOp::TrimSpaces { .. } => "trim_spaces",
        }
    }
}

fn as_strs(columns: &[String]) -> Vec<&str> {
    columns.iter().map(String::as_str).collect()
}

/// Apply operations in order, stopping at the first failure.
pub fn apply_all(table: &mut Table, ops: &[CleanOp]) -> TableResult<()> {
    for op in ops {
        op.apply(table)?;
    }
    Ok(())
}

/// Get a description of all available cleaning operations
pub fn operations_description() -> String {
    r#"Available cleaning operations:

| Operation | Description | Parameters |
|-----------|-------------|------------|
| convert_datetime | Coerce columns to dates (fails on unparseable text) | columns: list, formats: optional strftime list |
| fill_missing_numeric | Fill nulls in numeric columns with the median | - |
| fill_missing_categorical | Fill nulls in text columns with "NA" | - |
| standardize_text | Trim and uppercase text columns | columns: list |
| canonicalize_column_names | Rename columns to lower_snake_case, strip periods | - |
| trim_spaces | Stringify and trim cells | columns: optional list (default: all text columns) |

Example operations in JSON:
[
  {"type": "canonicalize_column_names"},
  {"type": "trim_spaces"},
  {"type": "standardize_text", "columns": ["region"]},
  {"type": "fill_missing_numeric"},
  {"type": "fill_missing_categorical"}
]"#
    .to_string()
}
