//! Reusable cleaning primitives.
//!
//! Each operation mutates the table it is given in place. They are
//! independent of the fuel transform and can be chained in any order,
//! directly or through [`super::ops::CleanOp`].

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::error::{TableError, TableResult};
use crate::table::{parse_date, ColumnKind, Scalar, Table, DEFAULT_DATE_FORMATS};

/// Literal used by [`fill_missing_categorical`].
pub const MISSING_CATEGORY: &str = "NA";

/// A lowercase letter or digit followed by a capital.
static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("valid camel-case pattern"));

// =============================================================================
// Dates
// =============================================================================

/// Coerce the named columns to dates using the default formats.
///
/// Absent columns are skipped. Empty text becomes null; any other value
/// that does not parse fails with [`TableError::DataFormat`].
pub fn convert_datetime(table: &mut Table, columns: &[&str]) -> TableResult<()> {
    convert_datetime_with_formats(table, columns, DEFAULT_DATE_FORMATS)
}

/// [`convert_datetime`] with an explicit list of accepted formats.
pub fn convert_datetime_with_formats<S: AsRef<str>>(
    table: &mut Table,
    columns: &[&str],
    formats: &[S],
) -> TableResult<()> {
    for &column in columns {
        if table.has_column(column) {
            coerce_dates(table, column, formats)?;
        }
    }
    Ok(())
}

/// Coerce one column to dates. The column is left unchanged on failure.
pub(crate) fn coerce_dates<S: AsRef<str>>(
    table: &mut Table,
    column: &str,
    formats: &[S],
) -> TableResult<()> {
    let cells = table
        .get_column(column)
        .ok_or_else(|| TableError::schema(column, "date column is missing"))?;

    let parsed = cells
        .iter()
        .enumerate()
        .map(|(row, cell)| match cell {
            Scalar::Date(_) => Ok(cell.clone()),
            Scalar::Text(s) if s.trim().is_empty() => Ok(Scalar::Null),
            Scalar::Text(s) => parse_date(s, formats).map(Scalar::Date).ok_or_else(|| {
                TableError::data_format(column, row, s.as_str(), "unrecognized date")
            }),
            other if other.is_null() => Ok(Scalar::Null),
            other => Err(TableError::data_format(
                column,
                row,
                other.to_text().unwrap_or_default(),
                "expected a date or date text",
            )),
        })
        .collect::<TableResult<Vec<_>>>()?;

    table.set_column(column, parsed)
}

// =============================================================================
// Missing values
// =============================================================================

/// Replace nulls in every numeric column with the median of its non-null
/// values. Columns without any non-null value are left unchanged.
pub fn fill_missing_numeric(table: &mut Table) {
    let names: Vec<String> = table.column_names().iter().map(|n| n.to_string()).collect();

    for name in names {
        if !table.column_kind(&name).is_some_and(ColumnKind::is_numeric) {
            continue;
        }
        let Some(cells) = table.get_column_mut(&name) else {
            continue;
        };
        let Some(fill) = median(cells) else {
            continue;
        };
        for cell in cells.iter_mut().filter(|c| c.is_null()) {
            *cell = Scalar::float(fill);
        }
    }
}

/// Replace nulls in every text column with [`MISSING_CATEGORY`].
pub fn fill_missing_categorical(table: &mut Table) {
    let names: Vec<String> = table.column_names().iter().map(|n| n.to_string()).collect();

    for name in names {
        if !table.column_kind(&name).is_some_and(is_text_like) {
            continue;
        }
        if let Some(cells) = table.get_column_mut(&name) {
            for cell in cells.iter_mut().filter(|c| c.is_null()) {
                *cell = Scalar::Text(MISSING_CATEGORY.to_string());
            }
        }
    }
}

/// Median of the non-null numeric cells.
pub fn median(cells: &[Scalar]) -> Option<f64> {
    let mut values: Vec<f64> = cells.iter().filter_map(Scalar::as_f64).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

// =============================================================================
// Text
// =============================================================================

/// Trim and uppercase the text cells of the named text columns. Non-text
/// and absent columns are left untouched.
pub fn standardize_text(table: &mut Table, columns: &[&str]) {
    for &column in columns {
        if !table.column_kind(column).is_some_and(is_text_like) {
            continue;
        }
        if let Some(cells) = table.get_column_mut(column) {
            for cell in cells.iter_mut() {
                if let Scalar::Text(s) = cell {
                    *s = s.trim().to_uppercase();
                }
            }
        }
    }
}

/// Stringify and trim every non-null cell of the given columns, or of
/// every text column when `columns` is `None`. Nulls stay null.
pub fn trim_spaces(table: &mut Table, columns: Option<&[&str]>) {
    let targets: Vec<String> = match columns {
        Some(columns) => columns.iter().map(|c| c.to_string()).collect(),
        None => table
            .column_names()
            .into_iter()
            .filter(|name| table.column_kind(name).is_some_and(is_text_like))
            .map(str::to_string)
            .collect(),
    };

    for name in targets {
        if let Some(cells) = table.get_column_mut(&name) {
            for cell in cells.iter_mut() {
                if let Some(text) = cell.to_text() {
                    *cell = Scalar::Text(text.trim().to_string());
                }
            }
        }
    }
}

fn is_text_like(kind: ColumnKind) -> bool {
    matches!(kind, ColumnKind::Text | ColumnKind::Mixed)
}

// =============================================================================
// Column names
// =============================================================================

/// Canonical lower_snake_case form of a single column name.
///
/// Names containing a space are split on whitespace and joined with `_`;
/// other names get `_` between a lowercase letter or digit and a
/// following capital. The result is lowercased and stripped of periods.
pub fn canonicalize_name(name: &str) -> String {
    let snake = if name.contains(' ') {
        name.split_whitespace().collect::<Vec<_>>().join("_")
    } else {
        CAMEL_BOUNDARY.replace_all(name, "${1}_${2}").into_owned()
    };
    snake.to_lowercase().replace('.', "")
}

/// Rewrite every column name with [`canonicalize_name`].
///
/// Names that collide after canonicalization get `_1`, `_2`, ... so the
/// schema stays unique. Applying this twice gives the same names as once.
pub fn canonicalize_column_names(table: &mut Table) -> TableResult<()> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(table.n_cols());

    for name in table.column_names() {
        let base = canonicalize_name(name);
        let mut candidate = base.clone();
        let mut count = 0;
        while seen.contains(&candidate) {
            count += 1;
            candidate = format!("{}_{}", base, count);
        }
        seen.insert(candidate.clone());
        names.push(candidate);
    }

    table.set_column_names(names)
}
