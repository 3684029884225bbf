//! The fixed fuel price transform.
//!
//! [`transform_fuel_data`] runs the steps in [`FUEL_STEPS`] over a copy
//! of the input table:
//!
//! ```text
//! Rename → ParseDates → Sort → NullPass → Derive → Calendar → FinalNullPass
//! ```
//!
//! Each step is public so it can be exercised on its own; the order
//! matters because every derived column reads rows in chronological order.

use chrono::Datelike;

use super::clean::coerce_dates;
use super::series;
use crate::config::FuelTransformOptions;
use crate::error::{TableError, TableResult};
use crate::table::{Scalar, Table};

/// One named stage of the fuel transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuelStep {
    /// Apply the rename map. Absent source columns are skipped.
    Rename,
    /// Requires the date column. Text becomes dates, empty text null,
    /// anything unparseable is a data format error.
    ParseDates,
    /// Stable ascending sort on the date column, nulls last.
    Sort,
    /// NaN becomes null everywhere; price columns become floats.
    NullPass,
    /// Adds the per-fuel derived columns for every fuel whose price column
    /// exists. Requires at least one row.
    Derive,
    /// Adds `year`, `month` and ISO `week` from the date column.
    Calendar,
    /// NaN becomes null everywhere.
    FinalNullPass,
}

/// The transform, in execution order.
pub const FUEL_STEPS: [FuelStep; 7] = [
    FuelStep::Rename,
    FuelStep::ParseDates,
    FuelStep::Sort,
    FuelStep::NullPass,
    FuelStep::Derive,
    FuelStep::Calendar,
    FuelStep::FinalNullPass,
];

impl FuelStep {
    pub fn name(&self) -> &'static str {
        match self {
            FuelStep::Rename => "rename",
            FuelStep::ParseDates => "parse_dates",
            FuelStep::Sort => "sort",
            FuelStep::NullPass => "null_pass",
            FuelStep::Derive => "derive",
            FuelStep::Calendar => "calendar",
            FuelStep::FinalNullPass => "final_null_pass",
        }
    }

    /// Run this step on a table in place.
    pub fn apply(&self, table: &mut Table, options: &FuelTransformOptions) -> TableResult<()> {
        match self {
            FuelStep::Rename => table.rename_columns(&options.rename),
            FuelStep::ParseDates => {
                coerce_dates(table, &options.date_column, options.date_formats.as_slice())
            }
            FuelStep::Sort => table.sort_by(&options.date_column, true),
            FuelStep::NullPass => {
                normalize_nulls(table);
                coerce_prices(table, options)
            }
            FuelStep::Derive => derive_fuel_columns(table, options),
            FuelStep::Calendar => add_calendar_columns(table, &options.date_column),
            FuelStep::FinalNullPass => {
                normalize_nulls(table);
                Ok(())
            }
        }
    }
}

/// Normalize and enrich a weekly fuel price table with the default options.
///
/// The input is not modified. The output holds the original columns
/// (renamed) followed by the derived ones, in chronological row order.
pub fn transform_fuel_data(table: &Table) -> TableResult<Table> {
    transform_fuel_data_with(table, &FuelTransformOptions::default())
}

/// [`transform_fuel_data`] with explicit options.
pub fn transform_fuel_data_with(
    table: &Table,
    options: &FuelTransformOptions,
) -> TableResult<Table> {
    if table.is_empty() {
        return Err(TableError::empty_input("cumulative_change baseline"));
    }
    let mut working = table.copy();
    for step in FUEL_STEPS {
        step.apply(&mut working, options)?;
    }
    Ok(working)
}

/// Replace every NaN cell with `Null`.
pub fn normalize_nulls(table: &mut Table) {
    let names: Vec<String> = table.column_names().iter().map(|n| n.to_string()).collect();
    for name in names {
        if let Some(cells) = table.get_column_mut(&name) {
            for cell in cells.iter_mut().filter(|c| c.is_null()) {
                *cell = Scalar::Null;
            }
        }
    }
}

/// Turn every present price column into floats.
fn coerce_prices(table: &mut Table, options: &FuelTransformOptions) -> TableResult<()> {
    for fuel in &options.fuels {
        let column = options.price_column(fuel);
        let Some(cells) = table.get_column(&column) else {
            continue;
        };
        let prices = cells
            .iter()
            .enumerate()
            .map(|(row, cell)| {
                to_price(cell).map_err(|value| {
                    TableError::data_format(&column, row, value, "expected a numeric price")
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        table.set_column(column, prices)?;
    }
    Ok(())
}

fn to_price(cell: &Scalar) -> Result<Scalar, String> {
    match cell {
        Scalar::Int(i) => Ok(Scalar::Float(*i as f64)),
        Scalar::Float(f) => Ok(Scalar::float(*f)),
        Scalar::Text(s) if s.trim().is_empty() => Ok(Scalar::Null),
        Scalar::Text(s) => s
            .trim()
            .parse::<f64>()
            .map(Scalar::float)
            .map_err(|_| s.clone()),
        Scalar::Null => Ok(Scalar::Null),
        other => Err(other.to_text().unwrap_or_default()),
    }
}

fn price_series(cells: &[Scalar]) -> Vec<Option<f64>> {
    cells.iter().map(Scalar::as_f64).collect()
}

fn floats(values: Vec<Option<f64>>) -> Vec<Scalar> {
    values.into_iter().map(Scalar::from_option).collect()
}

/// Add week-over-week difference, rolling average, change since the first
/// row, increase flag and percentage change for every fuel present.
fn derive_fuel_columns(table: &mut Table, options: &FuelTransformOptions) -> TableResult<()> {
    if table.is_empty() {
        return Err(TableError::empty_input("cumulative_change baseline"));
    }

    let present: Vec<(&str, Vec<Option<f64>>)> = options
        .fuels
        .iter()
        .filter_map(|fuel| {
            table
                .get_column(&options.price_column(fuel))
                .map(|cells| (fuel.as_str(), price_series(cells)))
        })
        .collect();

    let diffs: Vec<Vec<Option<f64>>> = present.iter().map(|(_, p)| series::diff(p)).collect();

    for ((fuel, _), diff) in present.iter().zip(&diffs) {
        table.set_column(format!("{}_week_diff", fuel), floats(diff.clone()))?;
    }
    for (fuel, prices) in &present {
        let avg = series::rolling_mean(prices, options.rolling_window);
        table.set_column(options.rolling_column(fuel), floats(avg))?;
    }
    for (fuel, prices) in &present {
        let change = series::change_from_first(prices)
            .ok_or_else(|| TableError::empty_input("cumulative_change baseline"))?;
        table.set_column(format!("{}_cumulative_change", fuel), floats(change))?;
    }
    for ((fuel, _), diff) in present.iter().zip(&diffs) {
        let flags = series::increase_flags(diff).into_iter().map(Scalar::Int).collect();
        table.set_column(format!("{}_price_increase", fuel), flags)?;
    }
    for (fuel, prices) in &present {
        table.set_column(format!("{}_pct_change", fuel), floats(series::pct_change(prices)))?;
    }
    Ok(())
}

/// Add `year`, `month` and ISO 8601 `week` columns.
fn add_calendar_columns(table: &mut Table, date_column: &str) -> TableResult<()> {
    let dates: Vec<_> = table
        .get_column(date_column)
        .ok_or_else(|| TableError::schema(date_column, "date column is missing"))?
        .iter()
        .map(Scalar::as_date)
        .collect();

    let field = |f: fn(&chrono::NaiveDate) -> i64| -> Vec<Scalar> {
        dates
            .iter()
            .map(|d| d.as_ref().map(f).map(Scalar::Int).unwrap_or(Scalar::Null))
            .collect()
    };

    let years = field(|d| i64::from(d.year()));
    let months = field(|d| i64::from(d.month()));
    let weeks = field(|d| i64::from(d.iso_week().week()));

    table.set_column("year", years)?;
    table.set_column("month", months)?;
    table.set_column("week", weeks)
}
