//! High-level pipeline API: load records, run the fuel transform, then the
//! cleaning chain.
//!
//! # Example
//!
//! ```rust,ignore
//! use fuelprice::{run_file, PipelineOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let output = run_file("weekly_prices.csv", &PipelineOptions::default())?;
//!     println!("{}", output.summary());
//!     Ok(())
//! }
//! ```

use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use super::fuel::{transform_fuel_data_with, FUEL_STEPS};
use super::ops::apply_all;
use crate::config::{FuelTransformOptions, PipelineOptions};
use crate::error::PipelineResult;
use crate::logs::{log_info, log_info_indent, log_success, log_warning};
use crate::parser::{parse_bytes_auto, parse_file_auto, InputFormat, ParsedInput};
use crate::table::Table;

/// Input file information
#[derive(Debug, Clone, Serialize)]
pub struct InputInfo {
    pub format: Option<InputFormat>,
    pub encoding: Option<String>,
    pub delimiter: Option<char>,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Result of a complete pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Final table
    pub table: Table,

    /// Where the rows came from
    pub input: InputInfo,

    /// Names of the steps that ran, in order
    pub steps: Vec<String>,
}

impl PipelineOutput {
    /// Final table as JSON records
    pub fn records(&self) -> Vec<Value> {
        self.table.to_records()
    }

    /// One-line description of the run
    pub fn summary(&self) -> String {
        format!(
            "{} rows in, {} rows x {} columns out after {} steps",
            self.input.row_count,
            self.table.n_rows(),
            self.table.n_cols(),
            self.steps.len()
        )
    }
}

/// Load a CSV or JSON file and run the pipeline on it.
pub fn run_file<P: AsRef<Path>>(
    path: P,
    options: &PipelineOptions,
) -> PipelineResult<PipelineOutput> {
    log_info(format!("Reading {}", path.as_ref().display()));
    let parsed = parse_file_auto(path)?;
    run_parsed(parsed, options)
}

/// Same as [`run_file`] but from raw bytes.
pub fn run_bytes(bytes: &[u8], options: &PipelineOptions) -> PipelineResult<PipelineOutput> {
    let parsed = parse_bytes_auto(bytes)?;
    run_parsed(parsed, options)
}

/// Run the pipeline on records that are already loaded.
pub fn run_records(
    records: &[Value],
    options: &PipelineOptions,
) -> PipelineResult<PipelineOutput> {
    let table = Table::from_records(records)?;
    let input = InputInfo {
        format: None,
        encoding: None,
        delimiter: None,
        headers: table.column_names().iter().map(|n| n.to_string()).collect(),
        row_count: table.n_rows(),
    };
    run_table(table, input, options)
}

fn run_parsed(parsed: ParsedInput, options: &PipelineOptions) -> PipelineResult<PipelineOutput> {
    log_success(format!("Detected encoding: {}", parsed.encoding));
    if let Some(delimiter) = parsed.delimiter {
        log_success(format!("Detected separator: '{}'", format_delimiter(delimiter)));
    }
    log_success(format!("Read {} rows", parsed.records.len()));
    log_info_indent(format!("Columns: {}", parsed.headers.join(", ")), 1);

    let table = Table::from_records_with_columns(&parsed.headers, &parsed.records)?;
    let input = InputInfo {
        format: Some(parsed.format),
        encoding: Some(parsed.encoding),
        delimiter: parsed.delimiter,
        headers: parsed.headers,
        row_count: parsed.records.len(),
    };
    run_table(table, input, options)
}

fn run_table(
    table: Table,
    input: InputInfo,
    options: &PipelineOptions,
) -> PipelineResult<PipelineOutput> {
    let mut steps = Vec::new();

    let mut table = if options.skip_fuel_transform {
        table
    } else {
        log_info("Running fuel transform...");
        warn_missing_fuels(&table, &options.fuel);
        let transformed = transform_fuel_data_with(&table, &options.fuel)?;
        steps.extend(FUEL_STEPS.iter().map(|step| step.name().to_string()));
        log_success(format!(
            "Fuel transform: {} rows, {} columns",
            transformed.n_rows(),
            transformed.n_cols()
        ));
        transformed
    };

    if !options.clean.is_empty() {
        log_info(format!("Applying {} cleaning operations...", options.clean.len()));
        apply_all(&mut table, &options.clean)?;
        steps.extend(options.clean.iter().map(|op| op.name().to_string()));
        log_success(format!("Cleaned: {} columns", table.n_cols()));
    }

    Ok(PipelineOutput { table, input, steps })
}

/// Fuels without a price column get no derived columns; say so.
fn warn_missing_fuels(table: &Table, fuel: &FuelTransformOptions) {
    let renamed: Vec<&str> = table
        .column_names()
        .into_iter()
        .map(|name| fuel.rename.get(name).map(String::as_str).unwrap_or(name))
        .collect();
    for name in &fuel.fuels {
        let column = fuel.price_column(name);
        if !renamed.contains(&column.as_str()) {
            log_warning(format!("No '{}' column, skipping {} features", column, name));
        }
    }
}

/// Printable form of a delimiter
pub fn format_delimiter(d: char) -> String {
    match d {
        '\t' => "\\t".to_string(),
        c => c.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PipelineError, TableError};
    use crate::table::Scalar;
    use crate::transform::ops::CleanOp;
    use serde_json::json;
    use std::io::Write;

    const CSV: &[u8] = b"date,ron95,ron97,diesel\n\
        2024-01-15,2.05,3.47,2.15\n\
        2024-01-01,2.05,3.45,2.15\n\
        2024-01-08,2.05,3.47,2.15\n";

    #[test]
    fn test_run_bytes_csv() {
        let output = run_bytes(CSV, &PipelineOptions::default()).unwrap();

        assert_eq!(output.input.format, Some(InputFormat::Csv));
        assert_eq!(output.input.row_count, 3);
        assert_eq!(output.steps.len(), FUEL_STEPS.len());
        assert_eq!(output.steps[0], "rename");
        assert_eq!(
            output.table.get_column("ron97_week_diff").unwrap(),
            &[Scalar::Null, Scalar::Float(3.47 - 3.45), Scalar::Float(0.0)]
        );
    }

    #[test]
    fn test_skip_fuel_transform_only_cleans() {
        let options = PipelineOptions {
            skip_fuel_transform: true,
            clean: vec![CleanOp::CanonicalizeColumnNames],
            ..PipelineOptions::default()
        };
        let records = vec![json!({"Station Name": "a", "ron95Price": 2.05})];
        let output = run_records(&records, &options).unwrap();

        assert_eq!(output.table.column_names(), vec!["station_name", "ron95_price"]);
        assert_eq!(output.steps, vec!["canonicalize_column_names"]);
        assert_eq!(output.input.format, None);
    }

    #[test]
    fn test_clean_runs_after_transform() {
        let options = PipelineOptions {
            clean: vec![CleanOp::FillMissingNumeric],
            ..PipelineOptions::default()
        };
        let output = run_bytes(CSV, &options).unwrap();

        // The first week_diff is null after the transform; the median fill
        // replaces it.
        let diffs = output.table.get_column("ron95_week_diff").unwrap();
        assert!(diffs.iter().all(|c| !c.is_null()));
        assert_eq!(output.steps.last().map(String::as_str), Some("fill_missing_numeric"));
    }

    #[test]
    fn test_missing_date_column_is_transform_error() {
        let err =
            run_bytes(b"day,ron95\n2024-01-01,2.05\n", &PipelineOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Table(_)));
    }

    #[test]
    fn test_header_only_csv_is_empty_input() {
        let err = run_bytes(b"date,ron95,ron97,diesel\n", &PipelineOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Table(TableError::EmptyInput { .. })));
    }

    #[test]
    fn test_empty_json_array_is_empty_input() {
        let err = run_bytes(b"[]", &PipelineOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Table(TableError::EmptyInput { .. })));
    }

    #[test]
    fn test_header_only_csv_keeps_columns_when_cleaning() {
        let options = PipelineOptions {
            skip_fuel_transform: true,
            clean: vec![CleanOp::CanonicalizeColumnNames],
            ..PipelineOptions::default()
        };
        let output = run_bytes(b"Price Date,ron95Price\n", &options).unwrap();

        assert_eq!(output.table.n_rows(), 0);
        assert_eq!(output.table.column_names(), vec!["price_date", "ron95_price"]);
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        let err = run_bytes(b"", &PipelineOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Parse(_)));
    }

    #[test]
    fn test_run_file_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"date": "2024-01-22", "ron95": 2.05, "diesel": null}},
                {{"date": "2024-01-01", "ron95": 2.05, "diesel": 2.15}},
                {{"date": "2024-01-15", "ron95": 2.05, "diesel": 2.15}},
                {{"date": "2024-01-08", "ron95": 2.05, "diesel": 2.20}}
            ]"#
        )
        .unwrap();

        let output = run_file(file.path(), &PipelineOptions::default()).unwrap();
        let table = &output.table;

        assert_eq!(output.input.format, Some(InputFormat::Json));
        let avg = table.get_column("ron95_4wk_avg").unwrap()[3].as_f64().unwrap();
        assert!((avg - 2.05).abs() < 1e-9);
        // A missing price makes every window containing it missing
        assert_eq!(table.get_column("diesel_4wk_avg").unwrap()[3], Scalar::Null);
        assert_eq!(table.get_column("diesel_week_diff").unwrap()[3], Scalar::Null);
        assert_eq!(
            table.get_column("diesel_price_increase").unwrap(),
            &[Scalar::Int(0), Scalar::Int(1), Scalar::Int(0), Scalar::Int(0)]
        );
        assert!(!table.has_column("ron97_week_diff"));
    }

    #[test]
    fn test_row_order_does_not_matter() {
        let forward = run_bytes(CSV, &PipelineOptions::default()).unwrap();
        let reversed = run_bytes(
            b"date,ron95,ron97,diesel\n\
              2024-01-08,2.05,3.47,2.15\n\
              2024-01-01,2.05,3.45,2.15\n\
              2024-01-15,2.05,3.47,2.15\n",
            &PipelineOptions::default(),
        )
        .unwrap();

        assert_eq!(forward.table, reversed.table);
    }

    #[test]
    fn test_summary() {
        let output = run_bytes(CSV, &PipelineOptions::default()).unwrap();
        assert!(output.summary().starts_with("3 rows in, 3 rows x "));
    }

    #[test]
    fn test_format_delimiter() {
        assert_eq!(format_delimiter('\t'), "\\t");
        assert_eq!(format_delimiter(';'), ";");
    }
}
