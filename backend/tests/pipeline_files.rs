use fuelprice::{
    canonicalize_column_names, run_file, transform_fuel_data, CleanOp, ParseError,
    PipelineError, PipelineOptions, Scalar, Table, TableError,
};
use serde_json::json;
use std::io::Write;

fn write_temp(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn weekly_prices() -> Table {
    Table::from_records(&[
        json!({"date": "2024-01-29", "ron95": 2.05, "ron97": 3.47, "diesel": 2.15}),
        json!({"date": "2024-01-01", "ron95": 2.05, "ron97": 3.45, "diesel": 2.15}),
        json!({"date": "2024-01-22", "ron95": 2.05, "ron97": 3.47, "diesel": 2.20}),
        json!({"date": "2024-01-08", "ron95": 2.05, "ron97": 3.47, "diesel": 2.15}),
        json!({"date": "2024-01-15", "ron95": 2.05, "ron97": 3.50, "diesel": null}),
    ])
    .unwrap()
}

#[test]
fn csv_file_end_to_end() {
    let file = write_temp(
        "date;ron95;ron97;diesel\n\
         2024-01-08;2.05;3.47;2.15\n\
         2024-01-01;2.00;3.45;2.15\n",
        ".csv",
    );

    let output = run_file(file.path(), &PipelineOptions::default()).unwrap();
    let table = &output.table;

    assert_eq!(output.input.delimiter, Some(';'));
    assert_eq!(table.n_rows(), 2);
    assert_eq!(
        table.get_column("ron95_price_increase").unwrap(),
        &[Scalar::Int(0), Scalar::Int(1)]
    );
    assert_eq!(table.get_column("ron95_cumulative_change").unwrap()[0], Scalar::Float(0.0));
    // Fewer rows than the window: every rolling average is missing
    for fuel in ["ron95", "ron97", "diesel"] {
        let avg = table.get_column(&format!("{}_4wk_avg", fuel)).unwrap();
        assert!(avg.iter().all(Scalar::is_null));
    }
    assert_eq!(table.get_column("year").unwrap(), &[Scalar::Int(2024), Scalar::Int(2024)]);
}

#[test]
fn json_file_with_options_file() {
    let data = write_temp(
        r#"{"data": [
            {"Week": "2024-01-08", "RON95": 2.05},
            {"Week": "2024-01-01", "RON95": 2.00}
        ]}"#,
        ".json",
    );
    let options = write_temp(
        r#"{
            "fuel": {
                "rename": {"Week": "price_date", "RON95": "ron95_price"},
                "rolling_window": 2
            },
            "clean": [{"type": "canonicalize_column_names"}]
        }"#,
        ".json",
    );

    let options = PipelineOptions::from_file(options.path()).unwrap();
    let output = run_file(data.path(), &options).unwrap();
    let names = output.table.column_names();

    assert!(names.contains(&"ron95_2wk_avg"));
    assert!(!names.contains(&"ron97_price"));
    let avg = output.table.get_column("ron95_2wk_avg").unwrap();
    assert_eq!(avg[0], Scalar::Null);
    assert!((avg[1].as_f64().unwrap() - 2.025).abs() < 1e-9);
}

#[test]
fn clean_only_chain_from_json() {
    let data = write_temp(
        "Station Name,Region,ron95Price\n  Alpha ,north,2.05\nBeta,,\nGamma,south,2.15\n",
        ".csv",
    );
    let ops: Vec<CleanOp> = serde_json::from_str(
        r#"[
            {"type": "canonicalize_column_names"},
            {"type": "trim_spaces"},
            {"type": "standardize_text", "columns": ["region"]},
            {"type": "fill_missing_numeric"},
            {"type": "fill_missing_categorical"}
        ]"#,
    )
    .unwrap();
    let options = PipelineOptions { skip_fuel_transform: true, clean: ops, ..Default::default() };

    let output = run_file(data.path(), &options).unwrap();
    let table = &output.table;

    assert_eq!(table.column_names(), vec!["station_name", "region", "ron95_price"]);
    assert_eq!(table.get_column("station_name").unwrap()[0], Scalar::from("Alpha"));
    assert_eq!(
        table.get_column("region").unwrap(),
        &[Scalar::from("NORTH"), Scalar::from("NA"), Scalar::from("SOUTH")]
    );
    let filled = table.get_column("ron95_price").unwrap()[1].as_f64().unwrap();
    assert!((filled - 2.1).abs() < 1e-9);
}

#[test]
fn transform_is_order_invariant() {
    let table = weekly_prices();
    let records = table.to_records();
    let reversed: Vec<_> = records.into_iter().rev().collect();

    let a = transform_fuel_data(&table).unwrap();
    let b = transform_fuel_data(&Table::from_records(&reversed).unwrap()).unwrap();

    assert_eq!(a, b);
}

#[test]
fn null_price_propagates_through_derived_columns() {
    let out = transform_fuel_data(&weekly_prices()).unwrap();

    // 2024-01-15 sorts to row 2 and has no diesel price
    let diesel = |suffix: &str| out.get_column(&format!("diesel_{}", suffix)).unwrap()[2].clone();
    assert_eq!(diesel("price"), Scalar::Null);
    assert_eq!(diesel("week_diff"), Scalar::Null);
    assert_eq!(diesel("cumulative_change"), Scalar::Null);
    assert_eq!(diesel("pct_change"), Scalar::Null);
    assert_eq!(diesel("price_increase"), Scalar::Int(0));

    // Row 3 cannot diff against the missing row, and no window holds it
    let diff = out.get_column("diesel_week_diff").unwrap();
    assert_eq!(diff[3], Scalar::Null);
    assert_eq!(out.get_column("diesel_4wk_avg").unwrap()[3], Scalar::Null);
    assert_eq!(out.get_column("diesel_4wk_avg").unwrap()[4], Scalar::Null);
    assert!(!out.get_column("ron95_4wk_avg").unwrap()[3].is_null());
}

#[test]
fn canonicalization_is_idempotent_on_loaded_headers() {
    let mut table = Table::from_records(&[json!({
        "Price Date": "2024-01-01", "ron95Price": 2.05, "Avg. Price": 2.0, "price_date": "x"
    })])
    .unwrap();

    canonicalize_column_names(&mut table).unwrap();
    let once: Vec<String> = table.column_names().iter().map(|s| s.to_string()).collect();
    canonicalize_column_names(&mut table).unwrap();

    assert_eq!(table.column_names(), once);
    assert_eq!(once, vec!["price_date", "ron95_price", "avg_price", "price_date_1"]);
}

#[test]
fn bad_price_reports_column_and_row() {
    let file = write_temp("date,ron95\n2024-01-01,2.05\n2024-01-08,n/a-ish\n", ".csv");

    let err = run_file(file.path(), &PipelineOptions::default()).unwrap_err();
    match err {
        PipelineError::Table(TableError::DataFormat { column, row, value, .. }) => {
            assert_eq!(column, "ron95_price");
            assert_eq!(row, 1);
            assert_eq!(value, "n/a-ish");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn zero_row_files_have_no_baseline() {
    for (content, suffix) in [("date,ron95,ron97,diesel\n", ".csv"), ("[]", ".json")] {
        let file = write_temp(content, suffix);
        let err = run_file(file.path(), &PipelineOptions::default()).unwrap_err();
        assert!(
            matches!(err, PipelineError::Table(TableError::EmptyInput { .. })),
            "{}: {}",
            suffix,
            err
        );
    }
}

#[test]
fn duplicate_csv_headers_are_rejected() {
    let file = write_temp("date,ron95,ron95\n2024-01-01,2.05,2.10\n", ".csv");

    let err = run_file(file.path(), &PipelineOptions::default()).unwrap_err();
    assert!(matches!(err, PipelineError::Parse(ParseError::Csv { line: 1, .. })));
}
