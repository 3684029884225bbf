//! Record loader for CSV and JSON price files.
//!
//! Turns raw bytes into JSON objects, one per row, ready for
//! [`crate::table::Table::from_records`]. CSV cells are typed per column:
//! a column whose non-empty cells all parse as numbers becomes numeric,
//! anything else stays text.

use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::path::Path;

use crate::error::{ParseError, ParseResult};
use crate::table::Table;

/// Cell contents read as missing in CSV input.
const NULL_TOKENS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

/// Format of the loaded input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    Csv,
    Json,
}

/// Result of loading with metadata
#[derive(Debug, Clone)]
pub struct ParsedInput {
    /// Parsed records as JSON objects
    pub records: Vec<Value>,
    /// Detected format
    pub format: InputFormat,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected delimiter (CSV only)
    pub delimiter: Option<char>,
    /// Column headers, in first-seen order
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> ParseResult<String> {
    let decoded = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).to_string(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.to_string(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.to_string(),
        other => match encoding_rs::Encoding::for_label(other.as_bytes()) {
            Some(enc) => enc.decode(bytes).0.to_string(),
            None => {
                return Err(ParseError::EncodingError(format!(
                    "unsupported encoding '{}'",
                    encoding
                )))
            }
        },
    };

    // Drop a UTF-8 byte order mark
    Ok(decoded.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text into typed records with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use fuelprice::csv_to_records;
///
/// let rows = csv_to_records("date,ron95\n2024-01-01,2.05", ',').unwrap();
/// assert_eq!(rows[0]["ron95"], 2.05);
/// ```
pub fn csv_to_records(content: &str, delimiter: char) -> ParseResult<Vec<Value>> {
    parse_csv(content, delimiter).map(|(records, _)| records)
}

fn parse_csv(content: &str, delimiter: char) -> ParseResult<(Vec<Value>, Vec<String>)> {
    if !delimiter.is_ascii() {
        return Err(ParseError::Csv {
            line: 0,
            message: format!("delimiter '{}' is not ASCII", delimiter),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.iter().all(String::is_empty) {
        return Err(ParseError::Csv { line: 1, message: "No headers found".to_string() });
    }
    for (i, header) in headers.iter().enumerate() {
        if headers[..i].contains(header) {
            return Err(ParseError::Csv {
                line: 1,
                message: format!("duplicate header '{}'", header),
            });
        }
    }

    let mut rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        if record.iter().all(str::is_empty) {
            continue;
        }
        rows.push(
            (0..headers.len())
                .map(|i| record.get(i).unwrap_or("").to_string())
                .collect(),
        );
    }

    let records = type_columns(&headers, rows);
    Ok((records, headers))
}

fn csv_error(err: csv::Error) -> ParseError {
    let line = err.position().map(|p| p.line() as usize).unwrap_or(0);
    ParseError::Csv { line, message: err.to_string() }
}

/// Column-wise inference: integers, then floats, then text.
fn type_columns(headers: &[String], rows: Vec<Vec<String>>) -> Vec<Value> {
    let kinds: Vec<CellKind> = (0..headers.len())
        .map(|col| {
            rows.iter()
                .map(|row| row[col].as_str())
                .filter(|raw| !is_null_token(raw))
                .fold(CellKind::Int, |kind, raw| kind.widen(raw))
        })
        .collect();

    rows.into_iter()
        .map(|row| {
            let object: Map<String, Value> = headers
                .iter()
                .zip(row)
                .zip(&kinds)
                .map(|((header, raw), kind)| (header.clone(), kind.convert(raw)))
                .collect();
            Value::Object(object)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Int,
    Float,
    Text,
}

impl CellKind {
    fn widen(self, raw: &str) -> CellKind {
        match self {
            CellKind::Int if raw.parse::<i64>().is_ok() => CellKind::Int,
            CellKind::Int | CellKind::Float if parse_finite(raw).is_some() => CellKind::Float,
            _ => CellKind::Text,
        }
    }

    fn convert(self, raw: String) -> Value {
        if is_null_token(&raw) {
            return Value::Null;
        }
        match self {
            CellKind::Int => raw.parse::<i64>().map(Value::from).unwrap_or(Value::String(raw)),
            CellKind::Float => parse_finite(&raw)
                .and_then(Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::String(raw)),
            CellKind::Text => Value::String(raw),
        }
    }
}

fn is_null_token(raw: &str) -> bool {
    NULL_TOKENS.contains(&raw)
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Parse a JSON array of objects, or an object wrapping one under `data`.
pub fn json_to_records(content: &str) -> ParseResult<Vec<Value>> {
    match serde_json::from_str::<Value>(content)? {
        Value::Array(items) => Ok(items),
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ParseError::NotRecords("an object without a 'data' array".to_string())),
        },
        other => Err(ParseError::NotRecords(format!("'{}'", other))),
    }
}

/// Parse bytes with auto-detection of format, encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> ParseResult<ParsedInput> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;

    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyFile);
    }

    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        let records = json_to_records(trimmed)?;
        let headers = collect_headers(&records);
        return Ok(ParsedInput {
            records,
            format: InputFormat::Json,
            encoding,
            delimiter: None,
            headers,
        });
    }

    let delimiter = detect_delimiter(&content);
    let (records, headers) = parse_csv(&content, delimiter)?;
    Ok(ParsedInput {
        records,
        format: InputFormat::Csv,
        encoding,
        delimiter: Some(delimiter),
        headers,
    })
}

/// Parse a file with auto-detection of format, encoding and delimiter.
pub fn parse_file_auto<P: AsRef<Path>>(path: P) -> ParseResult<ParsedInput> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

/// Write a table as CSV text. Nulls become empty cells, dates ISO text.
pub fn table_to_csv(table: &Table, delimiter: char) -> ParseResult<String> {
    if !delimiter.is_ascii() {
        return Err(ParseError::Csv {
            line: 0,
            message: format!("delimiter '{}' is not ASCII", delimiter),
        });
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter as u8)
        .from_writer(Vec::new());

    writer.write_record(table.column_names()).map_err(csv_error)?;
    for row in 0..table.n_rows() {
        let cells = table.column_names().into_iter().map(|name| {
            table
                .get_column(name)
                .and_then(|cells| cells[row].to_text())
                .unwrap_or_default()
        });
        writer.write_record(cells).map_err(csv_error)?;
    }

    let bytes = writer.into_inner().map_err(|e| ParseError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| ParseError::EncodingError(e.to_string()))
}

/// Union of object keys in first-seen order.
fn collect_headers(records: &[Value]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for key in records.iter().filter_map(Value::as_object).flat_map(|o| o.keys()) {
        if !headers.contains(key) {
            headers.push(key.clone());
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_typed_csv() {
        let csv = "date,ron95,ron97,region\n2024-01-01,2.05,3,north\n2024-01-08,2.05,3.47,south";
        let rows = csv_to_records(csv, ',').unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["date"], "2024-01-01");
        assert_eq!(rows[0]["ron95"], json!(2.05));
        assert_eq!(rows[0]["ron97"], json!(3.0));
        assert_eq!(rows[1]["region"], "south");
    }

    #[test]
    fn test_integer_column_stays_integer() {
        let rows = csv_to_records("week;count\n1;10\n2;12", ';').unwrap();
        assert_eq!(rows[1]["count"], json!(12));
        assert!(rows[1]["count"].is_i64());
    }

    #[test]
    fn test_null_tokens_and_missing_values() {
        let csv = "a,b,c\n1,,NA\n2,x,3";
        let rows = csv_to_records(csv, ',').unwrap();

        assert_eq!(rows[0]["b"], Value::Null);
        assert_eq!(rows[0]["c"], Value::Null);
        assert_eq!(rows[1]["c"], json!(3));
    }

    #[test]
    fn test_quoted_values() {
        let csv = "name;value\n\"Alice\";\"Hello; World\"";
        let rows = csv_to_records(csv, ';').unwrap();

        assert_eq!(rows[0]["name"], "Alice");
        assert_eq!(rows[0]["value"], "Hello; World");
    }

    #[test]
    fn test_empty_lines_skipped() {
        let rows = csv_to_records("a;b\n1;2\n\n3;4\n", ';').unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_short_rows_padded() {
        let rows = csv_to_records("a,b,c\n1", ',').unwrap();
        assert_eq!(rows[0]["a"], json!(1));
        assert_eq!(rows[0]["c"], Value::Null);
    }

    #[test]
    fn test_duplicate_headers_rejected() {
        let err = csv_to_records("date,ron95,ron95\n2024-01-01,2.05,2.10", ',').unwrap_err();
        match err {
            ParseError::Csv { line, message } => {
                assert_eq!(line, 1);
                assert!(message.contains("'ron95'"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_header_only_csv_keeps_headers() {
        let result = parse_bytes_auto(b"date,ron95,ron97,diesel\n").unwrap();
        assert!(result.records.is_empty());
        assert_eq!(result.headers, vec!["date", "ron95", "ron97", "diesel"]);
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(csv_to_records("", ',').is_err());
        assert!(matches!(parse_bytes_auto(b"   \n"), Err(ParseError::EmptyFile)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), ',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), '\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), '|');
    }

    #[test]
    fn test_auto_parse_csv() {
        let result = parse_bytes_auto(b"date;ron95\n2024-01-01;2.05\n2024-01-08;2.05").unwrap();

        assert_eq!(result.format, InputFormat::Csv);
        assert_eq!(result.delimiter, Some(';'));
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.headers, vec!["date", "ron95"]);
    }

    #[test]
    fn test_auto_parse_json() {
        let body =
            br#"[{"date": "2024-01-01", "ron95": 2.05}, {"date": "2024-01-08", "diesel": 2.15}]"#;
        let result = parse_bytes_auto(body).unwrap();

        assert_eq!(result.format, InputFormat::Json);
        assert_eq!(result.delimiter, None);
        assert_eq!(result.headers, vec!["date", "ron95", "diesel"]);
    }

    #[test]
    fn test_json_data_envelope() {
        let records =
            json_to_records(r#"{"data": [{"date": "2024-01-01"}], "source": "x"}"#).unwrap();
        assert_eq!(records, vec![json!({"date": "2024-01-01"})]);
    }

    #[test]
    fn test_json_object_is_not_records() {
        let err = parse_bytes_auto(br#"{"date": "2024-01-01"}"#).unwrap_err();
        assert!(matches!(err, ParseError::NotRecords(_)));
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_table_to_csv() {
        let table = Table::from_records(&[
            json!({"region": "north, east", "ron95": 2.05, "n": null}),
            json!({"region": "south", "ron95": 2.0, "n": 3}),
        ])
        .unwrap();

        let csv = table_to_csv(&table, ',').unwrap();
        assert_eq!(csv, "region,ron95,n\n\"north, east\",2.05,\nsouth,2.0,3\n");
    }

    #[test]
    fn test_bom_is_stripped() {
        let decoded = decode_content("\u{feff}date,ron95".as_bytes(), "utf-8").unwrap();
        assert!(decoded.starts_with("date"));
    }
}
