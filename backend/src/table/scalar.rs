//! Scalar cells and column type families.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;

/// Date formats tried, in order, when coercing text to a date.
///
/// Slash-separated dates are read month-first.
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y/%m/%d",
    "%m/%d/%Y",
];

/// A single cell of a [`crate::table::Table`].
///
/// `Null` is the only missing-value marker: floats built through
/// [`Scalar::float`] never hold NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Bool(bool),
}

/// Type family of a column, ignoring null cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// No non-null cell.
    Null,
    /// Integers only.
    Int,
    /// Floats, possibly mixed with integers.
    Float,
    Text,
    Date,
    Bool,
    /// Cells from more than one family.
    Mixed,
}

impl ColumnKind {
    /// Compute the family of a sequence of cells.
    pub fn of(values: &[Scalar]) -> Self {
        values.iter().fold(ColumnKind::Null, |kind, value| kind.merge(value.kind()))
    }

    fn merge(self, other: ColumnKind) -> ColumnKind {
        use ColumnKind::*;
        match (self, other) {
            (Null, k) | (k, Null) => k,
            (Int, Float) | (Float, Int) => Float,
            (a, b) if a == b => a,
            _ => Mixed,
        }
    }

    /// Integers or floats.
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Int | ColumnKind::Float)
    }

    pub fn is_text(self) -> bool {
        matches!(self, ColumnKind::Text)
    }
}

impl Scalar {
    /// Build a float cell, collapsing NaN to `Null`.
    pub fn float(value: f64) -> Self {
        if value.is_nan() {
            Scalar::Null
        } else {
            Scalar::Float(value)
        }
    }

    /// Build a float cell from an optional value.
    pub fn from_option(value: Option<f64>) -> Self {
        value.map(Scalar::float).unwrap_or(Scalar::Null)
    }

    /// Convert a JSON value to a scalar. Arrays and objects are not scalars.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Scalar::Null),
            Value::Bool(b) => Some(Scalar::Bool(*b)),
            Value::Number(n) => Some(match n.as_i64() {
                Some(i) => Scalar::Int(i),
                None => Scalar::from_option(n.as_f64()),
            }),
            Value::String(s) => Some(Scalar::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Convert back to JSON. Dates render as `YYYY-MM-DD`.
    pub fn to_json(&self) -> Value {
        match self {
            Scalar::Null => Value::Null,
            Scalar::Int(i) => Value::from(*i),
            Scalar::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Scalar::Text(s) => Value::String(s.clone()),
            Scalar::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            Scalar::Bool(b) => Value::Bool(*b),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Scalar::Null => ColumnKind::Null,
            Scalar::Int(_) => ColumnKind::Int,
            Scalar::Float(f) if f.is_nan() => ColumnKind::Null,
            Scalar::Float(_) => ColumnKind::Float,
            Scalar::Text(_) => ColumnKind::Text,
            Scalar::Date(_) => ColumnKind::Date,
            Scalar::Bool(_) => ColumnKind::Bool,
        }
    }

    /// True for `Null` and for a NaN float that slipped past [`Scalar::float`].
    pub fn is_null(&self) -> bool {
        match self {
            Scalar::Null => true,
            Scalar::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Numeric value of an integer or non-NaN float cell.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(i) => Some(*i as f64),
            Scalar::Float(f) if !f.is_nan() => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Scalar::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Text rendering of a non-null cell.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Scalar::Null => None,
            Scalar::Int(i) => Some(i.to_string()),
            Scalar::Float(f) if f.is_nan() => None,
            Scalar::Float(f) => Some(format!("{:?}", f)),
            Scalar::Text(s) => Some(s.clone()),
            Scalar::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
            Scalar::Bool(b) => Some(b.to_string()),
        }
    }

    /// Replace a NaN float with `Null`, leaving every other cell as is.
    pub fn normalize_null(self) -> Self {
        if self.is_null() {
            Scalar::Null
        } else {
            self
        }
    }

    /// Order two cells for sorting. Nulls compare greater than everything
    /// so that an ascending sort places them last; callers sorting
    /// descending must keep nulls last themselves.
    pub fn compare(&self, other: &Scalar) -> Ordering {
        match (self.is_null(), other.is_null()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }

        if let (Some(a), Some(b)) = (self.as_f64(), other.as_f64()) {
            return a.total_cmp(&b);
        }

        match (self, other) {
            (Scalar::Text(a), Scalar::Text(b)) => a.cmp(b),
            (Scalar::Date(a), Scalar::Date(b)) => a.cmp(b),
            (Scalar::Bool(a), Scalar::Bool(b)) => a.cmp(b),
            _ => self.family_rank().cmp(&other.family_rank()),
        }
    }

    fn family_rank(&self) -> u8 {
        match self {
            Scalar::Null => 4,
            Scalar::Bool(_) => 0,
            Scalar::Int(_) | Scalar::Float(_) => 1,
            Scalar::Date(_) => 2,
            Scalar::Text(_) => 3,
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::float(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<NaiveDate> for Scalar {
    fn from(value: NaiveDate) -> Self {
        Scalar::Date(value)
    }
}

/// Parse a date from text using the given formats, then RFC 3339.
///
/// Datetime formats keep only the calendar date.
pub fn parse_date<S: AsRef<str>>(raw: &str, formats: &[S]) -> Option<NaiveDate> {
    let raw = raw.trim();
    for format in formats {
        let format = format.as_ref();
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(datetime.date());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|datetime| datetime.date_naive())
}
