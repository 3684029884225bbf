//! The in-memory rectangular dataset.

use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

use super::scalar::{ColumnKind, Scalar};
use crate::error::{TableError, TableResult};

/// A named sequence of cells.
#[derive(Debug, Clone, PartialEq)]
struct Column {
    name: String,
    values: Vec<Scalar>,
}

/// Ordered collection of named, equal-length columns.
///
/// Row `i` across all columns is one logical record. Every mutating
/// method keeps the row count shared by all columns.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: usize,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, values)` pairs.
    pub fn from_columns<I>(columns: I) -> TableResult<Self>
    where
        I: IntoIterator<Item = (String, Vec<Scalar>)>,
    {
        let mut table = Table::new();
        for (name, values) in columns {
            if table.has_column(&name) {
                return Err(TableError::schema(name, "duplicate column name"));
            }
            table.set_column(name, values)?;
        }
        Ok(table)
    }

    /// Build a table from records (JSON objects).
    ///
    /// Columns are the union of all keys in first-seen order; a record
    /// lacking a key gets a null cell. Integers and floats reconcile into
    /// one numeric column, any other mix of families is a schema error.
    pub fn from_records(records: &[Value]) -> TableResult<Self> {
        let mut names: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut data: Vec<Vec<Scalar>> = Vec::new();

        for (row, record) in records.iter().enumerate() {
            let object = record.as_object().ok_or_else(|| {
                TableError::schema("<record>", format!("record {} is not an object", row))
            })?;

            for (key, value) in object {
                let scalar = Scalar::from_json(value).ok_or_else(|| {
                    TableError::schema(key, format!("row {}: value is not a scalar", row))
                })?;

                let idx = match positions.get(key) {
                    Some(&idx) => idx,
                    None => {
                        names.push(key.clone());
                        data.push(vec![Scalar::Null; row]);
                        positions.insert(key.clone(), data.len() - 1);
                        data.len() - 1
                    }
                };
                data[idx].push(scalar);
            }

            for values in data.iter_mut() {
                if values.len() <= row {
                    values.push(Scalar::Null);
                }
            }
        }

        for (name, values) in names.iter().zip(&data) {
            if ColumnKind::of(values) == ColumnKind::Mixed {
                return Err(TableError::schema(
                    name,
                    "conflicting value types across records",
                ));
            }
        }

        Ok(Table {
            columns: names
                .into_iter()
                .zip(data)
                .map(|(name, values)| Column { name, values })
                .collect(),
            rows: records.len(),
        })
    }

    /// Build a table from records with a known column list.
    ///
    /// Listed columns come first, in order, and exist even when no record
    /// carries them, so a zero-row input keeps its schema. Keys found only
    /// in the records follow in first-seen order.
    pub fn from_records_with_columns(columns: &[String], records: &[Value]) -> TableResult<Self> {
        let mut loaded = Table::from_records(records)?;
        let rows = loaded.rows;

        let mut ordered = Vec::with_capacity(columns.len() + loaded.columns.len());
        for name in columns {
            if ordered.iter().any(|c: &Column| &c.name == name) {
                return Err(TableError::schema(name.as_str(), "duplicate column name"));
            }
            let values = match loaded.position(name) {
                Some(idx) => loaded.columns.remove(idx).values,
                None => vec![Scalar::Null; rows],
            };
            ordered.push(Column { name: name.clone(), values });
        }
        ordered.append(&mut loaded.columns);

        Ok(Table { columns: ordered, rows })
    }

    /// Convert back into records, one JSON object per row.
    pub fn to_records(&self) -> Vec<Value> {
        (0..self.rows).filter_map(|row| self.record(row)).collect()
    }

    /// A single row as a JSON object.
    pub fn record(&self, row: usize) -> Option<Value> {
        if row >= self.rows {
            return None;
        }
        let object: Map<String, Value> = self
            .columns
            .iter()
            .map(|column| (column.name.clone(), column.values[row].to_json()))
            .collect();
        Some(Value::Object(object))
    }

    /// Deep, independent duplicate.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    pub fn n_rows(&self) -> usize {
        self.rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn get_column(&self, name: &str) -> Option<&[Scalar]> {
        self.position(name).map(|idx| self.columns[idx].values.as_slice())
    }

    /// Mutable access to a column's cells. The length cannot change
    /// through a slice, so the row invariant holds.
    pub fn get_column_mut(&mut self, name: &str) -> Option<&mut [Scalar]> {
        self.position(name).map(move |idx| self.columns[idx].values.as_mut_slice())
    }

    /// Type family of a column, ignoring nulls.
    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        self.get_column(name).map(ColumnKind::of)
    }

    /// Overwrite an existing column or append a new one.
    pub fn set_column(&mut self, name: impl Into<String>, values: Vec<Scalar>) -> TableResult<()> {
        let name = name.into();
        if self.columns.is_empty() {
            self.rows = values.len();
        } else if values.len() != self.rows {
            return Err(TableError::schema(
                name,
                format!(
                    "column has {} values but the table has {} rows",
                    values.len(),
                    self.rows
                ),
            ));
        }

        match self.position(&name) {
            Some(idx) => self.columns[idx].values = values,
            None => self.columns.push(Column { name, values }),
        }
        Ok(())
    }

    pub fn remove_column(&mut self, name: &str) -> Option<Vec<Scalar>> {
        self.position(name).map(|idx| self.columns.remove(idx).values)
    }

    /// Rename columns by exact match. Names absent from the table are
    /// ignored. Fails, leaving the table untouched, if the result would
    /// hold two columns with the same name.
    pub fn rename_columns(&mut self, mapping: &HashMap<String, String>) -> TableResult<()> {
        let renamed: Vec<String> = self
            .columns
            .iter()
            .map(|c| mapping.get(&c.name).cloned().unwrap_or_else(|| c.name.clone()))
            .collect();
        self.set_column_names(renamed)
    }

    /// Replace every column name at once, in column order.
    pub(crate) fn set_column_names(&mut self, names: Vec<String>) -> TableResult<()> {
        if names.len() != self.columns.len() {
            return Err(TableError::schema(
                "<columns>",
                format!("expected {} names, got {}", self.columns.len(), names.len()),
            ));
        }
        let mut seen = HashSet::new();
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(TableError::schema(name, "duplicate column name after rename"));
            }
        }
        for (column, name) in self.columns.iter_mut().zip(names) {
            column.name = name;
        }
        Ok(())
    }

    /// Stable sort of all rows by one column. Nulls go last in both
    /// directions.
    pub fn sort_by(&mut self, column: &str, ascending: bool) -> TableResult<()> {
        let keys = self
            .get_column(column)
            .ok_or_else(|| TableError::schema(column, "sort column is missing"))?;

        let mut order: Vec<usize> = (0..self.rows).collect();
        order.sort_by(|&a, &b| {
            let (left, right) = (&keys[a], &keys[b]);
            match (left.is_null(), right.is_null()) {
                (false, false) if !ascending => right.compare(left),
                _ => left.compare(right),
            }
        });

        for col in self.columns.iter_mut() {
            col.values = order.iter().map(|&idx| col.values[idx].clone()).collect();
        }
        Ok(())
    }
}
