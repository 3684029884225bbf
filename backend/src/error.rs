//! Error types for the fuel price pipeline.
//!
//! - [`TableError`] - Tabular value and transformation errors (the core)
//! - [`ParseError`] - Record loading errors (CSV / JSON input)
//! - [`ConfigError`] - Options file errors
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use thiserror::Error;

// =============================================================================
// Table Errors
// =============================================================================

/// Errors raised by [`crate::table::Table`] and the transformation steps.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    /// Records cannot be reconciled into a rectangular table, or a column
    /// required by an operation is absent.
    #[error("Schema error on column '{column}': {message}")]
    Schema { column: String, message: String },

    /// A value required to be numeric or date-typed failed to parse.
    #[error("Data format error on column '{column}', row {row} (value '{value}'): {message}")]
    DataFormat {
        column: String,
        row: usize,
        value: String,
        message: String,
    },

    /// A baseline operation was asked to run on a zero-row table.
    #[error("Cannot run '{operation}' on an empty table")]
    EmptyInput { operation: String },
}

impl TableError {
    pub fn schema(column: impl Into<String>, message: impl Into<String>) -> Self {
        TableError::Schema {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn data_format(
        column: impl Into<String>,
        row: usize,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        TableError::DataFormat {
            column: column.into(),
            row,
            value: value.into(),
            message: message.into(),
        }
    }

    pub fn empty_input(operation: impl Into<String>) -> Self {
        TableError::EmptyInput {
            operation: operation.into(),
        }
    }
}

// =============================================================================
// Record Loading Errors
// =============================================================================

/// Errors while turning raw bytes into records.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to decode content.
    #[error("Failed to decode content: {0}")]
    EncodingError(String),

    /// Invalid CSV content.
    #[error("Invalid CSV at line {line}: {message}")]
    Csv { line: usize, message: String },

    /// Invalid JSON content.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// JSON payload is not a list of records.
    #[error("Expected a JSON array of records, found {0}")]
    NotRecords(String),

    /// Empty input.
    #[error("Input is empty")]
    EmptyFile,
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading options files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read options file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid options file '{path}': {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid option '{field}': {message}")]
    Invalid { field: String, message: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level orchestration errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run_file`].
/// It wraps all lower-level errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Record loading error.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Table or transformation error.
    #[error("Transform error: {0}")]
    Table(#[from] TableError),

    /// Options error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Writing output failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;

/// Result type for record loading.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type for options loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
