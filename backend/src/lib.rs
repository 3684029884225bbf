//! # Fuelprice - weekly fuel price normalization and enrichment
//!
//! Fuelprice turns raw weekly retail fuel price tables (RON95, RON97,
//! diesel) into a chronologically ordered table with trend columns, and
//! ships a set of reusable cleaning operations for tabular data.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ CSV / JSON  │────▶│   Parser    │────▶│    Fuel     │────▶│    Clean    │
//! │  (ISO/UTF8) │     │  (auto-enc) │     │  transform  │     │  (CleanOp)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fuelprice::{transform_fuel_data, Table};
//! use serde_json::json;
//!
//! let raw = Table::from_records(&[
//!     json!({"date": "2024-01-08", "ron95": 2.05}),
//!     json!({"date": "2024-01-01", "ron95": 2.00}),
//! ])?;
//! let weekly = transform_fuel_data(&raw)?;
//! assert_eq!(weekly.column_names()[0], "price_date");
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`table`] - Column-oriented table and cell values
//! - [`parser`] - CSV/JSON loading with auto-detection
//! - [`transform`] - Fuel transform, cleaning operations, pipeline
//! - [`config`] - JSON options files
//! - [`logs`] - Progress log broadcaster

// Core modules
pub mod error;
pub mod table;

// Loading
pub mod parser;

// Transformation
pub mod config;
pub mod transform;

// Logging
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, ConfigResult, ParseError, ParseResult, PipelineError, PipelineResult,
    TableError, TableResult,
};

// =============================================================================
// Re-exports - Table
// =============================================================================

pub use table::{parse_date, ColumnKind, Scalar, Table, DEFAULT_DATE_FORMATS};

// =============================================================================
// Re-exports - Parsing
// =============================================================================

pub use parser::{
    csv_to_records, decode_content, detect_delimiter, detect_encoding, json_to_records,
    parse_bytes_auto, parse_file_auto, table_to_csv, InputFormat, ParsedInput,
};

// =============================================================================
// Re-exports - Transform
// =============================================================================

pub use transform::{
    canonicalize_column_names, convert_datetime, convert_datetime_with_formats,
    fill_missing_categorical, fill_missing_numeric, standardize_text, transform_fuel_data,
    transform_fuel_data_with, trim_spaces, FuelStep, FUEL_STEPS,
};

pub use transform::ops::{apply_all, operations_description, CleanOp};

// =============================================================================
// Re-exports - Config
// =============================================================================

pub use config::{FuelTransformOptions, PipelineOptions, FUEL_TYPES, PRICE_DATE};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{run_bytes, run_file, run_records, InputInfo, PipelineOutput};
