//! Tabular value: ordered, equal-length named columns of scalar cells.
//!
//! - [`Scalar`] - A single cell (integer, float, text, date, boolean or null)
//! - [`ColumnKind`] - Type family of a column, ignoring nulls
//! - [`Table`] - The rectangular dataset every pipeline step operates on

pub mod frame;
pub mod scalar;

pub use frame::Table;
pub use scalar::{parse_date, ColumnKind, Scalar, DEFAULT_DATE_FORMATS};
