//! Transformation module.
//!
//! - Fuel: the fixed weekly fuel price transform
//! - Series: null-propagating numeric helpers behind the derived columns
//! - Clean: reusable cleaning primitives
//! - Ops: cleaning primitives as serializable operations
//! - Pipeline: load, transform and clean in one call

pub mod clean;
pub mod fuel;
pub mod ops;
pub mod pipeline;
pub mod series;

pub use clean::{
    canonicalize_column_names, convert_datetime, convert_datetime_with_formats,
    fill_missing_categorical, fill_missing_numeric, standardize_text, trim_spaces,
};
pub use fuel::{transform_fuel_data, transform_fuel_data_with, FuelStep, FUEL_STEPS};
pub use ops::{apply_all, operations_description, CleanOp};
pub use pipeline::*;
