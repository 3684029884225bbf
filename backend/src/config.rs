//! Options for the fuel transform and the file pipeline.
//!
//! Both structs deserialize from JSON with every field optional, so an
//! options file only needs the keys it overrides:
//!
//! ```json
//! {
//!   "fuel": { "rolling_window": 8 },
//!   "clean": [{ "type": "fill_missing_numeric" }]
//! }
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::table::DEFAULT_DATE_FORMATS;
use crate::transform::ops::CleanOp;

/// Fuels carried by the weekly price series, in output column order.
pub const FUEL_TYPES: [&str; 3] = ["ron95", "ron97", "diesel"];

/// Column holding the observation date after renaming.
pub const PRICE_DATE: &str = "price_date";

/// Settings for [`crate::transform::transform_fuel_data_with`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuelTransformOptions {
    /// Exact-match source → target column renames.
    pub rename: HashMap<String, String>,

    /// Date column (after renaming) that defines chronological order.
    pub date_column: String,

    /// Fuel prefixes; each expects a `<fuel>_price` column after renaming.
    pub fuels: Vec<String>,

    /// Number of observations in the rolling average window.
    pub rolling_window: usize,

    /// Formats accepted when parsing the date column.
    pub date_formats: Vec<String>,
}

impl Default for FuelTransformOptions {
    fn default() -> Self {
        let mut rename: HashMap<String, String> = FUEL_TYPES
            .iter()
            .map(|fuel| (fuel.to_string(), format!("{}_price", fuel)))
            .collect();
        rename.insert("date".to_string(), PRICE_DATE.to_string());

        Self {
            rename,
            date_column: PRICE_DATE.to_string(),
            fuels: FUEL_TYPES.iter().map(|f| f.to_string()).collect(),
            rolling_window: 4,
            date_formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl FuelTransformOptions {
    /// Load and validate options from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let options: Self = load_json(path.as_ref())?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.rolling_window == 0 {
            return Err(ConfigError::Invalid {
                field: "rolling_window".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.date_column.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "date_column".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn price_column(&self, fuel: &str) -> String {
        format!("{}_price", fuel)
    }

    pub fn rolling_column(&self, fuel: &str) -> String {
        format!("{}_{}wk_avg", fuel, self.rolling_window)
    }
}

/// Settings for [`crate::transform::pipeline::run_file`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Fuel transform settings.
    pub fuel: FuelTransformOptions,

    /// Skip the fuel transform and only run the cleaning chain.
    pub skip_fuel_transform: bool,

    /// Cleaning operations applied, in order, after the fuel transform.
    pub clean: Vec<CleanOp>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            fuel: FuelTransformOptions::default(),
            skip_fuel_transform: false,
            clean: Vec::new(),
        }
    }
}

impl PipelineOptions {
    /// Load and validate options from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let options: Self = load_json(path.as_ref())?;
        options.fuel.validate()?;
        Ok(options)
    }
}

/// Read a JSON file into any deserializable type.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> ConfigResult<T> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&content).map_err(|source| ConfigError::Json {
        path: display,
        source,
    })
}
