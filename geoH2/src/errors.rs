//! Error types for the costing engine.
//!
//! Three families, matching how a run reacts to them:
//! - [`InputError`]: a file, column or parameter row is missing or unreadable. Fatal for
//!   the scope it belongs to (a whole run when a parameter file is missing, a single
//!   site or demand center when only its row is).
//! - [`ValidationError`]: an input value is present but not usable (negative distance,
//!   non-positive lifetime or demand, ...). The affected record is skipped.
//! - [`EngineError`]: anything the engine itself can raise, including illegal
//!   cost record state transitions.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fallible input handling
pub type InputResult<T> = Result<T, InputError>;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Required file not found: {}", .path.display())]
    MissingFile { path: PathBuf },

    #[error("IO error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {table}: {source}")]
    Csv {
        table: String,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error in '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Table '{table}' is missing required column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("Table '{table}' has no entry for '{key}'")]
    MissingParameter { table: String, key: String },

    #[error("Table '{table}': value '{value}' for '{key}' is not a number")]
    InvalidNumber {
        table: String,
        key: String,
        value: String,
    },

    #[error("Table '{table}' lists '{key}' more than once")]
    DuplicateKey { table: String, key: String },

    #[error("Unknown {kind} '{value}'")]
    UnknownName { kind: &'static str, value: String },

    #[error("'{}': feature {index} has no site_id while others do; give every feature an id or none", .path.display())]
    MixedSiteIds { path: PathBuf, index: usize },

    #[error("Invalid geometry for site {site}: {reason}")]
    InvalidGeometry { site: String, reason: String },
}

impl InputError {
    pub fn missing_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        InputError::MissingColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    pub fn missing_parameter(table: impl Into<String>, key: impl Into<String>) -> Self {
        InputError::MissingParameter {
            table: table.into(),
            key: key.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            InputError::MissingFile { path }
        } else {
            InputError::Io { path, source }
        }
    }

    pub fn csv(table: impl Into<String>, source: csv::Error) -> Self {
        InputError::Csv {
            table: table.into(),
            source,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Distance '{field}' is missing")]
    MissingDistance { field: String },

    #[error("Distance '{field}' is negative or not finite: {value}")]
    InvalidDistance { field: String, value: f64 },

    #[error("Lifetime of {asset} must be positive, got {value}")]
    NonPositiveLifetime { asset: String, value: f64 },

    #[error("Interest rate of {asset} must not be negative, got {value}")]
    NegativeInterestRate { asset: String, value: f64 },

    #[error("Annual demand of '{demand_center}' must be positive, got {value}")]
    NonPositiveDemand { demand_center: String, value: f64 },

    #[error("Capacity of {component} must be a non-negative number, got {value}")]
    InvalidCapacity { component: String, value: f64 },

    #[error("Unit cost '{parameter}' must be a non-negative number, got {value}")]
    InvalidUnitCost { parameter: String, value: f64 },

    #[error("Computed {quantity} is not finite")]
    NonFinite { quantity: String },
}

impl ValidationError {
    /// Short code used to group skip reasons in run reports
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingDistance { .. } => "MISSING_DISTANCE",
            ValidationError::InvalidDistance { .. } => "INVALID_DISTANCE",
            ValidationError::NonPositiveLifetime { .. } => "NON_POSITIVE_LIFETIME",
            ValidationError::NegativeInterestRate { .. } => "NEGATIVE_INTEREST_RATE",
            ValidationError::NonPositiveDemand { .. } => "NON_POSITIVE_DEMAND",
            ValidationError::InvalidCapacity { .. } => "INVALID_CAPACITY",
            ValidationError::InvalidUnitCost { .. } => "INVALID_UNIT_COST",
            ValidationError::NonFinite { .. } => "NON_FINITE",
        }
    }
}

/// Guard a computed quantity before it is stored as a cost.
pub fn ensure_finite(quantity: &str, value: f64) -> Result<f64, ValidationError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NonFinite {
            quantity: quantity.to_string(),
        })
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Cost record {key} is already {state}; it cannot change again")]
    InvalidTransition { key: String, state: &'static str },
}
