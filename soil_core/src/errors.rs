//! # Error Types
//!
//! Structured error types for soil_core. Every failure aborts the current
//! calculation and carries a stable code plus enough context (the qualified
//! field name, the offending value) to be mapped to a user-facing message.
//!
//! ## Example
//!
//! ```rust
//! use soil_core::errors::{CalcError, CalcResult};
//!
//! fn check_thickness(thickness: f64) -> CalcResult<()> {
//!     if thickness <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "masw.thickness",
//!             thickness.to_string(),
//!             "Thickness must be greater than zero",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(check_thickness(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for soil_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for geotechnical calculations.
///
/// Field names are qualified with the container they belong to
/// (`soil_profile.thickness`, `spt.n60`, ...), so `error_code()` plus the
/// field pin down the problem without parsing the message.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A field is present but outside its allowed range
    #[error("Value out of range for '{field}': {value} (min: {min:?}, max: {max:?})")]
    OutOfRange {
        field: String,
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    },

    /// An input value is malformed or physically implausible
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A collection that must hold at least one element is empty
    #[error("Empty collection: {collection}")]
    EmptyCollection { collection: String },

    /// Derived depths were read before being (re)calculated
    #[error("Depths not calculated for {container}; call calc_layer_depths first")]
    DepthsNotCalculated { container: String },

    /// Calculation could not produce a result
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },
}

impl CalcError {
    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create an OutOfRange error
    pub fn out_of_range(field: impl Into<String>, value: f64, min: Option<f64>, max: Option<f64>) -> Self {
        CalcError::OutOfRange {
            field: field.into(),
            value,
            min,
            max,
        }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an EmptyCollection error
    pub fn empty_collection(collection: impl Into<String>) -> Self {
        CalcError::EmptyCollection {
            collection: collection.into(),
        }
    }

    /// Create a DepthsNotCalculated error
    pub fn depths_not_calculated(container: impl Into<String>) -> Self {
        CalcError::DepthsNotCalculated {
            container: container.into(),
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculation_type: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// The qualified field this error refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            CalcError::MissingField { field }
            | CalcError::OutOfRange { field, .. }
            | CalcError::InvalidInput { field, .. } => Some(field),
            _ => None,
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::OutOfRange { .. } => "OUT_OF_RANGE",
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::EmptyCollection { .. } => "EMPTY_COLLECTION",
            CalcError::DepthsNotCalculated { .. } => "DEPTHS_NOT_CALCULATED",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
        }
    }
}
