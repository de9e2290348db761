//! # Field Validation
//!
//! Per-field range checks for soil and test records. Each record type has a
//! field enum; every variant maps to a [`Bounds`] entry, and the [`Validate`]
//! trait resolves a variant to the record's value. Analyses list the fields
//! they need up front:
//!
//! ```rust
//! use soil_core::models::{SoilLayer, SoilLayerField};
//! use soil_core::validation::Validate;
//!
//! let mut layer = SoilLayer::new(2.0);
//! layer.cu = Some(4.5);
//!
//! assert!(layer.validate_fields(&[SoilLayerField::Thickness, SoilLayerField::Cu]).is_ok());
//! assert!(layer.validate_fields(&[SoilLayerField::PhiPrime]).is_err());
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Inclusive range for a numeric field. `None` leaves that side open.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    /// Lower bound only
    pub const fn at_least(min: f64) -> Self {
        Bounds {
            min: Some(min),
            max: None,
        }
    }

    /// Closed interval [min, max]
    pub const fn between(min: f64, max: f64) -> Self {
        Bounds {
            min: Some(min),
            max: Some(max),
        }
    }

    /// Check an optional value against these bounds.
    ///
    /// Returns the value when present and in range.
    pub fn check(&self, field: &str, value: Option<f64>) -> CalcResult<f64> {
        let value = value.ok_or_else(|| CalcError::missing_field(field))?;

        let below = self.min.is_some_and(|min| value < min);
        let above = self.max.is_some_and(|max| value > max);
        if below || above || value.is_nan() {
            return Err(CalcError::out_of_range(field, value, self.min, self.max));
        }
        Ok(value)
    }
}

/// A named, bounded field of some record type.
pub trait FieldSpec: Copy {
    /// Container prefix used in error field names (e.g. "soil_profile")
    const SCOPE: &'static str;

    /// Field name as it appears in JSON
    fn name(&self) -> &'static str;

    /// Allowed range
    fn bounds(&self) -> Bounds;

    /// Scope-qualified name, e.g. "spt.n60"
    fn qualified_name(&self) -> String {
        format!("{}.{}", Self::SCOPE, self.name())
    }
}

/// Records whose fields can be checked against their [`FieldSpec`] table.
pub trait Validate {
    type Field: FieldSpec;

    /// Current value of a field, `None` when unset
    fn field_value(&self, field: Self::Field) -> Option<f64>;

    /// Validate the listed fields, stopping at the first failure.
    fn validate_fields(&self, fields: &[Self::Field]) -> CalcResult<()> {
        for &field in fields {
            field
                .bounds()
                .check(&field.qualified_name(), self.field_value(field))?;
        }
        Ok(())
    }
}

/// Validate a standalone scalar (collection-level settings like the
/// ground water level or SPT correction factors).
pub fn validate_scalar(field: &str, value: Option<f64>, bounds: Bounds) -> CalcResult<f64> {
    bounds.check(field, value)
}
