//! # soil_core - Geotechnical Calculation Engine
//!
//! `soil_core` is the computational heart of Substrata: soil profiles and
//! their stresses, field test data (SPT, CPT, MASW, point-load), the
//! idealization of several boreholes into one design profile, and the
//! analyses built on top of them. All inputs and outputs are
//! JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Pure functions that take input and return results
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//!
//! Units are fixed: depths and thicknesses in m, unit weights in t/m³,
//! stresses in t/m².
//!
//! ## Quick Start
//!
//! ```rust
//! use soil_core::models::{SoilLayer, SoilProfile};
//!
//! let mut sand = SoilLayer::new(5.0);
//! sand.dry_unit_weight = Some(1.8);
//! sand.saturated_unit_weight = Some(2.0);
//!
//! let profile = SoilProfile::new(vec![sand], 2.0).unwrap();
//! let sigma = profile.calc_normal_stress(4.0).unwrap();
//! assert!((sigma - 7.6).abs() < 1e-9);
//! ```
//!
//! ## Modules
//!
//! - [`models`] - Soil profile and field test records
//! - [`idealization`] - Combining experiments depth by depth
//! - [`local_soil_class`] - Site class from the top 30 m
//! - [`liquefaction`] - SPT and Vs based liquefaction checks
//! - [`analysis`] - Tagged request/response wrapper over all analyses
//! - [`validation`] - Field bounds and the `Validate` trait
//! - [`errors`] - Structured error types

pub mod analysis;
pub mod errors;
pub mod idealization;
pub mod interpolation;
pub mod liquefaction;
pub mod local_soil_class;
pub mod models;
pub mod validation;

// Re-export commonly used types at crate root for convenience
pub use analysis::{AnalysisOutput, AnalysisRequest};
pub use errors::{CalcError, CalcResult};
pub use idealization::SelectionMethod;
pub use models::{NValue, SoilLayer, SoilProfile};
