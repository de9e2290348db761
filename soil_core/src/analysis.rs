//! # Analysis Requests
//!
//! A single JSON-serializable entry point for every analysis in the crate.
//! Each request carries a user label and the input data it needs; [`run`]
//! dispatches to the matching `calculate` function.
//!
//! [`run`]: AnalysisRequest::run
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "type": "SoilClassByCu",
//!   "label": "BH-3 clay",
//!   "soil_profile": {
//!     "layers": [{ "thickness": 5.0, "cu": 10.0 }, { "thickness": 10.0, "cu": 15.0 }],
//!     "ground_water_level": 0.0
//!   }
//! }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use soil_core::analysis::{AnalysisOutput, AnalysisRequest};
//! use soil_core::local_soil_class::SoilClass;
//!
//! let json = r#"{
//!     "type": "SoilClassByCu",
//!     "label": "BH-3 clay",
//!     "soil_profile": {
//!         "layers": [{ "thickness": 5.0, "cu": 10.0 }, { "thickness": 10.0, "cu": 15.0 }],
//!         "ground_water_level": 0.0
//!     }
//! }"#;
//! let request: AnalysisRequest = serde_json::from_str(json).unwrap();
//! assert_eq!(request.analysis_type(), "SoilClassByCu");
//!
//! match request.run().unwrap() {
//!     AnalysisOutput::SoilClass(result) => assert_eq!(result.soil_class, SoilClass::ZD),
//!     other => panic!("unexpected output {:?}", other),
//! }
//! ```

use log::info;
use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::liquefaction::{andrus_stokoe, seed_idriss, LiquefactionParams, SptLiquefactionResult, VsLiquefactionResult};
use crate::local_soil_class::{by_cu, by_spt, by_vs, SoilClassResult};
use crate::models::{Masw, SoilProfile, Spt};

/// Local soil class from SPT boreholes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SptSoilClassInput {
    #[serde(default)]
    pub label: String,
    pub spt: Spt,
}

/// Local soil class from MASW soundings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VsSoilClassInput {
    #[serde(default)]
    pub label: String,
    pub masw: Masw,
}

/// Local soil class from the profile's undrained shear strength
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuSoilClassInput {
    #[serde(default)]
    pub label: String,
    pub soil_profile: SoilProfile,
}

/// Seed & Idriss liquefaction check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SptLiquefactionInput {
    #[serde(default)]
    pub label: String,
    pub soil_profile: SoilProfile,
    pub spt: Spt,
    #[serde(default)]
    pub earthquake: LiquefactionParams,
}

/// Andrus & Stokoe liquefaction check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VsLiquefactionInput {
    #[serde(default)]
    pub label: String,
    pub soil_profile: SoilProfile,
    pub masw: Masw,
    #[serde(default)]
    pub earthquake: LiquefactionParams,
}

/// Enum wrapper for all analysis types.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnalysisRequest {
    SoilClassBySpt(SptSoilClassInput),
    SoilClassByVs(VsSoilClassInput),
    SoilClassByCu(CuSoilClassInput),
    LiquefactionBySpt(SptLiquefactionInput),
    LiquefactionByVs(VsLiquefactionInput),
}

/// Result of an [`AnalysisRequest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AnalysisOutput {
    SoilClass(SoilClassResult),
    SptLiquefaction(SptLiquefactionResult),
    VsLiquefaction(VsLiquefactionResult),
}

impl AnalysisRequest {
    /// Get the user-provided label for this analysis
    pub fn label(&self) -> &str {
        match self {
            AnalysisRequest::SoilClassBySpt(i) => &i.label,
            AnalysisRequest::SoilClassByVs(i) => &i.label,
            AnalysisRequest::SoilClassByCu(i) => &i.label,
            AnalysisRequest::LiquefactionBySpt(i) => &i.label,
            AnalysisRequest::LiquefactionByVs(i) => &i.label,
        }
    }

    /// Get the analysis type as a string
    pub fn analysis_type(&self) -> &'static str {
        match self {
            AnalysisRequest::SoilClassBySpt(_) => "SoilClassBySpt",
            AnalysisRequest::SoilClassByVs(_) => "SoilClassByVs",
            AnalysisRequest::SoilClassByCu(_) => "SoilClassByCu",
            AnalysisRequest::LiquefactionBySpt(_) => "LiquefactionBySpt",
            AnalysisRequest::LiquefactionByVs(_) => "LiquefactionByVs",
        }
    }

    pub fn run(&self) -> CalcResult<AnalysisOutput> {
        info!("running {} '{}'", self.analysis_type(), self.label());
        let output = match self {
            AnalysisRequest::SoilClassBySpt(i) => AnalysisOutput::SoilClass(by_spt::calculate(&i.spt)?),
            AnalysisRequest::SoilClassByVs(i) => AnalysisOutput::SoilClass(by_vs::calculate(&i.masw)?),
            AnalysisRequest::SoilClassByCu(i) => AnalysisOutput::SoilClass(by_cu::calculate(&i.soil_profile)?),
            AnalysisRequest::LiquefactionBySpt(i) => {
                AnalysisOutput::SptLiquefaction(seed_idriss::calculate(&i.soil_profile, &i.spt, i.earthquake)?)
            }
            AnalysisRequest::LiquefactionByVs(i) => {
                AnalysisOutput::VsLiquefaction(andrus_stokoe::calculate(&i.soil_profile, &i.masw, i.earthquake)?)
            }
        };
        Ok(output)
    }
}

impl AnalysisOutput {
    /// One-line human summary
    pub fn summary(&self) -> String {
        match self {
            AnalysisOutput::SoilClass(r) => format!(
                "soil class {} ({}), averaged value {:.2} over {} layers",
                r.soil_class,
                r.soil_class.description(),
                r.value_30,
                r.layers.len()
            ),
            AnalysisOutput::SptLiquefaction(r) => liquefaction_summary(
                r.layers.iter().filter(|l| !l.is_safe).count(),
                r.layers.len(),
                r.total_settlement,
                r.msf,
            ),
            AnalysisOutput::VsLiquefaction(r) => liquefaction_summary(
                r.layers.iter().filter(|l| !l.is_safe).count(),
                r.layers.len(),
                r.total_settlement,
                r.msf,
            ),
        }
    }
}

fn liquefaction_summary(unsafe_count: usize, total: usize, settlement: f64, msf: f64) -> String {
    format!(
        "{} of {} depths liquefiable, total settlement {:.2} cm (MSF {:.3})",
        unsafe_count, total, settlement, msf
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_round_trip_keeps_tag() {
        let json = r#"{ "type": "SoilClassByVs", "label": "M-1", "masw": { "exps": [] } }"#;
        let request: AnalysisRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.label(), "M-1");
        assert_eq!(request.analysis_type(), "SoilClassByVs");

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["type"], "SoilClassByVs");
    }

    #[test]
    fn test_earthquake_defaults() {
        let json = r#"{
            "type": "LiquefactionBySpt",
            "soil_profile": { "layers": [] },
            "spt": { "exps": [] }
        }"#;
        let request: AnalysisRequest = serde_json::from_str(json).unwrap();
        match request {
            AnalysisRequest::LiquefactionBySpt(input) => {
                assert_eq!(input.earthquake, LiquefactionParams::default());
                assert_eq!(input.label, "");
            }
            other => panic!("unexpected request {:?}", other),
        }
    }

    #[test]
    fn test_run_propagates_validation_errors() {
        let json = r#"{ "type": "SoilClassBySpt", "label": "empty", "spt": {} }"#;
        let request: AnalysisRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.run().unwrap_err().error_code(), "EMPTY_COLLECTION");
    }

    #[test]
    fn test_unknown_type_rejected() {
        let json = r#"{ "type": "BearingCapacity", "label": "x" }"#;
        assert!(serde_json::from_str::<AnalysisRequest>(json).is_err());
    }
}
