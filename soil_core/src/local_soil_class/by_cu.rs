//! Local soil class from undrained shear strength of the soil profile.

use log::debug;

use super::{summarize, top_30m_layers, SoilClass, SoilClassResult};
use crate::errors::{CalcError, CalcResult};
use crate::models::{SoilLayerField, SoilProfile};

/// Classify by cu30 (t/m²): > 25 → ZC, ≥ 7 → ZD, otherwise ZE.
pub fn classify(cu_30: f64) -> SoilClass {
    if cu_30 > 25.0 {
        SoilClass::ZC
    } else if cu_30 >= 7.0 {
        SoilClass::ZD
    } else {
        SoilClass::ZE
    }
}

pub fn validate_input(soil_profile: &SoilProfile) -> CalcResult<()> {
    soil_profile.validate(&[SoilLayerField::Thickness, SoilLayerField::Cu])
}

pub fn calculate(soil_profile: &SoilProfile) -> CalcResult<SoilClassResult> {
    validate_input(soil_profile)?;

    let mut profile = soil_profile.clone();
    profile.calc_layer_depths()?;
    let total_depth = profile
        .total_depth()
        .ok_or_else(|| CalcError::calculation_failed("SoilClassByCu", "soil profile has no layers"))?;

    let pairs = profile
        .layers()
        .iter()
        .filter_map(|l| Some((l.thickness?, l.cu.unwrap_or(0.0))));

    let result = summarize(top_30m_layers(pairs), total_depth, classify);
    debug!(
        "cu soil class: cu30 = {:.2} t/m² over {} layers -> {}",
        result.value_30,
        result.layers.len(),
        result.soil_class
    );
    Ok(result)
}
