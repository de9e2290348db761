//! Local soil class from MASW shear wave velocities.

use log::debug;

use super::{summarize, top_30m_layers, SoilClass, SoilClassResult};
use crate::errors::{CalcError, CalcResult};
use crate::models::{Masw, MaswField};

/// Classify by Vs30 (m/s): > 1500 → ZA, ≥ 760 → ZB, ≥ 360 → ZC, ≥ 180 → ZD,
/// otherwise ZE.
pub fn classify(vs_30: f64) -> SoilClass {
    if vs_30 > 1500.0 {
        SoilClass::ZA
    } else if vs_30 >= 760.0 {
        SoilClass::ZB
    } else if vs_30 >= 360.0 {
        SoilClass::ZC
    } else if vs_30 >= 180.0 {
        SoilClass::ZD
    } else {
        SoilClass::ZE
    }
}

pub fn validate_input(masw: &Masw) -> CalcResult<()> {
    masw.validate(&[MaswField::Thickness, MaswField::Vs])
}

pub fn calculate(masw: &Masw) -> CalcResult<SoilClassResult> {
    validate_input(masw)?;
    let exp = masw.get_idealized_exp("idealized")?;

    let total_depth = exp
        .layers()
        .last()
        .and_then(|l| l.depth())
        .ok_or_else(|| CalcError::calculation_failed("SoilClassByVs", "idealized MASW profile has no layers"))?;

    let pairs = exp
        .layers()
        .iter()
        .filter_map(|l| Some((l.thickness?, l.vs?)));

    let result = summarize(top_30m_layers(pairs), total_depth, classify);
    debug!(
        "Vs soil class: Vs30 = {:.1} m/s over {} layers -> {}",
        result.value_30,
        result.layers.len(),
        result.soil_class
    );
    Ok(result)
}
