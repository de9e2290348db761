//! Local soil class from SPT blow counts.
//!
//! The boreholes are idealized, energy corrected, and each blow represents
//! the interval from the previous blow depth down to its own.

use log::debug;

use super::{summarize, top_30m_layers, SoilClass, SoilClassResult};
use crate::errors::{CalcError, CalcResult};
use crate::models::{Spt, SptExp, SptField};

/// Classify by N30: > 50 → ZC, ≥ 15 → ZD, otherwise ZE.
pub fn classify(n_30: f64) -> SoilClass {
    if n_30 > 50.0 {
        SoilClass::ZC
    } else if n_30 >= 15.0 {
        SoilClass::ZD
    } else {
        SoilClass::ZE
    }
}

pub fn validate_input(spt: &Spt) -> CalcResult<()> {
    spt.validate(&[SptField::N, SptField::Depth])
}

/// Idealize the boreholes and convert N to N60.
pub fn prepare_spt_exp(spt: &Spt) -> CalcResult<SptExp> {
    let ce = spt
        .energy_correction_factor
        .ok_or_else(|| CalcError::missing_field("spt.energy_correction_factor"))?;
    let mut exp = spt.get_idealized_exp("idealized");
    exp.apply_energy_correction(ce);
    Ok(exp)
}

pub fn calculate(spt: &Spt) -> CalcResult<SoilClassResult> {
    validate_input(spt)?;
    let exp = prepare_spt_exp(spt)?;

    let total_depth = exp
        .blows
        .last()
        .and_then(|b| b.depth)
        .ok_or_else(|| CalcError::calculation_failed("SoilClassBySpt", "idealized borehole has no blows"))?;

    let mut previous_depth = 0.0;
    let mut pairs = Vec::with_capacity(exp.blows.len());
    for blow in &exp.blows {
        let depth = blow.depth.unwrap_or(previous_depth);
        let n60 = blow.n60.map_or(0.0, |n| n.to_i32() as f64);
        pairs.push((depth - previous_depth, n60));
        previous_depth = depth;
    }

    let result = summarize(top_30m_layers(pairs), total_depth, classify);
    debug!(
        "SPT soil class: N30 = {:.2} over {} layers -> {}",
        result.value_30,
        result.layers.len(),
        result.soil_class
    );
    Ok(result)
}
