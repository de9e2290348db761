//! # Andrus & Stokoe (Vs)
//!
//! Liquefaction resistance from overburden-corrected shear wave velocity.
//! Each soil layer is checked at its bottom depth using the idealized MASW
//! velocity found there.
//!
//! ```text
//! Vs1    = Vs·Cn
//! CRR7.5 = (0.03(Vs1/100)² + 0.09/(Vs1c − Vs1) − 0.09/Vs1c)·σ'
//! ```
//!
//! Vs1c is the limiting upper velocity for liquefaction, from fine content.

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    calc_cn, calc_csr, calc_msf, calc_rd, calc_settlement_from_table, total_settlement, LiquefactionLayerResult,
    LiquefactionParams, ScreeningReason, PLASTICITY_INDEX_LIMIT, SAFETY_FACTOR_LIMIT,
};
use crate::errors::{CalcError, CalcResult};
use crate::models::{Masw, MaswField, SoilLayerField, SoilProfile};

const CALCULATION_TYPE: &str = "LiquefactionByVs";

/// Relative density (%) → Q table for the settlement curve
const DR_TABLE: [f64; 7] = [30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0];
const Q_TABLE: [f64; 7] = [33.0, 45.0, 60.0, 80.0, 110.0, 147.0, 200.0];

/// Velocity terms at one soil layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VsLayerResult {
    /// Idealized shear wave velocity (m/s)
    pub vs: f64,
    /// Overburden-corrected velocity (m/s)
    pub vs1: f64,
    /// Limiting velocity (m/s)
    pub vs1c: f64,
    pub cn: f64,
}

/// Result of an Andrus & Stokoe analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VsLiquefactionResult {
    /// One entry per soil layer
    pub layers: Vec<LiquefactionLayerResult>,
    /// Velocity terms, parallel to `layers`
    pub vs_layers: Vec<VsLayerResult>,
    /// Sum of layer settlements (cm)
    pub total_settlement: f64,
    /// Magnitude scaling factor
    pub msf: f64,
}

pub fn validate_input(masw: &Masw, soil_profile: &SoilProfile) -> CalcResult<()> {
    masw.validate(&[MaswField::Thickness, MaswField::Vs])?;
    soil_profile.validate(&[
        SoilLayerField::Thickness,
        SoilLayerField::DryUnitWeight,
        SoilLayerField::SaturatedUnitWeight,
        SoilLayerField::PlasticityIndex,
        SoilLayerField::FineContent,
    ])
}

/// Limiting upper Vs1 (m/s) from fine content (%)
pub fn calc_vs1c(fine_content: f64) -> f64 {
    if fine_content <= 5.0 {
        215.0
    } else if fine_content <= 35.0 {
        215.0 - 0.5 * (fine_content - 5.0)
    } else {
        200.0
    }
}

pub fn calc_crr75(vs1: f64, vs1c: f64, effective_stress: f64) -> f64 {
    (0.03 * (vs1 / 100.0).powi(2) + 0.09 / (vs1c - vs1) - 0.09 / vs1c) * effective_stress
}

/// Settlement (cm) of a liquefied layer from FS, thickness (m) and Vs1.
pub fn calc_settlement(safety_factor: f64, thickness: f64, vs1: f64) -> CalcResult<f64> {
    let relative_density = 17.974 * (vs1 / 100.0).powf(1.976);
    calc_settlement_from_table(safety_factor, thickness, &DR_TABLE, &Q_TABLE, relative_density)
}

pub fn calculate(
    soil_profile: &SoilProfile,
    masw: &Masw,
    params: LiquefactionParams,
) -> CalcResult<VsLiquefactionResult> {
    validate_input(masw, soil_profile)?;
    params.validate()?;

    let mut profile = soil_profile.clone();
    profile.calc_layer_depths()?;
    let gwt = profile
        .ground_water_level
        .ok_or_else(|| CalcError::missing_field("soil_profile.ground_water_level"))?;

    let masw_exp = masw.get_idealized_exp("idealized")?;
    let msf = calc_msf(params.mw);
    let mut layers = Vec::with_capacity(profile.layers().len());
    let mut vs_layers = Vec::with_capacity(profile.layers().len());

    for soil_layer in profile.layers() {
        let (Some(depth), Some(thickness)) = (soil_layer.depth(), soil_layer.thickness) else {
            continue;
        };
        let rd = calc_rd(depth);
        let normal_stress = profile.calc_normal_stress(depth)?;
        let effective_stress = profile.calc_effective_stress(depth)?;
        let plasticity_index = soil_layer.plasticity_index.unwrap_or(0.0);

        let vs = masw_exp.get_layer_at_depth(depth).vs.ok_or_else(|| {
            CalcError::calculation_failed(CALCULATION_TYPE, format!("no shear wave velocity at {} m", depth))
        })?;
        let cn = calc_cn(effective_stress);
        let vs1 = vs * cn;
        let vs1c = calc_vs1c(soil_layer.fine_content.unwrap_or(0.0));
        vs_layers.push(VsLayerResult { vs, vs1, vs1c, cn });

        let screening = if gwt >= depth {
            Some(ScreeningReason::AboveWaterTable)
        } else if plasticity_index >= PLASTICITY_INDEX_LIMIT {
            Some(ScreeningReason::Plastic)
        } else if vs1 >= vs1c {
            Some(ScreeningReason::VelocityAboveCritical)
        } else {
            None
        };

        if let Some(reason) = screening {
            debug!("layer at {:.2} m screened out: {:?}", depth, reason);
            layers.push(LiquefactionLayerResult::screened(
                soil_layer,
                depth,
                thickness,
                (normal_stress, effective_stress),
                rd,
                reason,
            ));
            continue;
        }

        let csr = calc_csr(params.pga, normal_stress, rd);
        let crr75 = calc_crr75(vs1, vs1c, effective_stress);
        let crr = msf * crr75;
        let safety_factor = crr / csr;
        let settlement = calc_settlement(safety_factor, thickness, vs1)?;
        debug!(
            "layer at {:.2} m: Vs1 {:.1} m/s CSR {:.3} CRR {:.3} FS {:.3} s {:.2} cm",
            depth, vs1, csr, crr, safety_factor, settlement
        );

        layers.push(LiquefactionLayerResult {
            soil_layer: soil_layer.clone(),
            depth,
            thickness,
            normal_stress,
            effective_stress,
            rd,
            crr: Some(crr),
            crr75: Some(crr75),
            csr: Some(csr),
            safety_factor: Some(safety_factor),
            is_safe: safety_factor > SAFETY_FACTOR_LIMIT,
            settlement,
            screened: None,
        });
    }

    Ok(VsLiquefactionResult {
        total_settlement: total_settlement(&layers),
        layers,
        vs_layers,
        msf,
    })
}
