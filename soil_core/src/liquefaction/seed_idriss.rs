//! # Seed & Idriss (SPT)
//!
//! Liquefaction resistance from fines-corrected, normalized blow counts.
//! The boreholes are idealized into one, corrected against the soil
//! profile, and every blow is checked over the interval from the previous
//! blow depth down to its own.
//!
//! ```text
//! CRR7.5 = (1/(34 − N) + N/135 + 50/(10N + 45)² − 1/200)·σ'    N = N1,60f
//! ```
//!
//! Blows above the water table, in plastic layers (PI ≥ 12) or in dense
//! sand (N1,60 ≥ 30 or N1,60f ≥ 34) are screened out.
//!
//! ## Example
//!
//! ```rust
//! use soil_core::idealization::SelectionMethod;
//! use soil_core::liquefaction::{seed_idriss, LiquefactionParams};
//! use soil_core::models::{NValue, SoilLayer, SoilProfile, Spt, SptExp};
//!
//! let mut sand = SoilLayer::new(10.0);
//! sand.dry_unit_weight = Some(1.8);
//! sand.saturated_unit_weight = Some(1.9);
//! sand.plasticity_index = Some(0.0);
//! sand.fine_content = Some(5.0);
//! let profile = SoilProfile::new(vec![sand], 2.0).unwrap();
//!
//! let mut bh = SptExp::new(vec![], "BH-1");
//! bh.add_blow(3.0, NValue::Finite(8));
//! let mut spt = Spt::new(1.0, 1.0, 1.0, SelectionMethod::Avg);
//! spt.add_exp(bh);
//!
//! let result = seed_idriss::calculate(&profile, &spt, LiquefactionParams::default()).unwrap();
//! assert!(!result.layers[0].is_safe);
//! ```

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    calc_csr, calc_msf, calc_rd, calc_settlement_from_table, total_settlement, LiquefactionLayerResult,
    LiquefactionParams, ScreeningReason, PLASTICITY_INDEX_LIMIT, SAFETY_FACTOR_LIMIT,
};
use crate::errors::{CalcError, CalcResult};
use crate::models::{NValue, SoilLayerField, SoilProfile, Spt, SptBlow, SptExp, SptField};

const CALCULATION_TYPE: &str = "LiquefactionBySpt";

/// N90 → Q table for the settlement curve
const N90_TABLE: [f64; 6] = [3.0, 6.0, 10.0, 14.0, 25.0, 30.0];
const Q_TABLE: [f64; 6] = [33.0, 45.0, 60.0, 80.0, 147.0, 200.0];

/// Result of a Seed & Idriss analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SptLiquefactionResult {
    /// One entry per idealized blow
    pub layers: Vec<LiquefactionLayerResult>,
    /// The idealized, corrected borehole the checks ran on
    pub spt_exp: SptExp,
    /// Sum of layer settlements (cm)
    pub total_settlement: f64,
    /// Magnitude scaling factor
    pub msf: f64,
}

pub fn validate_input(soil_profile: &SoilProfile, spt: &Spt) -> CalcResult<()> {
    spt.validate(&[SptField::N, SptField::Depth])?;
    soil_profile.validate(&[
        SoilLayerField::Thickness,
        SoilLayerField::DryUnitWeight,
        SoilLayerField::SaturatedUnitWeight,
        SoilLayerField::PlasticityIndex,
        SoilLayerField::FineContent,
    ])
}

/// Idealize the boreholes, run the correction chain and set blow thicknesses.
pub fn prepare_spt_exp(spt: &Spt, soil_profile: &SoilProfile) -> CalcResult<SptExp> {
    let (cs, cb, ce) = spt.correction_factors()?;
    let mut exp = spt.get_idealized_exp("idealized");
    exp.apply_corrections(soil_profile, cs, cb, ce)?;
    exp.calc_thicknesses();
    Ok(exp)
}

/// Cyclic resistance ratio for M7.5 from N1,60f and σ' (t/m²)
pub fn calc_crr75(n1_60f: i32, effective_stress: f64) -> f64 {
    let n = n1_60f as f64;
    (1.0 / (34.0 - n) + n / 135.0 + 50.0 / (10.0 * n + 45.0).powi(2) - 1.0 / 200.0) * effective_stress
}

/// Settlement (cm) of a liquefied layer from FS, thickness (m) and N60.
pub fn calc_settlement(safety_factor: f64, thickness: f64, n60: i32) -> CalcResult<f64> {
    let n90 = (n60 as f64 * 6.0 / 9.0).clamp(3.0, 30.0);
    calc_settlement_from_table(safety_factor, thickness, &N90_TABLE, &Q_TABLE, n90)
}

fn required_count(blow: &SptBlow, name: &str, value: Option<NValue>) -> CalcResult<i32> {
    value.map(|n| n.to_i32()).ok_or_else(|| {
        CalcError::calculation_failed(
            CALCULATION_TYPE,
            format!("blow at {:?} m has no {} after corrections", blow.depth, name),
        )
    })
}

pub fn calculate(
    soil_profile: &SoilProfile,
    spt: &Spt,
    params: LiquefactionParams,
) -> CalcResult<SptLiquefactionResult> {
    validate_input(soil_profile, spt)?;
    params.validate()?;

    let mut profile = soil_profile.clone();
    profile.calc_layer_depths()?;
    let gwt = profile
        .ground_water_level
        .ok_or_else(|| CalcError::missing_field("soil_profile.ground_water_level"))?;

    let spt_exp = prepare_spt_exp(spt, &profile)?;
    let msf = calc_msf(params.mw);
    let mut layers = Vec::with_capacity(spt_exp.blows.len());

    for blow in &spt_exp.blows {
        let (Some(depth), Some(thickness)) = (blow.depth, blow.thickness) else {
            continue;
        };
        let n60 = required_count(blow, "n60", blow.n60)?;
        let n1_60 = required_count(blow, "n1_60", blow.n1_60)?;
        let n1_60f = required_count(blow, "n1_60f", blow.n1_60f)?;

        let rd = calc_rd(depth);
        let normal_stress = profile.calc_normal_stress(depth)?;
        let effective_stress = profile.calc_effective_stress(depth)?;
        let soil_layer = profile.get_layer_at_depth(depth)?;
        let plasticity_index = soil_layer.plasticity_index.unwrap_or(0.0);

        let screening = if gwt >= depth {
            Some(ScreeningReason::AboveWaterTable)
        } else if plasticity_index >= PLASTICITY_INDEX_LIMIT {
            Some(ScreeningReason::Plastic)
        } else if n1_60 >= 30 {
            Some(ScreeningReason::DenseN160)
        } else if n1_60f >= 34 {
            Some(ScreeningReason::DenseN160f)
        } else {
            None
        };

        if let Some(reason) = screening {
            debug!("blow at {:.2} m screened out: {:?}", depth, reason);
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
        let crr75 = calc_crr75(n1_60f, effective_stress);
        let crr = msf * crr75;
        let safety_factor = crr / csr;
        let settlement = calc_settlement(safety_factor, thickness, n60)?;
        debug!(
            "blow at {:.2} m: N1,60f {} CSR {:.3} CRR {:.3} FS {:.3} s {:.2} cm",
            depth, n1_60f, csr, crr, safety_factor, settlement
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

    Ok(SptLiquefactionResult {
        total_settlement: total_settlement(&layers),
        layers,
        spt_exp,
        msf,
    })
}
