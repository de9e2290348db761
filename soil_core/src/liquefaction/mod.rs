//! # Liquefaction
//!
//! Simplified cyclic stress approach: the earthquake demand (CSR) is compared
//! with the soil's cyclic resistance (CRR) at each depth, and liquefied
//! layers get a post-liquefaction settlement estimate.
//!
//! - [`seed_idriss`] - resistance from corrected SPT blow counts
//! - [`andrus_stokoe`] - resistance from MASW shear wave velocities
//!
//! ## Shared relations
//!
//! | Quantity | Formula |
//! |----------|---------|
//! | Stress reduction | rd(z), piecewise in depth |
//! | Demand | CSR = 0.65·PGA·σ·rd |
//! | Magnitude scaling | MSF = 10^2.24 / Mw^2.56 |
//! | Resistance | CRR = MSF·CRR7.5 |
//! | Safety | FS = CRR / CSR, safe when FS > 1.1 |
//!
//! Stresses are in t/m², settlements in cm.

pub mod andrus_stokoe;
pub mod seed_idriss;

use serde::{Deserialize, Serialize};

use crate::errors::CalcResult;
use crate::interpolation::interp1d;
use crate::models::SoilLayer;
use crate::validation::{validate_scalar, Bounds};

pub use andrus_stokoe::VsLiquefactionResult;
pub use seed_idriss::SptLiquefactionResult;

/// Layers with FS above this are considered safe
pub const SAFETY_FACTOR_LIMIT: f64 = 1.1;

/// Soils with a plasticity index at or above this do not liquefy
pub const PLASTICITY_INDEX_LIMIT: f64 = 12.0;

/// Upper limit of the Vs overburden correction factor
const MAX_CN: f64 = 1.7;

/// Earthquake scenario for a liquefaction analysis.
///
/// ## JSON Example
///
/// ```json
/// { "pga": 0.4, "mw": 7.5 }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiquefactionParams {
    /// Peak ground acceleration (g)
    pub pga: f64,
    /// Moment magnitude
    pub mw: f64,
}

impl Default for LiquefactionParams {
    fn default() -> Self {
        LiquefactionParams { pga: 0.4, mw: 7.5 }
    }
}

impl LiquefactionParams {
    pub fn validate(&self) -> CalcResult<()> {
        validate_scalar("liquefaction.pga", Some(self.pga), Bounds::between(0.0001, 5.0))?;
        validate_scalar("liquefaction.mw", Some(self.mw), Bounds::between(1.0, 10.0))?;
        Ok(())
    }
}

/// Why a depth was excluded from the liquefaction check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningReason {
    /// Depth is at or above the ground water table
    AboveWaterTable,
    /// Plasticity index ≥ 12
    Plastic,
    /// N1,60 ≥ 30
    DenseN160,
    /// N1,60f ≥ 34
    DenseN160f,
    /// Vs1 ≥ Vs1c
    VelocityAboveCritical,
}

/// Liquefaction check at one depth
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquefactionLayerResult {
    /// Soil layer containing the depth
    pub soil_layer: SoilLayer,
    /// Depth checked (m)
    pub depth: f64,
    /// Thickness represented by this check (m)
    pub thickness: f64,
    /// Total vertical stress σ (t/m²)
    pub normal_stress: f64,
    /// Effective vertical stress σ' (t/m²)
    pub effective_stress: f64,
    pub rd: f64,
    pub crr: Option<f64>,
    pub crr75: Option<f64>,
    pub csr: Option<f64>,
    pub safety_factor: Option<f64>,
    pub is_safe: bool,
    /// Post-liquefaction settlement (cm)
    pub settlement: f64,
    /// Set when the depth was screened out before computing FS
    pub screened: Option<ScreeningReason>,
}

impl LiquefactionLayerResult {
    /// A depth excluded from the check: stresses and rd only.
    pub(crate) fn screened(
        soil_layer: &SoilLayer,
        depth: f64,
        thickness: f64,
        stresses: (f64, f64),
        rd: f64,
        reason: ScreeningReason,
    ) -> Self {
        LiquefactionLayerResult {
            soil_layer: soil_layer.clone(),
            depth,
            thickness,
            normal_stress: stresses.0,
            effective_stress: stresses.1,
            rd,
            crr: None,
            crr75: None,
            csr: None,
            safety_factor: None,
            is_safe: true,
            settlement: 0.0,
            screened: Some(reason),
        }
    }
}

pub(crate) fn total_settlement(layers: &[LiquefactionLayerResult]) -> f64 {
    layers.iter().map(|l| l.settlement).sum()
}

/// Stress reduction coefficient rd at `depth` (m)
pub fn calc_rd(depth: f64) -> f64 {
    if depth <= 9.15 {
        1.0 - 0.00765 * depth
    } else if depth < 23.0 {
        1.174 - 0.0267 * depth
    } else if depth < 30.0 {
        0.744 - 0.008 * depth
    } else {
        0.5
    }
}

/// Cyclic stress ratio
pub fn calc_csr(pga: f64, normal_stress: f64, rd: f64) -> f64 {
    0.65 * pga * normal_stress * rd
}

/// Magnitude scaling factor
pub fn calc_msf(mw: f64) -> f64 {
    10f64.powf(2.24) / mw.powf(2.56)
}

/// Overburden correction for shear wave velocity, capped at 1.7
pub fn calc_cn(effective_stress: f64) -> f64 {
    (1.16 * (1.0 / effective_stress).sqrt()).min(MAX_CN)
}

/// Post-liquefaction volumetric settlement (cm) of a layer of `thickness`
/// (m), given FS and the Q parameter interpolated at `x` from (`xs`, `qs`).
pub(crate) fn calc_settlement_from_table(
    safety_factor: f64,
    thickness: f64,
    xs: &[f64],
    qs: &[f64],
    x: f64,
) -> CalcResult<f64> {
    const A0: f64 = 0.3773;
    const A1: f64 = -0.0337;
    const A2: f64 = 1.5672;
    const A3: f64 = -0.1833;
    const B0: f64 = 28.45;
    const B1: f64 = -9.3372;
    const B2: f64 = 0.7975;

    let ln_q = interp1d(xs, qs, x)?.ln();
    let s2 = B0 + B1 * ln_q + B2 * ln_q.powi(2);
    let threshold = 2.0 - 1.0 / (A2 + A3 * ln_q);

    let settlement = if safety_factor > 2.0 {
        0.0
    } else if safety_factor < 2.0 && safety_factor > threshold {
        let s1 = (A0 + A1 * ln_q) / ((1.0 / (2.0 - safety_factor)) - (A2 + A3 * ln_q));
        s1.min(s2)
    } else {
        s2
    };
    Ok(settlement * thickness)
}
