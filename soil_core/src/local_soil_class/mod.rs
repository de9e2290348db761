//! # Local Soil Classification
//!
//! Site classes ZA (hard rock) through ZE (soft soil) from the harmonic
//! average of a soil property over the top 30 m:
//!
//! ```text
//! X30 = min(H, 30) / Σ(hᵢ / Xᵢ)
//! ```
//!
//! - [`by_spt`] - energy corrected blow counts (N60)
//! - [`by_vs`] - shear wave velocity (Vs)
//! - [`by_cu`] - undrained shear strength (cu)
//!
//! Layers are clipped so the cumulative thickness never exceeds 30 m, and
//! layers with a non-positive property are skipped.

pub mod by_cu;
pub mod by_spt;
pub mod by_vs;

use serde::{Deserialize, Serialize};

/// Depth range over which the property is averaged (m)
pub const CLASSIFICATION_DEPTH: f64 = 30.0;

/// Local site class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoilClass {
    ZA,
    ZB,
    ZC,
    ZD,
    ZE,
}

impl SoilClass {
    pub fn code(&self) -> &'static str {
        match self {
            SoilClass::ZA => "ZA",
            SoilClass::ZB => "ZB",
            SoilClass::ZC => "ZC",
            SoilClass::ZD => "ZD",
            SoilClass::ZE => "ZE",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SoilClass::ZA => "Hard rock",
            SoilClass::ZB => "Slightly weathered rock",
            SoilClass::ZC => "Very dense sand, gravel, hard clay",
            SoilClass::ZD => "Medium dense sand, gravel, stiff clay",
            SoilClass::ZE => "Loose sand, soft clay",
        }
    }
}

impl std::fmt::Display for SoilClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One layer's share of the harmonic average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AveragedLayer {
    /// Thickness used, after clipping (m)
    pub thickness: f64,
    /// Property value (N60, Vs or cu)
    pub value: f64,
    /// thickness / value
    pub thickness_over_value: f64,
}

/// Result of a local soil classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilClassResult {
    pub layers: Vec<AveragedLayer>,
    /// Σ(hᵢ / Xᵢ)
    pub sum_thickness_over_value: f64,
    /// Averaged property over the top 30 m (N30, Vs30 or cu30)
    pub value_30: f64,
    pub soil_class: SoilClass,
}

/// Clip `(thickness, value)` pairs to the top 30 m, skipping pairs with a
/// non-positive thickness or value. Skipped layers do not use up depth.
pub(crate) fn top_30m_layers(pairs: impl IntoIterator<Item = (f64, f64)>) -> Vec<AveragedLayer> {
    let mut remaining = CLASSIFICATION_DEPTH;
    let mut layers = Vec::new();

    for (thickness, value) in pairs {
        if remaining <= 0.0 {
            break;
        }
        let thickness = thickness.min(remaining);
        if thickness <= 0.0 || value <= 0.0 {
            continue;
        }
        layers.push(AveragedLayer {
            thickness,
            value,
            thickness_over_value: thickness / value,
        });
        remaining -= thickness;
    }
    layers
}

/// Harmonic average over the clipped layers and the class it maps to.
pub(crate) fn summarize(
    layers: Vec<AveragedLayer>,
    total_depth: f64,
    classify: impl Fn(f64) -> SoilClass,
) -> SoilClassResult {
    let sum: f64 = layers.iter().map(|l| l.thickness_over_value).sum();
    let value_30 = if sum > 0.0 {
        total_depth.min(CLASSIFICATION_DEPTH) / sum
    } else {
        0.0
    };
    SoilClassResult {
        layers,
        sum_thickness_over_value: sum,
        value_30,
        soil_class: classify(value_30),
    }
}
