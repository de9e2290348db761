//! Cone Penetration Test records and idealization.
//!
//! Each reading is a point measurement at a depth. Idealization takes the
//! covering reading of every sounding at each union depth, so a sounding
//! that stops short contributes its deepest reading below its last depth.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::idealization::{record_at_depth, DepthMatch, DepthRecord, Idealizer, SelectionMethod};
use crate::validation::{Bounds, FieldSpec, Validate};

static EMPTY_LAYER: CptLayer = CptLayer::empty();

/// One CPT reading
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CptLayer {
    /// Depth (m)
    pub depth: Option<f64>,
    /// Cone resistance qc (MPa)
    pub cone_resistance: Option<f64>,
    /// Sleeve friction fs (MPa)
    pub sleeve_friction: Option<f64>,
    /// Pore pressure u2 (MPa)
    pub pore_pressure: Option<f64>,
    /// Friction ratio Rf (%)
    pub friction_ratio: Option<f64>,
}

impl CptLayer {
    pub fn new(depth: f64, qc: f64, fs: f64, u2: Option<f64>) -> Self {
        CptLayer {
            depth: Some(depth),
            cone_resistance: Some(qc),
            sleeve_friction: Some(fs),
            pore_pressure: u2,
            friction_ratio: None,
        }
    }

    const fn empty() -> Self {
        CptLayer {
            depth: None,
            cone_resistance: None,
            sleeve_friction: None,
            pore_pressure: None,
            friction_ratio: None,
        }
    }

    /// Rf = fs / qc · 100. Left unset when qc is missing or zero, or fs is
    /// missing.
    pub fn calc_friction_ratio(&mut self) {
        if let (Some(qc), Some(fs)) = (self.cone_resistance, self.sleeve_friction) {
            if qc != 0.0 {
                self.friction_ratio = Some(fs / qc * 100.0);
            }
        }
    }
}

impl DepthRecord for CptLayer {
    fn depth(&self) -> Option<f64> {
        self.depth
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CptField {
    Depth,
    ConeResistance,
    SleeveFriction,
    PorePressure,
    FrictionRatio,
}

impl FieldSpec for CptField {
    const SCOPE: &'static str = "cpt";

    fn name(&self) -> &'static str {
        match self {
            CptField::Depth => "depth",
            CptField::ConeResistance => "cone_resistance",
            CptField::SleeveFriction => "sleeve_friction",
            CptField::PorePressure => "pore_pressure",
            CptField::FrictionRatio => "friction_ratio",
        }
    }

    fn bounds(&self) -> Bounds {
        Bounds::at_least(0.0)
    }
}

impl Validate for CptLayer {
    type Field = CptField;

    fn field_value(&self, field: CptField) -> Option<f64> {
        match field {
            CptField::Depth => self.depth,
            CptField::ConeResistance => self.cone_resistance,
            CptField::SleeveFriction => self.sleeve_friction,
            CptField::PorePressure => self.pore_pressure,
            CptField::FrictionRatio => self.friction_ratio,
        }
    }
}

/// One CPT sounding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CptExp {
    pub layers: Vec<CptLayer>,
    pub name: String,
}

impl CptExp {
    pub fn new(layers: Vec<CptLayer>, name: impl Into<String>) -> Self {
        CptExp {
            layers,
            name: name.into(),
        }
    }

    pub fn add_layer(&mut self, layer: CptLayer) {
        self.layers.push(layer);
    }

    /// The reading covering `depth`. An empty sounding yields a reading with
    /// every channel unset.
    pub fn get_layer_at_depth(&self, depth: f64) -> &CptLayer {
        record_at_depth(&self.layers, depth).unwrap_or(&EMPTY_LAYER)
    }

    pub fn calc_friction_ratios(&mut self) {
        self.layers.iter_mut().for_each(CptLayer::calc_friction_ratio);
    }

    pub fn validate(&self, fields: &[CptField]) -> CalcResult<()> {
        if self.layers.is_empty() {
            return Err(CalcError::empty_collection("cpt.layers"));
        }
        for layer in &self.layers {
            layer.validate_fields(fields)?;
        }
        Ok(())
    }
}

/// Collection of CPT soundings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cpt {
    pub exps: Vec<CptExp>,
    pub idealization_method: SelectionMethod,
}

impl Cpt {
    pub fn new(exps: Vec<CptExp>, idealization_method: SelectionMethod) -> Self {
        Cpt {
            exps,
            idealization_method,
        }
    }

    pub fn add_exp(&mut self, exp: CptExp) {
        self.exps.push(exp);
    }

    /// Combine all soundings into one, reducing qc, fs and u2 independently
    /// at every union depth. Channels without data reduce to 0.0.
    pub fn get_idealized_exp(&self, name: impl Into<String>) -> CptExp {
        let name = name.into();
        if self.exps.is_empty() {
            warn!("CPT idealization '{}' has no soundings", name);
            return CptExp::new(Vec::new(), name);
        }

        let method = self.idealization_method;
        let idealizer = Idealizer::new(self.exps.iter().map(|e| e.layers.as_slice()), DepthMatch::Covering);

        let layers: Vec<CptLayer> = idealizer
            .point_slices()
            .into_iter()
            .map(|slice| {
                CptLayer::new(
                    slice.depth,
                    method.reduce_channel(&slice.records, |l| l.cone_resistance),
                    method.reduce_channel(&slice.records, |l| l.sleeve_friction),
                    Some(method.reduce_channel(&slice.records, |l| l.pore_pressure)),
                )
            })
            .collect();

        debug!(
            "CPT idealization '{}' ({}): {} soundings -> {} readings",
            name,
            method,
            idealizer.experiment_count(),
            layers.len()
        );
        CptExp::new(layers, name)
    }

    pub fn validate(&self, fields: &[CptField]) -> CalcResult<()> {
        if self.exps.is_empty() {
            return Err(CalcError::empty_collection("cpt.exps"));
        }
        for exp in &self.exps {
            exp.validate(fields)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_layers() -> Vec<CptLayer> {
        vec![
            CptLayer::new(1.0, 10.0, 0.5, Some(0.2)),
            CptLayer::new(2.0, 11.0, 0.6, Some(0.3)),
            CptLayer::new(3.0, 12.0, 0.7, Some(0.4)),
        ]
    }

    fn test_cpt(method: SelectionMethod) -> Cpt {
        let exp1 = CptExp::new(
            vec![
                CptLayer::new(1.5, 160.0, 390.0, None),
                CptLayer::new(2.0, 170.0, 395.0, None),
                CptLayer::new(3.0, 180.0, 400.0, None),
            ],
            "Exp1",
        );
        let exp2 = CptExp::new(
            vec![
                CptLayer::new(1.5, 150.0, 380.0, None),
                CptLayer::new(3.0, 160.0, 390.0, None),
                CptLayer::new(5.5, 170.0, 395.0, None),
                CptLayer::new(6.5, 180.0, 400.0, None),
            ],
            "Exp2",
        );
        Cpt::new(vec![exp1, exp2], method)
    }

    #[test]
    fn test_calc_friction_ratio() {
        let mut layer = CptLayer::new(1.0, 10.0, 0.5, Some(0.2));
        layer.calc_friction_ratio();
        assert_relative_eq!(layer.friction_ratio.unwrap(), 5.0);
    }

    #[test]
    fn test_calc_friction_ratio_zero_cone_resistance() {
        let mut layer = CptLayer::new(1.0, 0.0, 0.5, Some(0.2));
        layer.calc_friction_ratio();
        assert!(layer.friction_ratio.is_none());
    }

    #[test]
    fn test_calc_friction_ratio_missing_sleeve_friction() {
        let mut layer = CptLayer {
            sleeve_friction: None,
            ..CptLayer::new(1.0, 10.0, 0.0, None)
        };
        layer.calc_friction_ratio();
        assert!(layer.friction_ratio.is_none());
    }

    #[test]
    fn test_get_layer_at_depth() {
        let exp = CptExp::new(test_layers(), "Test CPT");
        assert_eq!(exp.get_layer_at_depth(2.0).depth, Some(2.0));
        assert_eq!(exp.get_layer_at_depth(2.5).depth, Some(3.0));
        assert_eq!(exp.get_layer_at_depth(5.0).depth, Some(3.0));
    }

    #[test]
    fn test_get_layer_at_depth_empty() {
        let exp = CptExp::new(vec![], "Empty CPT");
        let layer = exp.get_layer_at_depth(1.0);
        assert!(layer.depth.is_none());
        assert_eq!(layer, &CptLayer::default());
    }

    #[test]
    fn test_get_idealized_exp_min() {
        let ideal = test_cpt(SelectionMethod::Min).get_idealized_exp("Ideal_Min");
        assert_eq!(ideal.name, "Ideal_Min");

        let depths: Vec<f64> = ideal.layers.iter().map(|l| l.depth.unwrap()).collect();
        assert_eq!(depths, vec![1.5, 2.0, 3.0, 5.5, 6.5]);
        assert_relative_eq!(ideal.layers[0].cone_resistance.unwrap(), 150.0);
        assert_relative_eq!(ideal.layers[0].sleeve_friction.unwrap(), 380.0);
    }

    #[test]
    fn test_get_idealized_exp_avg() {
        let ideal = test_cpt(SelectionMethod::Avg).get_idealized_exp("Ideal_Avg");
        assert_eq!(ideal.layers.len(), 5);
        assert_relative_eq!(ideal.layers[0].cone_resistance.unwrap(), 155.0);
        assert_relative_eq!(ideal.layers[0].sleeve_friction.unwrap(), 385.0);
        // 2.0 m: Exp1 reads 170, Exp2 is covered by its 3.0 m reading (160)
        assert_relative_eq!(ideal.layers[1].cone_resistance.unwrap(), 165.0);
        // 6.5 m: Exp1 falls back to its last reading (180)
        assert_relative_eq!(ideal.layers[4].cone_resistance.unwrap(), 180.0);
    }

    #[test]
    fn test_get_idealized_exp_max() {
        let ideal = test_cpt(SelectionMethod::Max).get_idealized_exp("Ideal_Max");
        assert_eq!(ideal.layers.len(), 5);
        assert_relative_eq!(ideal.layers[0].cone_resistance.unwrap(), 160.0);
        assert_relative_eq!(ideal.layers[0].sleeve_friction.unwrap(), 390.0);
        assert_eq!(ideal.layers[4].depth, Some(6.5));
    }

    #[test]
    fn test_absent_channel_reduces_to_zero() {
        let ideal = test_cpt(SelectionMethod::Avg).get_idealized_exp("x");
        assert!(ideal.layers.iter().all(|l| l.pore_pressure == Some(0.0)));
    }

    #[test]
    fn test_order_independence() {
        for method in [SelectionMethod::Min, SelectionMethod::Avg, SelectionMethod::Max] {
            let forward = test_cpt(method);
            let mut backward = forward.clone();
            backward.exps.reverse();
            assert_eq!(
                forward.get_idealized_exp("x").layers,
                backward.get_idealized_exp("x").layers
            );
        }
    }

    #[test]
    fn test_min_over_uneven_soundings() {
        let short = CptExp::new(
            vec![CptLayer::new(1.5, 100.0, 2.0, None), CptLayer::new(3.0, 120.0, 3.0, None)],
            "short",
        );
        let long = CptExp::new(
            vec![
                CptLayer::new(1.5, 110.0, 1.0, None),
                CptLayer::new(3.0, 90.0, 4.0, None),
                CptLayer::new(4.5, 200.0, 5.0, None),
            ],
            "long",
        );
        let ideal = Cpt::new(vec![short, long], SelectionMethod::Min).get_idealized_exp("ideal");

        let readings: Vec<(f64, f64, f64)> = ideal
            .layers
            .iter()
            .map(|l| (l.depth.unwrap(), l.cone_resistance.unwrap(), l.sleeve_friction.unwrap()))
            .collect();
        // 4.5 m: the short sounding is covered by its last reading
        assert_eq!(readings, vec![(1.5, 100.0, 1.0), (3.0, 90.0, 3.0), (4.5, 120.0, 3.0)]);
    }

    #[test]
    fn test_empty_collection() {
        let ideal = Cpt::default().get_idealized_exp("none");
        assert!(ideal.layers.is_empty());
        assert_eq!(
            Cpt::default().validate(&[CptField::Depth]).unwrap_err(),
            CalcError::empty_collection("cpt.exps")
        );
    }

    #[test]
    fn test_validate() {
        let cpt = test_cpt(SelectionMethod::Avg);
        assert!(cpt.validate(&[CptField::Depth, CptField::ConeResistance]).is_ok());
        assert_eq!(
            cpt.validate(&[CptField::PorePressure]).unwrap_err(),
            CalcError::missing_field("cpt.pore_pressure")
        );
    }
}
