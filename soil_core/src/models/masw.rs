//! # MASW (Multichannel Analysis of Surface Waves)
//!
//! Velocity profiles reported as stacked layers: each layer has a thickness
//! and the shear (Vs) and compression (Vp) wave velocities within it. Layer
//! bottom depths are derived from the thicknesses. Any mutable access to a
//! sounding's layers clears those depths until `calc_depths` runs again.
//!
//! ## Idealization
//!
//! Layer boundaries of different soundings rarely line up. The idealized
//! profile splits the column at every boundary of every sounding (plus the
//! surface), and each resulting interval takes the velocities each sounding
//! reports at the interval midpoint:
//!
//! ```text
//! exp 1:  |---- 180 ----|-------- 200 --------|
//! exp 2:  |-- 170 --|---------- 190 ------------|
//! ideal:  |---------|---|---------------------|-|
//!         0        1.5  2                     5 5.5
//! ```
//!
//! ## Example
//!
//! ```rust
//! use soil_core::idealization::SelectionMethod;
//! use soil_core::models::{Masw, MaswExp, MaswLayer};
//!
//! let exp1 = MaswExp::new(vec![MaswLayer::new(2.0, 180.0, 400.0)], "MASW-1").unwrap();
//! let exp2 = MaswExp::new(vec![MaswLayer::new(1.5, 170.0, 390.0)], "MASW-2").unwrap();
//!
//! let masw = Masw::new(vec![exp1, exp2], SelectionMethod::Min).unwrap();
//! let ideal = masw.get_idealized_exp("ideal").unwrap();
//!
//! assert_eq!(ideal.layers().len(), 2);
//! assert_eq!(ideal.layers()[0].thickness, Some(1.5));
//! assert_eq!(ideal.layers()[0].vs, Some(170.0));
//! ```

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::idealization::{record_at_depth, DepthMatch, DepthRecord, Idealizer, SelectionMethod};
use crate::validation::{Bounds, FieldSpec, Validate};

static EMPTY_LAYER: MaswLayer = MaswLayer::empty();

/// One velocity layer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaswLayer {
    /// Layer thickness (m)
    pub thickness: Option<f64>,
    /// Shear wave velocity (m/s)
    pub vs: Option<f64>,
    /// Compression wave velocity (m/s)
    pub vp: Option<f64>,

    /// Bottom depth (m), derived from the thicknesses above
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    depth: Option<f64>,
}

impl MaswLayer {
    pub fn new(thickness: f64, vs: f64, vp: f64) -> Self {
        MaswLayer {
            thickness: Some(thickness),
            vs: Some(vs),
            vp: Some(vp),
            depth: None,
        }
    }

    const fn empty() -> Self {
        MaswLayer {
            thickness: None,
            vs: None,
            vp: None,
            depth: None,
        }
    }

    /// Bottom depth, once the owning experiment has calculated it
    pub fn depth(&self) -> Option<f64> {
        self.depth
    }
}

impl DepthRecord for MaswLayer {
    fn depth(&self) -> Option<f64> {
        self.depth
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaswField {
    Depth,
    Thickness,
    Vs,
    Vp,
}

impl FieldSpec for MaswField {
    const SCOPE: &'static str = "masw";

    fn name(&self) -> &'static str {
        match self {
            MaswField::Depth => "depth",
            MaswField::Thickness => "thickness",
            MaswField::Vs => "vs",
            MaswField::Vp => "vp",
        }
    }

    fn bounds(&self) -> Bounds {
        match self {
            MaswField::Thickness => Bounds::at_least(0.0001),
            MaswField::Depth | MaswField::Vs | MaswField::Vp => Bounds::at_least(0.0),
        }
    }
}

impl Validate for MaswLayer {
    type Field = MaswField;

    fn field_value(&self, field: MaswField) -> Option<f64> {
        match field {
            MaswField::Depth => self.depth,
            MaswField::Thickness => self.thickness,
            MaswField::Vs => self.vs,
            MaswField::Vp => self.vp,
        }
    }
}

/// One MASW sounding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaswExp {
    layers: Vec<MaswLayer>,
    pub name: String,
}

impl MaswExp {
    /// Create a sounding and derive its layer depths.
    ///
    /// # Errors
    ///
    /// * `InvalidInput` if a layer thickness is missing or not positive
    pub fn new(layers: Vec<MaswLayer>, name: impl Into<String>) -> CalcResult<Self> {
        let mut exp = MaswExp {
            layers,
            name: name.into(),
        };
        exp.calc_depths()?;
        Ok(exp)
    }

    pub fn layers(&self) -> &[MaswLayer] {
        &self.layers
    }

    /// Mutable access to the layers.
    ///
    /// Derived depths are cleared; call [`calc_depths`](Self::calc_depths)
    /// before looking layers up by depth again.
    pub fn layers_mut(&mut self) -> &mut Vec<MaswLayer> {
        self.clear_depths();
        &mut self.layers
    }

    /// Append a layer below the current bottom. Clears derived depths.
    pub fn push_layer(&mut self, layer: MaswLayer) {
        self.clear_depths();
        self.layers.push(layer);
    }

    fn clear_depths(&mut self) {
        for layer in &mut self.layers {
            layer.depth = None;
        }
    }

    /// Cumulative bottom depth of every layer.
    ///
    /// Nothing is updated when any thickness is invalid.
    pub fn calc_depths(&mut self) -> CalcResult<()> {
        let thicknesses = self
            .layers
            .iter()
            .map(|layer| match layer.thickness {
                Some(t) if t > 0.0 => Ok(t),
                Some(t) => Err(CalcError::invalid_input(
                    MaswField::Thickness.qualified_name(),
                    t.to_string(),
                    "Thickness of MASW experiment must be greater than zero",
                )),
                None => Err(CalcError::invalid_input(
                    MaswField::Thickness.qualified_name(),
                    "null",
                    "Layer thickness must be set",
                )),
            })
            .collect::<CalcResult<Vec<f64>>>()?;

        let mut bottom = 0.0;
        for (layer, thickness) in self.layers.iter_mut().zip(thicknesses) {
            bottom += thickness;
            layer.depth = Some(bottom);
        }
        Ok(())
    }

    /// The layer covering `depth`. An empty sounding yields a layer with
    /// every channel unset.
    pub fn get_layer_at_depth(&self, depth: f64) -> &MaswLayer {
        record_at_depth(&self.layers, depth).unwrap_or(&EMPTY_LAYER)
    }

    pub fn validate(&self, fields: &[MaswField]) -> CalcResult<()> {
        if self.layers.is_empty() {
            return Err(CalcError::empty_collection("masw.layers"));
        }
        for layer in &self.layers {
            layer.validate_fields(fields)?;
        }
        Ok(())
    }
}

/// Collection of MASW soundings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Masw {
    pub exps: Vec<MaswExp>,
    pub idealization_method: SelectionMethod,
}

impl Masw {
    /// Create a collection, recalculating every sounding's depths.
    pub fn new(exps: Vec<MaswExp>, idealization_method: SelectionMethod) -> CalcResult<Self> {
        let mut masw = Masw {
            exps,
            idealization_method,
        };
        masw.calc_depths()?;
        Ok(masw)
    }

    pub fn add_exp(&mut self, exp: MaswExp) {
        self.exps.push(exp);
    }

    pub fn calc_depths(&mut self) -> CalcResult<()> {
        for exp in &mut self.exps {
            exp.calc_depths()?;
        }
        Ok(())
    }

    /// Combine all soundings on the union of their layer boundaries.
    ///
    /// Depths are recalculated on a copy of the soundings first, so a
    /// collection read from JSON can be idealized directly. Channels without
    /// data reduce to 0.0.
    pub fn get_idealized_exp(&self, name: impl Into<String>) -> CalcResult<MaswExp> {
        let name = name.into();
        if self.exps.is_empty() {
            warn!("MASW idealization '{}' has no soundings", name);
            return MaswExp::new(Vec::new(), name);
        }

        let mut exps = self.exps.clone();
        for exp in &mut exps {
            exp.calc_depths()?;
        }

        let method = self.idealization_method;
        let idealizer = Idealizer::new(exps.iter().map(|e| e.layers.as_slice()), DepthMatch::Covering);

        let layers: Vec<MaswLayer> = idealizer
            .interval_slices()
            .into_iter()
            .map(|slice| {
                MaswLayer::new(
                    slice.thickness(),
                    method.reduce_channel(&slice.records, |l| l.vs),
                    method.reduce_channel(&slice.records, |l| l.vp),
                )
            })
            .collect();

        debug!(
            "MASW idealization '{}' ({}): {} soundings -> {} layers",
            name,
            method,
            idealizer.experiment_count(),
            layers.len()
        );
        MaswExp::new(layers, name)
    }

    pub fn validate(&self, fields: &[MaswField]) -> CalcResult<()> {
        if self.exps.is_empty() {
            return Err(CalcError::empty_collection("masw.exps"));
        }
        for exp in &self.exps {
            exp.validate(fields)?;
        }
        Ok(())
    }
}
