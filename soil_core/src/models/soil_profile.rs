//! # Soil Profile
//!
//! Layered soil column with a single ground water table. Computes the
//! cumulative depth bookkeeping of each layer and the vertical total and
//! effective stress at any depth.
//!
//! ## Units
//!
//! Lengths in meters, unit weights in t/m³, stresses in t/m²
//! (1 t/m³ ≈ 9.81 kN/m³).
//!
//! ## Example
//!
//! ```rust
//! use soil_core::models::{SoilLayer, SoilProfile};
//!
//! let mut layer = SoilLayer::new(5.0);
//! layer.dry_unit_weight = Some(1.8);
//! layer.saturated_unit_weight = Some(2.0);
//!
//! let profile = SoilProfile::new(vec![layer], 0.0).unwrap();
//! let sigma = profile.calc_normal_stress(5.0).unwrap();
//! let sigma_eff = profile.calc_effective_stress(5.0).unwrap();
//!
//! assert!((sigma - 10.0).abs() < 1e-9);
//! assert!((sigma_eff - 5.095).abs() < 1e-9);
//! ```

use log::trace;
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::idealization::DepthRecord;
use crate::validation::{validate_scalar, Bounds, FieldSpec, Validate};

/// Unit weight of water (t/m³)
pub const WATER_UNIT_WEIGHT: f64 = 0.981;

/// Unit weights at or below this value (t/m³) are not soil
const MIN_SOIL_UNIT_WEIGHT: f64 = 1.0;

/// Derived position of a layer within its profile
#[derive(Debug, Clone, Copy, PartialEq)]
struct LayerPosition {
    /// Bottom of layer (m)
    depth: f64,
    /// Mid-layer depth (m)
    center: f64,
}

/// A single soil layer.
///
/// Only `thickness` is needed to place the layer; every other property is
/// optional and required only by the analyses that use it.
///
/// ## JSON Example
///
/// ```json
/// {
///   "soil_classification": "CLAY",
///   "thickness": 2.0,
///   "dry_unit_weight": 1.8,
///   "saturated_unit_weight": 2.0,
///   "plasticity_index": 18.0
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilLayer {
    /// Soil description (e.g. "CLAY", "SAND")
    pub soil_classification: Option<String>,
    /// Layer thickness (m)
    pub thickness: Option<f64>,
    /// Natural unit weight (t/m³)
    pub natural_unit_weight: Option<f64>,
    /// Dry unit weight (t/m³)
    pub dry_unit_weight: Option<f64>,
    /// Saturated unit weight (t/m³)
    pub saturated_unit_weight: Option<f64>,
    /// Damping ratio (%)
    pub damping_ratio: Option<f64>,
    /// Fine content (%)
    pub fine_content: Option<f64>,
    /// Liquid limit (%)
    pub liquid_limit: Option<f64>,
    /// Plastic limit (%)
    pub plastic_limit: Option<f64>,
    /// Plasticity index (%)
    pub plasticity_index: Option<f64>,
    /// Undrained shear strength (t/m²)
    pub cu: Option<f64>,
    /// Effective cohesion (t/m²)
    pub c_prime: Option<f64>,
    /// Undrained friction angle (degrees)
    pub phi_u: Option<f64>,
    /// Effective friction angle (degrees)
    pub phi_prime: Option<f64>,
    /// Water content (%)
    pub water_content: Option<f64>,
    /// Poisson's ratio
    pub poissons_ratio: Option<f64>,
    /// Elastic modulus (t/m²)
    pub elastic_modulus: Option<f64>,
    /// Void ratio
    pub void_ratio: Option<f64>,
    /// Recompression index
    pub recompression_index: Option<f64>,
    /// Compression index
    pub compression_index: Option<f64>,
    /// Preconsolidation pressure (t/m²)
    pub preconsolidation_pressure: Option<f64>,
    /// Coefficient of volume compressibility (m²/t)
    pub mv: Option<f64>,
    /// Shear wave velocity (m/s)
    pub shear_wave_velocity: Option<f64>,

    #[serde(skip)]
    position: Option<LayerPosition>,
}

impl SoilLayer {
    /// Create a layer with only its thickness set.
    pub fn new(thickness: f64) -> Self {
        SoilLayer {
            thickness: Some(thickness),
            ..Default::default()
        }
    }

    /// Bottom depth of the layer (m), once the profile has placed it
    pub fn depth(&self) -> Option<f64> {
        self.position.map(|p| p.depth)
    }

    /// Mid-layer depth (m), once the profile has placed it
    pub fn center(&self) -> Option<f64> {
        self.position.map(|p| p.center)
    }

    fn required_thickness(&self) -> CalcResult<f64> {
        self.thickness
            .ok_or_else(|| CalcError::missing_field(SoilLayerField::Thickness.qualified_name()))
    }
}

impl DepthRecord for SoilLayer {
    fn depth(&self) -> Option<f64> {
        SoilLayer::depth(self)
    }
}

/// Validatable soil layer properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilLayerField {
    Thickness,
    NaturalUnitWeight,
    DryUnitWeight,
    SaturatedUnitWeight,
    DampingRatio,
    FineContent,
    LiquidLimit,
    PlasticLimit,
    PlasticityIndex,
    Cu,
    CPrime,
    PhiU,
    PhiPrime,
    WaterContent,
    PoissonsRatio,
    ElasticModulus,
    VoidRatio,
    CompressionIndex,
    RecompressionIndex,
    PreconsolidationPressure,
    Mv,
    ShearWaveVelocity,
}

impl FieldSpec for SoilLayerField {
    const SCOPE: &'static str = "soil_profile";

    fn name(&self) -> &'static str {
        match self {
            SoilLayerField::Thickness => "thickness",
            SoilLayerField::NaturalUnitWeight => "natural_unit_weight",
            SoilLayerField::DryUnitWeight => "dry_unit_weight",
            SoilLayerField::SaturatedUnitWeight => "saturated_unit_weight",
            SoilLayerField::DampingRatio => "damping_ratio",
            SoilLayerField::FineContent => "fine_content",
            SoilLayerField::LiquidLimit => "liquid_limit",
            SoilLayerField::PlasticLimit => "plastic_limit",
            SoilLayerField::PlasticityIndex => "plasticity_index",
            SoilLayerField::Cu => "cu",
            SoilLayerField::CPrime => "c_prime",
            SoilLayerField::PhiU => "phi_u",
            SoilLayerField::PhiPrime => "phi_prime",
            SoilLayerField::WaterContent => "water_content",
            SoilLayerField::PoissonsRatio => "poissons_ratio",
            SoilLayerField::ElasticModulus => "elastic_modulus",
            SoilLayerField::VoidRatio => "void_ratio",
            SoilLayerField::CompressionIndex => "compression_index",
            SoilLayerField::RecompressionIndex => "recompression_index",
            SoilLayerField::PreconsolidationPressure => "preconsolidation_pressure",
            SoilLayerField::Mv => "mv",
            SoilLayerField::ShearWaveVelocity => "shear_wave_velocity",
        }
    }

    fn bounds(&self) -> Bounds {
        match self {
            SoilLayerField::Thickness => Bounds::at_least(0.0001),
            SoilLayerField::NaturalUnitWeight
            | SoilLayerField::DryUnitWeight
            | SoilLayerField::SaturatedUnitWeight => Bounds::between(0.1, 10.0),
            SoilLayerField::DampingRatio => Bounds::between(0.1, 100.0),
            SoilLayerField::FineContent
            | SoilLayerField::LiquidLimit
            | SoilLayerField::PlasticLimit
            | SoilLayerField::PlasticityIndex
            | SoilLayerField::WaterContent => Bounds::between(0.0, 100.0),
            SoilLayerField::PhiU | SoilLayerField::PhiPrime => Bounds::between(0.0, 90.0),
            SoilLayerField::PoissonsRatio => Bounds::between(0.0001, 0.5),
            SoilLayerField::ElasticModulus => Bounds::at_least(0.0001),
            SoilLayerField::Cu
            | SoilLayerField::CPrime
            | SoilLayerField::VoidRatio
            | SoilLayerField::CompressionIndex
            | SoilLayerField::RecompressionIndex
            | SoilLayerField::PreconsolidationPressure
            | SoilLayerField::Mv
            | SoilLayerField::ShearWaveVelocity => Bounds::at_least(0.0),
        }
    }
}

impl Validate for SoilLayer {
    type Field = SoilLayerField;

    fn field_value(&self, field: SoilLayerField) -> Option<f64> {
        match field {
            SoilLayerField::Thickness => self.thickness,
            SoilLayerField::NaturalUnitWeight => self.natural_unit_weight,
            SoilLayerField::DryUnitWeight => self.dry_unit_weight,
            SoilLayerField::SaturatedUnitWeight => self.saturated_unit_weight,
            SoilLayerField::DampingRatio => self.damping_ratio,
            SoilLayerField::FineContent => self.fine_content,
            SoilLayerField::LiquidLimit => self.liquid_limit,
            SoilLayerField::PlasticLimit => self.plastic_limit,
            SoilLayerField::PlasticityIndex => self.plasticity_index,
            SoilLayerField::Cu => self.cu,
            SoilLayerField::CPrime => self.c_prime,
            SoilLayerField::PhiU => self.phi_u,
            SoilLayerField::PhiPrime => self.phi_prime,
            SoilLayerField::WaterContent => self.water_content,
            SoilLayerField::PoissonsRatio => self.poissons_ratio,
            SoilLayerField::ElasticModulus => self.elastic_modulus,
            SoilLayerField::VoidRatio => self.void_ratio,
            SoilLayerField::CompressionIndex => self.compression_index,
            SoilLayerField::RecompressionIndex => self.recompression_index,
            SoilLayerField::PreconsolidationPressure => self.preconsolidation_pressure,
            SoilLayerField::Mv => self.mv,
            SoilLayerField::ShearWaveVelocity => self.shear_wave_velocity,
        }
    }
}

/// Ordered soil layers (top to bottom) and the ground water level.
///
/// Layer depths are derived state. Any mutable access to the layers clears
/// them, and the stress queries refuse to run until
/// [`SoilProfile::calc_layer_depths`] has been called again.
///
/// ## JSON Example
///
/// ```json
/// {
///   "layers": [
///     { "thickness": 2.0, "dry_unit_weight": 1.8, "saturated_unit_weight": 2.0 },
///     { "thickness": 3.0, "dry_unit_weight": 1.6, "saturated_unit_weight": 1.9 }
///   ],
///   "ground_water_level": 2.5
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoilProfile {
    layers: Vec<SoilLayer>,
    /// Ground water table depth below the surface (m)
    pub ground_water_level: Option<f64>,
}

impl SoilProfile {
    /// Create a profile and place its layers.
    ///
    /// # Errors
    ///
    /// * `EmptyCollection` if `layers` is empty
    /// * `MissingField` if a layer has no thickness
    pub fn new(layers: Vec<SoilLayer>, ground_water_level: f64) -> CalcResult<Self> {
        if layers.is_empty() {
            return Err(CalcError::empty_collection("soil_profile.layers"));
        }
        let mut profile = SoilProfile {
            layers,
            ground_water_level: Some(ground_water_level),
        };
        profile.calc_layer_depths()?;
        Ok(profile)
    }

    pub fn layers(&self) -> &[SoilLayer] {
        &self.layers
    }

    /// Mutable access to the layers. Clears derived depths.
    pub fn layers_mut(&mut self) -> &mut Vec<SoilLayer> {
        self.invalidate_depths();
        &mut self.layers
    }

    /// Append a layer at the bottom. Clears derived depths.
    pub fn push_layer(&mut self, layer: SoilLayer) {
        self.invalidate_depths();
        self.layers.push(layer);
    }

    fn invalidate_depths(&mut self) {
        for layer in &mut self.layers {
            layer.position = None;
        }
    }

    /// True once every layer has a derived depth
    pub fn depths_calculated(&self) -> bool {
        !self.layers.is_empty() && self.layers.iter().all(|l| l.position.is_some())
    }

    /// Total depth of the profile (bottom of the last layer)
    pub fn total_depth(&self) -> Option<f64> {
        self.layers.last().and_then(SoilLayer::depth)
    }

    /// Compute the bottom depth and center of every layer.
    ///
    /// Idempotent; call again after editing thicknesses.
    ///
    /// # Errors
    ///
    /// * `MissingField` if a layer has no thickness (no layer is placed)
    pub fn calc_layer_depths(&mut self) -> CalcResult<()> {
        let thicknesses = self
            .layers
            .iter()
            .map(SoilLayer::required_thickness)
            .collect::<CalcResult<Vec<f64>>>()?;

        let mut bottom = 0.0;
        for (layer, thickness) in self.layers.iter_mut().zip(thicknesses) {
            let center = bottom + thickness / 2.0;
            bottom += thickness;
            layer.position = Some(LayerPosition {
                depth: bottom,
                center,
            });
        }
        Ok(())
    }

    fn ensure_depths(&self) -> CalcResult<()> {
        if self.layers.is_empty() {
            return Err(CalcError::empty_collection("soil_profile.layers"));
        }
        if !self.depths_calculated() {
            return Err(CalcError::depths_not_calculated("soil_profile"));
        }
        Ok(())
    }

    fn required_ground_water_level(&self) -> CalcResult<f64> {
        self.ground_water_level
            .ok_or_else(|| CalcError::missing_field("soil_profile.ground_water_level"))
    }

    /// Index of the first layer whose bottom is at or below `depth`; the
    /// last layer for depths beyond the profile.
    pub fn get_layer_index(&self, depth: f64) -> CalcResult<usize> {
        self.ensure_depths()?;
        let index = self
            .layers
            .iter()
            .position(|l| l.depth().is_some_and(|d| d >= depth))
            .unwrap_or(self.layers.len() - 1);
        Ok(index)
    }

    /// The layer containing `depth`
    pub fn get_layer_at_depth(&self, depth: f64) -> CalcResult<&SoilLayer> {
        let index = self.get_layer_index(depth)?;
        Ok(&self.layers[index])
    }

    /// Total vertical stress (t/m²) at `depth`.
    ///
    /// Sums unit weight × thickness from the surface, using the dry unit
    /// weight above the water table and the saturated one below it. The
    /// layer containing `depth` contributes only down to `depth`.
    ///
    /// # Errors
    ///
    /// * `MissingField` if the ground water level or a thickness is unset
    /// * `InvalidInput` if a layer's dry and saturated unit weights are both ≤ 1.0
    /// * `DepthsNotCalculated` / `EmptyCollection` as for [`Self::get_layer_index`]
    pub fn calc_normal_stress(&self, depth: f64) -> CalcResult<f64> {
        let gwt = self.required_ground_water_level()?;
        let layer_index = self.get_layer_index(depth)?;

        let mut total_stress = 0.0;
        let mut previous_depth = 0.0;

        for (i, layer) in self.layers[..=layer_index].iter().enumerate() {
            let thickness = if i == layer_index {
                depth - previous_depth
            } else {
                layer.required_thickness()?
            };

            let dry = layer.dry_unit_weight.unwrap_or(0.0);
            let saturated = layer.saturated_unit_weight.unwrap_or(0.0);
            if dry <= MIN_SOIL_UNIT_WEIGHT && saturated <= MIN_SOIL_UNIT_WEIGHT {
                return Err(CalcError::invalid_input(
                    SoilLayerField::DryUnitWeight.qualified_name(),
                    format!("layer {}: dry {}, saturated {}", i, dry, saturated),
                    "Dry or saturated unit weight must be greater than 1 t/m³",
                ));
            }

            let bottom = previous_depth + thickness;
            let contribution = if gwt >= bottom {
                dry * thickness
            } else if gwt <= previous_depth {
                saturated * thickness
            } else {
                let dry_thickness = gwt - previous_depth;
                dry * dry_thickness + saturated * (thickness - dry_thickness)
            };
            trace!(
                "layer {} [{:.3}, {:.3}] m adds {:.4} t/m² (gwt {:.3})",
                i,
                previous_depth,
                bottom,
                contribution,
                gwt
            );

            total_stress += contribution;
            previous_depth = bottom;
        }

        Ok(total_stress)
    }

    /// Effective vertical stress (t/m²) at `depth`: total stress minus the
    /// hydrostatic pore pressure below the water table.
    pub fn calc_effective_stress(&self, depth: f64) -> CalcResult<f64> {
        let gwt = self.required_ground_water_level()?;
        let normal_stress = self.calc_normal_stress(depth)?;

        if gwt >= depth {
            return Ok(normal_stress);
        }
        let pore_pressure = (depth - gwt) * WATER_UNIT_WEIGHT;
        Ok(normal_stress - pore_pressure)
    }

    /// Validate the listed layer fields on every layer, plus the ground
    /// water level.
    pub fn validate(&self, fields: &[SoilLayerField]) -> CalcResult<()> {
        if self.layers.is_empty() {
            return Err(CalcError::empty_collection("soil_profile.layers"));
        }
        for layer in &self.layers {
            layer.validate_fields(fields)?;
        }
        validate_scalar(
            "soil_profile.ground_water_level",
            self.ground_water_level,
            Bounds::at_least(0.0),
        )?;
        Ok(())
    }
}
