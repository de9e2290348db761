//! # Standard Penetration Test
//!
//! Blow counts per borehole ([`SptExp`]), grouped into a collection ([`Spt`])
//! that carries the rig correction factors and the idealization rule.
//!
//! ## Corrections
//!
//! | Step | Formula |
//! |------|---------|
//! | Energy | N60 = N·Ce, N90 = N60·1.5 |
//! | Overburden | Cn = min(√(1/(9.81σ'))·9.78, 1.7) |
//! | Rod length | Cr by depth: ≤4 m 0.75, ≤6 m 0.85, ≤10 m 0.95, else 1.0 |
//! | Fines | α, β from fine content |
//! | Final | N1,60 = N60·Cn·Cr·Cs·Cb, N1,60f = N1,60·β + α |
//!
//! ## Example
//!
//! ```rust
//! use soil_core::idealization::SelectionMethod;
//! use soil_core::models::{NValue, Spt, SptExp};
//!
//! let mut bh1 = SptExp::new(vec![], "BH-1");
//! bh1.add_blow(1.5, NValue::Finite(10));
//! bh1.add_blow(3.0, NValue::Refusal);
//!
//! let mut bh2 = SptExp::new(vec![], "BH-2");
//! bh2.add_blow(1.5, NValue::Finite(15));
//! bh2.add_blow(3.0, NValue::Finite(14));
//!
//! let mut spt = Spt::new(1.2, 1.05, 0.9, SelectionMethod::Min);
//! spt.add_exp(bh1);
//! spt.add_exp(bh2);
//!
//! let idealized = spt.get_idealized_exp("idealized");
//! assert_eq!(idealized.blows[0].n, Some(NValue::Finite(10)));
//! assert_eq!(idealized.blows[1].n, Some(NValue::Finite(14)));
//! ```

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::n_value::NValue;
use super::soil_profile::SoilProfile;
use crate::errors::{CalcError, CalcResult};
use crate::idealization::{record_at_depth, DepthMatch, DepthRecord, Idealizer, SelectionMethod};
use crate::validation::{validate_scalar, Bounds, FieldSpec, Validate};

/// Upper limit of the overburden correction factor
const MAX_CN: f64 = 1.7;

static EMPTY_BLOW: SptBlow = SptBlow::empty();

/// One blow count reading and its corrected values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SptBlow {
    /// Thickness represented by this blow (m)
    pub thickness: Option<f64>,
    /// Test depth (m)
    pub depth: Option<f64>,
    /// Field blow count
    pub n: Option<NValue>,
    /// Energy-corrected blow count
    pub n60: Option<NValue>,
    pub n90: Option<NValue>,
    /// Overburden and rod corrected blow count
    pub n1_60: Option<NValue>,
    /// Fines corrected N1,60
    pub n1_60f: Option<NValue>,
    /// Overburden correction factor
    pub cn: Option<f64>,
    /// Rod length correction factor
    pub cr: Option<f64>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
}

impl SptBlow {
    pub fn new(depth: f64, n: NValue) -> Self {
        SptBlow {
            depth: Some(depth),
            n: Some(n),
            ..Default::default()
        }
    }

    const fn empty() -> Self {
        SptBlow {
            thickness: None,
            depth: None,
            n: None,
            n60: None,
            n90: None,
            n1_60: None,
            n1_60f: None,
            cn: None,
            cr: None,
            alpha: None,
            beta: None,
        }
    }

    /// Set N60 = N·ce and N90 = N60·1.5. No-op without a field count.
    pub fn apply_energy_correction(&mut self, energy_correction_factor: f64) {
        if let Some(n) = self.n {
            let n60 = n.mul_by_f64(energy_correction_factor);
            self.n60 = Some(n60);
            self.n90 = Some(n60.mul_by_f64(1.5));
        }
    }

    /// Overburden correction from the effective stress (t/m²)
    pub fn set_cn(&mut self, sigma_effective: f64) {
        self.cn = Some(((1.0 / (9.81 * sigma_effective)).sqrt() * 9.78).min(MAX_CN));
    }

    /// Rod length correction from the blow depth
    pub fn set_cr(&mut self) {
        let cr = match self.depth {
            None => 1.0,
            Some(d) if d <= 4.0 => 0.75,
            Some(d) if d <= 6.0 => 0.85,
            Some(d) if d <= 10.0 => 0.95,
            Some(_) => 1.0,
        };
        self.cr = Some(cr);
    }

    /// Fines correction coefficients from the fine content (%)
    pub fn set_alpha_beta(&mut self, fine_content: f64) {
        let (alpha, beta) = if fine_content <= 5.0 {
            (0.0, 1.0)
        } else if fine_content <= 35.0 {
            (
                (1.76 - 190.0 / fine_content.powi(2)).exp(),
                0.99 + fine_content.powf(1.5) / 1000.0,
            )
        } else {
            (5.0, 1.2)
        };
        self.alpha = Some(alpha);
        self.beta = Some(beta);
    }

    /// Run the full correction chain against a soil profile.
    ///
    /// `cs` sampler, `cb` borehole diameter, `ce` energy correction factor.
    /// Fine content comes from the layer at the blow depth (0 when unset).
    /// N1,60 and N1,60f are only set when every factor is available.
    pub fn apply_corrections(&mut self, soil_profile: &SoilProfile, cs: f64, cb: f64, ce: f64) -> CalcResult<()> {
        self.apply_energy_correction(ce);
        if let Some(depth) = self.depth {
            self.set_cn(soil_profile.calc_effective_stress(depth)?);
        }
        self.set_cr();
        if let Some(depth) = self.depth {
            let layer = soil_profile.get_layer_at_depth(depth)?;
            self.set_alpha_beta(layer.fine_content.unwrap_or(0.0));
        }

        if let (Some(n60), Some(cn), Some(cr), Some(alpha), Some(beta)) =
            (self.n60, self.cn, self.cr, self.alpha, self.beta)
        {
            let n1_60 = n60.mul_by_f64(cn * cr * cs * cb);
            self.n1_60 = Some(n1_60);
            self.n1_60f = Some(n1_60.mul_by_f64(beta).add_f64(alpha));
        }
        Ok(())
    }
}

impl DepthRecord for SptBlow {
    fn depth(&self) -> Option<f64> {
        self.depth
    }
}

/// Validatable SPT blow fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SptField {
    Depth,
    Thickness,
    N,
    N60,
}

impl FieldSpec for SptField {
    const SCOPE: &'static str = "spt";

    fn name(&self) -> &'static str {
        match self {
            SptField::Depth => "depth",
            SptField::Thickness => "thickness",
            SptField::N => "n",
            SptField::N60 => "n60",
        }
    }

    fn bounds(&self) -> Bounds {
        match self {
            SptField::Depth | SptField::Thickness => Bounds::at_least(0.0),
            SptField::N | SptField::N60 => Bounds::at_least(1.0),
        }
    }
}

impl Validate for SptBlow {
    type Field = SptField;

    fn field_value(&self, field: SptField) -> Option<f64> {
        match field {
            SptField::Depth => self.depth,
            SptField::Thickness => self.thickness,
            SptField::N => self.n.map(|n| n.to_i32() as f64),
            SptField::N60 => self.n60.map(|n| n.to_i32() as f64),
        }
    }
}

/// One SPT borehole
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SptExp {
    pub blows: Vec<SptBlow>,
    pub name: String,
}

impl SptExp {
    pub fn new(blows: Vec<SptBlow>, name: impl Into<String>) -> Self {
        SptExp {
            blows,
            name: name.into(),
        }
    }

    pub fn add_blow(&mut self, depth: f64, n: NValue) {
        self.blows.push(SptBlow::new(depth, n));
    }

    /// Thickness of each blow = its depth minus the previous blow depth.
    /// Blows without a depth are left untouched.
    pub fn calc_thicknesses(&mut self) {
        let mut previous_depth = 0.0;
        for blow in &mut self.blows {
            if let Some(depth) = blow.depth {
                blow.thickness = Some(depth - previous_depth);
                previous_depth = depth;
            }
        }
    }

    pub fn apply_energy_correction(&mut self, energy_correction_factor: f64) {
        for blow in &mut self.blows {
            blow.apply_energy_correction(energy_correction_factor);
        }
    }

    pub fn apply_corrections(&mut self, soil_profile: &SoilProfile, cs: f64, cb: f64, ce: f64) -> CalcResult<()> {
        for blow in &mut self.blows {
            blow.apply_corrections(soil_profile, cs, cb, ce)?;
        }
        Ok(())
    }

    /// The blow covering `depth` (first at or below it, else the last one).
    /// An empty borehole yields a blow with every field unset.
    pub fn get_blow_at_depth(&self, depth: f64) -> &SptBlow {
        record_at_depth(&self.blows, depth).unwrap_or(&EMPTY_BLOW)
    }

    pub fn validate(&self, fields: &[SptField]) -> CalcResult<()> {
        if self.blows.is_empty() {
            return Err(CalcError::empty_collection("spt.blows"));
        }
        for blow in &self.blows {
            blow.validate_fields(fields)?;
        }
        Ok(())
    }
}

/// Collection of SPT boreholes with shared correction factors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spt {
    pub exps: Vec<SptExp>,
    /// Ce, converts N to N60
    pub energy_correction_factor: Option<f64>,
    /// Cb
    pub diameter_correction_factor: Option<f64>,
    /// Cs
    pub sampler_correction_factor: Option<f64>,
    pub idealization_method: SelectionMethod,
}

impl Spt {
    pub fn new(
        energy_correction_factor: f64,
        diameter_correction_factor: f64,
        sampler_correction_factor: f64,
        idealization_method: SelectionMethod,
    ) -> Self {
        Spt {
            exps: Vec::new(),
            energy_correction_factor: Some(energy_correction_factor),
            diameter_correction_factor: Some(diameter_correction_factor),
            sampler_correction_factor: Some(sampler_correction_factor),
            idealization_method,
        }
    }

    pub fn add_exp(&mut self, exp: SptExp) {
        self.exps.push(exp);
    }

    pub fn apply_energy_correction(&mut self, energy_correction_factor: f64) {
        for exp in &mut self.exps {
            exp.apply_energy_correction(energy_correction_factor);
        }
    }

    /// The (Cs, Cb, Ce) correction factors, each required.
    pub fn correction_factors(&self) -> CalcResult<(f64, f64, f64)> {
        let required = |name: &str, value: Option<f64>| {
            value.ok_or_else(|| CalcError::missing_field(format!("spt.{}", name)))
        };
        Ok((
            required("sampler_correction_factor", self.sampler_correction_factor)?,
            required("diameter_correction_factor", self.diameter_correction_factor)?,
            required("energy_correction_factor", self.energy_correction_factor)?,
        ))
    }

    /// Apply the full correction chain to every borehole using this
    /// collection's factors.
    pub fn apply_corrections(&mut self, soil_profile: &SoilProfile) -> CalcResult<()> {
        let (cs, cb, ce) = self.correction_factors()?;
        for exp in &mut self.exps {
            exp.apply_corrections(soil_profile, cs, cb, ce)?;
        }
        Ok(())
    }

    /// Combine all boreholes into one.
    ///
    /// Blows are grouped by exact depth; a depth tested in only one borehole
    /// takes that borehole's count. Blows lacking a count are ignored. The
    /// result carries only depth and N, sorted by depth.
    pub fn get_idealized_exp(&self, name: impl Into<String>) -> SptExp {
        let name = name.into();
        if self.exps.is_empty() {
            warn!("SPT idealization '{}' has no boreholes", name);
            return SptExp::new(Vec::new(), name);
        }

        let idealizer = Idealizer::new(self.exps.iter().map(|e| e.blows.as_slice()), DepthMatch::Exact);
        let method = self.idealization_method;

        let blows: Vec<SptBlow> = idealizer
            .point_slices()
            .into_iter()
            .filter_map(|slice| {
                let counts: Vec<NValue> = slice.records.iter().filter_map(|b| b.n).collect();
                if counts.is_empty() {
                    return None;
                }
                Some(SptBlow::new(slice.depth, NValue::select(method, &counts)))
            })
            .collect();

        debug!(
            "SPT idealization '{}' ({}): {} boreholes -> {} blows",
            name,
            method,
            idealizer.experiment_count(),
            blows.len()
        );
        SptExp::new(blows, name)
    }

    /// Validate every borehole's blows and the three correction factors.
    pub fn validate(&self, fields: &[SptField]) -> CalcResult<()> {
        if self.exps.is_empty() {
            return Err(CalcError::empty_collection("spt.exps"));
        }
        for exp in &self.exps {
            exp.validate(fields)?;
        }

        let factor_bounds = Bounds::at_least(0.001);
        validate_scalar("spt.energy_correction_factor", self.energy_correction_factor, factor_bounds)?;
        validate_scalar("spt.diameter_correction_factor", self.diameter_correction_factor, factor_bounds)?;
        validate_scalar("spt.sampler_correction_factor", self.sampler_correction_factor, factor_bounds)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SoilLayer;
    use approx::assert_abs_diff_eq;

    fn sample_spt(method: SelectionMethod) -> Spt {
        let mut exp1 = SptExp::new(vec![], "exp1");
        exp1.add_blow(1.5, NValue::Finite(10));
        exp1.add_blow(2.0, NValue::Finite(20));
        exp1.add_blow(3.0, NValue::Refusal);

        let mut exp2 = SptExp::new(vec![], "exp2");
        exp2.add_blow(1.5, NValue::Finite(15));
        exp2.add_blow(3.0, NValue::Finite(14));

        let mut spt = Spt::new(1.2, 1.05, 0.9, method);
        spt.add_exp(exp1);
        spt.add_exp(exp2);
        spt
    }

    fn idealized_counts(spt: &Spt) -> Vec<(f64, NValue)> {
        spt.get_idealized_exp("idealized")
            .blows
            .iter()
            .map(|b| (b.depth.unwrap(), b.n.unwrap()))
            .collect()
    }

    #[test]
    fn test_blow_new() {
        let blow = SptBlow::new(10.0, NValue::Finite(25));
        assert_eq!(blow.depth, Some(10.0));
        assert_eq!(blow.n, Some(NValue::Finite(25)));
        assert!(blow.n60.is_none());
        assert!(blow.n1_60f.is_none());
        assert!(blow.cn.is_none());
    }

    #[test]
    fn test_apply_energy_correction() {
        let mut blow = SptBlow::new(10.0, NValue::Finite(25));
        blow.apply_energy_correction(1.2);
        assert_eq!(blow.n60, Some(NValue::Finite(30)));
        assert_eq!(blow.n90, Some(NValue::Finite(45)));
    }

    #[test]
    fn test_energy_correction_keeps_refusal() {
        let mut blow = SptBlow::new(3.0, NValue::Refusal);
        blow.apply_energy_correction(1.2);
        assert_eq!(blow.n60, Some(NValue::Refusal));
        assert_eq!(blow.n90, Some(NValue::Refusal));
    }

    #[test]
    fn test_set_cn() {
        let mut blow = SptBlow::new(10.0, NValue::Finite(25));
        blow.set_cn(0.5);
        let expected = ((1.0_f64 / (9.81 * 0.5)).sqrt() * 9.78).min(1.7);
        assert_abs_diff_eq!(blow.cn.unwrap(), expected, epsilon = 1e-12);

        // shallow blows hit the cap
        blow.set_cn(0.01);
        assert_eq!(blow.cn, Some(1.7));
    }

    #[test]
    fn test_set_cr() {
        let mut blow = SptBlow::default();
        blow.set_cr();
        assert_eq!(blow.cr, Some(1.0));

        for (depth, cr) in [(3.0, 0.75), (4.0, 0.75), (5.0, 0.85), (8.0, 0.95), (12.0, 1.0)] {
            blow.depth = Some(depth);
            blow.set_cr();
            assert_eq!(blow.cr, Some(cr), "depth {}", depth);
        }
    }

    #[test]
    fn test_set_alpha_beta() {
        let mut blow = SptBlow::new(10.0, NValue::Finite(25));

        blow.set_alpha_beta(4.0);
        assert_eq!(blow.alpha, Some(0.0));
        assert_eq!(blow.beta, Some(1.0));

        blow.set_alpha_beta(10.0);
        assert_abs_diff_eq!(blow.alpha.unwrap(), 0.869, epsilon = 0.001);
        assert_abs_diff_eq!(blow.beta.unwrap(), 1.0216, epsilon = 0.001);

        blow.set_alpha_beta(40.0);
        assert_eq!(blow.alpha, Some(5.0));
        assert_eq!(blow.beta, Some(1.2));
    }

    #[test]
    fn test_apply_corrections() {
        let mut layer = SoilLayer::new(10.0);
        layer.dry_unit_weight = Some(1.8);
        layer.saturated_unit_weight = Some(2.0);
        layer.fine_content = Some(10.0);
        let profile = SoilProfile::new(vec![layer], 10.0).unwrap();

        let mut blow = SptBlow::new(10.0, NValue::Finite(25));
        blow.apply_corrections(&profile, 0.9, 1.05, 1.2).unwrap();

        assert_eq!(blow.n60.unwrap().to_i32(), 30);
        assert_eq!(blow.n90.unwrap().to_i32(), 45);
        assert_abs_diff_eq!(blow.cn.unwrap(), 0.736, epsilon = 0.001);
        assert_eq!(blow.cr, Some(0.95));
        assert_abs_diff_eq!(blow.alpha.unwrap(), 0.869, epsilon = 0.001);
        // 30 * 0.736 * 0.95 * 0.9 * 1.05 = 19.8 -> 20
        assert_eq!(blow.n1_60.unwrap().to_i32(), 20);
        // 20 * 1.0216 = 20.4 -> 20, + 0.869 = 20.9 -> 21
        assert_eq!(blow.n1_60f.unwrap().to_i32(), 21);
    }

    #[test]
    fn test_apply_corrections_propagates_profile_errors() {
        let mut profile = SoilProfile::new(vec![SoilLayer::new(10.0)], 1.0).unwrap();
        profile.ground_water_level = None;
        let mut blow = SptBlow::new(2.0, NValue::Finite(12));
        assert!(blow.apply_corrections(&profile, 1.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn test_calc_thicknesses() {
        let mut exp = SptExp::new(vec![], "BH");
        exp.add_blow(1.5, NValue::Finite(8));
        exp.add_blow(3.0, NValue::Finite(12));
        exp.add_blow(4.5, NValue::Refusal);
        exp.calc_thicknesses();

        let thicknesses: Vec<f64> = exp.blows.iter().map(|b| b.thickness.unwrap()).collect();
        assert_eq!(thicknesses, vec![1.5, 1.5, 1.5]);
    }

    #[test]
    fn test_get_blow_at_depth() {
        let spt = sample_spt(SelectionMethod::Avg);
        let exp = &spt.exps[0];
        assert_eq!(exp.get_blow_at_depth(1.8).depth, Some(2.0));
        assert_eq!(exp.get_blow_at_depth(9.0).depth, Some(3.0));
        assert_eq!(SptExp::default().get_blow_at_depth(1.0), &SptBlow::default());
    }

    #[test]
    fn test_get_idealized_exp_min() {
        let spt = sample_spt(SelectionMethod::Min);
        assert_eq!(
            idealized_counts(&spt),
            vec![(1.5, NValue::Finite(10)), (2.0, NValue::Finite(20)), (3.0, NValue::Finite(14))]
        );
    }

    #[test]
    fn test_get_idealized_exp_avg() {
        let spt = sample_spt(SelectionMethod::Avg);
        assert_eq!(
            idealized_counts(&spt),
            vec![(1.5, NValue::Finite(13)), (2.0, NValue::Finite(20)), (3.0, NValue::Finite(32))]
        );
    }

    #[test]
    fn test_get_idealized_exp_max() {
        let spt = sample_spt(SelectionMethod::Max);
        assert_eq!(
            idealized_counts(&spt),
            vec![(1.5, NValue::Finite(15)), (2.0, NValue::Finite(20)), (3.0, NValue::Refusal)]
        );
    }

    #[test]
    fn test_min_over_uneven_boreholes() {
        let mut short = SptExp::new(vec![], "short");
        short.add_blow(1.5, NValue::Finite(10));
        short.add_blow(3.0, NValue::Finite(14));
        let mut long = SptExp::new(vec![], "long");
        long.add_blow(1.5, NValue::Finite(12));
        long.add_blow(3.0, NValue::Finite(8));
        long.add_blow(4.5, NValue::Finite(20));

        let mut spt = Spt::new(1.0, 1.0, 1.0, SelectionMethod::Min);
        spt.add_exp(short);
        spt.add_exp(long);
        assert_eq!(
            idealized_counts(&spt),
            vec![(1.5, NValue::Finite(10)), (3.0, NValue::Finite(8)), (4.5, NValue::Finite(20))]
        );
    }

    #[test]
    fn test_borehole_order_does_not_matter() {
        for method in [SelectionMethod::Min, SelectionMethod::Avg, SelectionMethod::Max] {
            let mut forward = sample_spt(method);
            let mut exp3 = SptExp::new(vec![], "exp3");
            exp3.add_blow(2.0, NValue::Finite(7));
            exp3.add_blow(4.5, NValue::Finite(33));
            forward.add_exp(exp3);

            let reference = idealized_counts(&forward);
            for order in [[2, 1, 0], [1, 2, 0], [0, 2, 1]] {
                let mut permuted = forward.clone();
                permuted.exps = order.iter().map(|&i| forward.exps[i].clone()).collect();
                assert_eq!(idealized_counts(&permuted), reference, "{}", method);
            }
        }
    }

    #[test]
    fn test_idealized_exp_name_and_fresh_records() {
        let spt = sample_spt(SelectionMethod::Min);
        let idealized = spt.get_idealized_exp("idealized_exp_min");
        assert_eq!(idealized.name, "idealized_exp_min");
        assert!(idealized.blows.iter().all(|b| b.n60.is_none()));
    }

    #[test]
    fn test_idealization_sorts_depths() {
        let mut exp1 = SptExp::new(vec![], "a");
        exp1.add_blow(4.5, NValue::Finite(30));
        exp1.add_blow(1.5, NValue::Finite(5));
        let mut spt = Spt::new(1.0, 1.0, 1.0, SelectionMethod::Avg);
        spt.add_exp(exp1);

        let depths: Vec<f64> = spt
            .get_idealized_exp("x")
            .blows
            .iter()
            .map(|b| b.depth.unwrap())
            .collect();
        assert_eq!(depths, vec![1.5, 4.5]);
    }

    #[test]
    fn test_single_exp_identity() {
        let source = vec![(1.5, NValue::Finite(10)), (2.0, NValue::Finite(20)), (3.0, NValue::Refusal)];
        for method in [SelectionMethod::Min, SelectionMethod::Avg, SelectionMethod::Max] {
            let mut spt = sample_spt(method);
            spt.exps.truncate(1);
            assert_eq!(idealized_counts(&spt), source, "{}", method);
        }
    }

    #[test]
    fn test_avg_refusal_survives_energy_correction() {
        let mut bh = SptExp::new(vec![], "BH");
        bh.add_blow(3.0, NValue::Refusal);
        let mut spt = Spt::new(1.2, 1.0, 1.0, SelectionMethod::Avg);
        spt.add_exp(bh);

        let mut idealized = spt.get_idealized_exp("idealized");
        assert_eq!(idealized.blows[0].n, Some(NValue::Refusal));
        idealized.apply_energy_correction(1.2);
        assert_eq!(idealized.blows[0].n60, Some(NValue::Refusal));
    }

    #[test]
    fn test_empty_collection_idealizes_to_empty_exp() {
        let spt = Spt::default();
        let idealized = spt.get_idealized_exp("empty");
        assert_eq!(idealized.name, "empty");
        assert!(idealized.blows.is_empty());
    }

    #[test]
    fn test_validate() {
        let spt = sample_spt(SelectionMethod::Avg);
        assert!(spt.validate(&[SptField::N, SptField::Depth]).is_ok());
        assert_eq!(
            spt.validate(&[SptField::N60]).unwrap_err(),
            CalcError::missing_field("spt.n60")
        );
    }

    #[test]
    fn test_validate_rejects_zero_count() {
        let mut spt = sample_spt(SelectionMethod::Avg);
        spt.exps[1].add_blow(4.5, NValue::Finite(0));
        let err = spt.validate(&[SptField::N]).unwrap_err();
        assert_eq!(err.error_code(), "OUT_OF_RANGE");
        assert_eq!(err.field(), Some("spt.n"));
    }

    #[test]
    fn test_validate_empty() {
        assert_eq!(
            Spt::default().validate(&[SptField::N]).unwrap_err().error_code(),
            "EMPTY_COLLECTION"
        );

        let mut spt = sample_spt(SelectionMethod::Avg);
        spt.add_exp(SptExp::new(vec![], "dry hole"));
        assert_eq!(
            spt.validate(&[SptField::N]).unwrap_err(),
            CalcError::empty_collection("spt.blows")
        );
    }

    #[test]
    fn test_validate_correction_factors() {
        let mut spt = sample_spt(SelectionMethod::Avg);
        spt.energy_correction_factor = Some(0.0);
        let err = spt.validate(&[SptField::N]).unwrap_err();
        assert_eq!(err.field(), Some("spt.energy_correction_factor"));

        spt.energy_correction_factor = None;
        assert!(spt.correction_factors().is_err());
    }

    #[test]
    fn test_deserialize_refusal_blows() {
        let json = r#"{
            "exps": [{ "name": "BH-1", "blows": [{ "depth": 1.5, "n": 12 }, { "depth": 3.0, "n": "R" }] }],
            "energy_correction_factor": 1.0,
            "diameter_correction_factor": 1.0,
            "sampler_correction_factor": 1.0,
            "idealization_method": "Max"
        }"#;
        let spt: Spt = serde_json::from_str(json).unwrap();
        assert_eq!(spt.idealization_method, SelectionMethod::Max);
        assert_eq!(spt.exps[0].blows[1].n, Some(NValue::Refusal));
    }
}
