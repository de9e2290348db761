//! Point Load Test samples grouped by borehole.
//!
//! Each sample pairs a size-corrected strength index (Is50) with the
//! equivalent core diameter it was measured on. Idealization keeps that
//! pairing for `Min`/`Max`: the selected sample's diameter travels with its
//! Is50. `Avg` averages both independently.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::idealization::{record_at_depth, DepthMatch, DepthRecord, Idealizer, SelectionMethod};
use crate::validation::{Bounds, FieldSpec, Validate};

static EMPTY_SAMPLE: PointLoadSample = PointLoadSample::empty();

/// One tested core sample
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLoadSample {
    /// Depth (m)
    pub depth: Option<f64>,
    pub sample_no: Option<u32>,
    /// Failure load (kN)
    pub p: Option<f64>,
    /// Uncorrected strength index (MPa)
    #[serde(rename = "is")]
    pub is_value: Option<f64>,
    /// Size correction factor
    pub f: Option<f64>,
    /// Strength index corrected to 50 mm (MPa)
    pub is50: Option<f64>,
    /// Distance between loading points (mm)
    pub l: Option<f64>,
    /// Equivalent core diameter (mm)
    pub d: Option<f64>,
}

impl PointLoadSample {
    pub fn new(depth: f64, is50: f64, d: f64) -> Self {
        PointLoadSample {
            depth: Some(depth),
            is50: Some(is50),
            d: Some(d),
            ..Default::default()
        }
    }

    const fn empty() -> Self {
        PointLoadSample {
            depth: None,
            sample_no: None,
            p: None,
            is_value: None,
            f: None,
            is50: None,
            l: None,
            d: None,
        }
    }

    fn is_paired(&self) -> bool {
        self.is50.is_some() && self.d.is_some()
    }
}

impl DepthRecord for PointLoadSample {
    fn depth(&self) -> Option<f64> {
        self.depth
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointLoadField {
    Depth,
    SampleNo,
    P,
    Is,
    F,
    Is50,
    L,
    D,
}

impl FieldSpec for PointLoadField {
    const SCOPE: &'static str = "point_load_test";

    fn name(&self) -> &'static str {
        match self {
            PointLoadField::Depth => "depth",
            PointLoadField::SampleNo => "sample_no",
            PointLoadField::P => "p",
            PointLoadField::Is => "is",
            PointLoadField::F => "f",
            PointLoadField::Is50 => "is50",
            PointLoadField::L => "l",
            PointLoadField::D => "d",
        }
    }

    fn bounds(&self) -> Bounds {
        match self {
            PointLoadField::Depth | PointLoadField::SampleNo => Bounds::at_least(0.0),
            PointLoadField::P => Bounds::at_least(0.0001),
            PointLoadField::Is
            | PointLoadField::F
            | PointLoadField::Is50
            | PointLoadField::L
            | PointLoadField::D => Bounds::at_least(0.00001),
        }
    }
}

impl Validate for PointLoadSample {
    type Field = PointLoadField;

    fn field_value(&self, field: PointLoadField) -> Option<f64> {
        match field {
            PointLoadField::Depth => self.depth,
            PointLoadField::SampleNo => self.sample_no.map(f64::from),
            PointLoadField::P => self.p,
            PointLoadField::Is => self.is_value,
            PointLoadField::F => self.f,
            PointLoadField::Is50 => self.is50,
            PointLoadField::L => self.l,
            PointLoadField::D => self.d,
        }
    }
}

/// Samples from one borehole
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLoadExp {
    pub borehole_id: String,
    pub samples: Vec<PointLoadSample>,
}

impl PointLoadExp {
    pub fn new(borehole_id: impl Into<String>, samples: Vec<PointLoadSample>) -> Self {
        PointLoadExp {
            borehole_id: borehole_id.into(),
            samples,
        }
    }

    pub fn add_sample(&mut self, sample: PointLoadSample) {
        self.samples.push(sample);
    }

    /// The sample covering `depth`. An empty borehole yields a sample with
    /// every field unset.
    pub fn get_sample_at_depth(&self, depth: f64) -> &PointLoadSample {
        record_at_depth(&self.samples, depth).unwrap_or(&EMPTY_SAMPLE)
    }

    pub fn validate(&self, fields: &[PointLoadField]) -> CalcResult<()> {
        if self.samples.is_empty() {
            return Err(CalcError::empty_collection("point_load_test.samples"));
        }
        for sample in &self.samples {
            sample.validate_fields(fields)?;
        }
        Ok(())
    }
}

/// A point load testing campaign over several boreholes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLoadTest {
    pub exps: Vec<PointLoadExp>,
    pub idealization_method: SelectionMethod,
}

impl PointLoadTest {
    pub fn new(exps: Vec<PointLoadExp>, idealization_method: SelectionMethod) -> Self {
        PointLoadTest {
            exps,
            idealization_method,
        }
    }

    pub fn add_borehole(&mut self, exp: PointLoadExp) {
        self.exps.push(exp);
    }

    /// Combine all boreholes, grouping samples by exact depth. Samples
    /// missing either Is50 or d are ignored.
    pub fn get_idealized_exp(&self, name: impl Into<String>) -> PointLoadExp {
        let name = name.into();
        if self.exps.is_empty() {
            warn!("Point load idealization '{}' has no boreholes", name);
            return PointLoadExp::new(name, Vec::new());
        }

        let method = self.idealization_method;
        let idealizer = Idealizer::new(self.exps.iter().map(|e| e.samples.as_slice()), DepthMatch::Exact);

        let samples: Vec<PointLoadSample> = idealizer
            .point_slices()
            .into_iter()
            .filter_map(|slice| {
                let paired: Vec<&PointLoadSample> =
                    slice.records.into_iter().filter(|s| s.is_paired()).collect();
                if paired.is_empty() {
                    return None;
                }
                let (is50, d) = match method.pick_record(&paired, |s| s.is50) {
                    Some(sample) => (sample.is50.unwrap_or_default(), sample.d.unwrap_or_default()),
                    None => (
                        method.reduce_channel(&paired, |s| s.is50),
                        method.reduce_channel(&paired, |s| s.d),
                    ),
                };
                Some(PointLoadSample::new(slice.depth, is50, d))
            })
            .collect();

        debug!(
            "Point load idealization '{}' ({}): {} boreholes -> {} samples",
            name,
            method,
            idealizer.experiment_count(),
            samples.len()
        );
        PointLoadExp::new(name, samples)
    }

    pub fn validate(&self, fields: &[PointLoadField]) -> CalcResult<()> {
        if self.exps.is_empty() {
            return Err(CalcError::empty_collection("point_load_test.exps"));
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
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn test_data(method: SelectionMethod) -> PointLoadTest {
        let sk1 = PointLoadExp::new(
            "Borehole1",
            vec![PointLoadSample::new(1.5, 2.67, 50.0), PointLoadSample::new(3.0, 2.38, 50.0)],
        );
        let sk2 = PointLoadExp::new(
            "Borehole2",
            vec![PointLoadSample::new(1.5, 2.66, 50.0), PointLoadSample::new(3.0, 2.96, 50.0)],
        );
        let sk3 = PointLoadExp::new(
            "Borehole3",
            vec![PointLoadSample::new(3.0, 2.53, 50.0), PointLoadSample::new(4.5, 2.84, 50.0)],
        );
        PointLoadTest::new(vec![sk1, sk2, sk3], method)
    }

    fn is50_by_depth(ideal: &PointLoadExp) -> Vec<(f64, f64)> {
        ideal
            .samples
            .iter()
            .map(|s| (s.depth.unwrap(), s.is50.unwrap()))
            .collect()
    }

    #[test]
    fn test_get_sample_at_depth() {
        let data = test_data(SelectionMethod::Min);
        let exp = &data.exps[0];

        let sample = exp.get_sample_at_depth(1.5);
        assert_eq!((sample.depth, sample.is50), (Some(1.5), Some(2.67)));

        let sample = exp.get_sample_at_depth(2.0);
        assert_eq!((sample.depth, sample.is50), (Some(3.0), Some(2.38)));

        let sample = exp.get_sample_at_depth(4.0);
        assert_eq!((sample.depth, sample.is50), (Some(3.0), Some(2.38)));
    }

    #[test]
    fn test_get_sample_at_depth_empty() {
        let exp = PointLoadExp::new("empty", vec![]);
        assert_eq!(exp.get_sample_at_depth(1.0), &PointLoadSample::default());
    }

    #[test]
    fn test_get_idealized_exp_min() {
        let ideal = test_data(SelectionMethod::Min).get_idealized_exp("Ideal_Min");
        assert_eq!(ideal.borehole_id, "Ideal_Min");
        assert_eq!(is50_by_depth(&ideal), vec![(1.5, 2.66), (3.0, 2.38), (4.5, 2.84)]);
        assert!(ideal.samples.iter().all(|s| s.d == Some(50.0)));
    }

    #[test]
    fn test_get_idealized_exp_avg() {
        let ideal = test_data(SelectionMethod::Avg).get_idealized_exp("Ideal_Avg");
        assert_eq!(ideal.samples.len(), 3);
        assert_abs_diff_eq!(ideal.samples[0].is50.unwrap(), 2.665, epsilon = 1e-6);
        assert_abs_diff_eq!(ideal.samples[1].is50.unwrap(), 2.623, epsilon = 1e-3);
        assert_abs_diff_eq!(ideal.samples[1].d.unwrap(), 50.0, epsilon = 1e-6);
        assert_eq!(ideal.samples[2].depth, Some(4.5));
    }

    #[test]
    fn test_get_idealized_exp_max() {
        let ideal = test_data(SelectionMethod::Max).get_idealized_exp("Ideal_Max");
        assert_eq!(is50_by_depth(&ideal), vec![(1.5, 2.67), (3.0, 2.96), (4.5, 2.84)]);
    }

    #[test]
    fn test_min_keeps_diameter_of_selected_sample() {
        let a = PointLoadExp::new("A", vec![PointLoadSample::new(2.0, 3.1, 54.0)]);
        let b = PointLoadExp::new("B", vec![PointLoadSample::new(2.0, 2.2, 42.0)]);

        let mut test = PointLoadTest::new(vec![a, b], SelectionMethod::Min);
        let ideal = test.get_idealized_exp("min");
        assert_eq!(ideal.samples[0].d, Some(42.0));

        test.idealization_method = SelectionMethod::Max;
        let ideal = test.get_idealized_exp("max");
        assert_eq!(ideal.samples[0].d, Some(54.0));

        test.idealization_method = SelectionMethod::Avg;
        let ideal = test.get_idealized_exp("avg");
        assert_abs_diff_eq!(ideal.samples[0].d.unwrap(), 48.0, epsilon = 1e-9);
    }

    #[test]
    fn test_repeated_depth_within_borehole() {
        let exp = PointLoadExp::new(
            "BH-1",
            vec![PointLoadSample::new(5.0, 1.0, 50.0), PointLoadSample::new(5.0, 3.0, 44.0)],
        );
        let mut test = PointLoadTest::new(vec![exp], SelectionMethod::Max);
        let ideal = test.get_idealized_exp("max");
        assert_eq!(ideal.samples.len(), 1);
        assert_eq!(ideal.samples[0].is50, Some(3.0));
        assert_eq!(ideal.samples[0].d, Some(44.0));

        test.idealization_method = SelectionMethod::Avg;
        let ideal = test.get_idealized_exp("avg");
        assert_abs_diff_eq!(ideal.samples[0].is50.unwrap(), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ideal.samples[0].d.unwrap(), 47.0, epsilon = 1e-12);
    }

    #[test]
    fn test_borehole_order_does_not_matter() {
        for method in [SelectionMethod::Min, SelectionMethod::Avg, SelectionMethod::Max] {
            let forward = test_data(method);
            let reference = forward.get_idealized_exp("x");
            for order in [[2, 1, 0], [1, 2, 0], [0, 2, 1]] {
                let exps = order.iter().map(|&i| forward.exps[i].clone()).collect();
                let permuted = PointLoadTest::new(exps, method).get_idealized_exp("x");
                assert_eq!(permuted.samples.len(), reference.samples.len());
                for (a, b) in permuted.samples.iter().zip(&reference.samples) {
                    assert_eq!(a.depth, b.depth);
                    if method == SelectionMethod::Avg {
                        assert_relative_eq!(a.is50.unwrap(), b.is50.unwrap(), max_relative = 1e-12);
                        assert_relative_eq!(a.d.unwrap(), b.d.unwrap(), max_relative = 1e-12);
                    } else {
                        assert_eq!(a, b);
                    }
                }
            }
        }
    }

    #[test]
    fn test_unpaired_samples_ignored() {
        let mut exp = PointLoadExp::new("A", vec![PointLoadSample::new(1.0, 2.0, 50.0)]);
        exp.add_sample(PointLoadSample {
            depth: Some(2.0),
            is50: Some(4.0),
            ..Default::default()
        });
        let test = PointLoadTest::new(vec![exp], SelectionMethod::Avg);
        let ideal = test.get_idealized_exp("x");
        assert_eq!(ideal.samples.len(), 1);
        assert_eq!(ideal.samples[0].depth, Some(1.0));
    }

    #[test]
    fn test_add_borehole() {
        let mut test = PointLoadTest::default();
        test.add_borehole(PointLoadExp::new("BH-1", vec![PointLoadSample::new(1.0, 2.0, 50.0)]));
        assert_eq!(test.exps.len(), 1);
        assert_eq!(test.idealization_method, SelectionMethod::Avg);
    }

    #[test]
    fn test_empty_collection() {
        let ideal = PointLoadTest::default().get_idealized_exp("none");
        assert_eq!(ideal.borehole_id, "none");
        assert!(ideal.samples.is_empty());
    }

    #[test]
    fn test_validate() {
        let data = test_data(SelectionMethod::Avg);
        assert!(data
            .validate(&[PointLoadField::Depth, PointLoadField::Is50, PointLoadField::D])
            .is_ok());
        assert_eq!(
            data.validate(&[PointLoadField::P]).unwrap_err(),
            CalcError::missing_field("point_load_test.p")
        );
    }

    #[test]
    fn test_is_field_json_name() {
        let sample: PointLoadSample = serde_json::from_str(r#"{ "depth": 1.0, "is": 1.8 }"#).unwrap();
        assert_eq!(sample.is_value, Some(1.8));
    }
}
