//! # Test Idealization
//!
//! Combines several field experiments of one test type (SPT, CPT, MASW,
//! point load) into a single representative profile.
//!
//! ## Algorithm
//!
//! 1. Union the distinct record depths of every experiment (plus the surface
//!    for interval-style tests) and sort ascending.
//! 2. At each depth, gather one record per experiment using a [`DepthMatch`]
//!    rule.
//! 3. Reduce each measurement channel over the gathered records with the
//!    collection's [`SelectionMethod`]. A channel with no data reduces to 0.0.
//!
//! Point-style tests emit one record per depth. Interval-style tests (MASW)
//! emit one record per pair of consecutive depths, sampling each experiment
//! at the interval midpoint.
//!
//! ## Example
//!
//! ```rust
//! use soil_core::idealization::SelectionMethod;
//!
//! let values = [160.0, 150.0, 170.0];
//! assert_eq!(SelectionMethod::Min.reduce(&values), 150.0);
//! assert_eq!(SelectionMethod::Avg.reduce(&values), 160.0);
//! assert_eq!(SelectionMethod::Max.reduce(&values), 170.0);
//! assert_eq!(SelectionMethod::Max.reduce(&[]), 0.0);
//! ```

use serde::{Deserialize, Serialize};

/// Rule for picking the representative value at a depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SelectionMethod {
    /// Smallest value (conservative)
    Min,
    /// Arithmetic mean
    #[default]
    Avg,
    /// Largest value
    Max,
}

impl SelectionMethod {
    /// Short code
    pub fn code(&self) -> &'static str {
        match self {
            SelectionMethod::Min => "Min",
            SelectionMethod::Avg => "Avg",
            SelectionMethod::Max => "Max",
        }
    }

    /// Reduce a set of channel values. Empty input yields 0.0.
    pub fn reduce(&self, values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        match self {
            SelectionMethod::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
            SelectionMethod::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            SelectionMethod::Avg => values.iter().sum::<f64>() / values.len() as f64,
        }
    }

    /// Reduce one channel over a set of records, skipping records where the
    /// channel is absent.
    pub fn reduce_channel<T>(&self, records: &[&T], channel: impl Fn(&T) -> Option<f64>) -> f64 {
        let values: Vec<f64> = records.iter().filter_map(|r| channel(r)).collect();
        self.reduce(&values)
    }

    /// For `Min`/`Max`, the whole record holding the extreme `key` value.
    /// Returns `None` for `Avg` or when no record has the key.
    ///
    /// Used where channels are paired and must come from the same sample.
    pub fn pick_record<'a, T>(&self, records: &[&'a T], key: impl Fn(&T) -> Option<f64>) -> Option<&'a T> {
        let keyed = records.iter().filter_map(|&r| key(r).map(|k| (k, r)));
        match self {
            SelectionMethod::Min => keyed.min_by(|a, b| a.0.total_cmp(&b.0)).map(|(_, r)| r),
            SelectionMethod::Max => keyed.max_by(|a, b| a.0.total_cmp(&b.0)).map(|(_, r)| r),
            SelectionMethod::Avg => None,
        }
    }
}

impl std::fmt::Display for SelectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A record positioned at a depth (m) below the surface.
pub trait DepthRecord {
    fn depth(&self) -> Option<f64>;
}

/// First record whose depth is at or below `depth`, else the last record.
///
/// Records without a depth are skipped by the scan. `None` only for an empty
/// slice.
pub fn record_at_depth<T: DepthRecord>(records: &[T], depth: f64) -> Option<&T> {
    records
        .iter()
        .find(|r| r.depth().is_some_and(|d| d >= depth))
        .or_else(|| records.last())
}

/// How each experiment contributes a record at a union depth
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepthMatch {
    /// Every record recorded at exactly that depth
    Exact,
    /// The record covering that depth (see [`record_at_depth`])
    Covering,
}

/// One union depth with the records gathered from every experiment
#[derive(Debug)]
pub struct DepthSlice<'a, T> {
    pub depth: f64,
    pub records: Vec<&'a T>,
}

/// One interval of the union grid with records sampled at its midpoint
#[derive(Debug)]
pub struct IntervalSlice<'a, T> {
    pub top: f64,
    pub bottom: f64,
    pub records: Vec<&'a T>,
}

impl<T> IntervalSlice<'_, T> {
    pub fn thickness(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn midpoint(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }
}

/// Gathers records from several experiments on a shared depth grid.
///
/// Borrows the experiments' record slices; the idealized output is always
/// built from fresh records by the caller.
#[derive(Debug)]
pub struct Idealizer<'a, T> {
    experiments: Vec<&'a [T]>,
    matching: DepthMatch,
}

impl<'a, T: DepthRecord> Idealizer<'a, T> {
    pub fn new(experiments: impl IntoIterator<Item = &'a [T]>, matching: DepthMatch) -> Self {
        Idealizer {
            experiments: experiments.into_iter().collect(),
            matching,
        }
    }

    /// Number of source experiments
    pub fn experiment_count(&self) -> usize {
        self.experiments.len()
    }

    /// Sorted, deduplicated union of all record depths.
    pub fn union_depths(&self, include_surface: bool) -> Vec<f64> {
        let mut depths: Vec<f64> = self
            .experiments
            .iter()
            .flat_map(|records| records.iter().filter_map(T::depth))
            .filter(|d| d.is_finite())
            .collect();
        if include_surface {
            depths.push(0.0);
        }
        depths.sort_by(f64::total_cmp);
        depths.dedup();
        depths
    }

    /// Records from every experiment for the query depth. Covering takes at
    /// most one record per experiment; Exact takes all records at the depth,
    /// so repeated samples within one borehole are kept.
    pub fn gather(&self, depth: f64) -> Vec<&'a T> {
        let mut gathered = Vec::with_capacity(self.experiments.len());
        for &records in &self.experiments {
            match self.matching {
                DepthMatch::Covering => gathered.extend(record_at_depth(records, depth)),
                DepthMatch::Exact => gathered.extend(records.iter().filter(|r| r.depth() == Some(depth))),
            }
        }
        gathered
    }

    /// Point-style gathering: one slice per union depth.
    pub fn point_slices(&self) -> Vec<DepthSlice<'a, T>> {
        self.union_depths(false)
            .into_iter()
            .map(|depth| DepthSlice {
                depth,
                records: self.gather(depth),
            })
            .collect()
    }

    /// Interval-style gathering: one slice per consecutive pair of union
    /// depths, surface included, sampled at the interval midpoint.
    pub fn interval_slices(&self) -> Vec<IntervalSlice<'a, T>> {
        self.union_depths(true)
            .windows(2)
            .map(|pair| {
                let (top, bottom) = (pair[0], pair[1]);
                IntervalSlice {
                    top,
                    bottom,
                    records: self.gather((top + bottom) / 2.0),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[derive(Debug, PartialEq)]
    struct Reading {
        depth: Option<f64>,
        value: Option<f64>,
    }

    impl DepthRecord for Reading {
        fn depth(&self) -> Option<f64> {
            self.depth
        }
    }

    fn reading(depth: f64, value: f64) -> Reading {
        Reading {
            depth: Some(depth),
            value: Some(value),
        }
    }

    #[test]
    fn test_reduce_each_method() {
        let values = [4.0, 1.0, 7.0];
        assert_eq!(SelectionMethod::Min.reduce(&values), 1.0);
        assert_eq!(SelectionMethod::Max.reduce(&values), 7.0);
        assert_relative_eq!(SelectionMethod::Avg.reduce(&values), 4.0);
    }

    #[test]
    fn test_reduce_empty_is_zero() {
        for method in [SelectionMethod::Min, SelectionMethod::Avg, SelectionMethod::Max] {
            assert_eq!(method.reduce(&[]), 0.0);
        }
    }

    #[test]
    fn test_reduce_channel_skips_missing() {
        let a = reading(1.0, 10.0);
        let b = Reading {
            depth: Some(1.0),
            value: None,
        };
        let records = [&a, &b];
        assert_eq!(SelectionMethod::Avg.reduce_channel(&records, |r| r.value), 10.0);
    }

    #[test]
    fn test_pick_record() {
        let a = reading(1.0, 3.0);
        let b = reading(1.0, 2.0);
        let records = [&a, &b];
        assert_eq!(SelectionMethod::Min.pick_record(&records, |r| r.value), Some(&b));
        assert_eq!(SelectionMethod::Max.pick_record(&records, |r| r.value), Some(&a));
        assert_eq!(SelectionMethod::Avg.pick_record(&records, |r| r.value), None);
    }

    #[test]
    fn test_record_at_depth() {
        let records = vec![reading(1.0, 10.0), reading(2.0, 11.0), reading(3.0, 12.0)];
        assert_eq!(record_at_depth(&records, 2.0).unwrap().depth, Some(2.0));
        assert_eq!(record_at_depth(&records, 2.5).unwrap().depth, Some(3.0));
        assert_eq!(record_at_depth(&records, 5.0).unwrap().depth, Some(3.0));
        assert_eq!(record_at_depth(&records, 0.0).unwrap().depth, Some(1.0));
        assert!(record_at_depth::<Reading>(&[], 1.0).is_none());
    }

    #[test]
    fn test_union_depths_sorted_and_unique() {
        let a = vec![reading(3.0, 1.0), reading(1.5, 1.0)];
        let b = vec![reading(1.5, 1.0), reading(4.5, 1.0)];
        let idealizer = Idealizer::new([a.as_slice(), b.as_slice()], DepthMatch::Exact);

        assert_eq!(idealizer.union_depths(false), vec![1.5, 3.0, 4.5]);
        assert_eq!(idealizer.union_depths(true), vec![0.0, 1.5, 3.0, 4.5]);
    }

    #[test]
    fn test_exact_vs_covering_gather() {
        let a = vec![reading(1.5, 10.0), reading(3.0, 20.0)];
        let b = vec![reading(2.0, 30.0)];

        let exact = Idealizer::new([a.as_slice(), b.as_slice()], DepthMatch::Exact);
        assert_eq!(exact.gather(2.0).len(), 1);

        let covering = Idealizer::new([a.as_slice(), b.as_slice()], DepthMatch::Covering);
        let gathered = covering.gather(2.0);
        assert_eq!(gathered.len(), 2);
        assert_eq!(gathered[0].value, Some(20.0));
        assert_eq!(gathered[1].value, Some(30.0));
    }

    #[test]
    fn test_exact_gather_keeps_repeated_depths() {
        let a = vec![reading(5.0, 1.0), reading(5.0, 3.0)];
        let b = vec![reading(5.0, 2.0)];
        let idealizer = Idealizer::new([a.as_slice(), b.as_slice()], DepthMatch::Exact);

        let slices = idealizer.point_slices();
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].records.len(), 3);
        assert_eq!(SelectionMethod::Max.reduce_channel(&slices[0].records, |r| r.value), 3.0);
    }

    #[test]
    fn test_interval_slices() {
        let a = vec![reading(2.0, 180.0), reading(5.0, 200.0)];
        let b = vec![reading(1.5, 170.0), reading(5.5, 190.0)];
        let idealizer = Idealizer::new([a.as_slice(), b.as_slice()], DepthMatch::Covering);

        let slices = idealizer.interval_slices();
        let bounds: Vec<(f64, f64)> = slices.iter().map(|s| (s.top, s.bottom)).collect();
        assert_eq!(bounds, vec![(0.0, 1.5), (1.5, 2.0), (2.0, 5.0), (5.0, 5.5)]);
        assert_relative_eq!(slices[0].thickness(), 1.5);
        assert_relative_eq!(slices[0].midpoint(), 0.75);
        // 0.75 m falls in the first layer of both experiments
        let values: Vec<_> = slices[0].records.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![Some(180.0), Some(170.0)]);
    }

    #[test]
    fn test_order_independence() {
        let a = vec![reading(1.0, 5.0), reading(2.0, 9.0)];
        let b = vec![reading(1.5, 7.0)];
        let forward = Idealizer::new([a.as_slice(), b.as_slice()], DepthMatch::Covering);
        let backward = Idealizer::new([b.as_slice(), a.as_slice()], DepthMatch::Covering);

        for method in [SelectionMethod::Min, SelectionMethod::Avg, SelectionMethod::Max] {
            let lhs: Vec<(f64, f64)> = forward
                .point_slices()
                .iter()
                .map(|s| (s.depth, method.reduce_channel(&s.records, |r| r.value)))
                .collect();
            let rhs: Vec<(f64, f64)> = backward
                .point_slices()
                .iter()
                .map(|s| (s.depth, method.reduce_channel(&s.records, |r| r.value)))
                .collect();
            assert_eq!(lhs, rhs);
        }
    }
}
