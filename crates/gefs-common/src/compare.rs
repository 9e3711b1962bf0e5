//! Agreement statistics between two aligned driver series.
//!
//! Used to check that dynamical.org values line up with the existing EFI
//! stage products before switching a pipeline over.

use serde::{Deserialize, Serialize};

/// Summary of the differences between two equally-indexed series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesComparison {
    /// Number of index positions where both values are present.
    pub n: usize,
    pub mean_diff: f64,
    /// Population standard deviation of the differences.
    pub std_diff: f64,
    pub max_abs_diff: f64,
    /// Pearson correlation; NaN with fewer than two pairs or zero variance.
    pub correlation: f64,
    pub candidate_mean: f64,
    pub reference_mean: f64,
}

impl SeriesComparison {
    /// Compare `candidate` against `reference`, skipping pairs where either is NaN.
    ///
    /// Returns `None` when the series lengths differ or no pair survives.
    pub fn compute(candidate: &[f64], reference: &[f64]) -> Option<Self> {
        if candidate.len() != reference.len() {
            return None;
        }

        let pairs: Vec<(f64, f64)> = candidate
            .iter()
            .zip(reference)
            .map(|(&c, &r)| (c, r))
            .filter(|(c, r)| !(c - r).is_nan())
            .collect();

        if pairs.is_empty() {
            return None;
        }

        let n = pairs.len() as f64;
        let diffs: Vec<f64> = pairs.iter().map(|(c, r)| c - r).collect();
        let mean_diff = diffs.iter().sum::<f64>() / n;
        let std_diff = (diffs.iter().map(|d| (d - mean_diff).powi(2)).sum::<f64>() / n).sqrt();
        let max_abs_diff = diffs.iter().fold(0.0_f64, |acc, d| acc.max(d.abs()));

        let candidate_mean = pairs.iter().map(|(c, _)| c).sum::<f64>() / n;
        let reference_mean = pairs.iter().map(|(_, r)| r).sum::<f64>() / n;

        Some(Self {
            n: pairs.len(),
            mean_diff,
            std_diff,
            max_abs_diff,
            correlation: pearson(&pairs, candidate_mean, reference_mean),
            candidate_mean,
            reference_mean,
        })
    }

    /// Mean bias under one unit and correlation above 0.9.
    pub fn is_acceptable(&self) -> bool {
        self.mean_diff.abs() < 1.0 && self.correlation > 0.9
    }
}

fn pearson(pairs: &[(f64, f64)], mean_a: f64, mean_b: f64) -> f64 {
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (a, b) in pairs {
        cov += (a - mean_a) * (b - mean_b);
        var_a += (a - mean_a).powi(2);
        var_b += (b - mean_b).powi(2);
    }

    cov / (var_a * var_b).sqrt()
}
