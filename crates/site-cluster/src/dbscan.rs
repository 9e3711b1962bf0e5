//! Density-based clustering (DBSCAN) over an arbitrary distance metric.
//!
//! Neighbourhoods are found by brute force, O(n²) distance evaluations.

use std::collections::VecDeque;

use crate::error::{Result, SubsetError};

/// DBSCAN parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dbscan {
    /// Neighbourhood radius, in the metric's units. Points at exactly `eps`
    /// are neighbours.
    eps: f64,
    /// Neighbourhood size (including the point itself) for a core point.
    min_samples: usize,
}

impl Dbscan {
    pub fn new(eps: f64, min_samples: usize) -> Result<Self> {
        if !eps.is_finite() || eps <= 0.0 {
            return Err(SubsetError::invalid_input(format!(
                "eps must be a positive finite number, got {}",
                eps
            )));
        }
        if min_samples == 0 {
            return Err(SubsetError::invalid_input("min_samples must be >= 1"));
        }
        Ok(Self { eps, min_samples })
    }

    pub fn eps(&self) -> f64 {
        self.eps
    }

    pub fn min_samples(&self) -> usize {
        self.min_samples
    }

    /// Cluster `points`, returning one label per point.
    ///
    /// Labels are dense and numbered in order of discovery. `None` marks
    /// noise, which can only occur when `min_samples > 1`.
    pub fn fit_predict<P, M>(&self, points: &[P], metric: M) -> Result<Vec<Option<usize>>>
    where
        M: Fn(&P, &P) -> f64,
    {
        let n = points.len();
        let mut labels: Vec<Option<usize>> = vec![None; n];
        let mut visited = vec![false; n];
        let mut next_label = 0;

        let region = |i: usize| -> Result<Vec<usize>> {
            let mut neighbours = Vec::new();
            for (j, other) in points.iter().enumerate() {
                let d = metric(&points[i], other);
                if d.is_nan() {
                    return Err(SubsetError::clustering(format!(
                        "distance between points {} and {} is not a number",
                        i, j
                    )));
                }
                if d <= self.eps {
                    neighbours.push(j);
                }
            }
            Ok(neighbours)
        };

        for i in 0..n {
            if visited[i] {
                continue;
            }
            visited[i] = true;

            let neighbours = region(i)?;
            if neighbours.len() < self.min_samples {
                continue;
            }

            let label = next_label;
            next_label += 1;
            labels[i] = Some(label);

            let mut queue: VecDeque<usize> = neighbours.into();
            while let Some(j) = queue.pop_front() {
                if labels[j].is_none() {
                    labels[j] = Some(label);
                }
                if visited[j] {
                    continue;
                }
                visited[j] = true;

                let expansion = region(j)?;
                if expansion.len() >= self.min_samples {
                    queue.extend(expansion);
                }
            }
        }

        Ok(labels)
    }
}
