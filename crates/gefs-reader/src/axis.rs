//! Monotonic coordinate axes with value-range selection and nearest lookup.

use std::ops::Range;

use crate::error::{ReaderError, Result};

/// Longitude convention of a grid's longitude axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LongitudeConvention {
    /// [-180, 180)
    Signed,
    /// [0, 360)
    Positive,
}

impl LongitudeConvention {
    /// Map a [-180, 180] longitude onto this convention.
    pub fn normalize(&self, lon: f64) -> f64 {
        match self {
            LongitudeConvention::Signed => lon,
            LongitudeConvention::Positive if lon < 0.0 => lon + 360.0,
            LongitudeConvention::Positive => lon,
        }
    }
}

/// A strictly monotonic 1-D coordinate (ascending or descending).
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateAxis {
    name: String,
    values: Vec<f64>,
    descending: bool,
}

impl CoordinateAxis {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if values.is_empty() {
            return Err(ReaderError::invalid_metadata(format!(
                "coordinate '{}' is empty",
                name
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ReaderError::invalid_metadata(format!(
                "coordinate '{}' contains non-finite values",
                name
            )));
        }

        let descending = values.len() > 1 && values[1] < values[0];
        let monotonic = values.windows(2).all(|w| {
            if descending {
                w[1] < w[0]
            } else {
                w[1] > w[0]
            }
        });
        if !monotonic {
            return Err(ReaderError::invalid_metadata(format!(
                "coordinate '{}' is not strictly monotonic",
                name
            )));
        }

        Ok(Self {
            name,
            values,
            descending,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_descending(&self) -> bool {
        self.descending
    }

    pub fn min_value(&self) -> f64 {
        if self.descending {
            self.values[self.values.len() - 1]
        } else {
            self.values[0]
        }
    }

    pub fn max_value(&self) -> f64 {
        if self.descending {
            self.values[0]
        } else {
            self.values[self.values.len() - 1]
        }
    }

    /// Longitude convention, inferred from the axis extent.
    pub fn longitude_convention(&self) -> LongitudeConvention {
        if self.max_value() > 180.0 {
            LongitudeConvention::Positive
        } else {
            LongitudeConvention::Signed
        }
    }

    /// Index range covering the values in `[min, max]`.
    ///
    /// The range is widened by one grid point on each side whose edge value
    /// does not fall exactly on the bound, so the grid points bracketing the
    /// bounds are always included. A box falling between two neighbouring
    /// points yields that pair. Returns `None` when the box lies entirely
    /// beyond the axis.
    pub fn index_range(&self, min: f64, max: f64) -> Option<Range<usize>> {
        if min > max || max < self.min_value() || min > self.max_value() {
            return None;
        }

        let n = self.values.len();
        let first = self.values.iter().position(|v| *v >= min && *v <= max);
        let last = self.values.iter().rposition(|v| *v >= min && *v <= max);

        let (mut start, mut end) = match (first, last) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                // Box lies strictly between two neighbouring points.
                let i = self.values.windows(2).position(|w| {
                    let (lo, hi) = if w[0] < w[1] { (w[0], w[1]) } else { (w[1], w[0]) };
                    lo < min && max < hi
                })?;
                return Some(i..i + 2);
            }
        };

        let (start_bound, end_bound) = if self.descending { (max, min) } else { (min, max) };
        if start > 0 && self.values[start] != start_bound {
            start -= 1;
        }
        if end + 1 < n && self.values[end] != end_bound {
            end += 1;
        }

        Some(start..end + 1)
    }

    /// Index of the value nearest to `target` within `range`.
    ///
    /// Ties resolve to the lower index.
    pub fn nearest_index_in(&self, range: Range<usize>, target: f64) -> Option<usize> {
        self.nearest_by(range, |value| (value - target).abs())
    }

    /// Like [`CoordinateAxis::nearest_index_in`], with distances measured
    /// around the 360° circle so 359.7 is 0.3° from 0.
    pub fn nearest_longitude_index_in(&self, range: Range<usize>, target: f64) -> Option<usize> {
        self.nearest_by(range, |value| longitude_distance(value, target))
    }

    /// Distance from the grid point at `index` to its neighbour; `None` for a
    /// single-point axis.
    pub fn spacing_at(&self, index: usize) -> Option<f64> {
        let neighbour = if index + 1 < self.values.len() {
            index + 1
        } else {
            index.checked_sub(1)?
        };
        Some((self.values.get(neighbour)? - self.values.get(index)?).abs())
    }

    fn nearest_by(&self, range: Range<usize>, distance: impl Fn(f64) -> f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for i in range {
            let value = *self.values.get(i)?;
            let distance = distance(value);
            match best {
                Some((_, d)) if distance >= d => {}
                _ => best = Some((i, distance)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Index of the value nearest to `target` over the whole axis.
    pub fn nearest_index(&self, target: f64) -> usize {
        self.nearest_index_in(0..self.values.len(), target)
            .unwrap_or(0)
    }
}

/// Angular separation of two longitudes in degrees, in `[0, 180]`.
pub fn longitude_distance(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Index range over a longitude axis for a box given in [-180, 180] degrees.
///
/// On a 0–360 axis a box that straddles the prime meridian maps to two
/// disjoint runs; the full axis is selected instead.
pub fn longitude_range(axis: &CoordinateAxis, min_lon: f64, max_lon: f64) -> Option<Range<usize>> {
    let convention = axis.longitude_convention();
    let (min, max) = (convention.normalize(min_lon), convention.normalize(max_lon));

    if convention == LongitudeConvention::Positive && min > max {
        return Some(0..axis.len());
    }
    axis.index_range(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::generators::axis;

    fn lat_desc() -> CoordinateAxis {
        CoordinateAxis::new("latitude", axis(42.0, -1.0, 6)).unwrap()
    }

    fn lon_asc() -> CoordinateAxis {
        CoordinateAxis::new("longitude", axis(-108.0, 1.0, 7)).unwrap()
    }

    #[test]
    fn test_rejects_non_monotonic() {
        assert!(CoordinateAxis::new("x", vec![0.0, 1.0, 1.0]).is_err());
        assert!(CoordinateAxis::new("x", vec![0.0, 2.0, 1.0]).is_err());
        assert!(CoordinateAxis::new("x", vec![]).is_err());
        assert!(CoordinateAxis::new("x", vec![0.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_range_exact_bounds_ascending() {
        // -106..=-104 sits on grid points, no widening.
        assert_eq!(lon_asc().index_range(-106.0, -104.0), Some(2..5));
    }

    #[test]
    fn test_range_widens_to_bracketing_points() {
        // -105.5..-103.5 covers -105 and -104, widened to -106 and -103.
        assert_eq!(lon_asc().index_range(-105.5, -103.5), Some(2..6));
    }

    #[test]
    fn test_range_descending() {
        // values 42, 41, 40, 39, 38, 37
        let lat = lat_desc();
        assert_eq!(lat.index_range(39.0, 41.0), Some(1..4));
        assert_eq!(lat.index_range(38.5, 40.5), Some(1..5));
    }

    #[test]
    fn test_range_between_two_points() {
        assert_eq!(lat_desc().index_range(40.2, 40.4), Some(1..3));
    }

    #[test]
    fn test_range_outside_axis() {
        assert_eq!(lat_desc().index_range(10.0, 20.0), None);
        assert_eq!(lat_desc().index_range(41.0, 39.0), None);
    }

    #[test]
    fn test_range_clamps_to_axis() {
        assert_eq!(lat_desc().index_range(0.0, 90.0), Some(0..6));
    }

    #[test]
    fn test_nearest_ties_to_lower_index() {
        let lon = lon_asc();
        assert_eq!(lon.nearest_index(-105.5), 2);
        assert_eq!(lon.nearest_index(-105.4), 3);
        assert_eq!(lat_desc().nearest_index(40.5), 1);
    }

    #[test]
    fn test_nearest_in_subrange() {
        assert_eq!(lon_asc().nearest_index_in(3..5, -108.0), Some(3));
        assert_eq!(lon_asc().nearest_index_in(3..3, -108.0), None);
    }

    #[test]
    fn test_positive_longitudes() {
        let lon = CoordinateAxis::new("longitude", axis(0.0, 1.0, 360)).unwrap();
        assert_eq!(lon.longitude_convention(), LongitudeConvention::Positive);
        // -105..-103 -> 255..257
        assert_eq!(longitude_range(&lon, -105.0, -103.0), Some(255..258));
        // Straddles 0: whole axis.
        assert_eq!(longitude_range(&lon, -2.0, 2.0), Some(0..360));
        assert_eq!(lon.nearest_index(LongitudeConvention::Positive.normalize(-105.2)), 255);
    }

    #[test]
    fn test_longitude_distance_wraps() {
        assert!((longitude_distance(359.7, 0.0) - 0.3).abs() < 1e-9);
        assert!((longitude_distance(-179.9, 179.9) - 0.2).abs() < 1e-9);
        assert_eq!(longitude_distance(10.0, 20.0), 10.0);
    }

    #[test]
    fn test_nearest_longitude_across_seam() {
        let lon = CoordinateAxis::new("longitude", axis(0.0, 1.0, 360)).unwrap();
        assert_eq!(lon.nearest_longitude_index_in(0..360, 359.7), Some(0));
        assert_eq!(lon.nearest_index_in(0..360, 359.7), Some(359));
    }

    #[test]
    fn test_spacing_at() {
        let lat = lat_desc();
        assert_eq!(lat.spacing_at(0), Some(1.0));
        assert_eq!(lat.spacing_at(5), Some(1.0));
        let single = CoordinateAxis::new("x", vec![3.0]).unwrap();
        assert_eq!(single.spacing_at(0), None);
    }

    #[test]
    fn test_signed_longitudes() {
        let lon = lon_asc();
        assert_eq!(lon.longitude_convention(), LongitudeConvention::Signed);
        assert_eq!(longitude_range(&lon, -106.0, -104.0), Some(2..5));
    }
}
