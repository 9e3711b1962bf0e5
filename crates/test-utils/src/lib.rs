//! Shared test utilities for the GEFS drivers workspace.
//!
//! - Scratch directories and approximate-equality assertions
//! - Synthetic grid and coordinate generators
//! - Site, grid and forecast-file fixtures
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

pub use generators::*;
pub use paths::*;

/// Absolute difference between `left` and `right` when it exceeds
/// `epsilon`, or when either side is NaN.
#[doc(hidden)]
pub fn approx_mismatch(left: f64, right: f64, epsilon: f64) -> Option<f64> {
    let diff = (left - right).abs();
    if diff <= epsilon {
        None
    } else {
        Some(diff)
    }
}

/// Assert two numbers agree within `epsilon`. Both sides are widened to
/// `f64`; NaN never matches.
///
/// ```
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(283.15_f64, 10.0 + 273.15, 1e-9);
/// assert_approx_eq!(0.25_f32, 0.25_f64, 0.0);
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let (left, right) = ($left as f64, $right as f64);
        if let Some(diff) = $crate::approx_mismatch(left, right, $epsilon as f64) {
            panic!(
                "assertion failed: {} ≈ {}\n  left: {:?}\n right: {:?}\n  diff: {:?} (epsilon {:?})",
                stringify!($left),
                stringify!($right),
                left,
                right,
                diff,
                $epsilon
            );
        }
    }};
}

/// Approximate equality of a `(lat, lon)` pair.
#[macro_export]
macro_rules! assert_coords_approx_eq {
    (($lat1:expr, $lon1:expr), ($lat2:expr, $lon2:expr), $epsilon:expr) => {{
        $crate::assert_approx_eq!($lat1, $lat2, $epsilon);
        $crate::assert_approx_eq!($lon1, $lon2, $epsilon);
    }};
}
