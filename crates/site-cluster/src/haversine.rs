//! Great-circle distance on the unit sphere.

/// Mean Earth radius in kilometres (IUGG), i.e. kilometres per radian.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Haversine distance between two `(lat, lon)` points given in radians.
///
/// Returns the central angle in radians; multiply by [`EARTH_RADIUS_KM`]
/// for kilometres.
pub fn haversine_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = a;
    let (lat2, lon2) = b;

    let sin_dlat = ((lat2 - lat1) / 2.0).sin();
    let sin_dlon = ((lon2 - lon1) / 2.0).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;

    // Rounding can push h a hair past 1 for antipodal points.
    2.0 * h.clamp(0.0, 1.0).sqrt().asin()
}

/// Convert a distance in kilometres to radians of arc.
pub fn km_to_radians(km: f64) -> f64 {
    km / EARTH_RADIUS_KM
}
