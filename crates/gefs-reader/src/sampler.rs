//! Nearest-grid-point sampling of sites within a read window.

use gefs_common::SiteCollection;

use crate::axis::{longitude_distance, CoordinateAxis};
use crate::error::{ReaderError, Result};
use crate::source::{Coordinates, Window, WindowData};

/// A site snapped to its nearest grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct SitePoint {
    pub site_id: String,
    /// Absolute latitude index in the store.
    pub lat_index: usize,
    /// Absolute longitude index in the store.
    pub lon_index: usize,
    /// Latitude of the selected grid point.
    pub grid_latitude: f64,
    /// Longitude of the selected grid point, in the store's convention.
    pub grid_longitude: f64,
}

/// Picks, for every site, the nearest latitude and the nearest longitude
/// independently among the grid points of a window.
#[derive(Debug, Clone)]
pub struct NearestSampler {
    points: Vec<SitePoint>,
}

impl NearestSampler {
    pub fn new(coords: &Coordinates, window: &Window, sites: &SiteCollection) -> Result<Self> {
        let lat_axis = &coords.latitude;
        let lon_axis = &coords.longitude;
        let convention = lon_axis.longitude_convention();

        let describe = || {
            format!(
                "lat[{}..{}] lon[{}..{}]",
                window.latitude.start, window.latitude.end, window.longitude.start, window.longitude.end
            )
        };

        let points = sites
            .iter()
            .map(|site| {
                let outside = || ReaderError::SiteOutsideWindow {
                    site_id: site.site_id.clone(),
                    window: describe(),
                };

                let lon = convention.normalize(site.longitude);
                let lat_index = lat_axis
                    .nearest_index_in(window.latitude.clone(), site.latitude)
                    .ok_or_else(outside)?;
                let lon_index = lon_axis
                    .nearest_longitude_index_in(window.longitude.clone(), lon)
                    .ok_or_else(outside)?;

                let lat_distance = (lat_axis.values()[lat_index] - site.latitude).abs();
                let lon_distance = longitude_distance(lon_axis.values()[lon_index], lon);
                if !within_one_step(lat_axis, lat_index, lat_distance)
                    || !within_one_step(lon_axis, lon_index, lon_distance)
                {
                    return Err(outside());
                }

                Ok(SitePoint {
                    site_id: site.site_id.clone(),
                    lat_index,
                    lon_index,
                    grid_latitude: lat_axis.values()[lat_index],
                    grid_longitude: lon_axis.values()[lon_index],
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { points })
    }

    pub fn points(&self) -> &[SitePoint] {
        &self.points
    }

    /// Full leading-dimension series at every site's grid point.
    pub fn sample<'a>(&'a self, data: &WindowData) -> Result<Vec<(&'a SitePoint, Vec<f64>)>> {
        self.points
            .iter()
            .map(|point| {
                let series = data
                    .series_at(point.lat_index, point.lon_index)
                    .ok_or_else(|| ReaderError::SiteOutsideWindow {
                        site_id: point.site_id.clone(),
                        window: format!("{:?}", data.window),
                    })?;
                Ok((point, series))
            })
            .collect()
    }
}

/// Whether a site `distance` away from grid point `index` is still in
/// that point's cell neighbourhood.
fn within_one_step(axis: &CoordinateAxis, index: usize, distance: f64) -> bool {
    axis.spacing_at(index).map_or(true, |step| distance <= step + 1e-9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pull::spatial_window;
    use crate::source::LeadingAxes;
    use gefs_common::Site;
    use site_cluster::{auto_spatial_subset, SubsetParams};
    use test_utils::fixtures::grid;
    use test_utils::generators::axis;

    fn global(lon_start: f64, step: f64) -> Coordinates {
        let lon_count = (360.0 / step) as usize;
        let lat_count = (180.0 / step) as usize + 1;
        Coordinates {
            leading: LeadingAxes::Analysis { time: vec![] },
            latitude: CoordinateAxis::new("latitude", axis(90.0, -step, lat_count)).unwrap(),
            longitude: CoordinateAxis::new("longitude", axis(lon_start, step, lon_count)).unwrap(),
        }
    }

    /// Box from the site clusterer, window over it, then snap.
    fn snap(coords: &Coordinates, site: Site) -> Result<SitePoint> {
        let sites = SiteCollection::new(vec![site]).unwrap();
        let bbox = auto_spatial_subset(&sites, &SubsetParams::default()).unwrap();
        let window = spatial_window(coords, &bbox, vec![0..1])?;
        let sampler = NearestSampler::new(coords, &window, &sites)?;
        Ok(sampler.points()[0].clone())
    }

    fn coords() -> Coordinates {
        let spec = grid::COLORADO_1DEG;
        Coordinates {
            leading: LeadingAxes::Analysis { time: vec![] },
            latitude: CoordinateAxis::new("latitude", spec.latitudes()).unwrap(),
            longitude: CoordinateAxis::new("longitude", spec.longitudes()).unwrap(),
        }
    }

    fn full_window() -> Window {
        Window {
            leading: vec![0..2],
            latitude: 0..6,
            longitude: 0..7,
        }
    }

    #[test]
    fn test_snaps_to_nearest_point() {
        // lat 42..37 descending, lon -108..-102
        let sites = SiteCollection::new(vec![Site::new("NIWO", 40.05, -105.58)]).unwrap();
        let sampler = NearestSampler::new(&coords(), &full_window(), &sites).unwrap();
        let point = &sampler.points()[0];
        assert_eq!(point.lat_index, 2);
        assert_eq!(point.lon_index, 2);
        assert_eq!(point.grid_latitude, 40.0);
        assert_eq!(point.grid_longitude, -106.0);
    }

    #[test]
    fn test_site_outside_window() {
        let sites = SiteCollection::new(vec![Site::new("FAR", 10.0, -105.0)]).unwrap();
        let result = NearestSampler::new(&coords(), &full_window(), &sites);
        assert!(matches!(result, Err(ReaderError::SiteOutsideWindow { .. })));
    }

    #[test]
    fn test_positive_axis_site_west_of_greenwich() {
        // -0.3 is 359.7 on this axis; the nearest point wraps to 0.
        let coords = global(0.0, 1.0);
        let point = snap(&coords, Site::new("GREENWICH", 51.48, -0.3)).unwrap();
        assert_eq!(point.lon_index, 0);
        assert_eq!(point.grid_longitude, 0.0);
        assert_eq!(point.grid_latitude, 51.0);
    }

    #[test]
    fn test_signed_axis_site_past_last_point() {
        // GEFS layout: -180 ..= 179.75 at 0.25 degrees.
        let coords = global(-180.0, 0.25);
        let point = snap(&coords, Site::new("FIJI", -17.7, 179.8)).unwrap();
        assert_eq!(point.grid_longitude, 179.75);
        assert_eq!(point.lon_index, 1439);

        let coords = global(-180.0, 1.0);
        let point = snap(&coords, Site::new("FIJI", -17.7, 179.8)).unwrap();
        assert_eq!(point.grid_longitude, 179.0);
    }

    #[test]
    fn test_sample_extracts_series() {
        let sites = SiteCollection::new(vec![Site::new("A", 41.0, -107.0)]).unwrap();
        let window = full_window();
        let values: Vec<f64> = (0..window.num_elements()).map(|v| v as f64).collect();
        let data = WindowData::new("t", window.clone(), values).unwrap();

        let sampler = NearestSampler::new(&coords(), &window, &sites).unwrap();
        let samples = sampler.sample(&data).unwrap();
        // lat idx 1, lon idx 1 -> offset 1 * 7 + 1 = 8; plane 42
        assert_eq!(samples[0].1, vec![8.0, 50.0]);
    }
}
