//! Pre-defined sites, grids and forecast files.

/// Monitoring sites as `(site_id, latitude, longitude)`.
pub mod sites {
    /// Spread across the continental United States.
    pub const CONUS: &[(&str, f64, f64)] = &[
        ("NIWO", 40.05425, -105.58237),
        ("KONZ", 39.10077, -96.56307),
        ("HARV", 42.5369, -72.17266),
        ("OSBS", 29.68927, -81.99343),
        ("WREF", 45.82049, -121.95191),
    ];

    /// Roughly 2000 km from the nearest CONUS site.
    pub const PUERTO_RICO: &[(&str, f64, f64)] = &[
        ("GUAN", 17.96955, -66.8687),
        ("LAJA", 18.02126, -67.07689),
    ];

    pub const ALASKA: &[(&str, f64, f64)] = &[
        ("BONA", 65.15401, -147.50258),
        ("TOOL", 68.66109, -149.37047),
    ];

    pub const HAWAII: &[(&str, f64, f64)] = &[("PUUM", 19.55309, -155.31731)];

    /// CSV table in the challenge's site metadata layout.
    pub const METADATA_CSV: &str = "\
field_site_id,site_id,latitude,longitude,field_site_name
D13,NIWO,40.05425,-105.58237,Niwot Ridge
D06,KONZ,39.10077,-96.56307,Konza Prairie
D04,GUAN,17.96955,-66.8687,Guanica Forest
";
}

/// Regular lat/lon grid specifications.
pub mod grid {
    /// Small 1° grid over Colorado, latitude descending.
    pub const COLORADO_1DEG: GridSpec = GridSpec {
        lat_start: 42.0,
        lat_step: -1.0,
        lat_count: 6,
        lon_start: -108.0,
        lon_step: 1.0,
        lon_count: 7,
    };

    /// Small 1° grid over Colorado on a 0–360 longitude axis.
    pub const COLORADO_1DEG_360: GridSpec = GridSpec {
        lat_start: 42.0,
        lat_step: -1.0,
        lat_count: 6,
        lon_start: 252.0,
        lon_step: 1.0,
        lon_count: 7,
    };

    #[derive(Debug, Clone, Copy)]
    pub struct GridSpec {
        pub lat_start: f64,
        pub lat_step: f64,
        pub lat_count: usize,
        pub lon_start: f64,
        pub lon_step: f64,
        pub lon_count: usize,
    }

    impl GridSpec {
        pub fn size(&self) -> usize {
            self.lat_count * self.lon_count
        }

        pub fn latitudes(&self) -> Vec<f64> {
            crate::generators::axis(self.lat_start, self.lat_step, self.lat_count)
        }

        pub fn longitudes(&self) -> Vec<f64> {
            crate::generators::axis(self.lon_start, self.lon_step, self.lon_count)
        }
    }
}

/// Forecast submission files.
pub mod forecast {
    /// Passes every schema check.
    pub const VALID_CSV: &str = "\
project_id,model_id,datetime,reference_datetime,duration,site_id,family,parameter,variable,prediction
neon4cast,climatology,2024-01-02,2024-01-01,P1D,NIWO,normal,mu,temperature,4.2
neon4cast,climatology,2024-01-02,2024-01-01,P1D,NIWO,normal,sigma,temperature,1.1
";

    /// Uses the deprecated `start_time` column; valid with a warning.
    pub const START_TIME_CSV: &str = "\
project_id,model_id,datetime,start_time,duration,site_id,family,parameter,variable,prediction
neon4cast,climatology,2024-01-02,2024-01-01,P1D,NIWO,normal,mu,temperature,4.2
";

    /// Uses `ensemble` instead of `parameter`.
    pub const ENSEMBLE_CSV: &str = "\
project_id,model_id,datetime,reference_datetime,duration,site_id,ensemble,variable,prediction
neon4cast,climatology,2024-01-02,2024-01-01,P1D,NIWO,1,temperature,4.2
";
}
