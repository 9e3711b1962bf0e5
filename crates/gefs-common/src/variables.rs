//! GEFS variable names and their CF-convention equivalents.

use crate::error::{GefsError, GefsResult};

/// Variables pulled from the dynamical.org GEFS stores by default.
pub const DEFAULT_VARIABLES: &[&str] = &[
    "downward_long_wave_radiation_flux_surface",
    "downward_short_wave_radiation_flux_surface",
    "maximum_temperature_2m",
    "minimum_temperature_2m",
    "precipitation_surface",
    "temperature_2m",
    "total_cloud_cover_atmosphere",
    "wind_u_10m",
    "wind_v_10m",
];

/// Unit conversion applied when renaming a dynamical variable to its CF name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Identity,
    /// Add a constant offset (e.g. °C -> K).
    Offset(f64),
    /// Multiply by a constant factor (e.g. % -> fraction).
    Scale(f64),
}

impl Transform {
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Transform::Identity => value,
            Transform::Offset(offset) => value + offset,
            Transform::Scale(factor) => value * factor,
        }
    }
}

/// Mapping from a dynamical.org variable to the challenge's CF variable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableMapping {
    pub dynamical: &'static str,
    pub cf: &'static str,
    pub transform: Transform,
}

/// Variables with a CF counterpart in the EFI stage 2/3 products.
///
/// The u/v wind pairing matches the existing stage products.
pub const VARIABLE_MAPPINGS: &[VariableMapping] = &[
    VariableMapping {
        dynamical: "temperature_2m",
        cf: "air_temperature",
        transform: Transform::Offset(273.15),
    },
    VariableMapping {
        dynamical: "pressure_surface",
        cf: "air_pressure",
        transform: Transform::Identity,
    },
    VariableMapping {
        dynamical: "relative_humidity_2m",
        cf: "relative_humidity",
        transform: Transform::Scale(0.01),
    },
    VariableMapping {
        dynamical: "wind_u_10m",
        cf: "northward_wind",
        transform: Transform::Identity,
    },
    VariableMapping {
        dynamical: "wind_v_10m",
        cf: "eastward_wind",
        transform: Transform::Identity,
    },
    VariableMapping {
        dynamical: "precipitation_surface",
        cf: "precipitation_flux",
        transform: Transform::Scale(0.001),
    },
    VariableMapping {
        dynamical: "downward_short_wave_radiation_flux_surface",
        cf: "surface_downwelling_shortwave_flux_in_air",
        transform: Transform::Identity,
    },
    VariableMapping {
        dynamical: "downward_long_wave_radiation_flux_surface",
        cf: "surface_downwelling_longwave_flux_in_air",
        transform: Transform::Identity,
    },
];

/// Find the CF mapping for a dynamical variable name.
pub fn cf_mapping(dynamical: &str) -> GefsResult<&'static VariableMapping> {
    VARIABLE_MAPPINGS
        .iter()
        .find(|m| m.dynamical == dynamical)
        .ok_or_else(|| GefsError::UnknownVariable(dynamical.to_string()))
}

/// Variables that can be compared against the CF stage products.
pub fn mapped_variables() -> Vec<&'static str> {
    VARIABLE_MAPPINGS.iter().map(|m| m.dynamical).collect()
}
