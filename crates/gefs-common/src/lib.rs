//! Common types shared across the GEFS driver crates.

pub mod bbox;
pub mod compare;
pub mod error;
pub mod site;
pub mod time;
pub mod variables;

pub use bbox::BoundingBox;
pub use compare::SeriesComparison;
pub use error::{GefsError, GefsResult};
pub use site::{Site, SiteCollection};
pub use time::{parse_datetime, CfDurationUnits, CfTimeUnits, LeadTime, TimeRange};
pub use variables::{cf_mapping, Transform, VariableMapping, DEFAULT_VARIABLES};
