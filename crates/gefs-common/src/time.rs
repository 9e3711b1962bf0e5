//! Time handling for GEFS analysis and forecast axes.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{GefsError, GefsResult};

/// Parse an ISO 8601 timestamp, a naive timestamp (assumed UTC) or a bare date.
pub fn parse_datetime(s: &str) -> GefsResult<DateTime<Utc>> {
    let s = s.trim();

    // Try full datetime with timezone
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // Try without timezone (assume UTC)
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    // Try date only
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    Err(GefsError::InvalidTime(s.to_string()))
}

/// An inclusive time window for queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> GefsResult<Self> {
        if end < start {
            return Err(GefsError::InvalidTime(format!(
                "end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse a range from two timestamp strings.
    pub fn parse(start: &str, end: &str) -> GefsResult<Self> {
        Self::new(parse_datetime(start)?, parse_datetime(end)?)
    }

    pub fn contains(&self, dt: &DateTime<Utc>) -> bool {
        dt >= &self.start && dt <= &self.end
    }
}

/// Forecast lead time, parsed from strings like `"10d"`, `"72h"` or `"90m"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LeadTime(Duration);

impl LeadTime {
    pub fn parse(s: &str) -> GefsResult<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| GefsError::InvalidLeadTime(s.to_string()))?;
        let (digits, unit) = s.split_at(split);

        let amount: i64 = digits
            .parse()
            .map_err(|_| GefsError::InvalidLeadTime(s.to_string()))?;

        let duration = match unit {
            "d" | "day" | "days" => Duration::days(amount),
            "h" | "hour" | "hours" => Duration::hours(amount),
            "m" | "min" | "minutes" => Duration::minutes(amount),
            "s" | "sec" | "seconds" => Duration::seconds(amount),
            _ => return Err(GefsError::InvalidLeadTime(s.to_string())),
        };

        Ok(Self(duration))
    }

    pub fn duration(&self) -> Duration {
        self.0
    }

    pub fn hours(&self) -> f64 {
        self.0.num_seconds() as f64 / 3600.0
    }
}

impl std::fmt::Display for LeadTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h", self.hours())
    }
}

/// Multiplier from a CF unit name to seconds.
fn unit_seconds(unit: &str) -> GefsResult<f64> {
    match unit.trim().to_lowercase().as_str() {
        "seconds" | "second" | "secs" | "sec" | "s" => Ok(1.0),
        "minutes" | "minute" | "mins" | "min" => Ok(60.0),
        "hours" | "hour" | "hrs" | "hr" | "h" => Ok(3600.0),
        "days" | "day" | "d" => Ok(86_400.0),
        other => Err(GefsError::UnsupportedUnits(other.to_string())),
    }
}

fn seconds_to_duration(seconds: f64) -> Duration {
    Duration::milliseconds((seconds * 1000.0).round() as i64)
}

/// CF-convention datetime encoding: `"<unit> since <epoch>"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CfTimeUnits {
    seconds_per_unit: f64,
    epoch: DateTime<Utc>,
}

impl CfTimeUnits {
    pub fn parse(units: &str) -> GefsResult<Self> {
        let (unit, epoch) = units
            .split_once(" since ")
            .ok_or_else(|| GefsError::UnsupportedUnits(units.to_string()))?;

        Ok(Self {
            seconds_per_unit: unit_seconds(unit)?,
            epoch: parse_datetime(epoch)?,
        })
    }

    /// Decode a stored value into a UTC timestamp.
    pub fn decode(&self, value: f64) -> DateTime<Utc> {
        self.epoch + seconds_to_duration(value * self.seconds_per_unit)
    }

    /// Encode a UTC timestamp into the stored representation.
    pub fn encode(&self, dt: &DateTime<Utc>) -> f64 {
        (*dt - self.epoch).num_milliseconds() as f64 / 1000.0 / self.seconds_per_unit
    }
}

/// CF-convention timedelta encoding: a bare unit name such as `"hours"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CfDurationUnits {
    seconds_per_unit: f64,
}

impl CfDurationUnits {
    pub fn parse(units: &str) -> GefsResult<Self> {
        Ok(Self {
            seconds_per_unit: unit_seconds(units)?,
        })
    }

    pub fn decode(&self, value: f64) -> Duration {
        seconds_to_duration(value * self.seconds_per_unit)
    }

    pub fn encode(&self, duration: &Duration) -> f64 {
        duration.num_milliseconds() as f64 / 1000.0 / self.seconds_per_unit
    }
}
