//! Tabular per-site output of a pull.

use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use gefs_common::{cf_mapping, SeriesComparison};

use crate::error::Result;
use crate::source::Product;

/// One value at one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    pub site_id: String,
    /// Valid time of the value.
    pub datetime: DateTime<Utc>,
    /// Forecast initialisation time; empty for analysis rows.
    pub reference_datetime: Option<DateTime<Utc>>,
    /// Lead time in hours; empty for analysis rows.
    pub horizon_hours: Option<f64>,
    pub ensemble_member: Option<i64>,
    pub variable: String,
    pub prediction: f64,
}

type RowKey = (DateTime<Utc>, Option<DateTime<Utc>>, Option<i64>);

impl SampleRow {
    fn key(&self) -> RowKey {
        (self.datetime, self.reference_datetime, self.ensemble_member)
    }
}

/// Agreement of one site and variable between two pulls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariableComparison {
    pub site_id: String,
    pub variable: String,
    #[serde(flatten)]
    pub stats: SeriesComparison,
    pub acceptable: bool,
}

/// Rows sampled from a store, ordered by variable, then site, then the
/// store's leading dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteSamples {
    product: Product,
    rows: Vec<SampleRow>,
}

impl SiteSamples {
    pub fn new(product: Product, rows: Vec<SampleRow>) -> Self {
        Self { product, rows }
    }

    pub fn product(&self) -> Product {
        self.product
    }

    pub fn rows(&self) -> &[SampleRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values for one site and variable, in row order.
    pub fn series(&self, site_id: &str, variable: &str) -> Vec<f64> {
        self.rows
            .iter()
            .filter(|r| r.site_id == site_id && r.variable == variable)
            .map(|r| r.prediction)
            .collect()
    }

    /// Rename variables to their CF names and convert units.
    ///
    /// Fails on the first variable without a CF counterpart.
    pub fn to_cf(&self) -> Result<SiteSamples> {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mapping = cf_mapping(&row.variable)?;
                Ok(SampleRow {
                    variable: mapping.cf.to_string(),
                    prediction: mapping.transform.apply(row.prediction),
                    ..row.clone()
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(SiteSamples::new(self.product, rows))
    }

    /// Write all rows as CSV with a header line.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv.serialize(row)?;
        }
        csv.flush()
            .map_err(|e| crate::error::ReaderError::storage(e.to_string()))?;
        Ok(())
    }

    /// Read rows previously written with [`SiteSamples::write_csv`].
    pub fn read_csv<R: Read>(product: Product, reader: R) -> Result<SiteSamples> {
        let mut csv = csv::Reader::from_reader(reader);
        let rows = csv
            .deserialize()
            .collect::<std::result::Result<Vec<SampleRow>, _>>()?;
        Ok(SiteSamples::new(product, rows))
    }

    /// Compare each site and variable against `reference`.
    ///
    /// Rows are matched on valid time, reference time and ensemble member;
    /// rows without a counterpart count as missing. Pairs with no matched
    /// values are left out.
    pub fn compare(&self, reference: &SiteSamples) -> Vec<VariableComparison> {
        let mut lookup: HashMap<(&str, &str, RowKey), f64> = HashMap::new();
        for row in &reference.rows {
            lookup.insert(
                (row.site_id.as_str(), row.variable.as_str(), row.key()),
                row.prediction,
            );
        }

        let mut groups: BTreeMap<(&str, &str), (Vec<f64>, Vec<f64>)> = BTreeMap::new();
        for row in &self.rows {
            let matched = lookup
                .get(&(row.site_id.as_str(), row.variable.as_str(), row.key()))
                .copied()
                .unwrap_or(f64::NAN);
            let (candidate, reference) = groups
                .entry((row.site_id.as_str(), row.variable.as_str()))
                .or_default();
            candidate.push(row.prediction);
            reference.push(matched);
        }

        groups
            .into_iter()
            .filter_map(|((site_id, variable), (candidate, reference))| {
                let stats = SeriesComparison::compute(&candidate, &reference)?;
                Some(VariableComparison {
                    site_id: site_id.to_string(),
                    variable: variable.to_string(),
                    acceptable: stats.is_acceptable(),
                    stats,
                })
            })
            .collect()
    }
}
