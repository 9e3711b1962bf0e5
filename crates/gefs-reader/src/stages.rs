//! EFI GEFS driver products (stages 1–3) on the OSN bucket.
//!
//! Each stage is a hive-partitioned Parquet dataset. Opening a stage lists
//! its files and parses the `key=value` partition segments of every path.
//! Reading a file decodes it into Arrow record batches with the partition
//! values attached as string columns.

use std::collections::BTreeMap;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray, BooleanArray, StringArray};
use arrow::compute::{cast, filter_record_batch};
use arrow::datatypes::{DataType, Field, FieldRef, Schema};
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use chrono::NaiveDate;
use futures::TryStreamExt;
use object_store::path::Path;
use object_store::ObjectStore;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use tracing::{debug, info, instrument};

use crate::error::{ReaderError, Result};

/// EFI processing stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Raw GEFS output at sites, one partition per reference date.
    Stage1,
    /// Per-second fluxes, CF names, 1-hour interpolation.
    Stage2,
    /// Nowcast assembled from the latest cycle of each day.
    Stage3,
}

impl Stage {
    pub fn from_number(n: u8) -> Result<Self> {
        match n {
            1 => Ok(Stage::Stage1),
            2 => Ok(Stage::Stage2),
            3 => Ok(Stage::Stage3),
            other => Err(ReaderError::invalid_request(format!(
                "stage must be 1, 2 or 3, got {}",
                other
            ))),
        }
    }

    pub fn dir_name(&self) -> &'static str {
        match self {
            Stage::Stage1 => "stage1",
            Stage::Stage2 => "stage2",
            Stage::Stage3 => "stage3",
        }
    }

    fn requires_start_date(&self) -> bool {
        matches!(self, Stage::Stage1 | Stage::Stage2)
    }
}

/// Which stage dataset to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageRequest {
    pub stage: Stage,
    pub project_id: String,
    /// Forecast reference date; required for stages 1 and 2.
    pub start_date: Option<String>,
    /// Narrow stage 3 to a single `site_id` partition.
    pub site_id: Option<String>,
    /// GEFS version segment of the path.
    pub version: String,
}

impl StageRequest {
    pub fn new(stage: Stage, project_id: impl Into<String>) -> Self {
        Self {
            stage,
            project_id: project_id.into(),
            start_date: None,
            site_id: None,
            version: "v12".to_string(),
        }
    }

    pub fn with_start_date(mut self, start_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self
    }

    pub fn with_site_id(mut self, site_id: impl Into<String>) -> Self {
        self.site_id = Some(site_id.into());
        self
    }

    fn validated_start_date(&self) -> Result<Option<&str>> {
        match self.start_date.as_deref().map(str::trim) {
            None | Some("") if self.stage.requires_start_date() => Err(
                ReaderError::invalid_request("start_date must be provided in yyyy-mm-dd format"),
            ),
            None | Some("") => Ok(None),
            Some(date) => {
                NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
                    ReaderError::invalid_request(format!(
                        "start_date '{}' is not in yyyy-mm-dd format",
                        date
                    ))
                })?;
                Ok(Some(date))
            }
        }
    }

    /// Object prefix listed for this request, relative to the bucket.
    pub fn prefix(&self) -> Result<Path> {
        if self.project_id.trim().is_empty() {
            return Err(ReaderError::invalid_request("project_id must be provided"));
        }
        let start_date = self.validated_start_date()?;

        let mut prefix = format!(
            "challenges/drivers/{}/noaa/gefs-{}/{}",
            self.project_id,
            self.version,
            self.stage.dir_name()
        );
        match self.stage {
            Stage::Stage1 => {
                if let Some(date) = start_date {
                    prefix.push_str(&format!("/reference_datetime={}", date));
                }
            }
            Stage::Stage2 => {}
            Stage::Stage3 => {
                if let Some(site) = &self.site_id {
                    prefix.push_str(&format!("/site_id={}", site));
                }
            }
        }
        Ok(Path::from(prefix))
    }
}

/// One Parquet file of a stage dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFile {
    pub location: Path,
    pub size: usize,
    /// Hive partition values parsed from the path.
    pub partitions: BTreeMap<String, String>,
}

/// `key=value` segments of a path.
pub fn hive_partitions(location: &Path) -> BTreeMap<String, String> {
    location
        .parts()
        .filter_map(|part| {
            let part = part.as_ref().to_string();
            let (key, value) = part.split_once('=')?;
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// Partition key carrying the forecast reference date.
pub const REFERENCE_DATETIME: &str = "reference_datetime";

/// Listing of a stage dataset, with lazy access to file contents.
pub struct StageDataset {
    store: Arc<dyn ObjectStore>,
    stage: Stage,
    prefix: Path,
    files: Vec<StageFile>,
    /// Stage 2 rows are kept only when `reference_datetime` starts with this.
    reference_date: Option<String>,
}

impl std::fmt::Debug for StageDataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageDataset")
            .field("stage", &self.stage)
            .field("prefix", &self.prefix)
            .field("files", &self.files.len())
            .finish()
    }
}

impl StageDataset {
    /// List the Parquet files of a stage.
    ///
    /// Stage 2 is listed in full and filtered to the partition whose
    /// `reference_datetime` equals the requested start date; files without
    /// that partition are kept and filtered by row when read.
    #[instrument(skip(store), fields(stage = ?request.stage, project = %request.project_id))]
    pub async fn open(store: Arc<dyn ObjectStore>, request: &StageRequest) -> Result<Self> {
        let prefix = request.prefix()?;
        let start_date = request.validated_start_date()?.map(str::to_string);

        let objects: Vec<_> = store.list(Some(&prefix)).try_collect().await?;
        debug!(prefix = %prefix, objects = objects.len(), "Listed stage objects");

        let files: Vec<StageFile> = objects
            .into_iter()
            .filter(|meta| {
                meta.location
                    .extension()
                    .map_or(false, |ext| ext.eq_ignore_ascii_case("parquet"))
            })
            .map(|meta| StageFile {
                partitions: hive_partitions(&meta.location),
                location: meta.location,
                size: meta.size,
            })
            .filter(|file| match (request.stage, &start_date) {
                (Stage::Stage2, Some(date)) => file
                    .partitions
                    .get(REFERENCE_DATETIME)
                    .map_or(true, |value| value == date),
                _ => true,
            })
            .collect();

        info!(prefix = %prefix, files = files.len(), "Opened stage dataset");

        let reference_date = match request.stage {
            Stage::Stage2 => start_date,
            _ => None,
        };

        Ok(Self {
            store,
            stage: request.stage,
            prefix,
            files,
            reference_date,
        })
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    pub fn files(&self) -> &[StageFile] {
        &self.files
    }

    pub fn total_size(&self) -> usize {
        self.files.iter().map(|f| f.size).sum()
    }

    /// Files whose partition `key` equals `value`.
    pub fn filter_partition(&self, key: &str, value: &str) -> Vec<&StageFile> {
        self.files
            .iter()
            .filter(|f| f.partitions.get(key).map(String::as_str) == Some(value))
            .collect()
    }

    /// Distinct values of a partition key, sorted.
    pub fn partition_values(&self, key: &str) -> Vec<String> {
        let mut values: Vec<String> = self
            .files
            .iter()
            .filter_map(|f| f.partitions.get(key).cloned())
            .collect();
        values.sort();
        values.dedup();
        values
    }

    /// Raw bytes of one file.
    #[instrument(skip(self), fields(path = %file.location))]
    pub async fn fetch(&self, file: &StageFile) -> Result<Bytes> {
        let bytes = self.store.get(&file.location).await?.bytes().await?;
        debug!(size = bytes.len(), "Fetched stage file");
        Ok(bytes)
    }

    /// Decode one file into record batches.
    ///
    /// Partition values missing from the file schema are appended as
    /// non-null string columns. For stage 2 only rows of the requested
    /// reference date are returned.
    pub async fn read_file(&self, file: &StageFile) -> Result<Vec<RecordBatch>> {
        let bytes = self.fetch(file).await?;
        let reader = ParquetRecordBatchReaderBuilder::try_new(bytes)?.build()?;

        let mut batches = Vec::new();
        for batch in reader {
            let batch = with_partitions(batch?, &file.partitions)?;
            let batch = match &self.reference_date {
                Some(date) => filter_reference_date(&batch, date)?,
                None => batch,
            };
            if batch.num_rows() > 0 {
                batches.push(batch);
            }
        }
        debug!(
            path = %file.location,
            batches = batches.len(),
            rows = row_count(&batches),
            "Decoded stage file"
        );
        Ok(batches)
    }

    /// Decode every listed file, in listing order.
    #[instrument(skip(self), fields(stage = ?self.stage, files = self.files.len()))]
    pub async fn read_all(&self) -> Result<Vec<RecordBatch>> {
        let mut batches = Vec::new();
        for file in &self.files {
            batches.extend(self.read_file(file).await?);
        }
        info!(rows = row_count(&batches), "Read stage dataset");
        Ok(batches)
    }
}

/// Total rows across batches.
pub fn row_count(batches: &[RecordBatch]) -> usize {
    batches.iter().map(RecordBatch::num_rows).sum()
}

fn with_partitions(batch: RecordBatch, partitions: &BTreeMap<String, String>) -> Result<RecordBatch> {
    let schema = batch.schema();
    let missing: Vec<_> = partitions
        .iter()
        .filter(|(key, _)| schema.column_with_name(key).is_none())
        .collect();
    if missing.is_empty() {
        return Ok(batch);
    }

    let rows = batch.num_rows();
    let mut fields: Vec<FieldRef> = schema.fields().iter().cloned().collect();
    let mut columns: Vec<ArrayRef> = batch.columns().to_vec();
    for (key, value) in missing {
        fields.push(Arc::new(Field::new(key.as_str(), DataType::Utf8, false)));
        columns.push(Arc::new(StringArray::from(vec![value.as_str(); rows])));
    }
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Keep rows whose `reference_datetime`, rendered as text, starts with `date`.
/// Timestamps render as `2024-04-01T00:00:00`, plain dates as `2024-04-01`.
fn filter_reference_date(batch: &RecordBatch, date: &str) -> Result<RecordBatch> {
    let Some(column) = batch.column_by_name(REFERENCE_DATETIME) else {
        return Ok(batch.clone());
    };
    let text = cast(column, &DataType::Utf8)?;
    let mask: BooleanArray = text
        .as_string::<i32>()
        .iter()
        .map(|value| Some(value.map_or(false, |v| v.starts_with(date))))
        .collect();
    if mask.true_count() == mask.len() {
        return Ok(batch.clone());
    }
    Ok(filter_record_batch(batch, &mask)?)
}
