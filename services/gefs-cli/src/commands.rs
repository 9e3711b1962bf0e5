//! Subcommand implementations.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::{info, warn};

use forecast_submit::{submit, LinePrompt, SubmitOutcome};
use forecast_validator::validate_forecast;
use gefs_common::variables::mapped_variables;
use gefs_common::{BoundingBox, LeadTime, SiteCollection, TimeRange, DEFAULT_VARIABLES};
use gefs_reader::{
    available_variables, efi_object_store, open_source, pull_gefs_analysis,
    pull_gefs_operational, row_count, GriddedSource, Product, SiteSamples, Stage, StageDataset,
    StageRequest,
};
use site_cluster::{cluster_bounding_boxes, cluster_sites, ClusterBoundingBox, SubsetParams};

use crate::config::DriversConfig;

/// Site selection shared by every command that reads sites.
#[derive(Args, Debug)]
pub struct SiteArgs {
    /// Site metadata CSV with site_id, latitude and longitude columns
    #[arg(long)]
    pub sites: PathBuf,

    /// Restrict to these site ids
    #[arg(long = "site-id", value_delimiter = ',')]
    pub site_ids: Vec<String>,
}

impl SiteArgs {
    fn load(&self) -> Result<SiteCollection> {
        let sites = SiteCollection::from_csv_path(&self.sites)
            .with_context(|| format!("Failed to load sites from {}", self.sites.display()))?;
        let sites = if self.site_ids.is_empty() {
            sites
        } else {
            sites.select(&self.site_ids)
        };
        if sites.is_empty() {
            bail!("no sites selected");
        }
        info!(sites = sites.len(), "Loaded sites");
        Ok(sites)
    }
}

/// Clustering overrides.
#[derive(Args, Debug)]
pub struct SubsetArgs {
    /// Padding around each cluster, in degrees
    #[arg(long)]
    pub buffer: Option<f64>,

    /// Clustering radius, in kilometres
    #[arg(long)]
    pub radius_km: Option<f64>,
}

impl SubsetArgs {
    fn resolve(&self, defaults: SubsetParams) -> SubsetParams {
        SubsetParams {
            buffer_degrees: self.buffer.unwrap_or(defaults.buffer_degrees),
            cluster_radius_km: self.radius_km.unwrap_or(defaults.cluster_radius_km),
        }
    }
}

// ============================================================================
// bbox
// ============================================================================

#[derive(Args, Debug)]
pub struct BboxArgs {
    #[command(flatten)]
    pub sites: SiteArgs,

    #[command(flatten)]
    pub subset: SubsetArgs,
}

#[derive(Serialize)]
struct BboxReport {
    bbox: BoundingBox,
    params: SubsetParams,
    clusters: Vec<ClusterBoundingBox>,
}

pub fn bbox(args: &BboxArgs, config: &DriversConfig) -> Result<()> {
    let sites = args.sites.load()?;
    let params = args.subset.resolve(config.subset);
    params.validate()?;

    let assignment = cluster_sites(sites.sites(), params.cluster_radius_km)?;
    let clusters = cluster_bounding_boxes(sites.sites(), &assignment, params.buffer_degrees)?;
    let bbox = site_cluster::auto_spatial_subset(&sites, &params)?;

    let report = BboxReport {
        bbox,
        params,
        clusters,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

// ============================================================================
// analysis / forecast
// ============================================================================

#[derive(Args, Debug)]
pub struct PullArgs {
    #[command(flatten)]
    pub sites: SiteArgs,

    /// First timestamp (inclusive), e.g. 2024-01-01 or 2024-01-01T06:00:00Z
    #[arg(long)]
    pub start: String,

    /// Last timestamp (inclusive)
    #[arg(long)]
    pub end: String,

    /// Variables to pull; defaults to every default variable the store holds
    #[arg(long, value_delimiter = ',')]
    pub variables: Vec<String>,

    /// Store URL or local directory; defaults to the configured URL
    #[arg(long)]
    pub store: Option<String>,

    /// Rename variables to CF names and convert units
    #[arg(long)]
    pub cf: bool,

    /// Output CSV file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub subset: SubsetArgs,
}

#[derive(Args, Debug)]
pub struct ForecastArgs {
    #[command(flatten)]
    pub pull: PullArgs,

    /// Longest lead time, e.g. 10d or 72h
    #[arg(long, default_value = "35d")]
    pub lead_time: String,
}

async fn resolve_variables<G: GriddedSource + ?Sized>(
    source: &G,
    requested: &[String],
    cf: bool,
) -> Result<Vec<String>> {
    if !requested.is_empty() {
        return Ok(requested.to_vec());
    }

    let defaults: Vec<String> = if cf {
        mapped_variables().into_iter().map(String::from).collect()
    } else {
        DEFAULT_VARIABLES.iter().map(|v| v.to_string()).collect()
    };
    let found = available_variables(source, &defaults).await?;
    if found.is_empty() {
        bail!("store holds none of the default variables");
    }
    Ok(found)
}

fn write_samples(samples: &SiteSamples, cf: bool, output: Option<&Path>) -> Result<()> {
    let converted;
    let samples = if cf {
        converted = samples.to_cf()?;
        &converted
    } else {
        samples
    };

    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            samples.write_csv(BufWriter::new(file))?;
            info!(rows = samples.len(), path = %path.display(), "Wrote samples");
        }
        None => samples.write_csv(io::stdout().lock())?,
    }
    Ok(())
}

pub async fn analysis(args: &PullArgs, config: &DriversConfig) -> Result<()> {
    let sites = args.sites.load()?;
    let range = TimeRange::parse(&args.start, &args.end)?;
    let params = args.subset.resolve(config.subset);

    let source = open_source(Product::Analysis, args.store.as_deref(), &config.dynamical)?;
    let variables = resolve_variables(&source, &args.variables, args.cf).await?;

    let samples = pull_gefs_analysis(&source, &range, &sites, &variables, &params).await?;
    write_samples(&samples, args.cf, args.output.as_deref())
}

pub async fn forecast(args: &ForecastArgs, config: &DriversConfig) -> Result<()> {
    let pull = &args.pull;
    let sites = pull.sites.load()?;
    let range = TimeRange::parse(&pull.start, &pull.end)?;
    let lead_time = LeadTime::parse(&args.lead_time)?;
    let params = pull.subset.resolve(config.subset);

    let source = open_source(
        Product::Forecast35Day,
        pull.store.as_deref(),
        &config.dynamical,
    )?;
    let variables = resolve_variables(&source, &pull.variables, pull.cf).await?;

    let samples =
        pull_gefs_operational(&source, &range, &sites, lead_time, &variables, &params).await?;
    write_samples(&samples, pull.cf, pull.output.as_deref())
}

// ============================================================================
// compare
// ============================================================================

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Samples CSV to check, as written by `analysis` or `forecast`
    #[arg(long)]
    pub candidate: PathBuf,

    /// Samples CSV to compare against
    #[arg(long)]
    pub reference: PathBuf,

    /// The files hold forecast rows
    #[arg(long)]
    pub forecast: bool,
}

fn read_samples(product: Product, path: &Path) -> Result<SiteSamples> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    SiteSamples::read_csv(product, file)
        .with_context(|| format!("Failed to read samples from {}", path.display()))
}

/// Returns whether every site and variable agrees.
pub fn compare(args: &CompareArgs) -> Result<bool> {
    let product = if args.forecast {
        Product::Forecast35Day
    } else {
        Product::Analysis
    };
    let candidate = read_samples(product, &args.candidate)?;
    let reference = read_samples(product, &args.reference)?;

    let comparisons = candidate.compare(&reference);
    if comparisons.is_empty() {
        bail!("no matching rows between the two files");
    }
    for c in comparisons.iter().filter(|c| !c.acceptable) {
        warn!(
            site_id = %c.site_id,
            variable = %c.variable,
            mean_diff = c.stats.mean_diff,
            correlation = c.stats.correlation,
            "Series disagree"
        );
    }

    println!("{}", serde_json::to_string_pretty(&comparisons)?);
    Ok(comparisons.iter().all(|c| c.acceptable))
}

// ============================================================================
// stage
// ============================================================================

#[derive(Args, Debug)]
pub struct StageArgs {
    /// Stage number (1, 2 or 3)
    #[arg(long)]
    pub stage: u8,

    /// Challenge project, e.g. neon4cast
    #[arg(long)]
    pub project_id: String,

    /// Reference date (YYYY-MM-DD); required for stages 1 and 2
    #[arg(long)]
    pub start_date: Option<String>,

    /// Stage 3 only: a single site
    #[arg(long)]
    pub site_id: Option<String>,

    /// GEFS version segment of the path
    #[arg(long, default_value = "v12")]
    pub version: String,

    /// Decode each file and print its row count
    #[arg(long)]
    pub rows: bool,

    /// Download every listed file under this directory
    #[arg(long)]
    pub download: Option<PathBuf>,
}

pub async fn stage(args: &StageArgs, config: &DriversConfig) -> Result<()> {
    let mut request = StageRequest::new(Stage::from_number(args.stage)?, &args.project_id);
    request.version = args.version.clone();
    if let Some(date) = &args.start_date {
        request = request.with_start_date(date);
    }
    if let Some(site) = &args.site_id {
        request = request.with_site_id(site);
    }

    let store = efi_object_store(&config.efi)?;
    let dataset = StageDataset::open(store, &request).await?;

    let mut out = io::stdout().lock();
    for file in dataset.files() {
        if args.rows {
            let rows = row_count(&dataset.read_file(file).await?);
            writeln!(out, "{}\t{}\t{}", file.location, file.size, rows)?;
        } else {
            writeln!(out, "{}\t{}", file.location, file.size)?;
        }
    }
    out.flush()?;
    drop(out);

    if let Some(dir) = &args.download {
        let prefix = dataset.prefix().to_string();
        for file in dataset.files() {
            let location = file.location.to_string();
            let relative = location
                .strip_prefix(&prefix)
                .unwrap_or(&location)
                .trim_start_matches('/');
            let target = dir.join(relative);
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            let bytes = dataset.fetch(file).await?;
            tokio::fs::write(&target, &bytes)
                .await
                .with_context(|| format!("Failed to write {}", target.display()))?;
        }
        info!(
            files = dataset.files().len(),
            bytes = dataset.total_size(),
            dir = %dir.display(),
            "Downloaded stage files"
        );
    }
    Ok(())
}

// ============================================================================
// validate / submit
// ============================================================================

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Forecast CSV or CSV.GZ file
    pub file: PathBuf,
}

/// Returns whether the file is valid.
pub fn validate(args: &ValidateArgs) -> Result<bool> {
    let report = validate_forecast(&args.file)?;
    println!("{}", report);
    Ok(report.is_valid())
}

#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Forecast CSV or CSV.GZ file
    pub file: PathBuf,

    /// Challenge project to submit to
    #[arg(long)]
    pub project_id: String,

    /// Upload without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// AWS CLI executable
    #[arg(long)]
    pub cli_program: Option<String>,
}

/// Returns whether the file was uploaded.
pub async fn submit_forecast(args: &SubmitArgs, config: &DriversConfig) -> Result<bool> {
    let mut options = config.submit.clone();
    if args.yes {
        options.ask = false;
    }
    if let Some(program) = &args.cli_program {
        options.cli_program = program.clone();
    }

    let mut prompt = LinePrompt::terminal();
    let outcome = submit(
        Some(args.file.as_path()),
        Some(args.project_id.as_str()),
        &options,
        &mut prompt,
    )
    .await?;

    match outcome {
        SubmitOutcome::Submitted { destination, .. } => {
            println!("Submitted to {}", destination);
            Ok(true)
        }
        SubmitOutcome::Rejected(report) => {
            println!("{}", report);
            println!("Forecast was not in a valid format and was not submitted.");
            Ok(false)
        }
        SubmitOutcome::Declined => {
            println!("Forecast was not submitted to server.");
            Ok(false)
        }
    }
}
