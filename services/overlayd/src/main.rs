//! Weather overlay daemon.
//!
//! Acquires a wind vector field over metropolitan France, fetches active
//! vigilance alerts, and binds both to a renderer. Runs single-shot with
//! `--once` or keeps refreshing on an interval.

mod binding;
mod markers;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use field_cache::FileFieldCache;
use overlay_common::{BoundingBox, RenderConfig};
use vigilance::{parse_regions, Echeance, HazardFilters, HazardProvider, OpendatasoftClient};
use wind_pipeline::{AcquireConfig, OpenMeteoClient, Orchestrator};

use binding::{RenderBinding, TracingRenderer};
use markers::{build_markers, severity_from};

#[derive(Parser, Debug)]
#[command(name = "overlayd")]
#[command(about = "Wind overlay and vigilance marker daemon")]
struct Args {
    /// Run one acquisition cycle and exit
    #[arg(long)]
    once: bool,

    /// Northern latitude of the overlay extent
    #[arg(long, default_value = "51.1")]
    top: f64,

    /// Southern latitude of the overlay extent
    #[arg(long, default_value = "41.3")]
    bottom: f64,

    /// Western longitude of the overlay extent
    #[arg(long, default_value = "-5.5")]
    left: f64,

    /// Eastern longitude of the overlay extent
    #[arg(long, default_value = "9.8")]
    right: f64,

    /// Requested grid columns
    #[arg(long, default_value = "8")]
    nx: usize,

    /// Requested grid rows
    #[arg(long, default_value = "8")]
    ny: usize,

    /// Directory for the persistent field cache
    #[arg(long, env = "CACHE_DIR", default_value = "/data/overlay-cache")]
    cache_dir: PathBuf,

    /// Entries older than this many hours are swept at startup
    #[arg(long, default_value = "24")]
    max_cache_age_hours: u64,

    /// Drop cached entries before the first acquisition
    #[arg(long)]
    purge: bool,

    /// Vigilance lead time: J (today) or J1 (tomorrow)
    #[arg(long, default_value = "J", value_parser = parse_echeance)]
    echeance: Echeance,

    /// Department boundary GeoJSON file; markers are skipped without it
    #[arg(long, env = "BOUNDARIES_FILE")]
    boundaries: Option<PathBuf>,

    /// Map zoom level used for marker sizing
    #[arg(long, default_value = "5.5")]
    zoom: f64,

    /// Show alerts for this department code only
    #[arg(long)]
    department: Option<String>,

    /// Show alerts for this phenomenon identifier only
    #[arg(long)]
    phenomenon: Option<u32>,

    /// Show alerts beginning on this date only (YYYY-MM-DD)
    #[arg(long)]
    date: Option<chrono::NaiveDate>,

    /// Seconds between refresh cycles
    #[arg(long, default_value = "300")]
    refresh_secs: u64,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn parse_echeance(s: &str) -> Result<Echeance, String> {
    match s.to_uppercase().as_str() {
        "J" | "TODAY" => Ok(Echeance::Today),
        "J1" | "TOMORROW" => Ok(Echeance::Tomorrow),
        other => Err(format!("unknown echeance '{other}', expected J or J1")),
    }
}

impl Args {
    fn bbox(&self) -> Result<BoundingBox> {
        BoundingBox::new(self.top, self.bottom, self.left, self.right)
            .context("invalid overlay extent")
    }

    fn filters(&self) -> HazardFilters {
        HazardFilters {
            department: self.department.clone(),
            phenomenon_id: self.phenomenon,
            date: self.date,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let bbox = args.bbox()?;
    let filters = args.filters();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!(nx = args.nx, ny = args.ny, "Starting overlay daemon");

    let cache = Arc::new(
        FileFieldCache::open(&args.cache_dir)
            .await
            .context("opening field cache")?,
    );
    match cache
        .sweep_older_than(chrono::Duration::hours(args.max_cache_age_hours as i64))
        .await
    {
        Ok(0) => {}
        Ok(swept) => info!(swept, "Swept stale cache entries"),
        Err(e) => warn!(error = %e, "Cache sweep failed"),
    }

    let provider = Arc::new(OpenMeteoClient::new().context("building wind client")?);
    let orchestrator = Arc::new(Orchestrator::new(
        provider,
        cache.clone(),
        AcquireConfig::default(),
    ));

    let hazards = OpendatasoftClient::new().context("building vigilance client")?;

    let shapes = match &args.boundaries {
        Some(path) => {
            let geojson = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading boundaries from {}", path.display()))?;
            let shapes = parse_regions(&geojson).context("parsing boundary GeoJSON")?;
            info!(regions = shapes.len(), "Loaded department boundaries");
            shapes
        }
        None => {
            warn!("No boundaries file; severity markers disabled");
            Vec::new()
        }
    };

    let mut binding = RenderBinding::new(
        orchestrator,
        Box::new(TracingRenderer),
        bbox,
        args.nx,
        args.ny,
        RenderConfig::default(),
    );

    if args.purge {
        binding.purge_and_reload().await;
    } else {
        binding.reload().await;
    }
    refresh_markers(&mut binding, &hazards, args.echeance, &filters, &shapes, args.zoom).await;

    if args.once {
        return Ok(());
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(args.refresh_secs.max(1)));
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                binding.reload().await;
                refresh_markers(&mut binding, &hazards, args.echeance, &filters, &shapes, args.zoom).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down");
                return Ok(());
            }
        }
    }
}

/// Fetch alerts and rebind markers. A feed failure keeps the previous
/// markers in place rather than blanking them.
async fn refresh_markers(
    binding: &mut RenderBinding,
    hazards: &OpendatasoftClient,
    echeance: Echeance,
    filters: &HazardFilters,
    shapes: &[vigilance::RegionShape],
    zoom: f64,
) {
    if shapes.is_empty() {
        return;
    }
    match hazards.fetch(echeance).await {
        Ok(records) => {
            let severity = severity_from(records, filters);
            let markers = build_markers(&severity, shapes, zoom);
            info!(markers = markers.len(), "Vigilance markers refreshed");
            binding.set_markers(markers);
        }
        Err(e) => warn!(error = %e, "Vigilance fetch failed; keeping previous markers"),
    }
}
