//! CLI entry point for the Citi Bike 2022 dashboard.
//!
//! Each run is one rendering pass: resolve data locations, build the filter
//! selection, render the requested page and optionally export the results.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use citibike_dashboard::config::DataConfig;
use citibike_dashboard::filter::FilterConfig;
use citibike_dashboard::loader::RecordStore;
use citibike_dashboard::output::{write_csv, write_json};
use citibike_dashboard::pages::{self, Page};
use citibike_dashboard::pipeline::Pipeline;
use citibike_dashboard::types::{DailyPoint, Season, StationTotal};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser)]
#[command(name = "citibike_dashboard")]
#[command(about = "Descriptive analytics over the 2022 Citi Bike trip extracts", long_about = None)]
struct Cli {
    /// Page to render
    #[arg(value_enum, default_value_t = Page::Overview)]
    page: Page,

    /// Directory holding the CSV extracts [env: CITIBIKE_DATA_DIR]
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Pre-rendered flow map [env: CITIBIKE_MAP_PATH]
    #[arg(long)]
    map_path: Option<PathBuf>,

    /// Season(s) to include; defaults to every season in the sample
    #[arg(short, long = "season", value_name = "SEASON")]
    seasons: Vec<Season>,

    /// Restrict to specific start station(s)
    #[arg(long = "station", value_name = "NAME")]
    stations: Vec<String>,

    /// Number of top start stations to show
    #[arg(short = 'n', long, default_value_t = 20, value_parser = clap::value_parser!(u8).range(5..=20))]
    top_n: u8,

    /// First day of the daily chart range (YYYY-MM-DD)
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Last day of the daily chart range (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Print the start stations available to --station and exit
    #[arg(long)]
    list_stations: bool,

    /// Write ranked_stations.csv, daily_series.csv and summary.json here
    #[arg(long)]
    export_dir: Option<PathBuf>,
}

fn init_logging() {
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    tracing_subscriber::registry().with(stderr_layer).init();
}

/// Overlay CLI selections on the data-derived defaults.
fn build_filters(cli: &Cli, pipeline: &Pipeline<'_>) -> Result<FilterConfig> {
    let mut filters = pipeline.default_filters().with_top_n(usize::from(cli.top_n));
    if !cli.seasons.is_empty() {
        filters = filters.with_seasons(cli.seasons.iter().copied());
    }
    if !cli.stations.is_empty() {
        filters = filters.with_stations(cli.stations.iter().cloned());
    }
    filters = filters.with_partial_range(cli.from, cli.to, pipeline.daily_bounds())?;
    let unknown = pipeline.unknown_stations(&filters);
    if !unknown.is_empty() {
        warn!(stations = ?unknown, "selected stations never appear in the trip sample");
    }
    debug!(?filters, "filters resolved");
    Ok(filters)
}

fn export(dir: &Path, pipeline: &Pipeline<'_>, filters: &FilterConfig) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let ranked: Vec<StationTotal> = pipeline
        .stations(filters)
        .ready()
        .map(|v| v.ranked.clone())
        .unwrap_or_default();
    write_csv(&dir.join("ranked_stations.csv"), &ranked).context("exporting ranked stations")?;

    let series: Vec<DailyPoint> = pipeline
        .weather(filters)
        .ready()
        .map(|v| v.series.clone())
        .unwrap_or_default();
    write_csv(&dir.join("daily_series.csv"), &series).context("exporting daily series")?;

    let summary = pipeline.summary(filters);
    write_json(&dir.join("summary.json"), &summary).context("exporting summary")?;
    info!(dir = %dir.display(), "export complete");
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    let config = DataConfig::resolve(cli.data_dir.clone(), cli.map_path.clone());
    info!(data_dir = %config.data_dir.display(), "starting dashboard pass");

    let store = RecordStore::new(config);
    let pipeline = Pipeline::new(&store);
    if cli.list_stations {
        match pipeline.station_choices() {
            Some(choices) => choices.iter().for_each(|name| println!("{name}")),
            None => bail!("trip sample could not be loaded; no stations to list"),
        }
        return Ok(());
    }
    let filters = build_filters(&cli, &pipeline)?;

    println!("{}", pages::render(cli.page, &pipeline, &filters));

    if let Some(dir) = &cli.export_dir {
        export(dir, &pipeline, &filters)?;
        println!("(Results exported to {})", dir.display());
    }
    Ok(())
}
