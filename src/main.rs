//! SOI Trends - ZIP Code Income Change Charts
//!
//! Loads IRS SOI ZIP code CSV files, computes the year-over-year change in
//! aggregate AGI per ZIP code and charts it for one ZIP code.

mod charts;
mod data;
mod gui;
mod stats;

use anyhow::{anyhow, Context, Result};
use charts::{ChangeSeries, StaticChartRenderer};
use clap::Parser;
use data::{ColumnMap, DataLoader, DataProcessor};
use gui::TrendApp;
use stats::ChangeCalculator;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "soi-trends")]
#[command(about = "Chart year-over-year AGI change for a ZIP code from IRS SOI data")]
#[command(version)]
struct Args {
    /// Directory containing SOI ZIP code CSV files
    #[arg(short, long, default_value = "data", env = "SOI_DATA_DIR")]
    data_dir: PathBuf,

    /// ZIP code to chart
    #[arg(short, long, default_value = "10001", env = "SOI_ZIP")]
    zip: String,

    /// Source column holding the ZIP code
    #[arg(long, default_value = "zipcode")]
    zip_column: String,

    /// Source column holding the tax year
    #[arg(long, default_value = "year")]
    year_column: String,

    /// Source column holding aggregate AGI
    #[arg(long, default_value = "A00100")]
    income_column: String,

    /// Also write the chart to this PNG file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Open the PNG with the system viewer
    #[arg(long)]
    open: bool,

    /// Do not open the chart window
    #[arg(long)]
    headless: bool,
}

impl Args {
    fn columns(&self) -> ColumnMap {
        ColumnMap {
            zip: self.zip_column.clone(),
            year: self.year_column.clone(),
            income: self.income_column.clone(),
        }
    }

    /// PNG destination; `--open` alone renders into the temp directory.
    fn image_path(&self) -> Option<PathBuf> {
        match (&self.output, self.open) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => Some(std::env::temp_dir().join(format!("soi_change_{}.png", self.zip))),
            (None, false) => None,
        }
    }
}

fn main() -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    let args = Args::parse();
    debug!(?args, "startup");

    // Load
    let mut loader = DataLoader::new();
    let raw = loader
        .load_dir(&args.data_dir)
        .with_context(|| format!("loading {}", args.data_dir.display()))?;

    // Clean
    let income = DataProcessor::prepare_income(raw, &args.columns())
        .context("preprocessing income records")?;
    debug!(
        files = ?loader.get_files(),
        rows = loader.get_row_count(),
        columns = ?loader.get_columns(),
        "source data"
    );

    // Aggregate
    let aggregated = ChangeCalculator::aggregate(&income).context("aggregating income")?;

    // Visualize
    let selected = DataProcessor::filter_by_zip(&aggregated, &args.zip)
        .with_context(|| format!("selecting ZIP code {}", args.zip))?;
    let series = ChangeSeries::from_frame(&args.zip, &selected)?;
    if series.is_empty() {
        warn!(zip = %args.zip, "ZIP code not found, chart will be empty");
    } else {
        info!(zip = %args.zip, years = series.points.len(), "selected ZIP code");
    }

    if let Some(path) = args.image_path() {
        StaticChartRenderer::render_png(&series, &path, (1000, 600))
            .with_context(|| format!("rendering {}", path.display()))?;
        if args.open {
            open::that(&path).with_context(|| format!("opening {}", path.display()))?;
        }
    }

    if !args.headless {
        TrendApp::run(series).map_err(|e| anyhow!("chart window failed: {e}"))?;
    }

    Ok(())
}
