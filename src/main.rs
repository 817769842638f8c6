mod aggregate;
mod charts;
mod forecast;
mod page;
mod records;

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use forecast::LinearTrend;
use records::Dataset;

/// Renders the COVID-19 India data dashboard to a single HTML page.
#[derive(Parser)]
#[command(name = "india-covid-dashboard", version, about)]
struct Args {
    /// Path to the covid_19_india.csv dataset
    #[arg(long, default_value = "covid_19_india.csv")]
    data: PathBuf,

    /// State or union territory for the regional and forecast charts;
    /// defaults to the first entry of the sorted region list
    #[arg(long)]
    region: Option<String>,

    /// Output HTML file
    #[arg(long, default_value = "dashboard.html")]
    out: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "india_covid_dashboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let dataset = Dataset::load(&args.data)?;
    let filtered = records::without_flagged(dataset.records());
    let regions = records::region_labels(&filtered);
    let Some(first_region) = regions.first() else {
        bail!(
            "{} holds no usable records after filtering",
            dataset.path().display()
        );
    };

    let region = match args.region {
        Some(r) if regions.contains(&r) => r,
        Some(r) => bail!(
            "unknown region {r:?}; valid regions are: {}",
            regions.join(", ")
        ),
        None => first_region.clone(),
    };
    info!(%region, regions = regions.len(), rows = filtered.len(), "rendering dashboard");

    let html = page::render_dashboard(&filtered, &regions, &region, &LinearTrend);
    fs::write(&args.out, html)
        .with_context(|| format!("cannot write {}", args.out.display()))?;
    info!("dashboard written to {}", args.out.display());

    Ok(())
}
