use anyhow::{Context, Result};
use dotenv::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use webscraper_products::{HttpFetcher, Settings, pipeline};

fn main() -> Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env().context("loading settings")?;
    let fetcher = HttpFetcher::new(&settings).context("building http client")?;

    let reports = pipeline::run(&fetcher, &settings).context("scrape run aborted")?;
    for report in &reports {
        info!(
            name = report.name,
            products = report.products,
            path = %report.path.display(),
            "page done"
        );
    }
    println!("Scraped {} pages successfully.", reports.len());
    Ok(())
}
