use anyhow::Context;
use jobscrape::{config::ScraperConfig, output::write_xlsx, search::SearchEngine};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// The main entry point of the application.
///
/// Loads the configuration, scrapes the configured search page by page, and writes
/// whatever was collected to the output spreadsheet. The optional first and second
/// arguments override the configured keywords and location.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut config = ScraperConfig::from_env().context("failed to load configuration")?;

    if let Some(keywords) = std::env::args().nth(1) {
        config.query.keywords = keywords;
    }
    if let Some(location) = std::env::args().nth(2) {
        config.query.location = location;
    }

    let start_time = Instant::now();
    let query = config.query.clone();
    let output_file = config.output_file.clone();

    info!(
        "Searching '{}' in '{}' (posted within {} days, up to {} pages)",
        query.keywords, query.location, query.days_since_posted, query.max_pages
    );

    let search_engine = SearchEngine::new(config)?;
    let jobs = search_engine.scrape(&query).await;

    if jobs.is_empty() {
        warn!("No jobs found for '{}' in '{}'", query.keywords, query.location);
    }

    write_xlsx(&jobs, &output_file)
        .with_context(|| format!("failed to write {}", output_file.display()))?;

    println!("\n=== Scrape Summary ===");
    println!("Keywords: {}", query.keywords);
    println!("Location: {}", query.location);
    println!("Jobs collected: {}", jobs.len());
    println!("Output file: {}", output_file.display());
    println!("Processing time: {:.2?}", start_time.elapsed());

    Ok(())
}
