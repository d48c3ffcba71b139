use crate::fetcher::Fetcher;
use crate::parser::ListingParser;
use crate::{JobCollection, Result, ScraperConfig, SearchQuery};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Path and query of a results page, relative to the site origin.
const SEARCH_PATH: &str = "/jobs/search";

/// The `SearchEngine` struct walks the result pages of a search and collects every listing.
/// It fetches pages strictly one after another and stops at the first empty page,
/// the first failed fetch, or the page budget, whichever comes first.
pub struct SearchEngine {
    /// Downloads pages, handling rate limiting.
    fetcher: Fetcher,
    /// Turns page markup into records.
    parser: ListingParser,
    /// The configuration settings for the scraper.
    config: ScraperConfig,
}

impl SearchEngine {
    /// Creates a new `SearchEngine` with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration settings for the scraper.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `SearchEngine` instance, or an error if the client could not be created.
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let fetcher = Fetcher::new(&config)?;
        let parser = ListingParser::new(config.origin.clone())?;

        Ok(Self {
            fetcher,
            parser,
            config,
        })
    }

    /// Builds the URL of one results page for `query`.
    pub fn search_url(&self, query: &SearchQuery, page: u32) -> String {
        build_search_url(&self.config.origin, query, page)
    }

    /// Scrapes result pages `1..=query.max_pages` in order.
    ///
    /// # Arguments
    ///
    /// * `query` - The search to run.
    ///
    /// # Returns
    ///
    /// All records collected before the scrape ended. A failed fetch ends the
    /// scrape early but keeps what was already gathered.
    #[instrument(skip(self, query), fields(keywords = %query.keywords, location = %query.location))]
    pub async fn scrape(&self, query: &SearchQuery) -> JobCollection {
        let mut jobs = JobCollection::new();

        let progress = ProgressBar::new_spinner();
        progress.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        progress.enable_steady_tick(Duration::from_millis(120));

        for page in 1..=query.max_pages {
            let url = self.search_url(query, page);
            debug!("Search URL: {}", url);
            progress.set_message(format!(
                "Fetching page {}/{} ({} jobs so far)...",
                page,
                query.max_pages,
                jobs.len()
            ));

            let html = match self.fetcher.fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!("Stopping at page {}: {}", page, e);
                    break;
                }
            };

            let records = self.parser.parse_page(&html);
            if records.is_empty() {
                info!("No jobs found on page {}. Stopping.", page);
                break;
            }

            let found = records.len();
            jobs.extend(records);
            info!("Scraped page {} successfully ({} jobs)", page, found);

            let pause = self.config.page_delay.sample();
            progress.set_message(format!("Waiting {:.1?} before the next request...", pause));
            sleep(pause).await;
        }

        progress.finish_with_message(format!("Completed: {} jobs scraped", jobs.len()));
        jobs
    }
}

/// Fills the results-page template for `query` and `page`.
///
/// Keywords and location are split on whitespace, each word percent-encoded,
/// and the words joined with `+`.
pub fn build_search_url(origin: &str, query: &SearchQuery, page: u32) -> String {
    format!(
        "{}{}?q={}&w={}&f={}&page={}",
        origin.trim_end_matches('/'),
        SEARCH_PATH,
        encode_terms(&query.keywords),
        encode_terms(&query.location),
        query.days_since_posted,
        page
    )
}

fn encode_terms(terms: &str) -> String {
    terms
        .split_whitespace()
        .map(|word| urlencoding::encode(word).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}
