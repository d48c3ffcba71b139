use crate::{Result, ScraperConfig, ScraperError};
use rand::Rng;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// The `Fetcher` struct downloads search-result pages.
/// Every call presents a randomly chosen User-Agent and rides out HTTP 429 with a doubling delay.
pub struct Fetcher {
    /// The HTTP client used for making requests.
    client: Client,
    /// Client identities to rotate through; never empty.
    user_agents: Vec<String>,
    /// Attempts allowed per call while the server answers 429.
    max_retries: u32,
    /// Delay before the first retry.
    retry_delay: Duration,
}

impl Fetcher {
    /// Creates a new `Fetcher` with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - The configuration settings for the scraper.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Fetcher` instance, or an error if the client could not be created.
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        if config.user_agents.is_empty() {
            return Err(ScraperError::InvalidConfig(
                "at least one user agent is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .gzip(true)
            .build()
            .map_err(ScraperError::RequestError)?;

        Ok(Self {
            client,
            user_agents: config.user_agents.clone(),
            max_retries: config.max_retries.max(1),
            retry_delay: config.retry_delay,
        })
    }

    /// Fetches a page, retrying while the server rate-limits us.
    ///
    /// # Arguments
    ///
    /// * `url` - The absolute URL of the page.
    ///
    /// # Returns
    ///
    /// The response body on HTTP 200. Any other status, a transport failure, or
    /// `max_retries` consecutive 429 responses yield an error.
    #[instrument(skip(self))]
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let user_agent = self.pick_user_agent();
        let mut retry_delay = self.retry_delay;

        for attempt in 1..=self.max_retries {
            let response = self
                .client
                .get(url)
                .header(USER_AGENT, user_agent)
                .header(ACCEPT, "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
                .header(ACCEPT_LANGUAGE, "en-GB,en;q=0.5")
                .send()
                .await?;

            let status = response.status();
            debug!("Attempt {} response status: {}", attempt, status);

            match status {
                StatusCode::OK => return Ok(response.text().await?),
                StatusCode::TOO_MANY_REQUESTS => {
                    if attempt < self.max_retries {
                        warn!("Rate limited! Retrying in {:?}...", retry_delay);
                        sleep(retry_delay).await;
                        retry_delay = retry_delay.saturating_mul(2);
                    }
                }
                _ => {
                    error!("Request failed with status {}", status);
                    return Err(ScraperError::HttpStatus(status));
                }
            }
        }

        error!("Still rate limited after {} attempts, giving up", self.max_retries);
        Err(ScraperError::RateLimitError {
            attempts: self.max_retries,
        })
    }

    /// Draws one of the configured User-Agent values uniformly at random.
    fn pick_user_agent(&self) -> &str {
        let index = rand::thread_rng().gen_range(0..self.user_agents.len());
        &self.user_agents[index]
    }
}
