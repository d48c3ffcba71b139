use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

pub mod config;
pub mod fetcher;
pub mod output;
pub mod parser;
pub mod search;
pub mod types;

// Re-export commonly used types
pub use crate::config::ScraperConfig;
pub use crate::types::{JobCollection, JobRecord, SearchQuery};

/// The `ScraperError` enum represents various errors that can occur in the scraper application.
#[derive(Error, Debug)]
pub enum ScraperError {
    /// Represents an error that occurs during an HTTP request.
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),
    /// The server kept answering 429 until the retry budget ran out.
    #[error("Rate limit exceeded after {attempts} attempts")]
    RateLimitError { attempts: u32 },
    /// Any non-200 status other than 429.
    #[error("Request failed with status {0}")]
    HttpStatus(StatusCode),
    /// Represents an error that occurs during content extraction.
    #[error("Content extraction failed: {0}")]
    ExtractionError(String),
    /// A required setting is missing or could not be parsed.
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ::config::ConfigError),
    /// A setting was read but its value is not usable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    /// Writing the spreadsheet failed.
    #[error("Failed to write output: {0}")]
    OutputError(#[from] rust_xlsxwriter::XlsxError),
}

/// A type alias for `Result` with the `ScraperError` error type.
pub type Result<T> = std::result::Result<T, ScraperError>;

// Constants

/// Placeholder stored in a record field whose markup element is missing.
pub const SENTINEL: &str = "N/A";
/// The default timeout duration for HTTP requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// The default maximum number of attempts for a rate-limited request.
pub const DEFAULT_MAX_RETRIES: u32 = 5;
/// The delay before the first retry after a 429; doubled on every retry.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);
/// Bounds of the randomized pause after every scraped page.
pub const DEFAULT_PAGE_DELAY_MIN: Duration = Duration::from_secs(3);
pub const DEFAULT_PAGE_DELAY_MAX: Duration = Duration::from_secs(7);
/// Where the spreadsheet goes when no output path is configured.
pub const DEFAULT_OUTPUT_FILE: &str = "scraped_jobs.xlsx";
