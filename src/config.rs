use crate::{Result, ScraperError, SearchQuery};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, Source};
use rand::Rng;
use reqwest::header::HeaderValue;
use reqwest::Url;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// The `ScraperConfig` struct holds the configuration settings for the scraper application.
/// It includes the job board origin, the search to run, the client identities to rotate,
/// the retry policy, the politeness pause and the output location.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Scheme and host of the job board, e.g. `https://www.example.co.uk`.
    pub origin: String,
    /// The search to run.
    pub query: SearchQuery,
    /// User-Agent values; one is drawn at random for every fetch.
    pub user_agents: Vec<String>,
    /// Spreadsheet destination, overwritten on each run.
    pub output_file: PathBuf,
    /// The maximum number of attempts for a rate-limited request.
    pub max_retries: u32,
    /// Delay before the first retry after a 429.
    pub retry_delay: Duration,
    /// Pause after every scraped page.
    pub page_delay: PageDelay,
    /// The timeout duration for HTTP requests.
    pub timeout: Duration,
}

/// Bounds of the randomized pause taken after each page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageDelay {
    pub min: Duration,
    pub max: Duration,
}

impl PageDelay {
    pub fn new(min: Duration, max: Duration) -> Self {
        Self { min, max }
    }

    /// Draws a pause uniformly from `[min, max]`.
    pub fn sample(&self) -> Duration {
        let secs = rand::thread_rng().gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

impl Default for PageDelay {
    fn default() -> Self {
        Self::new(crate::DEFAULT_PAGE_DELAY_MIN, crate::DEFAULT_PAGE_DELAY_MAX)
    }
}

/// Raw settings as they come out of the environment.
#[derive(Debug, Deserialize)]
struct Settings {
    base_url: String,
    job_title: String,
    job_location: String,
    job_days_since_posted: u32,
    max_pages: u32,
    output_file: Option<PathBuf>,
    max_retries: Option<u32>,
    retry_delay_secs: Option<f64>,
    page_delay_min_secs: Option<f64>,
    page_delay_max_secs: Option<f64>,
    request_timeout_secs: Option<f64>,
}

const USER_AGENT_PREFIX: &str = "user_agent_";

impl ScraperConfig {
    /// Creates a configuration for `query` against `origin` with default retry,
    /// pause, timeout and output settings.
    pub fn new(origin: impl Into<String>, query: SearchQuery, user_agents: Vec<String>) -> Self {
        Self {
            origin: origin.into(),
            query,
            user_agents,
            output_file: PathBuf::from(crate::DEFAULT_OUTPUT_FILE),
            max_retries: crate::DEFAULT_MAX_RETRIES,
            retry_delay: crate::DEFAULT_RETRY_DELAY,
            page_delay: PageDelay::default(),
            timeout: crate::DEFAULT_TIMEOUT,
        }
    }

    /// Loads the configuration from the process environment, reading a `.env`
    /// file first if one exists.
    ///
    /// # Returns
    ///
    /// A validated `ScraperConfig`, or an error naming the missing or malformed setting.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        Self::load(Config::builder().add_source(Environment::default()))
    }

    /// Builds and validates a configuration from any `config` source stack.
    ///
    /// Keys are the lower-cased environment names: `base_url`, `job_title`,
    /// `job_location`, `job_days_since_posted`, `max_pages`, `user_agent_<n>`
    /// and the optional `output_file`, `max_retries`, `retry_delay_secs`,
    /// `page_delay_min_secs`, `page_delay_max_secs`, `request_timeout_secs`.
    pub fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let source = builder.build()?;
        let user_agents = collect_user_agents(&source)?;
        let settings: Settings = source.try_deserialize()?;

        let page_delay = PageDelay::new(
            secs_setting("page_delay_min_secs", settings.page_delay_min_secs)?
                .unwrap_or(crate::DEFAULT_PAGE_DELAY_MIN),
            secs_setting("page_delay_max_secs", settings.page_delay_max_secs)?
                .unwrap_or(crate::DEFAULT_PAGE_DELAY_MAX),
        );

        let config = Self {
            origin: settings.base_url.trim_end_matches('/').to_string(),
            query: SearchQuery::new(
                settings.job_title,
                settings.job_location,
                settings.job_days_since_posted,
                settings.max_pages,
            ),
            user_agents,
            output_file: settings
                .output_file
                .unwrap_or_else(|| PathBuf::from(crate::DEFAULT_OUTPUT_FILE)),
            max_retries: settings.max_retries.unwrap_or(crate::DEFAULT_MAX_RETRIES),
            retry_delay: secs_setting("retry_delay_secs", settings.retry_delay_secs)?
                .unwrap_or(crate::DEFAULT_RETRY_DELAY),
            page_delay,
            timeout: secs_setting("request_timeout_secs", settings.request_timeout_secs)?
                .unwrap_or(crate::DEFAULT_TIMEOUT),
        };

        config.validate()?;
        Ok(config)
    }

    /// Checks the settings that must hold before any request is made.
    pub fn validate(&self) -> Result<()> {
        let origin = Url::parse(&self.origin)
            .map_err(|e| invalid(format!("base_url {:?} is not an absolute URL: {}", self.origin, e)))?;
        if !matches!(origin.scheme(), "http" | "https") {
            return Err(invalid(format!("base_url must be http or https, got {}", origin.scheme())));
        }

        if self.query.max_pages < 1 {
            return Err(invalid("max_pages must be at least 1"));
        }
        if self.max_retries < 1 {
            return Err(invalid("max_retries must be at least 1"));
        }

        if self.user_agents.is_empty() {
            return Err(invalid("at least one user_agent_<n> must be set"));
        }
        for agent in &self.user_agents {
            HeaderValue::from_str(agent)
                .map_err(|_| invalid(format!("user agent {:?} is not a valid header value", agent)))?;
        }

        if self.page_delay.min > self.page_delay.max {
            return Err(invalid("page_delay_min_secs must not exceed page_delay_max_secs"));
        }
        if self.timeout.is_zero() {
            return Err(invalid("request_timeout_secs must be greater than zero"));
        }

        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> ScraperError {
    ScraperError::InvalidConfig(msg.into())
}

fn secs_setting(key: &str, value: Option<f64>) -> Result<Option<Duration>> {
    value
        .map(|secs| {
            Duration::try_from_secs_f64(secs)
                .map_err(|_| invalid(format!("{} must be a non-negative number of seconds", key)))
        })
        .transpose()
}

/// Gathers the non-blank `user_agent_<n>` values ordered by `n`.
fn collect_user_agents(source: &Config) -> Result<Vec<String>> {
    let mut slots: Vec<(u32, String)> = source
        .collect()?
        .into_iter()
        .filter_map(|(key, value)| {
            let slot = key.strip_prefix(USER_AGENT_PREFIX)?.parse::<u32>().ok()?;
            let agent = value.into_string().ok()?;
            let agent = agent.trim();
            (!agent.is_empty()).then(|| (slot, agent.to_string()))
        })
        .collect();

    slots.sort_by_key(|(slot, _)| *slot);
    Ok(slots.into_iter().map(|(_, agent)| agent).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder(pairs: &[(&str, &str)]) -> ConfigBuilder<DefaultState> {
        pairs
            .iter()
            .fold(Config::builder(), |b, (key, value)| b.set_override(*key, *value).unwrap())
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("base_url", "https://jobs.example.com/"),
            ("job_title", "data engineer"),
            ("job_location", "London"),
            ("job_days_since_posted", "3"),
            ("max_pages", "4"),
            ("user_agent_1", "agent-one"),
        ]
    }

    #[test]
    fn test_load_applies_defaults() {
        let config = ScraperConfig::load(builder(&required())).unwrap();

        assert_eq!(config.origin, "https://jobs.example.com");
        assert_eq!(config.query, SearchQuery::new("data engineer", "London", 3, 4));
        assert_eq!(config.user_agents, vec!["agent-one".to_string()]);
        assert_eq!(config.output_file, PathBuf::from("scraped_jobs.xlsx"));
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.retry_delay, Duration::from_secs(2));
        assert_eq!(config.page_delay, PageDelay::default());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_load_reads_optional_settings() {
        let mut pairs = required();
        pairs.extend([
            ("output_file", "out/jobs.xlsx"),
            ("max_retries", "2"),
            ("retry_delay_secs", "0.5"),
            ("page_delay_min_secs", "1"),
            ("page_delay_max_secs", "1.5"),
            ("request_timeout_secs", "10"),
        ]);

        let config = ScraperConfig::load(builder(&pairs)).unwrap();

        assert_eq!(config.output_file, PathBuf::from("out/jobs.xlsx"));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.retry_delay, Duration::from_millis(500));
        assert_eq!(
            config.page_delay,
            PageDelay::new(Duration::from_secs(1), Duration::from_millis(1500))
        );
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_user_agents_ordered_and_blank_skipped() {
        let mut pairs = required();
        pairs.extend([
            ("user_agent_10", "agent-ten"),
            ("user_agent_2", "   "),
            ("user_agent_3", "agent-three"),
        ]);

        let config = ScraperConfig::load(builder(&pairs)).unwrap();

        assert_eq!(config.user_agents, vec!["agent-one", "agent-three", "agent-ten"]);
    }

    #[test]
    fn test_missing_required_setting() {
        let pairs: Vec<_> = required().into_iter().filter(|(k, _)| *k != "max_pages").collect();
        let result = ScraperConfig::load(builder(&pairs));

        assert!(matches!(result, Err(ScraperError::ConfigError(_))));
    }

    #[test]
    fn test_malformed_number() {
        let mut pairs = required();
        pairs.push(("job_days_since_posted", "three"));
        let result = ScraperConfig::load(builder(&pairs));

        assert!(matches!(result, Err(ScraperError::ConfigError(_))));
    }

    #[test]
    fn test_zero_pages_rejected() {
        let mut pairs = required();
        pairs.push(("max_pages", "0"));
        let result = ScraperConfig::load(builder(&pairs));

        assert!(matches!(result, Err(ScraperError::InvalidConfig(_))));
    }

    #[test]
    fn test_no_user_agents_rejected() {
        let pairs: Vec<_> = required()
            .into_iter()
            .filter(|(k, _)| !k.starts_with("user_agent_"))
            .collect();
        let result = ScraperConfig::load(builder(&pairs));

        assert!(matches!(result, Err(ScraperError::InvalidConfig(_))));
    }

    #[test]
    fn test_relative_origin_rejected() {
        let mut pairs = required();
        pairs.push(("base_url", "/jobs"));
        let result = ScraperConfig::load(builder(&pairs));

        assert!(matches!(result, Err(ScraperError::InvalidConfig(_))));
    }

    #[test]
    fn test_inverted_page_delay_rejected() {
        let mut pairs = required();
        pairs.extend([("page_delay_min_secs", "5"), ("page_delay_max_secs", "2")]);
        let result = ScraperConfig::load(builder(&pairs));

        assert!(matches!(result, Err(ScraperError::InvalidConfig(_))));
    }

    #[test]
    fn test_page_delay_sample_within_bounds() {
        let delay = PageDelay::new(Duration::from_millis(10), Duration::from_millis(20));
        for _ in 0..50 {
            let pause = delay.sample();
            assert!(pause >= delay.min && pause <= delay.max);
        }

        let fixed = PageDelay::new(Duration::ZERO, Duration::ZERO);
        assert_eq!(fixed.sample(), Duration::ZERO);
    }
}
