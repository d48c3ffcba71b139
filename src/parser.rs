use crate::{JobRecord, Result, ScraperError, SENTINEL};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

/// One listing on a search-results page.
const LISTING_SELECTOR: &str = "article.a";
const TITLE_SELECTOR: &str = "a.text-base";
const COMPANY_SELECTOR: &str = "div.ui-company";
const LOCATION_SELECTOR: &str = "div.ui-location";
const SALARY_SELECTOR: &str = "div.ui-salary";
const LINK_SELECTOR: &str = r#"a[data-js="jobLink"]"#;

/// A pound figure, optionally followed by a second one forming a range.
const SALARY_PATTERN: &str = r"£[\d,]+(?:\s*-\s*£[\d,]+)?";

/// The `ListingParser` struct turns search-result markup into [`JobRecord`]s.
/// Every field is looked up independently; a missing element yields [`SENTINEL`]
/// instead of failing the record.
pub struct ListingParser {
    /// Site origin used to absolutize root-relative links.
    origin: String,
    listing: Selector,
    title: Selector,
    company: Selector,
    location: Selector,
    salary: Selector,
    link: Selector,
    salary_pattern: Regex,
}

impl ListingParser {
    /// Creates a parser that resolves relative links against `origin`.
    pub fn new(origin: impl Into<String>) -> Result<Self> {
        let origin = origin.into().trim_end_matches('/').to_string();

        Ok(Self {
            origin,
            listing: selector(LISTING_SELECTOR)?,
            title: selector(TITLE_SELECTOR)?,
            company: selector(COMPANY_SELECTOR)?,
            location: selector(LOCATION_SELECTOR)?,
            salary: selector(SALARY_SELECTOR)?,
            link: selector(LINK_SELECTOR)?,
            salary_pattern: Regex::new(SALARY_PATTERN)
                .map_err(|e| ScraperError::ExtractionError(e.to_string()))?,
        })
    }

    /// Parses every listing on a results page, in document order.
    ///
    /// An empty vector means the page has no listings, i.e. the result set is exhausted.
    #[instrument(skip(self, html), fields(html_length = html.len()))]
    pub fn parse_page(&self, html: &str) -> Vec<JobRecord> {
        let document = Html::parse_document(html);

        let records: Vec<JobRecord> = document
            .select(&self.listing)
            .map(|listing| self.parse_listing(listing))
            .collect();

        debug!("Parsed {} listings", records.len());
        records
    }

    /// Maps one listing element to a flat record.
    pub fn parse_listing(&self, listing: ElementRef<'_>) -> JobRecord {
        let title = first_match(listing, &self.title)
            .map(trimmed_text)
            .unwrap_or_else(|| SENTINEL.to_string());

        // Secondary descriptors follow the name as separate text nodes.
        let company = first_match(listing, &self.company)
            .map(|el| {
                let joined = el
                    .text()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join("/");
                first_segment(&joined, '/')
            })
            .unwrap_or_else(|| SENTINEL.to_string());

        let location = first_match(listing, &self.location)
            .map(|el| first_segment(&trimmed_text(el), ','))
            .unwrap_or_else(|| SENTINEL.to_string());

        let salary = first_match(listing, &self.salary)
            .map(|el| self.extract_salary(&trimmed_text(el)))
            .unwrap_or_else(|| SENTINEL.to_string());

        let link = first_match(listing, &self.link)
            .and_then(|el| el.value().attr("href"))
            .map(|href| self.resolve_link(href))
            .unwrap_or_else(|| SENTINEL.to_string());

        JobRecord {
            title,
            company,
            location,
            salary,
            link,
        }
    }

    /// Pulls the salary figure out of text that may carry extra wording.
    pub fn extract_salary(&self, raw: &str) -> String {
        self.salary_pattern
            .find(raw)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| SENTINEL.to_string())
    }

    /// Prefixes root-relative links with the site origin; other links pass through.
    pub fn resolve_link(&self, href: &str) -> String {
        if href.starts_with('/') {
            format!("{}{}", self.origin, href)
        } else {
            href.to_string()
        }
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| ScraperError::ExtractionError(format!("invalid selector {}: {}", css, e)))
}

fn first_match<'a>(listing: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    listing.select(selector).next()
}

fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn first_segment(text: &str, separator: char) -> String {
    text.split(separator).next().unwrap_or("").trim().to_string()
}
