use serde::{Deserialize, Serialize};

/// What to search for on the job board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text keywords, e.g. a job title.
    pub keywords: String,
    /// Free-text location, e.g. a city.
    pub location: String,
    /// Only listings posted within this many days.
    pub days_since_posted: u32,
    /// Upper bound on result pages visited; at least 1.
    pub max_pages: u32,
}

impl SearchQuery {
    pub fn new(
        keywords: impl Into<String>,
        location: impl Into<String>,
        days_since_posted: u32,
        max_pages: u32,
    ) -> Self {
        Self {
            keywords: keywords.into(),
            location: location.into(),
            days_since_posted,
            max_pages,
        }
    }
}

/// One parsed job listing. Fields missing from the markup hold [`crate::SENTINEL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Company")]
    pub company: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Salary")]
    pub salary: String,
    #[serde(rename = "Job Link")]
    pub link: String,
}

impl JobRecord {
    /// Spreadsheet column headers, in field order.
    pub const COLUMNS: [&'static str; 5] = ["Title", "Company", "Location", "Salary", "Job Link"];

    /// The field values in the same order as [`JobRecord::COLUMNS`].
    pub fn values(&self) -> [&str; 5] {
        [
            self.title.as_str(),
            self.company.as_str(),
            self.location.as_str(),
            self.salary.as_str(),
            self.link.as_str(),
        ]
    }
}

/// Records in scrape order: page ascending, then listing order within the page.
pub type JobCollection = Vec<JobRecord>;
