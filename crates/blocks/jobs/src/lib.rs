//! Recent job postings scraped from LinkedIn's public search page.

use std::sync::OnceLock;
use std::time::Duration;

use block_contract::{BlockDescriptor, BlockSettings, BlockSource, FetchError};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use serde_json::Value;

/// Registry id of the jobs block.
pub const BLOCK_ID: &str = "jobs";

const DEFAULT_SEARCH_URL: &str = "https://www.linkedin.com/jobs/search/";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Static descriptor: refreshed hourly.
pub fn descriptor() -> BlockDescriptor {
    BlockDescriptor::new(BLOCK_ID, "Jobs", "JOB-03", 3600)
}

/// One posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    /// Position title.
    pub title: String,
    /// Hiring company, `N/A` when absent.
    pub company: String,
    /// Location text.
    pub location: String,
    /// Normalised posting age.
    pub date: String,
    /// Link to the posting.
    pub link: String,
}

/// Jobs payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobList {
    /// Postings, most recent first.
    pub jobs: Vec<Job>,
    /// Number of entries in `jobs`.
    pub total: usize,
    /// Search keywords used.
    pub keywords: String,
    /// Search location used.
    pub location: String,
    /// Always `None` on success; failures travel as [`FetchError`].
    pub error: Option<String>,
}

fn age_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Result<Regex, regex::Error>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(\d+)\s*(hour|day|week)"))
        .as_ref()
        .ok()
}

/// Normalises LinkedIn's relative posting age ("3 hours ago", "1 day ago", ...).
///
/// Unrecognised text is returned lower-cased and trimmed.
pub fn normalize_date(raw: &str) -> String {
    let text = raw.trim().to_lowercase();
    if text.contains("second") || text.contains("minute") {
        return "just now".to_string();
    }
    let Some(caps) = age_pattern().and_then(|re| re.captures(&text)) else {
        return text;
    };
    let Ok(count) = caps[1].parse::<u64>() else {
        return text;
    };
    match &caps[2] {
        "hour" => format!("{count}h ago"),
        "day" if count == 1 => "yesterday".to_string(),
        "day" => format!("{count}d ago"),
        _ => format!("{count} wk ago"),
    }
}

fn selector(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Other(format!("invalid selector `{css}`: {e}")))
}

fn text_of(card: &ElementRef<'_>, selector: &Selector) -> Option<String> {
    card.select(selector).next().map(|el| {
        el.text()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    })
}

/// Extracts at most `max` postings from a search results page.
///
/// Cards without a title are skipped.
///
/// # Errors
///
/// Returns [`FetchError::Other`] if a built-in selector fails to compile.
pub fn parse_listings(html: &str, max: usize) -> Result<Vec<Job>, FetchError> {
    let card_sel = selector("div.base-card")?;
    let title_sel = selector("h3.base-search-card__title")?;
    let company_sel = selector("h4.base-search-card__subtitle")?;
    let location_sel = selector("span.job-search-card__location")?;
    let time_sel = selector("time")?;
    let link_sel = selector("a.base-card__full-link")?;

    let document = Html::parse_document(html);
    let jobs = document
        .select(&card_sel)
        .take(max)
        .filter_map(|card| {
            let title = text_of(&card, &title_sel).filter(|title| !title.is_empty())?;
            Some(Job {
                title,
                company: text_of(&card, &company_sel).unwrap_or_else(|| "N/A".to_string()),
                location: text_of(&card, &location_sel).unwrap_or_default(),
                date: normalize_date(&text_of(&card, &time_sel).unwrap_or_default()),
                link: card
                    .select(&link_sel)
                    .next()
                    .and_then(|el| el.value().attr("href"))
                    .unwrap_or_default()
                    .to_string(),
            })
        })
        .collect();
    Ok(jobs)
}

/// Jobs data source.
#[derive(Debug, Clone)]
pub struct JobsBlock {
    descriptor: BlockDescriptor,
    keywords: String,
    location: String,
    max: usize,
    search_url: String,
}

impl JobsBlock {
    /// Creates a source from block settings (`keywords`, `location`, `max_display`,
    /// `search_url`).
    pub fn from_settings(settings: &BlockSettings) -> Self {
        let keywords = settings.string_list("keywords");
        Self {
            descriptor: descriptor(),
            keywords: if keywords.is_empty() {
                "Full Stack".to_string()
            } else {
                keywords.join(" ")
            },
            location: settings.str_or("location", "France").to_string(),
            max: settings.u64_or("max_display", 8) as usize,
            search_url: settings.str_or("search_url", DEFAULT_SEARCH_URL).to_string(),
        }
    }
}

impl BlockSource for JobsBlock {
    fn descriptor(&self) -> &BlockDescriptor {
        &self.descriptor
    }

    fn fetch(&self) -> Result<Value, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        tracing::debug!(keywords = %self.keywords, location = %self.location, "scraping job search");
        let html = client
            .get(&self.search_url)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .query(&[
                ("keywords", self.keywords.as_str()),
                ("location", self.location.as_str()),
                ("f_TPR", "r86400"),
                ("sortBy", "DD"),
            ])
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|e| FetchError::Http(e.to_string()))?
            .text()
            .map_err(|e| FetchError::Http(e.to_string()))?;

        let jobs = parse_listings(&html, self.max)?;
        let list = JobList {
            total: jobs.len(),
            jobs,
            keywords: self.keywords.clone(),
            location: self.location.clone(),
            error: None,
        };
        serde_json::to_value(list).map_err(|e| FetchError::Other(e.to_string()))
    }
}

/// Registry factory.
pub fn build(settings: &BlockSettings) -> Box<dyn BlockSource> {
    Box::new(JobsBlock::from_settings(settings))
}
