//! Recent and upcoming theatrical releases from TMDB's discover endpoint.

use std::time::Duration;

use block_contract::{BlockDescriptor, BlockSettings, BlockSource, FetchError};
use chrono::{Local, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Registry id of the movies block.
pub const BLOCK_ID: &str = "movies";

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const IMG_BASE: &str = "https://image.tmdb.org/t/p/w200";
const OVERVIEW_CHARS: usize = 120;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Static descriptor: refreshed hourly.
pub fn descriptor() -> BlockDescriptor {
    BlockDescriptor::new(BLOCK_ID, "Movies", "MOV-04", 3600)
}

/// One release.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Movie {
    /// TMDB id.
    pub id: Option<u64>,
    /// Localised title.
    pub title: String,
    /// Release date as reported (`YYYY-MM-DD`).
    pub date: String,
    /// Vote average rounded to one decimal.
    pub rating: f64,
    /// Poster URL, when TMDB has one.
    pub poster: Option<String>,
    /// Overview cut to 120 characters with a trailing ellipsis.
    pub overview: String,
}

/// Movies payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieList {
    /// Releases, newest first.
    pub movies: Vec<Movie>,
    /// Number of entries in `movies`.
    pub total: usize,
    /// Always `None` on success; failures travel as [`FetchError`].
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DiscoverResponse {
    #[serde(default)]
    results: Vec<DiscoverMovie>,
}

#[derive(Debug, Deserialize)]
struct DiscoverMovie {
    id: Option<u64>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    release_date: String,
    #[serde(default)]
    vote_average: f64,
    poster_path: Option<String>,
    #[serde(default)]
    overview: String,
}

/// Release-date window: two weeks back, one week ahead.
pub fn release_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today - TimeDelta::days(14), today + TimeDelta::days(7))
}

fn truncate_overview(overview: &str) -> String {
    if overview.is_empty() {
        return String::new();
    }
    let mut cut: String = overview.chars().take(OVERVIEW_CHARS).collect();
    cut.push('…');
    cut
}

/// Builds the payload from a raw discover response, keeping at most `max` entries.
///
/// # Errors
///
/// Returns [`FetchError::Parse`] when the body is not a discover response.
pub fn parse_discover(body: Value, max: usize) -> Result<MovieList, FetchError> {
    let response: DiscoverResponse =
        serde_json::from_value(body).map_err(|e| FetchError::Parse(e.to_string()))?;
    let movies: Vec<Movie> = response
        .results
        .into_iter()
        .take(max)
        .map(|movie| Movie {
            id: movie.id,
            title: movie.title,
            date: movie.release_date,
            rating: (movie.vote_average * 10.0).round() / 10.0,
            poster: movie
                .poster_path
                .filter(|path| !path.is_empty())
                .map(|path| format!("{IMG_BASE}{path}")),
            overview: truncate_overview(&movie.overview),
        })
        .collect();
    Ok(MovieList {
        total: movies.len(),
        movies,
        error: None,
    })
}

/// Movies data source.
#[derive(Debug, Clone)]
pub struct MoviesBlock {
    descriptor: BlockDescriptor,
    api_key: Option<String>,
    language: String,
    max: usize,
    base_url: String,
}

impl MoviesBlock {
    /// Creates a source from block settings (`tmdb_api_key`, `language`, `max_display`,
    /// `base_url`).
    pub fn from_settings(settings: &BlockSettings) -> Self {
        Self {
            descriptor: descriptor(),
            api_key: settings.secret("tmdb_api_key").map(str::to_string),
            language: settings.str_or("language", "en-US").to_string(),
            max: settings.u64_or("max_display", 6) as usize,
            base_url: settings.str_or("base_url", DEFAULT_BASE_URL).to_string(),
        }
    }
}

impl BlockSource for MoviesBlock {
    fn descriptor(&self) -> &BlockDescriptor {
        &self.descriptor
    }

    fn fetch(&self) -> Result<Value, FetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| FetchError::NotConfigured("tmdb_api_key is missing".to_string()))?;
        let (from, to) = release_window(Local::now().date_naive());
        let from = from.format("%Y-%m-%d").to_string();
        let to = to.format("%Y-%m-%d").to_string();

        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        tracing::debug!(%from, %to, "requesting tmdb releases");
        let response = client
            .get(format!("{}/discover/movie", self.base_url))
            .query(&[
                ("api_key", api_key),
                ("language", self.language.as_str()),
                ("sort_by", "primary_release_date.desc"),
                ("primary_release_date.gte", from.as_str()),
                ("primary_release_date.lte", to.as_str()),
                ("with_release_type", "3|2"),
                ("page", "1"),
            ])
            .send()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(FetchError::Auth("TMDB rejected the api key".to_string()));
        }
        let body: Value = response
            .error_for_status()
            .map_err(|e| FetchError::Http(e.to_string()))?
            .json()
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        let list = parse_discover(body, self.max)?;
        serde_json::to_value(list).map_err(|e| FetchError::Other(e.to_string()))
    }
}

/// Registry factory.
pub fn build(settings: &BlockSettings) -> Box<dyn BlockSource> {
    Box::new(MoviesBlock::from_settings(settings))
}
