//! Current-conditions weather block backed by the OpenWeatherMap API.

use std::time::Duration;

use block_contract::{BlockDescriptor, BlockSettings, BlockSource, FetchError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Registry id of the weather block.
pub const BLOCK_ID: &str = "weather";

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Static descriptor: refreshed every ten minutes.
pub fn descriptor() -> BlockDescriptor {
    BlockDescriptor::new(BLOCK_ID, "Weather", "WTH-05", 600)
}

/// Weather payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    /// Configured city name.
    pub city: String,
    /// Temperature in °C, rounded.
    pub temp: i64,
    /// Felt temperature in °C, rounded.
    pub feels_like: i64,
    /// Relative humidity in percent.
    pub humidity: u64,
    /// Capitalised condition description.
    pub description: String,
    /// Glyph for the main condition.
    pub icon: String,
    /// Wind speed in km/h, rounded.
    pub wind: i64,
}

#[derive(Debug, Deserialize)]
struct OwmResponse {
    weather: Vec<OwmCondition>,
    main: OwmMain,
    #[serde(default)]
    wind: Option<OwmWind>,
}

#[derive(Debug, Deserialize)]
struct OwmCondition {
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    feels_like: f64,
    humidity: u64,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

/// Maps an OpenWeatherMap main condition to a display glyph.
pub fn condition_icon(condition: &str) -> &'static str {
    match condition {
        "Clear" => "☀",
        "Clouds" => "☁",
        "Rain" => "🌧",
        "Drizzle" => "🌦",
        "Thunderstorm" => "⛈",
        "Snow" => "❄",
        "Mist" | "Fog" | "Haze" => "🌫",
        _ => "◌",
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Builds the report from a raw OpenWeatherMap response body.
///
/// # Errors
///
/// Returns [`FetchError::Parse`] when the body lacks the expected fields.
pub fn parse_report(city: &str, body: Value) -> Result<WeatherReport, FetchError> {
    let response: OwmResponse =
        serde_json::from_value(body).map_err(|e| FetchError::Parse(e.to_string()))?;
    let condition = response
        .weather
        .first()
        .ok_or_else(|| FetchError::Parse("response has no weather conditions".to_string()))?;
    let wind_ms = response.wind.map_or(0.0, |wind| wind.speed);

    Ok(WeatherReport {
        city: city.to_string(),
        temp: response.main.temp.round() as i64,
        feels_like: response.main.feels_like.round() as i64,
        humidity: response.main.humidity,
        description: capitalize(&condition.description),
        icon: condition_icon(&condition.main).to_string(),
        wind: (wind_ms * 3.6).round() as i64,
    })
}

/// Weather data source.
#[derive(Debug, Clone)]
pub struct WeatherBlock {
    descriptor: BlockDescriptor,
    city: String,
    api_key: Option<String>,
    lang: String,
    base_url: String,
}

impl WeatherBlock {
    /// Creates a source from block settings (`city`, `api_key`, `lang`, `base_url`).
    pub fn from_settings(settings: &BlockSettings) -> Self {
        Self {
            descriptor: descriptor(),
            city: settings.str_or("city", "Paris").to_string(),
            api_key: settings.secret("api_key").map(str::to_string),
            lang: settings.str_or("lang", "en").to_string(),
            base_url: settings.str_or("base_url", DEFAULT_BASE_URL).to_string(),
        }
    }
}

impl BlockSource for WeatherBlock {
    fn descriptor(&self) -> &BlockDescriptor {
        &self.descriptor
    }

    fn fetch(&self) -> Result<Value, FetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| FetchError::NotConfigured("weather api_key is missing".to_string()))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        tracing::debug!(city = %self.city, "requesting current weather");
        let response = client
            .get(&self.base_url)
            .query(&[
                ("q", self.city.as_str()),
                ("appid", api_key),
                ("units", "metric"),
                ("lang", self.lang.as_str()),
            ])
            .send()
            .map_err(|e| FetchError::Http(e.to_string()))?;
        if response.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(FetchError::Auth("OpenWeatherMap rejected the api key".to_string()));
        }
        let body: Value = response
            .error_for_status()
            .map_err(|e| FetchError::Http(e.to_string()))?
            .json()
            .map_err(|e| FetchError::Parse(e.to_string()))?;

        let report = parse_report(&self.city, body)?;
        serde_json::to_value(report).map_err(|e| FetchError::Other(e.to_string()))
    }
}

/// Registry factory.
pub fn build(settings: &BlockSettings) -> Box<dyn BlockSource> {
    Box::new(WeatherBlock::from_settings(settings))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_report_converts_units_and_maps_icon() {
        let body = json!({
            "weather": [{"main": "Rain", "description": "light rain"}],
            "main": {"temp": 12.6, "feels_like": 11.4, "humidity": 81},
            "wind": {"speed": 5.0}
        });

        assert_eq!(
            parse_report("Paris", body).expect("parse"),
            WeatherReport {
                city: "Paris".to_string(),
                temp: 13,
                feels_like: 11,
                humidity: 81,
                description: "Light rain".to_string(),
                icon: "🌧".to_string(),
                wind: 18,
            }
        );
    }

    #[test]
    fn unknown_conditions_use_fallback_glyph() {
        assert_eq!(condition_icon("Haze"), "🌫");
        assert_eq!(condition_icon("Tornado"), "◌");
    }

    #[test]
    fn parse_report_rejects_missing_conditions() {
        let body = json!({"weather": [], "main": {"temp": 1.0, "feels_like": 1.0, "humidity": 1}});
        assert!(matches!(
            parse_report("Oslo", body),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn placeholder_api_key_is_not_configured() {
        let settings = BlockSettings::from_value(json!({
            "city": "Paris",
            "api_key": "YOUR_OPENWEATHER_KEY"
        }));
        let err = build(&settings).fetch().expect_err("placeholder key");
        assert!(matches!(err, FetchError::NotConfigured(_)));
    }
}
