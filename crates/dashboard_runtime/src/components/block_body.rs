//! Per-block card bodies.
//!
//! Payloads are summarized into [`BlockBody`] first so the formatting can be tested without a
//! DOM; [`BlockBodyView`] only lays the summary out.

use leptos::*;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BodyRow {
    pub primary: String,
    pub secondary: String,
    pub meta: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum BlockBody {
    Loading,
    Clock {
        time: String,
        date: String,
        week: String,
    },
    Weather {
        headline: String,
        icon: String,
        city: String,
        description: String,
        details: Vec<String>,
    },
    Rows(Vec<BodyRow>),
    Empty(&'static str),
    Raw(String),
}

fn text(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn rows(data: &Value, key: &str, row: impl Fn(&Value) -> BodyRow) -> Vec<BodyRow> {
    data.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().map(row).collect())
        .unwrap_or_default()
}

fn list_body(rows: Vec<BodyRow>, empty: &'static str) -> BlockBody {
    if rows.is_empty() {
        BlockBody::Empty(empty)
    } else {
        BlockBody::Rows(rows)
    }
}

pub(crate) fn summarize(block_id: &str, data: Option<&Value>) -> BlockBody {
    let Some(data) = data else {
        return BlockBody::Loading;
    };
    match block_id {
        "clock" => BlockBody::Clock {
            time: text(data, "time"),
            date: text(data, "date"),
            week: text(data, "week"),
        },
        "weather" => BlockBody::Weather {
            headline: format!("{}°C", text(data, "temp")),
            icon: text(data, "icon"),
            city: text(data, "city"),
            description: text(data, "description"),
            details: vec![
                format!("Feels like {}°C", text(data, "feels_like")),
                format!("Humidity {}%", text(data, "humidity")),
                format!("Wind {} km/h", text(data, "wind")),
            ],
        },
        "emails" => list_body(
            rows(data, "emails", |email| BodyRow {
                primary: text(email, "from"),
                secondary: text(email, "subject"),
                meta: text(email, "date"),
                link: None,
            }),
            "No unread emails",
        ),
        "jobs" => list_body(
            rows(data, "jobs", |job| BodyRow {
                primary: text(job, "title"),
                secondary: format!("{} · {}", text(job, "company"), text(job, "location")),
                meta: text(job, "date"),
                link: Some(text(job, "link")).filter(|link| !link.is_empty()),
            }),
            "No new postings",
        ),
        "movies" => list_body(
            rows(data, "movies", |movie| BodyRow {
                primary: text(movie, "title"),
                secondary: text(movie, "overview"),
                meta: format!("{} · ★ {}", text(movie, "date"), text(movie, "rating")),
                link: None,
            }),
            "No releases this fortnight",
        ),
        _ => BlockBody::Raw(serde_json::to_string_pretty(data).unwrap_or_default()),
    }
}

#[component]
pub(super) fn BlockBodyView(body: BlockBody) -> impl IntoView {
    match body {
        BlockBody::Loading => view! { <p class="block-body-muted">"Loading…"</p> }.into_view(),
        BlockBody::Empty(message) => {
            view! { <p class="block-body-muted">{message}</p> }.into_view()
        }
        BlockBody::Clock { time, date, week } => view! {
            <div class="block-clock">
                <span class="block-clock-time">{time}</span>
                <span class="block-clock-date">{date}</span>
                <span class="block-clock-week">{week}</span>
            </div>
        }
        .into_view(),
        BlockBody::Weather {
            headline,
            icon,
            city,
            description,
            details,
        } => view! {
            <div class="block-weather">
                <div class="block-weather-headline">
                    <span class="block-weather-icon" aria-hidden="true">{icon}</span>
                    <span class="block-weather-temp">{headline}</span>
                </div>
                <span class="block-weather-city">{city}</span>
                <span class="block-weather-description">{description}</span>
                <ul class="block-weather-details">
                    {details.into_iter().map(|detail| view! { <li>{detail}</li> }).collect_view()}
                </ul>
            </div>
        }
        .into_view(),
        BlockBody::Rows(rows) => view! {
            <ul class="block-rows">
                {rows
                    .into_iter()
                    .map(|row| {
                        let primary = match row.link {
                            Some(href) => view! {
                                <a href=href target="_blank" rel="noopener">{row.primary}</a>
                            }
                            .into_view(),
                            None => row.primary.into_view(),
                        };
                        view! {
                            <li class="block-row">
                                <span class="block-row-primary">{primary}</span>
                                <span class="block-row-secondary">{row.secondary}</span>
                                <span class="block-row-meta">{row.meta}</span>
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
        }
        .into_view(),
        BlockBody::Raw(raw) => view! { <pre class="block-body-raw">{raw}</pre> }.into_view(),
    }
}
