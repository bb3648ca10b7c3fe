//! Local clock block: time, long date, and ISO week number.

use block_contract::{BlockDescriptor, BlockSettings, BlockSource, FetchError};
use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;
use serde_json::Value;

/// Registry id of the clock block.
pub const BLOCK_ID: &str = "clock";

/// Static descriptor: refreshed every second.
pub fn descriptor() -> BlockDescriptor {
    BlockDescriptor::new(BLOCK_ID, "Clock", "CLK-01", 1)
}

/// Clock payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockSnapshot {
    /// `HH:MM:SS`.
    pub time: String,
    /// Long date, for example `Friday 16 October 2026`.
    pub date: String,
    /// Monday-based week of the year, `WEEK NN`.
    pub week: String,
    /// RFC 3339 timestamp.
    pub ts: String,
}

/// Formats the payload for `now`.
pub fn snapshot_at<Tz>(now: &DateTime<Tz>) -> ClockSnapshot
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    ClockSnapshot {
        time: now.format("%H:%M:%S").to_string(),
        date: now.format("%A %d %B %Y").to_string(),
        week: format!("WEEK {}", now.format("%W")),
        ts: now.to_rfc3339(),
    }
}

/// Clock data source reading the local system time.
#[derive(Debug, Clone)]
pub struct ClockBlock {
    descriptor: BlockDescriptor,
}

impl Default for ClockBlock {
    fn default() -> Self {
        Self {
            descriptor: descriptor(),
        }
    }
}

impl BlockSource for ClockBlock {
    fn descriptor(&self) -> &BlockDescriptor {
        &self.descriptor
    }

    fn fetch(&self) -> Result<Value, FetchError> {
        serde_json::to_value(snapshot_at(&Local::now())).map_err(|e| FetchError::Other(e.to_string()))
    }
}

/// Registry factory; the clock takes no settings.
pub fn build(_settings: &BlockSettings) -> Box<dyn BlockSource> {
    Box::new(ClockBlock::default())
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn snapshot_formats_time_date_and_week() {
        let offset = FixedOffset::east_opt(2 * 3600).expect("offset");
        let now = offset
            .with_ymd_and_hms(2026, 10, 16, 9, 5, 7)
            .single()
            .expect("valid timestamp");

        assert_eq!(
            snapshot_at(&now),
            ClockSnapshot {
                time: "09:05:07".to_string(),
                date: "Friday 16 October 2026".to_string(),
                week: "WEEK 41".to_string(),
                ts: "2026-10-16T09:05:07+02:00".to_string(),
            }
        );
    }

    #[test]
    fn week_number_is_zero_padded_before_first_monday() {
        let offset = FixedOffset::east_opt(0).expect("offset");
        let now = offset
            .with_ymd_and_hms(2026, 1, 2, 0, 0, 0)
            .single()
            .expect("valid timestamp");
        assert_eq!(snapshot_at(&now).week, "WEEK 00");
    }

    #[test]
    fn fetch_produces_all_fields() {
        let value = build(&BlockSettings::new()).fetch().expect("clock fetch");
        for field in ["time", "date", "week", "ts"] {
            assert!(value[field].is_string(), "missing {field}");
        }
    }
}
