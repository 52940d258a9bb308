use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub const SECOND_MS: i64 = 1000;
pub const MINUTE_MS: i64 = 60 * SECOND_MS;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// Wall-clock instant in milliseconds since the Unix epoch.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Millis(pub i64);

impl Millis {
    pub const fn new(ms: i64) -> Self {
        Self(ms)
    }

    pub fn saturating_sub_ms(self, ms: i64) -> Self {
        Self(self.0.saturating_sub(ms))
    }

    pub fn saturating_add_ms(self, ms: i64) -> Self {
        Self(self.0.saturating_add(ms))
    }

    /// Elapsed milliseconds from `earlier` to `self` (negative if `earlier` is in the future).
    pub fn since(self, earlier: Millis) -> i64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Recency window selected in the dashboard's time-range control.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "6h")]
    SixHours,
    #[serde(rename = "24h")]
    OneDay,
    #[serde(rename = "48h")]
    TwoDays,
    #[default]
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "all")]
    All,
}

impl TimeRange {
    /// Window length, or `None` for [`TimeRange::All`].
    pub fn window_ms(self) -> Option<i64> {
        match self {
            TimeRange::OneHour => Some(HOUR_MS),
            TimeRange::SixHours => Some(6 * HOUR_MS),
            TimeRange::OneDay => Some(DAY_MS),
            TimeRange::TwoDays => Some(2 * DAY_MS),
            TimeRange::SevenDays => Some(7 * DAY_MS),
            TimeRange::All => None,
        }
    }

    /// Oldest instant still inside the window.
    pub fn cutoff(self, now: Millis) -> Option<Millis> {
        self.window_ms().map(|w| now.saturating_sub_ms(w))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::OneHour => "1h",
            TimeRange::SixHours => "6h",
            TimeRange::OneDay => "24h",
            TimeRange::TwoDays => "48h",
            TimeRange::SevenDays => "7d",
            TimeRange::All => "all",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1h" => Some(TimeRange::OneHour),
            "6h" => Some(TimeRange::SixHours),
            "24h" => Some(TimeRange::OneDay),
            "48h" => Some(TimeRange::TwoDays),
            "7d" => Some(TimeRange::SevenDays),
            "all" => Some(TimeRange::All),
            _ => None,
        }
    }
}

/// Best-effort parse of a feed timestamp.
///
/// Accepts RFC 3339, RFC 2822 (RSS `pubDate`), `YYYY-MM-DD HH:MM:SS`,
/// bare `YYYY-MM-DD` dates (midnight UTC) and integer epoch milliseconds.
/// Anything else is `None`, which callers treat as "no timestamp".
pub fn parse_timestamp(raw: &str) -> Option<Millis> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(Millis(dt.timestamp_millis()));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(Millis(dt.timestamp_millis()));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(Millis(dt.and_utc().timestamp_millis()));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return d
            .and_hms_opt(0, 0, 0)
            .map(|dt| Millis(dt.and_utc().timestamp_millis()));
    }
    s.parse::<i64>().ok().map(Millis)
}
