//! Timestamp localization for the dashboard.
//!
//! Log stamps are written in UTC without an offset; everything shown to the
//! user is converted into one fixed zone and rendered in the German numeric
//! style (`1.7.2024, 12:00:00`), 24-hour clock.

use crate::error::{DashboardError, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;

pub const DEFAULT_TIMEZONE: &str = "Europe/Berlin";

const DISPLAY_FORMAT: &str = "%-d.%-m.%Y, %H:%M:%S";
const DISPLAY_FORMAT_ZONED: &str = "%-d.%-m.%Y, %H:%M:%S %Z";
const LOG_STAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalClock {
    tz: Tz,
}

impl LocalClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Build a clock from an IANA zone name such as `Europe/Berlin`
    pub fn from_name(name: &str) -> Result<Self> {
        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|_| DashboardError::Timezone(name.to_string()))
    }

    pub fn format(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.tz).format(DISPLAY_FORMAT).to_string()
    }

    /// Same as [`format`](Self::format) with the zone abbreviation appended
    pub fn format_zoned(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.tz)
            .format(DISPLAY_FORMAT_ZONED)
            .to_string()
    }

    /// Localize a raw log stamp. Unparseable input is returned verbatim.
    pub fn format_log_stamp(&self, raw: &str) -> String {
        match parse_log_stamp(raw) {
            Some(at) => self.format_zoned(at),
            None => raw.to_string(),
        }
    }

    pub fn now(&self) -> String {
        self.format(Utc::now())
    }
}

impl Default for LocalClock {
    fn default() -> Self {
        Self::new(chrono_tz::Europe::Berlin)
    }
}

/// Parse `YYYY-MM-DD HH:MM[:SS]` as a UTC instant
pub fn parse_log_stamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    LOG_STAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Render a UTC instant the way log rows store it
pub fn to_log_stamp(at: DateTime<Utc>) -> String {
    at.format(LOG_STAMP_FORMATS[0]).to_string()
}
