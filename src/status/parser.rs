//! Extraction of status rows from the markdown log table.
//!
//! The log is a plain markdown table with the columns
//! `Time | Service | Status | Last Seen`. Nothing is validated: lines that do
//! not start like a dated row are ignored and short rows are padded with
//! empty fields.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Literal used by the probe when a service has never been reachable
pub const NOT_AVAILABLE: &str = "N/A";

/// Substring that marks the table header row
const HEADER_LABEL: &str = "Service";

static ROW_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|\s*[0-9]{4}-[0-9]{2}-[0-9]{2}").expect("valid row regex"));
static LEADING_PIPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\|\s*").expect("valid leading pipe regex"));
static TRAILING_PIPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\|$").expect("valid trailing pipe regex"));
static CELL_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\|\s*").expect("valid separator regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceStatus {
    Online,
    Offline,
    Other(String),
}

impl ServiceStatus {
    pub fn label(&self) -> &str {
        match self {
            ServiceStatus::Online => "Online",
            ServiceStatus::Offline => "Offline",
            ServiceStatus::Other(label) => label,
        }
    }

    /// Lowercased label, used as the card's style class
    pub fn class(&self) -> String {
        self.label().to_lowercase()
    }

    pub fn is_online(&self) -> bool {
        matches!(self, ServiceStatus::Online)
    }
}

impl From<&str> for ServiceStatus {
    fn from(label: &str) -> Self {
        match label {
            "Online" => ServiceStatus::Online,
            "Offline" => ServiceStatus::Offline,
            other => ServiceStatus::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ServiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LastSeen {
    NotAvailable,
    At(String),
}

impl LastSeen {
    pub fn as_stamp(&self) -> Option<&str> {
        match self {
            LastSeen::NotAvailable => None,
            LastSeen::At(raw) => Some(raw),
        }
    }
}

impl From<&str> for LastSeen {
    fn from(raw: &str) -> Self {
        if raw == NOT_AVAILABLE {
            LastSeen::NotAvailable
        } else {
            LastSeen::At(raw.to_string())
        }
    }
}

impl fmt::Display for LastSeen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LastSeen::NotAvailable => f.write_str(NOT_AVAILABLE),
            LastSeen::At(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub time: String,
    pub service: String,
    pub status: ServiceStatus,
    pub last_seen: LastSeen,
}

impl LogRow {
    /// Split one table line into its four cells
    pub fn from_line(line: &str) -> Self {
        let inner = LEADING_PIPE.replace(line, "");
        let inner = TRAILING_PIPE.replace(&inner, "");
        let mut cells = CELL_SEPARATOR.split(&inner);
        let mut next = || cells.next().unwrap_or_default();

        let time = next().to_string();
        let service = next().to_string();
        let status = ServiceStatus::from(next());
        let last_seen = LastSeen::from(next());

        Self {
            time,
            service,
            status,
            last_seen,
        }
    }

    /// Markdown table line, as appended by the probe
    pub fn to_line(&self) -> String {
        format!(
            "| {} | {} | {} | {} |",
            self.time, self.service, self.status, self.last_seen
        )
    }
}

/// Whether a line looks like a dated table row
pub fn is_candidate(line: &str) -> bool {
    ROW_START.is_match(line)
}

/// Parse every dated row of the log, in file order.
///
/// When the first candidate row names the header label in its service cell,
/// it and the following row (the separator) are dropped.
pub fn parse_rows(text: &str) -> Vec<LogRow> {
    let mut rows: Vec<LogRow> = text
        .lines()
        .filter(|line| is_candidate(line))
        .map(LogRow::from_line)
        .collect();

    if rows
        .first()
        .is_some_and(|row| row.service.contains(HEADER_LABEL))
    {
        rows.drain(..rows.len().min(2));
    }

    rows
}
