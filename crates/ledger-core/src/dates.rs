use std::sync::LazyLock;

use chrono::{Datelike, Local, NaiveDate};
use regex::Regex;

use crate::error::{LedgerError, Result};
use crate::models::DateQuality;

/// `<day> <Mon>` optionally followed by a four-digit year or an `HH:MM` time.
static DATE_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(\d{1,2}) (Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\b(?: (\d{4})\b| \d{1,2}:\d{2}\b)?",
    )
    .expect("regex is valid")
});

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Returns `true` when `line` opens a new transaction.
pub fn is_date_header(line: &str) -> bool {
    DATE_HEADER.is_match(line)
}

// ── DateResolver ──────────────────────────────────────────────────────────────

/// Turns explorer date headers into calendar dates.
///
/// Year-less headers are placed in the year of the reference date, which is
/// also the fallback for headers that name an impossible day.
#[derive(Debug, Clone, Copy)]
pub struct DateResolver {
    reference: NaiveDate,
}

impl DateResolver {
    pub fn new(reference: NaiveDate) -> Self {
        Self { reference }
    }

    /// Resolver anchored to the local calendar day.
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn reference(&self) -> NaiveDate {
        self.reference
    }

    /// Resolve a header such as `12 Sep 2024`, `3 Mar 14:05` or `7 Jan`.
    pub fn resolve(&self, header: &str) -> Result<(NaiveDate, DateQuality)> {
        let caps = DATE_HEADER
            .captures(header.trim())
            .ok_or_else(|| LedgerError::InvalidDate(header.to_string()))?;

        let day: u32 = caps[1]
            .parse()
            .map_err(|_| LedgerError::InvalidDate(header.to_string()))?;
        let month = MONTHS
            .iter()
            .position(|m| *m == &caps[2])
            .map(|idx| idx as u32 + 1)
            .ok_or_else(|| LedgerError::InvalidDate(header.to_string()))?;

        let (year, quality) = match caps.get(3) {
            Some(y) => (
                y.as_str()
                    .parse::<i32>()
                    .map_err(|_| LedgerError::InvalidDate(header.to_string()))?,
                DateQuality::Exact,
            ),
            None => (self.reference.year(), DateQuality::YearAssumed),
        };

        NaiveDate::from_ymd_opt(year, month, day)
            .map(|date| (date, quality))
            .ok_or_else(|| LedgerError::InvalidDate(header.to_string()))
    }

    /// Like [`resolve`](Self::resolve) but never fails: unresolvable headers
    /// map to the reference date with [`DateQuality::Fallback`].
    pub fn resolve_or_fallback(&self, header: &str) -> (NaiveDate, DateQuality) {
        self.resolve(header)
            .unwrap_or((self.reference, DateQuality::Fallback))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
