//! Line-driven record segmentation.
//!
//! A dump is a flat list of lines: a date header opens a transaction and the
//! action-detail lines that follow fill it in. Segmentation is an explicit
//! reducer `(state, line) -> (state', closed record)` so every transition can
//! be exercised without touching the file system.

use std::sync::LazyLock;

use chrono::NaiveDate;
use ledger_core::dates::{is_date_header, DateResolver};
use ledger_core::models::{
    ActionKind, DateQuality, TokenAmount, TransactionRecord, COUNTERPARTY_PLACEHOLDER,
};
use ledger_core::values::{ExtractedValue, ValueExtractor};
use regex::Regex;
use tracing::{debug, warn};

use crate::reader::is_failed_line;

/// Two or more whitespace characters separate the columns of a detail line.
static COLUMN_GAP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("regex is valid"));

// ── LineKind ──────────────────────────────────────────────────────────────────

/// What a single trimmed dump line means to the segmenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Blank or failed-transaction line; never affects state.
    Skip,
    DateHeader,
    Action(ActionKind),
    /// Anything else (comments, fees, explorer chrome).
    Other,
}

pub fn classify_line(line: &str) -> LineKind {
    if line.is_empty() || is_failed_line(line) {
        return LineKind::Skip;
    }
    if is_date_header(line) {
        return LineKind::DateHeader;
    }
    match ActionKind::from_line(line) {
        Some((kind, _)) => LineKind::Action(kind),
        None => LineKind::Other,
    }
}

// ── OpenRecord ────────────────────────────────────────────────────────────────

/// A transaction that is still accumulating detail lines.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenRecord {
    pub date: NaiveDate,
    pub date_quality: DateQuality,
    pub action: Option<ActionKind>,
    pub counterparty: Option<String>,
    pub memo: Option<String>,
    pub values: Vec<TokenAmount>,
}

impl OpenRecord {
    fn new(date: NaiveDate, date_quality: DateQuality) -> Self {
        Self {
            date,
            date_quality,
            action: None,
            counterparty: None,
            memo: None,
            values: Vec::new(),
        }
    }

    /// Fold one action-detail line into the record.
    ///
    /// The action is set once; a later line that names a counterparty or memo
    /// replaces the earlier one; every extracted value is appended.
    fn apply_detail(&mut self, kind: ActionKind, line: &str) {
        if self.action.is_none() {
            self.action = Some(kind);
        }

        let extracted = ValueExtractor::extract(line);
        let detail = parse_columns(line, extracted.as_ref());
        if let Some(counterparty) = detail.counterparty {
            self.counterparty = Some(counterparty);
        }
        if let Some(memo) = detail.memo {
            self.memo = Some(memo);
        }
        if let Some(extracted) = extracted {
            self.values.push(extracted.value);
        }
    }

    fn into_record(self, source: &str) -> TransactionRecord {
        TransactionRecord {
            date: self.date,
            date_quality: self.date_quality,
            action: self.action.unwrap_or(ActionKind::Unknown),
            counterparty: self
                .counterparty
                .unwrap_or_else(|| COUNTERPARTY_PLACEHOLDER.to_string()),
            memo: self.memo,
            values: self.values,
            source: source.to_string(),
        }
    }
}

// ── SegmentState ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub enum SegmentState {
    /// No record is open; detail lines are ignored.
    #[default]
    Awaiting,
    Open(OpenRecord),
}

// ── RecordSegmenter ───────────────────────────────────────────────────────────

/// Groups the lines of one wallet dump into [`TransactionRecord`]s.
pub struct RecordSegmenter {
    source: String,
    resolver: DateResolver,
}

impl RecordSegmenter {
    pub fn new(source: impl Into<String>, resolver: DateResolver) -> Self {
        Self {
            source: source.into(),
            resolver,
        }
    }

    /// Advance the state machine by one line.
    ///
    /// Returns the new state and, when a date header closes an open record,
    /// the finished record.
    pub fn step(
        &self,
        state: SegmentState,
        line: &str,
    ) -> (SegmentState, Option<TransactionRecord>) {
        match classify_line(line) {
            LineKind::DateHeader => {
                let closed = match state {
                    SegmentState::Open(record) => Some(self.close(record)),
                    SegmentState::Awaiting => None,
                };
                let (date, quality) = self.resolver.resolve_or_fallback(line);
                if quality == DateQuality::Fallback {
                    warn!(
                        "{}: unresolvable date header \"{}\", using {}",
                        self.source, line, date
                    );
                }
                (SegmentState::Open(OpenRecord::new(date, quality)), closed)
            }
            LineKind::Action(kind) => match state {
                SegmentState::Open(mut record) => {
                    record.apply_detail(kind, line);
                    (SegmentState::Open(record), None)
                }
                SegmentState::Awaiting => {
                    debug!("{}: detail line before any date header ignored", self.source);
                    (SegmentState::Awaiting, None)
                }
            },
            LineKind::Skip | LineKind::Other => (state, None),
        }
    }

    /// Close the trailing record at end of input, if one is open.
    pub fn finish(&self, state: SegmentState) -> Option<TransactionRecord> {
        match state {
            SegmentState::Open(record) => Some(self.close(record)),
            SegmentState::Awaiting => None,
        }
    }

    fn close(&self, open: OpenRecord) -> TransactionRecord {
        let record = open.into_record(&self.source);
        if record.lacks_expected_values() {
            debug!(
                "{}: {} record on {} closed without amounts",
                self.source, record.action, record.date
            );
        }
        record
    }

    /// Run the full reducer over `lines`.
    pub fn segment<I, S>(&self, lines: I) -> Vec<TransactionRecord>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut records = Vec::new();
        let mut state = SegmentState::Awaiting;

        for line in lines {
            let (next, closed) = self.step(state, line.as_ref().trim());
            state = next;
            records.extend(closed);
        }
        records.extend(self.finish(state));

        debug!("{}: segmented {} records", self.source, records.len());
        records
    }
}

// ── Column parsing ────────────────────────────────────────────────────────────

#[derive(Debug, Default, PartialEq, Eq)]
struct DetailColumns {
    counterparty: Option<String>,
    memo: Option<String>,
}

/// Split a detail line on multi-space gaps.
///
/// The first column is the action verb, the next non-value column is the
/// counterparty, and whatever text remains forms the memo. The extracted
/// amount never lands in the memo, even when its sign and number sit in
/// different columns.
fn parse_columns(line: &str, value: Option<&ExtractedValue>) -> DetailColumns {
    let mut pieces: Vec<String> = Vec::new();

    for (offset, column) in columns(line).into_iter().skip(1) {
        let end = offset + column.len();
        let text = match value {
            Some(v) if v.start < end && v.end > offset => {
                let before = &column[..v.start.saturating_sub(offset)];
                let after = &column[v.end.min(end) - offset..];
                format!("{before} {after}").trim().to_string()
            }
            _ => column.to_string(),
        };
        if !text.is_empty() {
            pieces.push(text);
        }
    }

    let mut pieces = pieces.into_iter();
    let counterparty = pieces.next();
    let memo: Vec<String> = pieces.collect();

    DetailColumns {
        counterparty,
        memo: if memo.is_empty() {
            None
        } else {
            Some(memo.join(" | "))
        },
    }
}

/// Non-empty columns of `line` with their byte offsets.
fn columns(line: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    for gap in COLUMN_GAP.find_iter(line) {
        if gap.start() > start {
            out.push((start, &line[start..gap.start()]));
        }
        start = gap.end();
    }
    if start < line.len() {
        out.push((start, &line[start..]));
    }
    out
}

// ── Tests ─────────────────────────────────────────────────────────────────────
