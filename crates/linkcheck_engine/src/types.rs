use std::collections::BTreeMap;
use std::fmt;

/// 1-based spreadsheet row number.
pub type RowId = u32;

/// Raw scalar read from a sheet cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Missing,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// Text rendition of the cell, `None` when the cell is missing or blank.
    pub fn as_text(&self) -> Option<String> {
        let text = match self {
            CellValue::Missing => return None,
            CellValue::Text(text) => text.clone(),
            CellValue::Number(value) => value.to_string(),
            CellValue::Bool(value) => value.to_string(),
        };
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    pub fn is_blank(&self) -> bool {
        self.as_text().is_none()
    }

    /// Label used in progress lines and logs.
    pub fn display(&self) -> String {
        self.as_text().unwrap_or_else(|| "<empty>".to_string())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<Option<String>> for CellValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(CellValue::Missing, CellValue::Text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRequest {
    pub row_id: RowId,
    pub raw_value: CellValue,
}

impl ValidationRequest {
    pub fn new(row_id: RowId, raw_value: impl Into<CellValue>) -> Self {
        Self {
            row_id,
            raw_value: raw_value.into(),
        }
    }
}

/// Absolute URL produced by [`crate::normalize`]. `scheme` and `host` are empty
/// when the string does not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedUrl {
    pub scheme: String,
    pub host: String,
    pub raw: String,
}

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_plain_http(&self) -> bool {
        self.scheme == "http"
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Successful HTTP exchange, after redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub status: u16,
    pub final_url: String,
    /// Header names are lower-cased; repeated headers keep the last value.
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl FetchedPage {
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Success(FetchedPage),
    TransportFailure(TransportFailureKind),
    NeedsManualReview(ReviewReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFailureKind {
    Timeout,
    Connection,
    TooManyRedirects,
    RetriesExhausted,
    /// Any other transport error; the message is truncated.
    Other(String),
}

impl fmt::Display for TransportFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportFailureKind::Timeout => write!(f, "timeout"),
            TransportFailureKind::Connection => write!(f, "connection error"),
            TransportFailureKind::TooManyRedirects => write!(f, "too many redirects"),
            TransportFailureKind::RetriesExhausted => write!(f, "error after retries"),
            TransportFailureKind::Other(message) => write!(f, "error: {message}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewReason {
    NoSsl,
    SslError,
    RequiresLogin,
}

impl fmt::Display for ReviewReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewReason::NoSsl => write!(f, "no SSL certificate (HTTP)"),
            ReviewReason::SslError => write!(f, "SSL/certificate error"),
            ReviewReason::RequiresLogin => write!(f, "requires login"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    Transport(TransportFailureKind),
    HttpStatus(u16),
    BlockedOrParked,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::Transport(kind) => kind.fmt(f),
            InvalidReason::HttpStatus(code) => write!(f, "HTTP {code}"),
            InvalidReason::BlockedOrParked => write!(f, "blocked/parked page"),
        }
    }
}

/// Final classification of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Empty,
    NotAUrl,
    NormalizationError,
    NeedsReview(ReviewReason),
    Invalid(InvalidReason),
    Valid { status: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VerdictCategory {
    Valid,
    Invalid,
    Review,
    Skipped,
}

impl Verdict {
    pub fn category(&self) -> VerdictCategory {
        match self {
            Verdict::Empty | Verdict::NotAUrl | Verdict::NormalizationError => {
                VerdictCategory::Skipped
            }
            Verdict::NeedsReview(_) => VerdictCategory::Review,
            Verdict::Invalid(_) => VerdictCategory::Invalid,
            Verdict::Valid { .. } => VerdictCategory::Valid,
        }
    }

    /// Token written to the result column; skipped verdicts write nothing.
    pub fn sheet_token(&self) -> Option<&'static str> {
        match self.category() {
            VerdictCategory::Valid => Some("VÁLIDO"),
            VerdictCategory::Invalid => Some("NO VÁLIDO"),
            VerdictCategory::Review => Some("VALIDAR"),
            VerdictCategory::Skipped => None,
        }
    }

    pub fn detail(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Empty => write!(f, "empty cell"),
            Verdict::NotAUrl => write!(f, "text is not a URL"),
            Verdict::NormalizationError => write!(f, "normalization error"),
            Verdict::NeedsReview(reason) => reason.fmt(f),
            Verdict::Invalid(reason) => reason.fmt(f),
            Verdict::Valid { status } => write!(f, "OK - HTTP {status}"),
        }
    }
}

/// One verdict as handed to the result sink.
#[derive(Debug, Clone, PartialEq)]
pub struct RowVerdict {
    pub row_id: RowId,
    pub raw_value: CellValue,
    pub verdict: Verdict,
    pub checked_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VerdictCounts {
    pub valid: usize,
    pub invalid: usize,
    pub review: usize,
    pub skipped: usize,
}

impl VerdictCounts {
    pub fn record(&mut self, verdict: &Verdict) {
        match verdict.category() {
            VerdictCategory::Valid => self.valid += 1,
            VerdictCategory::Invalid => self.invalid += 1,
            VerdictCategory::Review => self.review += 1,
            VerdictCategory::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.valid + self.invalid + self.review + self.skipped
    }
}

/// Per-row progress report; mirrors the `(raw_value, index, total, verdict, row_id)` callback.
#[derive(Debug, Clone, PartialEq)]
pub struct RowProgress {
    pub raw_value: CellValue,
    pub index: usize,
    pub total: usize,
    pub verdict: Verdict,
    pub row_id: RowId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    Started {
        total: usize,
    },
    RowStarted {
        index: usize,
        total: usize,
        row_id: RowId,
        display: String,
    },
    RetryScheduled {
        url: String,
        attempt: u32,
        max_retries: u32,
        failure: TransportFailureKind,
    },
    RowValidated(RowProgress),
    Paused {
        index: usize,
    },
    Resumed {
        index: usize,
    },
    Stopped {
        processed: usize,
        total: usize,
    },
    Completed {
        counts: VerdictCounts,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_counts_as_missing() {
        assert!(CellValue::from("   ").is_blank());
        assert!(CellValue::Missing.is_blank());
        assert!(!CellValue::Number(3.0).is_blank());
        assert_eq!(CellValue::Missing.display(), "<empty>");
    }

    #[test]
    fn sheet_tokens_follow_category() {
        assert_eq!(Verdict::Valid { status: 200 }.sheet_token(), Some("VÁLIDO"));
        assert_eq!(
            Verdict::Invalid(InvalidReason::HttpStatus(404)).sheet_token(),
            Some("NO VÁLIDO")
        );
        assert_eq!(
            Verdict::NeedsReview(ReviewReason::NoSsl).sheet_token(),
            Some("VALIDAR")
        );
        assert_eq!(Verdict::Empty.sheet_token(), None);
        assert_eq!(Verdict::NotAUrl.sheet_token(), None);
    }

    #[test]
    fn details_are_human_readable() {
        assert_eq!(Verdict::Valid { status: 301 }.detail(), "OK - HTTP 301");
        assert_eq!(
            Verdict::Invalid(InvalidReason::HttpStatus(404)).detail(),
            "HTTP 404"
        );
        assert_eq!(
            Verdict::Invalid(InvalidReason::BlockedOrParked).detail(),
            "blocked/parked page"
        );
        assert_eq!(
            Verdict::Invalid(InvalidReason::Transport(TransportFailureKind::Other(
                "boom".into()
            )))
            .detail(),
            "error: boom"
        );
    }

    #[test]
    fn counts_tally_by_category() {
        let mut counts = VerdictCounts::default();
        counts.record(&Verdict::Valid { status: 200 });
        counts.record(&Verdict::Empty);
        counts.record(&Verdict::NeedsReview(ReviewReason::RequiresLogin));
        counts.record(&Verdict::Invalid(InvalidReason::BlockedOrParked));
        counts.record(&Verdict::Valid { status: 204 });
        assert_eq!(
            counts,
            VerdictCounts {
                valid: 2,
                invalid: 1,
                review: 1,
                skipped: 1
            }
        );
        assert_eq!(counts.total(), 5);
    }
}
