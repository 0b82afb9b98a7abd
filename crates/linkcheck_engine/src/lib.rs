//! Linkcheck engine: URL normalization, probing, classification and batch orchestration.
mod batch;
mod classify;
mod config;
mod decode;
mod engine;
mod error;
mod fetch;
mod handle;
mod keywords;
mod normalize;
mod sink;
mod types;

pub use batch::{BatchControl, BatchOutcome, BatchReport, BatchRunner};
pub use classify::{page_text, Classification, ContentClassifier, KeywordClassifier, ReviewSignal};
pub use config::{Clock, EngineConfig};
pub use decode::{decode_body, is_html, DecodedBody};
pub use engine::{is_accepted_status, ValidationEngine, ACCEPTED_STATUS_CODES};
pub use error::{BatchError, EngineError};
pub use fetch::{
    browser_headers, classify_error, is_tls_failure, mentions_tls, FailureClass, FetchSettings,
    Fetcher, ReqwestFetcher, RetryAction, RetryPolicy,
};
pub use handle::BatchHandle;
pub use keywords::{AD_BLOCKER_KEYWORDS, CRITICAL_ERROR_KEYWORDS, LOGIN_KEYWORDS};
pub use normalize::{is_valid_url, normalize};
pub use sink::{ChannelProgressSink, NullProgressSink, ProgressSink, ResultSink};
pub use types::{
    BatchEvent, CellValue, FetchOutcome, FetchedPage, InvalidReason, NormalizedUrl, ReviewReason,
    RowId, RowProgress, RowVerdict, TransportFailureKind, ValidationRequest, Verdict,
    VerdictCategory, VerdictCounts,
};
