use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_trace};

use crate::classify::{Classification, ContentClassifier, KeywordClassifier};
use crate::decode::{decode_body, is_html};
use crate::fetch::{Fetcher, ReqwestFetcher};
use crate::normalize::{is_valid_url, normalize};
use crate::sink::ProgressSink;
use crate::{
    CellValue, EngineConfig, EngineError, FetchOutcome, InvalidReason, ReviewReason, Verdict,
};

/// Status codes treated as a live page. 403 is included because many
/// healthy sites answer it to non-browser clients.
pub const ACCEPTED_STATUS_CODES: &[u16] = &[
    100, 101, 102, 103, //
    200, 201, 202, 203, 204, 205, 206, 207, 208, 226, //
    300, 301, 302, 303, 304, 307, 308, //
    403,
];

pub fn is_accepted_status(status: u16) -> bool {
    ACCEPTED_STATUS_CODES.contains(&status)
}

/// Per-URL pipeline: empty check, normalize, validate, scheme check, fetch,
/// status check, content classification.
pub struct ValidationEngine {
    fetcher: Arc<dyn Fetcher>,
    classifier: Arc<dyn ContentClassifier>,
    request_delay: Duration,
}

impl ValidationEngine {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        classifier: Arc<dyn ContentClassifier>,
        request_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            request_delay,
        }
    }

    /// Engine backed by [`ReqwestFetcher`] and the default keyword lists.
    pub fn from_config(config: &EngineConfig) -> Result<Self, EngineError> {
        let fetcher = ReqwestFetcher::new(config.fetch.clone())?;
        Ok(Self::new(
            Arc::new(fetcher),
            Arc::new(KeywordClassifier::default()),
            config.request_delay,
        ))
    }

    pub fn request_delay(&self) -> Duration {
        self.request_delay
    }

    /// Classify one cell. Blank cells return at once; every other outcome
    /// waits for the request delay before returning.
    pub async fn validate(&self, raw: &CellValue, sink: &dyn ProgressSink) -> Verdict {
        if raw.is_blank() {
            return Verdict::Empty;
        }

        let verdict = self.decide(raw, sink).await;
        engine_trace!("{} -> {}", raw.display(), verdict);
        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
        verdict
    }

    async fn decide(&self, raw: &CellValue, sink: &dyn ProgressSink) -> Verdict {
        let Some(url) = normalize(raw) else {
            return Verdict::NormalizationError;
        };
        if !is_valid_url(&url) {
            return Verdict::NotAUrl;
        }
        if url.is_plain_http() {
            return Verdict::NeedsReview(ReviewReason::NoSsl);
        }

        let page = match self.fetcher.fetch(&url, sink).await {
            FetchOutcome::Success(page) => page,
            FetchOutcome::NeedsManualReview(reason) => return Verdict::NeedsReview(reason),
            FetchOutcome::TransportFailure(kind) => {
                return Verdict::Invalid(InvalidReason::Transport(kind))
            }
        };

        if !is_accepted_status(page.status) {
            return Verdict::Invalid(InvalidReason::HttpStatus(page.status));
        }

        if is_html(page.content_type()) {
            let body = decode_body(&page.body, page.content_type());
            if body.lossy {
                engine_debug!("{}: body decoded lossily as {}", url, body.encoding_label);
            }
            match self.classifier.classify(&body.text) {
                Classification::ParkedOrError => {
                    return Verdict::Invalid(InvalidReason::BlockedOrParked);
                }
                Classification::NeedsReview(signal) => {
                    engine_debug!("{}: review signal {:?}", url, signal);
                    return Verdict::NeedsReview(ReviewReason::RequiresLogin);
                }
                Classification::Ok => {}
            }
        }

        Verdict::Valid {
            status: page.status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_is_accepted_but_not_found_is_not() {
        assert!(is_accepted_status(403));
        assert!(is_accepted_status(308));
        assert!(is_accepted_status(226));
        assert!(!is_accepted_status(404));
        assert!(!is_accepted_status(305));
        assert!(!is_accepted_status(500));
    }
}
