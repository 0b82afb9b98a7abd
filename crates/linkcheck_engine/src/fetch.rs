use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::sink::ProgressSink;
use crate::{
    BatchEvent, EngineError, FetchOutcome, FetchedPage, NormalizedUrl, ReviewReason,
    TransportFailureKind,
};

const OTHER_ERROR_MESSAGE_LIMIT: usize = 50;

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    /// Bytes kept from a body; the rest is not read.
    pub max_body_bytes: usize,
    /// `false` accepts self-signed and otherwise invalid certificates.
    pub verify_certificates: bool,
    pub headers: Vec<(String, String)>,
    pub retry: RetryPolicy,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(13),
            request_timeout: Duration::from_secs(13),
            redirect_limit: 30,
            max_body_bytes: 2 * 1024 * 1024,
            verify_certificates: false,
            headers: browser_headers(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Header set sent with every request; some sites refuse non-browser clients.
pub fn browser_headers() -> Vec<(String, String)> {
    [
        (
            "User-Agent",
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
        ),
        (
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
        ("Accept-Language", "es-ES,es;q=0.9,en;q=0.8"),
        ("Connection", "keep-alive"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

/// Transport failure families, as far as retrying is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Tls,
    Timeout,
    Connection,
    TooManyRedirects,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryAction {
    /// Try again after the backoff while budget remains.
    Retry,
    /// Stop and hand the URL to a human.
    Review,
    /// Stop and report a transport failure.
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// The retry table.
    ///
    /// | class            | action |
    /// |------------------|--------|
    /// | Tls              | Review |
    /// | Timeout          | Retry  |
    /// | Connection       | Retry  |
    /// | TooManyRedirects | Fail   |
    /// | Other            | Fail   |
    pub const fn action_for(class: FailureClass) -> RetryAction {
        match class {
            FailureClass::Tls => RetryAction::Review,
            FailureClass::Timeout | FailureClass::Connection => RetryAction::Retry,
            FailureClass::TooManyRedirects | FailureClass::Other => RetryAction::Fail,
        }
    }
}

#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &NormalizedUrl, sink: &dyn ProgressSink) -> FetchOutcome;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Result<Self, EngineError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &settings.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| EngineError::InvalidHeader(name.clone()))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| EngineError::InvalidHeader(name.clone()))?;
            headers.insert(header_name, header_value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.redirect_limit))
            .danger_accept_invalid_certs(!settings.verify_certificates)
            .build()
            .map_err(|err| EngineError::HttpClient(err.to_string()))?;

        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &FetchSettings {
        &self.settings
    }

    async fn attempt(&self, url: &str) -> Result<FetchedPage, reqwest::Error> {
        let response = self.client.get(url).send().await?;

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        let limit = self.settings.max_body_bytes;
        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            let room = limit - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(FetchedPage {
            status,
            final_url,
            headers,
            body,
        })
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &NormalizedUrl, sink: &dyn ProgressSink) -> FetchOutcome {
        let policy = self.settings.retry;
        for attempt in 0..=policy.max_retries {
            let err = match self.attempt(url.as_str()).await {
                Ok(page) => {
                    engine_debug!("GET {} -> {} ({} bytes)", url, page.status, page.body.len());
                    return FetchOutcome::Success(page);
                }
                Err(err) => err,
            };

            let class = classify_error(&err);
            engine_debug!("GET {} failed ({:?}): {}", url, class, err);
            match RetryPolicy::action_for(class) {
                RetryAction::Review => {
                    return FetchOutcome::NeedsManualReview(ReviewReason::SslError);
                }
                RetryAction::Fail => {
                    return FetchOutcome::TransportFailure(failure_kind(class, &err));
                }
                RetryAction::Retry if attempt < policy.max_retries => {
                    let failure = failure_kind(class, &err);
                    engine_warn!(
                        "Retrying {} after {} (attempt {}/{})",
                        url,
                        failure,
                        attempt + 1,
                        policy.max_retries
                    );
                    sink.emit(BatchEvent::RetryScheduled {
                        url: url.to_string(),
                        attempt: attempt + 1,
                        max_retries: policy.max_retries,
                        failure,
                    });
                    tokio::time::sleep(policy.backoff).await;
                }
                RetryAction::Retry => {
                    return FetchOutcome::TransportFailure(failure_kind(class, &err));
                }
            }
        }

        FetchOutcome::TransportFailure(TransportFailureKind::RetriesExhausted)
    }
}

/// Map a reqwest error onto the retry table's failure classes.
pub fn classify_error(err: &reqwest::Error) -> FailureClass {
    if err.is_redirect() {
        return FailureClass::TooManyRedirects;
    }
    if err.is_timeout() {
        return FailureClass::Timeout;
    }
    // TLS failures surface as connect errors, so check the source chain first.
    // The top-level message embeds the URL and is skipped.
    if err.source().is_some_and(is_tls_failure) {
        return FailureClass::Tls;
    }
    if err.is_connect() {
        return FailureClass::Connection;
    }
    FailureClass::Other
}

/// True when the `source()` chain carries a `rustls::Error`, or failing that,
/// reads like a TLS/certificate failure.
pub fn is_tls_failure(err: &(dyn StdError + 'static)) -> bool {
    has_rustls_error(err) || mentions_tls(err)
}

/// `io::Error::source` skips its own payload, so wrapped errors are
/// unpacked through `get_ref`.
fn has_rustls_error(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(err) = current {
        if err.downcast_ref::<rustls::Error>().is_some() {
            return true;
        }
        if let Some(inner) = err
            .downcast_ref::<std::io::Error>()
            .and_then(std::io::Error::get_ref)
        {
            if has_rustls_error(inner) {
                return true;
            }
        }
        current = err.source();
    }
    false
}

/// True when any error in the `source()` chain reads like a TLS/certificate failure.
pub fn mentions_tls(err: &(dyn StdError + 'static)) -> bool {
    const MARKERS: &[&str] = &["certificate", "tls", "ssl", "handshake"];
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(err) = current {
        let message = err.to_string().to_ascii_lowercase();
        if MARKERS.iter().any(|marker| message.contains(marker)) {
            return true;
        }
        current = err.source();
    }
    false
}

fn failure_kind(class: FailureClass, err: &reqwest::Error) -> TransportFailureKind {
    match class {
        FailureClass::Timeout => TransportFailureKind::Timeout,
        FailureClass::Connection => TransportFailureKind::Connection,
        FailureClass::TooManyRedirects => TransportFailureKind::TooManyRedirects,
        FailureClass::Tls | FailureClass::Other => {
            TransportFailureKind::Other(truncate_chars(&err.to_string(), OTHER_ERROR_MESSAGE_LIMIT))
        }
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
