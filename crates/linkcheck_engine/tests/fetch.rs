use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use linkcheck_engine::{
    BatchEvent, FetchOutcome, FetchSettings, Fetcher, NormalizedUrl, ProgressSink, ReqwestFetcher,
    RetryPolicy, ReviewReason, TransportFailureKind,
};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<BatchEvent>>>,
}

impl TestSink {
    fn take(&self) -> Vec<BatchEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }

    fn retries(&self) -> Vec<(u32, TransportFailureKind)> {
        self.take()
            .into_iter()
            .filter_map(|event| match event {
                BatchEvent::RetryScheduled {
                    attempt, failure, ..
                } => Some((attempt, failure)),
                _ => None,
            })
            .collect()
    }
}

impl ProgressSink for TestSink {
    fn emit(&self, event: BatchEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn local_url(raw: String) -> NormalizedUrl {
    NormalizedUrl {
        scheme: "http".to_string(),
        host: "127.0.0.1".to_string(),
        raw,
    }
}

fn https_url(raw: String) -> NormalizedUrl {
    NormalizedUrl {
        scheme: "https".to_string(),
        host: "127.0.0.1".to_string(),
        raw,
    }
}

fn quick_settings() -> FetchSettings {
    FetchSettings {
        request_timeout: Duration::from_millis(200),
        connect_timeout: Duration::from_millis(200),
        retry: RetryPolicy {
            max_retries: 1,
            backoff: Duration::from_millis(10),
        },
        ..FetchSettings::default()
    }
}

#[tokio::test]
async fn success_keeps_status_headers_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html>ok</html>", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(quick_settings()).unwrap();
    let sink = TestSink::default();
    let url = local_url(format!("{}/doc", server.uri()));

    let FetchOutcome::Success(page) = fetcher.fetch(&url, &sink).await else {
        panic!("expected success");
    };
    assert_eq!(page.status, 200);
    assert_eq!(page.final_url, url.raw);
    assert_eq!(page.content_type(), Some("text/html; charset=utf-8"));
    assert_eq!(page.body, b"<html>ok</html>".to_vec());
    assert!(sink.take().is_empty());
}

#[tokio::test]
async fn error_statuses_are_returned_not_judged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(quick_settings()).unwrap();
    let sink = TestSink::default();
    let url = local_url(format!("{}/missing", server.uri()));

    match fetcher.fetch(&url, &sink).await {
        FetchOutcome::Success(page) => assert_eq!(page.status, 404),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test]
async fn timeout_is_retried_once_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(800))
                .set_body_string("late"),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(200).set_body_string("fast"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(quick_settings()).unwrap();
    let sink = TestSink::default();
    let url = local_url(format!("{}/flaky", server.uri()));

    match fetcher.fetch(&url, &sink).await {
        FetchOutcome::Success(page) => assert_eq!(page.body, b"fast".to_vec()),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(sink.retries(), vec![(1, TransportFailureKind::Timeout)]);
}

#[tokio::test]
async fn persistent_timeout_fails_after_the_retry_budget() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(800))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(quick_settings()).unwrap();
    let sink = TestSink::default();
    let url = local_url(format!("{}/slow", server.uri()));

    assert_eq!(
        fetcher.fetch(&url, &sink).await,
        FetchOutcome::TransportFailure(TransportFailureKind::Timeout)
    );
    assert_eq!(sink.retries().len(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn refused_connection_is_a_connection_failure() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };

    let fetcher = ReqwestFetcher::new(quick_settings()).unwrap();
    let sink = TestSink::default();
    let url = local_url(format!("http://127.0.0.1:{port}/"));

    assert_eq!(
        fetcher.fetch(&url, &sink).await,
        FetchOutcome::TransportFailure(TransportFailureKind::Connection)
    );
    assert_eq!(sink.retries(), vec![(1, TransportFailureKind::Connection)]);
}

#[tokio::test]
async fn redirect_loops_fail_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        redirect_limit: 3,
        ..quick_settings()
    };
    let fetcher = ReqwestFetcher::new(settings).unwrap();
    let sink = TestSink::default();
    let url = local_url(format!("{}/loop", server.uri()));

    assert_eq!(
        fetcher.fetch(&url, &sink).await,
        FetchOutcome::TransportFailure(TransportFailureKind::TooManyRedirects)
    );
    assert!(sink.retries().is_empty());
}

#[tokio::test]
async fn redirects_within_the_limit_report_the_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&server)
        .await;

    let fetcher = ReqwestFetcher::new(quick_settings()).unwrap();
    let sink = TestSink::default();
    let url = local_url(format!("{}/old", server.uri()));

    let FetchOutcome::Success(page) = fetcher.fetch(&url, &sink).await else {
        panic!("expected success");
    };
    assert_eq!(page.status, 200);
    assert_eq!(page.final_url, format!("{}/new", server.uri()));
}

#[tokio::test]
async fn oversized_bodies_are_truncated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/large"))
        .respond_with(ResponseTemplate::new(200).set_body_string("0123456789"))
        .mount(&server)
        .await;

    let settings = FetchSettings {
        max_body_bytes: 4,
        ..quick_settings()
    };
    let fetcher = ReqwestFetcher::new(settings).unwrap();
    let sink = TestSink::default();
    let url = local_url(format!("{}/large", server.uri()));

    let FetchOutcome::Success(page) = fetcher.fetch(&url, &sink).await else {
        panic!("expected success");
    };
    assert_eq!(page.body, b"0123".to_vec());
}

#[tokio::test]
async fn https_against_a_plain_http_server_needs_review_without_retry() {
    let server = MockServer::start().await;
    let address = server.address();

    let fetcher = ReqwestFetcher::new(quick_settings()).unwrap();
    let sink = TestSink::default();
    let url = https_url(format!("https://127.0.0.1:{}/", address.port()));

    assert_eq!(
        fetcher.fetch(&url, &sink).await,
        FetchOutcome::NeedsManualReview(ReviewReason::SslError)
    );
    assert!(sink.retries().is_empty());
    assert_eq!(server.received_requests().await.map(|r| r.len()), Some(0));
}

#[tokio::test]
async fn tls_handshake_failure_makes_a_single_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let connections = Arc::new(AtomicUsize::new(0));
    let accepted = connections.clone();
    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { continue };
            accepted.fetch_add(1, Ordering::SeqCst);
            let mut hello = [0u8; 512];
            let _ = stream.read(&mut hello);
            let _ = stream.write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n");
        }
    });

    let fetcher = ReqwestFetcher::new(quick_settings()).unwrap();
    let sink = TestSink::default();
    let url = https_url(format!("https://127.0.0.1:{port}/"));

    assert_eq!(
        fetcher.fetch(&url, &sink).await,
        FetchOutcome::NeedsManualReview(ReviewReason::SslError)
    );
    assert!(sink.retries().is_empty());
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}

#[test]
fn invalid_header_names_are_rejected_at_construction() {
    let settings = FetchSettings {
        headers: vec![("Bad Header".to_string(), "x".to_string())],
        ..FetchSettings::default()
    };
    assert!(ReqwestFetcher::new(settings).is_err());
}
