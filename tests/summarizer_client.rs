//! Integration tests for the summarizer client against a local mock
//! endpoint.
//!
//! A minimal HTTP/1.1 responder on a loopback socket plays the
//! generative-language API: one scripted response per connection, with
//! `Connection: close` so every attempt opens a fresh connection and the
//! accept count equals the attempt count.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use meld_search::config::SummarizerConfig;
use meld_search::summarize::summarize;
use meld_search::{Provider, SearchError, SearchHit};

const SUCCESS_BODY: &str =
    r#"{"candidates":[{"content":{"parts":[{"text":"A synthesized answer."}]}}]}"#;

/// Serve one scripted `(status, body)` response per accepted connection.
/// Returns the endpoint base URL and the connection counter.
async fn mock_endpoint(responses: Vec<(u16, &'static str)>) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    let connections = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&connections);
    tokio::spawn(async move {
        for (status, body) in responses {
            let Ok((mut socket, _)) = listener.accept().await else {
                return;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            read_request(&mut socket).await;
            let reason = match status {
                200 => "OK",
                400 => "Bad Request",
                500 => "Internal Server Error",
                503 => "Service Unavailable",
                _ => "Other",
            };
            let response = format!(
                "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{addr}"), connections)
}

/// Read a full request: headers plus a Content-Length body.
async fn read_request(socket: &mut TcpStream) {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let Ok(n) = socket.read(&mut buf).await else {
            return;
        };
        if n == 0 {
            return;
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(header_end) = find_header_end(&data) {
            let headers = String::from_utf8_lossy(&data[..header_end]);
            let content_length = headers
                .lines()
                .find_map(|line| {
                    line.to_ascii_lowercase()
                        .strip_prefix("content-length:")
                        .map(|v| v.trim().parse::<usize>().unwrap_or(0))
                })
                .unwrap_or(0);
            if data.len() >= header_end + 4 + content_length {
                return;
            }
        }
    }
}

fn find_header_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n")
}

fn config_for(base_url: &str) -> SummarizerConfig {
    SummarizerConfig {
        api_key: Some("test-key".into()),
        base_url: Some(base_url.to_string()),
        timeout_seconds: 5,
        ..Default::default()
    }
}

fn sample_hits() -> Vec<SearchHit> {
    vec![
        SearchHit::text(
            Provider::DuckDuckGo,
            0,
            "First source",
            "https://one.example/a",
            "first snippet",
        ),
        SearchHit::text(
            Provider::Bing,
            1,
            "Second source",
            "https://two.example/b",
            "second snippet",
        ),
    ]
}

#[tokio::test]
async fn structured_success_parses_into_summary() {
    let (base, connections) = mock_endpoint(vec![(200, SUCCESS_BODY)]).await;
    let summary = summarize("query", &sample_hits(), &config_for(&base))
        .await
        .expect("structured success");
    assert_eq!(summary.text, "A synthesized answer.");
    assert_eq!(summary.sources.len(), 2);
    assert_eq!(summary.sources[0].id, 1);
    assert_eq!(summary.sources[1].url, "https://two.example/b");
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn server_error_retries_once_then_succeeds() {
    let (base, connections) =
        mock_endpoint(vec![(503, r#"{"error":"overloaded"}"#), (200, SUCCESS_BODY)]).await;
    let summary = summarize("query", &sample_hits(), &config_for(&base))
        .await
        .expect("retry should succeed");
    assert_eq!(summary.text, "A synthesized answer.");
    assert_eq!(connections.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn server_error_twice_fails_after_single_retry() {
    let (base, connections) = mock_endpoint(vec![
        (500, r#"{"error":"boom"}"#),
        (500, r#"{"error":"boom"}"#),
        (200, SUCCESS_BODY),
    ])
    .await;
    let err = summarize("query", &sample_hits(), &config_for(&base))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Summarizer(_)));
    assert!(err.to_string().contains("after retry"));
    // Exactly two attempts: the scripted 200 is never requested.
    assert_eq!(connections.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn client_error_is_not_retried() {
    let (base, connections) =
        mock_endpoint(vec![(400, r#"{"error":"bad key"}"#), (200, SUCCESS_BODY)]).await;
    let err = summarize("query", &sample_hits(), &config_for(&base))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Summarizer(_)));
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unexpected_shape_is_structured_failure_not_retried() {
    // A 200 whose body is not the expected candidates shape: failure is
    // detected structurally, never by matching message text.
    let (base, connections) =
        mock_endpoint(vec![(200, r#"{"message":"quota exceeded"}"#), (200, SUCCESS_BODY)]).await;
    let err = summarize("query", &sample_hits(), &config_for(&base))
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::Summarizer(_)));
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}
