//! HTTP client for the one-stroke puzzle backend.
//!
//! Epistemic foundation:
//! - K_i: The backend exposes /generate, /level, /solve and /hint as JSON endpoints
//! - B_i: Backend will respond within timeout (might fail)
//! - B_i: Response will be valid JSON of the expected shape (might fail)
//! - I^B: Network availability unknowable → bounded retry with backoff

use crate::models::{BackendError, Config, Graph, OnestrokeError, Result, SolveResponse};
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// FastAPI-style error body: `{"detail": "..."}` or a list of validation errors.
#[derive(Debug, serde::Deserialize)]
struct ApiErrorResponse {
    detail: serde_json::Value,
}

impl ApiErrorResponse {
    fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Client for the puzzle backend.
///
/// Features:
/// - Typed graph payloads for /generate, /level and /solve
/// - Opaque JSON pass-through for /hint
/// - Retry with exponential backoff on transport errors and 5xx
/// - Custom headers (e.g. tunnel bypass tokens)
pub struct BackendClient {
    client: reqwest::Client,
    /// Base URL without trailing slash
    base_url: String,
    /// Extra headers sent with every request
    custom_headers: HashMap<String, String>,
    /// Request timeout
    timeout: Duration,
    /// Total attempts per request
    max_retries: u32,
    /// First retry delay; doubles per attempt
    retry_backoff: Duration,
}

impl BackendClient {
    /// Create a new backend client.
    ///
    /// # Arguments
    /// - `base_url`: Backend root, e.g. "http://localhost:8000"
    /// - `custom_headers`: Additional headers to include in requests
    /// - `timeout_secs`: Request timeout in seconds
    /// - `max_retries`: Total attempts per request (0 is treated as 1)
    pub fn new(
        base_url: String,
        custom_headers: HashMap<String, String>,
        timeout_secs: u64,
        max_retries: u32,
    ) -> Result<Self> {
        let timeout = Duration::from_secs(timeout_secs);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(OnestrokeError::Network)?;

        Ok(Self::with_client(
            client,
            base_url,
            custom_headers,
            timeout,
            max_retries,
        ))
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(
        client: reqwest::Client,
        base_url: String,
        custom_headers: HashMap<String, String>,
        timeout: Duration,
        max_retries: u32,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            custom_headers,
            timeout,
            max_retries: max_retries.max(1),
            retry_backoff: Duration::from_secs(1),
        }
    }

    /// Build a client from resolved configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = config.resolve_base_url()?;
        Self::new(
            base_url,
            config.resolve_headers(),
            config.backend.timeout_secs,
            config.backend.max_retries,
        )
    }

    /// Override the initial retry delay.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Delay before the retry that follows `attempt`, doubling and saturating.
    fn backoff_for(&self, attempt: u32) -> Duration {
        self.retry_backoff.saturating_mul(2u32.saturating_pow(attempt))
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build headers for a request.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        for (key, value) in &self.custom_headers {
            if let (Ok(name), Ok(val)) = (
                HeaderName::try_from(key.as_str()),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, val);
            } else {
                warn!(header = %key, "Skipping invalid custom header");
            }
        }

        headers
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .headers(self.headers())
    }

    /// Fetch the demo graph.
    ///
    /// `GET /generate`
    pub async fn fetch_demo(&self) -> Result<Graph> {
        self.send_json("/generate", || self.request(Method::GET, "/generate"))
            .await
    }

    /// Fetch a level by difficulty and 1-based index.
    ///
    /// `GET /level?difficulty=..&index=..`
    pub async fn fetch_level(&self, difficulty: &str, index: u32) -> Result<Graph> {
        if difficulty.trim().is_empty() {
            return Err(OnestrokeError::InvalidInput(
                "difficulty must not be empty".to_string(),
            ));
        }

        self.send_json("/level", || {
            self.request(Method::GET, "/level")
                .query(&[("difficulty", difficulty.to_string()), ("index", index.to_string())])
        })
        .await
    }

    /// Ask the backend to solve a graph.
    ///
    /// `POST /solve`. A well-formed "no path" answer is `Ok` with `ok == false`.
    pub async fn solve_graph(&self, graph: &Graph) -> Result<SolveResponse> {
        self.send_json("/solve", || self.request(Method::POST, "/solve").json(graph))
            .await
    }

    /// Ask the backend for the next-step hint.
    ///
    /// `POST /hint`. Both request and response are opaque to the client.
    pub async fn hint_next<P>(&self, payload: &P) -> Result<serde_json::Value>
    where
        P: Serialize + ?Sized,
    {
        self.send_json("/hint", || self.request(Method::POST, "/hint").json(payload))
            .await
    }

    /// Send a request, retrying transport failures and 5xx, and decode JSON.
    ///
    /// B_i(backend available) → Result
    /// B_i(valid response) → Result
    async fn send_json<T, F>(&self, endpoint: &str, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let mut last_error: Option<OnestrokeError> = None;

        for attempt in 0..self.max_retries {
            let start = Instant::now();
            let response = build().send().await;

            let error = match response {
                Err(e) if e.is_timeout() => OnestrokeError::Timeout(self.timeout),
                Err(e) => OnestrokeError::Network(e),
                Ok(response) => {
                    let status = response.status();
                    debug!(
                        endpoint = endpoint,
                        status = status.as_u16(),
                        elapsed_ms = start.elapsed().as_millis() as u64,
                        "Backend responded"
                    );

                    if status.is_success() {
                        let body = response.text().await.map_err(OnestrokeError::Network)?;
                        return serde_json::from_str(&body).map_err(|e| {
                            OnestrokeError::Backend(BackendError::InvalidResponse(format!(
                                "{endpoint}: {e}"
                            )))
                        });
                    }

                    let error_body = response.text().await.unwrap_or_default();
                    let message = serde_json::from_str::<ApiErrorResponse>(&error_body)
                        .map(|api_error| api_error.message())
                        .unwrap_or(error_body);

                    OnestrokeError::Backend(BackendError::Status {
                        status: status.as_u16(),
                        message,
                    })
                }
            };

            if !error.is_retryable() {
                return Err(error);
            }

            if attempt + 1 < self.max_retries {
                let backoff = self.backoff_for(attempt);
                warn!(
                    endpoint = endpoint,
                    attempt = attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %error,
                    "Retrying backend request"
                );
                tokio::time::sleep(backoff).await;
            }
            last_error = Some(error);
        }

        // All retries exhausted
        let last_error = last_error.map(|e| e.to_string()).unwrap_or_default();
        Err(OnestrokeError::Backend(BackendError::MaxRetriesExceeded {
            attempts: self.max_retries,
            last_error,
        }))
    }

    /// Health check: fetch the demo graph with a short timeout.
    ///
    /// K_i: backend is reachable and responding
    /// B_i: backend is healthy if /generate returns 2xx
    pub async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();

        match self
            .request(Method::GET, "/generate")
            .timeout(Duration::from_secs(10))
            .send()
            .await
        {
            Ok(response) => {
                let latency_ms = start.elapsed().as_millis() as u64;
                if response.status().is_success() {
                    HealthCheckResult {
                        base_url: self.base_url.clone(),
                        status: HealthStatus::Healthy,
                        latency_ms: Some(latency_ms),
                        error: None,
                    }
                } else {
                    HealthCheckResult {
                        base_url: self.base_url.clone(),
                        status: HealthStatus::Unhealthy,
                        latency_ms: Some(latency_ms),
                        error: Some(format!("HTTP {}", response.status().as_u16())),
                    }
                }
            }
            Err(e) => HealthCheckResult {
                base_url: self.base_url.clone(),
                status: HealthStatus::Unreachable,
                latency_ms: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Health check result.
#[derive(Debug, Clone)]
pub struct HealthCheckResult {
    /// Backend that was checked
    pub base_url: String,
    /// Health status
    pub status: HealthStatus,
    /// Latency in milliseconds (if reachable)
    pub latency_ms: Option<u64>,
    /// Error message (if unhealthy or unreachable)
    pub error: Option<String>,
}

/// Health status of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    /// Backend is responding normally
    Healthy,
    /// Backend is responding but with errors
    Unhealthy,
    /// Backend is not reachable
    Unreachable,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "healthy"),
            HealthStatus::Unhealthy => write!(f, "unhealthy"),
            HealthStatus::Unreachable => write!(f, "unreachable"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Edge, HintRequest, VertexId};
    use serde_json::json;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// A request as seen by the stub server.
    #[derive(Debug, Clone)]
    struct Captured {
        request_line: String,
        headers: String,
        body: String,
    }

    /// Serves one canned response per connection, in order, then stops.
    async fn stub_server(responses: Vec<(u16, &'static str)>) -> (String, Arc<Mutex<Vec<Captured>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&captured);

        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                let request = read_request(&mut socket).await;
                sink.lock().unwrap().push(request);

                let response = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                socket.write_all(response.as_bytes()).await.unwrap();
                socket.shutdown().await.ok();
            }
        });

        (format!("http://{addr}"), captured)
    }

    async fn read_request(socket: &mut tokio::net::TcpStream) -> Captured {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];

        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
            if n == 0 {
                break buf.len();
            }
        };

        let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                name.eq_ignore_ascii_case("content-length")
                    .then(|| value.trim().parse::<usize>().ok())
                    .flatten()
            })
            .unwrap_or(0);

        while buf.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        let mut lines = head.lines();
        let request_line = lines.next().unwrap_or_default().to_string();
        let headers = lines.collect::<Vec<_>>().join("\n").to_lowercase();
        let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

        Captured {
            request_line,
            headers,
            body,
        }
    }

    fn client(base_url: String, max_retries: u32) -> BackendClient {
        let http = reqwest::Client::builder().no_proxy().build().unwrap();
        BackendClient::with_client(
            http,
            base_url,
            HashMap::from([("ngrok-skip-browser-warning".to_string(), "1".to_string())]),
            Duration::from_secs(5),
            max_retries,
        )
        .with_retry_backoff(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn test_fetch_demo() {
        let (url, captured) =
            stub_server(vec![(200, r#"{"nodes":[1,2,3],"edges":[[1,2],[2,3],[3,1]]}"#)]).await;

        let graph = client(url, 1).fetch_demo().await.unwrap();
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.check());

        let requests = captured.lock().unwrap();
        assert_eq!(requests[0].request_line, "GET /generate HTTP/1.1");
        assert!(requests[0].headers.contains("ngrok-skip-browser-warning: 1"));
    }

    #[tokio::test]
    async fn test_fetch_level_query() {
        let (url, captured) = stub_server(vec![(200, r#"{"nodes":[],"edges":[]}"#)]).await;

        let graph = client(url, 1).fetch_level("hard", 4).await.unwrap();
        assert_eq!(graph.edge_count(), 0);

        let requests = captured.lock().unwrap();
        assert_eq!(
            requests[0].request_line,
            "GET /level?difficulty=hard&index=4 HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_fetch_level_rejects_empty_difficulty() {
        let client = client("http://127.0.0.1:9".to_string(), 1);
        assert!(matches!(
            client.fetch_level("  ", 1).await,
            Err(OnestrokeError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_solve_posts_graph_json() {
        let (url, captured) = stub_server(vec![(200, r#"{"ok":true,"path":[1,2,3,1]}"#)]).await;

        let graph: Graph = Graph::new(
            vec![1.into(), 2.into(), 3.into()],
            vec![
                Edge::new(1.into(), 2.into()),
                Edge::new(2.into(), 3.into()),
                Edge::new(3.into(), 1.into()),
            ],
        );
        let solved = client(url, 1).solve_graph(&graph).await.unwrap();
        assert_eq!(
            solved.path(),
            Some(&[1.into(), 2.into(), 3.into(), VertexId::Int(1)][..])
        );

        let requests = captured.lock().unwrap();
        assert_eq!(requests[0].request_line, "POST /solve HTTP/1.1");
        let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(body, json!({"nodes": [1, 2, 3], "edges": [[1, 2], [2, 3], [3, 1]]}));
    }

    #[tokio::test]
    async fn test_solve_no_path_is_ok_false() {
        let (url, _) = stub_server(vec![(200, r#"{"ok":false,"error":"No Euler path"}"#)]).await;

        let graph: Graph = Graph::new(Vec::new(), vec![Edge::new(1.into(), 2.into())]);
        let solved = client(url, 1).solve_graph(&graph).await.unwrap();
        assert!(!solved.ok);
        assert_eq!(solved.error.as_deref(), Some("No Euler path"));
    }

    #[tokio::test]
    async fn test_hint_passes_payload_through() {
        let (url, captured) = stub_server(vec![(200, r#"{"next":[2,3],"explanation":"go"}"#)]).await;

        let request = HintRequest::new(json!({"current": 2}));
        let hint = client(url, 1).hint_next(&request).await.unwrap();
        assert_eq!(hint["next"], json!([2, 3]));

        let requests = captured.lock().unwrap();
        assert_eq!(requests[0].request_line, "POST /hint HTTP/1.1");
        let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(body, json!({"state": {"current": 2}}));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let (url, captured) = stub_server(vec![
            (422, r#"{"detail":"edges: field required"}"#),
            (200, r#"{"ok":true,"path":[]}"#),
        ])
        .await;

        let graph: Graph = Graph::new(Vec::new(), Vec::new());
        let err = client(url, 3).solve_graph(&graph).await.unwrap_err();
        match err {
            OnestrokeError::Backend(BackendError::Status { status, message }) => {
                assert_eq!(status, 422);
                assert_eq!(message, "edges: field required");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(captured.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let (url, captured) = stub_server(vec![
            (503, "upstream down"),
            (200, r#"{"nodes":[1,2],"edges":[[1,2]]}"#),
        ])
        .await;

        let graph = client(url, 2).fetch_demo().await.unwrap();
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(captured.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let (url, _) = stub_server(vec![(500, "boom"), (500, "boom")]).await;

        let err = client(url, 2).fetch_demo().await.unwrap_err();
        match err {
            OnestrokeError::Backend(BackendError::MaxRetriesExceeded { attempts, last_error }) => {
                assert_eq!(attempts, 2);
                assert!(last_error.contains("boom"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_is_reported() {
        let (url, _) = stub_server(vec![(200, r#"{"nodes":[1],"edges":[[1]]}"#)]).await;

        let err = client(url, 1).fetch_demo().await.unwrap_err();
        assert!(matches!(
            err,
            OnestrokeError::Backend(BackendError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_health_check_statuses() {
        let (url, _) = stub_server(vec![(200, r#"{"nodes":[],"edges":[]}"#), (500, "")]).await;
        let client = client(url, 1);

        let healthy = client.health_check().await;
        assert_eq!(healthy.status, HealthStatus::Healthy);
        assert!(healthy.latency_ms.is_some());

        let unhealthy = client.health_check().await;
        assert_eq!(unhealthy.status, HealthStatus::Unhealthy);
        assert_eq!(unhealthy.error.as_deref(), Some("HTTP 500"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = client("http://localhost:8000/api/".to_string(), 1);
        assert_eq!(client.base_url(), "http://localhost:8000/api");
        assert_eq!(client.url("/solve"), "http://localhost:8000/api/solve");
    }

    #[test]
    fn test_backoff_doubles_and_saturates() {
        let client = client("http://localhost:8000".to_string(), 64);
        assert_eq!(client.backoff_for(0), Duration::from_millis(10));
        assert_eq!(client.backoff_for(3), Duration::from_millis(80));
        assert_eq!(client.backoff_for(40), Duration::from_millis(10).saturating_mul(u32::MAX));
        assert_eq!(client.backoff_for(u32::MAX - 1), client.backoff_for(40));
    }

    #[test]
    fn test_zero_retries_means_one_attempt() {
        let client = client("http://localhost:8000".to_string(), 0);
        assert_eq!(client.max_retries, 1);
    }
}
