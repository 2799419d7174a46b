//! HTTP access for the catalog: a JSON GET and a HEAD reachability probe.
//!
//! Requests are attempted once and never time out unless the client or the
//! call says otherwise. With a retry budget, transport failures, 429 and 5xx
//! are retried with exponential backoff that honours `Retry-After`.
//!
//! ```rust,no_run
//! # async fn demo() -> Result<(), zoolight_http::HttpError> {
//! let client = zoolight_http::HttpClient::new();
//! let animals: serde_json::Value = client
//!     .get_json(
//!         "https://zoolight.s3.ap-south-1.amazonaws.com/Zoolight+database.json",
//!         zoolight_http::RequestOpts::default(),
//!     )
//!     .await?;
//! # Ok(()) }
//! ```
//!
//! Every attempt logs `http.request.start` and `http.response.headers`.
//! Set `ZOOLIGHT_HTTP_RAW=1` to also get a curl line and the response body
//! under target `http.raw`.

use reqwest::header::{HeaderMap, HeaderValue, RANGE, RETRY_AFTER};
use reqwest::{Client, Method, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::env;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::time::sleep;
use uuid::Uuid;

const RAW_ENV: &str = "ZOOLIGHT_HTTP_RAW";
const RAW_MAX_BODY: usize = 64 * 1024;
const SNIPPET_MAX: usize = 500;
const RATE_LIMIT_FLOOR: Duration = Duration::from_millis(1100);
const SENSITIVE_HEADERS: &[&str] = &["authorization", "cookie", "set-cookie"];
/// Statuses hosts give HEAD while still serving GET (method not allowed,
/// not implemented, URLs presigned for GET only).
const HEAD_REFUSED: [StatusCode; 3] = [
    StatusCode::FORBIDDEN,
    StatusCode::METHOD_NOT_ALLOWED,
    StatusCode::NOT_IMPLEMENTED,
];

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid URL: {0}")]
    Url(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}, body_snippet: {1}")]
    Decode(String, String),
    #[error("server returned error {status}: {message}, request_id={request_id}")]
    Api {
        status: StatusCode,
        message: String,
        request_id: String,
    },
}

/// Per-call overrides; `None` falls back to the client default.
///
/// ```
/// use zoolight_http::RequestOpts;
/// use std::time::Duration;
///
/// let probe = RequestOpts {
///     timeout: Some(Duration::from_secs(5)),
///     retries: Some(0),
/// };
/// assert_ne!(probe, RequestOpts::default());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestOpts {
    pub timeout: Option<Duration>,
    pub retries: Option<usize>,
}

#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
    /// `None` means requests are not time-bounded.
    pub default_timeout: Option<Duration>,
    pub max_retries: usize,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// What a single attempt came back with.
enum Attempt {
    Answered {
        status: StatusCode,
        headers: HeaderMap,
        body: Vec<u8>,
        elapsed: Duration,
    },
    Failed {
        stage: &'static str,
        message: String,
    },
}

/// A request that ended with a 2xx or 3xx.
struct Exchange {
    req_id: String,
    status: StatusCode,
    body: Vec<u8>,
}

impl HttpClient {
    /// Never times out and never retries.
    ///
    /// ```
    /// use zoolight_http::HttpClient;
    ///
    /// let client = HttpClient::new();
    /// assert_eq!(client.default_timeout, None);
    /// assert_eq!(client.max_retries, 0);
    /// ```
    pub fn new() -> Self {
        Self {
            inner: Client::new(),
            default_timeout: None,
            max_retries: 0,
        }
    }

    /// ```
    /// use zoolight_http::HttpClient;
    /// use std::time::Duration;
    ///
    /// let client = HttpClient::new().with_timeout(Duration::from_secs(2));
    /// assert_eq!(client.default_timeout, Some(Duration::from_secs(2)));
    /// ```
    pub fn with_timeout(mut self, dur: Duration) -> Self {
        self.default_timeout = Some(dur);
        self
    }

    pub fn with_retries(mut self, n: usize) -> Self {
        self.max_retries = n;
        self
    }

    /// GET `url` and decode the body as JSON.
    pub async fn get_json<T>(&self, url: &str, opts: RequestOpts) -> Result<T, HttpError>
    where
        T: DeserializeOwned,
    {
        let exchange = self.execute(Method::GET, url, opts, HeaderMap::new()).await?;
        serde_json::from_slice::<T>(&exchange.body).map_err(|e| {
            let snippet = snip_body(&exchange.body);
            tracing::warn!(
                req_id = %exchange.req_id,
                serde_line = e.line(),
                serde_col = e.column(),
                error = %e,
                body_snippet = %snippet,
                "http.response.decode_error"
            );
            HttpError::Decode(e.to_string(), snippet)
        })
    }

    /// Check that `url` can be fetched. Any 4xx/5xx is an [`HttpError::Api`].
    ///
    /// Starts with HEAD. When HEAD is refused with 403, 405 or 501 the answer
    /// comes from a GET for the first byte instead.
    pub async fn probe(&self, url: &str, opts: RequestOpts) -> Result<StatusCode, HttpError> {
        match self.execute(Method::HEAD, url, opts, HeaderMap::new()).await {
            Ok(exchange) => Ok(exchange.status),
            Err(HttpError::Api { status, .. }) if HEAD_REFUSED.contains(&status) => {
                tracing::debug!(%url, %status, "http.probe.head_refused");
                let mut first_byte = HeaderMap::new();
                first_byte.insert(RANGE, HeaderValue::from_static("bytes=0-0"));
                Ok(self.execute(Method::GET, url, opts, first_byte).await?.status)
            }
            Err(e) => Err(e),
        }
    }

    async fn attempt(
        &self,
        method: &Method,
        url: &Url,
        headers: &HeaderMap,
        timeout: Option<Duration>,
    ) -> Attempt {
        let mut rb = self
            .inner
            .request(method.clone(), url.clone())
            .headers(headers.clone());
        if let Some(t) = timeout {
            rb = rb.timeout(t);
        }

        let started = Instant::now();
        let resp = match rb.send().await {
            Ok(resp) => resp,
            Err(e) => {
                return Attempt::Failed {
                    stage: "send",
                    message: e.to_string(),
                };
            }
        };
        let status = resp.status();
        let headers = resp.headers().clone();
        match resp.bytes().await {
            Ok(bytes) => Attempt::Answered {
                status,
                headers,
                body: bytes.to_vec(),
                elapsed: started.elapsed(),
            },
            Err(e) => Attempt::Failed {
                stage: "body",
                message: e.to_string(),
            },
        }
    }

    async fn execute(
        &self,
        method: Method,
        raw_url: &str,
        opts: RequestOpts,
        request_headers: HeaderMap,
    ) -> Result<Exchange, HttpError> {
        let url = parse_url(raw_url)?;
        let max_retries = opts.retries.unwrap_or(self.max_retries);
        let timeout = opts.timeout.or(self.default_timeout);
        let req_id = format!("r{}", Uuid::new_v4().simple());
        let mut attempt = 1usize;

        loop {
            let can_retry = attempt <= max_retries;
            tracing::debug!(
                req_id = %req_id,
                attempt,
                max_retries,
                method = %method,
                host_path = %format!("{}{}", url.host_str().unwrap_or("-"), url.path()),
                timeout_ms = ?timeout.map(|t| t.as_millis() as u64),
                "http.request.start"
            );
            if raw_enabled() {
                tracing::debug!(target: "http.raw", req_id = %req_id, curl = %curl_line(&method, &url, &request_headers), "request");
            }

            let (status, headers, body) = match self.attempt(&method, &url, &request_headers, timeout).await {
                Attempt::Answered {
                    status,
                    headers,
                    body,
                    elapsed,
                } => {
                    log_response(&req_id, status, &headers, &body, elapsed);
                    (status, headers, body)
                }
                Attempt::Failed { stage, message } if can_retry => {
                    let delay = backoff(attempt);
                    tracing::warn!(
                        req_id = %req_id,
                        attempt,
                        stage,
                        backoff_ms = delay.as_millis() as u64,
                        message = %message,
                        "http.retrying.network"
                    );
                    sleep(delay).await;
                    attempt += 1;
                    continue;
                }
                Attempt::Failed { stage, message } => {
                    tracing::warn!(req_id = %req_id, attempt, stage, message = %message, "http.network_error");
                    return Err(HttpError::Network(message));
                }
            };

            if status.is_success() || status.is_redirection() {
                return Ok(Exchange {
                    req_id,
                    status,
                    body,
                });
            }

            let message = extract_error_message(&body);
            if can_retry && let Some(delay) = retry_delay(status, &headers, attempt) {
                tracing::warn!(
                    req_id = %req_id,
                    %status,
                    attempt,
                    backoff_ms = delay.as_millis() as u64,
                    message = %message,
                    "http.retrying"
                );
                sleep(delay).await;
                attempt += 1;
                continue;
            }

            let request_id = upstream_request_id(&headers).to_string();
            tracing::warn!(
                req_id = %req_id,
                %status,
                message = %message,
                x_request_id = %request_id,
                "http.error"
            );
            return Err(HttpError::Api {
                status,
                message,
                request_id,
            });
        }
    }
}

/// Only absolute http(s) URLs are fetched; `data:` and friends are refused.
fn parse_url(raw: &str) -> Result<Url, HttpError> {
    let url = Url::parse(raw).map_err(|e| HttpError::Url(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(HttpError::Url(format!("unsupported scheme `{other}` in {raw}"))),
    }
}

/// Delay before the next try, or `None` when the status is final.
fn retry_delay(status: StatusCode, headers: &HeaderMap, attempt: usize) -> Option<Duration> {
    let rate_limited = status == StatusCode::TOO_MANY_REQUESTS;
    if !rate_limited && !status.is_server_error() {
        return None;
    }
    Some(match retry_after_secs(headers) {
        Some(secs) => Duration::from_secs(secs),
        None if rate_limited => backoff(attempt).max(RATE_LIMIT_FLOOR),
        None => backoff(attempt),
    })
}

fn backoff(attempt: usize) -> Duration {
    let exp = attempt.saturating_sub(1).min(16) as u32;
    Duration::from_millis(200u64.saturating_mul(1u64 << exp))
}

fn retry_after_secs(h: &HeaderMap) -> Option<u64> {
    h.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()
}

fn upstream_request_id(h: &HeaderMap) -> &str {
    h.get("x-amz-request-id")
        .or_else(|| h.get("x-request-id"))
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
}

fn log_response(req_id: &str, status: StatusCode, headers: &HeaderMap, body: &[u8], elapsed: Duration) {
    let duration_ms = elapsed.as_millis() as u64;
    tracing::debug!(
        req_id,
        %status,
        duration_ms,
        body_len = body.len(),
        x_request_id = upstream_request_id(headers),
        "http.response.headers"
    );
    if raw_enabled() {
        let truncated = body.len() > RAW_MAX_BODY;
        let text = String::from_utf8_lossy(&body[..body.len().min(RAW_MAX_BODY)]);
        tracing::info!(
            target: "http.raw",
            req_id,
            %status,
            duration_ms,
            headers = ?loggable_headers(headers),
            body = %text,
            truncated
        );
    }
}

fn raw_enabled() -> bool {
    matches!(
        env::var(RAW_ENV).as_deref(),
        Ok("1") | Ok("true") | Ok("yes")
    )
}

fn curl_line(method: &Method, url: &Url, headers: &HeaderMap) -> String {
    let mut line = format!("curl -X{method}");
    for (name, value) in loggable_headers(headers) {
        line.push_str(&format!(" -H '{name}: {value}'"));
    }
    line.push_str(&format!(" '{}'", url.as_str().replace('\'', r"'\''")));
    line
}

fn loggable_headers(h: &HeaderMap) -> Vec<(String, String)> {
    h.iter()
        .map(|(k, v)| {
            let name = k.as_str();
            let value = if SENSITIVE_HEADERS.contains(&name) {
                "<redacted>"
            } else {
                v.to_str().unwrap_or("<binary>")
            };
            (name.to_string(), value.to_string())
        })
        .collect()
}

/// Pull a readable message out of a JSON error envelope.
///
/// S3 answers with XML, which falls through to the body snippet.
fn extract_error_message(body: &[u8]) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        #[serde(default)]
        message: String,
        #[serde(default)]
        detail: String,
        #[serde(default)]
        error: String,
    }

    serde_json::from_slice::<Envelope>(body)
        .ok()
        .and_then(|e| {
            [e.message, e.detail, e.error]
                .into_iter()
                .find(|m| !m.is_empty())
        })
        .unwrap_or_else(|| snip_body(body))
}

fn snip_body(body: &[u8]) -> String {
    let mut snip = String::from_utf8_lossy(body).into_owned();
    if snip.len() > SNIPPET_MAX {
        let mut cut = SNIPPET_MAX;
        while !snip.is_char_boundary(cut) {
            cut -= 1;
        }
        snip.truncate(cut);
        snip.push_str("...");
    }
    snip
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_saturates() {
        assert_eq!(backoff(1), Duration::from_millis(200));
        assert_eq!(backoff(3), Duration::from_millis(800));
        assert_eq!(backoff(200), backoff(17));
    }

    #[test]
    fn only_throttling_and_server_errors_are_retried() {
        let none = HeaderMap::new();
        assert_eq!(retry_delay(StatusCode::NOT_FOUND, &none, 1), None);
        assert_eq!(retry_delay(StatusCode::FORBIDDEN, &none, 1), None);
        assert_eq!(
            retry_delay(StatusCode::BAD_GATEWAY, &none, 2),
            Some(Duration::from_millis(400))
        );
        assert_eq!(
            retry_delay(StatusCode::TOO_MANY_REQUESTS, &none, 1),
            Some(RATE_LIMIT_FLOOR)
        );

        let mut after = HeaderMap::new();
        after.insert(RETRY_AFTER, HeaderValue::from_static(" 3 "));
        assert_eq!(
            retry_delay(StatusCode::TOO_MANY_REQUESTS, &after, 1),
            Some(Duration::from_secs(3))
        );
    }

    #[test]
    fn error_message_prefers_json_fields() {
        assert_eq!(extract_error_message(br#"{"message":"nope"}"#), "nope");
        assert_eq!(extract_error_message(br#"{"error":"denied"}"#), "denied");
        assert_eq!(
            extract_error_message(b"<Error><Code>NoSuchKey</Code></Error>"),
            "<Error><Code>NoSuchKey</Code></Error>"
        );
    }

    #[test]
    fn snippets_are_truncated_on_char_boundaries() {
        let body = "🦁".repeat(300);
        let snip = snip_body(body.as_bytes());
        assert!(snip.ends_with("..."));
        assert!(snip.len() <= SNIPPET_MAX + 3);
    }

    #[test]
    fn cookies_are_redacted_from_logs() {
        let mut h = HeaderMap::new();
        h.insert("set-cookie", HeaderValue::from_static("session=abc"));
        h.insert("content-type", HeaderValue::from_static("application/json"));
        let logged = loggable_headers(&h);
        assert!(logged.contains(&("set-cookie".into(), "<redacted>".into())));
        assert!(logged.contains(&("content-type".into(), "application/json".into())));
    }

    #[test]
    fn only_absolute_http_urls_are_accepted() {
        assert!(matches!(parse_url("animals.json"), Err(HttpError::Url(_))));
        assert!(matches!(parse_url("ftp://zoo.example.org/a.jpg"), Err(HttpError::Url(_))));
        assert_eq!(
            parse_url("https://zoo.example.org/a b.jpg").unwrap().path(),
            "/a%20b.jpg"
        );
    }

    #[test]
    fn curl_line_quotes_the_url() {
        let url = parse_url("https://zoo.example.org/it's.jpg").unwrap();
        assert_eq!(
            curl_line(&Method::HEAD, &url, &HeaderMap::new()),
            r"curl -XHEAD 'https://zoo.example.org/it'\''s.jpg'"
        );

        let mut range = HeaderMap::new();
        range.insert(RANGE, HeaderValue::from_static("bytes=0-0"));
        assert_eq!(
            curl_line(&Method::GET, &url, &range),
            r"curl -XGET -H 'range: bytes=0-0' 'https://zoo.example.org/it'\''s.jpg'"
        );
    }
}
