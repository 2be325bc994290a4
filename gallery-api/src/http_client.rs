//! HttpClient middleware used by GalleryClient
//!
//! Responsible for
//!  - sending GET and HEAD requests to the site and third-party endpoints
//!  - logging/tracing
//!  - request metrics
//!
//! There are no retries: a failed request is reported to the caller.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use bytes::Bytes;
use reqwest::{ClientBuilder, Method};
use serde::de::DeserializeOwned;
use snafu::prelude::*;
use tracing::{debug, error, trace};

use crate::{
    Result,
    error::{ApiSnafu, DeserializationSnafu, GalleryError, HttpSnafu},
};

/// HTTP metrics tracked using atomic counters for thread-safe access.
/// These counters are cumulative and never reset during the client's lifetime.
#[derive(Debug, Default)]
pub struct HttpMetrics {
    /// Total number of HTTP requests sent
    total_requests: AtomicU64,
    /// Total number of successful responses (2xx status codes)
    successful_responses: AtomicU64,
    /// Total number of error responses and transport failures
    errors: AtomicU64,
    /// Total bytes received in response bodies
    bytes_received: AtomicU64,
}

impl HttpMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of current metrics as plain u64 values
    pub fn snapshot(&self) -> HttpMetricsSnapshot {
        HttpMetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_responses: self.successful_responses.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
        }
    }

    fn increment_requests(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    fn increment_success(&self) {
        self.successful_responses.fetch_add(1, Ordering::Relaxed);
    }

    fn increment_errors(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    fn add_bytes_received(&self, bytes: u64) {
        self.bytes_received.fetch_add(bytes, Ordering::Relaxed);
    }
}

/// A point-in-time snapshot of HTTP metrics with plain u64 values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpMetricsSnapshot {
    /// Total number of HTTP requests sent
    pub total_requests: u64,
    /// Total number of successful responses (2xx status codes)
    pub successful_responses: u64,
    /// Total number of error responses and transport failures
    pub errors: u64,
    /// Total bytes received in response bodies
    pub bytes_received: u64,
}

impl std::fmt::Display for HttpMetricsSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "requests={} success={} errors={} recv={}",
            self.total_requests,
            self.successful_responses,
            self.errors,
            format_bytes(self.bytes_received),
        )
    }
}

#[allow(clippy::cast_precision_loss)]
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes}B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1}MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct HttpClient {
    pub client: reqwest::Client,

    /// HTTP request/response metrics
    pub metrics: Arc<HttpMetrics>,
}

impl HttpClient {
    pub fn new(builder: ClientBuilder) -> Result<Self> {
        let client = builder.build().context(HttpSnafu {
            method: "client-init",
            url: "",
        })?;
        Ok(HttpClient {
            client,
            metrics: Arc::new(HttpMetrics::new()),
        })
    }

    /// Returns a snapshot of current HTTP metrics
    pub fn metrics_snapshot(&self) -> HttpMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// GET a url and return the body. Non-2xx responses are errors.
    pub(crate) async fn get_bytes(&self, url: &str) -> Result<Bytes> {
        let request = self.client.request(Method::GET, url);
        log_request(&request);
        self.metrics.increment_requests();

        let response = request.send().await.map_err(|source| {
            error!(?source, url, "http");
            self.metrics.increment_errors();
            GalleryError::Http {
                method: Method::GET.to_string(),
                url: url.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            self.metrics.increment_errors();
            debug!(code = status.as_u16(), url, "http");
            return ApiSnafu {
                code: status.as_u16(),
                method: Method::GET.to_string(),
                url,
                reason: status.canonical_reason().unwrap_or_default(),
            }
            .fail();
        }

        let body = response.bytes().await.context(HttpSnafu {
            method: Method::GET.to_string(),
            url,
        })?;
        self.metrics.increment_success();
        self.metrics.add_bytes_received(body.len() as u64);
        log_response(url, &body);
        Ok(body)
    }

    /// GET a url and deserialize the json body
    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.get_bytes(url).await?;
        deserialize_json(&body)
    }

    /// GET a url as utf-8 text (lossy)
    pub(crate) async fn get_text(&self, url: &str) -> Result<String> {
        let body = self.get_bytes(url).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// HEAD a url. Returns true for a 2xx response, false for any other status.
    /// Transport failures are errors.
    pub(crate) async fn probe(&self, url: &str) -> Result<bool> {
        let request = self.client.request(Method::HEAD, url);
        log_request(&request);
        self.metrics.increment_requests();
        match request.send().await {
            Ok(response) if response.status().is_success() => {
                self.metrics.increment_success();
                Ok(true)
            }
            Ok(response) => {
                self.metrics.increment_errors();
                debug!(code = response.status().as_u16(), url, "probe");
                Ok(false)
            }
            Err(source) => {
                self.metrics.increment_errors();
                Err(GalleryError::Http {
                    method: Method::HEAD.to_string(),
                    url: url.to_string(),
                    source,
                })
            }
        }
    }
}

// dump request
// requires RUST_LOG=gallery::http=trace
fn log_request(builder: &reqwest::RequestBuilder) {
    if tracing::enabled!(target: "gallery::http", tracing::Level::TRACE)
        && let Some(req) = builder.try_clone().and_then(|b| b.build().ok())
    {
        trace!(target: "gallery::http", "{} url={}", req.method().as_str(), req.url());
    }
}

// dump response body, for debugging
fn log_response(url: &str, body: &Bytes) {
    if tracing::enabled!(target: "gallery::http", tracing::Level::TRACE) {
        trace!(target: "gallery::http", "Response url={url} body={}",
            String::from_utf8_lossy(body)
        );
    }
}

// deserialize, reporting errors with 'serde_path_to_error', which provides
// detailed json path to the error
pub(crate) fn deserialize_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    match serde_path_to_error::deserialize(&mut deserializer) {
        Ok(value) => Ok(value),
        Err(err) => {
            let path = err.path().to_string();
            error!("Deserialization failed at {path}: {err}");
            Err(err.into_inner()).context(DeserializationSnafu { path })
        }
    }
}
