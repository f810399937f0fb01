//! Tracing middleware
//!
//! Logs request method, path, status code and duration for each request, and
//! optionally the value of selected response headers (for example the
//! resolved API version).

use super::layer::{BoxedNext, MiddlewareLayer};
use crate::handler::BoxFuture;
use crate::request::Request;
use std::time::Instant;
use tracing::{info_span, Instrument, Level};

/// Middleware layer that creates a tracing span for each request
///
/// The span carries `method`, `path`, `status` and `duration_ms`. Response
/// headers registered with [`with_response_header`](Self::with_response_header)
/// are logged alongside the completion event.
///
/// # Example
///
/// ```rust,ignore
/// use apiver_core::TracingLayer;
///
/// Router::new()
///     .layer(TracingLayer::new().with_response_header("x-api-version"))
///     .route("/", handler)
/// ```
#[derive(Clone)]
pub struct TracingLayer {
    level: Level,
    response_headers: Vec<String>,
}

impl TracingLayer {
    /// Create a new TracingLayer with default INFO level
    pub fn new() -> Self {
        Self {
            level: Level::INFO,
            response_headers: Vec::new(),
        }
    }

    /// Create a TracingLayer with a specific log level for successful requests
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            response_headers: Vec::new(),
        }
    }

    /// Log the value of a response header on completion
    pub fn with_response_header(mut self, name: impl Into<String>) -> Self {
        self.response_headers.push(name.into().to_ascii_lowercase());
        self
    }
}

impl Default for TracingLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl MiddlewareLayer for TracingLayer {
    fn call(&self, req: Request, next: BoxedNext) -> BoxFuture {
        let level = self.level;
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let response_headers = self.response_headers.clone();

        Box::pin(async move {
            let start = Instant::now();

            let span = info_span!(
                "http_request",
                method = %method,
                path = %path,
                status = tracing::field::Empty,
                duration_ms = tracing::field::Empty,
            );

            let response = next(req).instrument(span.clone()).await;

            let duration_ms = start.elapsed().as_millis() as u64;
            let status = response.status();
            span.record("status", status.as_u16());
            span.record("duration_ms", duration_ms);

            let headers: Vec<String> = response_headers
                .iter()
                .filter_map(|name| {
                    response
                        .headers()
                        .get(name.as_str())
                        .and_then(|v| v.to_str().ok())
                        .map(|v| format!("{}={}", name, v))
                })
                .collect();
            let headers = headers.join(" ");

            let _enter = span.enter();
            if status.is_client_error() || status.is_server_error() {
                tracing::warn!(
                    status = status.as_u16(),
                    duration_ms,
                    headers = %headers,
                    "Request failed"
                );
            } else if level == Level::DEBUG || level == Level::TRACE {
                tracing::debug!(
                    status = status.as_u16(),
                    duration_ms,
                    headers = %headers,
                    "Request completed"
                );
            } else {
                tracing::info!(
                    status = status.as_u16(),
                    duration_ms,
                    headers = %headers,
                    "Request completed"
                );
            }

            response
        })
    }

    fn clone_box(&self) -> Box<dyn MiddlewareLayer> {
        Box::new(self.clone())
    }
}
