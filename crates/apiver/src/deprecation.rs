//! Deprecation notices
//!
//! [`deprecated`] wraps a handler so its responses carry:
//!
//! | Header | Value | When |
//! |--------|-------|------|
//! | `X-API-Warn` | warning message, or the configured default | always |
//! | `X-API-Deprecation-Date` | date as `Mon, 02 Jan 2006 15:04:05 GMT` | date set |
//! | `X-API-Deprecation-Info` | free text, e.g. a migration link | info set |
//!
//! Headers already present on the response are left alone, so when wrappers
//! are nested the innermost one wins.

use crate::config::VersioningConfig;
use apiver_core::{BoxFuture, BoxedHandler, Request};
use chrono::{DateTime, Utc};
use http::{HeaderName, HeaderValue};
use std::fmt::Write;
use std::sync::Arc;
use tracing::warn;

/// What to tell clients of a deprecated handler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeprecationOptions {
    /// Warning text; the configured default is used when empty
    pub warn_message: String,
    /// When the version was (or will be) deprecated
    pub deprecation_date: Option<DateTime<Utc>>,
    /// Extra information such as a link to migration docs
    pub deprecation_info: String,
}

impl DeprecationOptions {
    /// Options carrying only the generic warning message
    pub fn default_warning() -> Self {
        Self {
            warn_message: crate::config::DEFAULT_WARN_MESSAGE.to_string(),
            ..Self::default()
        }
    }

    pub fn with_warn_message(mut self, message: impl Into<String>) -> Self {
        self.warn_message = message.into();
        self
    }

    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.deprecation_date = Some(date);
        self
    }

    pub fn with_info(mut self, info: impl Into<String>) -> Self {
        self.deprecation_info = info.into();
        self
    }

    /// Whether any field is set
    ///
    /// Groups ignore inactive options.
    pub fn is_active(&self) -> bool {
        !self.warn_message.is_empty()
            || self.deprecation_date.is_some()
            || !self.deprecation_info.is_empty()
    }
}

/// Wrap `handler` so its responses carry deprecation headers
pub fn deprecated(handler: BoxedHandler, options: DeprecationOptions) -> BoxedHandler {
    deprecated_with(handler, options, &VersioningConfig::shared())
}

/// [`deprecated`] with explicit header names and date format
pub fn deprecated_with(
    handler: BoxedHandler,
    options: DeprecationOptions,
    config: &VersioningConfig,
) -> BoxedHandler {
    let headers: Arc<[(HeaderName, HeaderValue)]> = render_headers(&options, config).into();

    Arc::new(move |req: Request| {
        let inner = handler(req);
        let headers = headers.clone();
        Box::pin(async move {
            let mut response = inner.await;
            for (name, value) in headers.iter() {
                response
                    .headers_mut()
                    .entry(name)
                    .or_insert_with(|| value.clone());
            }
            response
        }) as BoxFuture
    })
}

fn render_headers(
    options: &DeprecationOptions,
    config: &VersioningConfig,
) -> Vec<(HeaderName, HeaderValue)> {
    let mut headers = Vec::with_capacity(3);

    let message = if options.warn_message.is_empty() {
        &config.default_warn_message
    } else {
        &options.warn_message
    };
    push_header(&mut headers, &config.warn_header, message);

    if let Some(date) = options.deprecation_date {
        let mut formatted = String::new();
        match write!(formatted, "{}", date.format(&config.date_format)) {
            Ok(()) => push_header(&mut headers, &config.deprecation_date_header, &formatted),
            Err(_) => warn!(format = %config.date_format, "Invalid deprecation date format, header skipped"),
        }
    }

    if !options.deprecation_info.is_empty() {
        push_header(&mut headers, &config.deprecation_info_header, &options.deprecation_info);
    }

    headers
}

fn push_header(headers: &mut Vec<(HeaderName, HeaderValue)>, name: &HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => headers.push((name.clone(), value)),
        Err(_) => warn!(header = %name, "Deprecation header value is not a valid header value, skipped"),
    }
}
