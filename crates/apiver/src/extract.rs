//! Request version extraction
//!
//! The requested version is taken from the first source that has one:
//!
//! 1. a [`RequestedVersion`] override in the request extensions, returned
//!    verbatim even when empty
//! 2. the `Accept-Version` header, if non-empty
//! 3. a `version=` token inside the `Accept` header
//!
//! When none applies the [`NOT_FOUND`] sentinel is returned.

use crate::config::VersioningConfig;
use apiver_core::Request;
use http::HeaderName;
use std::sync::Arc;

/// Sentinel for "no version could be determined"
///
/// Also the label under which a fallback handler is stored in a
/// [`VersionMap`](crate::VersionMap).
pub const NOT_FOUND: &str = "api.version.notfound";

/// Version override attached to a single request
///
/// Set by middleware (see [`VersionQueryLayer`](crate::VersionQueryLayer))
/// or by hand with [`with_version`]. When present it wins over every header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedVersion(pub String);

/// Attach a version override to `req`
pub fn with_version(req: &mut Request, version: impl Into<String>) {
    req.extensions_mut().insert(RequestedVersion(version.into()));
}

/// Resolve the requested version of `req` using the default configuration
pub fn get_version(req: &Request) -> &str {
    extract_version(req, &VersioningConfig::shared())
}

/// Reads the requested version from a request
#[derive(Debug, Clone)]
pub struct VersionExtractor {
    config: Arc<VersioningConfig>,
}

impl VersionExtractor {
    pub fn new() -> Self {
        Self::with_config(VersioningConfig::shared())
    }

    pub fn with_config(config: Arc<VersioningConfig>) -> Self {
        Self { config }
    }

    /// Resolve the requested version of `req`, or [`NOT_FOUND`]
    pub fn extract<'a>(&self, req: &'a Request) -> &'a str {
        extract_version(req, &self.config)
    }
}

impl Default for VersionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn extract_version<'a>(req: &'a Request, config: &VersioningConfig) -> &'a str {
    if let Some(RequestedVersion(version)) = req.extensions().get::<RequestedVersion>() {
        return version;
    }

    let header = move |name: &HeaderName| {
        req.headers()
            .get(name)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
    };

    if let Some(version) = header(&config.accept_version_header) {
        return version;
    }

    match header(&config.accept_header) {
        Some(accept) => from_accept(accept, &config.accept_version_token),
        None => NOT_FOUND,
    }
}

/// Find `<token>...=<value>` in an `Accept` header value
///
/// The value ends at the first space, else the first `;`, else the end of the
/// header.
fn from_accept<'a>(accept: &'a str, token: &str) -> &'a str {
    let Some(start) = accept.find(token) else {
        return NOT_FOUND;
    };
    let Some((_, rest)) = accept[start..].split_once('=') else {
        return NOT_FOUND;
    };

    let end = rest.find(' ').or_else(|| rest.find(';')).unwrap_or(rest.len());
    match &rest[..end] {
        "" => NOT_FOUND,
        version => version,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use proptest::prelude::*;

    fn request(headers: &[(&str, &str)]) -> Request {
        let mut builder = http::Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        Request::from(builder.body(Bytes::new()).unwrap())
    }

    #[test]
    fn test_no_source_is_not_found() {
        assert_eq!(get_version(&request(&[])), NOT_FOUND);
    }

    #[test]
    fn test_accept_version_header() {
        assert_eq!(get_version(&request(&[("Accept-Version", "1")])), "1");
        assert_eq!(
            get_version(&request(&[("Accept-Version", "2.0"), ("Accept", "version=3")])),
            "2.0"
        );
        // An empty dedicated header falls through to Accept
        assert_eq!(
            get_version(&request(&[("Accept-Version", ""), ("Accept", "version=3")])),
            "3"
        );
    }

    #[test]
    fn test_accept_header() {
        let cases = [
            ("application/json; version=2.5", "2.5"),
            ("application/json; version=2.5 ;other=x", "2.5"),
            ("application/json; version=2.5;charset=utf-8", "2.5"),
            ("application/vnd.api+json; version = 1", NOT_FOUND),
            ("version=", NOT_FOUND),
            ("version", NOT_FOUND),
            ("application/json", NOT_FOUND),
            ("application/json; charset=utf-8", NOT_FOUND),
        ];
        for (accept, expected) in cases {
            assert_eq!(get_version(&request(&[("Accept", accept)])), expected, "Accept: {}", accept);
        }
    }

    #[test]
    fn test_override_wins() {
        let mut req = request(&[("Accept-Version", "1"), ("Accept", "version=2")]);
        with_version(&mut req, "11.0.5");
        assert_eq!(get_version(&req), "11.0.5");

        // Empty overrides are authoritative too
        with_version(&mut req, "");
        assert_eq!(get_version(&req), "");
    }

    #[test]
    fn test_custom_headers() {
        let config = VersioningConfig {
            accept_version_header: http::HeaderName::from_static("x-version"),
            accept_version_token: "v".to_string(),
            ..VersioningConfig::default()
        };
        let extractor = VersionExtractor::with_config(Arc::new(config));

        assert_eq!(extractor.extract(&request(&[("X-Version", "4")])), "4");
        assert_eq!(extractor.extract(&request(&[("Accept-Version", "4")])), NOT_FOUND);
        assert_eq!(extractor.extract(&request(&[("Accept", "text/plain; v=7")])), "7");
    }

    proptest! {
        #[test]
        fn prop_accept_version_is_returned_verbatim(version in "[0-9a-zA-Z.+-]{1,16}") {
            let req = request(&[("Accept-Version", version.as_str())]);
            prop_assert_eq!(get_version(&req), version.as_str());
        }

        #[test]
        fn prop_accept_token_value(
            version in "[0-9][0-9.]{0,10}",
            suffix in prop_oneof![Just(" ;q=0.9"), Just(";charset=utf-8"), Just("")],
        ) {
            let accept = format!("application/json; version={}{}", version, suffix);
            let req = request(&[("Accept", accept.as_str())]);
            prop_assert_eq!(get_version(&req), version.as_str());
        }
    }
}
