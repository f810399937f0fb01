//! Per-path version dispatch
//!
//! A [`VersionMatcher`] owns the constraints registered for one path. For each
//! request it extracts the requested version, finds the first constraint the
//! version satisfies and runs that handler, advertising the resolved version
//! in the `X-API-Version` response header. Anything else (no version, a
//! version that does not parse, no matching constraint) goes to the fallback
//! handler.
//!
//! # Example
//!
//! ```rust,ignore
//! use apiver::VersionMatcher;
//!
//! let cats = VersionMatcher::builder()
//!     .version("1", send_v1)
//!     .version(">= 2, < 3", send_v2)
//!     .not_found(unsupported)
//!     .build()?;
//!
//! let router = Router::new().route("/api/cats", cats.into_handler());
//! ```

use crate::config::VersioningConfig;
use crate::error::Result;
use crate::extract::{VersionExtractor, NOT_FOUND};
use crate::version::{Constraint, Version};
use apiver_core::{into_boxed_handler, BoxFuture, BoxedHandler, Handler, IntoResponse, Request, Response};
use http::HeaderValue;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Constraint expression → handler, evaluated in insertion order
///
/// A handler stored under [`NOT_FOUND`] becomes the fallback.
pub type VersionMap = IndexMap<String, BoxedHandler>;

/// Why a request went to the fallback handler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// The request carried no version
    Missing,
    /// The requested version could not be parsed
    Unparseable,
    /// No constraint accepts the requested version
    Unmatched,
}

/// Outcome of resolving a request against a matcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The constraint at `index` accepted `version`
    Matched { index: usize, version: Version },
    /// The fallback handler applies
    Fallback(FallbackReason),
}

struct Route {
    constraint: Constraint,
    handler: BoxedHandler,
}

struct Inner {
    routes: Vec<Route>,
    not_found: BoxedHandler,
    extractor: VersionExtractor,
    config: Arc<VersioningConfig>,
}

/// Dispatches requests to the handler whose constraint matches their version
///
/// Immutable once built and cheap to clone; a single matcher serves any
/// number of concurrent requests.
#[derive(Clone)]
pub struct VersionMatcher {
    inner: Arc<Inner>,
}

impl VersionMatcher {
    /// Build a matcher from `versions` with the default configuration
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::InvalidConstraint`](crate::VersionError::InvalidConstraint)
    /// if any key other than [`NOT_FOUND`] is not a valid constraint.
    pub fn new(versions: VersionMap) -> Result<Self> {
        Self::with_config(versions, VersioningConfig::shared())
    }

    /// Build a matcher using `config` for header names and the default fallback
    pub fn with_config(versions: VersionMap, config: Arc<VersioningConfig>) -> Result<Self> {
        let mut not_found = None;
        let mut routes = Vec::with_capacity(versions.len());

        for (label, handler) in versions {
            if label == NOT_FOUND {
                not_found = Some(handler);
                continue;
            }
            routes.push(Route {
                constraint: label.parse()?,
                handler,
            });
        }

        let not_found = not_found.unwrap_or_else(|| not_found_handler(&config));

        Ok(Self {
            inner: Arc::new(Inner {
                routes,
                not_found,
                extractor: VersionExtractor::with_config(config.clone()),
                config,
            }),
        })
    }

    /// Start building a matcher fluently
    pub fn builder() -> MatcherBuilder {
        MatcherBuilder::default()
    }

    /// Constraints in evaluation order
    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.inner.routes.iter().map(|route| &route.constraint)
    }

    /// Decide which handler `req` goes to, without running it
    pub fn resolve(&self, req: &Request) -> Resolution {
        let requested = self.inner.extractor.extract(req);
        if requested == NOT_FOUND {
            debug!(path = %req.path(), "No version requested, using fallback");
            return Resolution::Fallback(FallbackReason::Missing);
        }

        let Ok(version) = requested.parse::<Version>() else {
            debug!(version = %requested, path = %req.path(), "Unparseable version, using fallback");
            return Resolution::Fallback(FallbackReason::Unparseable);
        };

        match self
            .inner
            .routes
            .iter()
            .position(|route| route.constraint.check(&version))
        {
            Some(index) => {
                debug!(
                    version = %version,
                    path = %req.path(),
                    constraint = %self.inner.routes[index].constraint,
                    "Version matched"
                );
                Resolution::Matched { index, version }
            }
            None => {
                debug!(version = %version, path = %req.path(), "No constraint matched, using fallback");
                Resolution::Fallback(FallbackReason::Unmatched)
            }
        }
    }

    /// Run exactly one handler for `req`
    pub async fn dispatch(&self, req: Request) -> Response {
        match self.resolve(&req) {
            Resolution::Matched { index, version } => {
                let mut response = (self.inner.routes[index].handler)(req).await;
                // As if set before the handler ran: a value it wrote wins
                if let Ok(value) = HeaderValue::from_str(&version.to_string()) {
                    response
                        .headers_mut()
                        .entry(&self.inner.config.response_version_header)
                        .or_insert(value);
                }
                response
            }
            Resolution::Fallback(_) => (self.inner.not_found)(req).await,
        }
    }

    /// Turn the matcher into a handler that can be bound to a route
    pub fn into_handler(self) -> BoxedHandler {
        Arc::new(move |req: Request| {
            let matcher = self.clone();
            Box::pin(async move { matcher.dispatch(req).await }) as BoxFuture
        })
    }
}

impl fmt::Debug for VersionMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionMatcher")
            .field(
                "constraints",
                &self.constraints().map(Constraint::as_str).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// The default fallback: `config.not_found_status` with `config.not_found_body`
///
/// With the default configuration that is `501 Not Implemented` and
/// `version not found`.
pub fn not_found_handler(config: &VersioningConfig) -> BoxedHandler {
    let status = config.not_found_status;
    let body = config.not_found_body.clone();
    Arc::new(move |_req: Request| {
        let body = body.clone();
        Box::pin(async move { (status, body).into_response() }) as BoxFuture
    })
}

/// Fluent construction of a [`VersionMatcher`]
#[derive(Default)]
pub struct MatcherBuilder {
    versions: VersionMap,
    config: Option<Arc<VersioningConfig>>,
}

impl MatcherBuilder {
    /// Route versions satisfying `constraint` to `handler`
    ///
    /// Re-using a constraint replaces its handler in place.
    pub fn version<H, T>(mut self, constraint: &str, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.versions
            .insert(constraint.to_string(), into_boxed_handler(handler));
        self
    }

    /// Route versions satisfying `constraint` to an already boxed handler
    pub fn boxed(mut self, constraint: &str, handler: BoxedHandler) -> Self {
        self.versions.insert(constraint.to_string(), handler);
        self
    }

    /// Replace the default fallback handler
    pub fn not_found<H, T>(self, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.boxed(NOT_FOUND, into_boxed_handler(handler))
    }

    pub fn config(mut self, config: Arc<VersioningConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// Parse every constraint and build the matcher
    pub fn build(self) -> Result<VersionMatcher> {
        let config = self.config.unwrap_or_else(VersioningConfig::shared);
        VersionMatcher::with_config(self.versions, config)
    }
}
