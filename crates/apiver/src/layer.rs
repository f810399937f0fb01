//! Query-parameter version override
//!
//! Lets clients pick a version with `?version=2` instead of a header, by
//! copying the parameter into the request's [`RequestedVersion`] override.
//!
//! ```rust,ignore
//! let router = Router::new()
//!     .layer(VersionQueryLayer::new())
//!     .route("/api/cats", cats.into_handler());
//! ```
//!
//! [`RequestedVersion`]: crate::RequestedVersion

use crate::extract::with_version;
use apiver_core::{BoxFuture, BoxedNext, MiddlewareLayer, Request};

/// Middleware that turns a query parameter into a version override
#[derive(Debug, Clone)]
pub struct VersionQueryLayer {
    param: String,
}

impl VersionQueryLayer {
    /// Read the `version` query parameter
    pub fn new() -> Self {
        Self::with_param("version")
    }

    /// Read the query parameter `param`
    pub fn with_param(param: impl Into<String>) -> Self {
        Self {
            param: param.into(),
        }
    }
}

impl Default for VersionQueryLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl MiddlewareLayer for VersionQueryLayer {
    fn call(&self, mut req: Request, next: BoxedNext) -> BoxFuture {
        if let Some(version) = query_value(req.query_string(), &self.param) {
            with_version(&mut req, version);
        }
        next(req)
    }

    fn clone_box(&self) -> Box<dyn MiddlewareLayer> {
        Box::new(self.clone())
    }
}

/// First non-empty value of `param`; malformed query strings yield nothing
fn query_value(query: Option<&str>, param: &str) -> Option<String> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query?).ok()?;
    pairs
        .into_iter()
        .find(|(key, value)| key == param && !value.is_empty())
        .map(|(_, value)| value)
}
