//! Path router
//!
//! A radix-tree router (via `matchit`) mapping request paths to handlers.
//! Paths use `{param}` placeholders which are converted to matchit's `:param`
//! syntax on registration.
//!
//! The only capability the versioning layer needs from a router is
//! [`RouteRegistry::handle`]; [`Router`] is the implementation shipped here.

use crate::error::ApiError;
use crate::handler::{into_boxed_handler, BoxedHandler, Handler};
use crate::middleware::{BoxedNext, LayerStack, MiddlewareLayer};
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use bytes::Bytes;
use http::request::Parts;
use matchit::Router as MatchitRouter;
use std::collections::HashMap;
use std::sync::Arc;

/// Something that can bind a handler to a request path
pub trait RouteRegistry {
    /// Register `handler` for requests to `path`
    fn handle(&mut self, path: &str, handler: BoxedHandler);
}

/// Error raised when two registrations claim the same path
#[derive(Debug, Clone, thiserror::Error)]
#[error(
    "route conflict: `{path}` conflicts with an already registered route ({details}). \
     Each path can only be registered once"
)]
pub struct RouteConflictError {
    /// The path that failed to register
    pub path: String,
    /// Details reported by the radix tree
    pub details: String,
}

/// Result of matching a path
pub enum RouteMatch<'a> {
    /// A handler was found
    Found {
        handler: &'a BoxedHandler,
        params: HashMap<String, String>,
    },
    /// No route for this path
    NotFound,
}

/// Main router
#[derive(Clone)]
pub struct Router {
    inner: MatchitRouter<BoxedHandler>,
    paths: Vec<String>,
    layers: LayerStack,
}

impl Router {
    /// Create a new router
    pub fn new() -> Self {
        Self {
            inner: MatchitRouter::new(),
            paths: Vec::new(),
            layers: LayerStack::new(),
        }
    }

    /// Add a route
    ///
    /// # Panics
    ///
    /// Panics with a [`RouteConflictError`] message when `path` is already
    /// registered.
    pub fn route<H, T>(mut self, path: &str, handler: H) -> Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.insert(path, into_boxed_handler(handler));
        self
    }

    /// Add a middleware layer
    ///
    /// Layers run in the order they are added (outermost first).
    pub fn layer<L: MiddlewareLayer>(mut self, layer: L) -> Self {
        self.layers.push(Box::new(layer));
        self
    }

    /// Registered paths in registration order
    pub fn registered_paths(&self) -> &[String] {
        &self.paths
    }

    fn insert(&mut self, path: &str, handler: BoxedHandler) {
        let matchit_path = convert_path_params(path);
        if let Err(e) = self.inner.insert(matchit_path, handler) {
            let conflict = RouteConflictError {
                path: path.to_string(),
                details: e.to_string(),
            };
            panic!("{}", conflict);
        }
        self.paths.push(path.to_string());
    }

    /// Match a request path
    pub fn match_route(&self, path: &str) -> RouteMatch<'_> {
        match self.inner.at(path) {
            Ok(matched) => {
                let params = matched
                    .params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                RouteMatch::Found {
                    handler: matched.value,
                    params,
                }
            }
            Err(_) => RouteMatch::NotFound,
        }
    }

    /// Route a request through the middleware stack to its handler
    pub(crate) async fn dispatch(&self, parts: Parts, body: Bytes) -> Response {
        let path = parts.uri.path().to_string();

        let (handler, params) = match self.match_route(&path) {
            RouteMatch::Found { handler, params } => (handler.clone(), params),
            RouteMatch::NotFound => {
                return ApiError::not_found(format!("No route found for {}", path))
                    .into_response();
            }
        };

        let request = Request::new(parts, body, params);
        let final_handler: BoxedNext = Arc::new(move |req: Request| handler(req));

        self.layers.execute(request, final_handler).await
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteRegistry for Router {
    fn handle(&mut self, path: &str, handler: BoxedHandler) {
        self.insert(path, handler);
    }
}

/// Convert `{param}` segments to matchit's `:param` syntax
fn convert_path_params(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            match segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
            {
                Some(name) => format!(":{}", name),
                None => segment.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ok() -> &'static str {
        "ok"
    }

    #[test]
    fn test_convert_path_params() {
        assert_eq!(convert_path_params("/users/{id}"), "/users/:id");
        assert_eq!(convert_path_params("/api/cats"), "/api/cats");
        assert_eq!(
            convert_path_params("/a/{x}/b/{y}"),
            "/a/:x/b/:y"
        );
    }

    #[test]
    fn test_match_route_with_params() {
        let router = Router::new().route("/users/{id}", ok);
        match router.match_route("/users/42") {
            RouteMatch::Found { params, .. } => {
                assert_eq!(params.get("id"), Some(&"42".to_string()));
            }
            RouteMatch::NotFound => panic!("expected a match"),
        }
        assert!(matches!(router.match_route("/nope"), RouteMatch::NotFound));
    }

    #[test]
    fn test_registry_records_paths() {
        let mut router = Router::new();
        router.handle("/a", into_boxed_handler(ok));
        router.handle("/b", into_boxed_handler(ok));
        assert_eq!(router.registered_paths(), &["/a".to_string(), "/b".to_string()]);
    }

    #[test]
    fn test_route_accepts_boxed_handler() {
        let router = Router::new().route("/boxed", into_boxed_handler(ok));
        assert!(matches!(router.match_route("/boxed"), RouteMatch::Found { .. }));
    }

    #[test]
    #[should_panic(expected = "route conflict")]
    fn test_duplicate_path_panics() {
        let _ = Router::new().route("/a", ok).route("/a", ok);
    }
}
