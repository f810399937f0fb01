//! # apiver Core
//!
//! HTTP plumbing shared by the apiver crates: the request and response types,
//! the [`Handler`] trait, a path router, a middleware stack and a small
//! hyper-based server.
//!
//! This crate is not meant to be used directly. Use `apiver` instead.

mod error;
mod handler;
pub mod middleware;
mod request;
mod response;
mod router;
mod server;
#[cfg(any(test, feature = "test-utils"))]
mod test_client;

// Public API
pub use error::{ApiError, Result};
pub use handler::{into_boxed_handler, BoxFuture, BoxedHandler, Handler};
pub use middleware::{BoxedNext, LayerStack, MiddlewareLayer, TracingLayer};
pub use request::Request;
pub use response::{IntoResponse, Response};
pub use router::{RouteConflictError, RouteMatch, RouteRegistry, Router};
pub use server::serve;
#[cfg(any(test, feature = "test-utils"))]
pub use test_client::{TestClient, TestRequest, TestResponse};
