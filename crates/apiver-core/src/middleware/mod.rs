//! Middleware infrastructure for apiver
//!
//! Middleware is added with [`Router::layer`](crate::Router::layer) and wraps
//! every routed request.
//!
//! # Example
//!
//! ```rust,ignore
//! use apiver_core::{Router, TracingLayer};
//!
//! let router = Router::new()
//!     .layer(TracingLayer::new().with_response_header("x-api-version"))
//!     .route("/", handler);
//! ```

mod layer;
mod tracing_layer;

pub use layer::{BoxedNext, LayerStack, MiddlewareLayer};
pub use tracing_layer::TracingLayer;
