//! Handler trait and utilities

use crate::request::Request;
use crate::response::{IntoResponse, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed response future returned by type-erased handlers
pub type BoxFuture = Pin<Box<dyn Future<Output = Response> + Send + 'static>>;

/// Type-erased handler for storage in routers and version maps
///
/// Cloning is cheap: the handler itself is shared behind an `Arc`.
pub type BoxedHandler = Arc<dyn Fn(Request) -> BoxFuture + Send + Sync>;

/// Trait representing an async handler function
///
/// Implemented for async functions taking either no arguments or the
/// [`Request`] itself, returning anything that implements [`IntoResponse`].
pub trait Handler<T>: Clone + Send + Sync + Sized + 'static {
    /// The response type
    type Future: Future<Output = Response> + Send + 'static;

    /// Call the handler with the request
    fn call(self, req: Request) -> Self::Future;
}

// 0 args
impl<F, Fut, Res> Handler<()> for F
where
    F: FnOnce() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: IntoResponse,
{
    type Future = BoxFuture;

    fn call(self, _req: Request) -> Self::Future {
        Box::pin(async move { self().await.into_response() })
    }
}

// The raw request
impl<F, Fut, Res> Handler<(Request,)> for F
where
    F: FnOnce(Request) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: IntoResponse,
{
    type Future = BoxFuture;

    fn call(self, req: Request) -> Self::Future {
        Box::pin(async move { self(req).await.into_response() })
    }
}

// An already type-erased handler, such as a version matcher
impl Handler<BoxedHandler> for BoxedHandler {
    type Future = BoxFuture;

    fn call(self, req: Request) -> Self::Future {
        self(req)
    }
}

/// Create a boxed handler from any Handler
pub fn into_boxed_handler<H, T>(handler: H) -> BoxedHandler
where
    H: Handler<T>,
    T: 'static,
{
    Arc::new(move |req| {
        let handler = handler.clone();
        Box::pin(async move { handler.call(req).await })
    })
}
