//! HTTP server implementation

use crate::error::ApiError;
use crate::response::{IntoResponse, Response};
use crate::router::Router;
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Serve `router` on `addr` until the listener fails
///
/// Every connection runs on its own tokio task; the router is shared
/// read-only between them.
pub async fn serve(
    router: Router,
    addr: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr: SocketAddr = addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    let router = Arc::new(router);

    info!("apiver server running on http://{}", addr);

    loop {
        let (stream, _remote_addr) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let router = router.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req: hyper::Request<Incoming>| {
                let router = router.clone();
                async move { Ok::<_, Infallible>(handle_request(router, req).await) }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                error!("Connection error: {}", err);
            }
        });
    }
}

/// Handle a single HTTP request
async fn handle_request(router: Arc<Router>, req: hyper::Request<Incoming>) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let start = std::time::Instant::now();

    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(err) => {
            let response =
                ApiError::bad_request(format!("Failed to read request body: {}", err))
                    .into_response();
            log_request(&method, &path, response.status(), start);
            return response;
        }
    };

    let response = router.dispatch(parts, body).await;

    log_request(&method, &path, response.status(), start);
    response
}

/// Log request completion
fn log_request(
    method: &http::Method,
    path: &str,
    status: http::StatusCode,
    start: std::time::Instant,
) {
    let elapsed = start.elapsed();

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "Request failed"
        );
    } else {
        info!(
            method = %method,
            path = %path,
            status = %status.as_u16(),
            duration_ms = %elapsed.as_millis(),
            "Request completed"
        );
    }
}
