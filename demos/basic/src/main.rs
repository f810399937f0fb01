//! Versioned API demo
//!
//! ```text
//! curl -H "Accept-Version: 1" localhost:8080/api/cats
//! curl -H "Accept: application/json; version=2.5" localhost:8080/api/cats
//! curl -H "Accept-Version: 1.9.9" localhost:8080/api/users
//! curl -X POST -H "Accept-Version: 1.8.3" localhost:8080/api/users/new
//! curl -X POST -H "Accept-Version: 2" localhost:8080/api/users
//! curl "localhost:8080/api/cats?version=2"
//! ```

use apiver::{register_groups, DeprecationOptions, VersionGroup, VersionMatcher, VersionQueryLayer, VersioningConfig};
use apiver_core::{IntoResponse, Request, Response, Router, TracingLayer};
use http::{Method, StatusCode};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,apiver=debug")),
        )
        .init();

    let config = Arc::new(VersioningConfig::from_env()?);

    let mut router = per_route(config.clone())?
        .layer(TracingLayer::new().with_response_header(config.response_version_header.as_str()))
        .layer(VersionQueryLayer::new());
    register_users(&mut router, config)?;

    info!("Listening on: http://localhost:8080");
    apiver_core::serve(router, "127.0.0.1:8080").await
}

fn per_route(config: Arc<VersioningConfig>) -> apiver::Result<Router> {
    let cats = VersionMatcher::builder()
        .version("1", cats_v1)
        .version(">= 2, < 3", cats_v2)
        .config(config)
        .build()?;

    Ok(Router::new().route("/api/cats", cats.into_handler()))
}

fn register_users(router: &mut Router, config: Arc<VersioningConfig>) -> apiver::Result<()> {
    let mut v1 = VersionGroup::with_config(">= 1, < 2", config.clone());
    v1.handle("/api/users", list_users_v1)
        .handle("/api/users/new", create_user_v1)
        .deprecated(
            DeprecationOptions::default_warning()
                .with_info("https://localhost:8080/docs/migrate-to-v2"),
        );

    let mut v2 = VersionGroup::with_config(">= 2, < 3", config);
    v2.handle("/api/users", create_user_v2);

    register_groups(Some(router), None, &[v1, v2])?;
    Ok(())
}

async fn cats_v1() -> &'static str {
    "v1 exactly resource: /api/cats handler"
}

async fn cats_v2() -> &'static str {
    "v2 resource: /api/cats handler"
}

async fn list_users_v1(req: Request) -> Response {
    only(&req, Method::GET, "v1 resource: /api/users handler")
}

async fn create_user_v1(req: Request) -> Response {
    only(&req, Method::POST, "v1 resource: /api/users/new post handler")
}

async fn create_user_v2(req: Request) -> Response {
    only(&req, Method::POST, "v2 resource: /api/users post handler")
}

fn only(req: &Request, method: Method, body: &'static str) -> Response {
    if *req.method() != method {
        return (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response();
    }
    body.into_response()
}
