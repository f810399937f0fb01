use apiver::{VersionMatcher, VersioningConfig};
use apiver_core::{Router, TestClient, TestRequest};
use serial_test::serial;
use std::env;
use std::sync::Arc;

const VARS: [&str; 4] = [
    "APIVER_ACCEPT_VERSION_HEADER",
    "APIVER_RESPONSE_VERSION_HEADER",
    "APIVER_NOT_FOUND_STATUS",
    "APIVER_NOT_FOUND_BODY",
];

fn clear() {
    for var in VARS {
        env::remove_var(var);
    }
}

async fn v1() -> &'static str {
    "v1"
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear();
    let config = VersioningConfig::from_env().unwrap();
    assert_eq!(config.accept_version_header, "accept-version");
    assert_eq!(config.not_found_status, http::StatusCode::NOT_IMPLEMENTED);
}

#[test]
#[serial]
fn test_from_env_rejects_bad_status() {
    clear();
    env::set_var("APIVER_NOT_FOUND_STATUS", "abc");
    let result = VersioningConfig::from_env();
    clear();

    assert!(matches!(result, Err(apiver::VersionError::Config(_))));
}

#[tokio::test]
#[serial]
async fn test_env_config_drives_matcher() {
    clear();
    env::set_var("APIVER_ACCEPT_VERSION_HEADER", "X-Version");
    env::set_var("APIVER_RESPONSE_VERSION_HEADER", "X-Served-Version");
    env::set_var("APIVER_NOT_FOUND_STATUS", "400");
    env::set_var("APIVER_NOT_FOUND_BODY", "unknown version");
    let config = Arc::new(VersioningConfig::from_env().unwrap());
    clear();

    let matcher = VersionMatcher::builder()
        .version("1", v1)
        .config(config)
        .build()
        .unwrap();
    let client = TestClient::new(Router::new().route("/", matcher.into_handler()));

    client
        .request(TestRequest::get("/").header("X-Version", "1"))
        .await
        .assert_body("v1")
        .assert_header("X-Served-Version", "1");

    client
        .request(TestRequest::get("/").header("Accept-Version", "1"))
        .await
        .assert_status(400)
        .assert_body("unknown version");
}
