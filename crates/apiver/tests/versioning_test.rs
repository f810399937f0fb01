use apiver::{with_version, VersionMatcher, VersionQueryLayer, NOT_FOUND};
use apiver_core::{Request, Router, TestClient, TestRequest};
use proptest::prelude::*;

async fn h1() -> &'static str {
    "h1"
}

async fn h2() -> &'static str {
    "h2"
}

fn cats() -> Router {
    let matcher = VersionMatcher::builder()
        .version("1.0", h1)
        .version(">= 2, < 3", h2)
        .build()
        .unwrap();
    Router::new().route("/api/cats", matcher.into_handler())
}

async fn get_with(client: &TestClient, name: &str, value: &str) -> apiver_core::TestResponse {
    client
        .request(TestRequest::get("/api/cats").header(name, value))
        .await
}

#[tokio::test]
async fn test_dispatch_by_accept_version() {
    let client = TestClient::new(cats());

    for version in ["1", "1.0"] {
        get_with(&client, "Accept-Version", version)
            .await
            .assert_status(200)
            .assert_body("h1")
            .assert_header("X-API-Version", version);
    }

    for version in ["2", "2.0", "2.1", "2.5", "2.9.9"] {
        get_with(&client, "Accept-Version", version)
            .await
            .assert_body("h2")
            .assert_header("X-API-Version", version);
    }
}

#[tokio::test]
async fn test_dispatch_by_accept_token() {
    let client = TestClient::new(cats());

    get_with(&client, "Accept", "application/json; version=2.5")
        .await
        .assert_body("h2")
        .assert_header("X-API-Version", "2.5");

    get_with(&client, "Accept", "application/json; version=1.0 ;q=0.9")
        .await
        .assert_body("h1");
}

#[tokio::test]
async fn test_default_fallback() {
    let client = TestClient::new(cats());

    for (name, value) in [
        ("Accept-Version", "3.0"),
        ("Accept-Version", "latest"),
        ("Accept", "version="),
        ("Accept", "application/json"),
    ] {
        get_with(&client, name, value)
            .await
            .assert_status(501)
            .assert_body("version not found")
            .assert_no_header("X-API-Version");
    }

    client
        .get("/api/cats")
        .await
        .assert_status(501)
        .assert_body("version not found");
}

#[tokio::test]
async fn test_unversioned_path_is_router_404() {
    let client = TestClient::new(cats());

    let response = client
        .request(TestRequest::get("/api/dogs").header("Accept-Version", "1"))
        .await;
    response.assert_status(404).assert_no_header("X-API-Version");
    let json: serde_json::Value = response.json().unwrap();
    assert_eq!(json["error"]["type"], "not_found");
}

#[tokio::test]
async fn test_custom_fallback() {
    let matcher = VersionMatcher::builder()
        .version("1", h1)
        .not_found(|| async { (http::StatusCode::NOT_FOUND, "gone") })
        .build()
        .unwrap();
    let client = TestClient::new(Router::new().route("/api/cats", matcher.into_handler()));

    get_with(&client, "Accept-Version", "2")
        .await
        .assert_status(404)
        .assert_body("gone");
}

#[tokio::test]
async fn test_override_beats_headers() {
    let matcher = VersionMatcher::builder()
        .version("1", h1)
        .version(">= 11, < 12", h2)
        .build()
        .unwrap();

    let mut req = Request::from(
        http::Request::builder()
            .uri("/api/cats")
            .header("Accept-Version", "1")
            .header("Accept", "application/json; version=1")
            .body(bytes::Bytes::new())
            .unwrap(),
    );
    with_version(&mut req, "11.0.5");

    let response = apiver_core::TestResponse::from_response(matcher.dispatch(req).await).await;
    response
        .assert_body("h2")
        .assert_header("X-API-Version", "11.0.5");
}

#[tokio::test]
async fn test_query_layer_sets_override() {
    let matcher = VersionMatcher::builder()
        .version("1", h1)
        .version("2", h2)
        .build()
        .unwrap();
    let router = Router::new()
        .layer(VersionQueryLayer::new())
        .route("/api/cats", matcher.into_handler());
    let client = TestClient::new(router);

    client
        .request(TestRequest::get("/api/cats?version=2").header("Accept-Version", "1"))
        .await
        .assert_body("h2");
}

#[tokio::test]
async fn test_same_request_same_selection() {
    let client = TestClient::new(cats());

    let first = get_with(&client, "Accept-Version", "2.1").await;
    let second = get_with(&client, "Accept-Version", "2.1").await;

    assert_eq!(first.text(), second.text());
    assert_eq!(first.header("X-API-Version"), second.header("X-API-Version"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_dispatch() {
    let client = TestClient::new(cats());

    let tasks: Vec<_> = (0..64)
        .map(|i| {
            let client = client.clone();
            tokio::spawn(async move {
                let (version, expected) = match i % 3 {
                    0 => ("1", "h1"),
                    1 => ("2.4", "h2"),
                    _ => ("7", "version not found"),
                };
                let response = get_with(&client, "Accept-Version", version).await;
                assert_eq!(response.text(), expected);
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }
}

#[test]
fn test_sentinel_is_not_a_version() {
    assert!(NOT_FOUND.parse::<apiver::Version>().is_err());
}

proptest! {
    #[test]
    fn prop_satisfies_matches_parsed_check(major in 0u64..5, minor in 0u64..5, patch in 0u64..5) {
        let version = format!("{}.{}.{}", major, minor, patch);
        let constraint = apiver::Constraint::parse(">= 2, < 3").unwrap();
        let parsed = apiver::Version::parse(&version).unwrap();
        prop_assert_eq!(apiver::satisfies(&version, ">= 2, < 3"), constraint.check(&parsed));
        prop_assert_eq!(constraint.check(&parsed), major == 2);
    }
}
