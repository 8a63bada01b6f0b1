//! Integration tests for `RedditClient` against a local wiremock server.

use chrono::{Duration, Utc};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use silverline_sentiment::{
    ContentFetcher, DayWindow, RedditClient, RedditCredentials, SentimentError,
};

fn credentials() -> RedditCredentials {
    RedditCredentials {
        client_id: "id".to_string(),
        client_secret: "secret".to_string(),
        user_agent: "silverline-test/0.1".to_string(),
    }
}

fn test_client(server: &MockServer) -> RedditClient {
    RedditClient::with_base_urls(credentials(), 5, &server.uri(), &server.uri())
        .expect("failed to build test RedditClient")
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "tok", "expires_in": 3600})),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn listing(posts: &[(Option<&str>, Option<i64>)], after: Option<&str>) -> serde_json::Value {
    let children: Vec<serde_json::Value> = posts
        .iter()
        .map(|(title, created)| json!({"data": {"title": title, "created_utc": created}}))
        .collect();
    json!({"data": {"children": children, "after": after}})
}

#[tokio::test]
async fn hot_search_returns_titles_and_reuses_token() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .and(query_param("q", "rust"))
        .and(query_param("sort", "hot"))
        .and(query_param("limit", "10"))
        .and(query_param("restrict_sr", "true"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            &[
                (Some("Rust 2024 is out"), None),
                (Some("[removed]"), None),
                (None, None),
                (Some("Ferris appreciation"), None),
            ],
            None,
        )))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let first = client.fetch("rust", "all", None, 10).await.expect("fetch");
    let second = client.fetch("rust", "all", None, 10).await.expect("fetch");

    assert_eq!(first, vec!["Rust 2024 is out", "Ferris appreciation"]);
    assert_eq!(first, second);
}

#[tokio::test]
async fn hot_search_caps_results_at_limit() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/news/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            &[(Some("a"), None), (Some("b"), None), (Some("c"), None)],
            None,
        )))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let texts = client.fetch("k", "news", None, 2).await.expect("fetch");
    assert_eq!(texts, vec!["a", "b"]);
}

#[tokio::test]
async fn window_search_keeps_only_posts_inside_the_day() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    let now = Utc::now();
    let window = DayWindow::days_ago(now, 1);
    let ts = |hours: i64| Some((now - Duration::hours(hours)).timestamp());

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .and(query_param("sort", "new"))
        .and(query_param("limit", "100"))
        .and(query_param_is_missing("after"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            &[
                (Some("too new"), Some(now.timestamp() + 3600)),
                (Some("inside one"), ts(2)),
                (Some("inside two"), ts(20)),
            ],
            Some("t3_next"),
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .and(query_param("after", "t3_next"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(
            &[(Some("inside three"), ts(23)), (Some("too old"), ts(30))],
            Some("t3_more"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .and(query_param("after", "t3_more"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&[], None)))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let texts = client
        .fetch("rust", "all", Some(window), 25)
        .await
        .expect("fetch");

    assert_eq!(texts, vec!["inside one", "inside two", "inside three"]);
}

#[tokio::test]
async fn token_failure_maps_to_fetch_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.fetch("rust", "all", None, 10).await.unwrap_err();
    assert!(matches!(err, SentimentError::Fetch(_)), "got {err:?}");
}

#[tokio::test]
async fn search_status_error_maps_to_fetch_error() {
    let server = MockServer::start().await;
    mount_token(&server).await;

    Mock::given(method("GET"))
        .and(path("/r/all/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.fetch("rust", "all", None, 10).await.unwrap_err();
    assert!(err.to_string().contains("503"), "got {err}");
}
