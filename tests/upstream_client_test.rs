use content_gateway::config::{TokenConfig, UpstreamConfig};
use content_gateway::core::token_manager::TokenManager;
use content_gateway::core::upstream::UpstreamClient;
use content_gateway::adapters::GraphQlClient;
use content_gateway::GatewayError;
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;

fn upstream_config(server: &MockServer) -> UpstreamConfig {
    UpstreamConfig {
        endpoint: server.url("/"),
        network_domain: "community.example.com".to_string(),
        timeout_seconds: 5,
        ..Default::default()
    }
}

fn build_client(server: &MockServer) -> (UpstreamClient, Arc<TokenManager>) {
    let config = upstream_config(server);
    let graphql = GraphQlClient::new(&config).unwrap();
    let manager = Arc::new(TokenManager::new(
        Arc::new(graphql.clone()),
        config.network_domain.clone(),
        &TokenConfig::default(),
    )
    .unwrap());
    (UpstreamClient::new(graphql, manager.clone()), manager)
}

fn post_body(content: &str, title: &str) -> serde_json::Value {
    json!({
        "data": {
            "post": {
                "mappingFields": [
                    {"key": "title", "type": "text", "value": title},
                    {"key": "content", "type": "html", "value": content}
                ],
                "title": title
            }
        }
    })
}

fn token_body(token: &str) -> serde_json::Value {
    json!({"data": {"tokens": {"accessToken": token}}})
}

/// 取得權杖後以 Bearer 標頭查詢貼文
#[tokio::test]
async fn test_fetch_content_with_issued_token() {
    let server = MockServer::start_async().await;

    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .header("user-agent", "GPTers-Scraper/1.0")
                .body_contains(r#"tokens(networkDomain: \"community.example.com\")"#);
            then.status(200).json_body(token_body("guest-token-1"));
        })
        .await;

    let post_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .header("authorization", "Bearer guest-token-1")
                .header("accept", "*/*")
                .body_contains("GetPost")
                .body_contains(r#""id":"post-42""#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(post_body("<p>Hello</p>", "Greeting"));
        })
        .await;

    let (client, _manager) = build_client(&server);
    let post = client.fetch_content("post-42").await.unwrap();

    assert_eq!(post.content, "<p>Hello</p>");
    assert_eq!(post.title.as_deref(), Some("Greeting"));
    token_mock.assert_hits_async(1).await;
    post_mock.assert_hits_async(1).await;
}

/// 兩次 401：只重試一次，之後回報錯誤
#[tokio::test]
async fn test_unauthorized_twice_fails_after_one_retry() {
    let server = MockServer::start_async().await;

    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains("tokens(");
            then.status(200).json_body(token_body("rejected-token"));
        })
        .await;

    let post_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains("GetPost");
            then.status(401).body("Unauthorized");
        })
        .await;

    let (client, _manager) = build_client(&server);
    let err = client.fetch_content("post-1").await.unwrap_err();

    assert!(matches!(err.root(), GatewayError::UpstreamUnauthorized));
    post_mock.assert_hits_async(2).await;
    // 第一次取得權杖 + 一次強制刷新
    token_mock.assert_hits_async(2).await;
}

/// 過期權杖被拒後，刷新取得的新權杖可成功查詢
#[tokio::test]
async fn test_unauthorized_then_refreshed_token_succeeds() {
    let server = MockServer::start_async().await;
    let (client, manager) = build_client(&server);

    let stale_token_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains("tokens(");
            then.status(200).json_body(token_body("stale-token"));
        })
        .await;
    manager.refresh_token().await.unwrap();
    stale_token_mock.delete_async().await;

    let fresh_token_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains("tokens(");
            then.status(200).json_body(token_body("fresh-token"));
        })
        .await;

    let rejected = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .header("authorization", "Bearer stale-token")
                .body_contains("GetPost");
            then.status(401);
        })
        .await;

    let accepted = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .header("authorization", "Bearer fresh-token")
                .body_contains("GetPost");
            then.status(200).json_body(post_body("\"<p>ok</p>\"", "Retry"));
        })
        .await;

    let post = client.fetch_content("post-7").await.unwrap();

    assert_eq!(post.content, "\"<p>ok</p>\"");
    rejected.assert_hits_async(1).await;
    accepted.assert_hits_async(1).await;
    fresh_token_mock.assert_hits_async(1).await;
    assert_eq!(manager.snapshot().await.access_token, "fresh-token");
}

#[tokio::test]
async fn test_token_endpoint_failure_skips_content_request() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains("tokens(");
            then.status(500).body("boom");
        })
        .await;

    let post_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains("GetPost");
            then.status(200).json_body(post_body("<p>never</p>", "Never"));
        })
        .await;

    let (client, manager) = build_client(&server);
    let err = client.fetch_content("post-1").await.unwrap_err();

    let message = err.to_string();
    assert!(message.starts_with("error getting access token: failed to refresh token"));
    assert!(message.contains("500"));
    post_mock.assert_hits_async(0).await;
    assert!(manager.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_empty_access_token_is_rejected() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains("tokens(");
            then.status(200).json_body(json!({"data": {"tokens": {"accessToken": ""}}}));
        })
        .await;

    let (_client, manager) = build_client(&server);
    let err = manager.refresh_token().await.unwrap_err();

    assert!(matches!(err.root(), GatewayError::EmptyToken));
    assert!(manager.snapshot().await.is_empty());
}

#[tokio::test]
async fn test_malformed_token_response() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains("tokens(");
            then.status(200).body("not json");
        })
        .await;

    let (_client, manager) = build_client(&server);
    let err = manager.refresh_token().await.unwrap_err();

    assert!(err.to_string().starts_with("error parsing token response"));
}

#[tokio::test]
async fn test_missing_content_field_still_returns_title() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains("tokens(");
            then.status(200).json_body(token_body("guest-token"));
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains("GetPost");
            then.status(200).json_body(json!({
                "data": {"post": {"mappingFields": [], "title": "Untitled draft"}}
            }));
        })
        .await;

    let (client, _manager) = build_client(&server);
    let err = client.fetch_content("post-9").await.unwrap_err();

    assert!(matches!(err, GatewayError::ContentFieldMissing { .. }));
    assert_eq!(err.title(), Some("Untitled draft"));
}

#[tokio::test]
async fn test_graphql_errors_are_reported() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains("tokens(");
            then.status(200).json_body(token_body("guest-token"));
        })
        .await;

    server
        .mock_async(|when, then| {
            when.method(POST).path("/").body_contains("GetPost");
            then.status(200).json_body(json!({
                "data": null,
                "errors": [{"message": "Post not found"}]
            }));
        })
        .await;

    let (client, _manager) = build_client(&server);
    let err = client.fetch_content("missing").await.unwrap_err();

    assert_eq!(err.to_string(), "post query failed: GraphQL errors: Post not found");
}
