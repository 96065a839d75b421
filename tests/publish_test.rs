// tests/publish_test.rs
use std::time::Duration;

use release_post::pipeline::Stage;
use release_post::publish::{DraftPost, Publisher, WpComPublisher};
use release_post::{ReleasePostError, Result};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// The blocking client must be built and dropped outside the async runtime.
async fn create_draft(api_base: String, timeout: Option<Duration>) -> Result<DraftPost> {
    tokio::task::spawn_blocking(move || {
        let publisher = WpComPublisher::new(api_base, timeout)?;
        publisher.create_draft("123", "tok", "Storefront 6.8.0 Released", "<p>Hello</p>")
    })
    .await
    .unwrap()
}

fn publish_failure(err: ReleasePostError) -> String {
    match err {
        ReleasePostError::CollaboratorFailure {
            stage: Stage::Publish,
            message,
        } => message,
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_create_draft() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/sites/123/posts/new"))
        .and(header("authorization", "Bearer tok"))
        .and(body_partial_json(json!({
            "title": "Storefront 6.8.0 Released",
            "content": "<p>Hello</p>",
            "status": "draft"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ID": 77,
            "URL": "https://storefront.example.com/?p=77",
            "status": "draft"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let draft = create_draft(server.uri(), None).await.unwrap();
    assert_eq!(draft.url, "https://storefront.example.com/?p=77");
}

#[tokio::test]
async fn test_unauthorized_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "unauthorized",
            "message": "User cannot publish posts"
        })))
        .mount(&server)
        .await;

    let message = publish_failure(create_draft(server.uri(), None).await.unwrap_err());
    assert_eq!(
        message,
        "authentication failed (401): User cannot publish posts"
    );
}

#[tokio::test]
async fn test_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let message = publish_failure(create_draft(server.uri(), None).await.unwrap_err());
    assert_eq!(message, "server error (500): Unknown error");
}

#[tokio::test]
async fn test_response_without_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ID": 77})))
        .mount(&server)
        .await;

    let message = publish_failure(create_draft(server.uri(), None).await.unwrap_err());
    assert!(message.starts_with("Failed to parse response"));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"URL": "https://late.example.com"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let message = publish_failure(
        create_draft(server.uri(), Some(Duration::from_millis(200)))
            .await
            .unwrap_err(),
    );
    assert!(message.starts_with("network error"));
}
