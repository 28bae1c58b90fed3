mod harness;

use harness::config::ConfigBuilder;
use harness::mock_upstream::MockUpstream;
use harness::server::TestServer;
use serde_json::json;
use thumbforge_config::GoogleApiMode;

async fn configured() -> (MockUpstream, TestServer) {
    let mock = MockUpstream::start().await.unwrap();
    let config = ConfigBuilder::new()
        .with_google(&mock.google_url(), GoogleApiMode::Imagen)
        .with_openrouter(&mock.openrouter_base_url())
        .build();
    let server = TestServer::start(config).await.unwrap();
    (mock, server)
}

#[tokio::test]
async fn missing_prompt_is_rejected_without_upstream_calls() {
    let (mock, server) = configured().await;

    for body in [json!({}), json!({"prompt": ""}), json!({"prompt": "   ", "provider": "openrouter"})] {
        let (status, json) = server.generate(&body).await;
        assert_eq!(status, 400);
        assert_eq!(json, json!({"error": "Prompt is required."}));
    }

    assert_eq!(mock.total_count(), 0);
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let (mock, server) = configured().await;

    let resp = server
        .client()
        .post(server.url("/api/thumbnail"))
        .header("content-type", "application/json")
        .body("{\"prompt\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), 400);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().starts_with("Invalid request body"));
    assert_eq!(mock.total_count(), 0);
}

#[tokio::test]
async fn empty_body_asks_for_a_prompt() {
    let (_mock, server) = configured().await;

    let resp = server.client().post(server.url("/api/thumbnail")).send().await.unwrap();

    assert_eq!(resp.status(), 400);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["error"], "Prompt is required.");
}

#[tokio::test]
async fn unknown_provider_is_a_configuration_error() {
    let (mock, server) = configured().await;

    let (status, json) = server.generate(&json!({"prompt": "a cat", "provider": "dalle"})).await;

    assert_eq!(status, 400);
    assert!(json["error"].as_str().unwrap().contains("dalle"));
    assert_eq!(mock.total_count(), 0);
}

#[tokio::test]
async fn unsupported_image_size_is_rejected() {
    let (mock, server) = configured().await;

    let (status, _) = server.generate(&json!({"prompt": "a cat", "imageSize": "8K"})).await;

    assert_eq!(status, 400);
    assert_eq!(mock.total_count(), 0);
}
