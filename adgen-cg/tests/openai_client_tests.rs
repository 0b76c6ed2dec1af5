//! Integration tests for the OpenAI-compatible client against a mock server

use adgen_cg::llm::{CompletionClient, CompletionRequest, LlmError, OpenAiClient};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{bearer_token, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request() -> CompletionRequest {
    CompletionRequest {
        system: "You are a test.".to_string(),
        prompt: "Say hello".to_string(),
        temperature: 0.8,
        max_tokens: 800,
    }
}

fn client(server: &MockServer) -> OpenAiClient {
    OpenAiClient::new(
        &format!("{}/v1/", server.uri()),
        "sk-test".to_string(),
        "test-model".to_string(),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "choices": [{
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn test_successful_completion_sends_expected_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(bearer_token("sk-test"))
        .and(body_partial_json(json!({
            "model": "test-model",
            "max_tokens": 800,
            "messages": [
                {"role": "system", "content": "You are a test."},
                {"role": "user", "content": "Say hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("{\"title\":\"Hi\"}")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    assert_eq!(client.endpoint(), format!("{}/v1/chat/completions", server.uri()));

    let text = client.complete(&request()).await.unwrap();
    assert_eq!(text, "{\"title\":\"Hi\"}");
}

#[tokio::test]
async fn test_blank_completion_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("   ")))
        .mount(&server)
        .await;

    let err = client(&server).complete(&request()).await.unwrap_err();
    assert!(matches!(err, LlmError::EmptyCompletion));
}

#[tokio::test]
async fn test_no_choices_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
        .mount(&server)
        .await;

    let err = client(&server).complete(&request()).await.unwrap_err();
    assert!(matches!(err, LlmError::EmptyCompletion));
}

#[tokio::test]
async fn test_server_error_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = client(&server).complete(&request()).await.unwrap_err();
    match err {
        LlmError::ApiError(status, body) => {
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_unauthorized_maps_to_invalid_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server).complete(&request()).await.unwrap_err();
    assert!(matches!(err, LlmError::InvalidApiKey));
}

#[tokio::test]
async fn test_undecodable_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let err = client(&server).complete(&request()).await.unwrap_err();
    assert!(matches!(err, LlmError::ParseError(_)));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion("late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = OpenAiClient::new(
        &server.uri(),
        "sk-test".to_string(),
        "test-model".to_string(),
        Duration::from_millis(200),
    )
    .unwrap();

    let err = client.complete(&request()).await.unwrap_err();
    assert!(matches!(err, LlmError::Timeout(_)));
}
