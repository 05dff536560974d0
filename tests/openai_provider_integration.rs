mod common;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use modechat::error::ChatError;
use modechat::providers::{CompletionOptions, Message, OpenAiProvider, Provider};

use common::{completion_body, openai_config};

#[tokio::test]
async fn test_openai_completion_sends_sampling_options() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 600,
            "messages": [
                { "role": "system", "content": "Be brief." },
                { "role": "user", "content": "Hi" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("  Hello!  ")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new(openai_config(&server.uri())).unwrap();
    let response = provider
        .complete(
            &[Message::system("Be brief."), Message::user("Hi")],
            &CompletionOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(response.message.content, "Hello!");
    let usage = response.usage.unwrap();
    assert_eq!(usage.prompt_tokens, 42);
    assert_eq!(usage.completion_tokens, 7);
}

#[tokio::test]
async fn test_openai_base_with_trailing_slash() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new(openai_config(&format!("{}/v1/", server.uri()))).unwrap();
    let response = provider
        .complete(&[Message::user("ping")], &CompletionOptions::default())
        .await
        .unwrap();
    assert_eq!(response.message.content, "ok");
}

#[tokio::test]
async fn test_openai_unauthorized_maps_to_missing_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided" }
        })))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new(openai_config(&server.uri())).unwrap();
    let err = provider
        .complete(&[Message::user("Hi")], &CompletionOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ChatError>(),
        Some(ChatError::MissingCredentials(_))
    ));
}

#[tokio::test]
async fn test_openai_server_error_is_provider_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new(openai_config(&server.uri())).unwrap();
    let err = provider
        .complete(&[Message::user("Hi")], &CompletionOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ChatError>(),
        Some(ChatError::Provider(_))
    ));
}

#[tokio::test]
async fn test_openai_empty_choices_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let provider = OpenAiProvider::new(openai_config(&server.uri())).unwrap();
    let result = provider
        .complete(&[Message::user("Hi")], &CompletionOptions::default())
        .await;
    assert!(result.is_err());
}
