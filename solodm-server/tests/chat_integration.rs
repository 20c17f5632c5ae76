//! DM chat tests against a mocked OpenAI upstream.
//!
//! These exercise the full router with a wiremock server standing in for
//! api.openai.com: upstream success, the illustration trigger gate, and the
//! never-surface-upstream-failures fallback contract.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use solodm_core::{DmNarrator, GameStore, OpenAiClient, OpenAiConfig, MOCK_NARRATIONS};
use solodm_server::http::{build_router, HttpState};

fn make_app(upstream_url: String) -> Router {
    let config = OpenAiConfig {
        api_key: Some("test-key".to_string()),
        ..OpenAiConfig::default()
    };
    let client = OpenAiClient::with_base_url(config, upstream_url).expect("client builds");
    let state = Arc::new(HttpState {
        store: Arc::new(GameStore::new()),
        narrator: DmNarrator::new(Some(client)),
    });
    build_router(state)
}

async fn post_chat(app: &Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/dm/chat")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn chat_completion(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ]
    })
}

// ===========================================================================
// TEST 1: upstream narration flows through to the response and the session
// ===========================================================================
#[tokio::test]
async fn test_upstream_narration_success() {
    let mock_server = MockServer::start().await;
    let app = make_app(mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_completion("The goblin snarls and lunges at you.")),
        )
        .mount(&mock_server)
        .await;

    let (status, body) = post_chat(&app, json!({ "message": "I attack the goblin" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["dmResponse"]["message"],
        "The goblin snarls and lunges at you."
    );
    assert!(body["dmResponse"]["imageUrl"].is_null());
    let messages = body["session"]["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1]["content"], "The goblin snarls and lunges at you.");
}

// ===========================================================================
// TEST 2: trigger word + configured key — illustration attempted and attached
// ===========================================================================
#[tokio::test]
async fn test_trigger_word_attaches_illustration() {
    let mock_server = MockServer::start().await;
    let app = make_app(mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_completion("Dust swirls in the ruins.")),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "created": 1700000000,
            "data": [{ "url": "https://images.example/ruins.png" }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = post_chat(&app, json!({ "message": "I explore the ruins" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dmResponse"]["imageUrl"], "https://images.example/ruins.png");
    let messages = body["session"]["messages"].as_array().unwrap();
    assert_eq!(messages[1]["imageUrl"], "https://images.example/ruins.png");
}

// ===========================================================================
// TEST 3: no trigger word — the image endpoint is never called
// ===========================================================================
#[tokio::test]
async fn test_no_trigger_word_skips_illustration() {
    let mock_server = MockServer::start().await;
    let app = make_app(mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_completion("You swing true.")))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (status, body) = post_chat(&app, json!({ "message": "I attack the goblin" })).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["dmResponse"]["imageUrl"].is_null());
}

// ===========================================================================
// TEST 4: upstream text failure — 200, scripted narration, no image attempt
// ===========================================================================
#[tokio::test]
async fn test_upstream_failure_falls_back_to_scripted_narration() {
    let mock_server = MockServer::start().await;
    let app = make_app(mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "message": "The server had an error" }
        })))
        .mount(&mock_server)
        .await;

    // Even with a trigger word, the fallback path never tries an image.
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (status, body) = post_chat(&app, json!({ "message": "I enter the cave" })).await;

    assert_eq!(status, StatusCode::OK);
    let narrative = body["dmResponse"]["message"].as_str().unwrap();
    assert!(!narrative.is_empty());
    assert!(MOCK_NARRATIONS.contains(&narrative));
    assert!(body["dmResponse"]["imageUrl"].is_null());
    assert_eq!(body["session"]["messages"].as_array().unwrap().len(), 2);
}

// ===========================================================================
// TEST 5: image failure is absorbed — narration still lands with no image
// ===========================================================================
#[tokio::test]
async fn test_image_failure_does_not_fail_the_request() {
    let mock_server = MockServer::start().await;
    let app = make_app(mock_server.uri());

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_completion("The cave mouth yawns wide.")),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": { "message": "image backend down" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (status, body) = post_chat(&app, json!({ "message": "I enter the cave" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dmResponse"]["message"], "The cave mouth yawns wide.");
    assert!(body["dmResponse"]["imageUrl"].is_null());
    assert!(body["session"]["messages"].as_array().unwrap()[1]["imageUrl"].is_null());
}

// ===========================================================================
// TEST 6: health reports openaiConfigured when a key is present
// ===========================================================================
#[tokio::test]
async fn test_health_reports_upstream_configured() {
    let mock_server = MockServer::start().await;
    let app = make_app(mock_server.uri());

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["openaiConfigured"], true);
}
