// Integration tests for the backend API client
//
// These run against a local mock server and verify the wire contract:
// history fetch ordering, multipart clip upload, structured error
// payload handling, and history deletion.

use voicechat::config::ServerConfig;
use voicechat::{AudioClip, AudioFrame, ChatApi, ChatError, HttpApi, Role};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn server_config(server: &MockServer) -> ServerConfig {
    ServerConfig {
        base_url: server.uri(),
        request_timeout_secs: 5,
    }
}

fn test_clip() -> AudioClip {
    let frames = vec![AudioFrame {
        samples: vec![250; 1600],
        sample_rate: 16000,
        channels: 1,
        timestamp_ms: 0,
    }];
    AudioClip::assemble(frames, 16000, 1).expect("non-empty clip")
}

// Timestamps deliberately carry no UTC offset: that is how the backend
// serializes its wall-clock times.
fn reply_json() -> serde_json::Value {
    serde_json::json!({
        "user_message": {
            "role": "user",
            "content": "What's the weather like?",
            "timestamp": "2025-06-01T12:30:00.123456"
        },
        "assistant_message": {
            "role": "assistant",
            "content": "I don't have live weather data.",
            "timestamp": "2025-06-01T12:30:02.654321"
        }
    })
}

#[tokio::test]
async fn fetch_messages_returns_history_oldest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"role": "user", "content": "first", "timestamp": "2025-06-01T12:00:00Z"},
            {"role": "assistant", "content": "second", "timestamp": "2025-06-01T12:00:01Z"},
            {"role": "user", "content": "third", "timestamp": "2025-06-01T12:00:02Z"}
        ])))
        .mount(&server)
        .await;

    let api = HttpApi::new(&server_config(&server)).unwrap();
    let messages = api.fetch_messages().await.unwrap();

    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].content, "first");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[2].content, "third");
}

#[tokio::test]
async fn fetch_messages_accepts_offset_free_timestamps() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"role": "user", "content": "hi", "timestamp": "2025-06-01T12:30:00.123456"},
            {"role": "assistant", "content": "hello", "timestamp": "2025-06-01T12:30:02"}
        ])))
        .mount(&server)
        .await;

    let api = HttpApi::new(&server_config(&server)).unwrap();
    let messages = api.fetch_messages().await.unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages[0].timestamp.to_rfc3339(),
        "2025-06-01T12:30:00.123456+00:00"
    );
}

#[tokio::test]
async fn voice_upload_posts_multipart_and_parses_both_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/voice-message"))
        .and(body_string_contains("name=\"audio\""))
        .and(body_string_contains("recording.wav"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_json()))
        .expect(1)
        .mount(&server)
        .await;

    let api = HttpApi::new(&server_config(&server)).unwrap();
    let reply = api.send_voice_clip(test_clip()).await.unwrap();

    assert_eq!(reply.user_message.role, Role::User);
    assert_eq!(reply.assistant_message.role, Role::Assistant);
    assert_eq!(
        reply.assistant_message.content,
        "I don't have live weather data."
    );
}

#[tokio::test]
async fn upload_failure_surfaces_the_backend_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/voice-message"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"detail": "No speech detected in audio"})),
        )
        .mount(&server)
        .await;

    let api = HttpApi::new(&server_config(&server)).unwrap();
    let err = api.send_voice_clip(test_clip()).await.unwrap_err();

    match err {
        ChatError::Backend(detail) => assert_eq!(detail, "No speech detected in audio"),
        other => panic!("expected backend error, got: {other}"),
    }
}

#[tokio::test]
async fn unstructured_failure_falls_back_to_a_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/voice-message"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let api = HttpApi::new(&server_config(&server)).unwrap();
    let err = api.send_voice_clip(test_clip()).await.unwrap_err();

    match err {
        ChatError::Backend(detail) => assert_eq!(detail, "Failed to process voice message"),
        other => panic!("expected backend error, got: {other}"),
    }
}

#[tokio::test]
async fn text_message_uses_the_same_reply_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/text-message"))
        .and(body_string_contains("What's the weather like?"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_json()))
        .mount(&server)
        .await;

    let api = HttpApi::new(&server_config(&server)).unwrap();
    let reply = api.send_text("What's the weather like?").await.unwrap();
    assert_eq!(reply.user_message.content, "What's the weather like?");
}

#[tokio::test]
async fn clear_messages_maps_status_to_result() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Chat history cleared"
        })))
        .mount(&server)
        .await;

    let api = HttpApi::new(&server_config(&server)).unwrap();
    assert!(api.clear_messages().await.is_ok());
}

#[tokio::test]
async fn clear_failure_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/messages"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "detail": "storage unavailable"
        })))
        .mount(&server)
        .await;

    let api = HttpApi::new(&server_config(&server)).unwrap();
    let err = api.clear_messages().await.unwrap_err();
    assert!(matches!(err, ChatError::Backend(_)));
}

#[tokio::test]
async fn health_probe_checks_the_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "healthy"
        })))
        .mount(&server)
        .await;

    let api = HttpApi::new(&server_config(&server)).unwrap();
    assert!(api.health().await.is_ok());
}
