//! Integration tests for the service proxy against local stub services


use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use linguabase_core::{
    AudioRequest, AudioUpload, ChatMessage, ChatRequest, ChatRole, Error, ErrorKind, Service,
    ServiceProxy,
};
use serde_json::{json, Value};
use std::time::Duration;
use test_support::{closed_port_url, proxy_config, spawn_stub};

async fn echo_audio(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "audio": "UklGRiQAAABXQVZF",
        "mimeType": "audio/wav",
        "metadata": {"speed": body["speed"], "text": body["text"], "voice": body["voice"]}
    }))
}

async fn echo_transcription(mut multipart: Multipart) -> Json<Value> {
    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let size = field.bytes().await.map(|b| b.len()).unwrap_or_default();
        fields.push(json!({
            "name": name,
            "file_name": file_name,
            "content_type": content_type,
            "size": size
        }));
    }
    Json(json!({"text": "Guten Morgen", "language": "de", "fields": fields}))
}

async fn echo_chat(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "model": body["model"],
        "stream": body["stream"],
        "message": {"role": "assistant", "content": "Hallo!"},
        "echo": body["messages"],
        "done": true
    }))
}

fn echo_app() -> Router {
    Router::new()
        .route("/api/generate-audio", post(echo_audio))
        .route("/api/transcribe", post(echo_transcription))
        .route("/api/chat", post(echo_chat))
}

fn status_app(status: StatusCode, body: &'static str) -> Router {
    let handler = move || async move { (status, body) };
    Router::new()
        .route("/api/generate-audio", post(handler.clone()))
        .route("/api/transcribe", post(handler.clone()))
        .route("/api/chat", post(handler))
}

fn chat_request() -> ChatRequest {
    ChatRequest::new(vec![
        ChatMessage::new(ChatRole::System, "Antworte auf Deutsch."),
        ChatMessage::new(ChatRole::User, "Wie geht's?"),
    ])
}

#[tokio::test]
async fn test_generate_audio_passes_payload_through() {
    let url = spawn_stub(echo_app()).await;
    let proxy = ServiceProxy::new(proxy_config(&url, 5)).unwrap();

    let mut request = AudioRequest::new("Guten Tag");
    request.voice = Some("Kore".to_string());
    request.speed = 0.75;
    let response = proxy.generate_audio(&request).await.unwrap();

    assert_eq!(response["mimeType"], "audio/wav");
    assert_eq!(response["metadata"]["speed"], 0.75);
    assert_eq!(response["metadata"]["voice"], "Kore");
    assert_eq!(response["metadata"]["text"], "Guten Tag");
}

#[tokio::test]
async fn test_transcribe_sends_file_part() {
    let url = spawn_stub(echo_app()).await;
    let proxy = ServiceProxy::new(proxy_config(&url, 5)).unwrap();

    let upload = AudioUpload::new("recording.webm", vec![0u8; 64]).with_content_type("audio/webm");
    let response = proxy.transcribe_audio(upload).await.unwrap();

    assert_eq!(response["text"], "Guten Morgen");
    assert_eq!(
        response["fields"],
        json!([{
            "name": "file",
            "file_name": "recording.webm",
            "content_type": "audio/webm",
            "size": 64
        }])
    );
}

#[tokio::test]
async fn test_chat_uses_default_model_without_streaming() {
    let url = spawn_stub(echo_app()).await;
    let proxy = ServiceProxy::new(proxy_config(&url, 5)).unwrap();

    let response = proxy.chat(&chat_request()).await.unwrap();
    assert_eq!(response["model"], "gemma3:1b");
    assert_eq!(response["stream"], false);
    assert_eq!(response["echo"][1], json!({"role": "user", "content": "Wie geht's?"}));

    let mut request = chat_request();
    request.model = Some("llama3.2".to_string());
    let response = proxy.chat(&request).await.unwrap();
    assert_eq!(response["model"], "llama3.2");
}

#[tokio::test]
async fn test_connect_failure_is_service_unavailable() {
    let url = closed_port_url().await;
    let proxy = ServiceProxy::new(proxy_config(&url, 5)).unwrap();

    let err = proxy.chat(&chat_request()).await.unwrap_err();
    assert!(matches!(err, Error::ServiceUnavailable { service: Service::Chat, .. }));
    assert!(err.detail().to_lowercase().contains("ollama"));

    let err = proxy.generate_audio(&AudioRequest::new("Test")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let slow = Router::new().route(
        "/api/generate-audio",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({"audio": ""}))
        }),
    );
    let url = spawn_stub(slow).await;
    let proxy = ServiceProxy::new(proxy_config(&url, 1)).unwrap();

    let err = proxy.generate_audio(&AudioRequest::new("Test")).await.unwrap_err();
    assert!(matches!(err, Error::Timeout { service: Service::Tts }));
    assert!(err.detail().contains("timeout"));
}

#[tokio::test]
async fn test_error_status_is_upstream_error_with_body() {
    let url = spawn_stub(status_app(StatusCode::NOT_FOUND, "model 'nope' not found")).await;
    let proxy = ServiceProxy::new(proxy_config(&url, 5)).unwrap();

    let err = proxy.chat(&chat_request()).await.unwrap_err();
    match err {
        Error::UpstreamError { service, status, body } => {
            assert_eq!(service, Service::Chat);
            assert_eq!(status, 404);
            assert_eq!(body, "model 'nope' not found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_service_unavailable_status_keeps_status() {
    let url = spawn_stub(status_app(StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable")).await;
    let proxy = ServiceProxy::new(proxy_config(&url, 5)).unwrap();

    let err = proxy
        .transcribe_audio(AudioUpload::new("a.wav", vec![1, 2, 3]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UpstreamError { status: 503, service: Service::Stt, .. }));
}

#[tokio::test]
async fn test_non_json_success_body() {
    let plain = Router::new().route("/api/chat", post(|| async { "definitely not json" }));
    let url = spawn_stub(plain).await;
    let proxy = ServiceProxy::new(proxy_config(&url, 5)).unwrap();

    let err = proxy.chat(&chat_request()).await.unwrap_err();
    assert!(matches!(err, Error::UpstreamError { status: 200, .. }));
}
