//! Proxy HTTP Routes
//!
//! Forward speech synthesis, transcription and chat requests to the
//! configured services. Successful payloads are returned as received.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use linguabase_core::{AudioRequest, AudioUpload, ChatRequest};
use linguabase_schemas::Rule;
use serde_json::Value;
use tracing::{debug, instrument};

use super::document_routes::parse_json;
use super::error::{ApiError, ApiResult};
use super::AppState;

/// Largest accepted audio upload
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Routes mounted under `/api`
pub fn proxy_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/generate-audio", post(generate_audio))
        .route(
            "/transcribe-audio",
            post(transcribe_audio).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/chat", post(chat))
        .with_state(state)
}

#[instrument(skip_all)]
async fn generate_audio(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Json<Value>> {
    let request = AudioRequest::from_json(&parse_json(&body)?)?;
    debug!(chars = request.text.chars().count(), speed = request.speed, "synthesising audio");
    Ok(Json(state.proxy.generate_audio(&request).await?))
}

#[instrument(skip_all)]
async fn transcribe_audio(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Value>> {
    let mut multipart = multipart.map_err(|e| {
        ApiError::invalid_request(
            format!("expected a multipart form: {}", e.body_text()),
            Rule::Type,
            "multipart/form-data",
            "other content",
        )
    })?;

    let upload = read_file_part(&mut multipart).await?.ok_or_else(|| {
        ApiError::invalid_request(
            "audio file is required in the 'file' part".to_string(),
            Rule::Required,
            "a 'file' part",
            "missing",
        )
    })?;
    debug!(file = %upload.file_name, bytes = upload.bytes.len(), "transcribing audio");
    Ok(Json(state.proxy.transcribe_audio(upload).await?))
}

/// The `file` part of the form, if any
async fn read_file_part(multipart: &mut Multipart) -> ApiResult<Option<AudioUpload>> {
    loop {
        let field = multipart.next_field().await.map_err(|e| {
            ApiError::invalid_request(
                format!("unreadable multipart form: {}", e.body_text()),
                Rule::Type,
                "multipart/form-data",
                "broken form",
            )
        })?;
        let Some(field) = field else {
            return Ok(None);
        };
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("audio").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            ApiError::invalid_request(
                format!("unreadable audio file: {}", e.body_text()),
                Rule::Type,
                "audio bytes",
                "broken part",
            )
        })?;

        let mut upload = AudioUpload::new(file_name, bytes.to_vec());
        if let Some(content_type) = content_type {
            upload = upload.with_content_type(content_type);
        }
        return Ok(Some(upload));
    }
}

#[instrument(skip_all)]
async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> ApiResult<Json<Value>> {
    let request = ChatRequest::from_json(&parse_json(&body)?)?;
    debug!(messages = request.messages.len(), model = ?request.model, "forwarding chat");
    Ok(Json(state.proxy.chat(&request).await?))
}
