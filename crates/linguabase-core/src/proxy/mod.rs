//! Service proxy: forwards requests to the TTS, STT and chat services
//!
//! Each service gets its own HTTP client bounded by the service's timeout.
//! Successful payloads are returned exactly as the service sent them;
//! failures are classified by [`error`] into the crate taxonomy.

mod config;
mod error;
mod request;

pub use config::{ProxyConfig, Service, ServiceEndpoint};
pub use request::{
    AudioRequest, AudioUpload, ChatMessage, ChatRequest, ChatRole, SPEED_RANGE,
};

use crate::error::{Error, Result};
use reqwest::{multipart, Client, RequestBuilder};
use serde_json::{json, Value};
use std::time::Instant;
use tracing::{debug, warn};

const GENERATE_AUDIO_PATH: &str = "/api/generate-audio";
const TRANSCRIBE_PATH: &str = "/api/transcribe";
const CHAT_PATH: &str = "/api/chat";

/// Client for the three external services
#[derive(Debug, Clone)]
pub struct ServiceProxy {
    config: ProxyConfig,
    tts: Client,
    stt: Client,
    chat: Client,
}

impl ServiceProxy {
    /// Build one client per service with its configured timeout
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let tts = build_client(&config.tts)?;
        let stt = build_client(&config.stt)?;
        let chat = build_client(&config.chat)?;
        Ok(Self {
            config,
            tts,
            stt,
            chat,
        })
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Synthesise speech; returns the TTS service's JSON unchanged
    pub async fn generate_audio(&self, request: &AudioRequest) -> Result<Value> {
        let url = self.config.tts.join(GENERATE_AUDIO_PATH);
        let builder = self.tts.post(url).json(request);
        self.send(Service::Tts, builder).await
    }

    /// Transcribe recorded audio; returns the STT service's JSON unchanged
    pub async fn transcribe_audio(&self, upload: AudioUpload) -> Result<Value> {
        let AudioUpload {
            file_name,
            content_type,
            bytes,
        } = upload;
        let mut part = multipart::Part::bytes(bytes).file_name(file_name);
        if let Some(content_type) = content_type {
            part = part.mime_str(&content_type).map_err(|_| {
                Error::internal(format!("invalid audio content type '{}'", content_type))
            })?;
        }
        let form = multipart::Form::new().part("file", part);

        let url = self.config.stt.join(TRANSCRIBE_PATH);
        let builder = self.stt.post(url).multipart(form);
        self.send(Service::Stt, builder).await
    }

    /// Non-streaming chat completion; returns the chat service's JSON unchanged
    pub async fn chat(&self, request: &ChatRequest) -> Result<Value> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.default_model);
        let body = json!({
            "model": model,
            "messages": request.messages,
            "stream": false,
        });

        let url = self.config.chat.join(CHAT_PATH);
        let builder = self.chat.post(url).json(&body);
        self.send(Service::Chat, builder).await
    }

    async fn send(&self, service: Service, builder: RequestBuilder) -> Result<Value> {
        let started = Instant::now();
        let response = builder
            .send()
            .await
            .map_err(|e| error::from_request_error(service, e))
            .inspect_err(|e| warn!(%service, kind = %e.kind(), "upstream call failed"))?;

        let status = response.status();
        if !status.is_success() {
            let err = error::from_response(service, response).await;
            warn!(%service, status = status.as_u16(), "upstream returned an error status");
            return Err(err);
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| error::from_request_error(service, e))?;
        let payload = serde_json::from_slice(&body)
            .map_err(|e| error::unreadable_body(service, status.as_u16(), e))?;
        debug!(
            %service,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "upstream call succeeded"
        );
        Ok(payload)
    }
}

fn build_client(endpoint: &ServiceEndpoint) -> Result<Client> {
    Client::builder()
        .timeout(endpoint.timeout())
        .build()
        .map_err(|e| Error::internal(format!("failed to create HTTP client: {}", e)))
}
