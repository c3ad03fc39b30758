//! Request payloads accepted by the proxy
//!
//! Payloads arrive as raw JSON and are read with the same field readers
//! as the stored documents, so a bad request reports its violations by
//! path (`$.speed`, `$.messages[1].role`) like any schema error.

use crate::error::{Error, Result};
use linguabase_schemas::validation::{
    fields::{expect_list, expect_string},
    json_type_name, ObjectReader, Strictness, ValidationContext,
};
use linguabase_schemas::{Rule, ValidationErrors};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Slowest and fastest speech rate the TTS service accepts
pub const SPEED_RANGE: std::ops::RangeInclusive<f64> = 0.5..=2.0;

/// Text to synthesise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioRequest {
    /// May be empty; the TTS service decides what to do with it
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    pub speed: f64,
}

impl AudioRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: None,
            speed: 1.0,
        }
    }

    /// Read and check a request body
    pub fn from_json(value: &Value) -> Result<Self> {
        let mut errors = ValidationErrors::new();
        let request = ObjectReader::new(value, &ValidationContext::root(), &mut errors)
            .and_then(|mut reader| {
                let text = reader.string("text");
                let voice = reader.optional_string("voice");
                let speed = match reader.optional("speed") {
                    None => Some(1.0),
                    Some(speed) => read_speed(&mut reader, speed),
                };
                reader.finish(Strictness::Open);
                Some(Self {
                    text: text?,
                    voice,
                    speed: speed?,
                })
            });
        match request {
            Some(request) => errors.into_result(request).map_err(Error::invalid_request),
            None => Err(Error::invalid_request(errors)),
        }
    }
}

fn read_speed(reader: &mut ObjectReader<'_, '_>, value: &Value) -> Option<f64> {
    match value.as_f64() {
        Some(speed) if SPEED_RANGE.contains(&speed) => Some(speed),
        Some(speed) => {
            reader.reject(
                "speed",
                format!("speed {} is outside 0.5 to 2.0", speed),
                Rule::Cardinality,
                "a number between 0.5 and 2.0",
                speed.to_string(),
            );
            None
        }
        None => {
            reader.reject(
                "speed",
                format!("expected a number, found {}", json_type_name(value)),
                Rule::Type,
                "number",
                json_type_name(value),
            );
            None
        }
    }
}

/// Recorded audio to transcribe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl AudioUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

linguabase_schemas::schema_enum! {
    /// Author of a chat message
    pub enum ChatRole {
        System => "system",
        User => "user",
        Assistant => "assistant",
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// A non-streaming chat completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Falls back to the configured default model when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            model: None,
            messages,
        }
    }

    /// Read and check a request body
    pub fn from_json(value: &Value) -> Result<Self> {
        let mut errors = ValidationErrors::new();
        let request = ObjectReader::new(value, &ValidationContext::root(), &mut errors)
            .and_then(|mut reader| {
                let model = reader.optional_string("model");
                let messages = reader.with("messages", |value, ctx, errors| {
                    expect_list(value, ctx, errors, 1, None, read_message)
                });
                reader.finish(Strictness::Open);
                Some(Self {
                    model,
                    messages: messages?,
                })
            });
        match request {
            Some(request) => errors.into_result(request).map_err(Error::invalid_request),
            None => Err(Error::invalid_request(errors)),
        }
    }
}

fn read_message(
    value: &Value,
    ctx: &ValidationContext,
    errors: &mut ValidationErrors,
) -> Option<ChatMessage> {
    let mut reader = ObjectReader::new(value, ctx, errors)?;
    let role = reader.enumeration::<ChatRole>("role");
    let content = reader.with("content", expect_string);
    reader.finish(Strictness::Open);
    Some(ChatMessage {
        role: role?,
        content: content?,
    })
}
