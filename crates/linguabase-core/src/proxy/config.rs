//! Endpoints and timeouts of the external services

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The three external services behind the proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Service {
    /// Text-to-speech
    Tts,
    /// Speech-to-text
    Stt,
    /// Local LLM chat (Ollama API)
    Chat,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Service::Tts => "text-to-speech",
            Service::Stt => "speech-to-text",
            Service::Chat => "Ollama chat",
        };
        f.write_str(name)
    }
}

/// Base URL and request timeout of one service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    /// Base URL without a trailing path, e.g. `http://localhost:3015`
    pub url: String,
    /// Bound on the whole request, in seconds
    pub timeout_secs: u64,
}

impl ServiceEndpoint {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            url: url.into(),
            timeout_secs,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Join `path` onto the base URL
    pub fn join(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Configuration of all proxied services
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Model used when a chat request names none
    pub default_model: String,
    pub tts: ServiceEndpoint,
    pub stt: ServiceEndpoint,
    pub chat: ServiceEndpoint,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            default_model: "gemma3:1b".to_string(),
            tts: ServiceEndpoint::new("http://localhost:3015", 30),
            stt: ServiceEndpoint::new("http://localhost:3015", 120),
            chat: ServiceEndpoint::new("http://localhost:11434", 60),
        }
    }
}

impl ProxyConfig {
    pub fn endpoint(&self, service: Service) -> &ServiceEndpoint {
        match service {
            Service::Tts => &self.tts,
            Service::Stt => &self.stt,
            Service::Chat => &self.chat,
        }
    }
}
