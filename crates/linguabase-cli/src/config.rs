//! Configuration management for the CLI
//!
//! Configuration is assembled in layers, later layers winning:
//! - Default values
//! - A configuration file (TOML, YAML or JSON, chosen by extension)
//! - Environment variables (a `.env` file is loaded first)
//! - Command-line arguments

use crate::error::{Error, Result};
use linguabase_core::{ProxyConfig, StoreConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where the documents live
    pub data: StoreConfig,

    /// HTTP front end settings
    pub server: ServerConfig,

    /// External speech and chat services
    pub services: ProxyConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3010,
            cors_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// File format of a configuration file, taken from its extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Toml,
    Yaml,
    Json,
}

impl FileFormat {
    fn of(path: &Path) -> Result<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            _ => Err(Error::InvalidFormat {
                path: path.to_path_buf(),
                expected: "a .toml, .yaml, .yml or .json file".to_string(),
            }),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config = match FileFormat::of(path)? {
            FileFormat::Toml => toml::from_str(&content)
                .map_err(|e| Error::config(format!("{}: {}", path.display(), e)))?,
            FileFormat::Yaml => serde_yaml::from_str(&content)?,
            FileFormat::Json => serde_json::from_str(&content)?,
        };

        debug!(path = %path.display(), "configuration file loaded");
        Ok(config)
    }

    /// Load configuration from the first default location that exists
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        warn!(path = %path.display(), "failed to load config: {}", e);
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations, then
    /// apply environment overrides
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let mut config = if let Some(path) = file {
            Self::from_file(path)?
        } else {
            Self::load()?
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Get default configuration file paths to check
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("linguabase.toml"),
            PathBuf::from("linguabase.yaml"),
            PathBuf::from("linguabase.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let dir = config_dir.join("linguabase");
            paths.push(dir.join("config.toml"));
            paths.push(dir.join("config.yaml"));
        }

        paths
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("LINGUABASE_DATA_DIR") {
            self.data.data_dir = PathBuf::from(dir);
        }
        if let Some(port) = lookup("BACKEND_PORT") {
            self.server.port = port.trim().parse().map_err(|_| {
                Error::config(format!("BACKEND_PORT is not a port number: '{}'", port))
            })?;
        }
        if let Some(origins) = lookup("LINGUABASE_CORS_ORIGINS") {
            self.server.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(url) = lookup("TTS_SERVICE_URL") {
            self.services.tts.url = url;
        }
        if let Some(url) = lookup("STT_SERVICE_URL") {
            self.services.stt.url = url;
        }
        if let Some(url) = lookup("OLLAMA_URL") {
            self.services.chat.url = url;
        }
        if let Some(model) = lookup("OLLAMA_MODEL") {
            self.services.default_model = model;
        }
        Ok(())
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match FileFormat::of(path)? {
            FileFormat::Toml => self.to_toml()?,
            FileFormat::Yaml => serde_yaml::to_string(self)?,
            FileFormat::Json => serde_json::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}
