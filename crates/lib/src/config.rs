//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.komorebi/config.json`) and environment.
//! Every field is optional; a missing file yields the defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Model candidates tried in order when `completion.models` is absent or empty.
pub const DEFAULT_MODELS: &[&str] = &["llama3-70b-8192", "llama3-8b-8192", "mixtral-8x7b-32768"];

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Completion provider (model candidates, sampling, credentials).
    #[serde(default)]
    pub completion: CompletionConfig,

    /// Image generation provider.
    #[serde(default)]
    pub image: ImageConfig,

    /// Conversation defaults (history window sent as context).
    #[serde(default)]
    pub conversation: ConversationConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 15160).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    15160
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// Completion provider settings. The provider speaks the OpenAI-compatible chat completions API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionConfig {
    /// API root, without the trailing `/chat/completions`.
    #[serde(default = "default_completion_base_url")]
    pub base_url: String,

    /// Model candidate list, tried in order for every completion request.
    #[serde(default)]
    pub models: Vec<String>,

    /// Replaces the built-in persona instructions for this deployment. A per-request override still wins.
    #[serde(default)]
    pub persona: Option<String>,

    /// Provider credential. Overridden by GROQ_API_KEY env.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Per-call timeout. Absent means the call may block indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_completion_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            base_url: default_completion_base_url(),
            models: Vec::new(),
            persona: None,
            api_key: None,
            timeout_secs: None,
        }
    }
}

/// Image provider settings (OpenAI-compatible images API).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    /// API root, without the trailing `/images/generations`.
    #[serde(default = "default_image_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub model: Option<String>,

    /// e.g. "512x512".
    #[serde(default)]
    pub size: Option<String>,

    /// Provider credential. Overridden by KOMOREBI_IMAGE_API_KEY env.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_image_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: default_image_base_url(),
            model: None,
            size: None,
            api_key: None,
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationConfig {
    /// Number of most recent messages sent as context (default 5).
    #[serde(default = "default_window")]
    pub window: usize,
}

fn default_window() -> usize {
    5
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            window: default_window(),
        }
    }
}

impl CompletionConfig {
    /// Configured model candidates, or the built-in list when none are set.
    pub fn candidates(&self) -> Vec<String> {
        let models: Vec<String> = self
            .models
            .iter()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .collect();
        if models.is_empty() {
            DEFAULT_MODELS.iter().map(|m| m.to_string()).collect()
        } else {
            models
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl ImageConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolve the completion provider key: env GROQ_API_KEY overrides config.
pub fn resolve_completion_api_key(config: &Config) -> Option<String> {
    non_empty_env("GROQ_API_KEY").or_else(|| non_empty(config.completion.api_key.as_ref()))
}

/// Resolve the image provider key: env KOMOREBI_IMAGE_API_KEY overrides config.
pub fn resolve_image_api_key(config: &Config) -> Option<String> {
    non_empty_env("KOMOREBI_IMAGE_API_KEY").or_else(|| non_empty(config.image.api_key.as_ref()))
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("KOMOREBI_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".komorebi").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, or the default path (KOMOREBI_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_gateway_port_and_bind() {
        let g = GatewayConfig::default();
        assert_eq!(g.port, 15160);
        assert_eq!(g.bind, "127.0.0.1");
    }

    #[test]
    fn empty_object_parses_to_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.conversation.window, 5);
        assert_eq!(config.completion.base_url, "https://api.groq.com/openai/v1");
        assert!(config.completion.timeout().is_none());
    }

    #[test]
    fn temperature_is_not_configurable() {
        let config: Config = serde_json::from_str(r#"{"completion":{"temperature":0.2}}"#).unwrap();
        let json = serde_json::to_value(&config.completion).unwrap();
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn candidates_fall_back_to_builtin_list() {
        let mut completion = CompletionConfig::default();
        assert_eq!(completion.candidates(), DEFAULT_MODELS.to_vec());

        completion.models = vec!["  ".to_string()];
        assert_eq!(completion.candidates(), DEFAULT_MODELS.to_vec());
    }

    #[test]
    fn configured_candidates_keep_order() {
        let config: Config =
            serde_json::from_str(r#"{"completion":{"models":["b-model"," a-model "]}}"#).unwrap();
        assert_eq!(config.completion.candidates(), vec!["b-model", "a-model"]);
    }

    #[test]
    fn camel_case_keys() {
        let config: Config = serde_json::from_str(
            r#"{"completion":{"baseUrl":"http://127.0.0.1:9/v1","timeoutSecs":3},"image":{"apiKey":"k"}}"#,
        )
        .unwrap();
        assert_eq!(config.completion.base_url, "http://127.0.0.1:9/v1");
        assert_eq!(config.completion.timeout(), Some(Duration::from_secs(3)));
        assert_eq!(config.image.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn load_config_missing_file_uses_defaults() {
        let path = std::env::temp_dir()
            .join(format!("komorebi-config-{}", uuid::Uuid::new_v4()))
            .join("config.json");
        let (config, used) = load_config(Some(path.clone())).unwrap();
        assert_eq!(used, path);
        assert_eq!(config.gateway.port, 15160);
    }
}
