//! AI configuration
//!
//! Resolution order, later wins:
//! 1. Embedded defaults (`config/catat.toml`, compiled into the binary)
//! 2. Override file (`~/.local/share/catat/config.toml`), replaces the embedded file
//! 3. Environment variables
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `AI_BACKEND` | `gemini`, `ollama`, `openai_compatible` or `mock` |
//! | `GEMINI_API_KEY` / `GEMINI_MODEL` | Gemini credentials and model |
//! | `OLLAMA_HOST` / `OLLAMA_MODEL` | Ollama server and model |
//! | `OPENAI_COMPATIBLE_HOST` / `_MODEL` / `_API_KEY` | OpenAI-compatible server |
//! | `CATAT_AI_TIMEOUT_SECS` | Classification timeout |

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/catat.toml");

pub const DEFAULT_TIMEOUT_SECS: u64 = 8;
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 10;

/// Which remote text-generation service to call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Gemini,
    Ollama,
    #[serde(rename = "openai_compatible")]
    OpenAICompatible,
    Mock,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
            Self::OpenAICompatible => "openai_compatible",
            Self::Mock => "mock",
        }
    }

    fn default_host(&self) -> Option<&'static str> {
        match self {
            Self::Gemini => Some("https://generativelanguage.googleapis.com"),
            Self::Mock => Some("mock://localhost"),
            Self::Ollama | Self::OpenAICompatible => None,
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.0-flash",
            Self::Ollama => "llama3.2",
            Self::OpenAICompatible => "gpt-4o-mini",
            Self::Mock => "mock",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                Ok(Self::OpenAICompatible)
            }
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown AI backend: {}", s)),
        }
    }
}

/// Resolved configuration for the remote classifier
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiConfig {
    pub backend: BackendKind,
    /// Base URL; `None` when the backend needs one and none was given
    pub host: Option<String>,
    pub model: String,
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    #[serde(with = "duration_secs")]
    pub timeout: Duration,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

mod duration_secs {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self::for_backend(BackendKind::Gemini)
    }
}

impl AiConfig {
    /// Backend defaults with no credentials
    pub fn for_backend(backend: BackendKind) -> Self {
        Self {
            backend,
            host: backend.default_host().map(str::to_string),
            model: backend.default_model().to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
        }
    }

    /// Load from the override file (or embedded defaults) and the process environment
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path().as_deref())
    }

    /// Load with an explicit override path (missing file falls back to defaults)
    pub fn load_from(override_path: Option<&Path>) -> Result<Self> {
        let content = match override_path {
            Some(path) if path.exists() => fs::read_to_string(path)
                .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?,
            _ => DEFAULT_CONFIG.to_string(),
        };
        parse_config(&content, |key| std::env::var(key).ok())
    }

    /// Parse TOML without looking at the environment
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content, |_| None)
    }

    /// Whether the backend has what it needs to make a call
    ///
    /// Gemini needs an API key; Ollama and OpenAI-compatible need a host.
    pub fn has_credentials(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        match self.backend {
            BackendKind::Gemini => present(&self.api_key),
            BackendKind::Ollama | BackendKind::OpenAICompatible => present(&self.host),
            BackendKind::Mock => true,
        }
    }
}

/// Override config location: `~/.local/share/catat/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("catat").join("config.toml"))
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    ai: Option<RawAi>,
    backends: Option<HashMap<String, RawBackend>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAi {
    backend: Option<String>,
    timeout_secs: Option<u64>,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct RawBackend {
    host: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
}

/// Environment variable names for one backend: (host, model, api key)
fn env_keys(backend: BackendKind) -> (Option<&'static str>, Option<&'static str>, Option<&'static str>) {
    match backend {
        BackendKind::Gemini => (None, Some("GEMINI_MODEL"), Some("GEMINI_API_KEY")),
        BackendKind::Ollama => (Some("OLLAMA_HOST"), Some("OLLAMA_MODEL"), None),
        BackendKind::OpenAICompatible => (
            Some("OPENAI_COMPATIBLE_HOST"),
            Some("OPENAI_COMPATIBLE_MODEL"),
            Some("OPENAI_COMPATIBLE_API_KEY"),
        ),
        BackendKind::Mock => (None, None, None),
    }
}

fn parse_config<F>(content: &str, env: F) -> Result<AiConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;
    let ai = raw.ai.unwrap_or_default();

    let backend_name = env("AI_BACKEND")
        .or(ai.backend)
        .unwrap_or_else(|| BackendKind::Gemini.as_str().to_string());
    // Mock is only built in code (tests); config files and env cannot select it
    let backend = match backend_name.parse() {
        Ok(BackendKind::Mock) => {
            warn!("The mock AI backend cannot be configured, falling back to gemini");
            BackendKind::Gemini
        }
        Ok(backend) => backend,
        Err(_) => {
            warn!(backend = %backend_name, "Unknown AI backend, falling back to gemini");
            BackendKind::Gemini
        }
    };

    let mut config = AiConfig::for_backend(backend);

    if let Some(secs) = ai.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }
    if let Some(temperature) = ai.temperature {
        config.temperature = temperature;
    }
    if let Some(tokens) = ai.max_output_tokens {
        config.max_output_tokens = tokens;
    }

    let table = raw
        .backends
        .and_then(|mut b| b.remove(backend.as_str()))
        .unwrap_or_default();
    if let Some(host) = table.host {
        config.host = Some(host);
    }
    if let Some(model) = table.model {
        config.model = model;
    }
    config.api_key = table.api_key;

    // Environment wins
    let non_empty = |key: &str| env(key).filter(|v| !v.trim().is_empty());
    let (host_key, model_key, key_key) = env_keys(backend);
    if let Some(host) = host_key.and_then(non_empty) {
        config.host = Some(host);
    }
    if let Some(model) = model_key.and_then(non_empty) {
        config.model = model;
    }
    if let Some(api_key) = key_key.and_then(non_empty) {
        config.api_key = Some(api_key);
    }
    if let Some(secs) = non_empty("CATAT_AI_TIMEOUT_SECS") {
        match secs.trim().parse::<u64>() {
            Ok(secs) => config.timeout = Duration::from_secs(secs),
            Err(_) => warn!(value = %secs, "Ignoring invalid CATAT_AI_TIMEOUT_SECS"),
        }
    }

    if let Some(host) = config.host.as_mut() {
        *host = host.trim_end_matches('/').to_string();
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_embedded_defaults() {
        let config = AiConfig::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.backend, BackendKind::Gemini);
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.timeout, Duration::from_secs(8));
        assert_eq!(config.max_output_tokens, 10);
        assert!((config.temperature - 0.1).abs() < f32::EPSILON);
        // No key in the shipped config
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_env_supplies_gemini_key() {
        let config = parse_config(DEFAULT_CONFIG, env_from(&[("GEMINI_API_KEY", "abc")])).unwrap();
        assert_eq!(config.api_key.as_deref(), Some("abc"));
        assert!(config.has_credentials());
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let config = parse_config(DEFAULT_CONFIG, env_from(&[("GEMINI_API_KEY", "  ")])).unwrap();
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_env_selects_backend() {
        let env = env_from(&[
            ("AI_BACKEND", "ollama"),
            ("OLLAMA_HOST", "http://localhost:11434/"),
            ("OLLAMA_MODEL", "qwen2.5"),
        ]);
        let config = parse_config(DEFAULT_CONFIG, env).unwrap();
        assert_eq!(config.backend, BackendKind::Ollama);
        assert_eq!(config.host.as_deref(), Some("http://localhost:11434"));
        assert_eq!(config.model, "qwen2.5");
        assert!(config.has_credentials());
    }

    #[test]
    fn test_ollama_without_host_is_not_configured() {
        let config = parse_config(DEFAULT_CONFIG, env_from(&[("AI_BACKEND", "ollama")])).unwrap();
        assert_eq!(config.model, "llama3.2");
        assert!(!config.has_credentials());
    }

    #[test]
    fn test_timeout_override() {
        let env = env_from(&[("CATAT_AI_TIMEOUT_SECS", "3")]);
        let config = parse_config(DEFAULT_CONFIG, env).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(3));

        let env = env_from(&[("CATAT_AI_TIMEOUT_SECS", "soon")]);
        let config = parse_config(DEFAULT_CONFIG, env).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(8));
    }

    #[test]
    fn test_unknown_backend_falls_back() {
        let config = AiConfig::from_toml("[ai]\nbackend = \"skynet\"\n").unwrap();
        assert_eq!(config.backend, BackendKind::Gemini);
    }

    #[test]
    fn test_partial_toml() {
        let config = AiConfig::from_toml(
            r#"
            [ai]
            backend = "openai_compatible"
            timeout_secs = 2

            [backends.openai_compatible]
            host = "http://127.0.0.1:8080"
            api_key = "sk-local"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend, BackendKind::OpenAICompatible);
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.api_key.as_deref(), Some("sk-local"));
        assert!(config.has_credentials());
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        assert_eq!(AiConfig::from_toml("").unwrap(), AiConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            AiConfig::from_toml("[ai"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_missing_override_file_uses_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        // Falls through to embedded defaults; env may add a key, the backend stays valid
        let config = AiConfig::load_from(Some(&path)).unwrap();
        assert!(config.timeout.as_secs() > 0);
    }

    #[test]
    fn test_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[ai]\nbackend = \"mock\"\n").unwrap();

        let config = parse_config(&fs::read_to_string(&path).unwrap(), |_| None).unwrap();
        assert_eq!(config.backend, BackendKind::Mock);
        assert!(config.has_credentials());
    }

    #[test]
    fn test_mock_backend_cannot_be_configured() {
        let config = parse_config(DEFAULT_CONFIG, env_from(&[("AI_BACKEND", "mock")])).unwrap();
        assert_eq!(config.backend, BackendKind::Gemini);
        assert!(!config.has_credentials());

        let config = AiConfig::from_toml("[ai]\nbackend = \"mock\"\n").unwrap();
        assert_eq!(config.backend, BackendKind::Gemini);
    }

    #[test]
    fn test_backend_kind_from_str() {
        assert_eq!("OpenAI".parse::<BackendKind>().unwrap(), BackendKind::OpenAICompatible);
        assert_eq!("gemini".parse::<BackendKind>().unwrap(), BackendKind::Gemini);
        assert!("nope".parse::<BackendKind>().is_err());
    }

    #[test]
    fn test_api_key_not_serialized() {
        let mut config = AiConfig::for_backend(BackendKind::Gemini);
        config.api_key = Some("secret".to_string());
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("\"timeout\":8"));
    }
}
