//! Configuration for the learning server.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

/// Main configuration structure for the learning server.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub readability: ReadabilityConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// How model capabilities are brought up at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Never load; capabilities stay `not_started`.
    #[default]
    Disabled,
    /// Load in a detached task while the server is already serving.
    Background,
    /// Load before the listener is bound.
    Preload,
}

impl LoadMode {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, LoadMode::Disabled)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    #[serde(default)]
    pub load_mode: LoadMode,
    #[serde(default = "default_summarizer_model")]
    pub summarizer_model: String,
    #[serde(default = "default_generator_model")]
    pub generator_model: String,
    /// Model input is truncated to this many characters before invocation.
    #[serde(default = "default_max_input_chars")]
    pub max_input_chars: usize,
    /// Ollama engine. When absent or disabled, every capability is unavailable
    /// and requests go straight to the heuristic engines.
    #[serde(default)]
    pub ollama: Option<OllamaEngineConfig>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            load_mode: LoadMode::default(),
            summarizer_model: default_summarizer_model(),
            generator_model: default_generator_model(),
            max_input_chars: default_max_input_chars(),
            ollama: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaEngineConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    /// Pull models that are missing on the Ollama server during load.
    #[serde(default)]
    pub auto_pull: bool,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// How long Ollama keeps a warmed model resident.
    #[serde(default = "default_keep_alive")]
    pub keep_alive: String,
}

impl Default for OllamaEngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_ollama_url(),
            auto_pull: false,
            request_timeout_secs: default_request_timeout(),
            keep_alive: default_keep_alive(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChunkingConfig {
    #[serde(default = "default_max_chunk_chars")]
    pub default_max_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            default_max_chars: default_max_chunk_chars(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReadabilityConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ReadabilityConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    5000
}
fn default_summarizer_model() -> String {
    "llama3.2:1b".to_string()
}
fn default_generator_model() -> String {
    "qwen2.5:1.5b".to_string()
}
fn default_max_input_chars() -> usize {
    1000
}
fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_request_timeout() -> u64 {
    120
}
fn default_keep_alive() -> String {
    "30m".to_string()
}
fn default_database_url() -> String {
    "sqlite:./data/learning.db".to_string()
}
fn default_max_chunk_chars() -> usize {
    300
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            models: ModelsConfig::default(),
            database: DatabaseConfig::default(),
            chunking: ChunkingConfig::default(),
            readability: ReadabilityConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (LEARNING__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .set_default("api.host", default_host())?
            .set_default("api.port", default_port() as i64)?
            .set_default("models.load_mode", "disabled")?
            .set_default("models.max_input_chars", default_max_input_chars() as i64)?
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("LEARNING")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Whether an inference engine is configured and switched on.
    pub fn engine_available(&self) -> bool {
        self.models.ollama.as_ref().is_some_and(|o| o.enabled)
    }
}
