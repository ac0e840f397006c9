use std::env;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5:1.5b";
const DEFAULT_OLLAMA_BIN: &str = "ollama";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the LawEase backend.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Ollama HTTP API.
    pub ollama_url: String,
    /// Model identifier sent with every generation request.
    pub ollama_model: String,
    /// Executable used by the local process transport.
    pub ollama_bin: String,
    /// Timeout applied to the HTTP transport, in seconds.
    pub http_timeout_secs: u64,
    /// Timeout applied to the process transport, in seconds.
    pub cli_timeout_secs: u64,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Largest request body accepted by the upload endpoint.
    pub max_upload_bytes: usize,
    /// Character cap applied when decoding files that are neither PDF nor DOCX.
    pub extract_fallback_chars: usize,
    /// Largest uncompressed DOCX body read during extraction.
    pub max_document_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            ollama_bin: DEFAULT_OLLAMA_BIN.to_string(),
            http_timeout_secs: 60,
            cli_timeout_secs: 90,
            server_port: None,
            max_upload_bytes: 25 * 1024 * 1024,
            extract_fallback_chars: 100_000,
            max_document_body_bytes: 100 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            ollama_url: load_env_optional("OLLAMA_URL").unwrap_or(defaults.ollama_url),
            ollama_model: load_env_optional("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            ollama_bin: load_env_optional("OLLAMA_BIN").unwrap_or(defaults.ollama_bin),
            http_timeout_secs: load_env_parsed("OLLAMA_HTTP_TIMEOUT_SECS")?
                .unwrap_or(defaults.http_timeout_secs),
            cli_timeout_secs: load_env_parsed("OLLAMA_CLI_TIMEOUT_SECS")?
                .unwrap_or(defaults.cli_timeout_secs),
            server_port: load_env_parsed("SERVER_PORT")?,
            max_upload_bytes: load_env_parsed("MAX_UPLOAD_BYTES")?
                .unwrap_or(defaults.max_upload_bytes),
            extract_fallback_chars: load_env_parsed("EXTRACT_FALLBACK_CHARS")?
                .unwrap_or(defaults.extract_fallback_chars),
            max_document_body_bytes: load_env_parsed("MAX_DOCUMENT_BODY_BYTES")?
                .unwrap_or(defaults.max_document_body_bytes),
        })
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn load_env_parsed<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        ollama_url = %config.ollama_url,
        model = %config.ollama_model,
        server_port = ?config.server_port,
        http_timeout_secs = config.http_timeout_secs,
        cli_timeout_secs = config.cli_timeout_secs,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
