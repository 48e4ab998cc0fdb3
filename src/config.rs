use std::env;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_EMBEDDING_MODEL: &str = "models/embedding-001";
const DEFAULT_EMBEDDING_DIMENSION: usize = 768;
const DEFAULT_COMPLETION_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_COMPLETION_TEMPERATURE: f32 = 0.3;
const DEFAULT_CHUNK_SIZE: usize = 1000;
const DEFAULT_CHUNK_OVERLAP: usize = 200;
const DEFAULT_TOP_K: usize = 3;
const DEFAULT_SERVER_PORT: u16 = 8000;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the docqa server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential sent to the Gemini API with every embedding and completion call.
    pub google_api_key: String,
    /// Base URL of the Gemini REST API.
    pub gemini_base_url: String,
    /// Embedding provider used to generate vector representations.
    pub embedding_provider: EmbeddingProvider,
    /// Embedding model identifier passed to the provider.
    pub embedding_model: String,
    /// Dimensionality of vectors produced by the offline hashing provider.
    pub embedding_dimension: usize,
    /// Completion model identifier used to answer questions.
    pub completion_model: String,
    /// Sampling temperature for completions.
    pub completion_temperature: f32,
    /// Maximum window size, in characters.
    pub text_splitter_chunk_size: usize,
    /// Characters shared between consecutive windows.
    pub text_splitter_chunk_overlap: usize,
    /// Number of windows retrieved per question.
    pub search_top_k: usize,
    /// Directory receiving transient upload files (defaults to the OS temp dir).
    pub upload_dir: Option<PathBuf>,
    /// HTTP server port.
    pub server_port: u16,
    /// Optional timeout applied to provider HTTP requests.
    pub http_timeout_secs: Option<u64>,
}

/// Supported embedding backends for the ingestion pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// Hosted Gemini embeddings API.
    Gemini,
    /// Deterministic local hashing encoder, useful offline.
    Hashing,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let google_api_key = optional("GOOGLE_API_KEY")
            .ok_or_else(|| ConfigError::MissingVariable("GOOGLE_API_KEY".to_string()))?;

        let embedding_provider = match optional("EMBEDDING_PROVIDER") {
            Some(value) => value
                .parse()
                .map_err(|()| ConfigError::InvalidValue("EMBEDDING_PROVIDER".to_string()))?,
            None => EmbeddingProvider::Gemini,
        };

        let text_splitter_chunk_size = parse_or(
            optional("TEXT_SPLITTER_CHUNK_SIZE"),
            "TEXT_SPLITTER_CHUNK_SIZE",
            DEFAULT_CHUNK_SIZE,
        )?;
        let text_splitter_chunk_overlap = parse_or(
            optional("TEXT_SPLITTER_CHUNK_OVERLAP"),
            "TEXT_SPLITTER_CHUNK_OVERLAP",
            DEFAULT_CHUNK_OVERLAP,
        )?;
        if text_splitter_chunk_size == 0 {
            return Err(ConfigError::InvalidValue(
                "TEXT_SPLITTER_CHUNK_SIZE".to_string(),
            ));
        }
        if text_splitter_chunk_overlap >= text_splitter_chunk_size {
            return Err(ConfigError::InvalidValue(
                "TEXT_SPLITTER_CHUNK_OVERLAP".to_string(),
            ));
        }

        let search_top_k = parse_or(optional("SEARCH_TOP_K"), "SEARCH_TOP_K", DEFAULT_TOP_K)?;
        if search_top_k == 0 {
            return Err(ConfigError::InvalidValue("SEARCH_TOP_K".to_string()));
        }

        let embedding_dimension = parse_or(
            optional("EMBEDDING_DIMENSION"),
            "EMBEDDING_DIMENSION",
            DEFAULT_EMBEDDING_DIMENSION,
        )?;
        if embedding_dimension == 0 {
            return Err(ConfigError::InvalidValue("EMBEDDING_DIMENSION".to_string()));
        }

        Ok(Self {
            google_api_key,
            gemini_base_url: optional("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            embedding_provider,
            embedding_model: optional("EMBEDDING_MODEL")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_MODEL.to_string()),
            embedding_dimension,
            completion_model: optional("COMPLETION_MODEL")
                .unwrap_or_else(|| DEFAULT_COMPLETION_MODEL.to_string()),
            completion_temperature: parse_or(
                optional("COMPLETION_TEMPERATURE"),
                "COMPLETION_TEMPERATURE",
                DEFAULT_COMPLETION_TEMPERATURE,
            )?,
            text_splitter_chunk_size,
            text_splitter_chunk_overlap,
            search_top_k,
            upload_dir: optional("UPLOAD_DIR").map(PathBuf::from),
            server_port: parse_or(optional("SERVER_PORT"), "SERVER_PORT", DEFAULT_SERVER_PORT)?,
            http_timeout_secs: optional("HTTP_TIMEOUT_SECS")
                .map(|value| {
                    value
                        .trim()
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("HTTP_TIMEOUT_SECS".into()))
                })
                .transpose()?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    value: Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "hashing" => Ok(Self::Hashing),
            _ => Err(()),
        }
    }
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
///
/// Returns an error when a required variable is missing so the binary can refuse to start.
pub fn init_config() -> Result<&'static Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    Ok(CONFIG.get_or_init(|| config))
}
