use crate::errors::{AssistantError, Result};
use crate::generation::GenerationParams;
use crate::rag::context::ContextConfig;
use crate::rag::retrieval::SearchParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable consulted for the backend API key when the
/// config file does not carry one.
pub const API_KEY_ENV: &str = "ESTATEBUDDY_API_KEY";

/// Model backend providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Local Ollama server (embeddings + streamed generation)
    Ollama,
    /// OpenAI-compatible API (requires an API key)
    OpenAI,
}

impl Provider {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ollama => "ollama",
            Self::OpenAI => "openai",
        }
    }

    /// Whether this provider refuses requests without credentials
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAI)
    }
}

/// Listing dataset location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Path to the listings JSON file
    pub path: PathBuf,
    /// Key the listing array is nested under when the file is an object.
    /// When unset, the first array-valued entry is used.
    pub key: Option<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/listings.json"),
            key: None,
        }
    }
}

/// Embedding and generation backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub provider: Provider,
    /// Base URL of the backend API
    pub endpoint: String,
    /// Embedding model; must be the same at index build and query time
    pub embed_model: String,
    /// Generative model used to compose answers
    pub chat_model: String,
    /// API key for providers that need one (or set ESTATEBUDDY_API_KEY)
    pub api_key: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            provider: Provider::Ollama,
            endpoint: "http://127.0.0.1:11434".to_string(),
            embed_model: "all-minilm".to_string(),
            chat_model: "llama3:8b".to_string(),
            api_key: None,
        }
    }
}

/// Top-level configuration, loaded from TOML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub retrieval: SearchParams,
    #[serde(default)]
    pub context: ContextConfig,
    #[serde(default)]
    pub generation: GenerationParams,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must exist; the default path falls back to
    /// built-in defaults when absent. The API key may come from the
    /// environment when the file does not provide it.
    ///
    /// # Errors
    /// - Explicit config path does not exist or cannot be read
    /// - Config file is not valid TOML
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(AssistantError::ConfigError(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Self::parse_file(path)?
            }
            None => {
                let default_path = Self::config_path()?;
                if default_path.exists() {
                    Self::parse_file(&default_path)?
                } else {
                    Config::default()
                }
            }
        };

        if config.backend.api_key.is_none() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                if !key.is_empty() {
                    config.backend.api_key = Some(key);
                }
            }
        }

        Ok(config)
    }

    fn parse_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        toml::from_str(&contents).map_err(|e| {
            AssistantError::ConfigError(format!("failed to parse {}: {e}", path.display()))
        })
    }

    /// Default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| {
            AssistantError::ConfigError("could not determine home directory".to_string())
        })?;

        Ok(home.join(".estatebuddy").join("config.toml"))
    }

    /// Fail fast on configuration that would only surface mid-request.
    ///
    /// Called before the dataset is loaded or any index work starts.
    ///
    /// # Errors
    /// - Empty endpoint or model names
    /// - Provider requires an API key and none is configured
    /// - Zero retrieval depth or context budget
    pub fn validate(&self) -> Result<()> {
        if self.backend.endpoint.is_empty() {
            return Err(AssistantError::ConfigError(
                "backend endpoint is empty".to_string(),
            ));
        }
        if self.backend.embed_model.is_empty() {
            return Err(AssistantError::ConfigError(
                "embedding model is not configured".to_string(),
            ));
        }
        if self.backend.chat_model.is_empty() {
            return Err(AssistantError::ConfigError(
                "chat model is not configured".to_string(),
            ));
        }
        if self.backend.provider.requires_api_key() && self.backend.api_key.is_none() {
            return Err(AssistantError::ConfigError(format!(
                "provider \"{}\" requires an API key (set {API_KEY_ENV} or backend.api_key)",
                self.backend.provider.as_str()
            )));
        }
        if self.retrieval.top_k == 0 {
            return Err(AssistantError::ConfigError(
                "retrieval.top_k must be at least 1".to_string(),
            ));
        }
        if self.context.max_words == 0 {
            return Err(AssistantError::ConfigError(
                "context.max_words must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
