//! Configuration management for Safety Copilot.
//!
//! Configuration is merged from three sources, in increasing precedence:
//! - Built-in defaults (chunking, retrieval, provider ladders)
//! - An optional YAML config file (`copilot.yaml` in the data root)
//! - Environment variables

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Default chunk size in characters (roughly 500 tokens).
pub const DEFAULT_CHUNK_SIZE: usize = 600;

/// Default chunk overlap in characters.
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

/// Default number of chunks requested from the retrieval collaborator.
pub const DEFAULT_TOP_K: usize = 8;

/// Default minimum similarity for a retrieved chunk to be considered.
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.3;

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root directory of the PDF source tree
    pub data_dir: PathBuf,

    /// Primary LLM provider (e.g., "anthropic", "openai", "ollama")
    pub provider: String,

    /// Secondary LLM provider tried when the primary chain is exhausted
    pub fallback_provider: Option<String>,

    /// Model override; when unset each provider uses its own model ladder
    pub model: Option<String>,

    /// API key for the primary provider
    pub api_key: Option<String>,

    /// API key for the secondary provider
    pub fallback_api_key: Option<String>,

    /// Chunk size in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,

    /// Retrieval top-K
    pub top_k: usize,

    /// Minimum similarity threshold for retrieval
    pub similarity_threshold: f32,

    /// Log level override
    pub log_level: Option<String>,

    /// Disable colored output
    pub no_color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            provider: "anthropic".to_string(),
            fallback_provider: Some("openai".to_string()),
            model: None,
            api_key: None,
            fallback_api_key: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            log_level: None,
            no_color: false,
        }
    }
}

/// YAML config file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    data_dir: Option<String>,
    provider: Option<String>,
    fallback_provider: Option<String>,
    model: Option<String>,
    chunk_size: Option<usize>,
    chunk_overlap: Option<usize>,
    top_k: Option<usize>,
    similarity_threshold: Option<f32>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `COPILOT_DATA_DIR`: Root of the PDF source tree
    /// - `COPILOT_CONFIG`: Path to a YAML config file
    /// - `COPILOT_PROVIDER`: Primary LLM provider
    /// - `COPILOT_FALLBACK_PROVIDER`: Secondary LLM provider
    /// - `COPILOT_MODEL`: Model override
    /// - `ANTHROPIC_API_KEY` / `OPENAI_API_KEY`: Provider credentials
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(data_dir) = std::env::var("COPILOT_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }

        // YAML config file, if present
        let config_path = std::env::var("COPILOT_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config.data_dir.join("copilot.yaml"));
        if config_path.exists() {
            config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("COPILOT_PROVIDER") {
            config.provider = provider;
        }
        if let Ok(fallback) = std::env::var("COPILOT_FALLBACK_PROVIDER") {
            config.fallback_provider = if fallback.is_empty() {
                None
            } else {
                Some(fallback)
            };
        }
        if let Ok(model) = std::env::var("COPILOT_MODEL") {
            config.model = Some(model);
        }

        config.api_key = resolve_api_key(&config.provider);
        config.fallback_api_key = config
            .fallback_provider
            .as_deref()
            .and_then(resolve_api_key);

        config.log_level = std::env::var("RUST_LOG").ok();
        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of the loaded configuration.
    pub fn with_overrides(
        mut self,
        data_dir: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(data_dir) = data_dir {
            self.data_dir = data_dir;
        }
        if let Some(provider) = provider {
            self.api_key = resolve_api_key(&provider);
            self.provider = provider;
        }
        if let Some(model) = model {
            self.model = Some(model);
        }
        if verbose {
            self.log_level = Some("debug".to_string());
        } else if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }
        if no_color {
            self.no_color = true;
        }
        self
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(data_dir) = file.data_dir {
            self.data_dir = PathBuf::from(data_dir);
        }
        if let Some(provider) = file.provider {
            self.provider = provider;
        }
        if let Some(fallback) = file.fallback_provider {
            self.fallback_provider = Some(fallback);
        }
        if let Some(model) = file.model {
            self.model = Some(model);
        }
        if let Some(chunk_size) = file.chunk_size {
            self.chunk_size = chunk_size;
        }
        if let Some(chunk_overlap) = file.chunk_overlap {
            self.chunk_overlap = chunk_overlap;
        }
        if let Some(top_k) = file.top_k {
            self.top_k = top_k;
        }
        if let Some(threshold) = file.similarity_threshold {
            self.similarity_threshold = threshold;
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        Ok(())
    }

    /// Validate configuration values.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["anthropic", "openai", "ollama"];
        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }
        if let Some(ref fallback) = self.fallback_provider {
            if !known_providers.contains(&fallback.as_str()) {
                return Err(AppError::Config(format!(
                    "Unknown fallback provider: {}",
                    fallback
                )));
            }
        }

        if self.chunk_size == 0 {
            return Err(AppError::Config("chunk_size must be positive".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(AppError::Config(
                "similarity_threshold must be in [0, 1]".to_string(),
            ));
        }

        Ok(())
    }
}

/// Resolve the API key environment variable for a provider.
fn resolve_api_key(provider: &str) -> Option<String> {
    let env_var = match provider {
        "anthropic" => "ANTHROPIC_API_KEY",
        "openai" => "OPENAI_API_KEY",
        _ => return None,
    };
    std::env::var(env_var).ok().filter(|k| !k.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "anthropic");
        assert_eq!(config.fallback_provider.as_deref(), Some("openai"));
        assert_eq!(config.chunk_size, 600);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.top_k, 8);
        assert!((config.similarity_threshold - 0.3).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default().with_overrides(
            Some(PathBuf::from("/pdfs")),
            Some("ollama".to_string()),
            Some("llama3.2".to_string()),
            None,
            true,
            true,
        );
        assert_eq!(config.data_dir, PathBuf::from("/pdfs"));
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model.as_deref(), Some("llama3.2"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(config.no_color);
    }

    #[test]
    fn test_validate_rejects_unknown_provider() {
        let config = AppConfig {
            provider: "mainframe".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overlap_exceeding_chunk_size() {
        let config = AppConfig {
            chunk_size: 100,
            chunk_overlap: 100,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_threshold() {
        let config = AppConfig {
            similarity_threshold: 1.5,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
