//! Configuration management for the Docent service.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Environment variables
//! - Command-line flags
//! - Config files (.docent/config.yaml)
//!
//! Validation is the `ConfigurationError` gate: an invalid configuration is
//! fatal at startup, before any query is accepted.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Main application configuration.
///
/// This struct holds all global configuration options that affect
/// behavior across commands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .docent/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Path to the document corpus to index (file or directory)
    pub document_path: PathBuf,

    /// LLM provider (e.g., "ollama")
    pub provider: String,

    /// Model identifier for the LLM provider
    pub model: String,

    /// Optional custom LLM endpoint URL
    pub endpoint: Option<String>,

    /// API key for providers that require one
    pub api_key: Option<String>,

    /// Embedding provider (e.g., "ollama", "trigram")
    pub embedding_provider: String,

    /// Model identifier for the embedding provider
    pub embedding_model: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Retrieval tunables
    pub retrieval: RetrievalConfig,

    /// Agent loop tunables
    pub agent: AgentConfig,
}

/// Retrieval configuration: chunking and top-k lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Maximum chunk size in characters
    #[serde(rename = "chunkSize", default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks from the same page
    #[serde(rename = "chunkOverlap", default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of chunks returned per retrieval
    #[serde(rename = "topK", default = "default_top_k")]
    pub top_k: usize,

    /// Embedding vector dimension (used by the trigram provider)
    #[serde(rename = "embeddingDim", default = "default_embedding_dim")]
    pub embedding_dim: usize,
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    4
}

fn default_embedding_dim() -> usize {
    384
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            embedding_dim: default_embedding_dim(),
        }
    }
}

/// Agent loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum THINKING/ACTING/OBSERVING iterations per query
    #[serde(rename = "maxSteps", default = "default_max_steps")]
    pub max_steps: usize,

    /// Timeout in seconds applied to each external provider call
    #[serde(rename = "requestTimeoutSecs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_max_steps() -> usize {
    6
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl AgentConfig {
    /// Per-call timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    document: Option<DocumentConfig>,
    llm: Option<LlmSection>,
    retrieval: Option<RetrievalConfig>,
    agent: Option<AgentConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    #[serde(rename = "embeddingProvider")]
    embedding_provider: Option<String>,
    #[serde(rename = "embeddingModel")]
    embedding_model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            document_path: PathBuf::from("data/policy.md"),
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            endpoint: None,
            api_key: None,
            embedding_provider: "ollama".to_string(),
            embedding_model: "nomic-embed-text".to_string(),
            log_level: None,
            verbose: false,
            no_color: false,
            retrieval: RetrievalConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `DOCENT_WORKSPACE`: Override workspace path
    /// - `DOCENT_CONFIG`: Path to config file
    /// - `DOCENT_DOCUMENT`: Document corpus path
    /// - `DOCENT_PROVIDER`: LLM provider
    /// - `DOCENT_MODEL`: Model identifier
    /// - `DOCENT_API_KEY`: API key
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(workspace) = std::env::var("DOCENT_WORKSPACE") {
            config.workspace = PathBuf::from(workspace);
        }

        if let Ok(config_file) = std::env::var("DOCENT_CONFIG") {
            config.config_file = Some(PathBuf::from(config_file));
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        // Load from YAML config file if it exists
        let config_path = if let Some(ref cf) = config.config_file {
            cf.clone()
        } else {
            config.docent_dir().join("config.yaml")
        };

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(document) = std::env::var("DOCENT_DOCUMENT") {
            config.document_path = PathBuf::from(document);
        }

        if let Ok(provider) = std::env::var("DOCENT_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("DOCENT_MODEL") {
            config.model = model;
        }

        config.api_key = std::env::var("DOCENT_API_KEY").ok();
        config.log_level = std::env::var("RUST_LOG").ok();

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &PathBuf) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(document) = config_file.document {
            if let Some(path) = document.path {
                result.document_path = PathBuf::from(path);
            }
        }

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
            if let Some(embedding_provider) = llm.embedding_provider {
                result.embedding_provider = embedding_provider;
            }
            if let Some(embedding_model) = llm.embedding_model {
                result.embedding_model = embedding_model;
            }
        }

        if let Some(retrieval) = config_file.retrieval {
            result.retrieval = retrieval;
        }

        if let Some(agent) = config_file.agent {
            result.agent = agent;
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        document: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(document) = document {
            self.document_path = document;
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate configuration for the active providers.
    ///
    /// This is the fatal `ConfigurationError` gate: callers must not build
    /// an agent from a configuration that fails here.
    pub fn validate(&self) -> AppResult<()> {
        let known_providers = ["ollama", "openai", "claude"];
        if !known_providers.contains(&self.provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                known_providers.join(", ")
            )));
        }

        // Remote providers require credentials up front
        if matches!(self.provider.as_str(), "openai" | "claude") && self.api_key.is_none() {
            return Err(AppError::Config(format!(
                "Provider '{}' requires an API key (set DOCENT_API_KEY)",
                self.provider
            )));
        }

        let known_embedding_providers = ["ollama", "trigram"];
        if !known_embedding_providers.contains(&self.embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding_provider,
                known_embedding_providers.join(", ")
            )));
        }

        if self.retrieval.chunk_size == 0 {
            return Err(AppError::Config("chunkSize must be positive".to_string()));
        }

        if self.retrieval.chunk_overlap >= self.retrieval.chunk_size {
            return Err(AppError::Config(format!(
                "chunkOverlap ({}) must be smaller than chunkSize ({})",
                self.retrieval.chunk_overlap, self.retrieval.chunk_size
            )));
        }

        if self.retrieval.top_k == 0 {
            return Err(AppError::Config("topK must be positive".to_string()));
        }

        if self.agent.max_steps == 0 {
            return Err(AppError::Config("maxSteps must be positive".to_string()));
        }

        Ok(())
    }

    /// Get the path to the .docent directory.
    pub fn docent_dir(&self) -> PathBuf {
        self.workspace.join(".docent")
    }
}
