//! Configuration management for the Mutuo service.
//!
//! Settings are merged from three layers, lowest precedence first:
//! - An optional YAML file (`mutuo.yaml` or the path in `MUTUO_CONFIG`)
//! - Environment variables (a `.env` file is loaded by the binary beforehand)
//! - Command-line flags, applied through [`AppConfig::with_overrides`]
//!
//! The provider credential is only ever read from the environment.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AppError, AppResult};

/// Environment variable holding the provider credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default location of the persisted similarity index.
pub const DEFAULT_INDEX_DIR: &str = "vectordb";

/// Default YAML config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "mutuo.yaml";

/// Agent embedded in the page by the conversational widget.
pub const DEFAULT_VOICE_AGENT_ID: &str = "agent_mutuo_assistente_vocale";

/// Main application configuration.
#[derive(Clone)]
pub struct AppConfig {
    /// API credential for the generation and embedding provider
    pub api_key: String,

    /// Directory containing the persisted similarity index
    pub index_dir: PathBuf,

    /// Base URL of the OpenAI-compatible API
    pub api_base_url: String,

    /// Chat model used for answer generation
    pub chat_model: String,

    /// Embedding provider ("openai" or "mock")
    pub embedding_provider: String,

    /// Embedding model used for questions
    pub embedding_model: String,

    /// Sampling temperature for generation
    pub temperature: f32,

    /// Number of passages retrieved per question
    pub top_k: usize,

    /// Optional cap on generated tokens per answer
    pub max_tokens: Option<u32>,

    /// Upper bound on each outbound HTTP call
    pub request_timeout_secs: u64,

    /// Whether citations are requested by default
    pub show_sources: bool,

    /// Identifier of the embedded voice agent
    pub voice_agent_id: String,

    /// Address the HTTP server binds to
    pub bind: String,

    /// Config file that was merged, if any
    pub config_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"<redacted>")
            .field("index_dir", &self.index_dir)
            .field("api_base_url", &self.api_base_url)
            .field("chat_model", &self.chat_model)
            .field("embedding_provider", &self.embedding_provider)
            .field("embedding_model", &self.embedding_model)
            .field("temperature", &self.temperature)
            .field("top_k", &self.top_k)
            .field("max_tokens", &self.max_tokens)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("show_sources", &self.show_sources)
            .field("voice_agent_id", &self.voice_agent_id)
            .field("bind", &self.bind)
            .field("config_file", &self.config_file)
            .field("log_level", &self.log_level)
            .field("verbose", &self.verbose)
            .field("no_color", &self.no_color)
            .finish()
    }
}

/// Non-secret settings accepted from the YAML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    index_dir: Option<String>,
    api_base_url: Option<String>,
    chat_model: Option<String>,
    embedding_provider: Option<String>,
    embedding_model: Option<String>,
    temperature: Option<f32>,
    top_k: Option<usize>,
    max_tokens: Option<u32>,
    request_timeout_secs: Option<u64>,
    show_sources: Option<bool>,
    voice_agent_id: Option<String>,
    bind: Option<String>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            index_dir: PathBuf::from(DEFAULT_INDEX_DIR),
            api_base_url: "https://api.openai.com/v1".to_string(),
            chat_model: "gpt-4o-mini".to_string(),
            embedding_provider: "openai".to_string(),
            embedding_model: "text-embedding-ada-002".to_string(),
            temperature: 0.1,
            top_k: 4,
            max_tokens: None,
            request_timeout_secs: 60,
            show_sources: true,
            voice_agent_id: DEFAULT_VOICE_AGENT_ID.to_string(),
            bind: "127.0.0.1:8501".to_string(),
            config_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - `OPENAI_API_KEY`: provider credential (required)
    /// - `OPENAI_BASE_URL`: API base URL
    /// - `MUTUO_CONFIG`: path to a YAML config file
    /// - `MUTUO_INDEX_DIR`: index directory
    /// - `MUTUO_CHAT_MODEL`, `MUTUO_EMBEDDING_MODEL`, `MUTUO_EMBEDDING_PROVIDER`
    /// - `MUTUO_TEMPERATURE`, `MUTUO_TOP_K`, `MUTUO_REQUEST_TIMEOUT`
    /// - `MUTUO_SHOW_SOURCES`, `MUTUO_VOICE_AGENT_ID`, `MUTUO_BIND`
    /// - `RUST_LOG`: log level
    /// - `NO_COLOR`: disable colored output
    ///
    /// # Errors
    /// Returns [`AppError::MissingCredential`] when `OPENAI_API_KEY` is absent
    /// or empty. Callers must stop and show the message to the user.
    ///
    /// # Example
    /// ```no_run
    /// use mutuo_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None).expect("Failed to load config");
    /// println!("Index: {:?}", config.index_dir);
    /// ```
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), config_file)
    }

    /// Build the configuration from an arbitrary key lookup.
    ///
    /// `load` delegates here with `std::env::var`; tests pass a map.
    ///
    /// The credential is checked before anything else is read, so a missing
    /// key is always reported as `MissingCredential`.
    pub fn from_lookup<F>(lookup: F, config_file: Option<&Path>) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = non_empty(lookup(API_KEY_ENV))
            .ok_or_else(|| AppError::MissingCredential(API_KEY_ENV.to_string()))?;

        let mut config = Self {
            api_key,
            ..Self::default()
        };

        let yaml_path = config_file
            .map(Path::to_path_buf)
            .or_else(|| lookup("MUTUO_CONFIG").map(PathBuf::from))
            .or_else(|| {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            });

        if let Some(path) = yaml_path {
            config.merge_yaml(&path)?;
        }

        // Environment variables override YAML config
        if let Some(dir) = non_empty(lookup("MUTUO_INDEX_DIR")) {
            config.index_dir = PathBuf::from(dir);
        }
        if let Some(url) = non_empty(lookup("OPENAI_BASE_URL")) {
            config.api_base_url = url;
        }
        if let Some(model) = non_empty(lookup("MUTUO_CHAT_MODEL")) {
            config.chat_model = model;
        }
        if let Some(provider) = non_empty(lookup("MUTUO_EMBEDDING_PROVIDER")) {
            config.embedding_provider = provider;
        }
        if let Some(model) = non_empty(lookup("MUTUO_EMBEDDING_MODEL")) {
            config.embedding_model = model;
        }
        if let Some(temperature) = parse_var(&lookup, "MUTUO_TEMPERATURE")? {
            config.temperature = temperature;
        }
        if let Some(top_k) = parse_var(&lookup, "MUTUO_TOP_K")? {
            config.top_k = top_k;
        }
        if let Some(max_tokens) = parse_var(&lookup, "MUTUO_MAX_TOKENS")? {
            config.max_tokens = Some(max_tokens);
        }
        if let Some(timeout) = parse_var(&lookup, "MUTUO_REQUEST_TIMEOUT")? {
            config.request_timeout_secs = timeout;
        }
        if let Some(raw) = non_empty(lookup("MUTUO_SHOW_SOURCES")) {
            config.show_sources = parse_bool("MUTUO_SHOW_SOURCES", &raw)?;
        }
        if let Some(agent) = non_empty(lookup("MUTUO_VOICE_AGENT_ID")) {
            config.voice_agent_id = agent;
        }
        if let Some(bind) = non_empty(lookup("MUTUO_BIND")) {
            config.bind = bind;
        }
        if let Some(level) = non_empty(lookup("RUST_LOG")) {
            config.log_level = Some(level);
        }
        if lookup("NO_COLOR").is_some() {
            config.no_color = true;
        }

        config.validate()?;
        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&mut self, path: &Path) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(dir) = file.index_dir {
            self.index_dir = PathBuf::from(dir);
        }
        if let Some(url) = file.api_base_url {
            self.api_base_url = url;
        }
        if let Some(model) = file.chat_model {
            self.chat_model = model;
        }
        if let Some(provider) = file.embedding_provider {
            self.embedding_provider = provider;
        }
        if let Some(model) = file.embedding_model {
            self.embedding_model = model;
        }
        if let Some(temperature) = file.temperature {
            self.temperature = temperature;
        }
        if let Some(top_k) = file.top_k {
            self.top_k = top_k;
        }
        if let Some(max_tokens) = file.max_tokens {
            self.max_tokens = Some(max_tokens);
        }
        if let Some(timeout) = file.request_timeout_secs {
            self.request_timeout_secs = timeout;
        }
        if let Some(show) = file.show_sources {
            self.show_sources = show;
        }
        if let Some(agent) = file.voice_agent_id {
            self.voice_agent_id = agent;
        }
        if let Some(bind) = file.bind {
            self.bind = bind;
        }
        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
        }

        self.config_file = Some(path.to_path_buf());
        tracing::debug!("Merged config file {:?}", path);
        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over environment variables and
    /// the YAML file.
    pub fn with_overrides(
        mut self,
        bind: Option<String>,
        index_dir: Option<PathBuf>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(bind) = bind {
            self.bind = bind;
        }

        if let Some(index_dir) = index_dir {
            self.index_dir = index_dir;
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

    /// Validate value ranges.
    pub fn validate(&self) -> AppResult<()> {
        if self.top_k == 0 {
            return Err(AppError::Config("top_k must be at least 1".to_string()));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(AppError::Config(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }

        if self.max_tokens == Some(0) {
            return Err(AppError::Config("max_tokens must be at least 1".to_string()));
        }

        if self.request_timeout_secs == 0 {
            return Err(AppError::Config(
                "request timeout must be at least 1 second".to_string(),
            ));
        }

        let known_providers = ["openai", "mock"];
        if !known_providers.contains(&self.embedding_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding_provider,
                known_providers.join(", ")
            )));
        }

        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<F, T>(lookup: &F, key: &str) -> AppResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match non_empty(lookup(key)) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| AppError::Config(format!("Invalid value for {}: {} ({})", key, raw, e))),
        None => Ok(None),
    }
}

fn parse_bool(key: &str, raw: &str) -> AppResult<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::Config(format!(
            "Invalid boolean for {}: {}",
            key, raw
        ))),
    }
}
