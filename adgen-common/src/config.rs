//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration comes from a TOML file. A missing or unreadable
//! file is not fatal: the service logs a warning and runs on compiled defaults.
//!
//! Resolution priority for values that can come from several places:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "ADGEN_ROOT_FOLDER";
/// Environment variables holding the LLM API key, in priority order
pub const API_KEY_ENV_VARS: [&str; 2] = ["ADGEN_LLM_API_KEY", "OPENAI_API_KEY"];
/// SQLite database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "adgen.db";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database (optional)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP server port (optional, module default otherwise)
    #[serde(default)]
    pub port: Option<u16>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Language-model client configuration (optional)
    #[serde(default)]
    pub llm: LlmConfig,

    /// API usage logging (optional)
    #[serde(default)]
    pub usage: UsageConfig,
}

/// Where API usage events go
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageSink {
    /// `api_usage_logs` table
    #[default]
    Database,
    /// Log lines only
    Log,
}

/// Usage logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageConfig {
    #[serde(default)]
    pub sink: UsageSink,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Language-model client configuration
///
/// One fixed model serves both variants; only sampling differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible API base URL (without `/chat/completions`)
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Sampling temperature for fresh concepts
    #[serde(default = "default_generation_temperature")]
    pub generation_temperature: f32,

    /// Sampling temperature for remixes (favours more variation)
    #[serde(default = "default_remix_temperature")]
    pub remix_temperature: f32,

    /// Response length ceiling
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Maximum wait for one model invocation
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// API key (lowest priority source, see [`resolve_llm_api_key`])
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            generation_temperature: default_generation_temperature(),
            remix_temperature: default_remix_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            api_key: None,
        }
    }
}

impl LlmConfig {
    /// Replace out-of-range values with their defaults
    ///
    /// Temperatures must lie in `0.0..=2.0`; `max_tokens` and `timeout_secs`
    /// must be non-zero (a zero timeout would turn every request into a
    /// fallback concept).
    pub fn sanitized(mut self) -> Self {
        if !(0.0..=2.0).contains(&self.generation_temperature) {
            warn!(
                "llm.generation_temperature {} out of range, using {}",
                self.generation_temperature,
                default_generation_temperature()
            );
            self.generation_temperature = default_generation_temperature();
        }
        if !(0.0..=2.0).contains(&self.remix_temperature) {
            warn!(
                "llm.remix_temperature {} out of range, using {}",
                self.remix_temperature,
                default_remix_temperature()
            );
            self.remix_temperature = default_remix_temperature();
        }
        if self.max_tokens == 0 {
            warn!("llm.max_tokens is 0, using {}", default_max_tokens());
            self.max_tokens = default_max_tokens();
        }
        if self.timeout_secs == 0 {
            warn!("llm.timeout_secs is 0, using {}", default_timeout_secs());
            self.timeout_secs = default_timeout_secs();
        }
        self
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_llm_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_generation_temperature() -> f32 {
    0.8
}

fn default_remix_temperature() -> f32 {
    0.9
}

fn default_max_tokens() -> u32 {
    800
}

fn default_timeout_secs() -> u64 {
    30
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;
    let mut config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;
    config.llm = config.llm.sanitized();
    Ok(config)
}

/// Load the TOML config, degrading to defaults when it is missing or invalid
///
/// `explicit` is a path given on the command line; without it the platform
/// config location is tried.
pub fn load_config_or_default(explicit: Option<&Path>) -> TomlConfig {
    let path = match explicit.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => path,
        None => {
            warn!("Could not determine config directory, using defaults");
            return TomlConfig::default();
        }
    };

    if !path.exists() {
        if explicit.is_some() {
            warn!("Config file not found: {} (using defaults)", path.display());
        } else {
            info!("No config file at {}, using defaults", path.display());
        }
        return TomlConfig::default();
    }

    match load_toml_config(&path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(e) => {
            warn!("{} (using defaults)", e);
            TomlConfig::default()
        }
    }
}

/// Platform config file location: `<config_dir>/adgen/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("adgen").join("config.toml"))
}

/// OS-dependent compiled default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("adgen"))
        .unwrap_or_else(|| PathBuf::from("./adgen_data"))
}

/// Resolves the root folder following the documented priority order
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_root: Option<PathBuf>,
}

impl RootFolderResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            cli_arg: None,
            toml_root: None,
        }
    }

    pub fn with_cli_arg(mut self, path: Option<PathBuf>) -> Self {
        self.cli_arg = path;
        self
    }

    pub fn with_toml_config(mut self, config: &TomlConfig) -> Self {
        self.toml_root = config.root_folder.clone();
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!("[{}] Root folder from command line: {}", self.module_name, path.display());
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!("[{}] Root folder from {}: {}", self.module_name, ROOT_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_root {
            info!("[{}] Root folder from TOML config: {}", self.module_name, path.display());
            return path.clone();
        }

        let path = default_root_folder();
        info!("[{}] Root folder (compiled default): {}", self.module_name, path.display());
        path
    }
}

/// Creates the root folder on first run and locates files within it
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve the LLM API key
///
/// **Priority:** `ADGEN_LLM_API_KEY` → `OPENAI_API_KEY` → TOML `llm.api_key`
pub fn resolve_llm_api_key(llm: &LlmConfig) -> Result<String> {
    let mut found: Vec<(&str, String)> = API_KEY_ENV_VARS
        .iter()
        .filter_map(|var| {
            std::env::var(var)
                .ok()
                .filter(|k| is_valid_key(k))
                .map(|k| (*var, k))
        })
        .collect();

    if let Some(key) = llm.api_key.as_ref().filter(|k| is_valid_key(k)) {
        found.push(("TOML", key.clone()));
    }

    if found.len() > 1 {
        let sources: Vec<&str> = found.iter().map(|(source, _)| *source).collect();
        warn!(
            "LLM API key found in multiple sources: {}. Using {} (highest priority).",
            sources.join(", "),
            sources[0]
        );
    }

    match found.into_iter().next() {
        Some((source, key)) => {
            info!("LLM API key loaded from {}", source);
            Ok(key.trim().to_string())
        }
        None => Err(Error::Config(
            "LLM API key not configured. Please configure using one of:\n\
             1. Environment: ADGEN_LLM_API_KEY=your-key-here\n\
             2. Environment: OPENAI_API_KEY=your-key-here\n\
             3. TOML config: [llm] api_key = \"your-key\""
                .to_string(),
        )),
    }
}
