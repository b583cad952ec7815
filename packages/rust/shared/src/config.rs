//! Application configuration for the Câmara explorer.
//!
//! User config lives at `~/.camara/camara.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CamaraError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "camara.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".camara";

// ---------------------------------------------------------------------------
// Config structs (matching camara.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Legislative open-data API settings.
    #[serde(default)]
    pub opendata: OpenDataConfig,

    /// Generative-text service settings.
    #[serde(default)]
    pub generative: GenerativeConfig,

    /// Aggregation and enrichment policies.
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// `[opendata]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenDataConfig {
    /// API root, without trailing slash.
    #[serde(default = "default_opendata_url")]
    pub base_url: String,

    /// Transport timeout per request.
    #[serde(default = "default_opendata_timeout")]
    pub timeout_secs: u64,
}

impl Default for OpenDataConfig {
    fn default() -> Self {
        Self {
            base_url: default_opendata_url(),
            timeout_secs: default_opendata_timeout(),
        }
    }
}

fn default_opendata_url() -> String {
    "https://dadosabertos.camara.leg.br/api/v2".into()
}
fn default_opendata_timeout() -> u64 {
    30
}

/// `[generative]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerativeConfig {
    /// OpenAI-compatible API root.
    #[serde(default = "default_generative_url")]
    pub base_url: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model used for both enrichers.
    #[serde(default = "default_model")]
    pub model: String,

    /// Transport timeout per generation request.
    #[serde(default = "default_generative_timeout")]
    pub timeout_secs: u64,

    /// Sampling temperature for procedure analysis.
    #[serde(default = "default_analysis_temperature")]
    pub analysis_temperature: f32,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            base_url: default_generative_url(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            timeout_secs: default_generative_timeout(),
            analysis_temperature: default_analysis_temperature(),
        }
    }
}

fn default_generative_url() -> String {
    "https://openrouter.ai/api/v1".into()
}
fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".into()
}
fn default_model() -> String {
    "openai/gpt-4o-mini".into()
}
fn default_generative_timeout() -> u64 {
    60
}
fn default_analysis_temperature() -> f32 {
    0.3
}

/// How the aggregator treats a failed step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationPolicy {
    /// Any failed step fails the whole call once its stage has settled.
    #[default]
    FailFast,
    /// Failed parts are left empty and reported alongside the rest.
    BestEffort,
}

/// What an enricher does when the service returns no usable structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingOutput {
    /// Substitute a fixed message.
    Fallback,
    /// Return a generation error.
    Fail,
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Aggregation failure policy.
    #[serde(default)]
    pub policy: AggregationPolicy,

    /// Missing-output policy of the explanation enricher.
    #[serde(default = "default_explanation_on_missing")]
    pub explanation_on_missing: MissingOutput,

    /// Missing-output policy of the procedure-analysis enricher.
    #[serde(default = "default_analysis_on_missing")]
    pub analysis_on_missing: MissingOutput,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            policy: AggregationPolicy::default(),
            explanation_on_missing: default_explanation_on_missing(),
            analysis_on_missing: default_analysis_on_missing(),
        }
    }
}

fn default_explanation_on_missing() -> MissingOutput {
    MissingOutput::Fallback
}
fn default_analysis_on_missing() -> MissingOutput {
    MissingOutput::Fail
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.camara/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| CamaraError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.camara/camara.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CamaraError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| CamaraError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| CamaraError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| CamaraError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CamaraError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the generative API key from the env var named in the config.
pub fn resolve_api_key(config: &GenerativeConfig) -> Result<String> {
    let var_name = &config.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(CamaraError::config(format!(
            "generative API key not found. Set the {var_name} environment variable."
        ))),
    }
}
