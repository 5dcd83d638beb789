//! Application configuration for tenderstat.
//!
//! User config lives at `~/.tenderstat/tenderstat.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, TenderStatError};
use crate::types::Category;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "tenderstat.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".tenderstat";

/// Earliest budget year kept by the pipeline.
pub const DEFAULT_MIN_YEAR: i32 = 2020;

// ---------------------------------------------------------------------------
// Config structs (matching tenderstat.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Record source settings.
    #[serde(default)]
    pub source: SourceSection,

    /// Pipeline policy.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Display labels for the three categories.
    #[serde(default)]
    pub labels: CategoryLabels,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSection {
    /// Base URL of the scrape API; records are requested from `<api_url>/scrape`.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout. Scrapes walk every record upstream, so this is long.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Total attempts per fetch, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Pause between attempts.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:3001".into()
}
fn default_timeout_secs() -> u64 {
    120
}
fn default_max_attempts() -> u32 {
    3
}
fn default_retry_delay_ms() -> u64 {
    1000
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Rows with an earlier budget year are dropped.
    #[serde(default = "default_min_year")]
    pub min_year: i32,

    /// Emit zero columns for empty categories in the by-category tables.
    #[serde(default)]
    pub zero_fill_empty_categories: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            min_year: default_min_year(),
            zero_fill_empty_categories: false,
        }
    }
}

fn default_min_year() -> i32 {
    DEFAULT_MIN_YEAR
}

/// `[labels]` section: group keys used in the by-category tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLabels {
    #[serde(default = "default_tender_label")]
    pub tender: String,
    #[serde(default = "default_non_tender_label")]
    pub non_tender: String,
    #[serde(default = "default_pencatatan_label")]
    pub pencatatan: String,
}

impl CategoryLabels {
    /// The label for one category.
    pub fn get(&self, category: Category) -> &str {
        match category {
            Category::Tender => &self.tender,
            Category::NonTender => &self.non_tender,
            Category::Pencatatan => &self.pencatatan,
        }
    }
}

impl Default for CategoryLabels {
    fn default() -> Self {
        Self {
            tender: default_tender_label(),
            non_tender: default_non_tender_label(),
            pencatatan: default_pencatatan_label(),
        }
    }
}

fn default_tender_label() -> String {
    "Tender".into()
}
fn default_non_tender_label() -> String {
    "Non-Tender".into()
}
fn default_pencatatan_label() -> String {
    "Pencatatan".into()
}

// ---------------------------------------------------------------------------
// Runtime configs (merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Fixed policy passed into every pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePolicy {
    /// Earliest budget year kept.
    pub min_year: i32,
    /// Group keys for the by-category tables.
    pub labels: CategoryLabels,
    /// Emit zero columns for empty categories in the by-category tables.
    pub zero_fill_empty_categories: bool,
}

impl Default for PipelinePolicy {
    fn default() -> Self {
        Self {
            min_year: DEFAULT_MIN_YEAR,
            labels: CategoryLabels::default(),
            zero_fill_empty_categories: false,
        }
    }
}

impl From<&AppConfig> for PipelinePolicy {
    fn from(config: &AppConfig) -> Self {
        Self {
            min_year: config.pipeline.min_year,
            labels: config.labels.clone(),
            zero_fill_empty_categories: config.pipeline.zero_fill_empty_categories,
        }
    }
}

/// Runtime record-source configuration.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub api_url: String,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
}

impl From<&AppConfig> for SourceConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            api_url: config.source.api_url.clone(),
            timeout_secs: config.source.timeout_secs,
            max_attempts: config.source.max_attempts,
            retry_delay_ms: config.source.retry_delay_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.tenderstat/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| TenderStatError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.tenderstat/tenderstat.toml`).
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

/// Load and validate the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| TenderStatError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        TenderStatError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    validate_config(&config)?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| TenderStatError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| TenderStatError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| TenderStatError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Reject settings the source client or pipeline cannot work with.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let api_url = &config.source.api_url;
    let parsed = url::Url::parse(api_url)
        .map_err(|e| TenderStatError::config(format!("invalid source.api_url '{api_url}': {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(TenderStatError::config(format!(
            "source.api_url must be http or https, got '{}'",
            parsed.scheme()
        )));
    }

    if config.source.max_attempts == 0 {
        return Err(TenderStatError::config("source.max_attempts must be at least 1"));
    }

    for category in Category::ALL {
        if config.labels.get(category).trim().is_empty() {
            return Err(TenderStatError::config(format!(
                "label for category '{category}' must not be empty"
            )));
        }
    }

    Ok(())
}
