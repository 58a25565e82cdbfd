//! Application configuration for SiteDigest.
//!
//! User config lives at `~/.sitedigest/sitedigest.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteDigestError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "sitedigest.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".sitedigest";

// ---------------------------------------------------------------------------
// Config structs (matching sitedigest.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Path of the generated digest file.
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// Concurrent page-metadata fetches per section.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: u32,

    /// Sitemap path resolved against a website origin.
    #[serde(default = "default_sitemap_path")]
    pub sitemap_path: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            fetch_concurrency: default_fetch_concurrency(),
            sitemap_path: default_sitemap_path(),
        }
    }
}

fn default_output_path() -> String {
    "llms.txt".into()
}
fn default_fetch_concurrency() -> u32 {
    8
}
fn default_sitemap_path() -> String {
    "/sitemap.xml".into()
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// Fetch config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime fetch configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Maximum concurrent HTTP requests within one section.
    pub concurrency: u32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            concurrency: config.defaults.fetch_concurrency,
            timeout_secs: config.http.timeout_secs,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.sitedigest/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SiteDigestError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.sitedigest/sitedigest.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| SiteDigestError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        SiteDigestError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SiteDigestError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SiteDigestError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SiteDigestError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
