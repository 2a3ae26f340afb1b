// Configuration file loading

use crate::models::MAX_SLIDES;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// DocForge configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DocforgeConfig {
    /// Document service connection
    #[serde(default)]
    pub api: ApiConfig,
    /// Export download settings
    #[serde(default)]
    pub export: ExportConfig,
    /// Structure limits
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// Document service connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the DocForge API
    #[serde(rename = "baseUrl", alias = "base_url", default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout; generation calls can take a while
    #[serde(
        rename = "requestTimeoutSecs",
        alias = "request_timeout_secs",
        default = "default_request_timeout_secs"
    )]
    pub request_timeout_secs: u64,
    #[serde(rename = "userAgent", alias = "user_agent", default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}
fn default_request_timeout_secs() -> u64 {
    120
}
fn default_user_agent() -> String {
    format!("docforge/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Export download settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ExportConfig {
    /// Directory exported files are written to (current directory when unset)
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl ExportConfig {
    pub fn resolved_directory(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Structure limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LimitsConfig {
    /// Largest deck the slide editor accepts; may only lower the built-in ceiling
    #[serde(rename = "maxSlides", alias = "max_slides", default = "default_max_slides")]
    pub max_slides: usize,
}

fn default_max_slides() -> usize {
    MAX_SLIDES
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_slides: default_max_slides(),
        }
    }
}

/// Configuration loader
pub struct ConfigLoader {
    path: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader for the global config file
    pub fn new() -> Self {
        Self {
            path: Self::get_global_config_path(),
        }
    }

    /// Loader for an explicit config file
    pub fn with_path(path: &Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
        }
    }

    /// Get the global config path (<config dir>/docforge/config.toml)
    fn get_global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("docforge").join("config.toml"))
    }

    pub fn config_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Load the config, falling back to defaults when no file exists
    pub fn load(&self) -> Result<DocforgeConfig> {
        match self.path {
            Some(ref path) => Ok(self.load_from_path(path)?.unwrap_or_default()),
            None => {
                log::debug!("No config directory available, using defaults");
                Ok(DocforgeConfig::default())
            }
        }
    }

    /// Load config from a specific path
    pub fn load_from_path(&self, path: &Path) -> Result<Option<DocforgeConfig>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

        let config: DocforgeConfig = toml::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;

        validate_config(&config)?;

        Ok(Some(config))
    }

    /// Save config to the loader's path
    pub fn save(&self, config: &DocforgeConfig) -> Result<()> {
        match self.path {
            Some(ref path) => self.save_to_path(path, config),
            None => Err(anyhow!("No config path available")),
        }
    }

    /// Save config to a specific path
    pub fn save_to_path(&self, path: &Path, config: &DocforgeConfig) -> Result<()> {
        validate_config(config)?;

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    anyhow!(
                        "Failed to create config directory '{}': {}",
                        parent.display(),
                        e
                    )
                })?;
            }
        }

        let contents = toml::to_string_pretty(config)
            .map_err(|e| anyhow!("Failed to serialize config: {}", e))?;

        fs::write(path, contents)
            .map_err(|e| anyhow!("Failed to write config file '{}': {}", path.display(), e))?;

        log::info!("Saved config to: {}", path.display());
        Ok(())
    }
}

/// Validate config values
pub fn validate_config(config: &DocforgeConfig) -> Result<()> {
    let base_url = config.api.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(anyhow!(
            "api.baseUrl must be an http(s) URL, got '{}'",
            config.api.base_url
        ));
    }

    if config.api.request_timeout_secs == 0 {
        return Err(anyhow!("api.requestTimeoutSecs must be greater than 0"));
    }

    if config.limits.max_slides == 0 || config.limits.max_slides > MAX_SLIDES {
        return Err(anyhow!(
            "limits.maxSlides must be between 1 and {}",
            MAX_SLIDES
        ));
    }

    Ok(())
}
