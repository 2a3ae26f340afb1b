// Secure storage for the identity token
//
// The token is stored in ~/.docforge/secrets.toml (global only)

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Secrets stored in ~/.docforge/secrets.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct SecretsConfig {
    /// Identity token sent as the Bearer credential
    #[serde(rename = "identityToken", alias = "identity_token", default)]
    pub identity_token: Option<String>,
}

impl SecretsConfig {
    /// Get the secrets file path (~/.docforge/secrets.toml)
    pub fn get_secrets_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".docforge").join("secrets.toml"))
    }

    /// Load secrets from the default location
    pub fn load() -> Result<Self> {
        let path = Self::get_secrets_path()
            .ok_or_else(|| anyhow!("Could not determine home directory"))?;
        Self::load_from(&path)
    }

    /// Load secrets from a file; a missing file yields empty secrets
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read secrets file '{}': {}", path.display(), e))?;

        let config: SecretsConfig = toml::from_str(&contents)
            .map_err(|e| anyhow!("Failed to parse secrets file '{}': {}", path.display(), e))?;

        Ok(config)
    }

    /// Save secrets to the default location
    pub fn save(&self) -> Result<()> {
        let path = Self::get_secrets_path()
            .ok_or_else(|| anyhow!("Could not determine home directory"))?;
        self.save_to(&path)
    }

    /// Save secrets to a file, owner read/write only on Unix
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    anyhow!(
                        "Failed to create secrets directory '{}': {}",
                        parent.display(),
                        e
                    )
                })?;
            }
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| anyhow!("Failed to serialize secrets: {}", e))?;

        fs::write(path, contents)
            .map_err(|e| anyhow!("Failed to write secrets file '{}': {}", path.display(), e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = fs::Permissions::from_mode(0o600);
            fs::set_permissions(path, permissions).map_err(|e| {
                anyhow!(
                    "Failed to set permissions on secrets file '{}': {}",
                    path.display(),
                    e
                )
            })?;
        }

        log::info!("Saved secrets to: {}", path.display());
        Ok(())
    }

    /// Stored token, ignoring blank values
    pub fn token(&self) -> Option<&str> {
        self.identity_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    pub fn set_token(&mut self, token: &str) {
        self.identity_token = Some(token.trim().to_string());
    }

    /// Remove the stored token. Returns whether one was present.
    pub fn clear_token(&mut self) -> bool {
        self.identity_token.take().is_some()
    }
}

/// Pick the token to use: an explicit value (flag or environment) wins over
/// the stored one
pub fn resolve_token(explicit: Option<&str>, stored: &SecretsConfig) -> Option<String> {
    explicit
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .or_else(|| stored.token())
        .map(str::to_string)
}
