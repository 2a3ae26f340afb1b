// Configuration merging with priority

use crate::config::loader::DocforgeConfig;
use std::path::PathBuf;

/// Command line / environment overrides. `None` keeps the file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub export_directory: Option<PathBuf>,
}

/// Apply overrides on top of a loaded config.
/// Priority order: CLI -> config file -> defaults
pub fn merge(mut config: DocforgeConfig, overrides: &ConfigOverrides) -> DocforgeConfig {
    if let Some(ref base_url) = overrides.base_url {
        config.api.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(timeout) = overrides.request_timeout_secs {
        config.api.request_timeout_secs = timeout;
    }
    if let Some(ref dir) = overrides.export_directory {
        config.export.directory = Some(dir.clone());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_overrides_keep_config() {
        let config = DocforgeConfig::default();
        assert_eq!(merge(config.clone(), &ConfigOverrides::default()), config);
    }

    #[test]
    fn test_overrides_win() {
        let overrides = ConfigOverrides {
            base_url: Some("https://api.example.com/".to_string()),
            request_timeout_secs: Some(5),
            export_directory: Some(PathBuf::from("exports")),
        };
        let merged = merge(DocforgeConfig::default(), &overrides);
        assert_eq!(merged.api.base_url, "https://api.example.com");
        assert_eq!(merged.api.request_timeout_secs, 5);
        assert_eq!(merged.export.directory, Some(PathBuf::from("exports")));
    }
}
