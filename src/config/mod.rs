// Configuration: TOML config file, CLI overrides and stored secrets

pub mod loader;
pub mod merger;
pub mod secrets;

pub use loader::{ApiConfig, ConfigLoader, DocforgeConfig, ExportConfig, LimitsConfig};
pub use merger::{merge, ConfigOverrides};
pub use secrets::{resolve_token, SecretsConfig};
