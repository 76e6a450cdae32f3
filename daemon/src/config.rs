//! Service configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use agora_types::ReputationParams;

/// Configuration for the reputation service.
///
/// Can be loaded from a TOML file or built programmatically; CLI flags and
/// environment variables override file values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Data directory for LMDB storage.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Policy parameters (defaults; not usually set via TOML).
    #[serde(skip)]
    pub params: ReputationParams,

    /// Token-program ids the decoder recognizes, base58. Empty means the
    /// built-in mainnet catalog.
    #[serde(default)]
    pub token_programs: Vec<String>,

    /// Shared secret for inbound webhook signature verification.
    #[serde(default)]
    pub webhook_secret: Option<String>,

    /// Interval between periodic full recalculation sweeps, seconds.
    #[serde(default = "default_sweep_secs")]
    pub sweep_secs: u64,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./agora_data")
}

fn default_sweep_secs() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            params: ReputationParams::standard(),
            token_programs: Vec::new(),
            webhook_secret: None,
            sweep_secs: default_sweep_secs(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: ServiceConfig = toml::from_str("").unwrap();
        assert_eq!(config.data_dir, PathBuf::from("./agora_data"));
        assert_eq!(config.sweep_secs, 3600);
        assert!(config.webhook_secret.is_none());
    }

    #[test]
    fn test_toml_overrides() {
        let config: ServiceConfig = toml::from_str(
            r#"
            data_dir = "/var/lib/agora"
            sweep_secs = 60
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/agora"));
        assert_eq!(config.sweep_secs, 60);
        assert_eq!(config.log_level, "debug");
    }
}
