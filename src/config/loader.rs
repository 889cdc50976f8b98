//! Configuration Loader
//!
//! Layers built-in defaults, an optional TOML file and `EVALFLEET_`-prefixed
//! environment variables (`__` separates nested keys), then validates the result.

use config::{Config, Environment, File, FileFormat};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use super::EvalConfig;
use crate::error::Result;

const ENV_PREFIX: &str = "EVALFLEET";
const DEFAULT_CONFIG_PATH: &str = "./config/evalfleet.toml";

pub struct ConfigManager {
    config: EvalConfig,
    source_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Load configuration from `path`, or from `./config/evalfleet.toml` when present
    pub fn load(path: Option<&Path>) -> Result<Arc<ConfigManager>> {
        let source_path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
                default_path.is_file().then_some(default_path)
            }
        };

        let mut builder = Config::builder().add_source(Config::try_from(&EvalConfig::default())?);

        if let Some(ref p) = source_path {
            debug!("Loading configuration file: {}", p.display());
            builder = builder.add_source(File::from(p.as_path()).format(FileFormat::Toml));
        }

        let config: EvalConfig = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;

        info!(
            source = %source_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "defaults".to_string()),
            submission_url = %config.client.submission_url,
            auth_configured = config.client.auth_token.is_some(),
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            source_path,
        }))
    }

    /// Wrap an already-built configuration (tests, embedding callers)
    pub fn from_config(config: EvalConfig) -> Result<Arc<ConfigManager>> {
        config.validate()?;
        Ok(Arc::new(ConfigManager {
            config,
            source_path: None,
        }))
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Configuration as JSON with secrets masked, for debugging output
    pub fn debug_config(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(&self.config).unwrap_or_default();
        for pointer in ["/client/auth_token", "/web/api_key"] {
            if let Some(secret) = value.pointer_mut(pointer) {
                if !secret.is_null() {
                    *secret = serde_json::Value::String("***".to_string());
                }
            }
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_file_values_override_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[polling]
refresh_rate_seconds = 3
refresh_message = true

[dispatcher]
launch_concurrency = 4
subnets = ["subnet-a", "subnet-b"]
"#
        )
        .unwrap();

        let manager = ConfigManager::load(Some(file.path())).unwrap();
        let config = manager.config();
        assert_eq!(config.polling.refresh_rate_seconds, 3);
        assert!(config.polling.refresh_message);
        assert_eq!(config.dispatcher.launch_concurrency, 4);
        assert_eq!(config.dispatcher.subnets, vec!["subnet-a", "subnet-b"]);
        // Untouched sections keep their defaults
        assert_eq!(config.buffer.cold_start_seconds, 370);
        assert_eq!(manager.source_path(), Some(file.path()));
    }

    #[test]
    fn test_invalid_file_values_are_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[batching]\nmax_batch_size = 0").unwrap();

        assert!(ConfigManager::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_debug_config_masks_secrets() {
        let mut config = EvalConfig::default();
        config.client.auth_token = Some("super-secret".to_string());
        let manager = ConfigManager::from_config(config).unwrap();

        let debug = manager.debug_config();
        assert_eq!(debug["client"]["auth_token"], "***");
        assert!(debug["web"]["api_key"].is_null());
    }
}
