//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::Path;

use super::defaults::*;
use super::{global_config_path, Config};

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

/// Helper to override a config value from a conventional environment variable
fn override_from_env(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    env_var: &str,
    key: &str,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    match std::env::var(env_var) {
        Ok(value) => builder
            .set_override(key, value)
            .map_err(|e| Error::config(format!("Failed to set {env_var}: {e}"))),
        Err(_) => Ok(builder),
    }
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `RECEVAL_` and use double underscores
    /// for nested values. For example:
    /// - `RECEVAL_EVALUATION__OUTPUT_DIR=/tmp/metrics`
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        // Sections missing from the file still need their defaults
        let builder = set_config_default(builder, "storage.provider", default_storage_provider())?;
        let builder =
            set_config_default(builder, "storage.postgres_host", default_postgres_host())?;
        let builder = set_config_default(
            builder,
            "storage.postgres_port",
            default_postgres_port() as i64,
        )?;
        let builder = set_config_default(
            builder,
            "storage.postgres_database",
            default_postgres_database(),
        )?;
        let builder =
            set_config_default(builder, "storage.postgres_user", default_postgres_user())?;
        let builder = set_config_default(
            builder,
            "storage.postgres_password",
            default_postgres_password(),
        )?;
        let builder = set_config_default(
            builder,
            "storage.interactions_table",
            default_interactions_table(),
        )?;
        let builder = set_config_default(
            builder,
            "storage.ground_truth_table",
            default_ground_truth_table(),
        )?;
        let builder = set_config_default(builder, "storage.tags_table", default_tags_table())?;
        let builder = set_config_default(builder, "evaluation.output_dir", default_output_dir())?;
        let builder = set_config_default(builder, "evaluation.model_dir", default_model_dir())?;
        let builder = set_config_default(
            builder,
            "evaluation.sufficiency_threshold",
            default_sufficiency_threshold() as i64,
        )?;
        let mut builder = set_config_default(
            builder,
            "evaluation.show_progress",
            default_show_progress(),
        )?;

        // Add the config file if it exists
        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        // Add environment variables with RECEVAL_ prefix
        builder = builder.add_source(
            Environment::with_prefix("RECEVAL")
                .separator("__")
                .try_parsing(true),
        );

        // Support the conventional Postgres environment variables
        builder = override_from_env(builder, "POSTGRES_HOST", "storage.postgres_host")?;
        if let Ok(port) = std::env::var("POSTGRES_PORT") {
            if let Ok(port_num) = port.parse::<u16>() {
                builder = builder
                    .set_override("storage.postgres_port", port_num)
                    .map_err(|e| Error::config(format!("Failed to set POSTGRES_PORT: {e}")))?;
            }
        }
        builder = override_from_env(builder, "POSTGRES_DATABASE", "storage.postgres_database")?;
        builder = override_from_env(builder, "POSTGRES_USER", "storage.postgres_user")?;
        builder = override_from_env(builder, "POSTGRES_PASSWORD", "storage.postgres_password")?;

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.receval/config.toml or custom --config path)
    /// 3. Environment variables (RECEVAL_*, then POSTGRES_*)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        if path.exists() {
            tracing::debug!("Loading configuration from {}", path.display());
        } else {
            tracing::debug!(
                "No configuration file at {}, using defaults and environment",
                path.display()
            );
        }
        Self::from_file(&path)
    }
}
