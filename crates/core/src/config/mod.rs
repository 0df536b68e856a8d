//! Configuration module for the receval system
//!
//! This module provides configuration structures and loading mechanisms for the
//! evaluation harness. Configuration can be loaded from TOML files and/or
//! environment variables.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use defaults::DEFAULT_SUFFICIENCY_THRESHOLD;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.receval/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".receval").join("config.toml"))
}

/// Main configuration structure for the receval system
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Interaction store configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Evaluation output configuration
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

/// Configuration for the interaction store
#[derive(Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Provider type; only "postgres" is supported
    #[serde(default = "default_storage_provider")]
    pub provider: String,

    /// Postgres host address
    #[serde(default = "default_postgres_host")]
    pub postgres_host: String,

    /// Postgres port
    #[serde(default = "default_postgres_port")]
    pub postgres_port: u16,

    /// Postgres database name
    #[serde(default = "default_postgres_database")]
    pub postgres_database: String,

    /// Postgres username
    #[serde(default = "default_postgres_user")]
    pub postgres_user: String,

    /// Postgres password
    #[serde(default = "default_postgres_password")]
    pub postgres_password: String,

    /// Table of (user_id, item_id) rows models are trained on
    #[serde(default = "default_interactions_table")]
    pub interactions_table: String,

    /// Table of held-out (user_id, item_id) rows recommendations are scored against
    #[serde(default = "default_ground_truth_table")]
    pub ground_truth_table: String,

    /// Table of (user_id, item_id, tag_id) rows
    #[serde(default = "default_tags_table")]
    pub tags_table: String,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("provider", &self.provider)
            .field("postgres_host", &self.postgres_host)
            .field("postgres_port", &self.postgres_port)
            .field("postgres_database", &self.postgres_database)
            .field("postgres_user", &self.postgres_user)
            .field("postgres_password", &"***REDACTED***")
            .field("interactions_table", &self.interactions_table)
            .field("ground_truth_table", &self.ground_truth_table)
            .field("tags_table", &self.tags_table)
            .finish()
    }
}

/// Configuration for evaluation outputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Root directory of the per-user and aggregate reports
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Directory trained model artifacts are cached in
    #[serde(default = "default_model_dir")]
    pub model_dir: String,

    /// Users with fewer interactions than this are reported as data-poor
    #[serde(default = "default_sufficiency_threshold")]
    pub sufficiency_threshold: usize,

    /// Show a per-user progress bar while a configuration runs
    #[serde(default = "default_show_progress")]
    pub show_progress: bool,
}

// Default implementations

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_storage_provider(),
            postgres_host: default_postgres_host(),
            postgres_port: default_postgres_port(),
            postgres_database: default_postgres_database(),
            postgres_user: default_postgres_user(),
            postgres_password: default_postgres_password(),
            interactions_table: default_interactions_table(),
            ground_truth_table: default_ground_truth_table(),
            tags_table: default_tags_table(),
        }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            model_dir: default_model_dir(),
            sufficiency_threshold: default_sufficiency_threshold(),
            show_progress: default_show_progress(),
        }
    }
}

impl StorageConfig {
    /// Postgres connection URL built from the individual settings
    pub fn postgres_url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.postgres_user,
            self.postgres_password,
            self.postgres_host,
            self.postgres_port,
            self.postgres_database
        )
    }
}

/// Validate a hostname to prevent host injection
///
/// Ensures the hostname does not contain protocol separators, credentials or paths.
fn validate_hostname(host: &str) -> Result<()> {
    if host.contains("://") || host.contains('@') || host.contains('/') {
        return Err(Error::config(format!(
            "Invalid hostname '{host}': contains forbidden characters"
        )));
    }
    if host.is_empty() {
        return Err(Error::config("Hostname cannot be empty".to_string()));
    }
    Ok(())
}

/// Validate a SQL identifier used as a table name
///
/// Table names are interpolated into queries, so only `[A-Za-z0-9_]` with an
/// optional single `schema.` prefix is accepted, within PostgreSQL's
/// 63-character limit per part.
pub fn validate_table_name(name: &str) -> Result<()> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() > 2 {
        return Err(Error::config(format!(
            "Invalid table name '{name}': at most one schema qualifier allowed"
        )));
    }
    for part in parts {
        if part.is_empty() {
            return Err(Error::config(format!(
                "Invalid table name '{name}': empty identifier"
            )));
        }
        if part.len() > 63 {
            return Err(Error::config(format!(
                "Invalid table name '{name}': identifier exceeds 63 characters"
            )));
        }
        if part.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(Error::config(format!(
                "Invalid table name '{name}': identifier cannot start with a digit"
            )));
        }
        if !part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(Error::config(format!(
                "Invalid table name '{name}': only alphanumeric and underscore allowed"
            )));
        }
    }
    Ok(())
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        let valid_providers = ["postgres"];
        if !valid_providers.contains(&self.storage.provider.as_str()) {
            return Err(Error::config(format!(
                "Invalid storage provider '{}'. Must be one of: {:?}",
                self.storage.provider, valid_providers
            )));
        }

        validate_hostname(&self.storage.postgres_host)?;
        validate_table_name(&self.storage.interactions_table)?;
        validate_table_name(&self.storage.ground_truth_table)?;
        validate_table_name(&self.storage.tags_table)?;

        if self.evaluation.sufficiency_threshold == 0 {
            return Err(Error::config(
                "evaluation.sufficiency_threshold must be greater than 0".to_string(),
            ));
        }
        if self.evaluation.output_dir.trim().is_empty() {
            return Err(Error::config(
                "evaluation.output_dir cannot be empty".to_string(),
            ));
        }
        if self.evaluation.model_dir.trim().is_empty() {
            return Err(Error::config(
                "evaluation.model_dir cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Serializes the configuration to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::config(format!("Failed to serialize config: {e}")))
    }
}
