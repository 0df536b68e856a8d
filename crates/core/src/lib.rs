//! Core types and traits for the receval evaluation harness
//!
//! This crate provides the foundational abstractions used throughout the
//! receval system, including:
//!
//! - **Entities**: algorithm selectors, evaluation configurations and model keys
//! - **Model API**: the trainer and recommendation traits models implement
//! - **Configuration**: system configuration management
//! - **Error handling**: unified error types
//!

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod config;
pub mod entities;
pub mod error;
pub mod model_api;

// Re-export main types for convenience
pub use config::{Config, EvaluationConfig, StorageConfig};
pub use entities::{Algorithm, Configuration, ItemId, ModelKey, ScoredItem, UserId};
pub use error::{Error, Result, ResultExt};
pub use model_api::{ModelHandle, ModelTrainer, RecommendationModel};

