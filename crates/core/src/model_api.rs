//! Model collaborator traits
//!
//! The evaluation harness treats model training and querying as opaque
//! capabilities. Implementations live in the models crate; tests supply their
//! own.

use crate::entities::{ItemId, ModelKey, ScoredItem, UserId};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Shared handle to a loaded model
pub type ModelHandle = Arc<dyn RecommendationModel>;

/// Trains models and restores them from persisted artifacts
#[async_trait]
pub trait ModelTrainer: Send + Sync {
    /// Train a model for `key` and write its artifact to `destination`
    async fn build(&self, key: ModelKey, destination: &Path) -> Result<()>;

    /// Load a previously persisted artifact
    fn load(&self, key: ModelKey, path: &Path) -> Result<ModelHandle>;
}

/// Top-N query capability of a trained model
pub trait RecommendationModel: Send + Sync {
    /// Return up to `count` items for `user`, best first.
    ///
    /// `exclude` of `None` applies the model's default exclusion, which for
    /// most models is the user's own history. `Some` replaces it entirely.
    fn recommend(
        &self,
        user: UserId,
        count: usize,
        exclude: Option<&HashSet<ItemId>>,
    ) -> Result<Vec<ScoredItem>>;
}
