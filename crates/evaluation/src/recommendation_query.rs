//! Top-N queries under the evaluation exclusion policy

use receval_core::{ItemId, ModelHandle, Result, UserId};
use std::collections::HashSet;

/// Queries a model with an explicitly empty exclusion set
///
/// Models exclude a user's own history by default. The evaluation compares
/// recommendations against held-out interactions, so nothing is excluded and
/// items the user already has remain eligible.
pub struct RecommendationQuery {
    model: ModelHandle,
}

impl RecommendationQuery {
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }

    /// Up to `count` item ids for `user` in the model's ranked order
    pub fn recommend(&self, user: UserId, count: usize) -> Result<Vec<ItemId>> {
        let nothing_excluded = HashSet::new();
        let scored = self.model.recommend(user, count, Some(&nothing_excluded))?;

        Ok(scored.into_iter().take(count).map(|s| s.item).collect())
    }
}
