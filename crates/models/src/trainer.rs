use crate::neighbourhood::{NeighbourBasis, NeighbourhoodModel};
use crate::similarity::{binary_neighbours, profile_neighbours};
use async_trait::async_trait;
use receval_core::{
    Algorithm, Error, ItemId, ModelHandle, ModelKey, ModelTrainer, Result, UserId,
};
use receval_storage::{Interaction, InteractionStore, TagAssignment};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Trains cosine-similarity neighbourhood models from the interaction store
///
/// - `ItemCf` keeps the `N` most similar items of every item
/// - `UserCf` keeps the `N` most similar users by shared items
/// - `WordPatternMining` keeps the `N` most similar users by tag usage
///
/// `Lda` is not supported and fails the build.
pub struct NeighbourhoodTrainer {
    store: Arc<dyn InteractionStore>,
}

impl NeighbourhoodTrainer {
    pub fn new(store: Arc<dyn InteractionStore>) -> Self {
        Self { store }
    }

    /// Train the model for `key` in memory
    pub async fn train(&self, key: ModelKey) -> Result<NeighbourhoodModel> {
        let k = key.neighbourhood_size;
        match key.algorithm {
            Algorithm::ItemCf => {
                let histories = group_histories(&self.store.interactions().await?);
                let neighbours = binary_neighbours(&invert(&histories), k);
                Ok(NeighbourhoodModel::new(
                    key,
                    NeighbourBasis::Item,
                    histories,
                    neighbours,
                ))
            }
            Algorithm::UserCf => {
                let histories = group_histories(&self.store.interactions().await?);
                let neighbours = binary_neighbours(&histories, k);
                Ok(NeighbourhoodModel::new(
                    key,
                    NeighbourBasis::User,
                    histories,
                    neighbours,
                ))
            }
            Algorithm::WordPatternMining => {
                let histories = group_histories(&self.store.interactions().await?);
                let profiles = tag_profiles(&self.store.user_tags().await?);
                debug!(users = profiles.len(), "Built tag profiles");
                let neighbours = profile_neighbours(&profiles, k);
                Ok(NeighbourhoodModel::new(
                    key,
                    NeighbourBasis::User,
                    histories,
                    neighbours,
                ))
            }
            Algorithm::Lda => Err(Error::model(format!(
                "{} training is not supported by the neighbourhood trainer",
                key.algorithm.description()
            ))),
        }
    }
}

#[async_trait]
impl ModelTrainer for NeighbourhoodTrainer {
    async fn build(&self, key: ModelKey, destination: &Path) -> Result<()> {
        let started = Instant::now();
        info!("Training model {key}");

        let model = self.train(key).await?;
        model.save(destination)?;

        info!(
            path = %destination.display(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Trained model {key}"
        );
        Ok(())
    }

    fn load(&self, key: ModelKey, path: &Path) -> Result<ModelHandle> {
        let model = NeighbourhoodModel::open(path)?;
        if model.key() != key {
            return Err(Error::model(format!(
                "Artifact {} holds model {}, expected {key}",
                path.display(),
                model.key()
            )));
        }
        Ok(Arc::new(model))
    }
}

/// Sorted, de-duplicated item history of every user
fn group_histories(rows: &[Interaction]) -> BTreeMap<UserId, Vec<ItemId>> {
    let mut grouped: BTreeMap<UserId, BTreeSet<ItemId>> = BTreeMap::new();
    for row in rows {
        grouped.entry(row.user).or_default().insert(row.item);
    }
    grouped
        .into_iter()
        .map(|(user, items)| (user, items.into_iter().collect()))
        .collect()
}

/// Users of every item, from user histories
fn invert(histories: &BTreeMap<UserId, Vec<ItemId>>) -> BTreeMap<ItemId, Vec<UserId>> {
    let mut inverted: BTreeMap<ItemId, Vec<UserId>> = BTreeMap::new();
    for (&user, items) in histories {
        for &item in items {
            inverted.entry(item).or_default().push(user);
        }
    }
    inverted
}

/// How often each user applied each tag
fn tag_profiles(tags: &[TagAssignment]) -> BTreeMap<UserId, HashMap<i64, f64>> {
    let mut profiles: BTreeMap<UserId, HashMap<i64, f64>> = BTreeMap::new();
    for assignment in tags {
        *profiles
            .entry(assignment.user)
            .or_default()
            .entry(assignment.tag)
            .or_default() += 1.0;
    }
    profiles
}

#[cfg(test)]
mod tests {
    use super::*;
    use receval_core::RecommendationModel;
    use receval_storage::MockInteractionStore;
    use std::collections::HashSet;

    fn store() -> Arc<dyn InteractionStore> {
        let rows = [(1, 10), (1, 11), (2, 10), (2, 11), (2, 12), (3, 13)]
            .into_iter()
            .map(|(user, item)| Interaction::new(user, item))
            .collect();
        let tags = vec![
            TagAssignment::new(1, 10, 500),
            TagAssignment::new(3, 13, 500),
            TagAssignment::new(2, 12, 600),
        ];
        Arc::new(MockInteractionStore::new(rows).with_tags(tags))
    }

    #[test]
    fn test_group_histories_dedupes_and_sorts() {
        let rows = vec![
            Interaction::new(1, 3),
            Interaction::new(1, 1),
            Interaction::new(1, 3),
        ];
        let grouped = group_histories(&rows);
        assert_eq!(grouped[&1], vec![1, 3]);
    }

    #[tokio::test]
    async fn test_item_cf_recommends_co_occurring_items() {
        let trainer = NeighbourhoodTrainer::new(store());
        let model = trainer
            .train(ModelKey::new(Algorithm::ItemCf, 5))
            .await
            .unwrap();
        assert_eq!(model.basis(), NeighbourBasis::Item);

        let recommended = model.recommend(1, 5, None).unwrap();
        let items: Vec<ItemId> = recommended.iter().map(|s| s.item).collect();
        assert_eq!(items, vec![12]);
    }

    #[tokio::test]
    async fn test_user_cf_neighbours_share_items() {
        let trainer = NeighbourhoodTrainer::new(store());
        let model = trainer
            .train(ModelKey::new(Algorithm::UserCf, 1))
            .await
            .unwrap();
        let neighbours = model.neighbours_of(1);
        assert_eq!(neighbours.len(), 1);
        assert_eq!(neighbours[0].id, 2);
        assert!(model.neighbours_of(3).is_empty());
    }

    #[tokio::test]
    async fn test_word_pattern_uses_tag_profiles() {
        let trainer = NeighbourhoodTrainer::new(store());
        let model = trainer
            .train(ModelKey::new(Algorithm::WordPatternMining, 3))
            .await
            .unwrap();
        let neighbours = model.neighbours_of(1);
        assert_eq!(neighbours.len(), 1);
        assert_eq!(neighbours[0].id, 3);

        let recommended = model.recommend(1, 5, Some(&HashSet::new())).unwrap();
        let items: Vec<ItemId> = recommended.iter().map(|s| s.item).collect();
        assert_eq!(items, vec![13]);
    }

    #[tokio::test]
    async fn test_lda_is_rejected() {
        let trainer = NeighbourhoodTrainer::new(store());
        let result = trainer.train(ModelKey::new(Algorithm::Lda, 5)).await;
        assert!(matches!(result, Err(Error::Model(_))));
    }

    #[tokio::test]
    async fn test_build_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let key = ModelKey::new(Algorithm::UserCf, 2);
        let path = dir.path().join(key.artifact_file_name());

        let trainer = NeighbourhoodTrainer::new(store());
        trainer.build(key, &path).await.unwrap();
        assert!(path.exists());

        let handle = trainer.load(key, &path).unwrap();
        let recommended = handle.recommend(1, 5, None).unwrap();
        assert_eq!(recommended.len(), 1);
        assert_eq!(recommended[0].item, 12);
    }

    #[tokio::test]
    async fn test_load_rejects_mismatched_key() {
        let dir = tempfile::tempdir().unwrap();
        let key = ModelKey::new(Algorithm::UserCf, 2);
        let path = dir.path().join(key.artifact_file_name());

        let trainer = NeighbourhoodTrainer::new(store());
        trainer.build(key, &path).await.unwrap();

        let other = ModelKey::new(Algorithm::UserCf, 3);
        assert!(matches!(trainer.load(other, &path), Err(Error::Model(_))));
    }

    #[tokio::test]
    async fn test_build_propagates_store_failure() {
        let store = MockInteractionStore::new(vec![Interaction::new(1, 10)]);
        store.close().await;
        let trainer = NeighbourhoodTrainer::new(Arc::new(store));

        let dir = tempfile::tempdir().unwrap();
        let key = ModelKey::new(Algorithm::ItemCf, 2);
        let result = trainer.build(key, &dir.path().join("model.json")).await;
        assert!(matches!(result, Err(Error::Storage(_))));
    }
}
