use crate::similarity::Neighbour;
use receval_core::{Error, ItemId, ModelKey, RecommendationModel, Result, ScoredItem, UserId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// What the neighbour lists of a model relate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighbourBasis {
    /// Item to similar items
    Item,
    /// User to similar users
    User,
}

/// A trained neighbourhood model and its persisted form
///
/// Scores for a user are summed similarities: for item-based models the
/// neighbours of each history item vote for themselves, for user-based models
/// each neighbouring user votes for everything in their history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighbourhoodModel {
    key: ModelKey,
    basis: NeighbourBasis,
    histories: BTreeMap<UserId, Vec<ItemId>>,
    neighbours: BTreeMap<i64, Vec<Neighbour>>,
}

impl NeighbourhoodModel {
    pub fn new(
        key: ModelKey,
        basis: NeighbourBasis,
        histories: BTreeMap<UserId, Vec<ItemId>>,
        neighbours: BTreeMap<i64, Vec<Neighbour>>,
    ) -> Self {
        Self {
            key,
            basis,
            histories,
            neighbours,
        }
    }

    pub fn key(&self) -> ModelKey {
        self.key
    }

    pub fn basis(&self) -> NeighbourBasis {
        self.basis
    }

    pub fn neighbours_of(&self, id: i64) -> &[Neighbour] {
        self.neighbours.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Write the model as JSON to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)
            .map_err(|e| Error::model(format!("Failed to serialize model {}: {e}", self.key)))?;
        writer.flush()?;
        Ok(())
    }

    /// Read a model previously written by [`NeighbourhoodModel::save`]
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            Error::model(format!(
                "Failed to parse model artifact {}: {e}",
                path.display()
            ))
        })
    }

    fn history(&self, user: UserId) -> &[ItemId] {
        self.histories.get(&user).map(Vec::as_slice).unwrap_or_default()
    }

    fn scores(&self, user: UserId) -> HashMap<ItemId, f64> {
        let mut scores: HashMap<ItemId, f64> = HashMap::new();
        match self.basis {
            NeighbourBasis::Item => {
                for &seen in self.history(user) {
                    for neighbour in self.neighbours_of(seen) {
                        *scores.entry(neighbour.id).or_default() += neighbour.similarity;
                    }
                }
            }
            NeighbourBasis::User => {
                for neighbour in self.neighbours_of(user) {
                    for &item in self.history(neighbour.id) {
                        *scores.entry(item).or_default() += neighbour.similarity;
                    }
                }
            }
        }
        scores
    }
}

impl RecommendationModel for NeighbourhoodModel {
    fn recommend(
        &self,
        user: UserId,
        count: usize,
        exclude: Option<&HashSet<ItemId>>,
    ) -> Result<Vec<ScoredItem>> {
        let mut scores = self.scores(user);
        match exclude {
            Some(excluded) => scores.retain(|item, _| !excluded.contains(item)),
            None => {
                for item in self.history(user) {
                    scores.remove(item);
                }
            }
        }

        let mut ranked: Vec<ScoredItem> = scores
            .into_iter()
            .map(|(item, score)| ScoredItem::new(item, score))
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.item.cmp(&b.item)));
        ranked.truncate(count);
        Ok(ranked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use receval_core::Algorithm;

    fn item_model() -> NeighbourhoodModel {
        NeighbourhoodModel::new(
            ModelKey::new(Algorithm::ItemCf, 2),
            NeighbourBasis::Item,
            BTreeMap::from([(1, vec![10, 11])]),
            BTreeMap::from([
                (
                    10,
                    vec![
                        Neighbour { id: 11, similarity: 0.9 },
                        Neighbour { id: 12, similarity: 0.5 },
                    ],
                ),
                (11, vec![Neighbour { id: 13, similarity: 0.4 }]),
            ]),
        )
    }

    fn items(recommended: &[ScoredItem]) -> Vec<ItemId> {
        recommended.iter().map(|s| s.item).collect()
    }

    #[test]
    fn test_default_exclusion_drops_history() {
        let model = item_model();
        let recommended = model.recommend(1, 10, None).unwrap();
        assert_eq!(items(&recommended), vec![12, 13]);
    }

    #[test]
    fn test_explicit_empty_exclusion_keeps_history() {
        let model = item_model();
        let recommended = model.recommend(1, 10, Some(&HashSet::new())).unwrap();
        assert_eq!(items(&recommended), vec![11, 12, 13]);
    }

    #[test]
    fn test_recommend_truncates_to_count() {
        let model = item_model();
        let recommended = model.recommend(1, 1, Some(&HashSet::new())).unwrap();
        assert_eq!(items(&recommended), vec![11]);
    }

    #[test]
    fn test_unknown_user_gets_nothing() {
        let model = item_model();
        assert!(model.recommend(99, 5, None).unwrap().is_empty());
    }

    #[test]
    fn test_user_basis_votes_with_neighbour_history() {
        let model = NeighbourhoodModel::new(
            ModelKey::new(Algorithm::UserCf, 2),
            NeighbourBasis::User,
            BTreeMap::from([(1, vec![10]), (2, vec![10, 20]), (3, vec![30])]),
            BTreeMap::from([(
                1,
                vec![
                    Neighbour { id: 2, similarity: 0.7 },
                    Neighbour { id: 3, similarity: 0.2 },
                ],
            )]),
        );
        let recommended = model.recommend(1, 5, None).unwrap();
        assert_eq!(items(&recommended), vec![20, 30]);
    }

    #[test]
    fn test_save_and_open_preserve_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("itemcf_neighbours2.json");
        let model = item_model();
        model.save(&path).unwrap();

        let reopened = NeighbourhoodModel::open(&path).unwrap();
        assert_eq!(reopened, model);
    }

    #[test]
    fn test_open_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            NeighbourhoodModel::open(&path),
            Err(Error::Model(_))
        ));
    }
}
