use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Identifier of a user in the interaction store
pub type UserId = i64;

/// Identifier of an item (movie) in the interaction store
pub type ItemId = i64;

/// Recommendation algorithm selector
///
/// Parses from the operator's numeric menu selector (`1`-`4`) or from the
/// slug, which is also the report directory name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum Algorithm {
    /// Item-based collaborative filtering
    #[serde(rename = "itemcf")]
    #[strum(to_string = "itemcf", serialize = "1")]
    ItemCf,
    /// User-based collaborative filtering
    #[serde(rename = "usercf")]
    #[strum(to_string = "usercf", serialize = "2")]
    UserCf,
    /// Latent Dirichlet Allocation topic model
    #[serde(rename = "lda")]
    #[strum(to_string = "lda", serialize = "3")]
    Lda,
    /// Word-based pattern mining over user tag profiles
    #[serde(rename = "wordpattern")]
    #[strum(to_string = "wordpattern", serialize = "4")]
    WordPatternMining,
}

impl Algorithm {
    /// Numeric selector shown in the operator menu
    pub fn selector(self) -> u8 {
        match self {
            Self::ItemCf => 1,
            Self::UserCf => 2,
            Self::Lda => 3,
            Self::WordPatternMining => 4,
        }
    }

    /// Human readable name for menus and logs
    pub fn description(self) -> &'static str {
        match self {
            Self::ItemCf => "Item-based CF",
            Self::UserCf => "User-based CF",
            Self::Lda => "LDA",
            Self::WordPatternMining => "Word-based Pattern Mining",
        }
    }
}

/// Cache key of a trained model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelKey {
    pub algorithm: Algorithm,
    pub neighbourhood_size: usize,
}

impl ModelKey {
    pub fn new(algorithm: Algorithm, neighbourhood_size: usize) -> Self {
        Self {
            algorithm,
            neighbourhood_size,
        }
    }

    /// File name of the persisted artifact for this key
    pub fn artifact_file_name(&self) -> String {
        format!("{}_neighbours{}.json", self.algorithm, self.neighbourhood_size)
    }
}

impl std::fmt::Display for ModelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} neighbours)", self.algorithm, self.neighbourhood_size)
    }
}

/// One point of the evaluation grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Configuration {
    algorithm: Algorithm,
    neighbourhood_size: usize,
    recommendation_count: usize,
}

impl Configuration {
    /// Creates a configuration, rejecting zero sizes and counts
    pub fn new(
        algorithm: Algorithm,
        neighbourhood_size: usize,
        recommendation_count: usize,
    ) -> Result<Self> {
        if neighbourhood_size == 0 {
            return Err(Error::invalid_input(
                "neighbourhood size must be greater than 0",
            ));
        }
        if recommendation_count == 0 {
            return Err(Error::invalid_input(
                "recommendation count must be greater than 0",
            ));
        }
        Ok(Self {
            algorithm,
            neighbourhood_size,
            recommendation_count,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn neighbourhood_size(&self) -> usize {
        self.neighbourhood_size
    }

    pub fn recommendation_count(&self) -> usize {
        self.recommendation_count
    }

    pub fn model_key(&self) -> ModelKey {
        ModelKey::new(self.algorithm, self.neighbourhood_size)
    }
}

impl std::fmt::Display for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} neighbours and {} recommendations {}",
            self.neighbourhood_size,
            self.recommendation_count,
            self.algorithm.description()
        )
    }
}

/// An item returned by a model together with its ranking score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub item: ItemId,
    pub score: f64,
}

impl ScoredItem {
    pub fn new(item: ItemId, score: f64) -> Self {
        Self { item, score }
    }
}
