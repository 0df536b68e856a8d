//! Neighbourhood collaborative filtering models
//!
//! Provides the default [`ModelTrainer`](receval_core::ModelTrainer) used by
//! the evaluation harness. Models are trained from the interaction store and
//! persisted as JSON artifacts.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod neighbourhood;
pub mod similarity;
mod trainer;

pub use neighbourhood::{NeighbourBasis, NeighbourhoodModel};
pub use similarity::Neighbour;
pub use trainer::NeighbourhoodTrainer;
