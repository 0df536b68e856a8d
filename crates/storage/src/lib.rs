#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

//! Read-only access to the interaction store the harness evaluates against.

pub mod error;
mod factory;
mod mock;
pub mod postgres;

pub use error::StorageError;
pub use factory::create_interaction_store;
pub use mock::MockInteractionStore;
pub use postgres::PostgresInteractionStore;

use async_trait::async_trait;
use receval_core::{Error, ItemId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ==== Traits ====

/// Queries the evaluation harness and the default trainers issue against the store
///
/// Every method is read-only. Implementations hold a single connection for
/// the lifetime of the process.
#[async_trait]
pub trait InteractionStore: Send + Sync {
    /// Distinct users with at least one ground-truth interaction, ascending
    async fn list_users(&self) -> Result<Vec<UserId>, Error>;

    /// Items the user interacted with in the held-out comparison data
    async fn ground_truth(&self, user: UserId) -> Result<HashSet<ItemId>, Error>;

    /// Number of interaction rows recorded for the user
    async fn data_count(&self, user: UserId) -> Result<usize, Error>;

    /// Every (user, item) interaction row models are trained on
    async fn interactions(&self) -> Result<Vec<Interaction>, Error>;

    /// Every tag a user applied to an item
    async fn user_tags(&self) -> Result<Vec<TagAssignment>, Error>;

    /// Close the underlying connection
    async fn close(&self);
}

// ==== Models ====

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interaction {
    pub user: UserId,
    pub item: ItemId,
}

impl Interaction {
    pub fn new(user: UserId, item: ItemId) -> Self {
        Self { user, item }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagAssignment {
    pub user: UserId,
    pub item: ItemId,
    pub tag: i64,
}

impl TagAssignment {
    pub fn new(user: UserId, item: ItemId, tag: i64) -> Self {
        Self { user, item, tag }
    }
}
