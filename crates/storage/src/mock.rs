// In-memory store shared by the test suites of the workspace crates
use crate::{Interaction, InteractionStore, TagAssignment};
use async_trait::async_trait;
use receval_core::{Error, ItemId, UserId};
use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct MockInteractionStore {
    interactions: Vec<Interaction>,
    ground_truth: Vec<Interaction>,
    tags: Vec<TagAssignment>,
    unreachable_user: Option<UserId>,
    closed: AtomicBool,
    close_calls: AtomicUsize,
}

impl MockInteractionStore {
    /// Create a store whose held-out comparison rows are the training rows
    pub fn new(interactions: Vec<Interaction>) -> Self {
        Self {
            ground_truth: interactions.clone(),
            interactions,
            ..Default::default()
        }
    }

    /// Use a separate set of held-out rows for users and ground truth
    pub fn with_ground_truth(mut self, ground_truth: Vec<Interaction>) -> Self {
        self.ground_truth = ground_truth;
        self
    }

    pub fn with_tags(mut self, tags: Vec<TagAssignment>) -> Self {
        self.tags = tags;
        self
    }

    /// Make every query about `user` fail as if the connection dropped
    pub fn with_unreachable_user(mut self, user: UserId) -> Self {
        self.unreachable_user = Some(user);
        self
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    fn check_open(&self) -> Result<(), Error> {
        if self.is_closed() {
            return Err(Error::storage("Connection already closed"));
        }
        Ok(())
    }

    fn check_user(&self, user: UserId) -> Result<(), Error> {
        self.check_open()?;
        if self.unreachable_user == Some(user) {
            return Err(Error::storage(format!(
                "Connection lost while querying user {user}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl InteractionStore for MockInteractionStore {
    async fn list_users(&self) -> Result<Vec<UserId>, Error> {
        self.check_open()?;
        let users: BTreeSet<UserId> = self.ground_truth.iter().map(|i| i.user).collect();
        Ok(users.into_iter().collect())
    }

    async fn ground_truth(&self, user: UserId) -> Result<HashSet<ItemId>, Error> {
        self.check_user(user)?;
        Ok(self
            .ground_truth
            .iter()
            .filter(|i| i.user == user)
            .map(|i| i.item)
            .collect())
    }

    async fn data_count(&self, user: UserId) -> Result<usize, Error> {
        self.check_user(user)?;
        Ok(self.interactions.iter().filter(|i| i.user == user).count())
    }

    async fn interactions(&self) -> Result<Vec<Interaction>, Error> {
        self.check_open()?;
        Ok(self.interactions.clone())
    }

    async fn user_tags(&self) -> Result<Vec<TagAssignment>, Error> {
        self.check_open()?;
        Ok(self.tags.clone())
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(pairs: &[(UserId, ItemId)]) -> Vec<Interaction> {
        pairs
            .iter()
            .map(|&(user, item)| Interaction::new(user, item))
            .collect()
    }

    #[tokio::test]
    async fn test_users_come_from_ground_truth_in_order() {
        let store = MockInteractionStore::new(rows(&[(3, 1), (1, 2), (2, 3)]))
            .with_ground_truth(rows(&[(9, 1), (3, 1), (3, 4)]));

        assert_eq!(store.list_users().await.unwrap(), vec![3, 9]);
        let truth = store.ground_truth(3).await.unwrap();
        assert_eq!(truth, HashSet::from([1, 4]));
    }

    #[tokio::test]
    async fn test_data_count_counts_training_rows() {
        let store = MockInteractionStore::new(rows(&[(1, 10), (1, 11), (1, 10), (2, 10)]));
        assert_eq!(store.data_count(1).await.unwrap(), 3);
        assert_eq!(store.data_count(2).await.unwrap(), 1);
        assert_eq!(store.data_count(42).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_user_fails() {
        let store = MockInteractionStore::new(rows(&[(1, 10)])).with_unreachable_user(1);
        assert!(matches!(
            store.ground_truth(1).await,
            Err(Error::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_queries_fail_after_close() {
        let store = MockInteractionStore::new(rows(&[(1, 10)]));
        store.close().await;
        assert!(store.is_closed());
        assert_eq!(store.close_calls(), 1);
        assert!(store.list_users().await.is_err());
    }
}
