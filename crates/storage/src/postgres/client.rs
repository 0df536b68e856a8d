use crate::error::StorageError;
use crate::{Interaction, InteractionStore, TagAssignment};
use async_trait::async_trait;
use receval_core::config::{validate_table_name, StorageConfig};
use receval_core::error::{Error, Result};
use receval_core::{ItemId, UserId};
use sqlx::{Connection, PgConnection};
use std::collections::HashSet;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Interaction store backed by a single Postgres connection
///
/// The connection is opened eagerly and reused for every query. A broken
/// connection is not re-established: later queries fail with a storage error.
/// [`InteractionStore::close`] closes it once; queries after that fail too.
pub struct PostgresInteractionStore {
    connection: Mutex<Option<PgConnection>>,
    interactions_table: String,
    ground_truth_table: String,
    tags_table: String,
}

impl PostgresInteractionStore {
    /// Wrap an open connection, validating the configured table names
    pub fn new(connection: PgConnection, config: &StorageConfig) -> Result<Self> {
        for table in [
            &config.interactions_table,
            &config.ground_truth_table,
            &config.tags_table,
        ] {
            validate_table_name(table)
                .map_err(|e| StorageError::InvalidConfig(e.to_string()))?;
        }

        Ok(Self {
            connection: Mutex::new(Some(connection)),
            interactions_table: config.interactions_table.clone(),
            ground_truth_table: config.ground_truth_table.clone(),
            tags_table: config.tags_table.clone(),
        })
    }

    /// Open the connection described by `config`
    pub async fn connect(config: &StorageConfig) -> Result<Self> {
        info!(
            "Connecting to Postgres at {}:{}/{}",
            config.postgres_host, config.postgres_port, config.postgres_database
        );

        let connection = PgConnection::connect(&config.postgres_url())
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        Self::new(connection, config)
    }

    async fn lock(&self) -> MutexGuard<'_, Option<PgConnection>> {
        self.connection.lock().await
    }
}

fn query_failed(what: &str, e: sqlx::Error) -> Error {
    StorageError::QueryFailed(format!("{what}: {e}")).into()
}

#[async_trait]
impl InteractionStore for PostgresInteractionStore {
    async fn list_users(&self) -> Result<Vec<UserId>> {
        let sql = format!(
            "SELECT DISTINCT user_id::BIGINT FROM {} ORDER BY 1",
            self.ground_truth_table
        );
        let mut guard = self.lock().await;
        let connection = guard.as_mut().ok_or(StorageError::Closed)?;
        let users: Vec<i64> = sqlx::query_scalar(&sql)
            .fetch_all(connection)
            .await
            .map_err(|e| query_failed("Failed to list users", e))?;

        debug!(count = users.len(), "Fetched user snapshot");
        Ok(users)
    }

    async fn ground_truth(&self, user: UserId) -> Result<HashSet<ItemId>> {
        let sql = format!(
            "SELECT item_id::BIGINT FROM {} WHERE user_id = $1",
            self.ground_truth_table
        );
        let mut guard = self.lock().await;
        let connection = guard.as_mut().ok_or(StorageError::Closed)?;
        let items: Vec<i64> = sqlx::query_scalar(&sql)
            .bind(user)
            .fetch_all(connection)
            .await
            .map_err(|e| query_failed("Failed to fetch ground truth", e))?;

        Ok(items.into_iter().collect())
    }

    async fn data_count(&self, user: UserId) -> Result<usize> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE user_id = $1",
            self.interactions_table
        );
        let mut guard = self.lock().await;
        let connection = guard.as_mut().ok_or(StorageError::Closed)?;
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(user)
            .fetch_one(connection)
            .await
            .map_err(|e| query_failed("Failed to count user data", e))?;

        usize::try_from(count)
            .map_err(|_| StorageError::QueryFailed(format!("Negative row count {count}")).into())
    }

    async fn interactions(&self) -> Result<Vec<Interaction>> {
        let sql = format!(
            "SELECT user_id::BIGINT, item_id::BIGINT FROM {}",
            self.interactions_table
        );
        let mut guard = self.lock().await;
        let connection = guard.as_mut().ok_or(StorageError::Closed)?;
        let rows: Vec<(i64, i64)> = sqlx::query_as(&sql)
            .fetch_all(connection)
            .await
            .map_err(|e| query_failed("Failed to fetch interactions", e))?;

        debug!(count = rows.len(), "Fetched interactions");
        Ok(rows
            .into_iter()
            .map(|(user, item)| Interaction::new(user, item))
            .collect())
    }

    async fn user_tags(&self) -> Result<Vec<TagAssignment>> {
        let sql = format!(
            "SELECT user_id::BIGINT, item_id::BIGINT, tag_id::BIGINT FROM {}",
            self.tags_table
        );
        let mut guard = self.lock().await;
        let connection = guard.as_mut().ok_or(StorageError::Closed)?;
        let rows: Vec<(i64, i64, i64)> = sqlx::query_as(&sql)
            .fetch_all(connection)
            .await
            .map_err(|e| query_failed("Failed to fetch user tags", e))?;

        debug!(count = rows.len(), "Fetched tag assignments");
        Ok(rows
            .into_iter()
            .map(|(user, item, tag)| TagAssignment::new(user, item, tag))
            .collect())
    }

    async fn close(&self) {
        let Some(connection) = self.lock().await.take() else {
            return;
        };
        info!("Closing Postgres connection");
        if let Err(e) = connection.close().await {
            warn!("Postgres connection did not close cleanly: {e}");
        }
    }
}
