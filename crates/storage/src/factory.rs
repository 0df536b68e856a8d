use crate::{InteractionStore, PostgresInteractionStore};
use receval_core::{config::StorageConfig, Error};
use std::sync::Arc;

/// Creates an interaction store based on configuration.
///
/// This is the primary factory function for creating stores. It returns a
/// trait object that hides implementation details. Postgres is the only
/// provider; the in-memory [`MockInteractionStore`](crate::MockInteractionStore)
/// is constructed directly by tests and never selected from configuration.
///
/// # Arguments
/// * `config` - Storage configuration specifying provider type and connection details
///
/// # Errors
/// Returns an error if the provider is unknown or the connection cannot be opened.
/// There is no retry: a store that cannot be reached aborts the evaluation.
///
/// # Example
/// ```ignore
/// let config = StorageConfig::default();
/// let store = create_interaction_store(&config).await?;
/// let users = store.list_users().await?;
/// ```
pub async fn create_interaction_store(
    config: &StorageConfig,
) -> Result<Arc<dyn InteractionStore>, Error> {
    match config.provider.as_str() {
        "postgres" => {
            let store = PostgresInteractionStore::connect(config).await?;
            Ok(Arc::new(store) as Arc<dyn InteractionStore>)
        }
        other => Err(Error::config(format!(
            "Unknown storage provider '{other}'"
        ))),
    }
}
