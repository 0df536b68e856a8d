//! Integration tests for the Postgres interaction store

mod common;

use anyhow::Result;
use common::*;
use receval_core::Error;
use receval_storage::{
    create_interaction_store, Interaction, InteractionStore, PostgresInteractionStore,
};
use std::collections::HashSet;

#[tokio::test]
#[ignore] // Requires Docker
async fn test_reads_users_ground_truth_and_counts() -> Result<()> {
    let postgres = TestPostgres::start().await?;
    let mut config = create_storage_config(postgres.port());
    config.ground_truth_table = "comparison".to_string();
    seed_tables(&config).await?;

    let store = create_interaction_store(&config).await?;

    assert_eq!(store.list_users().await?, vec![1, 2]);
    assert_eq!(store.ground_truth(2).await?, HashSet::from([10, 14]));
    assert_eq!(store.data_count(1).await?, 3);
    assert_eq!(store.data_count(99).await?, 0);

    let interactions = store.interactions().await?;
    assert_eq!(interactions.len(), 6);
    assert!(interactions.contains(&Interaction::new(3, 14)));

    let tags = store.user_tags().await?;
    assert_eq!(tags.len(), 3);

    store.close().await;
    Ok(())
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_queries_fail_after_close() -> Result<()> {
    let postgres = TestPostgres::start().await?;
    let config = create_storage_config(postgres.port());
    seed_tables(&config).await?;

    let store = PostgresInteractionStore::connect(&config).await?;
    store.close().await;

    let result = store.list_users().await;
    assert!(matches!(result, Err(Error::Storage(ref message)) if message.contains("closed")));
    assert!(matches!(store.data_count(1).await, Err(Error::Storage(_))));

    // a second close finds nothing to close
    store.close().await;
    Ok(())
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_terminated_connection_is_not_reopened() -> Result<()> {
    let postgres = TestPostgres::start().await?;
    let config = create_storage_config(postgres.port());
    seed_tables(&config).await?;

    let store = PostgresInteractionStore::connect(&config).await?;
    assert_eq!(store.list_users().await?, vec![1, 2]);

    terminate_other_backends(&config).await?;

    assert!(matches!(store.list_users().await, Err(Error::Storage(_))));
    assert!(matches!(store.list_users().await, Err(Error::Storage(_))));

    store.close().await;
    Ok(())
}

#[tokio::test]
#[ignore] // Requires Docker
async fn test_missing_table_is_a_storage_error() -> Result<()> {
    let postgres = TestPostgres::start().await?;
    let mut config = create_storage_config(postgres.port());
    config.ground_truth_table = "does_not_exist".to_string();

    let store = PostgresInteractionStore::connect(&config).await?;
    let result = store.list_users().await;
    assert!(matches!(result, Err(Error::Storage(_))));

    store.close().await;
    Ok(())
}
