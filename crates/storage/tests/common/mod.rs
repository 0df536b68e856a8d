//! Test utilities for storage layer integration tests

use anyhow::{Context, Result};
use receval_core::config::StorageConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Connection, PgConnection};
use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::postgres::Postgres;

/// Postgres container seeded with a small interaction data set
pub struct TestPostgres {
    _container: ContainerAsync<Postgres>,
    port: u16,
}

impl TestPostgres {
    /// Start a new Postgres instance
    pub async fn start() -> Result<Self> {
        let container = Postgres::default()
            .with_user("capstone")
            .with_password("capstone")
            .with_db_name("capstone")
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let port = container
            .get_host_port_ipv4(5432)
            .await
            .context("Failed to get Postgres port")?;

        Ok(Self {
            _container: container,
            port,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

/// Create a StorageConfig pointing at the test container
pub fn create_storage_config(postgres_port: u16) -> StorageConfig {
    StorageConfig {
        postgres_port,
        ..StorageConfig::default()
    }
}

/// Create the ratings, comparison and tag tables and fill them
///
/// Columns are INTEGER so the BIGINT casts in the queries are exercised.
pub async fn seed_tables(config: &StorageConfig) -> Result<()> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&config.postgres_url())
        .await
        .context("Failed to connect for seeding")?;

    let statements = [
        "CREATE TABLE movie_ratings_final (user_id INTEGER NOT NULL, item_id INTEGER NOT NULL)",
        "CREATE TABLE comparison (user_id INTEGER NOT NULL, item_id INTEGER NOT NULL)",
        "CREATE TABLE movie_tags (user_id INTEGER NOT NULL, item_id INTEGER NOT NULL, tag_id INTEGER NOT NULL)",
        "INSERT INTO movie_ratings_final VALUES (1, 10), (1, 11), (1, 12), (2, 10), (2, 13), (3, 14)",
        "INSERT INTO comparison VALUES (2, 10), (2, 14), (1, 12), (2, 10)",
        "INSERT INTO movie_tags VALUES (1, 10, 100), (1, 11, 101), (2, 13, 100)",
    ];
    for statement in statements {
        sqlx::query(statement)
            .execute(&pool)
            .await
            .with_context(|| format!("Failed to run: {statement}"))?;
    }

    pool.close().await;
    Ok(())
}

/// Kill every other session on the test database from a fresh connection
pub async fn terminate_other_backends(config: &StorageConfig) -> Result<()> {
    let mut connection = PgConnection::connect(&config.postgres_url())
        .await
        .context("Failed to connect as administrator")?;

    sqlx::query(
        "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
         WHERE datname = current_database() AND pid <> pg_backend_pid()",
    )
    .execute(&mut connection)
    .await
    .context("Failed to terminate backends")?;

    connection.close().await?;
    Ok(())
}
