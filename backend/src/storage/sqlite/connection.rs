use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::storage::error::StorageResult;
use crate::storage::sqlite::unit_of_work::SqliteUnitOfWork;
use crate::storage::traits::Connection;

// The database URL for the production database
pub const DATABASE_URL: &str = "sqlite:applicants.db";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// DbConnection owns the SQLite connection pool shared by every request
#[derive(Clone)]
pub struct DbConnection {
    pool: SqlitePool,
}

impl DbConnection {
    /// Create a new database connection, creating the database file if needed
    pub async fn new(url: &str, max_connections: u32) -> StorageResult<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;
        info!(url, max_connections, "SQLite database ready");

        Ok(Self { pool })
    }

    /// Initialize the standard database
    pub async fn init() -> StorageResult<Self> {
        Self::new(DATABASE_URL, DEFAULT_MAX_CONNECTIONS).await
    }

    /// Initialize a private in-memory database for tests
    #[cfg(test)]
    pub async fn init_test() -> StorageResult<Self> {
        // Each `sqlite::memory:` options value gets its own shared-cache
        // database; it lives as long as one pooled connection stays open.
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Self::setup_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Set up the required database schema
    async fn setup_schema(pool: &SqlitePool) -> StorageResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS applicants (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT CHECK (name IS NULL OR length(name) <= 100),
                family_name TEXT NOT NULL
                    CHECK (length(trim(family_name)) > 0 AND length(family_name) <= 100),
                address TEXT CHECK (address IS NULL OR length(address) <= 200),
                country_of_origin TEXT
                    CHECK (country_of_origin IS NULL OR length(country_of_origin) <= 100),
                email_address TEXT
                    CHECK (email_address IS NULL OR length(email_address) <= 100),
                age INTEGER NOT NULL,
                hired BOOLEAN NOT NULL DEFAULT FALSE
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

impl Connection for DbConnection {
    type UnitOfWork = SqliteUnitOfWork;

    fn unit_of_work(&self) -> SqliteUnitOfWork {
        SqliteUnitOfWork::new(self.pool.clone())
    }
}
