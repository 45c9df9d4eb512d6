//! SQLite database service
//!
//! Owns the connection pool and the schema; the user and todo stores
//! borrow the pool from here.

use sqlx::{sqlite::SqliteConnectOptions, sqlite::SqlitePoolOptions, SqlitePool};
use std::str::FromStr;
use tasklist_core::{storage_error, TasklistResult};
use tracing::{debug, info};

const COMPONENT: &str = "database";

/// Database service over a SQLite pool
#[derive(Debug)]
pub struct DatabaseService {
    pool: SqlitePool,
}

impl DatabaseService {
    /// Connect and create the schema.
    ///
    /// In-memory databases are pinned to a single connection: every
    /// pooled connection would otherwise see its own empty database.
    pub async fn new(database_url: &str) -> TasklistResult<Self> {
        info!("Connecting to database: {}", database_url);

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| storage_error!("Invalid database URL", COMPONENT, e))?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new();
        if database_url.contains(":memory:") {
            pool_options = pool_options.max_connections(1);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| storage_error!("Failed to connect to database", COMPONENT, e))?;

        info!("Database connection established");

        let service = Self { pool };
        service.create_tables().await?;

        Ok(service)
    }

    /// Create tables and indexes.
    ///
    /// The UNIQUE constraint on email is the authoritative uniqueness
    /// signal for concurrent registrations.
    async fn create_tables(&self) -> TasklistResult<()> {
        let query = r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL DEFAULT 'user',
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS todos (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                completed INTEGER NOT NULL DEFAULT 0,
                user_id TEXT NOT NULL REFERENCES users(id),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
            CREATE INDEX IF NOT EXISTS idx_todos_user ON todos(user_id);
            CREATE INDEX IF NOT EXISTS idx_todos_created ON todos(created_at);
        "#;

        sqlx::raw_sql(query)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error!("Failed to create tables", COMPONENT, e))?;

        debug!("Database tables ready");
        Ok(())
    }

    /// Cheap availability probe used by the pre-flight store guard
    pub async fn ping(&self) -> TasklistResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error!("Database unavailable", COMPONENT, e))?;
        Ok(())
    }

    /// Access the connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
