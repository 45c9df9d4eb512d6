//! Database-backed user storage

use super::users::UserData;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tasklist_core::{
    duplicate_error, storage_error, ErrorContext, Role, TasklistError, TasklistResult,
};
use tracing::{debug, error};

const COMPONENT: &str = "user-store";

/// Timestamps are stored as fixed-width UTC strings so that string
/// comparison in SQL matches chronological order
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str, component: &str) -> TasklistResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| TasklistError::Internal {
            message: format!("Invalid stored timestamp: {}", e),
            source: None,
            context: ErrorContext::new(component),
        })
}

/// Database-backed user store
#[derive(Debug, Clone)]
pub struct DatabaseUserStore {
    pool: SqlitePool,
}

impl DatabaseUserStore {
    /// Wrap an existing connection pool; tables are created by the
    /// database service at startup
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> TasklistResult<UserData> {
        let role: String = row.get("role");
        let role = Role::from_str(&role).map_err(|e| TasklistError::Internal {
            message: format!("Invalid stored role: {}", e),
            source: None,
            context: ErrorContext::new(COMPONENT),
        })?;

        let created_at: String = row.get("created_at");

        Ok(UserData {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            password_hash: row.get("password_hash"),
            role,
            created_at: parse_timestamp(&created_at, COMPONENT)?,
        })
    }

    /// Insert a user; a UNIQUE violation on email is the authoritative
    /// duplicate signal and is remapped rather than surfaced raw
    pub async fn insert(&self, user: UserData) -> TasklistResult<UserData> {
        let query = r#"
            INSERT INTO users (id, name, email, password_hash, role, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(&user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.to_string())
            .bind(format_timestamp(&user.created_at))
            .execute(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    debug!("Insert lost the uniqueness race for email");
                    duplicate_error!("user", COMPONENT)
                }
                _ => {
                    error!("Failed to insert user: {}", e);
                    storage_error!("Failed to insert user", COMPONENT, e)
                }
            })?;

        debug!(user_id = %user.id, "User inserted");
        Ok(user)
    }

    /// Get user by normalized email
    pub async fn find_by_email(&self, email: &str) -> TasklistResult<Option<UserData>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to query user by email: {}", e);
                storage_error!("Failed to query user by email", COMPONENT, e)
            })?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    /// Get user by id
    pub async fn find_by_id(&self, id: &str) -> TasklistResult<Option<UserData>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to query user by id: {}", e);
                storage_error!("Failed to query user by id", COMPONENT, e)
            })?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    /// All users, oldest first
    pub async fn list_all(&self) -> TasklistResult<Vec<UserData>> {
        let rows = sqlx::query("SELECT * FROM users ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to list users: {}", e);
                storage_error!("Failed to list users", COMPONENT, e)
            })?;

        rows.iter().map(Self::row_to_user).collect()
    }

    /// Total number of users
    pub async fn count(&self) -> TasklistResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to count users: {}", e);
                storage_error!("Failed to count users", COMPONENT, e)
            })?;

        let count: i64 = row.get("count");
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseService;

    async fn store() -> DatabaseUserStore {
        let service = DatabaseService::new("sqlite::memory:").await.unwrap();
        DatabaseUserStore::new(service.pool().clone())
    }

    fn user(email: &str) -> UserData {
        UserData::new(
            "Ann".to_string(),
            email.to_string(),
            "abcdef",
            Role::User,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let store = store().await;
        let inserted = store.insert(user("ann@x.com")).await.unwrap();

        let found = store.find_by_email("ann@x.com").await.unwrap().unwrap();
        assert_eq!(found.id, inserted.id);
        assert_eq!(found.role, Role::User);

        let by_id = store.find_by_id(&inserted.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "ann@x.com");

        assert!(store.find_by_email("bob@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unique_violation_becomes_duplicate() {
        let store = store().await;
        store.insert(user("ann@x.com")).await.unwrap();

        let result = store.insert(user("ann@x.com")).await;
        assert!(matches!(result, Err(TasklistError::Duplicate { .. })));
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
