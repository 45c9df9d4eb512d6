//! Database-backed task record storage

use super::{TodoChanges, TodoFilter, TodoRecord};
use crate::auth::database::{format_timestamp, parse_timestamp};
use chrono::Utc;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tasklist_core::{storage_error, TasklistResult};
use tracing::{debug, error};

const COMPONENT: &str = "todo-store";

/// Append the filter's clauses to a query ending in `WHERE 1=1`
fn push_filter(builder: &mut QueryBuilder<'_, Sqlite>, filter: &TodoFilter) {
    if let Some(owner) = &filter.owner {
        builder.push(" AND user_id = ").push_bind(owner.clone());
    }
    if let Some(completed) = filter.completed {
        builder.push(" AND completed = ").push_bind(completed);
    }
    if let Some(from) = filter.created_from {
        builder
            .push(" AND created_at >= ")
            .push_bind(format_timestamp(&from));
    }
    if let Some(to) = filter.created_to {
        builder
            .push(" AND created_at <= ")
            .push_bind(format_timestamp(&to));
    }
}

/// Database-backed todo store
#[derive(Debug, Clone)]
pub struct DatabaseTodoStore {
    pool: SqlitePool,
}

impl DatabaseTodoStore {
    /// Wrap an existing connection pool; tables are created by the
    /// database service at startup
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_todo(row: &sqlx::sqlite::SqliteRow) -> TasklistResult<TodoRecord> {
        let created_at: String = row.get("created_at");
        let updated_at: String = row.get("updated_at");

        Ok(TodoRecord {
            id: row.get("id"),
            title: row.get("title"),
            description: row.get("description"),
            completed: row.get("completed"),
            user_id: row.get("user_id"),
            created_at: parse_timestamp(&created_at, COMPONENT)?,
            updated_at: parse_timestamp(&updated_at, COMPONENT)?,
        })
    }

    pub async fn insert(&self, todo: TodoRecord) -> TasklistResult<TodoRecord> {
        let query = r#"
            INSERT INTO todos (id, title, description, completed, user_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(&todo.id)
            .bind(&todo.title)
            .bind(&todo.description)
            .bind(todo.completed)
            .bind(&todo.user_id)
            .bind(format_timestamp(&todo.created_at))
            .bind(format_timestamp(&todo.updated_at))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to insert todo: {}", e);
                storage_error!("Failed to insert todo", COMPONENT, e)
            })?;

        debug!(todo_id = %todo.id, "Todo inserted");
        Ok(todo)
    }

    pub async fn find(&self, id: &str, filter: &TodoFilter) -> TasklistResult<Option<TodoRecord>> {
        let mut builder = QueryBuilder::new("SELECT * FROM todos WHERE 1=1");
        builder.push(" AND id = ").push_bind(id.to_string());
        push_filter(&mut builder, filter);

        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to query todo: {}", e);
                storage_error!("Failed to query todo", COMPONENT, e)
            })?;

        row.as_ref().map(Self::row_to_todo).transpose()
    }

    pub async fn list(&self, filter: &TodoFilter) -> TasklistResult<Vec<TodoRecord>> {
        let mut builder = QueryBuilder::new("SELECT * FROM todos WHERE 1=1");
        push_filter(&mut builder, filter);
        builder.push(" ORDER BY created_at ASC");

        let rows = builder.build().fetch_all(&self.pool).await.map_err(|e| {
            error!("Failed to list todos: {}", e);
            storage_error!("Failed to list todos", COMPONENT, e)
        })?;

        rows.iter().map(Self::row_to_todo).collect()
    }

    /// Update in one statement carrying the scope clause, so the check
    /// and the write cannot be split by a concurrent request
    pub async fn update(
        &self,
        id: &str,
        changes: TodoChanges,
        filter: &TodoFilter,
    ) -> TasklistResult<Option<TodoRecord>> {
        let mut builder = QueryBuilder::new("UPDATE todos SET updated_at = ");
        builder.push_bind(format_timestamp(&Utc::now()));
        if let Some(title) = changes.title {
            builder.push(", title = ").push_bind(title);
        }
        if let Some(description) = changes.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(completed) = changes.completed {
            builder.push(", completed = ").push_bind(completed);
        }
        builder.push(" WHERE 1=1 AND id = ").push_bind(id.to_string());
        push_filter(&mut builder, filter);

        let result = builder.build().execute(&self.pool).await.map_err(|e| {
            error!("Failed to update todo: {}", e);
            storage_error!("Failed to update todo", COMPONENT, e)
        })?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        // Access was just proven by the scoped update itself
        self.find(id, &TodoFilter::default()).await
    }

    pub async fn delete(&self, id: &str, filter: &TodoFilter) -> TasklistResult<bool> {
        let mut builder = QueryBuilder::new("DELETE FROM todos WHERE 1=1");
        builder.push(" AND id = ").push_bind(id.to_string());
        push_filter(&mut builder, filter);

        let result = builder.build().execute(&self.pool).await.map_err(|e| {
            error!("Failed to delete todo: {}", e);
            storage_error!("Failed to delete todo", COMPONENT, e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count(&self, filter: &TodoFilter) -> TasklistResult<u64> {
        let mut builder = QueryBuilder::new("SELECT COUNT(*) as count FROM todos WHERE 1=1");
        push_filter(&mut builder, filter);

        let row = builder.build().fetch_one(&self.pool).await.map_err(|e| {
            error!("Failed to count todos: {}", e);
            storage_error!("Failed to count todos", COMPONENT, e)
        })?;

        let count: i64 = row.get("count");
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DatabaseService;
    use chrono::Duration;

    async fn store() -> DatabaseTodoStore {
        let service = DatabaseService::new("sqlite::memory:").await.unwrap();
        DatabaseTodoStore::new(service.pool().clone())
    }

    fn todo(title: &str, user_id: &str, completed: bool) -> TodoRecord {
        TodoRecord::new(title.to_string(), String::new(), completed, user_id.to_string())
    }

    fn owned_by(owner: &str) -> TodoFilter {
        TodoFilter {
            owner: Some(owner.to_string()),
            ..TodoFilter::default()
        }
    }

    #[tokio::test]
    async fn test_insert_find_and_scope() {
        let store = store().await;
        let record = store.insert(todo("write tests", "ann", false)).await.unwrap();

        let found = store
            .find(&record.id, &owned_by("ann"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.title, "write tests");
        assert!(!found.completed);

        assert!(store
            .find(&record.id, &owned_by("bob"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_scoped_update_and_delete() {
        let store = store().await;
        let record = store.insert(todo("secret", "ann", false)).await.unwrap();

        let changes = TodoChanges {
            completed: Some(true),
            ..TodoChanges::default()
        };
        assert!(store
            .update(&record.id, changes.clone(), &owned_by("bob"))
            .await
            .unwrap()
            .is_none());

        let updated = store
            .update(&record.id, changes, &owned_by("ann"))
            .await
            .unwrap()
            .unwrap();
        assert!(updated.completed);

        assert!(!store.delete(&record.id, &owned_by("bob")).await.unwrap());
        assert!(store.delete(&record.id, &owned_by("ann")).await.unwrap());
    }

    #[tokio::test]
    async fn test_date_range_filter() {
        let store = store().await;
        let record = store.insert(todo("dated", "ann", false)).await.unwrap();

        let inside = TodoFilter::default().with_created_between(
            record.created_at - Duration::hours(1),
            record.created_at + Duration::hours(1),
        );
        assert_eq!(store.list(&inside).await.unwrap().len(), 1);

        let outside = TodoFilter::default().with_created_between(
            record.created_at + Duration::hours(1),
            record.created_at + Duration::hours(2),
        );
        assert!(store.list(&outside).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_counts_by_completion() {
        let store = store().await;
        store.insert(todo("a", "ann", true)).await.unwrap();
        store.insert(todo("b", "ann", false)).await.unwrap();
        store.insert(todo("c", "bob", true)).await.unwrap();

        assert_eq!(store.count(&TodoFilter::default()).await.unwrap(), 3);
        assert_eq!(
            store
                .count(&TodoFilter::default().with_completed(true))
                .await
                .unwrap(),
            2
        );
    }
}
