//! Task record storage supporting in-memory and database backends

use super::{database::DatabaseTodoStore, TodoChanges, TodoFilter, TodoRecord};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tasklist_core::TasklistResult;

/// Whether a record satisfies every clause of the filter
fn matches(todo: &TodoRecord, filter: &TodoFilter) -> bool {
    if let Some(owner) = &filter.owner {
        if &todo.user_id != owner {
            return false;
        }
    }
    if let Some(completed) = filter.completed {
        if todo.completed != completed {
            return false;
        }
    }
    if let Some(from) = filter.created_from {
        if todo.created_at < from {
            return false;
        }
    }
    if let Some(to) = filter.created_to {
        if todo.created_at > to {
            return false;
        }
    }
    true
}

fn apply_changes(todo: &mut TodoRecord, changes: TodoChanges) {
    if let Some(title) = changes.title {
        todo.title = title;
    }
    if let Some(description) = changes.description {
        todo.description = description;
    }
    if let Some(completed) = changes.completed {
        todo.completed = completed;
    }
    todo.updated_at = Utc::now();
}

/// Task record store
#[derive(Debug, Clone)]
pub enum TodoStore {
    /// In-memory storage (for development and testing)
    Memory {
        todos: Arc<RwLock<HashMap<String, TodoRecord>>>,
    },
    /// Database storage (for production)
    Database(DatabaseTodoStore),
}

impl TodoStore {
    /// Create an in-memory todo store
    pub fn memory() -> Self {
        Self::Memory {
            todos: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a database-backed todo store
    pub fn database(store: DatabaseTodoStore) -> Self {
        Self::Database(store)
    }

    /// Persist a new record
    pub async fn insert(&self, todo: TodoRecord) -> TasklistResult<TodoRecord> {
        match self {
            Self::Memory { todos } => {
                todos.write().unwrap().insert(todo.id.clone(), todo.clone());
                Ok(todo)
            }
            Self::Database(store) => store.insert(todo).await,
        }
    }

    /// Fetch one record by id within the filter's reach.
    ///
    /// A record outside the filter is reported as absent, exactly like a
    /// record that does not exist.
    pub async fn find(&self, id: &str, filter: &TodoFilter) -> TasklistResult<Option<TodoRecord>> {
        match self {
            Self::Memory { todos } => Ok(todos
                .read()
                .unwrap()
                .get(id)
                .filter(|todo| matches(todo, filter))
                .cloned()),
            Self::Database(store) => store.find(id, filter).await,
        }
    }

    /// All records within the filter's reach, oldest first
    pub async fn list(&self, filter: &TodoFilter) -> TasklistResult<Vec<TodoRecord>> {
        match self {
            Self::Memory { todos } => {
                let mut result: Vec<TodoRecord> = todos
                    .read()
                    .unwrap()
                    .values()
                    .filter(|todo| matches(todo, filter))
                    .cloned()
                    .collect();
                result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
                Ok(result)
            }
            Self::Database(store) => store.list(filter).await,
        }
    }

    /// Apply changes to a record within the filter's reach; `None` when
    /// no such record is reachable
    pub async fn update(
        &self,
        id: &str,
        changes: TodoChanges,
        filter: &TodoFilter,
    ) -> TasklistResult<Option<TodoRecord>> {
        match self {
            Self::Memory { todos } => {
                let mut todos = todos.write().unwrap();
                match todos.get_mut(id) {
                    Some(todo) if matches(todo, filter) => {
                        apply_changes(todo, changes);
                        Ok(Some(todo.clone()))
                    }
                    _ => Ok(None),
                }
            }
            Self::Database(store) => store.update(id, changes, filter).await,
        }
    }

    /// Delete a record within the filter's reach; false when no such
    /// record is reachable
    pub async fn delete(&self, id: &str, filter: &TodoFilter) -> TasklistResult<bool> {
        match self {
            Self::Memory { todos } => {
                let mut todos = todos.write().unwrap();
                match todos.get(id) {
                    Some(todo) if matches(todo, filter) => {
                        todos.remove(id);
                        Ok(true)
                    }
                    _ => Ok(false),
                }
            }
            Self::Database(store) => store.delete(id, filter).await,
        }
    }

    /// Number of records within the filter's reach
    pub async fn count(&self, filter: &TodoFilter) -> TasklistResult<u64> {
        match self {
            Self::Memory { todos } => Ok(todos
                .read()
                .unwrap()
                .values()
                .filter(|todo| matches(todo, filter))
                .count() as u64),
            Self::Database(store) => store.count(filter).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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
    async fn test_find_respects_owner_clause() {
        let store = TodoStore::memory();
        let record = store.insert(todo("write tests", "ann", false)).await.unwrap();

        assert!(store
            .find(&record.id, &owned_by("ann"))
            .await
            .unwrap()
            .is_some());
        // Another user's filter cannot reach the record
        assert!(store
            .find(&record.id, &owned_by("bob"))
            .await
            .unwrap()
            .is_none());
        // The unscoped (admin) filter can
        assert!(store
            .find(&record.id, &TodoFilter::default())
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_list_sorts_oldest_first() {
        let store = TodoStore::memory();
        let first = store.insert(todo("first", "ann", false)).await.unwrap();
        let second = store.insert(todo("second", "ann", false)).await.unwrap();

        let listed = store.list(&owned_by("ann")).await.unwrap();
        assert_eq!(
            listed.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            vec![first.id.as_str(), second.id.as_str()]
        );
    }

    #[tokio::test]
    async fn test_update_outside_filter_reports_absent() {
        let store = TodoStore::memory();
        let record = store.insert(todo("secret", "ann", false)).await.unwrap();

        let changes = TodoChanges {
            completed: Some(true),
            ..TodoChanges::default()
        };
        let result = store
            .update(&record.id, changes.clone(), &owned_by("bob"))
            .await
            .unwrap();
        assert!(result.is_none());

        let result = store
            .update(&record.id, changes, &owned_by("ann"))
            .await
            .unwrap()
            .unwrap();
        assert!(result.completed);
        assert!(result.updated_at >= record.updated_at);
    }

    #[tokio::test]
    async fn test_delete_outside_filter_reports_absent() {
        let store = TodoStore::memory();
        let record = store.insert(todo("keep", "ann", false)).await.unwrap();

        assert!(!store.delete(&record.id, &owned_by("bob")).await.unwrap());
        assert!(store.delete(&record.id, &owned_by("ann")).await.unwrap());
        assert!(!store.delete(&record.id, &owned_by("ann")).await.unwrap());
    }

    #[tokio::test]
    async fn test_count_with_completion_filter() {
        let store = TodoStore::memory();
        store.insert(todo("a", "ann", true)).await.unwrap();
        store.insert(todo("b", "ann", false)).await.unwrap();
        store.insert(todo("c", "bob", true)).await.unwrap();

        let all = TodoFilter::default();
        assert_eq!(store.count(&all).await.unwrap(), 3);
        assert_eq!(
            store.count(&all.clone().with_completed(true)).await.unwrap(),
            2
        );
        assert_eq!(
            store
                .count(&owned_by("ann").with_completed(true))
                .await
                .unwrap(),
            1
        );
    }
}
