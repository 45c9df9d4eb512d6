//! Task records and ownership-scoped access

pub mod database;
pub mod handlers;
pub mod policy;
pub mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A task record owned by exactly one identity
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TodoRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    /// Owning identity; immutable after creation
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TodoRecord {
    /// Create a new record owned by `user_id`
    pub fn new(title: String, description: String, completed: bool, user_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            completed,
            user_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Record selection criteria applied by the stores.
///
/// `owner` is set by the scope policy, never directly by handlers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoFilter {
    pub owner: Option<String>,
    pub completed: Option<bool>,
    /// Inclusive lower bound on creation time
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on creation time
    pub created_to: Option<DateTime<Utc>>,
}

impl TodoFilter {
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    pub fn with_created_between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.created_from = Some(from);
        self.created_to = Some(to);
        self
    }
}

/// Create request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTodoRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// Full update request body; absent fields keep their stored value
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Completion toggle body
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetCompletedRequest {
    pub completed: bool,
}

/// Field changes applied by the stores
#[derive(Debug, Clone, Default)]
pub struct TodoChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl From<UpdateTodoRequest> for TodoChanges {
    fn from(request: UpdateTodoRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            completed: request.completed,
        }
    }
}
