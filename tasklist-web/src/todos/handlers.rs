//! Task record handlers
//!
//! Every handler resolves the caller through the auth extractor, scopes
//! its filter through the ownership policy, and talks to the store with
//! the scoped filter only.

use super::{
    policy, CreateTodoRequest, SetCompletedRequest, TodoChanges, TodoFilter, TodoRecord,
    UpdateTodoRequest,
};
use crate::{auth::AuthUser, ApiError, AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use tasklist_core::{not_found_error, validation_error};
use tracing::{debug, info};

const COMPONENT: &str = "todos";

#[derive(Debug, Deserialize)]
pub struct ByDateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ByRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Parse a `YYYY-MM-DD` query value into the UTC bounds of that day
fn day_bounds(raw: &str, field: &str) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| validation_error!("Invalid date, expected YYYY-MM-DD", field, COMPONENT))?;

    let start = date.and_hms_opt(0, 0, 0).expect("valid midnight").and_utc();
    let end = date
        .and_hms_micro_opt(23, 59, 59, 999_999)
        .expect("valid end of day")
        .and_utc();
    Ok((start, end))
}

/// List the caller's todos (all todos for admins), oldest first
#[utoipa::path(
    get,
    path = "/api/todos",
    tag = "Todos",
    responses(
        (status = 200, description = "Task records visible to the caller", body = [TodoRecord]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_todos(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<TodoRecord>>, ApiError> {
    let filter = policy::scope(&auth, TodoFilter::default());
    let todos = state.todo_store.list(&filter).await?;

    debug!(user_id = %auth.id, count = todos.len(), "Fetched todos");
    Ok(Json(todos))
}

/// Create a todo owned by the caller
#[utoipa::path(
    post,
    path = "/api/todos",
    tag = "Todos",
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Task record created", body = TodoRecord),
        (status = 400, description = "Title missing or empty"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoRecord>), ApiError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(validation_error!("Title is required", "title", COMPONENT).into());
    }

    let todo = TodoRecord::new(
        title.to_string(),
        request.description.trim().to_string(),
        request.completed,
        auth.id.clone(),
    );
    let todo = state.todo_store.insert(todo).await?;

    info!(user_id = %auth.id, todo_id = %todo.id, "Todo created");
    Ok((StatusCode::CREATED, Json(todo)))
}

/// Completed todos within the caller's reach
#[utoipa::path(
    get,
    path = "/api/todos/completed",
    tag = "Todos",
    responses((status = 200, body = [TodoRecord])),
    security(("bearer_auth" = []))
)]
pub async fn completed_todos(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<TodoRecord>>, ApiError> {
    let filter = policy::scope(&auth, TodoFilter::default().with_completed(true));
    Ok(Json(state.todo_store.list(&filter).await?))
}

/// Incomplete todos within the caller's reach
#[utoipa::path(
    get,
    path = "/api/todos/incomplete",
    tag = "Todos",
    responses((status = 200, body = [TodoRecord])),
    security(("bearer_auth" = []))
)]
pub async fn incomplete_todos(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<Vec<TodoRecord>>, ApiError> {
    let filter = policy::scope(&auth, TodoFilter::default().with_completed(false));
    Ok(Json(state.todo_store.list(&filter).await?))
}

/// Todos created on a specific day
#[utoipa::path(
    get,
    path = "/api/todos/by-date",
    tag = "Todos",
    params(("date" = String, Query, description = "Day in YYYY-MM-DD form")),
    responses(
        (status = 200, body = [TodoRecord]),
        (status = 400, description = "Missing or malformed date")
    ),
    security(("bearer_auth" = []))
)]
pub async fn todos_by_date(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ByDateQuery>,
) -> Result<Json<Vec<TodoRecord>>, ApiError> {
    let date = query
        .date
        .ok_or_else(|| validation_error!("Date is required", "date", COMPONENT))?;
    let (start, end) = day_bounds(&date, "date")?;

    let filter = policy::scope(&auth, TodoFilter::default().with_created_between(start, end));
    Ok(Json(state.todo_store.list(&filter).await?))
}

/// Todos created within an inclusive day range
#[utoipa::path(
    get,
    path = "/api/todos/by-range",
    tag = "Todos",
    params(
        ("start_date" = String, Query, description = "First day in YYYY-MM-DD form"),
        ("end_date" = String, Query, description = "Last day in YYYY-MM-DD form")
    ),
    responses(
        (status = 200, body = [TodoRecord]),
        (status = 400, description = "Missing or malformed bounds")
    ),
    security(("bearer_auth" = []))
)]
pub async fn todos_by_range(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ByRangeQuery>,
) -> Result<Json<Vec<TodoRecord>>, ApiError> {
    let (Some(start_date), Some(end_date)) = (query.start_date, query.end_date) else {
        return Err(validation_error!(
            "start_date and end_date are required",
            COMPONENT
        )
        .into());
    };

    let (start, _) = day_bounds(&start_date, "start_date")?;
    let (_, end) = day_bounds(&end_date, "end_date")?;

    let filter = policy::scope(&auth, TodoFilter::default().with_created_between(start, end));
    Ok(Json(state.todo_store.list(&filter).await?))
}

/// Fetch one todo by id.
///
/// A record owned by someone else answers 404 for non-admins, the same
/// as a record that does not exist.
#[utoipa::path(
    get,
    path = "/api/todos/{id}",
    tag = "Todos",
    params(("id" = String, Path, description = "Task record id")),
    responses(
        (status = 200, body = TodoRecord),
        (status = 404, description = "No reachable record with this id")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<TodoRecord>, ApiError> {
    let filter = policy::scope(&auth, TodoFilter::default());
    let todo = state
        .todo_store
        .find(&id, &filter)
        .await?
        .ok_or_else(|| not_found_error!("Todo", COMPONENT))?;

    Ok(Json(todo))
}

/// Update a todo's fields
#[utoipa::path(
    put,
    path = "/api/todos/{id}",
    tag = "Todos",
    params(("id" = String, Path, description = "Task record id")),
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, body = TodoRecord),
        (status = 400, description = "Empty title"),
        (status = 404, description = "No reachable record with this id")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateTodoRequest>,
) -> Result<Json<TodoRecord>, ApiError> {
    if let Some(title) = &request.title {
        if title.trim().is_empty() {
            return Err(validation_error!("Title is required", "title", COMPONENT).into());
        }
    }

    let filter = policy::scope(&auth, TodoFilter::default());
    let todo = state
        .todo_store
        .update(&id, TodoChanges::from(request), &filter)
        .await?
        .ok_or_else(|| not_found_error!("Todo", COMPONENT))?;

    info!(user_id = %auth.id, todo_id = %todo.id, "Todo updated");
    Ok(Json(todo))
}

/// Mark a todo complete or incomplete
#[utoipa::path(
    patch,
    path = "/api/todos/{id}",
    tag = "Todos",
    params(("id" = String, Path, description = "Task record id")),
    request_body = SetCompletedRequest,
    responses(
        (status = 200, body = TodoRecord),
        (status = 404, description = "No reachable record with this id")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_completed(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(request): Json<SetCompletedRequest>,
) -> Result<Json<TodoRecord>, ApiError> {
    let changes = TodoChanges {
        completed: Some(request.completed),
        ..TodoChanges::default()
    };

    let filter = policy::scope(&auth, TodoFilter::default());
    let todo = state
        .todo_store
        .update(&id, changes, &filter)
        .await?
        .ok_or_else(|| not_found_error!("Todo", COMPONENT))?;

    Ok(Json(todo))
}

/// Delete a todo
#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    tag = "Todos",
    params(("id" = String, Path, description = "Task record id")),
    responses(
        (status = 200, description = "Record deleted"),
        (status = 404, description = "No reachable record with this id")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_todo(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let filter = policy::scope(&auth, TodoFilter::default());
    let deleted = state.todo_store.delete(&id, &filter).await?;

    if !deleted {
        return Err(not_found_error!("Todo", COMPONENT).into());
    }

    info!(user_id = %auth.id, todo_id = %id, "Todo deleted");
    Ok(Json(json!({ "message": "Todo deleted successfully" })))
}
