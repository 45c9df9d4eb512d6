//! Route definitions for the tasklist web server

use crate::{admin, auth, handlers, middleware, openapi, todos, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// Public authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::handlers::register_user))
        .route("/login", post(auth::handlers::login_user))
        .route("/me", get(auth::handlers::get_current_user))
}

/// Protected task record routes
pub fn todo_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(todos::handlers::list_todos).post(todos::handlers::create_todo),
        )
        .route("/completed", get(todos::handlers::completed_todos))
        .route("/incomplete", get(todos::handlers::incomplete_todos))
        .route("/by-date", get(todos::handlers::todos_by_date))
        .route("/by-range", get(todos::handlers::todos_by_range))
        .route(
            "/{id}",
            get(todos::handlers::get_todo)
                .put(todos::handlers::update_todo)
                .patch(todos::handlers::set_completed)
                .delete(todos::handlers::delete_todo),
        )
}

/// Admin routes; `/verify` is public, the rest require the admin role
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/verify", post(admin::handlers::verify_admin_code))
        .route("/users", get(admin::handlers::list_users))
        .route("/todos", get(admin::handlers::list_all_todos))
        .route("/stats", get(admin::handlers::stats))
}

/// All API routes combined, with the store pre-flight guard layered
/// over every route that touches persistence behind authentication
pub fn api_routes(state: AppState) -> Router<AppState> {
    let store_guard = axum::middleware::from_fn_with_state(state, middleware::require_store);

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/auth", auth_routes())
        .nest("/todos", todo_routes().layer(store_guard.clone()))
        .nest("/admin", admin_routes().layer(store_guard))
}

/// OpenAPI document route
pub fn docs_routes() -> Router<AppState> {
    Router::new().route("/api-docs/openapi.json", get(openapi::openapi_json))
}
