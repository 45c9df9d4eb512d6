//! Admin handlers

use super::{AdminStats, VerifyCodeRequest};
use crate::{
    auth::{users::UserInfo, AdminUser},
    todos::{TodoFilter, TodoRecord},
    ApiError, AppState,
};
use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use tracing::{info, warn};

/// Check an elevation code before registration.
///
/// Public route: the client calls it to decide whether to offer the
/// admin signup flow. The code itself only takes effect at signup.
#[utoipa::path(
    post,
    path = "/api/admin/verify",
    tag = "Admin",
    request_body = VerifyCodeRequest,
    responses(
        (status = 200, description = "Code matches the reference value"),
        (status = 401, description = "Code does not match")
    )
)]
pub async fn verify_admin_code(
    State(state): State<AppState>,
    Json(request): Json<VerifyCodeRequest>,
) -> (StatusCode, Json<Value>) {
    if state.user_service.verify_admin_code(&request.admin_code) {
        info!("Admin elevation code verified");
        (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "Admin access granted" })),
        )
    } else {
        warn!("Admin elevation code rejected");
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "Invalid admin code" })),
        )
    }
}

/// All identities, public fields only
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    responses(
        (status = 200, description = "All users, digests excluded", body = [UserInfo]),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<Vec<UserInfo>>, ApiError> {
    let users = state.user_service.store().list_all().await?;

    info!(admin_id = %admin.id, count = users.len(), "Admin listed users");
    Ok(Json(users.iter().map(|u| u.to_user_info()).collect()))
}

/// All task records server-wide
#[utoipa::path(
    get,
    path = "/api/admin/todos",
    tag = "Admin",
    responses(
        (status = 200, body = [TodoRecord]),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_all_todos(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<Vec<TodoRecord>>, ApiError> {
    let todos = state.todo_store.list(&TodoFilter::default()).await?;

    info!(admin_id = %admin.id, count = todos.len(), "Admin listed todos");
    Ok(Json(todos))
}

/// Aggregate statistics across all users
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "Admin",
    responses(
        (status = 200, body = AdminStats),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearer_auth" = []))
)]
pub async fn stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<AdminStats>, ApiError> {
    let total_users = state.user_service.store().count().await?;
    let total_todos = state.todo_store.count(&TodoFilter::default()).await?;
    let completed_todos = state
        .todo_store
        .count(&TodoFilter::default().with_completed(true))
        .await?;

    Ok(Json(AdminStats {
        total_users,
        total_todos,
        completed_todos,
        pending_todos: total_todos - completed_todos,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_app, state::AppState, WebConfig};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use tower::ServiceExt;

    async fn create_test_app() -> Router {
        let state = AppState::new(WebConfig::default()).await.unwrap();
        create_app(state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn signup(app: &Router, email: &str, admin_code: Option<&str>) -> String {
        let mut body =
            serde_json::json!({"name": "Test", "email": email, "password": "abcdef"});
        if let Some(code) = admin_code {
            body["admin_code"] = serde_json::json!(code);
        }

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/signup")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await["token"].as_str().unwrap().to_string()
    }

    fn get_with_token(uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header("authorization", format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_verify_code_round_trip() {
        let app = create_test_app().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/admin/verify")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"admin_code": "ADMIN12345"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/admin/verify")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"admin_code": "nope"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_routes_reject_user_role_with_forbidden() {
        let app = create_test_app().await;
        let user = signup(&app, "ann@x.com", None).await;

        for uri in ["/api/admin/users", "/api/admin/todos", "/api/admin/stats"] {
            let response = app
                .clone()
                .oneshot(get_with_token(uri, &user))
                .await
                .unwrap();
            // Valid identity, wrong role: 403, not 401
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "uri: {uri}");
        }
    }

    #[tokio::test]
    async fn test_admin_sees_aggregate_state() {
        let app = create_test_app().await;
        let ann = signup(&app, "ann@x.com", None).await;
        let admin = signup(&app, "root@x.com", Some("ADMIN12345")).await;

        // Ann creates one completed and one open task
        for (title, completed) in [("done", true), ("open", false)] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/api/todos")
                        .header("authorization", format!("Bearer {}", ann))
                        .header("content-type", "application/json")
                        .body(Body::from(
                            serde_json::json!({"title": title, "completed": completed})
                                .to_string(),
                        ))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let response = app
            .clone()
            .oneshot(get_with_token("/api/admin/users", &admin))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let users = body_json(response).await;
        assert_eq!(users.as_array().unwrap().len(), 2);
        // Digest never leaves the store
        assert!(users[0].get("password_hash").is_none());

        let response = app
            .clone()
            .oneshot(get_with_token("/api/admin/todos", &admin))
            .await
            .unwrap();
        assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

        let response = app
            .oneshot(get_with_token("/api/admin/stats", &admin))
            .await
            .unwrap();
        let stats = body_json(response).await;
        assert_eq!(stats["total_users"], 2);
        assert_eq!(stats["total_todos"], 2);
        assert_eq!(stats["completed_todos"], 1);
        assert_eq!(stats["pending_todos"], 1);
    }
}
