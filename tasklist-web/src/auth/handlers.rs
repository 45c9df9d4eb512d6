//! Authentication handlers for user registration and login

use super::{
    jwt::AuthError,
    users::{AuthResponse, LoginRequest, RegisterRequest},
    AuthUser,
};
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{json, Value};
use tracing::info;

/// User registration endpoint
///
/// Register a new account with name, email, and password. An optional
/// elevation code grants the admin role. Returns the public identity
/// fields and a session token on success.
pub async fn register_user(
    State(app_state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthError> {
    let response = app_state.user_service.register(request).await?;

    info!(user_id = %response.user.id, "User registered");
    Ok((StatusCode::CREATED, Json(response)))
}

/// User login endpoint
///
/// Authenticate with email and password. Returns the public identity
/// fields and a session token on success; every failure is generic.
pub async fn login_user(
    State(app_state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthError> {
    let response = app_state.user_service.login(request).await?;

    info!(user_id = %response.user.id, "User logged in");
    Ok(Json(response))
}

/// Current identity.
///
/// Token verification is self-contained; this handler additionally
/// resolves the stored record for the display name. A token can outlive
/// its record, in which case the claims are all that is left to report.
pub async fn get_current_user(
    State(app_state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Value>, AuthError> {
    let record = app_state.user_service.get_user_by_id(&user.id).await?;

    let body = match record {
        Some(record) => json!(record.to_user_info()),
        None => json!({
            "id": user.id,
            "email": user.email,
            "role": user.role,
        }),
    };

    Ok(Json(body))
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
    use serde_json::json;
    use tasklist_core::Role;
    use tower::ServiceExt;

    async fn create_test_app() -> (Router, AppState) {
        let state = AppState::new(WebConfig::default()).await.unwrap();
        (create_app(state.clone()), state)
    }

    fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_signup_creates_user_role_account() {
        let (app, state) = create_test_app().await;

        let response = app
            .oneshot(post_json(
                "/api/auth/signup",
                &json!({"name": "Ann", "email": "ann@x.com", "password": "abcdef"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        assert_eq!(body["user"]["role"], "user");
        assert_eq!(body["user"]["email"], "ann@x.com");
        assert!(body["user"].get("password_hash").is_none());

        // The token is self-contained and decodes to the same role
        let claims = state
            .tokens
            .verify(body["token"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.role, Role::User);
    }

    #[tokio::test]
    async fn test_signup_duplicate_email_rejected() {
        let (app, _state) = create_test_app().await;
        let request = json!({"name": "Ann", "email": "ann@x.com", "password": "abcdef"});

        let response = app
            .clone()
            .oneshot(post_json("/api/auth/signup", &request))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .oneshot(post_json("/api/auth/signup", &request))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "already_exists");
    }

    #[tokio::test]
    async fn test_login_failures_share_one_shape() {
        let (app, _state) = create_test_app().await;

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/auth/signup",
                &json!({"name": "Ann", "email": "ann@x.com", "password": "abcdef"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let wrong_password = app
            .clone()
            .oneshot(post_json(
                "/api/auth/login",
                &json!({"email": "ann@x.com", "password": "wrong!"}),
            ))
            .await
            .unwrap();
        let unknown_email = app
            .oneshot(post_json(
                "/api/auth/login",
                &json!({"email": "nobody@x.com", "password": "abcdef"}),
            ))
            .await
            .unwrap();

        assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
        assert_eq!(unknown_email.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(wrong_password).await,
            body_json(unknown_email).await
        );
    }

    #[tokio::test]
    async fn test_login_returns_usable_token() {
        let (app, state) = create_test_app().await;

        app.clone()
            .oneshot(post_json(
                "/api/auth/signup",
                &json!({"name": "Ann", "email": "ann@x.com", "password": "abcdef"}),
            ))
            .await
            .unwrap();

        let response = app
            .oneshot(post_json(
                "/api/auth/login",
                &json!({"email": "ann@x.com", "password": "abcdef"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        let claims = state
            .tokens
            .verify(body["token"].as_str().unwrap())
            .unwrap();
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.email, "ann@x.com");
    }

    #[tokio::test]
    async fn test_me_requires_token() {
        let (app, _state) = create_test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/auth/me")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
