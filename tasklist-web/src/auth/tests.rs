//! Tests for the bearer-token extractors

use super::users::UserData;
use super::*;
use crate::{state::AppState, WebConfig};
use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{HeaderMap, HeaderValue, Method, Request},
};

/// Helper to create request parts carrying the given headers
async fn create_test_parts_with_headers(headers: HeaderMap) -> (axum::http::request::Parts, AppState) {
    let mut request = Request::builder()
        .method(Method::GET)
        .uri("/test")
        .body(Body::empty())
        .unwrap();

    *request.headers_mut() = headers;

    let (parts, _) = request.into_parts();
    let state = AppState::new(WebConfig::default()).await.unwrap();
    (parts, state)
}

fn headers_with_bearer_token(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    let auth_value = format!("Bearer {}", token);
    headers.insert("authorization", HeaderValue::from_str(&auth_value).unwrap());
    headers
}

fn test_user(role: Role) -> UserData {
    UserData::new(
        "Ann".to_string(),
        "ann@x.com".to_string(),
        "abcdef",
        role,
    )
    .unwrap()
}

#[tokio::test]
async fn test_extraction_with_valid_token() {
    let (mut parts, state) = create_test_parts_with_headers(HeaderMap::new()).await;
    let user = test_user(Role::User);
    let token = state.tokens.issue(&user).unwrap();
    parts.headers = headers_with_bearer_token(&token);

    let result = AuthUser::from_request_parts(&mut parts, &state).await;

    let auth = result.unwrap();
    assert_eq!(auth.id, user.id);
    assert_eq!(auth.email, "ann@x.com");
    assert!(!auth.is_admin());
}

#[tokio::test]
async fn test_extraction_without_header() {
    let (mut parts, state) = create_test_parts_with_headers(HeaderMap::new()).await;

    let result = AuthUser::from_request_parts(&mut parts, &state).await;

    assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
}

#[tokio::test]
async fn test_extraction_with_wrong_scheme() {
    let mut headers = HeaderMap::new();
    headers.insert("authorization", HeaderValue::from_static("Basic dXNlcjpwdw=="));
    let (mut parts, state) = create_test_parts_with_headers(headers).await;

    let result = AuthUser::from_request_parts(&mut parts, &state).await;

    assert!(matches!(result, Err(AuthError::MalformedToken)));
}

#[tokio::test]
async fn test_extraction_with_garbage_token() {
    let headers = headers_with_bearer_token("definitely-not-a-jwt");
    let (mut parts, state) = create_test_parts_with_headers(headers).await;

    let result = AuthUser::from_request_parts(&mut parts, &state).await;

    assert!(matches!(result, Err(AuthError::MalformedToken)));
}

#[tokio::test]
async fn test_admin_extractor_rejects_user_role() {
    let (mut parts, state) = create_test_parts_with_headers(HeaderMap::new()).await;
    let token = state.tokens.issue(&test_user(Role::User)).unwrap();
    parts.headers = headers_with_bearer_token(&token);

    let result = AdminUser::from_request_parts(&mut parts, &state).await;

    assert!(matches!(result, Err(AuthError::Forbidden)));
}

#[tokio::test]
async fn test_admin_extractor_accepts_admin_role() {
    let (mut parts, state) = create_test_parts_with_headers(HeaderMap::new()).await;
    let token = state.tokens.issue(&test_user(Role::Admin)).unwrap();
    parts.headers = headers_with_bearer_token(&token);

    let result = AdminUser::from_request_parts(&mut parts, &state).await;

    let AdminUser(user) = result.unwrap();
    assert!(user.is_admin());
}
