//! Authentication and authorization
//!
//! Bearer-token extractors resolve the caller's identity once per request;
//! handlers receive the resolved identity and never touch the raw token.

pub mod database;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod users;

#[cfg(test)]
mod tests;

use crate::AppState;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use jwt::AuthError;
use tasklist_core::Role;
use tracing::warn;

/// Identity resolved from a verified session token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    /// Whether this identity carries the admin role
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::MalformedToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::MalformedToken)?;

        let claims = app_state.tokens.verify(token)?;

        Ok(AuthUser {
            id: claims.sub,
            email: claims.email,
            role: claims.role,
        })
    }
}

/// Admin gate: a valid identity with the wrong role is rejected with
/// Forbidden, distinct from the uniform Unauthenticated rejection
#[derive(Debug)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        if user.is_admin() {
            Ok(AdminUser(user))
        } else {
            warn!(user_id = %user.id, "Admin access required");
            Err(AuthError::Forbidden)
        }
    }
}
