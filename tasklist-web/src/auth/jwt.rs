//! JWT session token issuance and verification

use super::users::UserData;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tasklist_core::{Role, TasklistError};
use tracing::{debug, warn};

/// Session token lifetime: tokens are stateless, so expiry is the only
/// server-side end of life
const TOKEN_TTL_DAYS: i64 = 7;

/// JWT signing and verification keys
struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (identity id)
    pub sub: String,
    /// Login email at issuance time
    pub email: String,
    /// Role at issuance time
    pub role: Role,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a session token expiring in [`TOKEN_TTL_DAYS`]
    pub fn new(id: String, email: String, role: Role) -> Self {
        let now = Utc::now();
        let exp = now + Duration::days(TOKEN_TTL_DAYS);

        Self {
            sub: id,
            email,
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("All fields are required")]
    MissingCredentials,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password must be at least 6 characters")]
    PasswordTooShort,
    #[error("An account with this email already exists")]
    AlreadyExists,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Password hashing failed")]
    PasswordHash,
    #[error("Token creation failed")]
    TokenCreation,
    #[error("Missing authorization header")]
    MissingAuthHeader,
    #[error("Malformed token")]
    MalformedToken,
    #[error("Invalid token signature")]
    SignatureInvalid,
    #[error("Token expired")]
    TokenExpired,
    #[error("Insufficient privileges")]
    Forbidden,
    #[error(transparent)]
    Store(#[from] TasklistError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            AuthError::MissingCredentials => (
                StatusCode::BAD_REQUEST,
                "missing_fields",
                "All fields are required".to_string(),
            ),
            AuthError::InvalidEmail => (
                StatusCode::BAD_REQUEST,
                "invalid_email",
                "Invalid email address".to_string(),
            ),
            AuthError::PasswordTooShort => (
                StatusCode::BAD_REQUEST,
                "invalid_password",
                "Password must be at least 6 characters".to_string(),
            ),
            AuthError::AlreadyExists => (
                StatusCode::BAD_REQUEST,
                "already_exists",
                "An account with this email already exists".to_string(),
            ),
            // One generic body for unknown email and wrong password alike,
            // so the response cannot be used to enumerate accounts
            AuthError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                "invalid_credentials",
                "Invalid credentials".to_string(),
            ),
            AuthError::PasswordHash | AuthError::TokenCreation => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            ),
            // Every token failure renders the same body; which check
            // failed is never revealed to the caller
            AuthError::MissingAuthHeader
            | AuthError::MalformedToken
            | AuthError::SignatureInvalid
            | AuthError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "Authentication required".to_string(),
            ),
            AuthError::Forbidden => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "Insufficient privileges".to_string(),
            ),
            AuthError::Store(err) => {
                err.log();
                match err {
                    TasklistError::Storage { .. } => (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "store_unavailable",
                        "Database connection not available. Please try again later.".to_string(),
                    ),
                    TasklistError::Duplicate { .. } => (
                        StatusCode::BAD_REQUEST,
                        "already_exists",
                        "An account with this email already exists".to_string(),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal_error",
                        "Internal server error".to_string(),
                    ),
                }
            }
        };

        let body = Json(json!({
            "error": error_code,
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Token issuer/verifier holding the process-wide signing secret.
///
/// Constructed once from configuration and stored in the application
/// state; no component reads the secret from ambient globals.
#[derive(Clone)]
pub struct TokenService {
    keys: Arc<Keys>,
}

impl TokenService {
    /// Create a token service from the configured signing secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            keys: Arc::new(Keys::new(secret)),
        }
    }

    /// Issue a session token for an identity
    pub fn issue(&self, user: &UserData) -> Result<String, AuthError> {
        let claims = Claims::new(user.id.clone(), user.email.clone(), user.role);
        encode(&Header::default(), &claims, &self.keys.encoding).map_err(|e| {
            warn!("Failed to encode session token: {}", e);
            AuthError::TokenCreation
        })
    }

    /// Verify a token and return its embedded claims.
    ///
    /// Self-contained check: no store lookup happens here, so an identity
    /// deactivated after issuance stays valid until natural expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(token, &self.keys.decoding, &Validation::default())
            .map_err(|e| {
                debug!("Token verification failed: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    ErrorKind::InvalidSignature => AuthError::SignatureInvalid,
                    _ => AuthError::MalformedToken,
                }
            })?;

        Ok(token_data.claims)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}
