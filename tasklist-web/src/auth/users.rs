//! User management and authentication

use super::{
    database::DatabaseUserStore,
    jwt::{AuthError, TokenService},
    password,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tasklist_core::{duplicate_error, Role, TasklistResult};
use tracing::{debug, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

const COMPONENT: &str = "user-store";

/// User registration request
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Out-of-band elevation code; a matching value grants the admin role
    #[serde(default)]
    pub admin_code: Option<String>,
}

/// User login request
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration/login response
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserInfo,
}

/// Public user information; the password digest is never serialized
#[derive(Debug, Serialize, Clone, ToSchema)]
pub struct UserInfo {
    pub id: String,
    pub name: String,
    pub email: String,
    #[schema(value_type = String, example = "user")]
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Internal user record with password digest
#[derive(Debug, Clone)]
pub struct UserData {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserData {
    /// Create a new user record with a hashed password
    pub fn new(name: String, email: String, secret: &str, role: Role) -> Result<Self, AuthError> {
        let password_hash = password::hash(secret).map_err(|e| {
            warn!("Password hashing failed: {}", e);
            AuthError::PasswordHash
        })?;

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash,
            role,
            created_at: Utc::now(),
        })
    }

    /// Verify a plaintext password against the stored digest
    pub fn verify_password(&self, secret: &str) -> bool {
        match password::verify(secret, &self.password_hash) {
            Ok(matched) => matched,
            Err(e) => {
                warn!(user_id = %self.id, "Stored password digest unusable: {}", e);
                false
            }
        }
    }

    /// Convert to public user info
    pub fn to_user_info(&self) -> UserInfo {
        UserInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// Lowercase and trim an email so lookups and uniqueness checks are
/// case- and whitespace-insensitive
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Email shape check: exactly one `@` with non-empty local and domain parts
pub fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => !local.is_empty() && !domain.is_empty(),
        _ => false,
    }
}

/// User store supporting both in-memory and database storage
#[derive(Debug, Clone)]
pub enum UserStore {
    /// In-memory storage (for development and testing), keyed by
    /// normalized email
    Memory {
        users: Arc<RwLock<HashMap<String, UserData>>>,
    },
    /// Database storage (for production)
    Database(DatabaseUserStore),
}

impl UserStore {
    /// Create an in-memory user store
    pub fn memory() -> Self {
        Self::Memory {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a database-backed user store
    pub fn database(store: DatabaseUserStore) -> Self {
        Self::Database(store)
    }

    /// Insert a new user; the store is the authority on email uniqueness.
    ///
    /// The memory store checks and inserts under one write lock, the
    /// database store relies on the UNIQUE column constraint, so a race
    /// between two registrations leaves exactly one record and hands the
    /// loser a structured duplicate error.
    pub async fn insert(&self, user: UserData) -> TasklistResult<UserData> {
        match self {
            Self::Memory { users } => {
                let mut users = users.write().unwrap();
                if users.contains_key(&user.email) {
                    return Err(duplicate_error!("user", COMPONENT));
                }
                users.insert(user.email.clone(), user.clone());
                Ok(user)
            }
            Self::Database(store) => store.insert(user).await,
        }
    }

    /// Look up a user by normalized email
    pub async fn find_by_email(&self, email: &str) -> TasklistResult<Option<UserData>> {
        match self {
            Self::Memory { users } => Ok(users.read().unwrap().get(email).cloned()),
            Self::Database(store) => store.find_by_email(email).await,
        }
    }

    /// Look up a user by id
    pub async fn find_by_id(&self, id: &str) -> TasklistResult<Option<UserData>> {
        match self {
            Self::Memory { users } => Ok(users
                .read()
                .unwrap()
                .values()
                .find(|u| u.id == id)
                .cloned()),
            Self::Database(store) => store.find_by_id(id).await,
        }
    }

    /// All users, oldest first
    pub async fn list_all(&self) -> TasklistResult<Vec<UserData>> {
        match self {
            Self::Memory { users } => {
                let mut all: Vec<UserData> = users.read().unwrap().values().cloned().collect();
                all.sort_by(|a, b| a.created_at.cmp(&b.created_at));
                Ok(all)
            }
            Self::Database(store) => store.list_all().await,
        }
    }

    /// Total number of users
    pub async fn count(&self) -> TasklistResult<u64> {
        match self {
            Self::Memory { users } => Ok(users.read().unwrap().len() as u64),
            Self::Database(store) => store.count().await,
        }
    }
}

/// Registration and login orchestration
#[derive(Debug, Clone)]
pub struct UserService {
    store: UserStore,
    tokens: TokenService,
    admin_code: String,
}

impl UserService {
    /// Create a user service over a store, with the token service and
    /// elevation reference code injected from configuration
    pub fn new(store: UserStore, tokens: TokenService, admin_code: String) -> Self {
        Self {
            store,
            tokens,
            admin_code,
        }
    }

    /// Register a new user and issue a session token
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse, AuthError> {
        if request.name.trim().is_empty()
            || request.email.trim().is_empty()
            || request.password.is_empty()
        {
            debug!("Registration failed: missing fields");
            return Err(AuthError::MissingCredentials);
        }

        let email = normalize_email(&request.email);
        if !is_valid_email(&email) {
            debug!("Registration failed: invalid email shape");
            return Err(AuthError::InvalidEmail);
        }

        if request.password.chars().count() < 6 {
            debug!("Registration failed: password too short");
            return Err(AuthError::PasswordTooShort);
        }

        // Role is fixed at registration time; no exposed operation
        // changes it afterwards
        let role = match request.admin_code.as_deref() {
            Some(code) if code == self.admin_code => Role::Admin,
            _ => Role::User,
        };

        let user = UserData::new(request.name.trim().to_string(), email, &request.password, role)?;

        // The pre-check in the store (or the UNIQUE constraint) is the
        // authoritative duplicate signal; nothing is persisted on failure
        let user = self.store.insert(user).await.map_err(|e| match e {
            tasklist_core::TasklistError::Duplicate { .. } => AuthError::AlreadyExists,
            other => AuthError::Store(other),
        })?;

        let token = self.tokens.issue(&user)?;
        info!(user_id = %user.id, role = %user.role, "Registered new user");

        Ok(AuthResponse {
            token,
            user: user.to_user_info(),
        })
    }

    /// Authenticate a user and issue a session token
    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse, AuthError> {
        if request.email.trim().is_empty() || request.password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        let email = normalize_email(&request.email);

        // Unknown email and wrong password take the same exit so the
        // failure cannot be used to probe which accounts exist
        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.verify_password(&request.password) {
            debug!(user_id = %user.id, "Login failed: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(&user)?;
        debug!(user_id = %user.id, "User authenticated");

        Ok(AuthResponse {
            token,
            user: user.to_user_info(),
        })
    }

    /// Look up a user by id
    pub async fn get_user_by_id(&self, id: &str) -> TasklistResult<Option<UserData>> {
        self.store.find_by_id(id).await
    }

    /// Whether the supplied code matches the configured elevation code
    pub fn verify_admin_code(&self, code: &str) -> bool {
        code == self.admin_code
    }

    /// Access the underlying store
    pub fn store(&self) -> &UserStore {
        &self.store
    }
}
