//! Tasklist Web Server
//!
//! Multi-tenant task list service: registration, login, JWT session
//! tokens, and ownership-scoped task records with an admin aggregate
//! view.

pub mod admin;
pub mod auth;
pub mod database;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod state;
pub mod todos;

// Re-export main types
pub use server::TasklistServer;
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Json, Response},
    Router,
};
use serde_json::json;
use tasklist_core::TasklistError;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_origin("http://127.0.0.1:3000".parse::<HeaderValue>().unwrap())
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_credentials(true)
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    // Create the main router
    Router::new()
        .nest("/api", routes::api_routes(state.clone()))
        .merge(routes::docs_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024)) // 1MB max body size
        .with_state(state)
}

/// Configuration for the web server
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable development mode
    pub dev_mode: bool,
    /// Database URL; in-memory stores when unset
    pub database_url: Option<String>,
    /// Signing secret for session tokens
    pub jwt_secret: String,
    /// Reference value for the admin elevation code.
    /// One shared code, no rotation, no audit trail.
    pub admin_code: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
            database_url: None,
            jwt_secret: "tasklist-default-secret-change-in-production".to_string(),
            admin_code: "ADMIN12345".to_string(),
        }
    }
}

impl WebConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("TASKLIST_HOST").unwrap_or(defaults.host),
            port: std::env::var("TASKLIST_PORT")
                .ok()
                .and_then(|port| port.parse().ok())
                .unwrap_or(defaults.port),
            dev_mode: std::env::var("TASKLIST_DEV_MODE")
                .ok()
                .and_then(|flag| flag.parse().ok())
                .unwrap_or(defaults.dev_mode),
            database_url: std::env::var("DATABASE_URL").ok(),
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            admin_code: std::env::var("TASKLIST_ADMIN_CODE").unwrap_or(defaults.admin_code),
        }
    }

    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

/// HTTP rendering of the shared error taxonomy.
///
/// Internal detail stays in the logs; the client sees the status code
/// and a stable error code with a generic message.
#[derive(Debug)]
pub struct ApiError(pub TasklistError);

impl From<TasklistError> for ApiError {
    fn from(err: TasklistError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        err.log();

        let (status, error_code, message) = match &err {
            TasklistError::Validation { message, .. } => {
                (StatusCode::BAD_REQUEST, "validation_error", message.clone())
            }
            TasklistError::Duplicate { resource, .. } => (
                StatusCode::BAD_REQUEST,
                "already_exists",
                format!("{} already exists", resource),
            ),
            TasklistError::Authentication { .. } => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                "Authentication required".to_string(),
            ),
            TasklistError::Forbidden { .. } => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "Insufficient privileges".to_string(),
            ),
            TasklistError::NotFound { resource, .. } => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("{} not found", resource),
            ),
            TasklistError::Storage { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "store_unavailable",
                "Database connection not available. Please try again later.".to_string(),
            ),
            TasklistError::Internal { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_code,
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Initialize logging for the web server
pub fn init_logging(log_level: &str) {
    let config = tasklist_core::LoggingConfig {
        level: log_level.to_string(),
        filter_directives: vec![
            format!("tasklist_web={}", log_level),
            format!("tasklist_core={}", log_level),
            "tower_http=debug".to_string(),
        ],
        ..Default::default()
    };

    if let Err(e) = tasklist_core::init_logging(&config) {
        eprintln!("Failed to initialize logging: {}", e);
    }
}
