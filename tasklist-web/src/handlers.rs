//! Health check handlers

use crate::AppState;
use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Health check response
#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    /// `connected`, `disconnected`, or `memory`
    pub database: String,
    pub timestamp: DateTime<Utc>,
    #[schema(example = "0.1.0")]
    pub version: String,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    summary = "Health check",
    description = "Check the server and database status",
    responses(
        (status = 200, description = "Server is up", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match &state.database {
        Some(db) => {
            if db.ping().await.is_ok() {
                "connected"
            } else {
                "disconnected"
            }
        }
        None => "memory",
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        database: database.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
