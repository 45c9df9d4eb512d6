//! Request middleware

use crate::{ApiError, AppState};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

/// Pre-flight persistence guard shared by every protected router.
///
/// One availability check per request; handlers behind it never probe
/// the database themselves. Memory-backed deployments pass trivially.
pub async fn require_store(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(database) = &state.database {
        if let Err(e) = database.ping().await {
            warn!("Rejecting request: store unavailable");
            return ApiError::from(e).into_response();
        }
    }

    next.run(request).await
}
