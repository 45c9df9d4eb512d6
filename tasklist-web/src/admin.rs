//! Admin aggregate views
//!
//! Every route except the elevation-code check requires the admin role.

pub mod handlers;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Elevation-code check request
#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyCodeRequest {
    pub admin_code: String,
}

/// Aggregate counters across all users
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminStats {
    pub total_users: u64,
    pub total_todos: u64,
    pub completed_todos: u64,
    pub pending_todos: u64,
}
