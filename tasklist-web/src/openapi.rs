//! OpenAPI specification for the tasklist service

use axum::response::Json;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

/// Main OpenAPI specification
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tasklist API",
        version = "0.1.0",
        description = "Multi-tenant task list service with JWT authentication",
        license(name = "MIT OR Apache-2.0")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    paths(
        // Health
        crate::handlers::health_check,

        // Task records
        crate::todos::handlers::list_todos,
        crate::todos::handlers::create_todo,
        crate::todos::handlers::completed_todos,
        crate::todos::handlers::incomplete_todos,
        crate::todos::handlers::todos_by_date,
        crate::todos::handlers::todos_by_range,
        crate::todos::handlers::get_todo,
        crate::todos::handlers::update_todo,
        crate::todos::handlers::set_completed,
        crate::todos::handlers::delete_todo,

        // Admin
        crate::admin::handlers::verify_admin_code,
        crate::admin::handlers::list_users,
        crate::admin::handlers::list_all_todos,
        crate::admin::handlers::stats,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Todos", description = "Ownership-scoped task records"),
        (name = "Admin", description = "Aggregate views for the admin role")
    )
)]
pub struct ApiDoc;

/// Registers the bearer-token security scheme referenced by the paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serve the generated document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
