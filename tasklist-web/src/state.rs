//! Application state management

use crate::{
    auth::{
        database::DatabaseUserStore,
        jwt::TokenService,
        users::{UserService, UserStore},
    },
    database::DatabaseService,
    todos::{database::DatabaseTodoStore, store::TodoStore},
    WebConfig, WebError, WebResult,
};
use std::sync::Arc;
use tracing::info;

/// Shared application state.
///
/// Every component gets its collaborators here, at construction: the
/// signing secret, the elevation code, and the stores are injected
/// configuration, not ambient globals.
#[derive(Clone)]
pub struct AppState {
    /// Configuration
    pub config: WebConfig,
    /// Database service; `None` runs on in-memory stores
    pub database: Option<Arc<DatabaseService>>,
    /// Token issuer/verifier
    pub tokens: TokenService,
    /// Registration and login orchestration
    pub user_service: UserService,
    /// Task record store
    pub todo_store: TodoStore,
}

impl AppState {
    /// Create the application state.
    ///
    /// A configured database URL that cannot be reached fails startup;
    /// silently falling back to memory would hide a dead store behind
    /// 200 responses.
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        if config.jwt_secret.is_empty() {
            return Err(WebError::Config(
                "JWT secret must not be empty".to_string(),
            ));
        }

        let tokens = TokenService::new(config.jwt_secret.as_bytes());

        let database = match &config.database_url {
            Some(url) => {
                let service = DatabaseService::new(url)
                    .await
                    .map_err(|e| WebError::Database(e.to_string()))?;
                Some(Arc::new(service))
            }
            None => None,
        };

        let (user_store, todo_store) = match &database {
            Some(db) => (
                UserStore::database(DatabaseUserStore::new(db.pool().clone())),
                TodoStore::database(DatabaseTodoStore::new(db.pool().clone())),
            ),
            None => {
                info!("No database configured, using in-memory stores");
                (UserStore::memory(), TodoStore::memory())
            }
        };

        let user_service =
            UserService::new(user_store, tokens.clone(), config.admin_code.clone());

        info!("Application state initialized");

        Ok(Self {
            config,
            database,
            tokens,
            user_service,
            todo_store,
        })
    }
}
