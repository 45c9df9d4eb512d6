//! Main web server implementation using Axum

use crate::{create_app, AppState, WebConfig, WebError, WebResult};
use axum::serve;
use tokio::net::TcpListener;
use tracing::{error, info};

/// Main tasklist web server
pub struct TasklistServer {
    config: WebConfig,
    state: AppState,
}

impl TasklistServer {
    /// Create a new server
    pub async fn new(config: WebConfig) -> WebResult<Self> {
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Start the web server
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.address();

        info!("Starting tasklist web server");
        info!("Server address: http://{}", address);
        info!("Development mode: {}", self.config.dev_mode);

        // Create the application
        let app = create_app(self.state.clone());

        // Create TCP listener
        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("Server listening on http://{}", address);

        // Start the server
        if let Err(e) = serve(listener, app).await {
            error!("Server error: {}", e);
            return Err(WebError::Server(e));
        }

        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &WebConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}

/// Builder for TasklistServer
pub struct TasklistServerBuilder {
    config: WebConfig,
}

impl TasklistServerBuilder {
    /// Create a new server builder from environment configuration
    pub fn new() -> Self {
        Self {
            config: WebConfig::from_env(),
        }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Enable development mode
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.dev_mode = dev_mode;
        self
    }

    /// Set the database URL
    pub fn database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.config.database_url = Some(database_url.into());
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<TasklistServer> {
        TasklistServer::new(self.config).await
    }
}

impl Default for TasklistServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_server_creation() {
        let config = WebConfig::default();
        let server = TasklistServer::new(config).await;
        assert!(server.is_ok());
    }

    #[test]
    fn test_server_builder() {
        let builder = TasklistServerBuilder::new()
            .host("localhost")
            .port(3000)
            .dev_mode(true);

        assert_eq!(builder.config.host, "localhost");
        assert_eq!(builder.config.port, 3000);
        assert!(builder.config.dev_mode);
    }
}
