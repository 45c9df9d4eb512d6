//! Unified logging system
//!
//! Provides structured logging with configurable output

use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Whether to include file and line information
    pub include_location: bool,
    /// Log file path; logs go to stdout when unset
    pub log_file_path: Option<String>,
    /// Custom filter directives
    pub filter_directives: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            log_file_path: None,
            filter_directives: vec![
                "tasklist_core=debug".to_string(),
                "tasklist_web=debug".to_string(),
            ],
        }
    }
}

/// Initialize the logging system
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    // Add custom filter directives
    for directive in &config.filter_directives {
        filter = filter.add_directive(directive.parse()?);
    }

    let log_file = match &config.log_file_path {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            Some(Mutex::new(file))
        }
        None => None,
    };

    let fmt_layer = fmt::layer()
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    let fmt_layer: Box<dyn Layer<_> + Send + Sync> = match (&config.format, log_file) {
        (LogFormat::Json, Some(file)) => fmt_layer.json().with_writer(file).boxed(),
        (LogFormat::Json, None) => fmt_layer.json().boxed(),
        (LogFormat::Pretty, Some(file)) => fmt_layer.pretty().with_writer(file).boxed(),
        (LogFormat::Pretty, None) => fmt_layer.pretty().boxed(),
        (LogFormat::Compact, Some(file)) => fmt_layer.compact().with_writer(file).boxed(),
        (LogFormat::Compact, None) => fmt_layer.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    Ok(())
}
