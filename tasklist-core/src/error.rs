//! Unified error handling system
//!
//! Provides structured error types with context and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type TasklistResult<T> = Result<T, TasklistError>;

/// Error context providing additional information for debugging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the tasklist system
#[derive(Error, Debug)]
pub enum TasklistError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },

    #[error("Already exists: {resource}")]
    Duplicate {
        resource: String,
        context: ErrorContext,
    },

    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        context: ErrorContext,
    },

    #[error("Forbidden: {message}")]
    Forbidden {
        message: String,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },
}

impl TasklistError {
    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            TasklistError::Validation { context, .. } => context,
            TasklistError::Duplicate { context, .. } => context,
            TasklistError::Authentication { context, .. } => context,
            TasklistError::Forbidden { context, .. } => context,
            TasklistError::NotFound { context, .. } => context,
            TasklistError::Storage { context, .. } => context,
            TasklistError::Internal { context, .. } => context,
        }
    }

    /// Check if error is recoverable by retrying later
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TasklistError::Storage { .. })
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        match self {
            TasklistError::Internal { .. } => {
                error!(
                    error_id = %self.context().error_id,
                    error = %self,
                    "Internal error occurred"
                );
            }
            TasklistError::Storage { .. } => {
                warn!(
                    error_id = %self.context().error_id,
                    error = %self,
                    "Storage error (may be recoverable)"
                );
            }
            _ => {
                warn!(
                    error_id = %self.context().error_id,
                    error = %self,
                    "Request failed"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $component:expr) => {
        $crate::TasklistError::Validation {
            message: $msg.to_string(),
            field: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::TasklistError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[macro_export]
macro_rules! duplicate_error {
    ($resource:expr, $component:expr) => {
        $crate::TasklistError::Duplicate {
            resource: $resource.to_string(),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr, $component:expr) => {
        $crate::TasklistError::NotFound {
            resource: $resource.to_string(),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! storage_error {
    ($msg:expr, $component:expr) => {
        $crate::TasklistError::Storage {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check that the database is reachable"),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::TasklistError::Storage {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check that the database is reachable"),
        }
    };
}
