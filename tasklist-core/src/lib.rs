//! Tasklist Core - Shared foundations for the tasklist service
//!
//! This crate defines the error taxonomy, logging setup, and core domain
//! types shared by every other tasklist crate.

pub mod error;
pub mod logging;
pub mod types;

pub use error::*;
pub use logging::*;
pub use types::*;

// Re-export commonly used external types
pub use tracing;
