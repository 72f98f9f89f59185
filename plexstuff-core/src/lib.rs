//! Plexstuff Core - configuration and shared building blocks
//!
//! This crate provides the pieces every plexstuff tool leans on: the
//! service configuration store, indexer credentials, runtime configuration,
//! size and duration formatting, and tracing setup.

pub mod config;
pub mod credentials;
pub mod format;
pub mod store;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::PlexstuffConfig;
pub use credentials::IndexerCredential;
pub use store::{JsonFileStore, MemoryStore, ServiceStore};

/// Core errors that can bubble up from any plexstuff subsystem.
#[derive(Debug, thiserror::Error)]
pub enum PlexstuffError {
    #[error("Service store error: {reason}")]
    Store { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlexstuffError>;
