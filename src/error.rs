//! Error types for session-manager
//!
//! Uses `thiserror` for ergonomic error definitions with automatic `Display` and `Error` impls.

use std::path::PathBuf;

use thiserror::Error;

use crate::session::SessionId;

/// Top-level error type for session-manager
#[derive(Error, Debug)]
pub enum Error {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TUI error: {0}")]
    Tui(#[from] TuiError),
}

/// Persisted session store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// The `sessions` table does not exist yet
    #[error("Session table does not exist")]
    SchemaMissing,

    #[error("Session not found: {0}")]
    NotFound(SessionId),

    /// The backing store could not be opened at all
    #[error("Cannot open session store at {path}: {reason}")]
    Unavailable { path: PathBuf, reason: String },

    #[error("Session store has already been closed")]
    Closed,

    #[error("Invalid session record {id}: {reason}")]
    InvalidRecord { id: SessionId, reason: String },

    #[error("Query failed: {0}")]
    Query(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Query(e.to_string())
    }
}

/// Session registry errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Index {index} out of range for {len} session(s)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No session is selected")]
    NoSelection,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),

    #[error("Failed to create config directory: {0}")]
    DirectoryCreationFailed(PathBuf),
}

/// TUI-related errors
#[derive(Error, Debug)]
pub enum TuiError {
    #[error("Failed to initialize terminal: {0}")]
    InitFailed(String),

    #[error("Failed to restore terminal: {0}")]
    RestoreFailed(String),

    #[error("Render error: {0}")]
    RenderError(String),
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;
