//! Session Manager - saved database connection profiles
//!
//! Keeps a list of named connection sessions in SQLite and lets the user
//! create, edit, rename, save and delete them before opening one.
//!
//! # Architecture
//!
//! - **SessionStore** - durable CRUD over the `sessions` table
//! - **SessionRegistry** - ordered session list, edit buffer with dirty
//!   tracking, insert-or-update saves and index realignment on delete
//! - **App** - terminal UI that drives the registry and renders its signals
//!
//! # Modules
//!
//! - [`session`] - Session records, registry entries and the registry
//! - [`store`] - SQLite and in-memory session stores
//! - [`tui`] - Event-driven terminal UI with ratatui
//! - [`config`] - Layered configuration
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod session;
pub mod store;
pub mod tui;

pub use config::Config;
pub use error::{Error, Result};
pub use session::{
    FieldEdit, ManagerOutcome, NetworkType, RegistryEntry, RegistryObserver, SessionId,
    SessionRecord, SessionRegistry,
};
pub use store::{MemorySessionStore, SessionStore, SqliteSessionStore};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
