//! Session management module
//!
//! Provides the connection profile model and the registry:
//! - `SessionRecord` - a saved (or not yet saved) connection profile
//! - `SessionRegistry` - ordered session list plus the active edit buffer

mod registry;
mod types;

pub use registry::*;
pub use types::*;
