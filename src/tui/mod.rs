//! Terminal UI module using ratatui
//!
//! Event-driven TUI with:
//! - Saved session list with modified markers
//! - Settings form for the selected session
//! - Modal overlays for rename, delete confirmation, help and errors

mod app;
mod event;
mod theme;
mod widgets;

pub use app::*;
pub use event::*;
pub use theme::*;
