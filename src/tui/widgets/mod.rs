//! TUI widgets
//!
//! Custom ratatui widgets for the session manager:
//! - `SessionList` - Saved sessions in display order
//! - `SettingsForm` - Connection settings of the selected session

mod session_list;
mod settings_form;

pub use session_list::*;
pub use settings_form::*;
