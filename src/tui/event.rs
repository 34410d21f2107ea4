//! Event handling for the TUI
//!
//! Provides an event channel that combines:
//! - Terminal input events (keyboard, mouse)
//! - Registry signals forwarded by [`ChannelObserver`]
//! - Render ticks

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyCode, KeyEvent, KeyModifiers};
use futures::{FutureExt, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

use crate::session::{RegistryEntry, RegistryObserver, SessionRecord};

/// Application events
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Terminal input event
    Input(InputEvent),
    /// Signal from the session registry
    StateUpdate(StateUpdate),
    /// Render tick
    Tick,
}

/// Input events from the terminal
#[derive(Debug, Clone)]
pub enum InputEvent {
    /// Key press
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
}

/// Registry signals, in the order the registry emitted them
#[derive(Debug, Clone)]
pub enum StateUpdate {
    /// No sessions exist
    SchemaEmpty,
    /// At least one session exists
    SchemaPopulated,
    /// Session list changed
    EntriesChanged(Vec<RegistryEntry>),
    /// Selected session became dirty or clean
    DirtyChanged(bool),
    /// A session was loaded into the edit buffer
    SelectionLoaded { index: usize, record: SessionRecord },
}

/// Which pane receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusedPane {
    #[default]
    SessionList,
    Settings,
}

/// User commands triggered by input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Move up (list row or form field)
    NavigateUp,
    /// Move down (list row or form field)
    NavigateDown,
    /// Create a new unsaved session
    NewSession,
    /// Save the selected session
    SaveSession,
    /// Delete the selected session
    DeleteSession,
    /// Rename the selected session
    RenameSession,
    /// Finish with the selected session
    OpenSession,
    /// Switch between list and form
    TogglePane,
    /// Cycle a choice field
    CycleOption,
    /// Show help
    ShowHelp,
    /// Leave the session manager without opening
    Cancel,
    /// Leave the form for the list
    Back,
    /// Text input into the focused field
    TextInput(char),
    /// Backspace in the focused field
    Backspace,
}

impl UserCommand {
    /// Convert a key event to a user command for the focused pane
    pub fn from_key(key: KeyEvent, focus: FocusedPane) -> Option<Self> {
        // Bindings that work everywhere
        match (key.code, key.modifiers) {
            (KeyCode::Char('s'), KeyModifiers::CONTROL) => return Some(UserCommand::SaveSession),
            (KeyCode::Char('n'), KeyModifiers::CONTROL) => return Some(UserCommand::NewSession),
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => return Some(UserCommand::Cancel),
            (KeyCode::F(2), _) => return Some(UserCommand::RenameSession),
            (KeyCode::Tab, _) | (KeyCode::BackTab, _) => return Some(UserCommand::TogglePane),
            _ => {}
        }

        match focus {
            FocusedPane::SessionList => match (key.code, key.modifiers) {
                (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => {
                    Some(UserCommand::NavigateUp)
                }
                (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => {
                    Some(UserCommand::NavigateDown)
                }
                (KeyCode::Enter, _) => Some(UserCommand::OpenSession),
                (KeyCode::Char('n'), KeyModifiers::NONE) => Some(UserCommand::NewSession),
                (KeyCode::Char('s'), KeyModifiers::NONE) => Some(UserCommand::SaveSession),
                (KeyCode::Char('d'), KeyModifiers::NONE) | (KeyCode::Delete, _) => {
                    Some(UserCommand::DeleteSession)
                }
                (KeyCode::Char('r'), KeyModifiers::NONE) => Some(UserCommand::RenameSession),
                (KeyCode::Char('?'), _) => Some(UserCommand::ShowHelp),
                (KeyCode::Char('q'), KeyModifiers::NONE) | (KeyCode::Esc, _) => {
                    Some(UserCommand::Cancel)
                }
                _ => None,
            },
            FocusedPane::Settings => match (key.code, key.modifiers) {
                (KeyCode::Up, _) => Some(UserCommand::NavigateUp),
                (KeyCode::Down, _) | (KeyCode::Enter, _) => Some(UserCommand::NavigateDown),
                (KeyCode::Left, _) | (KeyCode::Right, _) => Some(UserCommand::CycleOption),
                (KeyCode::Esc, _) => Some(UserCommand::Back),
                (KeyCode::Backspace, _) => Some(UserCommand::Backspace),
                (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                    Some(UserCommand::TextInput(c))
                }
                _ => None,
            },
        }
    }
}

/// Registry observer that posts every signal into the event channel
pub struct ChannelObserver {
    tx: mpsc::Sender<AppEvent>,
}

impl ChannelObserver {
    /// Create an observer posting to `tx`
    pub fn new(tx: mpsc::Sender<AppEvent>) -> Self {
        Self { tx }
    }

    fn post(&self, update: StateUpdate) {
        if let Err(e) = self.tx.try_send(AppEvent::StateUpdate(update)) {
            debug!("Dropped registry signal: {}", e);
        }
    }
}

impl RegistryObserver for ChannelObserver {
    fn on_schema_empty(&mut self) {
        self.post(StateUpdate::SchemaEmpty);
    }

    fn on_schema_populated(&mut self) {
        self.post(StateUpdate::SchemaPopulated);
    }

    fn on_entry_list_changed(&mut self, entries: &[RegistryEntry]) {
        self.post(StateUpdate::EntriesChanged(entries.to_vec()));
    }

    fn on_dirty_state_changed(&mut self, dirty: bool) {
        self.post(StateUpdate::DirtyChanged(dirty));
    }

    fn on_selection_loaded(&mut self, index: usize, record: &SessionRecord) {
        self.post(StateUpdate::SelectionLoaded {
            index,
            record: record.clone(),
        });
    }
}

/// Event loop handle
pub struct EventLoop {
    /// Sender for events
    tx: mpsc::Sender<AppEvent>,
    /// Receiver for events
    rx: mpsc::Receiver<AppEvent>,
}

impl EventLoop {
    /// Create a new event loop
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(256);
        Self { tx, rx }
    }

    /// Get a sender for posting events
    pub fn sender(&self) -> mpsc::Sender<AppEvent> {
        self.tx.clone()
    }

    /// Start the event loop
    ///
    /// This spawns background tasks for:
    /// - Terminal input
    /// - Render ticks
    pub fn start(&mut self, tick_rate: Duration) {
        let tx = self.tx.clone();

        // Terminal input task - single long-running reader
        tokio::spawn(async move {
            let mut reader = EventStream::new();

            loop {
                let event = reader.next().fuse().await;

                match event {
                    Some(Ok(event)) => {
                        let app_event = match event {
                            CrosstermEvent::Key(key) => AppEvent::Input(InputEvent::Key(key)),
                            CrosstermEvent::Resize(w, h) => {
                                AppEvent::Input(InputEvent::Resize(w, h))
                            }
                            _ => continue,
                        };

                        if tx.send(app_event).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("Error reading terminal event: {}", e);
                        continue;
                    }
                    None => break,
                }
            }
        });

        // Render tick task
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_rate);

            loop {
                interval.tick().await;
                if tx.send(AppEvent::Tick).await.is_err() {
                    break;
                }
            }
        });
    }

    /// Receive the next event
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    /// Take an already queued event without waiting
    pub fn try_next(&mut self) -> Option<AppEvent> {
        self.rx.try_recv().ok()
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}
