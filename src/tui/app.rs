//! Main TUI application
//!
//! Event-driven application that coordinates:
//! - Terminal rendering with ratatui
//! - User input handling
//! - Registry signals delivered through the event channel

use std::io::{self, Stdout};
use std::time::Duration;

use crossterm::{
    event::{KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{debug, error, info};

use super::event::{
    AppEvent, ChannelObserver, EventLoop, FocusedPane, InputEvent, StateUpdate, UserCommand,
};
use super::theme::Theme;
use super::widgets::{FormField, SessionList, SessionListState, SettingsForm};
use crate::config::Config;
use crate::error::{Result, TuiError};
use crate::session::{
    strip_modified_marker, FieldEdit, ManagerOutcome, NetworkType, RegistryEntry,
    SessionRegistry,
};
use crate::store::SessionStore;

/// Guidance shown while no session exists
const EMPTY_STATE_TEXT: &str = "New here? In order to connect to a MySQL server, you have to \
create a so called \"session\" at first. Just press n to create your first session.\n\n\
Give it a friendly name (e.g. \"Local DB Server\") so you'll recall it the next time you \
start the session manager.";

/// Modal dialog state
#[derive(Debug, Clone)]
pub enum Modal {
    /// No modal open
    None,
    /// Text input modal
    Input {
        title: String,
        prompt: String,
        value: String,
        on_submit: InputAction,
    },
    /// Confirmation modal
    Confirm {
        title: String,
        message: String,
        on_confirm: ConfirmAction,
    },
    /// Help modal
    Help,
    /// Error modal
    Error { message: String },
}

/// Action to perform when input modal is submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    RenameSession,
}

/// Action to perform when confirm modal is confirmed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteSession { index: usize },
}

/// How the user left the manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitAction {
    Open,
    Cancel,
}

/// Application UI state
pub struct AppUiState {
    /// Session list state
    pub list_state: SessionListState,
    /// Currently focused pane
    pub focused_pane: FocusedPane,
    /// Focused row of the settings form
    pub focused_field: FormField,
    /// Current modal
    pub modal: Modal,
    /// Session list as last reported by the registry
    pub entries: Vec<RegistryEntry>,
    /// Whether the settings pane is shown instead of the empty-state text
    pub show_settings: bool,
    /// Whether the selected session has unsaved edits
    pub dirty: bool,
    /// Status message
    pub status_message: Option<String>,
    /// Should quit
    pub should_quit: bool,
    /// Set once the user opens a session or cancels
    pub exit: Option<ExitAction>,
}

impl Default for AppUiState {
    fn default() -> Self {
        Self {
            list_state: SessionListState::new(),
            focused_pane: FocusedPane::default(),
            focused_field: FormField::default(),
            modal: Modal::None,
            entries: Vec::new(),
            show_settings: false,
            dirty: false,
            status_message: None,
            should_quit: false,
            exit: None,
        }
    }
}

/// Main TUI application
pub struct App<S: SessionStore> {
    /// Configuration
    config: Config,
    /// Colors and styles
    theme: Theme,
    /// Session registry, reporting through the event channel
    registry: SessionRegistry<S>,
    /// UI state
    ui_state: AppUiState,
    /// Event loop
    event_loop: EventLoop,
}

impl<S: SessionStore> App<S> {
    /// Create a new application over `store`
    pub fn new(config: Config, store: S) -> Self {
        let event_loop = EventLoop::new();
        let registry = SessionRegistry::new(store, config.new_session.clone())
            .with_observer(ChannelObserver::new(event_loop.sender()));

        Self {
            config,
            theme: Theme::default(),
            registry,
            ui_state: AppUiState::default(),
            event_loop,
        }
    }

    /// Load the saved sessions and apply the resulting signals
    pub fn initialize(&mut self) -> Result<()> {
        self.registry.initialize()?;
        self.drain_pending();
        Ok(())
    }

    /// Run the manager until the user opens a session or cancels.
    ///
    /// The terminal is restored before the store is closed.
    pub async fn run(mut self) -> Result<ManagerOutcome> {
        self.initialize()?;

        let fps = u64::from(self.config.ui_refresh_fps.max(1));
        self.event_loop.start(Duration::from_millis(1000 / fps));

        let mut terminal = self.setup_terminal()?;

        info!("Entering main loop");
        let result = self.main_loop(&mut terminal).await;
        info!("Main loop exited with result: {:?}", result.is_ok());

        self.restore_terminal(&mut terminal)?;
        result?;

        self.finish()
    }

    /// Hand the registry its exit action
    fn finish(self) -> Result<ManagerOutcome> {
        let outcome = match self.ui_state.exit.unwrap_or(ExitAction::Cancel) {
            ExitAction::Open => self.registry.open()?,
            ExitAction::Cancel => self.registry.cancel()?,
        };
        Ok(outcome)
    }

    /// Setup terminal for TUI
    fn setup_terminal(&self) -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode().map_err(|e| TuiError::InitFailed(e.to_string()))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen).map_err(|e| TuiError::InitFailed(e.to_string()))?;

        let backend = CrosstermBackend::new(stdout);
        let terminal =
            Terminal::new(backend).map_err(|e| TuiError::InitFailed(e.to_string()))?;

        Ok(terminal)
    }

    /// Restore terminal to normal state
    fn restore_terminal(&self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode().map_err(|e| TuiError::RestoreFailed(e.to_string()))?;

        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| TuiError::RestoreFailed(e.to_string()))?;

        terminal
            .show_cursor()
            .map_err(|e| TuiError::RestoreFailed(e.to_string()))?;

        debug!("Terminal restore complete");
        Ok(())
    }

    /// Main event loop
    async fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal
                .draw(|f| self.render(f))
                .map_err(|e| TuiError::RenderError(e.to_string()))?;

            if let Some(event) = self.event_loop.next().await {
                self.dispatch(event);
            }
            // Registry signals raised while handling the event
            self.drain_pending();

            if self.ui_state.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Handle every event already waiting in the channel
    fn drain_pending(&mut self) {
        while let Some(event) = self.event_loop.try_next() {
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(input) => self.handle_input(input),
            AppEvent::StateUpdate(update) => self.handle_state_update(update),
            AppEvent::Tick => {}
        }
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let outer = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(size);

        // Session list on the left, settings on the right
        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
            .split(outer[0]);

        self.render_session_list(frame, main_chunks[0]);
        self.render_settings(frame, main_chunks[1]);
        self.render_status_bar(frame, outer[1]);
        self.render_modal(frame, size);
    }

    fn pane_block(&self, title: String, focused: bool) -> Block<'static> {
        Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(if focused {
                self.theme.border_focused()
            } else {
                self.theme.border_unfocused()
            })
    }

    /// Render the session list
    fn render_session_list(&mut self, frame: &mut Frame, area: Rect) {
        let focused = self.ui_state.focused_pane == FocusedPane::SessionList;
        let block = self.pane_block(" Sessions ".to_string(), focused);

        let list = SessionList::new(&self.ui_state.entries, &self.theme).block(block);
        frame.render_stateful_widget(list, area, &mut self.ui_state.list_state.list_state);
    }

    /// Render the settings form, or the empty-state guidance
    fn render_settings(&mut self, frame: &mut Frame, area: Rect) {
        if !self.ui_state.show_settings {
            let block = self.pane_block(" Settings ".to_string(), false);
            let paragraph = Paragraph::new(EMPTY_STATE_TEXT)
                .style(Style::default().fg(self.theme.text_secondary))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        let focused = self.ui_state.focused_pane == FocusedPane::Settings;
        let live = self.registry.live();
        let block = self.pane_block(format!(" {} ", live.name), focused);

        let form = SettingsForm::new(live, &self.theme)
            .block(block)
            .focused(focused.then_some(self.ui_state.focused_field));
        frame.render_widget(form, area);
    }

    /// Render modal overlay
    fn render_modal(&self, frame: &mut Frame, area: Rect) {
        match &self.ui_state.modal {
            Modal::None => {}

            Modal::Input {
                title,
                prompt,
                value,
                ..
            } => {
                let modal_area = centered_rect(60, 20, area);
                frame.render_widget(Clear, modal_area);

                let block = Block::default()
                    .title(format!(" {} ", title))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.modal_warning));

                let inner = block.inner(modal_area);
                frame.render_widget(block, modal_area);

                let text = format!("{}\n\n> {}_", prompt, value);
                frame.render_widget(Paragraph::new(text), inner);
            }

            Modal::Confirm { title, message, .. } => {
                let modal_area = centered_rect(50, 20, area);
                frame.render_widget(Clear, modal_area);

                let block = Block::default()
                    .title(format!(" {} ", title))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.modal_error));

                let inner = block.inner(modal_area);
                frame.render_widget(block, modal_area);

                let text = format!("{}\n\n[Enter] Confirm  [Esc] Cancel", message);
                frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
            }

            Modal::Error { message } => {
                let modal_area = centered_rect(60, 20, area);
                frame.render_widget(Clear, modal_area);

                let block = Block::default()
                    .title(" Error ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.modal_error));

                let inner = block.inner(modal_area);
                frame.render_widget(block, modal_area);

                let text = format!("{}\n\nPress any key to close.", message);
                frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
            }

            Modal::Help => {
                let modal_area = centered_rect(70, 80, area);
                frame.render_widget(Clear, modal_area);

                let block = Block::default()
                    .title(" Help ")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.modal_info));

                let inner = block.inner(modal_area);
                frame.render_widget(block, modal_area);

                let help_text = r#"
Session list:
  j/k, Up/Down    Select session
  n, Ctrl+N       New session
  s, Ctrl+S       Save selected session
  d, Delete       Delete selected session
  r, F2           Rename selected session
  Enter           Open selected session
  Tab             Switch to the settings form
  q, Esc          Cancel

Settings form:
  Up/Down         Move between fields
  Left/Right      Change network type
  Esc             Back to the session list

Press any key to close this help.
"#;

                frame.render_widget(Paragraph::new(help_text), inner);
            }
        }
    }

    /// Render status bar
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let status = if let Some(ref msg) = self.ui_state.status_message {
            msg.clone()
        } else {
            let mut status = format!(
                "Sessions: {} | ?: help | n: new | s: save | d: delete | Enter: open",
                self.ui_state.entries.len()
            );
            if self.ui_state.dirty {
                status.push_str(" | unsaved changes");
            }
            status
        };

        let paragraph = Paragraph::new(status).style(self.theme.status_bar());
        frame.render_widget(paragraph, area);
    }

    /// Handle input events
    fn handle_input(&mut self, input: InputEvent) {
        match input {
            InputEvent::Key(key) => {
                if !matches!(self.ui_state.modal, Modal::None) {
                    self.handle_modal_key(key);
                    return;
                }

                self.ui_state.status_message = None;
                if let Some(cmd) = UserCommand::from_key(key, self.ui_state.focused_pane) {
                    self.handle_command(cmd);
                }
            }
            InputEvent::Resize(_, _) => {
                // Terminal will re-render automatically
            }
        }
    }

    /// Handle modal key input
    fn handle_modal_key(&mut self, key: KeyEvent) {
        match &mut self.ui_state.modal {
            Modal::Input {
                value, on_submit, ..
            } => match key.code {
                KeyCode::Enter => {
                    let action = on_submit.clone();
                    let value = value.clone();
                    self.ui_state.modal = Modal::None;
                    self.handle_input_submit(action, value);
                }
                KeyCode::Esc => {
                    self.ui_state.modal = Modal::None;
                }
                KeyCode::Backspace => {
                    value.pop();
                }
                KeyCode::Char(c) => {
                    value.push(c);
                }
                _ => {}
            },

            Modal::Confirm { on_confirm, .. } => match key.code {
                KeyCode::Enter | KeyCode::Char('y') => {
                    let action = on_confirm.clone();
                    self.ui_state.modal = Modal::None;
                    self.handle_confirm(action);
                }
                KeyCode::Esc | KeyCode::Char('n') => {
                    self.ui_state.modal = Modal::None;
                }
                _ => {}
            },

            Modal::Help | Modal::Error { .. } => {
                // Any key closes help/error
                self.ui_state.modal = Modal::None;
            }

            Modal::None => {}
        }
    }

    /// Handle a user command
    fn handle_command(&mut self, cmd: UserCommand) {
        match cmd {
            UserCommand::NavigateUp => match self.ui_state.focused_pane {
                FocusedPane::SessionList => {
                    if let Some(index) = self.ui_state.list_state.previous_index() {
                        self.handle_select(index);
                    }
                }
                FocusedPane::Settings => {
                    self.ui_state.focused_field = self.ui_state.focused_field.previous();
                }
            },
            UserCommand::NavigateDown => match self.ui_state.focused_pane {
                FocusedPane::SessionList => {
                    if let Some(index) = self.ui_state.list_state.next_index() {
                        self.handle_select(index);
                    }
                }
                FocusedPane::Settings => {
                    self.ui_state.focused_field = self.ui_state.focused_field.next();
                }
            },
            UserCommand::NewSession => self.handle_new_session(),
            UserCommand::SaveSession => self.handle_save_session(),
            UserCommand::DeleteSession => self.handle_delete_session(),
            UserCommand::RenameSession => self.handle_rename_session(),
            UserCommand::OpenSession => self.handle_open_session(),
            UserCommand::TogglePane => {
                self.ui_state.focused_pane = match self.ui_state.focused_pane {
                    FocusedPane::SessionList if self.ui_state.show_settings => FocusedPane::Settings,
                    _ => FocusedPane::SessionList,
                };
            }
            UserCommand::CycleOption => {
                if self.ui_state.focused_field == FormField::NetworkType {
                    let current = self.registry.live().network_type;
                    let position = NetworkType::ALL
                        .iter()
                        .position(|t| *t == current)
                        .unwrap_or(0);
                    let next = NetworkType::ALL[(position + 1) % NetworkType::ALL.len()];
                    self.registry.apply_edit(FieldEdit::NetworkType(next));
                }
            }
            UserCommand::ShowHelp => {
                self.ui_state.modal = Modal::Help;
            }
            UserCommand::Cancel => {
                self.ui_state.exit = Some(ExitAction::Cancel);
                self.ui_state.should_quit = true;
            }
            UserCommand::Back => {
                self.ui_state.focused_pane = FocusedPane::SessionList;
            }
            UserCommand::TextInput(c) => self.handle_text_input(Some(c)),
            UserCommand::Backspace => self.handle_text_input(None),
        }
    }

    /// Handle registry signals
    fn handle_state_update(&mut self, update: StateUpdate) {
        match update {
            StateUpdate::SchemaEmpty => {
                self.ui_state.show_settings = false;
                self.ui_state.focused_pane = FocusedPane::SessionList;
            }
            StateUpdate::SchemaPopulated => {
                self.ui_state.show_settings = true;
            }
            StateUpdate::EntriesChanged(entries) => {
                self.ui_state.list_state.set_item_count(entries.len());
                self.ui_state.entries = entries;
            }
            StateUpdate::DirtyChanged(dirty) => {
                self.ui_state.dirty = dirty;
            }
            StateUpdate::SelectionLoaded { index, record } => {
                debug!("Loaded session {} at index {}", record.name, index);
                self.ui_state.list_state.select(Some(index));
            }
        }
    }

    fn handle_select(&mut self, index: usize) {
        if let Err(e) = self.registry.select_entry(index) {
            error!("Failed to load session at index {}: {}", index, e);
            self.ui_state.modal = Modal::Error {
                message: format!("Failed to load session: {}", e),
            };
        }
    }

    fn handle_new_session(&mut self) {
        match self.registry.create_unsaved_entry() {
            Ok(_) => {
                self.ui_state.focused_pane = FocusedPane::Settings;
                self.ui_state.focused_field = FormField::Hostname;
                self.ui_state.status_message = Some("New session created".to_string());
            }
            Err(e) => {
                self.ui_state.modal = Modal::Error {
                    message: format!("Failed to create session: {}", e),
                };
            }
        }
    }

    fn handle_save_session(&mut self) {
        if self.registry.selected().is_none() {
            self.ui_state.status_message = Some("No session selected".to_string());
            return;
        }

        match self.registry.save_current() {
            Ok(id) => {
                self.ui_state.status_message = Some(format!("Saved session {}", id));
            }
            Err(e) => {
                error!("Failed to save session: {}", e);
                self.ui_state.modal = Modal::Error {
                    message: format!("Failed to save: {}", e),
                };
            }
        }
    }

    /// Handle delete session - show confirmation
    fn handle_delete_session(&mut self) {
        if let Some(index) = self.registry.selected() {
            let name = strip_modified_marker(&self.registry.live().name).to_string();
            self.ui_state.modal = Modal::Confirm {
                title: "Delete Session".to_string(),
                message: format!("Delete session \"{}\"?", name),
                on_confirm: ConfirmAction::DeleteSession { index },
            };
        }
    }

    fn handle_rename_session(&mut self) {
        if self.registry.selected().is_some() {
            self.ui_state.modal = Modal::Input {
                title: "Rename Session".to_string(),
                prompt: "Enter session name:".to_string(),
                value: strip_modified_marker(&self.registry.live().name).to_string(),
                on_submit: InputAction::RenameSession,
            };
        }
    }

    fn handle_open_session(&mut self) {
        if self.registry.selected().is_none() {
            self.ui_state.status_message = Some("Create a session first (press n)".to_string());
            return;
        }
        self.ui_state.exit = Some(ExitAction::Open);
        self.ui_state.should_quit = true;
    }

    /// Append `c` to the focused field, or remove its last character
    fn handle_text_input(&mut self, c: Option<char>) {
        let live = self.registry.live();
        let edit_text = |current: &str| {
            let mut text = current.to_string();
            match c {
                Some(c) => text.push(c),
                None => {
                    text.pop();
                }
            }
            text
        };

        let edit = match self.ui_state.focused_field {
            FormField::NetworkType => None,
            FormField::Hostname => Some(FieldEdit::Hostname(edit_text(&live.hostname))),
            FormField::Username => Some(FieldEdit::Username(edit_text(&live.username))),
            FormField::Password => Some(FieldEdit::Password(edit_text(&live.password))),
            FormField::Port => {
                if c.is_some_and(|c| !c.is_ascii_digit()) {
                    return;
                }
                let text = edit_text(&live.port.to_string());
                if text.is_empty() {
                    Some(FieldEdit::Port(0))
                } else {
                    // Values above the port range are ignored
                    text.parse::<u16>().ok().map(FieldEdit::Port)
                }
            }
        };

        if let Some(edit) = edit {
            self.registry.apply_edit(edit);
        }
    }

    /// Handle input modal submission
    fn handle_input_submit(&mut self, action: InputAction, value: String) {
        match action {
            InputAction::RenameSession => {
                let name = value.trim();
                if name.is_empty() {
                    self.ui_state.status_message = Some("Session name cannot be empty".to_string());
                    return;
                }
                self.registry.apply_edit(FieldEdit::Name(name.to_string()));
                self.ui_state.status_message = Some("Renamed, press s to save".to_string());
            }
        }
    }

    /// Handle confirmation
    fn handle_confirm(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::DeleteSession { index } => {
                match self.registry.delete_entry(index) {
                    Ok(()) => {
                        self.ui_state.status_message = Some("Session deleted".to_string());
                    }
                    Err(e) => {
                        error!("Failed to delete session: {}", e);
                        self.ui_state.modal = Modal::Error {
                            message: format!("Failed to delete: {}", e),
                        };
                    }
                }
                // Deleting above the selection shifts it without a reload
                self.ui_state.list_state.select(self.registry.selected());
            }
        }
    }
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
