//! Saved session list widget
//!
//! Displays the registry entries in order, one row per session, marking
//! unsaved and modified sessions.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, StatefulWidget},
};

use crate::session::RegistryEntry;
use crate::tui::theme::Theme;

/// List widget for the saved sessions
pub struct SessionList<'a> {
    /// Entries in display order
    entries: &'a [RegistryEntry],
    /// Theme for styling
    theme: &'a Theme,
    /// Block for borders and title
    block: Option<Block<'a>>,
    /// Style for selected item
    highlight_style: Style,
}

impl<'a> SessionList<'a> {
    /// Create a new session list
    pub fn new(entries: &'a [RegistryEntry], theme: &'a Theme) -> Self {
        Self {
            entries,
            theme,
            block: None,
            highlight_style: theme.selection().add_modifier(Modifier::BOLD),
        }
    }

    /// Set the block
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Set the highlight style
    pub fn highlight_style(mut self, style: Style) -> Self {
        self.highlight_style = style;
        self
    }

    fn to_list_items(&self) -> Vec<ListItem<'a>> {
        self.entries
            .iter()
            .map(|entry| {
                let (icon, color) = if entry.modified {
                    ("✎", self.theme.entry_modified)
                } else if entry.id.is_none() {
                    ("+", self.theme.entry_unsaved)
                } else {
                    ("●", self.theme.entry_saved)
                };

                let line = Line::from(vec![
                    Span::styled(format!("{} ", icon), Style::default().fg(color)),
                    Span::styled(
                        entry.display_name(),
                        Style::default().fg(self.theme.text_primary),
                    ),
                ]);

                ListItem::new(line)
            })
            .collect()
    }
}

impl<'a> StatefulWidget for SessionList<'a> {
    type State = ListState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let items = self.to_list_items();
        let list = List::new(items).highlight_style(self.highlight_style);
        let list = if let Some(block) = self.block {
            list.block(block)
        } else {
            list
        };

        StatefulWidget::render(list, area, buf, state);
    }
}

/// Session list state
#[derive(Debug, Default)]
pub struct SessionListState {
    /// Inner list state
    pub list_state: ListState,
    /// Total number of items
    pub item_count: usize,
}

impl SessionListState {
    /// Create a new state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the selected index
    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    /// Select an item
    pub fn select(&mut self, index: Option<usize>) {
        self.list_state.select(index);
    }

    /// Index the next row would move to, wrapping at the end
    pub fn next_index(&self) -> Option<usize> {
        if self.item_count == 0 {
            return None;
        }

        Some(match self.list_state.selected() {
            Some(i) if i + 1 < self.item_count => i + 1,
            _ => 0,
        })
    }

    /// Index the previous row would move to, wrapping at the start
    pub fn previous_index(&self) -> Option<usize> {
        if self.item_count == 0 {
            return None;
        }

        Some(match self.list_state.selected() {
            Some(0) => self.item_count - 1,
            Some(i) => i - 1,
            None => 0,
        })
    }

    /// Update item count and ensure selection is valid
    pub fn set_item_count(&mut self, count: usize) {
        self.item_count = count;

        if let Some(selected) = self.list_state.selected() {
            if count == 0 {
                self.list_state.select(None);
            } else if selected >= count {
                self.list_state.select(Some(count - 1));
            }
        }
    }
}
