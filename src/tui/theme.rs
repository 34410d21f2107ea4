//! Colors and styles for the session manager
//!
//! One palette per terminal color depth; widgets only read styles from
//! [`Theme`].

use ratatui::style::{Color, Modifier, Style};

/// Terminal color capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// 16 ANSI colors
    Basic,
    /// 256 color palette
    #[default]
    Indexed,
    /// 24-bit RGB
    TrueColor,
}

impl ColorMode {
    /// Detect the color depth from `COLORTERM` and `TERM`
    pub fn detect() -> Self {
        Self::from_env_values(
            std::env::var("COLORTERM").ok().as_deref(),
            std::env::var("TERM").ok().as_deref(),
        )
    }

    fn from_env_values(colorterm: Option<&str>, term: Option<&str>) -> Self {
        if matches!(colorterm, Some("truecolor" | "24bit")) {
            return Self::TrueColor;
        }

        match term {
            Some(t) if t.contains("kitty") || t.contains("alacritty") => Self::TrueColor,
            Some(t) if t.contains("256color") => Self::Indexed,
            _ => Self::Basic,
        }
    }
}

/// Palette used by every pane
#[derive(Debug, Clone)]
pub struct Theme {
    pub border_focused: Color,
    pub border_unfocused: Color,

    pub selection_bg: Color,
    pub selection_fg: Color,

    // Session list icons
    pub entry_saved: Color,
    pub entry_unsaved: Color,
    pub entry_modified: Color,

    pub text_primary: Color,
    pub text_secondary: Color,

    pub form_label: Color,
    pub form_disabled: Color,

    pub modal_info: Color,
    pub modal_warning: Color,
    pub modal_error: Color,

    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::for_color_mode(ColorMode::detect())
    }
}

impl Theme {
    /// Palette for the given color depth
    pub fn for_color_mode(mode: ColorMode) -> Self {
        match mode {
            ColorMode::Basic => Self::basic(),
            ColorMode::Indexed => Self::indexed(),
            ColorMode::TrueColor => Self::truecolor(),
        }
    }

    /// 16-color palette
    pub fn basic() -> Self {
        Self {
            border_focused: Color::Cyan,
            border_unfocused: Color::DarkGray,
            selection_bg: Color::Blue,
            selection_fg: Color::White,
            entry_saved: Color::Green,
            entry_unsaved: Color::Cyan,
            entry_modified: Color::Yellow,
            text_primary: Color::Reset,
            text_secondary: Color::Gray,
            form_label: Color::Cyan,
            form_disabled: Color::DarkGray,
            modal_info: Color::Cyan,
            modal_warning: Color::Yellow,
            modal_error: Color::Red,
            status_bar_bg: Color::Blue,
            status_bar_fg: Color::White,
        }
    }

    /// 256-color palette
    pub fn indexed() -> Self {
        Self {
            border_focused: Color::Indexed(75),
            border_unfocused: Color::Indexed(240),
            selection_bg: Color::Indexed(24),
            selection_fg: Color::Indexed(231),
            entry_saved: Color::Indexed(114),
            entry_unsaved: Color::Indexed(75),
            entry_modified: Color::Indexed(215),
            text_primary: Color::Reset,
            text_secondary: Color::Indexed(247),
            form_label: Color::Indexed(110),
            form_disabled: Color::Indexed(240),
            modal_info: Color::Indexed(75),
            modal_warning: Color::Indexed(215),
            modal_error: Color::Indexed(203),
            status_bar_bg: Color::Indexed(235),
            status_bar_fg: Color::Indexed(250),
        }
    }

    /// 24-bit palette
    pub fn truecolor() -> Self {
        Self {
            border_focused: Color::Rgb(97, 175, 239),
            border_unfocused: Color::Rgb(76, 82, 99),
            selection_bg: Color::Rgb(40, 60, 90),
            selection_fg: Color::Rgb(240, 240, 240),
            entry_saved: Color::Rgb(152, 195, 121),
            entry_unsaved: Color::Rgb(97, 175, 239),
            entry_modified: Color::Rgb(229, 192, 123),
            text_primary: Color::Rgb(220, 223, 228),
            text_secondary: Color::Rgb(150, 156, 170),
            form_label: Color::Rgb(86, 182, 194),
            form_disabled: Color::Rgb(92, 99, 112),
            modal_info: Color::Rgb(97, 175, 239),
            modal_warning: Color::Rgb(229, 192, 123),
            modal_error: Color::Rgb(224, 108, 117),
            status_bar_bg: Color::Rgb(33, 37, 43),
            status_bar_fg: Color::Rgb(171, 178, 191),
        }
    }

    pub fn border_focused(&self) -> Style {
        Style::default().fg(self.border_focused)
    }

    pub fn border_unfocused(&self) -> Style {
        Style::default().fg(self.border_unfocused)
    }

    /// Highlight for the selected list row and the focused form value
    pub fn selection(&self) -> Style {
        Style::default().bg(self.selection_bg).fg(self.selection_fg)
    }

    pub fn status_bar(&self) -> Style {
        Style::default().bg(self.status_bar_bg).fg(self.status_bar_fg)
    }

    /// Form row labels
    pub fn label(&self) -> Style {
        Style::default().fg(self.form_label)
    }

    /// Form rows that cannot be edited
    pub fn disabled(&self) -> Style {
        Style::default()
            .fg(self.form_disabled)
            .add_modifier(Modifier::DIM)
    }
}
