//! Settings form widget
//!
//! Shows the live connection settings of the selected session. Rows for
//! options the manager does not support yet are drawn disabled.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::session::SessionRecord;
use crate::tui::theme::Theme;

/// Width reserved for row labels
const LABEL_WIDTH: usize = 16;

/// Editable rows of the form, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FormField {
    NetworkType,
    #[default]
    Hostname,
    Username,
    Password,
    Port,
}

impl FormField {
    /// All editable rows in display order
    pub const ALL: [FormField; 5] = [
        FormField::NetworkType,
        FormField::Hostname,
        FormField::Username,
        FormField::Password,
        FormField::Port,
    ];

    /// Row label
    pub fn label(&self) -> &'static str {
        match self {
            Self::NetworkType => "Network type:",
            Self::Hostname => "Hostname / IP:",
            Self::Username => "User:",
            Self::Password => "Password:",
            Self::Port => "Port:",
        }
    }

    /// Next row, wrapping to the first
    pub fn next(&self) -> Self {
        let i = self.position();
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    /// Previous row, wrapping to the last
    pub fn previous(&self) -> Self {
        let i = self.position();
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Text shown for this row
    pub fn display_value(&self, record: &SessionRecord) -> String {
        match self {
            Self::NetworkType => record.network_type.to_string(),
            Self::Hostname => record.hostname.clone(),
            Self::Username => record.username.clone(),
            Self::Password => "*".repeat(record.password.chars().count()),
            Self::Port => record.port.to_string(),
        }
    }

    fn position(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }
}

/// Form widget for the selected session's settings
pub struct SettingsForm<'a> {
    record: &'a SessionRecord,
    theme: &'a Theme,
    block: Option<Block<'a>>,
    /// Row with the input cursor, if the form has focus
    focused: Option<FormField>,
}

impl<'a> SettingsForm<'a> {
    /// Create a new form
    pub fn new(record: &'a SessionRecord, theme: &'a Theme) -> Self {
        Self {
            record,
            theme,
            block: None,
            focused: None,
        }
    }

    /// Set the block
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Set the focused row
    pub fn focused(mut self, field: Option<FormField>) -> Self {
        self.focused = field;
        self
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let mut lines: Vec<Line<'a>> = FormField::ALL
            .iter()
            .map(|field| {
                let mut value = field.display_value(self.record);
                let mut value_style = self.theme.label().fg(self.theme.text_primary);
                if self.focused == Some(*field) {
                    if *field != FormField::NetworkType {
                        value.push('_');
                    }
                    value_style = self.theme.selection().add_modifier(Modifier::BOLD);
                }

                Line::from(vec![
                    Span::styled(
                        format!("{:<width$}", field.label(), width = LABEL_WIDTH),
                        self.theme.label(),
                    ),
                    Span::styled(value, value_style),
                ])
            })
            .collect();

        let disabled = self.theme.disabled();
        lines.push(Line::from(vec![
            Span::raw(" ".repeat(LABEL_WIDTH)),
            Span::styled("[ ] Compressed client/server protocol", disabled),
        ]));
        lines.push(Line::from(vec![
            Span::styled(format!("{:<width$}", "Databases:", width = LABEL_WIDTH), disabled),
            Span::styled("Separated by semicolon", disabled),
        ]));
        lines.push(Line::from(Span::styled(
            format!("{:<width$}", "Startup script:", width = LABEL_WIDTH),
            disabled,
        )));

        lines
    }
}

impl<'a> Widget for SettingsForm<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let paragraph = Paragraph::new(self.lines());

        let paragraph = if let Some(block) = self.block {
            paragraph.block(block)
        } else {
            paragraph
        };

        paragraph.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionDefaults;

    fn row(buf: &Buffer, y: u16) -> String {
        (buf.area.x..buf.area.x + buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_field_cycle() {
        assert_eq!(FormField::Port.next(), FormField::NetworkType);
        assert_eq!(FormField::NetworkType.previous(), FormField::Port);
        assert_eq!(FormField::Hostname.next(), FormField::Username);
    }

    #[test]
    fn test_password_is_masked() {
        let mut record = SessionRecord::new("Local", &SessionDefaults::default());
        record.password = "secret".to_string();
        assert_eq!(FormField::Password.display_value(&record), "******");
        assert_eq!(FormField::Port.display_value(&record), "3306");
    }

    #[test]
    fn test_render_rows() {
        let mut record = SessionRecord::new("Local", &SessionDefaults::default());
        record.password = "pw".to_string();
        let theme = Theme::basic();
        let area = Rect::new(0, 0, 60, 8);
        let mut buf = Buffer::empty(area);

        SettingsForm::new(&record, &theme)
            .focused(Some(FormField::Hostname))
            .render(area, &mut buf);

        assert!(row(&buf, 0).starts_with("Network type:   TCP/IP"));
        assert!(row(&buf, 1).starts_with("Hostname / IP:  127.0.0.1_"));
        assert!(row(&buf, 2).starts_with("User:           root"));
        assert!(row(&buf, 3).starts_with("Password:       **"));
        assert!(row(&buf, 4).starts_with("Port:           3306"));
        assert!(row(&buf, 5).contains("Compressed client/server protocol"));
    }
}
