//! Core session types
//!
//! Defines the connection profile model:
//! - `SessionRecord` is the full, persistable connection profile
//! - `SessionSummary` is the `(id, name)` pair the store lists
//! - `RegistryEntry` is one row of the ordered session list

use std::fmt;

use serde::{Deserialize, Serialize};

/// Suffix appended to an entry's name while it has unsaved edits
pub const MODIFIED_MARKER: &str = " *";

/// Display name given to freshly created, unsaved sessions
pub const UNNAMED_SESSION: &str = "Unnamed";

/// Store-assigned identity of a persisted session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(i64);

impl SessionId {
    /// Wrap a raw row id
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Get the raw row id
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Network transport used to reach the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    #[default]
    TcpIp,
}

impl NetworkType {
    /// All selectable network types, in picker order
    pub const ALL: [NetworkType; 1] = [NetworkType::TcpIp];

    /// Integer code persisted in the `network_type` column
    pub fn code(&self) -> i64 {
        match self {
            Self::TcpIp => 0,
        }
    }

    /// Decode a persisted integer code
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::TcpIp),
            _ => None,
        }
    }
}

impl fmt::Display for NetworkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TcpIp => write!(f, "TCP/IP"),
        }
    }
}

/// Values seeded into the edit buffer for a session that was never saved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionDefaults {
    pub hostname: String,
    pub username: String,
    pub port: u16,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            hostname: "127.0.0.1".to_string(),
            username: "root".to_string(),
            port: 3306,
        }
    }
}

/// A database connection profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Store identity; `None` until the record is first saved
    pub id: Option<SessionId>,
    /// Display label (not unique)
    pub name: String,
    pub network_type: NetworkType,
    pub hostname: String,
    pub username: String,
    pub password: String,
    pub port: u16,
}

impl SessionRecord {
    /// Create an unsaved record populated from defaults
    pub fn new(name: impl Into<String>, defaults: &SessionDefaults) -> Self {
        Self {
            id: None,
            name: name.into(),
            network_type: NetworkType::default(),
            hostname: defaults.hostname.clone(),
            username: defaults.username.clone(),
            password: String::new(),
            port: defaults.port,
        }
    }

    /// Whether this record has ever been persisted
    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    /// Whether the connection fields differ from `other`.
    ///
    /// Only hostname, username, password and port are compared. The name is
    /// a label and the network type has a single value.
    pub fn connection_differs(&self, other: &SessionRecord) -> bool {
        self.hostname != other.hostname
            || self.username != other.username
            || self.password != other.password
            || self.port != other.port
    }

    /// Whether every field except the id matches `other`
    pub fn same_settings(&self, other: &SessionRecord) -> bool {
        self.name == other.name
            && self.network_type == other.network_type
            && !self.connection_differs(other)
    }

    /// Apply a single field edit
    pub fn apply(&mut self, edit: &FieldEdit) {
        match edit {
            FieldEdit::Name(name) => self.name = strip_modified_marker(name).to_string(),
            FieldEdit::NetworkType(network_type) => self.network_type = *network_type,
            FieldEdit::Hostname(hostname) => self.hostname = hostname.clone(),
            FieldEdit::Username(username) => self.username = username.clone(),
            FieldEdit::Password(password) => self.password = password.clone(),
            FieldEdit::Port(port) => self.port = *port,
        }
    }
}

/// Dirty state of live edits against a baseline.
///
/// Without a baseline there is nothing to compare against and the result is
/// always clean.
pub fn is_dirty(baseline: Option<&SessionRecord>, live: &SessionRecord) -> bool {
    baseline.is_some_and(|baseline| baseline.connection_differs(live))
}

/// Remove one trailing modified marker, if present
pub fn strip_modified_marker(name: &str) -> &str {
    name.strip_suffix(MODIFIED_MARKER).unwrap_or(name)
}

/// A change to one field of the edit buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Name(String),
    NetworkType(NetworkType),
    Hostname(String),
    Username(String),
    Password(String),
    Port(u16),
}

/// `(id, name)` pair listed by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub name: String,
}

/// One row of the ordered session list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEntry {
    /// Store identity; `None` for an entry that was never saved
    pub id: Option<SessionId>,
    /// Name without the modified marker
    pub name: String,
    /// Whether the entry has unsaved connection edits
    pub modified: bool,
}

impl RegistryEntry {
    /// Create an entry for a freshly created, unsaved session
    pub fn unsaved() -> Self {
        Self {
            id: None,
            name: UNNAMED_SESSION.to_string(),
            modified: false,
        }
    }

    /// Name as shown in the session list, including the modified marker
    pub fn display_name(&self) -> String {
        if self.modified {
            format!("{}{}", self.name, MODIFIED_MARKER)
        } else {
            self.name.clone()
        }
    }
}

impl From<SessionSummary> for RegistryEntry {
    fn from(summary: SessionSummary) -> Self {
        Self {
            id: Some(summary.id),
            name: summary.name,
            modified: false,
        }
    }
}

/// Selection state of the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryState {
    /// No session is selected
    Empty,
    /// A session is selected
    Viewing { index: usize, dirty: bool },
}

/// How the session manager was left
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManagerOutcome {
    /// The user chose a session to connect with
    Open(SessionRecord),
    /// The user abandoned the manager
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SessionRecord {
        SessionRecord::new("Local", &SessionDefaults::default())
    }

    #[test]
    fn test_defaults() {
        let record = record();
        assert_eq!(record.hostname, "127.0.0.1");
        assert_eq!(record.username, "root");
        assert_eq!(record.password, "");
        assert_eq!(record.port, 3306);
        assert_eq!(record.network_type, NetworkType::TcpIp);
        assert!(!record.is_saved());
    }

    #[test]
    fn test_network_type_codes() {
        assert_eq!(NetworkType::TcpIp.code(), 0);
        assert_eq!(NetworkType::from_code(0), Some(NetworkType::TcpIp));
        assert_eq!(NetworkType::from_code(5), None);
        assert_eq!(NetworkType::TcpIp.to_string(), "TCP/IP");
    }

    #[test]
    fn test_strip_modified_marker() {
        assert_eq!(strip_modified_marker("Local *"), "Local");
        assert_eq!(strip_modified_marker("Local"), "Local");
        // Only the exact two-character sentinel is removed
        assert_eq!(strip_modified_marker("Local*"), "Local*");
        assert_eq!(strip_modified_marker("Local * *"), "Local *");
        assert_eq!(strip_modified_marker(" *"), "");
    }

    #[test]
    fn test_dirty_without_baseline_is_clean() {
        let mut live = record();
        live.hostname = "10.0.0.5".to_string();
        assert!(!is_dirty(None, &live));
    }

    #[test]
    fn test_dirty_ignores_name_and_network_type() {
        let baseline = record();
        let mut live = baseline.clone();
        live.apply(&FieldEdit::Name("Renamed".to_string()));
        live.apply(&FieldEdit::NetworkType(NetworkType::TcpIp));
        assert!(!is_dirty(Some(&baseline), &live));

        live.apply(&FieldEdit::Password("secret".to_string()));
        assert!(is_dirty(Some(&baseline), &live));

        live.apply(&FieldEdit::Password(String::new()));
        assert!(!is_dirty(Some(&baseline), &live));
    }

    #[test]
    fn test_name_edit_strips_marker() {
        let mut live = record();
        live.apply(&FieldEdit::Name("Staging *".to_string()));
        assert_eq!(live.name, "Staging");
    }

    #[test]
    fn test_entry_display_name() {
        let mut entry = RegistryEntry::unsaved();
        assert_eq!(entry.display_name(), "Unnamed");
        entry.modified = true;
        assert_eq!(entry.display_name(), "Unnamed *");
    }

    #[test]
    fn test_record_serializes_network_type() {
        let json = serde_json::to_string(&record()).unwrap();
        assert!(json.contains("\"network_type\":\"tcp_ip\""));
        assert!(json.contains("\"id\":null"));
    }
}
