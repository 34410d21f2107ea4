//! SQLite-backed session store
//!
//! One owned connection in autocommit mode: every write is durable as soon
//! as the statement returns. Closing (explicitly or on drop) releases the
//! connection.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use super::{SessionStore, StoreResult};
use crate::error::StoreError;
use crate::session::{NetworkType, SessionId, SessionRecord, SessionSummary};

const SESSIONS_DDL: &str = "
CREATE TABLE IF NOT EXISTS sessions (
    id             INTEGER PRIMARY KEY,
    name           TEXT,
    network_type   INTEGER,
    hostname       TEXT,
    username       TEXT,
    password       TEXT,
    port           INTEGER,
    compressed     BOOL,
    startup_script TEXT
);";

/// Session store in a SQLite database file
pub struct SqliteSessionStore {
    conn: Option<Connection>,
    path: PathBuf,
}

impl SqliteSessionStore {
    /// Open (or create) the database at `path`.
    ///
    /// Fails with [`StoreError::Unavailable`] if the file cannot be opened
    /// or is not a SQLite database.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let unavailable = |reason: String| StoreError::Unavailable {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| unavailable(e.to_string()))?;
            }
        }

        let conn = Connection::open(path).map_err(|e| unavailable(e.to_string()))?;

        // Opening is lazy; touch the header so a foreign file fails here
        conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .map_err(|e| unavailable(e.to_string()))?;

        info!("Opened session store at {}", path.display());

        Ok(Self {
            conn: Some(conn),
            path: path.to_path_buf(),
        })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| StoreError::Unavailable {
            path: PathBuf::from(":memory:"),
            reason: e.to_string(),
        })?;

        Ok(Self {
            conn: Some(conn),
            path: PathBuf::from(":memory:"),
        })
    }

    /// Location of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> StoreResult<&Connection> {
        self.conn.as_ref().ok_or(StoreError::Closed)
    }

    fn has_schema(&self) -> StoreResult<bool> {
        let found = self
            .conn()?
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'sessions'",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn require_schema(&self) -> StoreResult<()> {
        if self.has_schema()? {
            Ok(())
        } else {
            Err(StoreError::SchemaMissing)
        }
    }
}

/// Raw column values; NULLs from rows written by other tools become defaults
struct RawSession {
    id: i64,
    name: Option<String>,
    network_type: Option<i64>,
    hostname: Option<String>,
    username: Option<String>,
    password: Option<String>,
    port: Option<i64>,
}

impl RawSession {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            network_type: row.get(2)?,
            hostname: row.get(3)?,
            username: row.get(4)?,
            password: row.get(5)?,
            port: row.get(6)?,
        })
    }

    fn into_record(self) -> StoreResult<SessionRecord> {
        let id = SessionId::new(self.id);

        let network_type = match self.network_type {
            None => NetworkType::default(),
            Some(code) => NetworkType::from_code(code).ok_or_else(|| StoreError::InvalidRecord {
                id,
                reason: format!("unknown network type code {}", code),
            })?,
        };

        let port = self.port.unwrap_or_default();
        let port = u16::try_from(port).map_err(|_| StoreError::InvalidRecord {
            id,
            reason: format!("port {} out of range", port),
        })?;

        Ok(SessionRecord {
            id: Some(id),
            name: self.name.unwrap_or_default(),
            network_type,
            hostname: self.hostname.unwrap_or_default(),
            username: self.username.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            port,
        })
    }
}

impl SessionStore for SqliteSessionStore {
    fn ensure_schema(&mut self) -> StoreResult<()> {
        self.conn()?.execute_batch(SESSIONS_DDL)?;
        Ok(())
    }

    fn list_summaries(&self) -> StoreResult<Vec<SessionSummary>> {
        self.require_schema()?;

        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name FROM sessions ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let name: Option<String> = row.get(1)?;
            Ok(SessionSummary {
                id: SessionId::new(id),
                name: name.unwrap_or_default(),
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn fetch(&self, id: SessionId) -> StoreResult<Option<SessionRecord>> {
        self.require_schema()?;

        let raw = self
            .conn()?
            .query_row(
                "SELECT id, name, network_type, hostname, username, password, port
                 FROM sessions WHERE id = ?1",
                params![id.get()],
                RawSession::from_row,
            )
            .optional()?;

        raw.map(RawSession::into_record).transpose()
    }

    fn insert(&mut self, record: &SessionRecord) -> StoreResult<SessionId> {
        self.ensure_schema()?;

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO sessions (name, network_type, hostname, username, password, port)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.name,
                record.network_type.code(),
                record.hostname,
                record.username,
                record.password,
                i64::from(record.port),
            ],
        )?;

        let id = SessionId::new(conn.last_insert_rowid());
        debug!("Inserted session {}", id);
        Ok(id)
    }

    fn update(&mut self, id: SessionId, record: &SessionRecord) -> StoreResult<()> {
        self.require_schema()?;

        let changed = self.conn()?.execute(
            "UPDATE sessions
             SET name = ?1, network_type = ?2, hostname = ?3, username = ?4, password = ?5, port = ?6
             WHERE id = ?7",
            params![
                record.name,
                record.network_type.code(),
                record.hostname,
                record.username,
                record.password,
                i64::from(record.port),
                id.get(),
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        debug!("Updated session {}", id);
        Ok(())
    }

    fn delete(&mut self, id: SessionId) -> StoreResult<bool> {
        if !self.has_schema()? {
            return Ok(false);
        }

        let changed = self
            .conn()?
            .execute("DELETE FROM sessions WHERE id = ?1", params![id.get()])?;
        debug!("Deleted session {} (rows: {})", id, changed);
        Ok(changed > 0)
    }

    fn close(&mut self) -> StoreResult<()> {
        let conn = self.conn.take().ok_or(StoreError::Closed)?;
        conn.close().map_err(|(_, e)| StoreError::from(e))?;
        info!("Closed session store at {}", self.path.display());
        Ok(())
    }
}

impl Drop for SqliteSessionStore {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            debug!("Session store dropped without close, finalizing");
            if let Err((_, e)) = conn.close() {
                warn!("Failed to close session store: {}", e);
            }
        }
    }
}
