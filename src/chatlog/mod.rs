//! Append-only conversation log on SQLite.
//!
//! Each append writes one user/assistant turn pair in a single transaction.
//! Rows are never updated or deleted.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::LogError;

use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Messages per append.
pub const ENTRIES_PER_APPEND: usize = 2;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS messages (
    user_id TEXT,
    chat_id TEXT,
    ip TEXT,
    timestamp INTEGER,
    model TEXT,
    completed BOOLEAN,
    role TEXT,
    content TEXT
);
CREATE INDEX IF NOT EXISTS idx_messages_chat ON messages (user_id, chat_id);
";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub user_id: String,
    pub chat_id: String,
    pub client_ip: String,
    pub timestamp: i64,
    pub model: Option<String>,
    pub completed: Option<bool>,
    pub role: String,
    pub content: String,
}

impl LogEntry {
    fn validate(&self) -> Result<(), LogError> {
        if self.user_id.is_empty() {
            return Err(LogError::MissingField { field: "user_id" });
        }
        if self.chat_id.is_empty() {
            return Err(LogError::MissingField { field: "chat_id" });
        }
        if self.role.is_empty() {
            return Err(LogError::MissingField { field: "role" });
        }
        Ok(())
    }
}

/// Shared handle to the log database.
#[derive(Clone)]
pub struct ChatLog {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for ChatLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatLog").finish_non_exhaustive()
    }
}

impl ChatLog {
    /// Opens or creates the database at `path`, creating parent directories.
    pub fn open(path: &Path) -> Result<Self, LogError> {
        info!(path = %path.display(), "Opening conversation log");

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| LogError::Io {
                reason: format!("{}: {e}", parent.display()),
            })?;
        }

        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, LogError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, LogError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Writes one turn pair. Every entry is validated before anything is
    /// written, and both rows commit together or not at all.
    pub fn append(&self, entries: &[LogEntry]) -> Result<(), LogError> {
        if entries.len() != ENTRIES_PER_APPEND {
            return Err(LogError::WrongPairCount { got: entries.len() });
        }
        for entry in entries {
            entry.validate()?;
        }

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO messages (user_id, chat_id, ip, timestamp, model, completed, role, content)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )?;
            for entry in entries {
                stmt.execute(params![
                    entry.user_id,
                    entry.chat_id,
                    entry.client_ip,
                    entry.timestamp,
                    entry.model,
                    entry.completed,
                    entry.role,
                    entry.content,
                ])?;
            }
        }
        tx.commit()?;

        for entry in entries {
            info!(
                chat_id = %entry.chat_id,
                ip = %entry.client_ip,
                timestamp = entry.timestamp,
                role = %entry.role,
                "[{}@{}] {} {}",
                entry.chat_id,
                entry.client_ip,
                entry.timestamp,
                entry.role
            );
        }

        Ok(())
    }

    /// [`append`](Self::append) on the blocking pool.
    pub async fn append_async(&self, entries: Vec<LogEntry>) -> Result<(), LogError> {
        let log = self.clone();
        tokio::task::spawn_blocking(move || log.append(&entries))
            .await
            .map_err(|e| LogError::TaskFailed {
                reason: e.to_string(),
            })?
    }

    /// All rows for one conversation, in insertion order.
    pub fn entries_for_chat(&self, user_id: &str, chat_id: &str) -> Result<Vec<LogEntry>, LogError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(
            "SELECT user_id, chat_id, ip, timestamp, model, completed, role, content
             FROM messages WHERE user_id = ?1 AND chat_id = ?2 ORDER BY rowid",
        )?;

        let rows = stmt.query_map(params![user_id, chat_id], |row| {
            Ok(LogEntry {
                user_id: row.get(0)?,
                chat_id: row.get(1)?,
                client_ip: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                timestamp: row.get(3)?,
                model: row.get(4)?,
                completed: row.get(5)?,
                role: row.get(6)?,
                content: row.get(7)?,
            })
        })?;

        let entries = rows.collect::<Result<Vec<_>, _>>()?;
        debug!(user_id, chat_id, count = entries.len(), "Read conversation log");
        Ok(entries)
    }

    /// Total rows stored.
    pub fn len(&self) -> Result<usize, LogError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool, LogError> {
        Ok(self.len()? == 0)
    }
}
