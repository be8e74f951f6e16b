use crate::error::{LineupError, Result};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS preferences (
        key    TEXT PRIMARY KEY,
        value  TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS saved_events (
        event_id         TEXT PRIMARY KEY,
        name             TEXT NOT NULL,
        url              TEXT,
        description      TEXT,
        additional_info  TEXT,
        info             TEXT,
        please_note      TEXT,
        dates            TEXT,
        images           TEXT NOT NULL,
        price_ranges     TEXT NOT NULL,
        classifications  TEXT NOT NULL,
        place            TEXT,
        attractions      TEXT NOT NULL,
        latitude         REAL,
        longitude        REAL,
        saved_at         INTEGER NOT NULL
    );
    CREATE TABLE IF NOT EXISTS venues (
        event_id        TEXT NOT NULL,
        venue_id        TEXT NOT NULL,
        position        INTEGER NOT NULL,
        name            TEXT,
        url             TEXT,
        description     TEXT,
        address         TEXT NOT NULL,
        parking_detail  TEXT,
        general_rule    TEXT,
        child_rule      TEXT,
        PRIMARY KEY (event_id, venue_id)
    );
    CREATE TABLE IF NOT EXISTS venue_images (
        event_id  TEXT NOT NULL,
        venue_id  TEXT NOT NULL,
        position  INTEGER NOT NULL,
        image     TEXT NOT NULL,
        PRIMARY KEY (event_id, venue_id, position)
    );
"#;

/// Shared handle to the local database file holding preferences and saved events.
#[derive(Clone)]
pub struct SqliteDatabase {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteDatabase {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| LineupError::Persistence(e.to_string()))?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        info!("Opened database at {}", path.display());
        Self::with_schema(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_schema(Connection::open_in_memory()?)
    }

    fn with_schema(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| LineupError::Persistence("database lock poisoned".to_string()))
    }

    /// Run `f` against the locked connection on the blocking pool.
    pub(crate) async fn call<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = db.lock()?;
            f(&mut *conn)
        })
        .await
        .map_err(|e| LineupError::Persistence(format!("database task failed: {e}")))?
    }
}
