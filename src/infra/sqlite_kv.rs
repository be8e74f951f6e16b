use crate::app::ports::KeyValuePort;
use crate::error::Result;
use crate::infra::sqlite::SqliteDatabase;
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};

/// `KeyValuePort` over the `preferences` table
pub struct SqliteKeyValueStore {
    db: SqliteDatabase,
}

impl SqliteKeyValueStore {
    pub fn new(db: SqliteDatabase) -> Self {
        Self { db }
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(SqliteDatabase::open_in_memory()?))
    }
}

#[async_trait]
impl KeyValuePort for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.db
            .call(move |conn| {
                let value = conn
                    .query_row(
                        "SELECT value FROM preferences WHERE key = ?1",
                        params![key],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(value)
            })
            .await
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let (key, value) = (key.to_string(), value.to_string());
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO preferences (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value=excluded.value",
                    params![key, value],
                )?;
                Ok(())
            })
            .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.db
            .call(move |conn| {
                conn.execute("DELETE FROM preferences WHERE key = ?1", params![key])?;
                Ok(())
            })
            .await
    }
}
