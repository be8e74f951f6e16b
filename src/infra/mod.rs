pub mod http_events_api;
pub mod rate_limiter;
pub mod sqlite;
pub mod sqlite_kv;
pub mod sqlite_saved_events;

pub use http_events_api::HttpEventsApi;
pub use sqlite::SqliteDatabase;
pub use sqlite_kv::SqliteKeyValueStore;
pub use sqlite_saved_events::SqliteSavedEventsStore;
