use crate::apis::dto::{ClassificationsResponseDto, EventDto, SearchResponseDto};
use crate::apis::EventQuery;
use crate::domain::Event;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::watch;

/// Remote events API. Implementations return wire DTOs; mapping happens in the use cases.
#[async_trait]
pub trait EventsApiPort: Send + Sync {
    async fn search_events(&self, query: &EventQuery) -> Result<SearchResponseDto>;
    async fn get_event(&self, event_id: &str) -> Result<EventDto>;
    async fn get_classifications(&self) -> Result<ClassificationsResponseDto>;
}

/// Durable string key-value storage behind the preferences store
#[async_trait]
pub trait KeyValuePort: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn put(&self, key: &str, value: &str) -> Result<()>;
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Bookmarked events, persisted with their venue details.
#[async_trait]
pub trait SavedEventsPort: Send + Sync {
    /// Insert or replace a saved event.
    async fn save_event(&self, event: &Event) -> Result<()>;
    async fn remove_event(&self, event_id: &str) -> Result<()>;
    async fn saved_ids(&self) -> Result<HashSet<String>>;
    /// All saved events, most recently saved first, with `saved` set.
    async fn saved_events(&self) -> Result<Vec<Event>>;
    /// Live view of the saved events; a new value is published after every write.
    fn subscribe(&self) -> watch::Receiver<Vec<Event>>;
}
