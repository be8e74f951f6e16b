#![allow(dead_code)]

use async_trait::async_trait;
use lineup::apis::dto::{ClassificationsResponseDto, EventDto, SearchResponseDto};
use lineup::apis::EventQuery;
use lineup::app::ports::EventsApiPort;
use lineup::app::PreferencesStore;
use lineup::infra::SqliteKeyValueStore;
use lineup::{LineupError, Result};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// In-process stand-in for the events API.
///
/// Every page holds `per_page` events whose ids read `{keyword|segment|event}-{page}-{i}`.
pub struct MockEventsApi {
    pub total_pages: u32,
    pub per_page: usize,
    failing_pages: Mutex<HashSet<u32>>,
    failing_segments: Mutex<HashSet<String>>,
    gate: Mutex<Option<Arc<Notify>>>,
    requests: Mutex<Vec<EventQuery>>,
}

impl MockEventsApi {
    pub fn new(total_pages: u32, per_page: usize) -> Self {
        Self {
            total_pages,
            per_page,
            failing_pages: Mutex::new(HashSet::new()),
            failing_segments: Mutex::new(HashSet::new()),
            gate: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_page(&self, page: u32, failing: bool) {
        let mut pages = self.failing_pages.lock().unwrap();
        if failing {
            pages.insert(page);
        } else {
            pages.remove(&page);
        }
    }

    pub fn fail_segment(&self, segment_name: &str) {
        self.failing_segments
            .lock()
            .unwrap()
            .insert(segment_name.to_string());
    }

    /// Hold every following search until the returned handle is notified.
    pub fn close_gate(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(notify.clone());
        notify
    }

    pub fn open_gate(&self) {
        *self.gate.lock().unwrap() = None;
    }

    pub fn requests(&self) -> Vec<EventQuery> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventsApiPort for MockEventsApi {
    async fn search_events(&self, query: &EventQuery) -> Result<SearchResponseDto> {
        self.requests.lock().unwrap().push(query.clone());
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let page = query.page.unwrap_or(0);
        if self.failing_pages.lock().unwrap().contains(&page) {
            return Err(LineupError::Network(format!("page {page} timed out")));
        }
        if let Some(segment) = &query.segment_name {
            if self.failing_segments.lock().unwrap().contains(segment) {
                return Err(LineupError::Api {
                    status: 503,
                    message: format!("{segment} unavailable"),
                });
            }
        }

        let prefix = query
            .keyword
            .clone()
            .or_else(|| query.segment_name.clone())
            .unwrap_or_else(|| "event".to_string());
        let events: Vec<Value> = (0..self.per_page)
            .map(|i| {
                json!({
                    "id": format!("{prefix}-{page}-{i}"),
                    "name": format!("{prefix} show {i}"),
                })
            })
            .collect();
        Ok(serde_json::from_value(json!({
            "_embedded": {"events": events},
            "page": {"number": page, "totalPages": self.total_pages}
        }))?)
    }

    async fn get_event(&self, event_id: &str) -> Result<EventDto> {
        Ok(serde_json::from_value(json!({"id": event_id, "name": "Single"}))?)
    }

    async fn get_classifications(&self) -> Result<ClassificationsResponseDto> {
        Ok(serde_json::from_value(classifications_json())?)
    }
}

/// Music{Rock{Alternative, Punk}, Jazz{Bebop}} and Sports{Football{NFL}, Rock{Climbing}}.
///
/// "Rock" appears under both segments with different ids.
pub fn classifications_json() -> Value {
    json!({
        "_embedded": {"classifications": [
            {"segment": {"id": "seg-music", "name": "Music", "_embedded": {"genres": [
                {"id": "g-rock", "name": "Rock", "_embedded": {"subgenres": [
                    {"id": "s-alt", "name": "Alternative"},
                    {"id": "s-punk", "name": "Punk"}
                ]}},
                {"id": "g-jazz", "name": "Jazz", "_embedded": {"subgenres": [
                    {"id": "s-bebop", "name": "Bebop"}
                ]}}
            ]}}},
            {"segment": {"id": "seg-sports", "name": "Sports", "_embedded": {"genres": [
                {"id": "g-football", "name": "Football", "_embedded": {"subgenres": [
                    {"id": "s-nfl", "name": "NFL"}
                ]}},
                {"id": "g-climbing-rock", "name": "Rock", "_embedded": {"subgenres": [
                    {"id": "s-climbing", "name": "Climbing"}
                ]}}
            ]}}},
            {"segment": null}
        ]}
    })
}

pub fn preferences() -> Arc<PreferencesStore> {
    let kv = SqliteKeyValueStore::open_in_memory().unwrap();
    Arc::new(PreferencesStore::new(Arc::new(kv)))
}

pub fn ids(events: Option<&Vec<lineup::domain::Event>>) -> Vec<String> {
    events
        .map(|events| events.iter().map(|e| e.id.clone()).collect())
        .unwrap_or_default()
}
