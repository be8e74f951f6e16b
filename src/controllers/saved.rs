use crate::app::ports::SavedEventsPort;
use crate::controllers::state::{CancellationToken, Job, StateHolder};
use crate::domain::{Event, Resource};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SavedUiState {
    pub events: Resource<Vec<Event>>,
}

/// Mirrors the saved-events store into screen state.
pub struct SavedController {
    store: Arc<dyn SavedEventsPort>,
    state: StateHolder<SavedUiState>,
    subscription: Mutex<Option<Job>>,
}

impl SavedController {
    pub fn new(store: Arc<dyn SavedEventsPort>) -> Self {
        Self {
            store,
            state: StateHolder::new(SavedUiState::default()),
            subscription: Mutex::new(None),
        }
    }

    pub fn state(&self) -> &StateHolder<SavedUiState> {
        &self.state
    }

    /// Start following the store. Calling again replaces the previous subscription.
    pub fn observe_saved_events(&self) {
        let mut rx = self.store.subscribe();
        let state = self.state.clone();
        let token = CancellationToken::new();
        let job_token = token.clone();

        let handle = tokio::spawn(async move {
            loop {
                let events = rx.borrow_and_update().clone();
                debug!("Saved events changed: {} events", events.len());
                state.update_if(|s| {
                    if job_token.is_cancelled() {
                        return false;
                    }
                    s.events = Resource::success(events);
                    true
                });
                if rx.changed().await.is_err() {
                    break;
                }
            }
        });

        match self.subscription.lock() {
            Ok(mut slot) => {
                if let Some(previous) = slot.replace(Job::new(token, handle)) {
                    previous.cancel();
                }
            }
            Err(_) => warn!("Saved events subscription slot poisoned"),
        }
    }

    /// Drop the event from the shown list at once, then delete it from the store.
    pub async fn remove_event(&self, event_id: &str) {
        self.state.update_if(|s| {
            let Some(events) = s.events.data_mut() else {
                return false;
            };
            let before = events.len();
            events.retain(|e| e.id != event_id);
            events.len() != before
        });
        if let Err(e) = self.store.remove_event(event_id).await {
            warn!("Removing saved event {} failed: {}", event_id, e);
        }
    }
}

impl Drop for SavedController {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.subscription.lock() {
            if let Some(job) = slot.take() {
                job.cancel();
            }
        }
    }
}
