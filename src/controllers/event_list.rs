use crate::apis::EventQuery;
use crate::app::GetEventsUseCase;
use crate::controllers::state::{CancellationToken, Job, StateHolder};
use crate::controllers::{mark_saved, reconcile_saved};
use crate::domain::{Event, PaginationState, Resource};
use futures::StreamExt;
use std::collections::HashSet;
use std::sync::Mutex;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventListUiState {
    pub events: Resource<Vec<Event>>,
    pub pagination: PaginationState,
}

/// Drives one paginated event query.
pub struct EventListController {
    use_case: GetEventsUseCase,
    page_size: u32,
    state: StateHolder<EventListUiState>,
    job: Mutex<Option<Job>>,
    // Filters of the last fresh fetch; `load_more_events` pages through these
    last_query: Mutex<Option<EventQuery>>,
}

impl EventListController {
    pub fn new(use_case: GetEventsUseCase, page_size: u32) -> Self {
        Self {
            use_case,
            page_size,
            state: StateHolder::new(EventListUiState::default()),
            job: Mutex::new(None),
            last_query: Mutex::new(None),
        }
    }

    pub fn state(&self) -> &StateHolder<EventListUiState> {
        &self.state
    }

    /// Start fetching events for `query`.
    ///
    /// With `has_loaded_once == false` any outstanding fetch is cancelled, the list is
    /// reset to `Loading` and page 0 is requested. Otherwise the page after the last
    /// loaded one is requested and appended, unless a fetch is already in flight or the
    /// last page has been reached.
    pub fn get_events(&self, has_loaded_once: bool, query: EventQuery) {
        if has_loaded_once {
            if self.start_next_page(Some(query.clone())) {
                if let Ok(mut last) = self.last_query.lock() {
                    *last = Some(query);
                }
            }
            return;
        }

        self.cancel_active();
        if let Ok(mut last) = self.last_query.lock() {
            *last = Some(query.clone());
        }
        self.state.update(|s| {
            s.events = Resource::Loading;
            s.pagination = PaginationState {
                is_loading_more: true,
                ..Default::default()
            };
        });
        self.dispatch(false, query, 0);
    }

    /// Request the next page of the last query. Returns whether a fetch was started.
    pub fn load_more_events(&self) -> bool {
        let query = self.last_query.lock().ok().and_then(|last| last.clone());
        self.start_next_page(query)
    }

    fn start_next_page(&self, query: Option<EventQuery>) -> bool {
        let Some(query) = query else {
            debug!("No query to page through");
            return false;
        };

        let mut next_page = 0;
        let started = self.state.update_if(|s| {
            if !s.pagination.can_load_more || s.pagination.is_loading_more {
                return false;
            }
            s.pagination.is_loading_more = true;
            next_page = s.pagination.page + 1;
            true
        });
        if !started {
            debug!("Next page ignored: nothing more to load or fetch in flight");
            return false;
        }

        self.dispatch(true, query, next_page);
        true
    }

    /// Flip one event's saved flag in the displayed list.
    pub fn change_event_saved(&self, event_id: &str, saved: bool) {
        self.state
            .update_if(|s| mark_saved(&mut s.events, event_id, saved));
    }

    pub fn update_events_saved(&self, saved_ids: &HashSet<String>) {
        self.state
            .update_if(|s| reconcile_saved(&mut s.events, saved_ids));
    }

    /// Cancel the outstanding fetch, if any. Its result will not be applied.
    pub fn cancel_active(&self) {
        if let Ok(mut job) = self.job.lock() {
            if let Some(job) = job.take() {
                job.cancel();
            }
        }
    }

    fn dispatch(&self, has_loaded_once: bool, query: EventQuery, page: u32) {
        let token = CancellationToken::new();
        let state = self.state.clone();
        let stream = self
            .use_case
            .execute(query.page(page).size(self.page_size));
        let job_token = token.clone();

        let handle = tokio::spawn(async move {
            futures::pin_mut!(stream);
            while let Some(result) = stream.next().await {
                state.update_if(|s| {
                    // Checked under the state lock so a superseded job cannot commit
                    if job_token.is_cancelled() {
                        return false;
                    }
                    apply_page_result(s, result, has_loaded_once, page);
                    true
                });
                if job_token.is_cancelled() {
                    debug!("Dropping results of cancelled fetch for page {}", page);
                    return;
                }
            }
        });

        match self.job.lock() {
            Ok(mut slot) => {
                if let Some(previous) = slot.replace(Job::new(token, handle)) {
                    previous.cancel();
                }
            }
            Err(_) => warn!("Event list job slot poisoned; fetch is not cancellable"),
        }
    }
}

/// Merge one emission of the fetch stream into the list state.
pub fn apply_page_result(
    state: &mut EventListUiState,
    result: Resource<Vec<Event>>,
    has_loaded_once: bool,
    page: u32,
) {
    match result {
        Resource::Loading => {
            if !has_loaded_once {
                state.events = Resource::Loading;
            }
        }
        Resource::Success { data, total_pages } => {
            let events = if has_loaded_once {
                let mut events = state.events.data().cloned().unwrap_or_default();
                events.extend(data);
                events
            } else {
                data
            };
            state.events = Resource::Success {
                data: events,
                total_pages,
            };
            state.pagination = PaginationState {
                page,
                total_pages,
                can_load_more: PaginationState::has_more_after(total_pages, page),
                is_loading_more: false,
            };
        }
        Resource::Error { message, data } => {
            // Keep pages already on screen; the page counter stays on the last good page
            if state.events.is_empty() {
                state.events = Resource::Error { message, data };
            } else {
                warn!("Loading page {} failed: {}", page, message);
            }
            state.pagination.is_loading_more = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(ids: &[&str]) -> Vec<Event> {
        ids.iter()
            .map(|id| Event {
                id: id.to_string(),
                ..Default::default()
            })
            .collect()
    }

    fn ids(state: &EventListUiState) -> Vec<String> {
        state
            .events
            .data()
            .map(|events| events.iter().map(|e| e.id.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_append_preserves_order() {
        let mut state = EventListUiState::default();
        apply_page_result(
            &mut state,
            Resource::Success { data: events(&["a", "b"]), total_pages: Some(3) },
            false,
            0,
        );
        apply_page_result(&mut state, Resource::Loading, true, 1);
        assert_eq!(ids(&state), vec!["a", "b"]);

        apply_page_result(
            &mut state,
            Resource::Success { data: events(&["c", "b"]), total_pages: Some(3) },
            true,
            1,
        );
        assert_eq!(ids(&state), vec!["a", "b", "c", "b"]);
        assert_eq!(state.pagination.page, 1);
        assert!(state.pagination.can_load_more);
    }

    #[test]
    fn test_can_load_more_boundary() {
        let mut state = EventListUiState::default();
        apply_page_result(
            &mut state,
            Resource::Success { data: events(&["a"]), total_pages: Some(2) },
            true,
            1,
        );
        assert!(!state.pagination.can_load_more);

        apply_page_result(
            &mut state,
            Resource::Success { data: events(&["a"]), total_pages: None },
            false,
            0,
        );
        assert!(!state.pagination.can_load_more);
    }

    #[test]
    fn test_error_after_first_page_keeps_list() {
        let mut state = EventListUiState::default();
        apply_page_result(
            &mut state,
            Resource::Success { data: events(&["a"]), total_pages: Some(5) },
            false,
            0,
        );
        state.pagination.is_loading_more = true;
        apply_page_result(&mut state, Resource::error("timeout"), true, 1);

        assert_eq!(ids(&state), vec!["a"]);
        assert!(state.events.error_message().is_none());
        assert_eq!(state.pagination.page, 0);
        assert!(!state.pagination.is_loading_more);
        assert!(state.pagination.can_load_more);
    }

    #[test]
    fn test_error_on_empty_list_is_shown() {
        let mut state = EventListUiState::default();
        apply_page_result(&mut state, Resource::error("offline"), false, 0);
        assert_eq!(state.events.error_message(), Some("offline"));
    }
}
