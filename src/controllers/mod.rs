//! Screen state controllers.
//!
//! Each controller owns one observable UI-state record and mediates between user
//! intent and the fetch use case and stores. Rendering is left to the host.

pub mod app;
pub mod discover;
pub mod event_list;
pub mod filter;
pub mod saved;
pub mod search;
pub mod state;

pub use app::{AppController, AppUiState};
pub use discover::{DiscoverCategory, DiscoverController, DiscoverSettings, DiscoverUiState};
pub use event_list::{EventListController, EventListUiState};
pub use filter::{FilterController, FilterUiState};
pub use saved::{SavedController, SavedUiState};
pub use search::{SearchController, SearchUiState};
pub use state::{CancellationToken, StateHolder};

use crate::domain::{Event, Resource};
use std::collections::HashSet;

/// Overwrite every event's `saved` flag from `saved_ids`. Returns whether anything changed.
pub fn reconcile_saved(resource: &mut Resource<Vec<Event>>, saved_ids: &HashSet<String>) -> bool {
    let Some(events) = resource.data_mut() else {
        return false;
    };
    let mut changed = false;
    for event in events.iter_mut() {
        let saved = saved_ids.contains(&event.id);
        if event.saved != saved {
            event.saved = saved;
            changed = true;
        }
    }
    changed
}

/// Set the `saved` flag of one event. Returns whether it was found and changed.
pub fn mark_saved(resource: &mut Resource<Vec<Event>>, event_id: &str, saved: bool) -> bool {
    resource
        .data_mut()
        .and_then(|events| events.iter_mut().find(|e| e.id == event_id))
        .map_or(false, |event| {
            let changed = event.saved != saved;
            event.saved = saved;
            changed
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(ids: &[&str]) -> Resource<Vec<Event>> {
        Resource::success(
            ids.iter()
                .map(|id| Event {
                    id: id.to_string(),
                    name: format!("Event {id}"),
                    ..Default::default()
                })
                .collect(),
        )
    }

    #[test]
    fn test_reconcile_is_idempotent_and_touches_only_saved() {
        let mut resource = events(&["a", "b", "c"]);
        let original = resource.clone();
        let ids: HashSet<String> = ["b".to_string(), "z".to_string()].into();

        assert!(reconcile_saved(&mut resource, &ids));
        let once = resource.clone();
        assert!(!reconcile_saved(&mut resource, &ids));
        assert_eq!(resource, once);

        let (after, before) = (resource.data().unwrap(), original.data().unwrap());
        for (a, b) in after.iter().zip(before) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.with_saved(false), b.with_saved(false));
            assert_eq!(a.saved, a.id == "b");
        }
    }

    #[test]
    fn test_reconcile_keeps_partial_data_on_error() {
        let mut resource = Resource::Error {
            message: "boom".to_string(),
            data: events(&["a"]).data().cloned(),
        };
        assert!(reconcile_saved(&mut resource, &["a".to_string()].into()));
        assert!(resource.data().unwrap()[0].saved);

        let mut loading: Resource<Vec<Event>> = Resource::Loading;
        assert!(!reconcile_saved(&mut loading, &HashSet::new()));
    }

    #[test]
    fn test_mark_saved_single_event() {
        let mut resource = events(&["a", "b"]);
        assert!(mark_saved(&mut resource, "b", true));
        assert!(!mark_saved(&mut resource, "b", true));
        assert!(!mark_saved(&mut resource, "missing", true));
        assert!(!resource.data().unwrap()[0].saved);
        assert!(resource.data().unwrap()[1].saved);
    }
}
