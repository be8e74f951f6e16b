use crate::app::ports::SavedEventsPort;
use crate::app::PreferencesStore;
use crate::controllers::state::StateHolder;
use crate::domain::{Event, FilterPreferences};
use crate::error::Result;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

/// App-wide state shared by the screens.
#[derive(Debug, Clone, PartialEq)]
pub struct AppUiState {
    pub current_event: Option<Event>,
    pub are_filters_applied: bool,
    pub saved_events_screen_reload_flag: bool,
    pub discover_screen_reload_flag: bool,
    pub event_list_screen_reload_flag: bool,
    pub event_list_screen_load_new_events_flag: bool,
    pub location_changed_flag: bool,
    /// Authoritative saved ids, as of the last store read or toggle
    pub saved_event_ids: HashSet<String>,
}

impl Default for AppUiState {
    fn default() -> Self {
        Self {
            current_event: None,
            are_filters_applied: false,
            saved_events_screen_reload_flag: false,
            discover_screen_reload_flag: false,
            event_list_screen_reload_flag: false,
            event_list_screen_load_new_events_flag: true,
            location_changed_flag: false,
            saved_event_ids: HashSet::new(),
        }
    }
}

/// Coordinates saved state and reload signals between screens.
pub struct AppController {
    saved_store: Arc<dyn SavedEventsPort>,
    preferences: Arc<PreferencesStore>,
    state: StateHolder<AppUiState>,
}

impl AppController {
    pub fn new(saved_store: Arc<dyn SavedEventsPort>, preferences: Arc<PreferencesStore>) -> Self {
        Self {
            saved_store,
            preferences,
            state: StateHolder::new(AppUiState::default()),
        }
    }

    pub fn state(&self) -> &StateHolder<AppUiState> {
        &self.state
    }

    pub fn saved_event_ids(&self) -> HashSet<String> {
        self.state.get().saved_event_ids
    }

    /// Read the saved ids from the store and ask every screen to reconcile.
    pub async fn load_saved_event_ids(&self) -> Result<()> {
        let ids = self.saved_store.saved_ids().await?;
        info!("{} saved events", ids.len());
        self.state.update(|s| {
            s.saved_event_ids = ids;
            raise_reload_flags(s);
        });
        Ok(())
    }

    /// Save or unsave `event`, then flag the other screens to reconcile.
    pub async fn change_event_saved(&self, event: &Event, save: bool) -> Result<()> {
        if save {
            self.saved_store.save_event(&event.with_saved(true)).await?;
        } else {
            self.saved_store.remove_event(&event.id).await?;
        }
        self.state.update(|s| {
            if save {
                s.saved_event_ids.insert(event.id.clone());
            } else {
                s.saved_event_ids.remove(&event.id);
            }
            if let Some(current) = s.current_event.as_mut().filter(|c| c.id == event.id) {
                current.saved = save;
            }
            raise_reload_flags(s);
        });
        Ok(())
    }

    pub fn set_current_event(&self, event: Event) {
        let saved = self.state.get().saved_event_ids.contains(&event.id);
        self.state
            .update(|s| s.current_event = Some(event.with_saved(saved)));
    }

    /// Recompute `are_filters_applied` from the stored preferences.
    pub async fn refresh_filters_applied(&self) {
        match self.preferences.filter_preferences().await {
            Ok(filters) => {
                let applied = filters != FilterPreferences::default();
                self.state.update(|s| s.are_filters_applied = applied);
            }
            Err(e) => warn!("Could not read filter preferences: {}", e),
        }
    }

    /// The filter screen committed changes: the list must reload from page 0.
    pub async fn on_filters_updated(&self) {
        self.state
            .update(|s| s.event_list_screen_load_new_events_flag = true);
        self.refresh_filters_applied().await;
    }

    pub fn on_location_changed(&self) {
        self.state.update(|s| {
            s.location_changed_flag = true;
            s.event_list_screen_load_new_events_flag = true;
        });
    }

    pub fn set_saved_events_screen_reload_flag(&self, value: bool) {
        self.state
            .update(|s| s.saved_events_screen_reload_flag = value);
    }

    pub fn set_discover_screen_reload_flag(&self, value: bool) {
        self.state.update(|s| s.discover_screen_reload_flag = value);
    }

    pub fn set_event_list_screen_reload_flag(&self, value: bool) {
        self.state
            .update(|s| s.event_list_screen_reload_flag = value);
    }

    pub fn set_event_list_screen_load_new_events_flag(&self, value: bool) {
        self.state
            .update(|s| s.event_list_screen_load_new_events_flag = value);
    }

    pub fn set_location_changed_flag(&self, value: bool) {
        self.state.update(|s| s.location_changed_flag = value);
    }
}

fn raise_reload_flags(state: &mut AppUiState) {
    state.saved_events_screen_reload_flag = true;
    state.discover_screen_reload_flag = true;
    state.event_list_screen_reload_flag = true;
}
