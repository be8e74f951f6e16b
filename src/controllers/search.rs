use crate::app::PreferencesStore;
use crate::controllers::state::StateHolder;
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchUiState {
    pub is_search_bar_expanded: bool,
    pub search_query: String,
    pub is_location_menu_expanded: bool,
    pub location_search_query: String,
    pub search_history: Vec<String>,
}

pub struct SearchController {
    preferences: Arc<PreferencesStore>,
    state: StateHolder<SearchUiState>,
}

impl SearchController {
    pub fn new(preferences: Arc<PreferencesStore>) -> Self {
        Self {
            preferences,
            state: StateHolder::new(SearchUiState::default()),
        }
    }

    pub fn state(&self) -> &StateHolder<SearchUiState> {
        &self.state
    }

    pub async fn load_history(&self) {
        match self.preferences.search_history().await {
            Ok(history) => self.state.update(|s| s.search_history = history),
            Err(e) => warn!("Could not read search history: {}", e),
        }
    }

    pub fn set_search_bar_expanded(&self, expanded: bool) {
        self.state.update(|s| s.is_search_bar_expanded = expanded);
    }

    pub fn update_search_query(&self, query: &str) {
        self.state.update(|s| s.search_query = query.to_string());
    }

    pub fn update_location_menu_expanded(&self, expanded: bool) {
        self.state.update(|s| s.is_location_menu_expanded = expanded);
    }

    pub fn update_location_search_query(&self, query: &str) {
        self.state
            .update(|s| s.location_search_query = query.to_string());
    }

    /// Record the current query and return the keyword to search for.
    ///
    /// Blank queries are ignored and return `None`.
    pub async fn submit_search(&self) -> Option<String> {
        let keyword = self.state.get().search_query.trim().to_string();
        if keyword.is_empty() {
            return None;
        }
        match self.preferences.push_search_history(&keyword).await {
            Ok(history) => self.state.update(|s| {
                s.search_history = history;
                s.is_search_bar_expanded = false;
            }),
            Err(e) => warn!("Could not record search '{}': {}", keyword, e),
        }
        Some(keyword)
    }

    pub async fn clear_history(&self) {
        match self.preferences.clear_search_history().await {
            Ok(()) => self.state.update(|s| s.search_history.clear()),
            Err(e) => warn!("Could not clear search history: {}", e),
        }
    }
}
