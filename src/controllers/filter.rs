use crate::app::{
    FilterRemoval, FilterUpdate, GetEventsUseCase, PreferencesStore, UpdateFilterPreferenceUseCase,
};
use crate::controllers::state::StateHolder;
use crate::domain::{Genre, LocationPreference, Segment, SortOption, Subgenre};
use crate::error::Result;
use std::sync::Arc;
use tracing::{debug, warn};

/// Editable filter draft. Selections are held by display name; the store keeps ids.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterUiState {
    pub is_location_menu_expanded: bool,
    pub location_search_query: String,
    pub is_sort_menu_expanded: bool,
    pub is_filter_menu_expanded: bool,
    pub current_sort_option: Option<SortOption>,
    pub segment_options: Vec<Segment>,
    pub genre_options: Vec<Genre>,
    pub subgenre_options: Vec<Subgenre>,
    pub current_segment: Option<String>,
    pub current_genres: Vec<String>,
    pub current_subgenres: Vec<String>,
    pub is_segment_preferences_expanded: bool,
    pub is_genre_preferences_expanded: bool,
    pub is_subgenre_preferences_expanded: bool,
    /// Raised after any committed change; the host reloads its list and lowers it
    pub preferences_updated: bool,
    pub catalog_error: Option<String>,
}

impl Default for FilterUiState {
    fn default() -> Self {
        Self {
            is_location_menu_expanded: false,
            location_search_query: String::new(),
            is_sort_menu_expanded: true,
            is_filter_menu_expanded: true,
            current_sort_option: None,
            segment_options: Vec::new(),
            genre_options: Vec::new(),
            subgenre_options: Vec::new(),
            current_segment: None,
            current_genres: Vec::new(),
            current_subgenres: Vec::new(),
            is_segment_preferences_expanded: false,
            is_genre_preferences_expanded: false,
            is_subgenre_preferences_expanded: false,
            preferences_updated: false,
            catalog_error: None,
        }
    }
}

impl FilterUiState {
    fn selected_segment(&self) -> Option<&Segment> {
        let name = self.current_segment.as_deref()?;
        self.segment_options.iter().find(|s| s.name == name)
    }

    // Option lists follow the current selection
    fn refresh_options(&mut self) {
        let genres = self
            .selected_segment()
            .map(|s| s.genres.clone())
            .unwrap_or_default();
        self.subgenre_options = genres
            .iter()
            .filter(|g| self.current_genres.contains(&g.name))
            .flat_map(|g| g.subgenres.iter().cloned())
            .collect();
        self.genre_options = genres;
    }
}

pub struct FilterController {
    use_case: GetEventsUseCase,
    preferences: Arc<PreferencesStore>,
    updater: UpdateFilterPreferenceUseCase,
    state: StateHolder<FilterUiState>,
}

impl FilterController {
    pub fn new(use_case: GetEventsUseCase, preferences: Arc<PreferencesStore>) -> Self {
        Self {
            use_case,
            updater: UpdateFilterPreferenceUseCase::new(Arc::clone(&preferences)),
            preferences,
            state: StateHolder::new(FilterUiState::default()),
        }
    }

    pub fn state(&self) -> &StateHolder<FilterUiState> {
        &self.state
    }

    /// Fetch the classification catalog and show the persisted selections by name.
    pub async fn load(&self) {
        let (segments, catalog_error) = match self.use_case.segments().await {
            Ok(segments) => (segments, None),
            Err(e) => {
                warn!("Could not load classifications: {}", e);
                (Vec::new(), Some(e.to_string()))
            }
        };
        let filters = match self.preferences.filter_preferences().await {
            Ok(filters) => filters,
            Err(e) => {
                warn!("Could not read filter preferences: {}", e);
                Default::default()
            }
        };

        let segment = filters
            .segment
            .as_deref()
            .and_then(|id| segments.iter().find(|s| s.id == id));
        let current_genres: Vec<String> = segment
            .map(|s| {
                filters
                    .genres
                    .iter()
                    .filter_map(|id| s.genre_by_id(id))
                    .map(|g| g.name.clone())
                    .collect()
            })
            .unwrap_or_default();
        let current_subgenres: Vec<String> = segment
            .map(|s| {
                filters
                    .subgenres
                    .iter()
                    .filter_map(|id| s.subgenre_by_id(id))
                    .map(|(_, sub)| sub.name.clone())
                    .collect()
            })
            .unwrap_or_default();
        let current_segment = segment.map(|s| s.name.clone());

        self.state.update(|s| {
            s.current_sort_option = filters.sort_option;
            s.current_segment = current_segment;
            s.current_genres = current_genres;
            s.current_subgenres = current_subgenres;
            s.segment_options = segments;
            s.catalog_error = catalog_error;
            s.refresh_options();
        });
    }

    /// Select a segment, dropping genre and subgenre selections that do not belong to it.
    pub async fn on_segment_selected(&self, segment_name: &str) {
        let snapshot = self.state.get();
        let Some(segment) = snapshot
            .segment_options
            .iter()
            .find(|s| s.name == segment_name)
            .cloned()
        else {
            warn!("Unknown segment selected: {}", segment_name);
            return;
        };

        let filters = match self.preferences.filter_preferences().await {
            Ok(filters) => filters,
            Err(e) => {
                warn!("Could not read filter preferences: {}", e);
                return;
            }
        };
        let (kept_genres, stale_genres): (Vec<String>, Vec<String>) = filters
            .genres
            .into_iter()
            .partition(|id| segment.genre_by_id(id).is_some());
        let (kept_subgenres, stale_subgenres): (Vec<String>, Vec<String>) = filters
            .subgenres
            .into_iter()
            .partition(|id| segment.subgenre_by_id(id).is_some());

        let committed = self
            .commit(self.persist_segment(&segment.id, &stale_genres, &stale_subgenres))
            .await;
        if committed {
            debug!(
                "Segment {} selected; cleared {} genres, {} subgenres",
                segment.name,
                stale_genres.len(),
                stale_subgenres.len()
            );
            self.state.update(|s| {
                s.current_genres = kept_genres
                    .iter()
                    .filter_map(|id| segment.genre_by_id(id))
                    .map(|g| g.name.clone())
                    .collect();
                s.current_subgenres = kept_subgenres
                    .iter()
                    .filter_map(|id| segment.subgenre_by_id(id))
                    .map(|(_, sub)| sub.name.clone())
                    .collect();
                s.current_segment = Some(segment.name.clone());
                s.is_segment_preferences_expanded = false;
                s.refresh_options();
            });
        }
    }

    pub async fn on_genre_selected(&self, genre_name: &str) {
        let snapshot = self.state.get();
        let Some(genre) = snapshot
            .selected_segment()
            .and_then(|s| s.genre_by_name(genre_name))
            .cloned()
        else {
            warn!("Genre {} is not available for the current segment", genre_name);
            return;
        };

        let committed = self
            .commit(self.updater.update(FilterUpdate {
                genre: Some(genre.id.clone()),
                ..Default::default()
            }))
            .await;
        if committed {
            self.state.update(|s| {
                if !s.current_genres.contains(&genre.name) {
                    s.current_genres.push(genre.name.clone());
                }
                s.is_genre_preferences_expanded = false;
                s.refresh_options();
            });
        }
    }

    pub async fn on_subgenre_selected(&self, subgenre_name: &str) {
        let snapshot = self.state.get();
        let Some(subgenre) = snapshot
            .subgenre_options
            .iter()
            .find(|sub| sub.name == subgenre_name)
            .cloned()
        else {
            warn!("Subgenre {} is not available for the selected genres", subgenre_name);
            return;
        };

        let committed = self
            .commit(self.updater.update(FilterUpdate {
                subgenre: Some(subgenre.id.clone()),
                ..Default::default()
            }))
            .await;
        if committed {
            self.state.update(|s| {
                if !s.current_subgenres.contains(&subgenre.name) {
                    s.current_subgenres.push(subgenre.name.clone());
                }
                s.is_subgenre_preferences_expanded = false;
            });
        }
    }

    /// Remove one genre together with the subgenres selected under it.
    pub async fn delete_genre(&self, genre_name: &str) {
        let snapshot = self.state.get();
        let Some(genre) = snapshot
            .selected_segment()
            .and_then(|s| s.genre_by_name(genre_name))
            .cloned()
        else {
            return;
        };
        let dependent: Vec<&Subgenre> = genre
            .subgenres
            .iter()
            .filter(|sub| snapshot.current_subgenres.contains(&sub.name))
            .collect();

        let dependent_ids: Vec<String> = dependent.iter().map(|sub| sub.id.clone()).collect();

        let committed = self
            .commit(self.persist_genre_removal(&genre.id, &dependent_ids))
            .await;
        if committed {
            self.state.update(|s| {
                s.current_genres.retain(|name| name != &genre.name);
                s.current_subgenres
                    .retain(|name| !genre.subgenres.iter().any(|sub| &sub.name == name));
                s.refresh_options();
            });
        }
    }

    pub async fn delete_subgenre(&self, subgenre_name: &str) {
        let snapshot = self.state.get();
        let Some(subgenre_id) = snapshot
            .selected_segment()
            .and_then(|s| s.subgenre_by_name(subgenre_name))
            .map(|(_, sub)| sub.id.clone())
        else {
            return;
        };

        let committed = self
            .commit(self.updater.remove_single(FilterRemoval {
                subgenre_id: Some(subgenre_id),
                ..Default::default()
            }))
            .await;
        if committed {
            self.state
                .update(|s| s.current_subgenres.retain(|name| name != subgenre_name));
        }
    }

    /// Reset segment, genres and subgenres.
    pub async fn clear_segment_preferences(&self) {
        let committed = self.commit(self.persist_cleared_segment()).await;
        if committed {
            self.state.update(|s| {
                s.current_segment = None;
                s.current_genres.clear();
                s.current_subgenres.clear();
                s.refresh_options();
            });
        }
    }

    pub async fn on_sort_option_selected(&self, option: SortOption) {
        let committed = self
            .commit(self.updater.update(FilterUpdate {
                sort_option: Some(option),
                ..Default::default()
            }))
            .await;
        if committed {
            self.state.update(|s| s.current_sort_option = Some(option));
        }
    }

    /// Persist a new location. The host reloads on the raised `preferences_updated`.
    pub async fn update_location(&self, location: LocationPreference) {
        let committed = self
            .commit(self.preferences.save_location(&location))
            .await;
        if committed {
            self.state.update(|s| {
                s.location_search_query = location.label.clone().unwrap_or_default();
                s.is_location_menu_expanded = false;
            });
        }
    }

    pub fn set_preferences_updated(&self, updated: bool) {
        self.state.update(|s| s.preferences_updated = updated);
    }

    pub fn toggle_sort_menu_expanded(&self) {
        self.state.update(|s| s.is_sort_menu_expanded = !s.is_sort_menu_expanded);
    }

    pub fn toggle_filter_menu_expanded(&self) {
        self.state
            .update(|s| s.is_filter_menu_expanded = !s.is_filter_menu_expanded);
    }

    pub fn toggle_segment_preferences_expanded(&self) {
        self.state.update(|s| {
            s.is_segment_preferences_expanded = !s.is_segment_preferences_expanded
        });
    }

    pub fn toggle_genre_preferences_expanded(&self) {
        self.state.update(|s| {
            s.is_genre_preferences_expanded = !s.is_genre_preferences_expanded
        });
    }

    pub fn toggle_subgenre_preferences_expanded(&self) {
        self.state.update(|s| {
            s.is_subgenre_preferences_expanded = !s.is_subgenre_preferences_expanded
        });
    }

    pub fn update_location_menu_expanded(&self, expanded: bool) {
        self.state.update(|s| s.is_location_menu_expanded = expanded);
    }

    pub fn update_location_search_query(&self, query: &str) {
        self.state
            .update(|s| s.location_search_query = query.to_string());
    }

    async fn persist_segment(
        &self,
        segment_id: &str,
        stale_genres: &[String],
        stale_subgenres: &[String],
    ) -> Result<()> {
        self.updater
            .update(FilterUpdate {
                segment: Some(segment_id.to_string()),
                ..Default::default()
            })
            .await?;
        for id in stale_genres {
            self.preferences.remove_single_genre(id).await?;
        }
        for id in stale_subgenres {
            self.preferences.remove_single_subgenre(id).await?;
        }
        Ok(())
    }

    async fn persist_genre_removal(&self, genre_id: &str, dependent_subgenres: &[String]) -> Result<()> {
        self.updater
            .remove_single(FilterRemoval {
                genre_id: Some(genre_id.to_string()),
                ..Default::default()
            })
            .await?;
        for id in dependent_subgenres {
            self.preferences.remove_single_subgenre(id).await?;
        }
        Ok(())
    }

    async fn persist_cleared_segment(&self) -> Result<()> {
        self.updater
            .remove_single(FilterRemoval {
                segment: true,
                ..Default::default()
            })
            .await?;
        self.updater.clear_selected(true, true).await
    }

    // Runs a store write; on success raises `preferences_updated`
    async fn commit(&self, write: impl std::future::Future<Output = Result<()>>) -> bool {
        match write.await {
            Ok(()) => {
                self.set_preferences_updated(true);
                true
            }
            Err(e) => {
                warn!("Saving filter preference failed: {}", e);
                false
            }
        }
    }
}
