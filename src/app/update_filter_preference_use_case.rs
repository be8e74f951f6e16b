use crate::app::preferences::PreferencesStore;
use crate::domain::{SortOption, SortType};
use crate::error::Result;
use std::sync::Arc;
use tracing::debug;

/// Fields to write in one [`UpdateFilterPreferenceUseCase::update`] call; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct FilterUpdate {
    pub radius: Option<String>,
    pub start_date_time: Option<String>,
    pub sort_option: Option<SortOption>,
    pub sort_type: Option<SortType>,
    pub genre: Option<String>,
    pub subgenre: Option<String>,
    pub segment: Option<String>,
}

/// What to drop in one [`UpdateFilterPreferenceUseCase::remove_single`] call.
#[derive(Debug, Clone, Default)]
pub struct FilterRemoval {
    pub genre_id: Option<String>,
    pub subgenre_id: Option<String>,
    pub segment: bool,
}

/// Use case for writing filter selections through to the preferences store
pub struct UpdateFilterPreferenceUseCase {
    preferences: Arc<PreferencesStore>,
}

impl UpdateFilterPreferenceUseCase {
    pub fn new(preferences: Arc<PreferencesStore>) -> Self {
        Self { preferences }
    }

    pub async fn update(&self, update: FilterUpdate) -> Result<()> {
        if let Some(radius) = update.radius {
            self.preferences.save_radius(&radius).await?;
        }
        if let Some(start) = update.start_date_time {
            self.preferences.save_start_date_time(&start).await?;
        }
        if let Some(option) = update.sort_option {
            self.preferences.save_sort_option(option).await?;
        }
        if let Some(sort_type) = update.sort_type {
            self.preferences.save_sort_type(sort_type).await?;
        }
        if let Some(genre) = update.genre {
            debug!("genre: {}", genre);
            self.preferences.save_genres(&[genre]).await?;
        }
        if let Some(subgenre) = update.subgenre {
            debug!("subgenre: {}", subgenre);
            self.preferences.save_subgenres(&[subgenre]).await?;
        }
        if let Some(segment) = update.segment {
            debug!("segment: {}", segment);
            self.preferences.save_segment(&segment).await?;
        }
        Ok(())
    }

    pub async fn remove_single(&self, removal: FilterRemoval) -> Result<()> {
        if let Some(genre_id) = removal.genre_id {
            self.preferences.remove_single_genre(&genre_id).await?;
        }
        if let Some(subgenre_id) = removal.subgenre_id {
            self.preferences.remove_single_subgenre(&subgenre_id).await?;
        }
        if removal.segment {
            self.preferences.remove_segment().await?;
        }
        Ok(())
    }

    pub async fn clear_selected(&self, clear_genres: bool, clear_subgenres: bool) -> Result<()> {
        if clear_genres {
            self.preferences.remove_all_genres().await?;
        }
        if clear_subgenres {
            self.preferences.remove_all_subgenres().await?;
        }
        Ok(())
    }
}
