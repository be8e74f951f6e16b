use crate::app::geo;
use crate::app::ports::KeyValuePort;
use crate::constants::{GEOHASH_PRECISION, SEARCH_HISTORY_LIMIT};
use crate::domain::{FilterPreferences, LocationPreference, SortOption, SortType};
use crate::error::Result;
use crate::observability::metrics;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

const RADIUS_KEY: &str = "filter.radius";
const START_DATE_TIME_KEY: &str = "filter.start_date_time";
const SORT_OPTION_KEY: &str = "filter.sort_option";
const SORT_TYPE_KEY: &str = "filter.sort_type";
const SEGMENT_KEY: &str = "filter.segment";
const GENRES_KEY: &str = "filter.genres";
const SUBGENRES_KEY: &str = "filter.subgenres";
const LOCATION_KEY: &str = "location";
const SEARCH_HISTORY_KEY: &str = "search.history";

/// Typed access to the persisted filter, location and search preferences.
///
/// Every field is read and written on its own; there is no cross-field transaction.
/// In particular clearing the segment does not clear genres, callers do that.
pub struct PreferencesStore {
    kv: Arc<dyn KeyValuePort>,
    // Serializes read-modify-write of list-valued keys
    list_lock: Mutex<()>,
}

impl PreferencesStore {
    pub fn new(kv: Arc<dyn KeyValuePort>) -> Self {
        Self {
            kv,
            list_lock: Mutex::new(()),
        }
    }

    pub async fn filter_preferences(&self) -> Result<FilterPreferences> {
        Ok(FilterPreferences {
            radius: self.radius().await?,
            start_date_time: self.start_date_time().await?,
            sort_option: self.sort_option().await?,
            sort_type: self.sort_type().await?,
            segment: self.segment().await?,
            genres: self.genres().await?,
            subgenres: self.subgenres().await?,
        })
    }

    // Radius

    pub async fn radius(&self) -> Result<Option<String>> {
        self.get_text(RADIUS_KEY).await
    }

    pub async fn save_radius(&self, radius: &str) -> Result<()> {
        self.put_text(RADIUS_KEY, radius).await
    }

    pub async fn remove_radius(&self) -> Result<()> {
        self.remove(RADIUS_KEY).await
    }

    // Start date-time

    pub async fn start_date_time(&self) -> Result<Option<String>> {
        self.get_text(START_DATE_TIME_KEY).await
    }

    pub async fn save_start_date_time(&self, start: &str) -> Result<()> {
        self.put_text(START_DATE_TIME_KEY, start).await
    }

    pub async fn remove_start_date_time(&self) -> Result<()> {
        self.remove(START_DATE_TIME_KEY).await
    }

    // Sort

    pub async fn sort_option(&self) -> Result<Option<SortOption>> {
        Ok(self
            .get_text(SORT_OPTION_KEY)
            .await?
            .and_then(|raw| raw.parse::<SortOption>().map_err(|e| warn!("{}", e)).ok()))
    }

    pub async fn save_sort_option(&self, option: SortOption) -> Result<()> {
        self.put_text(SORT_OPTION_KEY, option.as_str()).await
    }

    pub async fn remove_sort_option(&self) -> Result<()> {
        self.remove(SORT_OPTION_KEY).await
    }

    pub async fn sort_type(&self) -> Result<Option<SortType>> {
        Ok(self
            .get_text(SORT_TYPE_KEY)
            .await?
            .and_then(|raw| raw.parse::<SortType>().map_err(|e| warn!("{}", e)).ok()))
    }

    pub async fn save_sort_type(&self, sort_type: SortType) -> Result<()> {
        self.put_text(SORT_TYPE_KEY, sort_type.as_str()).await
    }

    pub async fn remove_sort_type(&self) -> Result<()> {
        self.remove(SORT_TYPE_KEY).await
    }

    // Segment

    pub async fn segment(&self) -> Result<Option<String>> {
        self.get_text(SEGMENT_KEY).await
    }

    pub async fn save_segment(&self, segment_id: &str) -> Result<()> {
        self.put_text(SEGMENT_KEY, segment_id).await
    }

    pub async fn remove_segment(&self) -> Result<()> {
        self.remove(SEGMENT_KEY).await
    }

    // Genres

    pub async fn genres(&self) -> Result<Vec<String>> {
        self.get_list(GENRES_KEY).await
    }

    /// Add genre ids to the selection, keeping existing ones and their order.
    pub async fn save_genres(&self, genre_ids: &[String]) -> Result<()> {
        self.add_to_list(GENRES_KEY, genre_ids).await
    }

    pub async fn remove_single_genre(&self, genre_id: &str) -> Result<()> {
        self.remove_from_list(GENRES_KEY, genre_id).await
    }

    pub async fn remove_all_genres(&self) -> Result<()> {
        self.remove(GENRES_KEY).await
    }

    // Subgenres

    pub async fn subgenres(&self) -> Result<Vec<String>> {
        self.get_list(SUBGENRES_KEY).await
    }

    pub async fn save_subgenres(&self, subgenre_ids: &[String]) -> Result<()> {
        self.add_to_list(SUBGENRES_KEY, subgenre_ids).await
    }

    pub async fn remove_single_subgenre(&self, subgenre_id: &str) -> Result<()> {
        self.remove_from_list(SUBGENRES_KEY, subgenre_id).await
    }

    pub async fn remove_all_subgenres(&self) -> Result<()> {
        self.remove(SUBGENRES_KEY).await
    }

    // Location

    pub async fn location(&self) -> Result<Option<LocationPreference>> {
        match self.kv.get(LOCATION_KEY).await? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(location) => Ok(Some(location)),
                Err(e) => {
                    warn!("Ignoring unreadable stored location: {}", e);
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    pub async fn save_location(&self, location: &LocationPreference) -> Result<()> {
        let raw = serde_json::to_string(location)?;
        self.put_text(LOCATION_KEY, &raw).await
    }

    pub async fn remove_location(&self) -> Result<()> {
        self.remove(LOCATION_KEY).await
    }

    /// Stored location encoded for the API's `geoPoint` parameter.
    pub async fn geo_point(&self) -> Result<Option<String>> {
        Ok(self
            .location()
            .await?
            .map(|location| geo::geohash(location.point, GEOHASH_PRECISION)))
    }

    // Search history

    pub async fn search_history(&self) -> Result<Vec<String>> {
        self.get_list(SEARCH_HISTORY_KEY).await
    }

    /// Record a search, most recent first, without duplicates.
    pub async fn push_search_history(&self, query: &str) -> Result<Vec<String>> {
        let query = query.trim();
        let _guard = self.list_lock.lock().await;
        let mut history = self.get_list(SEARCH_HISTORY_KEY).await?;
        if query.is_empty() {
            return Ok(history);
        }
        history.retain(|entry| !entry.eq_ignore_ascii_case(query));
        history.insert(0, query.to_string());
        history.truncate(SEARCH_HISTORY_LIMIT);
        self.put_list(SEARCH_HISTORY_KEY, &history).await?;
        Ok(history)
    }

    pub async fn clear_search_history(&self) -> Result<()> {
        self.remove(SEARCH_HISTORY_KEY).await
    }

    // Helpers

    async fn get_text(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .kv
            .get(key)
            .await?
            .filter(|value| !value.trim().is_empty()))
    }

    async fn put_text(&self, key: &str, value: &str) -> Result<()> {
        debug!("Saving preference {} = {}", key, value);
        self.kv.put(key, value).await?;
        metrics::stores::preference_write("save");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        debug!("Removing preference {}", key);
        self.kv.remove(key).await?;
        metrics::stores::preference_write("remove");
        Ok(())
    }

    async fn get_list(&self, key: &str) -> Result<Vec<String>> {
        match self.kv.get(key).await? {
            Some(raw) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(values) => Ok(values),
                Err(e) => {
                    warn!("Ignoring unreadable list preference {}: {}", key, e);
                    Ok(Vec::new())
                }
            },
            None => Ok(Vec::new()),
        }
    }

    async fn put_list(&self, key: &str, values: &[String]) -> Result<()> {
        let raw = serde_json::to_string(values)?;
        self.put_text(key, &raw).await
    }

    async fn add_to_list(&self, key: &str, additions: &[String]) -> Result<()> {
        let _guard = self.list_lock.lock().await;
        let mut values = self.get_list(key).await?;
        for addition in additions {
            let addition = addition.trim();
            if !addition.is_empty() && !values.iter().any(|v| v == addition) {
                values.push(addition.to_string());
            }
        }
        self.put_list(key, &values).await
    }

    async fn remove_from_list(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.list_lock.lock().await;
        let mut values = self.get_list(key).await?;
        let before = values.len();
        values.retain(|v| v != value);
        if values.len() == before {
            return Ok(());
        }
        if values.is_empty() {
            self.remove(key).await
        } else {
            self.put_list(key, &values).await
        }
    }
}
