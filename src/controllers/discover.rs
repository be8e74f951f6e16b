use crate::apis::EventQuery;
use crate::app::{GetEventsUseCase, PreferencesStore};
use crate::constants::{
    API_DATE_TIME_FORMAT, ARTS_SEGMENT_NAME, MUSIC_SEGMENT_NAME, SORT_DISTANCE_ASC,
    SPORTS_SEGMENT_NAME,
};
use crate::controllers::state::StateHolder;
use crate::controllers::{mark_saved, reconcile_saved};
use crate::domain::{Event, Resource};
use chrono::{DateTime, Datelike, Duration as ChronoDuration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use futures::StreamExt;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// One feed on the discover screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoverCategory {
    ThisWeekend,
    NearYou,
    Music,
    Sports,
    Arts,
}

impl DiscoverCategory {
    /// Load order on the screen.
    pub const ALL: [DiscoverCategory; 5] = [
        DiscoverCategory::ThisWeekend,
        DiscoverCategory::NearYou,
        DiscoverCategory::Music,
        DiscoverCategory::Sports,
        DiscoverCategory::Arts,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            DiscoverCategory::ThisWeekend => "This Weekend",
            DiscoverCategory::NearYou => "Near You",
            DiscoverCategory::Music => "Music",
            DiscoverCategory::Sports => "Sports",
            DiscoverCategory::Arts => "Arts & Theatre",
        }
    }
}

impl fmt::Display for DiscoverCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiscoverUiState {
    pub events_this_weekend: Resource<Vec<Event>>,
    pub events_near_you: Resource<Vec<Event>>,
    pub music_events: Resource<Vec<Event>>,
    pub sports_events: Resource<Vec<Event>>,
    pub arts_events: Resource<Vec<Event>>,
    pub is_refreshing: bool,
}

impl DiscoverUiState {
    pub fn category(&self, category: DiscoverCategory) -> &Resource<Vec<Event>> {
        match category {
            DiscoverCategory::ThisWeekend => &self.events_this_weekend,
            DiscoverCategory::NearYou => &self.events_near_you,
            DiscoverCategory::Music => &self.music_events,
            DiscoverCategory::Sports => &self.sports_events,
            DiscoverCategory::Arts => &self.arts_events,
        }
    }

    pub fn category_mut(&mut self, category: DiscoverCategory) -> &mut Resource<Vec<Event>> {
        match category {
            DiscoverCategory::ThisWeekend => &mut self.events_this_weekend,
            DiscoverCategory::NearYou => &mut self.events_near_you,
            DiscoverCategory::Music => &mut self.music_events,
            DiscoverCategory::Sports => &mut self.sports_events,
            DiscoverCategory::Arts => &mut self.arts_events,
        }
    }
}

/// Settings for the discover feeds
#[derive(Debug, Clone)]
pub struct DiscoverSettings {
    pub page_size: u32,
    pub near_you_radius: String,
    /// Pause between category requests
    pub request_delay: Duration,
}

/// Loads the five discover feeds, one after another, each into its own slice.
pub struct DiscoverController {
    use_case: GetEventsUseCase,
    preferences: Arc<PreferencesStore>,
    settings: DiscoverSettings,
    state: StateHolder<DiscoverUiState>,
}

impl DiscoverController {
    pub fn new(
        use_case: GetEventsUseCase,
        preferences: Arc<PreferencesStore>,
        settings: DiscoverSettings,
    ) -> Self {
        Self {
            use_case,
            preferences,
            settings,
            state: StateHolder::new(DiscoverUiState::default()),
        }
    }

    pub fn state(&self) -> &StateHolder<DiscoverUiState> {
        &self.state
    }

    pub async fn load_all(&self) {
        for (i, category) in DiscoverCategory::ALL.into_iter().enumerate() {
            if i > 0 {
                self.pause().await;
            }
            self.load_category(category).await;
        }
    }

    /// Pull-to-refresh: like `load_all`, with `is_refreshing` raised around the first feed.
    pub async fn refresh_all(&self) {
        self.state.update(|s| s.is_refreshing = true);
        for (i, category) in DiscoverCategory::ALL.into_iter().enumerate() {
            if i > 0 {
                self.pause().await;
            }
            self.load_category(category).await;
            if i == 0 {
                self.state.update(|s| s.is_refreshing = false);
            }
        }
    }

    pub async fn load_category(&self, category: DiscoverCategory) {
        let geo_point = match self.preferences.geo_point().await {
            Ok(geo_point) => geo_point,
            Err(e) => {
                warn!("Could not read stored location: {}", e);
                None
            }
        };
        let query = self.category_query(category, geo_point, &Local::now());

        let stream = self.use_case.execute(query);
        futures::pin_mut!(stream);
        while let Some(result) = stream.next().await {
            if let Some(message) = result.error_message() {
                warn!("{} feed failed: {}", category, message);
            }
            self.state.update(|s| *s.category_mut(category) = result);
        }
        info!("{} feed loaded", category);
    }

    /// Query for one feed as of `now`.
    pub fn category_query<Tz: TimeZone>(
        &self,
        category: DiscoverCategory,
        geo_point: Option<String>,
        now: &DateTime<Tz>,
    ) -> EventQuery {
        let mut query = EventQuery::new().size(self.settings.page_size);
        query.geo_point = geo_point;
        match category {
            DiscoverCategory::ThisWeekend => {
                let (start, end) = weekend_window(now);
                query.window(
                    start.format(API_DATE_TIME_FORMAT).to_string(),
                    end.format(API_DATE_TIME_FORMAT).to_string(),
                )
            }
            DiscoverCategory::NearYou => query
                .sort(SORT_DISTANCE_ASC)
                .radius(self.settings.near_you_radius.clone()),
            DiscoverCategory::Music => query.segment_name(MUSIC_SEGMENT_NAME),
            DiscoverCategory::Sports => query.segment_name(SPORTS_SEGMENT_NAME),
            DiscoverCategory::Arts => query.segment_name(ARTS_SEGMENT_NAME),
        }
    }

    pub fn change_event_saved(&self, event_id: &str, saved: bool, category: DiscoverCategory) {
        self.state
            .update_if(|s| mark_saved(s.category_mut(category), event_id, saved));
    }

    pub fn update_events_saved(&self, saved_ids: &HashSet<String>) {
        self.state.update_if(|s| {
            DiscoverCategory::ALL
                .into_iter()
                .fold(false, |changed, c| reconcile_saved(s.category_mut(c), saved_ids) || changed)
        });
    }

    async fn pause(&self) {
        if !self.settings.request_delay.is_zero() {
            tokio::time::sleep(self.settings.request_delay).await;
        }
    }
}

/// Next weekend as a UTC `[start, end)` window.
///
/// Start is local midnight of the next Saturday strictly after `now`'s date (a
/// Saturday rolls to the following week), end is local midnight two days later.
pub fn weekend_window<Tz: TimeZone>(now: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
    let today = now.date_naive();
    let from_monday = today.weekday().num_days_from_monday() as i64;
    let days_ahead = match (5 - from_monday).rem_euclid(7) {
        0 => 7,
        n => n,
    };
    let saturday = today + ChronoDuration::days(days_ahead);
    let monday = saturday + ChronoDuration::days(2);

    let tz = now.timezone();
    (local_midnight(&tz, saturday), local_midnight(&tz, monday))
}

fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        // Midnight can fall in a DST gap
        .or_else(|| {
            tz.from_local_datetime(&(midnight + ChronoDuration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}
