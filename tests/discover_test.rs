mod common;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use chrono_tz::America::{Los_Angeles, New_York};
use chrono_tz::Europe::London;
use common::{ids, preferences, MockEventsApi};
use lineup::app::GetEventsUseCase;
use lineup::controllers::discover::weekend_window;
use lineup::controllers::{DiscoverCategory, DiscoverController, DiscoverSettings};
use lineup::domain::{GeoPoint, LocationPreference};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

fn settings() -> DiscoverSettings {
    DiscoverSettings {
        page_size: 3,
        near_you_radius: "50".to_string(),
        request_delay: Duration::ZERO,
    }
}

async fn wait_for_requests(api: &MockEventsApi, count: usize) -> Result<()> {
    tokio::time::timeout(Duration::from_secs(5), async {
        while api.requests().len() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await?;
    Ok(())
}

#[tokio::test]
async fn test_load_all_fills_every_feed_in_order() -> Result<()> {
    let api = Arc::new(MockEventsApi::new(1, 2));
    let discover = DiscoverController::new(GetEventsUseCase::new(api.clone()), preferences(), settings());

    discover.load_all().await;

    let state = discover.state().get();
    for category in DiscoverCategory::ALL {
        assert_eq!(state.category(category).data().map(Vec::len), Some(2), "{category}");
    }
    assert_eq!(ids(state.music_events.data()), vec!["Music-0-0", "Music-0-1"]);

    let requests = api.requests();
    assert_eq!(requests.len(), 5);
    assert!(requests[0].start_date_time.is_some() && requests[0].end_date_time.is_some());
    assert_eq!(requests[1].sort.as_deref(), Some("distance,asc"));
    assert_eq!(requests[1].radius.as_deref(), Some("50"));
    let segments: Vec<Option<&str>> = requests[2..]
        .iter()
        .map(|q| q.segment_name.as_deref())
        .collect();
    assert_eq!(segments, vec![Some("Music"), Some("Sports"), Some("Arts & Theatre")]);
    assert!(requests.iter().all(|q| q.size == Some(3)));
    Ok(())
}

#[tokio::test]
async fn test_failed_feed_leaves_siblings_alone() -> Result<()> {
    let api = Arc::new(MockEventsApi::new(1, 1));
    api.fail_segment("Sports");
    let discover = DiscoverController::new(GetEventsUseCase::new(api.clone()), preferences(), settings());

    discover.load_all().await;

    let state = discover.state().get();
    assert!(state.sports_events.error_message().unwrap().contains("Sports unavailable"));
    assert!(state.arts_events.data().is_some());
    assert!(state.music_events.data().is_some());
    assert!(state.events_near_you.data().is_some());

    // A single feed can be retried on its own
    discover.load_category(DiscoverCategory::Sports).await;
    assert!(discover.state().get().sports_events.error_message().is_some());
    assert_eq!(api.requests().len(), 6);
    Ok(())
}

#[tokio::test]
async fn test_stored_location_is_sent_as_geo_point() -> Result<()> {
    let api = Arc::new(MockEventsApi::new(1, 1));
    let prefs = preferences();
    prefs
        .save_location(&LocationPreference {
            point: GeoPoint::new(47.6062, -122.3321),
            label: Some("Seattle".to_string()),
        })
        .await?;
    let discover = DiscoverController::new(GetEventsUseCase::new(api.clone()), prefs, settings());

    discover.refresh_all().await;

    assert!(!discover.state().get().is_refreshing);
    let requests = api.requests();
    let geo_point = requests[0].geo_point.clone().unwrap();
    assert_eq!(geo_point.len(), 9);
    assert!(geo_point.starts_with("c23"));
    assert!(requests.iter().all(|q| q.geo_point.as_deref() == Some(geo_point.as_str())));
    Ok(())
}

#[tokio::test]
async fn test_refresh_indicator_covers_only_first_feed() -> Result<()> {
    let api = Arc::new(MockEventsApi::new(1, 1));
    let discover = Arc::new(DiscoverController::new(
        GetEventsUseCase::new(api.clone()),
        preferences(),
        settings(),
    ));

    let weekend_gate = api.close_gate();
    let refreshing = discover.clone();
    let handle = tokio::spawn(async move { refreshing.refresh_all().await });

    wait_for_requests(&api, 1).await?;
    let state = discover.state().get();
    assert!(state.is_refreshing);
    assert!(state.events_this_weekend.is_loading());

    let near_you_gate = api.close_gate();
    weekend_gate.notify_one();
    wait_for_requests(&api, 2).await?;
    let state = discover.state().get();
    assert!(!state.is_refreshing);
    assert!(state.events_this_weekend.data().is_some());
    assert_eq!(api.requests()[1].sort.as_deref(), Some("distance,asc"));

    api.open_gate();
    near_you_gate.notify_one();
    tokio::time::timeout(Duration::from_secs(5), handle).await??;

    let state = discover.state().get();
    assert!(!state.is_refreshing);
    for category in DiscoverCategory::ALL {
        assert!(state.category(category).data().is_some(), "{category}");
    }
    Ok(())
}

#[tokio::test]
async fn test_saved_ids_reconcile_across_feeds() -> Result<()> {
    let api = Arc::new(MockEventsApi::new(1, 2));
    let discover = DiscoverController::new(GetEventsUseCase::new(api), preferences(), settings());
    discover.load_all().await;

    let saved: HashSet<String> = ["Music-0-1".to_string(), "Arts & Theatre-0-0".to_string()].into();
    discover.update_events_saved(&saved);
    let once = discover.state().get();
    discover.update_events_saved(&saved);
    assert_eq!(discover.state().get(), once);

    let saved_now: Vec<String> = DiscoverCategory::ALL
        .into_iter()
        .flat_map(|c| once.category(c).data().cloned().unwrap_or_default())
        .filter(|e| e.saved)
        .map(|e| e.id)
        .collect();
    assert_eq!(saved_now, vec!["Music-0-1", "Arts & Theatre-0-0"]);

    discover.change_event_saved("Music-0-1", false, DiscoverCategory::Music);
    assert!(discover
        .state()
        .get()
        .music_events
        .data()
        .unwrap()
        .iter()
        .all(|e| !e.saved));
    Ok(())
}

#[test]
fn test_weekend_window_across_spring_forward() {
    // US clocks change on Sunday 2025-03-09
    let now = New_York.with_ymd_and_hms(2025, 3, 5, 18, 30, 0).unwrap();
    let (start, end) = weekend_window(&now);
    assert_eq!(start, Utc.with_ymd_and_hms(2025, 3, 8, 5, 0, 0).unwrap());
    assert_eq!(end, Utc.with_ymd_and_hms(2025, 3, 10, 4, 0, 0).unwrap());
}

#[test]
fn test_weekend_window_across_fall_back() {
    // UK clocks change on Sunday 2025-10-26
    let now = London.with_ymd_and_hms(2025, 10, 22, 9, 0, 0).unwrap();
    let (start, end) = weekend_window(&now);
    assert_eq!(start, Utc.with_ymd_and_hms(2025, 10, 24, 23, 0, 0).unwrap());
    assert_eq!(end, Utc.with_ymd_and_hms(2025, 10, 27, 0, 0, 0).unwrap());
}

#[test]
fn test_weekend_query_uses_local_saturday() {
    let api = Arc::new(MockEventsApi::new(1, 1));
    let discover = DiscoverController::new(GetEventsUseCase::new(api), preferences(), settings());

    // Late Friday evening in California is already Saturday in UTC
    let now = Los_Angeles.with_ymd_and_hms(2025, 11, 7, 23, 0, 0).unwrap();
    let query = discover.category_query(DiscoverCategory::ThisWeekend, None, &now);
    assert_eq!(query.start_date_time.as_deref(), Some("2025-11-08T08:00:00Z"));
    assert_eq!(query.end_date_time.as_deref(), Some("2025-11-10T08:00:00Z"));

    // On Saturday itself the window moves to next week
    let now = Los_Angeles.with_ymd_and_hms(2025, 11, 8, 10, 0, 0).unwrap();
    let query = discover.category_query(DiscoverCategory::ThisWeekend, None, &now);
    assert_eq!(query.start_date_time.as_deref(), Some("2025-11-15T08:00:00Z"));
}
