//! Counters for the events API and the local stores.
//!
//! Recording goes through the `metrics` facade; without an installed recorder the
//! calls are no-ops, so the library never requires an exporter.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    ApiRequests,
    ApiFailures,
    ApiEventsFetched,
    ApiRequestDuration,
    SavedEventsWrites,
    PreferencesWrites,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::ApiRequests => "lineup_api_requests_total",
            MetricName::ApiFailures => "lineup_api_failures_total",
            MetricName::ApiEventsFetched => "lineup_api_events_fetched_total",
            MetricName::ApiRequestDuration => "lineup_api_request_duration_seconds",
            MetricName::SavedEventsWrites => "lineup_saved_events_writes_total",
            MetricName::PreferencesWrites => "lineup_preferences_writes_total",
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod api {
    use super::MetricName;

    pub fn request_sent(endpoint: &'static str) {
        ::metrics::counter!(MetricName::ApiRequests.as_str(), "endpoint" => endpoint).increment(1);
    }

    /// `kind` is [`crate::error::LineupError::kind`]
    pub fn request_failed(kind: &'static str) {
        ::metrics::counter!(MetricName::ApiFailures.as_str(), "kind" => kind).increment(1);
    }

    pub fn events_fetched(count: usize) {
        ::metrics::counter!(MetricName::ApiEventsFetched.as_str()).increment(count as u64);
    }

    pub fn request_duration(secs: f64) {
        ::metrics::histogram!(MetricName::ApiRequestDuration.as_str()).record(secs);
    }
}

pub mod stores {
    use super::MetricName;

    pub fn saved_event_write(op: &'static str) {
        ::metrics::counter!(MetricName::SavedEventsWrites.as_str(), "op" => op).increment(1);
    }

    pub fn preference_write(op: &'static str) {
        ::metrics::counter!(MetricName::PreferencesWrites.as_str(), "op" => op).increment(1);
    }
}
