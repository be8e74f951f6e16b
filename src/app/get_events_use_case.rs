use crate::apis::EventQuery;
use crate::app::ports::EventsApiPort;
use crate::domain::{Event, Resource, Segment};
use crate::error::Result;
use crate::observability::metrics;
use async_stream::stream;
use futures::Stream;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Event fetch orchestrator.
///
/// Each call yields `Loading` followed by exactly one `Success` or `Error`. Nothing
/// is held between calls, so a stream can simply be requested again to retry.
#[derive(Clone)]
pub struct GetEventsUseCase {
    api: Arc<dyn EventsApiPort>,
}

impl GetEventsUseCase {
    pub fn new(api: Arc<dyn EventsApiPort>) -> Self {
        Self { api }
    }

    /// Search for one page of events. The stream is lazy: no request is sent until it is polled.
    pub fn execute(
        &self,
        query: EventQuery,
    ) -> impl Stream<Item = Resource<Vec<Event>>> + Send + 'static {
        let api = Arc::clone(&self.api);
        stream! {
            yield Resource::Loading;
            debug!(params = ?query.to_query_pairs(), "Searching events");
            let started = Instant::now();
            metrics::api::request_sent("events");
            let outcome = api.search_events(&query).await;
            metrics::api::request_duration(started.elapsed().as_secs_f64());
            match outcome {
                Ok(response) => {
                    let page = response.into_page();
                    metrics::api::events_fetched(page.events.len());
                    info!(
                        "Fetched {} events (page {:?} of {:?})",
                        page.events.len(),
                        query.page,
                        page.total_pages
                    );
                    yield Resource::Success {
                        data: page.events,
                        total_pages: page.total_pages,
                    };
                }
                Err(e) => {
                    metrics::api::request_failed(e.kind());
                    warn!("Event search failed: {}", e);
                    yield Resource::error(e.to_string());
                }
            }
        }
    }

    /// Fetch a single event for the detail view.
    pub fn event_details(
        &self,
        event_id: impl Into<String>,
    ) -> impl Stream<Item = Resource<Event>> + Send + 'static {
        let api = Arc::clone(&self.api);
        let event_id = event_id.into();
        stream! {
            yield Resource::Loading;
            metrics::api::request_sent("event");
            match api.get_event(&event_id).await {
                Ok(dto) => match dto.into_event() {
                    Some(event) => yield Resource::success(event),
                    None => {
                        metrics::api::request_failed("mapping");
                        warn!("Event {} returned without an id", event_id);
                        yield Resource::error(format!("Event {event_id} could not be read"));
                    }
                },
                Err(e) => {
                    metrics::api::request_failed(e.kind());
                    warn!("Fetching event {} failed: {}", event_id, e);
                    yield Resource::error(e.to_string());
                }
            }
        }
    }

    /// Segment → genre → subgenre catalog used to populate filter options.
    pub async fn segments(&self) -> Result<Vec<Segment>> {
        metrics::api::request_sent("classifications");
        let response = self.api.get_classifications().await.map_err(|e| {
            metrics::api::request_failed(e.kind());
            e
        })?;
        Ok(response.into_segments())
    }
}
