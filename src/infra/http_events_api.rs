use crate::apis::dto::{ApiFaultDto, ClassificationsResponseDto, EventDto, SearchResponseDto};
use crate::apis::EventQuery;
use crate::app::ports::EventsApiPort;
use crate::config::ApiConfig;
use crate::error::{LineupError, Result};
use crate::infra::rate_limiter::RateLimiter;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// reqwest adapter for the events API
pub struct HttpEventsApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    limiter: RateLimiter,
}

impl HttpEventsApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LineupError::Config(
                "api_key is empty; set LINEUP_API_KEY or [api].api_key".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .user_agent(concat!("lineup/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            limiter: RateLimiter::new(config.requests_per_second),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Vec<(&'static str, String)>,
    ) -> Result<T> {
        self.limiter.acquire().await;

        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {} {:?}", url, params);
        let response = self
            .client
            .get(&url)
            .query(&params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            let message = serde_json::from_str::<ApiFaultDto>(&body)
                .ok()
                .and_then(|fault| fault.message())
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request rejected")
                        .to_string()
                });
            warn!("{} returned {}: {}", path, status, message);
            return Err(LineupError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl EventsApiPort for HttpEventsApi {
    #[instrument(skip(self, query), fields(page = ?query.page))]
    async fn search_events(&self, query: &EventQuery) -> Result<SearchResponseDto> {
        self.get_json("events.json", query.to_query_pairs()).await
    }

    #[instrument(skip(self))]
    async fn get_event(&self, event_id: &str) -> Result<EventDto> {
        self.get_json(&format!("events/{}.json", event_id), Vec::new())
            .await
    }

    #[instrument(skip(self))]
    async fn get_classifications(&self) -> Result<ClassificationsResponseDto> {
        self.get_json("classifications.json", Vec::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn api_for(server: &MockServer) -> HttpEventsApi {
        HttpEventsApi::new(&ApiConfig {
            base_url: server.uri(),
            api_key: "test-key".to_string(),
            timeout_secs: 5,
            requests_per_second: 0,
        })
        .unwrap()
    }

    #[test]
    fn test_empty_api_key_is_config_error() {
        let err = HttpEventsApi::new(&ApiConfig::default()).err().unwrap();
        assert_eq!(err.kind(), "config");
    }

    #[tokio::test]
    async fn test_search_sends_only_present_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events.json"))
            .and(query_param("apikey", "test-key"))
            .and(query_param("keyword", "jazz"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "_embedded": {"events": [{"id": "G5v", "name": "Jazz Night"}]},
                "page": {"size": 20, "totalElements": 41, "totalPages": 3, "number": 2}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let api = api_for(&server);
        let query = EventQuery::new().keyword("jazz").segment_name("  ").page(2);
        let response = api.search_events(&query).await.unwrap();
        assert_eq!(response.into_page().total_pages, Some(3));

        let requests = server.received_requests().await.unwrap();
        let query_string = requests[0].url.query().unwrap_or_default().to_string();
        assert!(!query_string.contains("segmentName"), "{query_string}");
    }

    #[tokio::test]
    async fn test_fault_body_becomes_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events.json"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "fault": {"faultstring": "Invalid ApiKey"}
            })))
            .mount(&server)
            .await;

        let err = api_for(&server)
            .search_events(&EventQuery::new())
            .await
            .unwrap_err();
        match err {
            LineupError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid ApiKey");
            }
            other => panic!("expected api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_mapping_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/events/G5v.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = api_for(&server).get_event("G5v").await.unwrap_err();
        assert_eq!(err.kind(), "mapping");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let api = HttpEventsApi::new(&ApiConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: "k".to_string(),
            timeout_secs: 2,
            requests_per_second: 0,
        })
        .unwrap();
        let err = api.get_classifications().await.unwrap_err();
        assert_eq!(err.kind(), "network");
    }
}
