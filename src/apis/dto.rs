//! Wire-format payloads of the events API and their mapping to the domain model.
//!
//! Every field is optional on the wire; mapping decides what a usable event needs.

use crate::domain::{
    Address, Attraction, Classification, ClassificationItem, Event, EventDates, EventImage,
    EventStart, GeoPoint, Genre, PriceRange, Segment, Subgenre, Venue,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

/// `GET /events.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponseDto {
    #[serde(rename = "_embedded")]
    pub embedded: Option<EmbeddedEventsDto>,
    pub page: Option<PageDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbeddedEventsDto {
    pub events: Option<Vec<EventDto>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDto {
    pub size: Option<u32>,
    pub total_elements: Option<u64>,
    pub total_pages: Option<u32>,
    pub number: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    #[serde(rename = "_embedded")]
    pub embedded: Option<EmbeddedEventDataDto>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub location: Option<LocationDto>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub additional_info: Option<String>,
    pub dates: Option<DatesDto>,
    pub images: Option<Vec<ImageDto>>,
    pub info: Option<String>,
    pub please_note: Option<String>,
    pub price_ranges: Option<Vec<PriceRangeDto>>,
    pub classifications: Option<Vec<ClassificationDto>>,
    pub place: Option<PlaceDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbeddedEventDataDto {
    pub venues: Option<Vec<VenueDto>>,
    pub attractions: Option<Vec<AttractionDto>>,
}

/// Coordinates arrive as numbers on events and as strings on venues.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationDto {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatesDto {
    pub start: Option<StartDto>,
    pub timezone: Option<String>,
    pub status: Option<StatusDto>,
    pub span_multiple_days: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartDto {
    pub local_date: Option<String>,
    pub local_time: Option<String>,
    pub date_time: Option<String>,
    #[serde(rename = "dateTBD")]
    pub date_tbd: Option<bool>,
    #[serde(rename = "dateTBA")]
    pub date_tba: Option<bool>,
    #[serde(rename = "timeTBA")]
    pub time_tba: Option<bool>,
    pub no_specific_time: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusDto {
    pub code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageDto {
    pub ratio: Option<String>,
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub width: Option<u32>,
    #[serde(default, deserialize_with = "lenient_u32")]
    pub height: Option<u32>,
    pub fallback: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceRangeDto {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub currency: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub min: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationDto {
    pub primary: Option<bool>,
    pub segment: Option<NamedDto>,
    pub genre: Option<NamedDto>,
    pub sub_genre: Option<NamedDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamedDto {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameDto {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateDto {
    pub name: Option<String>,
    pub state_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressLineDto {
    pub line1: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDto {
    pub address: Option<AddressLineDto>,
    pub city: Option<NameDto>,
    pub state: Option<StateDto>,
    pub postal_code: Option<String>,
    pub location: Option<LocationDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralInfoDto {
    pub general_rule: Option<String>,
    pub child_rule: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VenueDto {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub address: Option<AddressLineDto>,
    pub city: Option<NameDto>,
    pub state: Option<StateDto>,
    pub postal_code: Option<String>,
    pub location: Option<LocationDto>,
    pub images: Option<Vec<ImageDto>>,
    pub parking_detail: Option<String>,
    pub general_info: Option<GeneralInfoDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttractionDto {
    pub id: Option<String>,
    pub name: Option<String>,
    pub url: Option<String>,
    pub images: Option<Vec<ImageDto>>,
}

/// `GET /classifications.json`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassificationsResponseDto {
    #[serde(rename = "_embedded")]
    pub embedded: Option<EmbeddedClassificationsDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbeddedClassificationsDto {
    pub classifications: Option<Vec<ClassificationEntryDto>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassificationEntryDto {
    pub segment: Option<SegmentDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SegmentDto {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "_embedded")]
    pub embedded: Option<SegmentGenresDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SegmentGenresDto {
    pub genres: Option<Vec<GenreDto>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenreDto {
    pub id: Option<String>,
    pub name: Option<String>,
    #[serde(rename = "_embedded")]
    pub embedded: Option<GenreSubgenresDto>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenreSubgenresDto {
    pub subgenres: Option<Vec<NamedDto>>,
}

/// Error body returned alongside non-2xx statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiFaultDto {
    pub fault: Option<FaultDto>,
    pub errors: Option<Vec<FaultDetailDto>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FaultDto {
    pub faultstring: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FaultDetailDto {
    pub code: Option<String>,
    pub detail: Option<String>,
}

impl ApiFaultDto {
    pub fn message(&self) -> Option<String> {
        self.fault
            .as_ref()
            .and_then(|f| f.faultstring.clone())
            .or_else(|| {
                self.errors
                    .as_ref()
                    .and_then(|errors| errors.first())
                    .and_then(|e| e.detail.clone().or_else(|| e.code.clone()))
            })
    }
}

/// One mapped page of search results.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventPage {
    pub events: Vec<Event>,
    pub total_pages: Option<u32>,
}

impl SearchResponseDto {
    pub fn into_page(self) -> EventPage {
        let total_pages = self.page.and_then(|p| p.total_pages);
        let raw = self
            .embedded
            .and_then(|e| e.events)
            .unwrap_or_default();
        let received = raw.len();
        let events: Vec<Event> = raw.into_iter().filter_map(EventDto::into_event).collect();
        if events.len() < received {
            warn!(
                "Dropped {} events without an id from search response",
                received - events.len()
            );
        }
        EventPage { events, total_pages }
    }
}

impl EventDto {
    /// Normalize into an [`Event`]; listings without an id are unusable.
    pub fn into_event(self) -> Option<Event> {
        let id = non_blank(self.id)?;
        let (venues, attractions) = match self.embedded {
            Some(embedded) => (
                embedded
                    .venues
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(VenueDto::into_venue)
                    .collect(),
                embedded
                    .attractions
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(AttractionDto::into_attraction)
                    .collect(),
            ),
            None => (Vec::new(), Vec::new()),
        };

        Some(Event {
            id,
            name: self.name.unwrap_or_default(),
            url: non_blank(self.url),
            description: non_blank(self.description),
            additional_info: non_blank(self.additional_info),
            info: non_blank(self.info),
            please_note: non_blank(self.please_note),
            classifications: self
                .classifications
                .unwrap_or_default()
                .into_iter()
                .map(ClassificationDto::into_classification)
                .collect(),
            dates: self.dates.map(DatesDto::into_dates),
            images: map_images(self.images),
            price_ranges: self
                .price_ranges
                .unwrap_or_default()
                .into_iter()
                .map(|p| PriceRange {
                    min: p.min,
                    max: p.max,
                    currency: non_blank(p.currency),
                })
                .collect(),
            location: self.location.and_then(LocationDto::into_point),
            place: self.place.map(PlaceDto::into_address),
            venues,
            attractions,
            saved: false,
        })
    }
}

impl LocationDto {
    fn into_point(self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
            _ => None,
        }
    }
}

impl DatesDto {
    fn into_dates(self) -> EventDates {
        EventDates {
            start: self.start.map(StartDto::into_start),
            timezone: non_blank(self.timezone),
            status: self.status.and_then(|s| non_blank(s.code)),
            span_multiple_days: self.span_multiple_days.unwrap_or(false),
        }
    }
}

impl StartDto {
    fn into_start(self) -> EventStart {
        let local_date = self.local_date.as_deref().and_then(|raw| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|e| debug!("Unparseable localDate {}: {}", raw, e))
                .ok()
        });
        let local_time = self.local_time.as_deref().and_then(|raw| {
            NaiveTime::parse_from_str(raw, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
                .map_err(|e| debug!("Unparseable localTime {}: {}", raw, e))
                .ok()
        });
        let date_time = self.date_time.as_deref().and_then(|raw| {
            DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| debug!("Unparseable dateTime {}: {}", raw, e))
                .ok()
        });

        EventStart {
            local_date,
            local_time,
            date_time,
            date_tbd: self.date_tbd.unwrap_or(false),
            date_tba: self.date_tba.unwrap_or(false),
            time_tba: self.time_tba.unwrap_or(false),
            no_specific_time: self.no_specific_time.unwrap_or(false),
        }
    }
}

impl ClassificationDto {
    fn into_classification(self) -> Classification {
        Classification {
            primary: self.primary.unwrap_or(false),
            segment: self.segment.and_then(NamedDto::into_item),
            genre: self.genre.and_then(NamedDto::into_item),
            subgenre: self.sub_genre.and_then(NamedDto::into_item),
        }
    }
}

impl NamedDto {
    fn into_item(self) -> Option<ClassificationItem> {
        Some(ClassificationItem {
            id: non_blank(self.id)?,
            name: self.name.unwrap_or_default(),
        })
    }
}

impl PlaceDto {
    fn into_address(self) -> Address {
        Address {
            line1: self.address.and_then(|a| non_blank(a.line1)),
            city: self.city.and_then(|c| non_blank(c.name)),
            state: self.state.and_then(StateDto::into_name),
            postal_code: non_blank(self.postal_code),
            location: self.location.and_then(LocationDto::into_point),
        }
    }
}

impl StateDto {
    fn into_name(self) -> Option<String> {
        non_blank(self.name).or_else(|| non_blank(self.state_code))
    }
}

impl VenueDto {
    fn into_venue(self) -> Option<Venue> {
        let (general_rule, child_rule) = match self.general_info {
            Some(info) => (non_blank(info.general_rule), non_blank(info.child_rule)),
            None => (None, None),
        };
        Some(Venue {
            id: non_blank(self.id)?,
            name: non_blank(self.name),
            url: non_blank(self.url),
            description: non_blank(self.description),
            address: Address {
                line1: self.address.and_then(|a| non_blank(a.line1)),
                city: self.city.and_then(|c| non_blank(c.name)),
                state: self.state.and_then(StateDto::into_name),
                postal_code: non_blank(self.postal_code),
                location: self.location.and_then(LocationDto::into_point),
            },
            images: map_images(self.images),
            parking_detail: non_blank(self.parking_detail),
            general_rule,
            child_rule,
        })
    }
}

impl AttractionDto {
    fn into_attraction(self) -> Option<Attraction> {
        Some(Attraction {
            id: non_blank(self.id)?,
            name: non_blank(self.name),
            url: non_blank(self.url),
            images: map_images(self.images),
        })
    }
}

impl ClassificationsResponseDto {
    /// Segment → genre → subgenre catalog; entries without a segment are skipped.
    pub fn into_segments(self) -> Vec<Segment> {
        self.embedded
            .and_then(|e| e.classifications)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|entry| entry.segment)
            .filter_map(|segment| {
                let genres = segment
                    .embedded
                    .and_then(|e| e.genres)
                    .unwrap_or_default()
                    .into_iter()
                    .filter_map(|genre| {
                        let subgenres = genre
                            .embedded
                            .and_then(|e| e.subgenres)
                            .unwrap_or_default()
                            .into_iter()
                            .filter_map(|s| {
                                Some(Subgenre {
                                    id: non_blank(s.id)?,
                                    name: non_blank(s.name)?,
                                })
                            })
                            .collect();
                        Some(Genre {
                            id: non_blank(genre.id)?,
                            name: non_blank(genre.name)?,
                            subgenres,
                        })
                    })
                    .collect();
                Some(Segment {
                    id: non_blank(segment.id)?,
                    name: non_blank(segment.name)?,
                    genres,
                })
            })
            .collect()
    }
}

fn map_images(images: Option<Vec<ImageDto>>) -> Vec<EventImage> {
    images
        .unwrap_or_default()
        .into_iter()
        .filter_map(|image| {
            Some(EventImage {
                url: non_blank(image.url)?,
                width: image.width.unwrap_or(0),
                height: image.height.unwrap_or(0),
                ratio: non_blank(image.ratio),
                fallback: image.fallback.unwrap_or(false),
            })
        })
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?
        .filter(|n| n.is_finite() && *n >= 0.0)
        .map(|n| n as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_response() -> serde_json::Value {
        json!({
            "_embedded": {
                "events": [
                    {
                        "name": "Sleater-Kinney",
                        "id": "vvG1zZ9KbJ4X1b",
                        "url": "https://www.ticketmaster.com/event/vvG1zZ9KbJ4X1b",
                        "images": [
                            {"ratio": "16_9", "url": "https://s1.ticketm.net/a.jpg", "width": 640, "height": 360, "fallback": false},
                            {"ratio": "3_2", "url": "https://s1.ticketm.net/b.jpg", "width": 1024, "height": 683, "fallback": false}
                        ],
                        "dates": {
                            "start": {"localDate": "2025-11-08", "localTime": "20:00:00", "dateTime": "2025-11-09T04:00:00Z", "dateTBD": false, "dateTBA": false, "timeTBA": false, "noSpecificTime": false},
                            "timezone": "America/Los_Angeles",
                            "status": {"code": "onsale"},
                            "spanMultipleDays": false
                        },
                        "classifications": [
                            {"primary": true, "segment": {"id": "KZFzniwnSyZfZ7v7nJ", "name": "Music"}, "genre": {"id": "KnvZfZ7vAeA", "name": "Rock"}, "subGenre": {"id": "KZazBEonSMnZfZ7v6F1", "name": "Pop"}}
                        ],
                        "priceRanges": [{"type": "standard", "currency": "USD", "min": 45.0, "max": 89.5}],
                        "_embedded": {
                            "venues": [
                                {
                                    "name": "Paramount Theatre",
                                    "id": "KovZpZAEAl6A",
                                    "city": {"name": "Seattle"},
                                    "state": {"name": "Washington", "stateCode": "WA"},
                                    "address": {"line1": "911 Pine St"},
                                    "location": {"longitude": "-122.331703", "latitude": "47.613402"},
                                    "generalInfo": {"generalRule": "No outside food", "childRule": "All ages"}
                                }
                            ],
                            "attractions": [{"name": "Sleater-Kinney", "id": "K8vZ9171oZ7"}]
                        }
                    },
                    {"name": "Missing id"}
                ]
            },
            "page": {"size": 20, "totalElements": 41, "totalPages": 3, "number": 0}
        })
    }

    #[test]
    fn test_search_response_maps_to_events() {
        let dto: SearchResponseDto = serde_json::from_value(sample_response()).unwrap();
        let page = dto.into_page();

        assert_eq!(page.total_pages, Some(3));
        assert_eq!(page.events.len(), 1);

        let event = &page.events[0];
        assert_eq!(event.id, "vvG1zZ9KbJ4X1b");
        assert_eq!(event.name, "Sleater-Kinney");
        assert!(!event.saved);
        assert_eq!(event.images.len(), 2);
        assert_eq!(event.images[0].ratio.as_deref(), Some("16_9"));
        assert_eq!(event.price_ranges[0].max, Some(89.5));

        let classification = event.primary_classification().unwrap();
        assert_eq!(classification.segment.as_ref().unwrap().name, "Music");
        assert_eq!(classification.subgenre.as_ref().unwrap().id, "KZazBEonSMnZfZ7v6F1");

        let start = event.dates.as_ref().unwrap().start.as_ref().unwrap();
        assert_eq!(start.local_date, NaiveDate::from_ymd_opt(2025, 11, 8));
        assert_eq!(start.local_time, NaiveTime::from_hms_opt(20, 0, 0));
        assert!(start.date_time.is_some());

        let venue = &event.venues[0];
        assert_eq!(venue.address.state.as_deref(), Some("Washington"));
        assert_eq!(venue.general_rule.as_deref(), Some("No outside food"));
        assert_eq!(
            event.coordinates(),
            Some(GeoPoint::new(47.613402, -122.331703))
        );
        assert_eq!(event.attractions[0].name.as_deref(), Some("Sleater-Kinney"));
    }

    #[test]
    fn test_response_without_embedded_is_empty_page() {
        let dto: SearchResponseDto = serde_json::from_value(json!({
            "page": {"size": 20, "totalElements": 0, "totalPages": 0, "number": 0}
        }))
        .unwrap();
        let page = dto.into_page();
        assert!(page.events.is_empty());
        assert_eq!(page.total_pages, Some(0));
    }

    #[test]
    fn test_partial_dates_are_kept() {
        let dto: EventDto = serde_json::from_value(json!({
            "id": "x",
            "dates": {"start": {"localDate": "2025-12-31", "noSpecificTime": true}}
        }))
        .unwrap();
        let event = dto.into_event().unwrap();
        let start = event.dates.unwrap().start.unwrap();
        assert!(start.local_time.is_none());
        assert!(start.no_specific_time);
        assert_eq!(start.local_date, NaiveDate::from_ymd_opt(2025, 12, 31));
    }

    #[test]
    fn test_classifications_catalog() {
        let dto: ClassificationsResponseDto = serde_json::from_value(json!({
            "_embedded": {
                "classifications": [
                    {"type": {"id": "KZAyXgnZfZ7v7l1", "name": "Group"}},
                    {
                        "segment": {
                            "id": "KZFzniwnSyZfZ7v7nJ",
                            "name": "Music",
                            "_embedded": {
                                "genres": [
                                    {"id": "KnvZfZ7vAeA", "name": "Rock", "_embedded": {"subgenres": [
                                        {"id": "KZazBEonSMnZfZ7v6F1", "name": "Pop"},
                                        {"id": "KZazBEonSMnZfZ7v6dt", "name": "Alternative Rock"}
                                    ]}}
                                ]
                            }
                        }
                    }
                ]
            }
        }))
        .unwrap();

        let segments = dto.into_segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].name, "Music");
        assert_eq!(segments[0].genres[0].subgenres.len(), 2);
        assert!(segments[0].subgenre_by_name("Alternative Rock").is_some());
    }

    #[test]
    fn test_fault_message_extraction() {
        let fault: ApiFaultDto = serde_json::from_value(json!({
            "fault": {"faultstring": "Invalid ApiKey", "detail": {"errorcode": "oauth.v2.InvalidApiKey"}}
        }))
        .unwrap();
        assert_eq!(fault.message().as_deref(), Some("Invalid ApiKey"));

        let errors: ApiFaultDto = serde_json::from_value(json!({
            "errors": [{"code": "DIS1004", "detail": "Resource not found with provided criteria", "status": "404"}]
        }))
        .unwrap();
        assert_eq!(
            errors.message().as_deref(),
            Some("Resource not found with provided criteria")
        );
    }
}
