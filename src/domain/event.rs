use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// One level of the segment/genre/subgenre hierarchy as attached to an event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationItem {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Classification {
    pub primary: bool,
    pub segment: Option<ClassificationItem>,
    pub genre: Option<ClassificationItem>,
    pub subgenre: Option<ClassificationItem>,
}

/// Possibly-partial start descriptor: date only, date and time, or nothing known yet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventStart {
    pub local_date: Option<NaiveDate>,
    pub local_time: Option<NaiveTime>,
    pub date_time: Option<DateTime<Utc>>,
    pub date_tbd: bool,
    pub date_tba: bool,
    pub time_tba: bool,
    pub no_specific_time: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventDates {
    pub start: Option<EventStart>,
    pub timezone: Option<String>,
    pub status: Option<String>,
    pub span_multiple_days: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EventImage {
    pub url: String,
    pub width: u32,
    pub height: u32,
    /// Aspect-ratio tag such as "16_9" or "3_2"
    pub ratio: Option<String>,
    pub fallback: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Address {
    pub line1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Venue {
    pub id: String,
    pub name: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
    pub address: Address,
    pub images: Vec<EventImage>,
    pub parking_detail: Option<String>,
    pub general_rule: Option<String>,
    pub child_rule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Attraction {
    pub id: String,
    pub name: Option<String>,
    pub url: Option<String>,
    pub images: Vec<EventImage>,
}

/// Normalized event listing.
///
/// `saved` is client-local: it mirrors membership in the saved-events store as of
/// the last reconciliation and is never read from the wire.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub description: Option<String>,
    pub additional_info: Option<String>,
    pub info: Option<String>,
    pub please_note: Option<String>,
    pub classifications: Vec<Classification>,
    pub dates: Option<EventDates>,
    pub images: Vec<EventImage>,
    pub price_ranges: Vec<PriceRange>,
    pub location: Option<GeoPoint>,
    /// Free-standing place, only present when the listing has no venue
    pub place: Option<Address>,
    pub venues: Vec<Venue>,
    pub attractions: Vec<Attraction>,
    #[serde(default)]
    pub saved: bool,
}

impl Event {
    /// Direct coordinates, else the first venue's.
    pub fn coordinates(&self) -> Option<GeoPoint> {
        self.location.or_else(|| {
            self.venues
                .iter()
                .find_map(|venue| venue.address.location)
        })
    }

    /// Place address, else the first venue's.
    pub fn address(&self) -> Option<&Address> {
        self.place
            .as_ref()
            .or_else(|| self.venues.first().map(|venue| &venue.address))
    }

    pub fn primary_classification(&self) -> Option<&Classification> {
        self.classifications
            .iter()
            .find(|c| c.primary)
            .or_else(|| self.classifications.first())
    }

    pub fn with_saved(&self, saved: bool) -> Self {
        Self {
            saved,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venue_at(lat: f64, lon: f64) -> Venue {
        Venue {
            id: "KovZpZA7AAEA".to_string(),
            address: Address {
                line1: Some("1 Main St".to_string()),
                city: Some("Seattle".to_string()),
                state: Some("Washington".to_string()),
                location: Some(GeoPoint::new(lat, lon)),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_coordinates_fall_back_to_venue() {
        let mut event = Event {
            id: "1".to_string(),
            venues: vec![venue_at(47.6, -122.3)],
            ..Default::default()
        };
        assert_eq!(event.coordinates(), Some(GeoPoint::new(47.6, -122.3)));

        event.location = Some(GeoPoint::new(1.0, 2.0));
        assert_eq!(event.coordinates(), Some(GeoPoint::new(1.0, 2.0)));
    }

    #[test]
    fn test_address_prefers_place() {
        let mut event = Event {
            venues: vec![venue_at(0.0, 0.0)],
            ..Default::default()
        };
        assert_eq!(
            event.address().and_then(|a| a.city.as_deref()),
            Some("Seattle")
        );

        event.place = Some(Address {
            city: Some("Tacoma".to_string()),
            ..Default::default()
        });
        assert_eq!(
            event.address().and_then(|a| a.city.as_deref()),
            Some("Tacoma")
        );
    }

    #[test]
    fn test_with_saved_only_touches_flag() {
        let event = Event {
            id: "abc".to_string(),
            name: "Show".to_string(),
            ..Default::default()
        };
        let saved = event.with_saved(true);
        assert!(saved.saved);
        assert_eq!(saved.with_saved(false), event);
    }
}
