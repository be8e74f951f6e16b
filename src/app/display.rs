//! Pure formatting helpers for event cards and detail views.

use crate::app::geo;
use crate::constants::{FREE_TEXT, NO_DISTANCE_TEXT, NO_LOCATION_TEXT, NO_START_DATE_TEXT};
use crate::domain::{DistanceUnit, Event, EventDates, EventImage, GeoPoint, PriceRange};

/// Pick the image URL for `ratio` that best fits `min_width`.
///
/// Prefers the narrowest image at least `min_width` wide; otherwise the widest one
/// with that ratio. Falls back to the widest image of any ratio when none match.
pub fn image_url(images: &[EventImage], ratio: &str, min_width: u32) -> Option<String> {
    let matching: Vec<&EventImage> = images
        .iter()
        .filter(|image| image.ratio.as_deref() == Some(ratio))
        .collect();

    let pick = matching
        .iter()
        .filter(|image| image.width >= min_width)
        .min_by_key(|image| image.width)
        .or_else(|| matching.iter().max_by_key(|image| image.width))
        .copied()
        .or_else(|| images.iter().max_by_key(|image| image.width));

    pick.map(|image| image.url.clone())
}

/// Start date for display, with a fixed fallback when nothing usable is known.
///
/// Formats: `Sat, Nov 8, 2025 · 8:00 PM`, `Sat, Nov 8, 2025` (date only, or time TBA),
/// `Date TBA` / `Date TBD` when the API says so.
pub fn format_start_date(dates: Option<&EventDates>) -> String {
    let Some(start) = dates.and_then(|d| d.start.as_ref()) else {
        return NO_START_DATE_TEXT.to_string();
    };

    match start.local_date {
        Some(date) => {
            let day = date.format("%a, %b %-d, %Y").to_string();
            match start.local_time {
                Some(time) if !start.time_tba && !start.no_specific_time => {
                    format!("{} · {}", day, time.format("%-I:%M %p"))
                }
                _ => day,
            }
        }
        None if start.date_tba => "Date TBA".to_string(),
        None if start.date_tbd => "Date TBD".to_string(),
        None => NO_START_DATE_TEXT.to_string(),
    }
}

/// Distance between the user and the event, e.g. `12.3 mi`.
pub fn format_distance(
    from: Option<GeoPoint>,
    to: Option<GeoPoint>,
    unit: DistanceUnit,
) -> String {
    match (from, to) {
        (Some(from), Some(to)) => {
            format!("{:.1} {}", geo::distance(from, to, unit), unit.suffix())
        }
        _ => NO_DISTANCE_TEXT.to_string(),
    }
}

/// First price range for display; `None` when the range is incomplete.
pub fn format_price_range(ranges: &[PriceRange]) -> Option<String> {
    let range = ranges.first()?;
    let (min, max) = (range.min?, range.max?);
    let (start, end) = (min as i64, max as i64);

    match range.currency.as_deref() {
        None | Some("USD") => {
            if start > 0 {
                Some(format!("${start} - ${end}"))
            } else {
                Some(FREE_TEXT.to_string())
            }
        }
        Some(currency) => Some(format!("{start} {currency} - {end} {currency}")),
    }
}

/// `line, city, state` from the place, else the first venue.
pub fn format_address(event: &Event) -> String {
    let complete = |line: &Option<String>, city: &Option<String>, state: &Option<String>| {
        match (line, city, state) {
            (Some(line), Some(city), Some(state)) => Some(format!("{line}, {city}, {state}")),
            _ => None,
        }
    };

    event
        .place
        .as_ref()
        .and_then(|place| complete(&place.line1, &place.city, &place.state))
        .or_else(|| {
            event.venues.first().and_then(|venue| {
                complete(&venue.address.line1, &venue.address.city, &venue.address.state)
            })
        })
        .unwrap_or_else(|| NO_LOCATION_TEXT.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Address, EventStart, Venue};
    use chrono::{NaiveDate, NaiveTime};

    fn image(width: u32, ratio: &str) -> EventImage {
        EventImage {
            url: format!("https://img/{ratio}/{width}.jpg"),
            width,
            height: 0,
            ratio: Some(ratio.to_string()),
            fallback: false,
        }
    }

    #[test]
    fn test_image_prefers_smallest_meeting_min_width() {
        let images = vec![image(640, "16_9"), image(1920, "16_9")];
        assert_eq!(
            image_url(&images, "16_9", 1080).as_deref(),
            Some("https://img/16_9/1920.jpg")
        );

        let images = vec![image(2048, "16_9"), image(1136, "16_9"), image(640, "16_9")];
        assert_eq!(
            image_url(&images, "16_9", 1080).as_deref(),
            Some("https://img/16_9/1136.jpg")
        );
    }

    #[test]
    fn test_image_falls_back_to_largest_for_ratio() {
        let images = vec![image(305, "16_9"), image(640, "16_9"), image(2048, "3_2")];
        assert_eq!(
            image_url(&images, "16_9", 1080).as_deref(),
            Some("https://img/16_9/640.jpg")
        );
    }

    #[test]
    fn test_image_other_ratio_when_requested_missing() {
        let images = vec![image(305, "4_3"), image(1024, "3_2")];
        assert_eq!(
            image_url(&images, "16_9", 1080).as_deref(),
            Some("https://img/3_2/1024.jpg")
        );
        assert_eq!(image_url(&[], "16_9", 1080), None);
    }

    fn dates(date: Option<NaiveDate>, time: Option<NaiveTime>) -> EventDates {
        EventDates {
            start: Some(EventStart {
                local_date: date,
                local_time: time,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_format_start_date_variants() {
        let full = dates(NaiveDate::from_ymd_opt(2025, 11, 8), NaiveTime::from_hms_opt(20, 0, 0));
        assert_eq!(format_start_date(Some(&full)), "Sat, Nov 8, 2025 · 8:00 PM");

        let date_only = dates(NaiveDate::from_ymd_opt(2025, 11, 8), None);
        assert_eq!(format_start_date(Some(&date_only)), "Sat, Nov 8, 2025");

        let mut tba = dates(None, None);
        tba.start.as_mut().unwrap().date_tba = true;
        assert_eq!(format_start_date(Some(&tba)), "Date TBA");

        assert_eq!(format_start_date(Some(&dates(None, None))), NO_START_DATE_TEXT);
        assert_eq!(format_start_date(None), NO_START_DATE_TEXT);
    }

    #[test]
    fn test_format_distance() {
        let seattle = GeoPoint::new(47.6062, -122.3321);
        let tacoma = GeoPoint::new(47.2529, -122.4443);
        let text = format_distance(Some(seattle), Some(tacoma), DistanceUnit::Miles);
        assert!(text.ends_with(" mi"));
        assert!(format_distance(Some(seattle), Some(tacoma), DistanceUnit::Kilometers).ends_with(" km"));
        assert_eq!(format_distance(None, Some(tacoma), DistanceUnit::Miles), NO_DISTANCE_TEXT);
    }

    #[test]
    fn test_format_price_range() {
        let usd = PriceRange { min: Some(45.0), max: Some(89.5), currency: Some("USD".into()) };
        assert_eq!(format_price_range(&[usd]).as_deref(), Some("$45 - $89"));

        let free = PriceRange { min: Some(0.0), max: Some(0.0), currency: None };
        assert_eq!(format_price_range(&[free]).as_deref(), Some(FREE_TEXT));

        let cad = PriceRange { min: Some(30.0), max: Some(60.0), currency: Some("CAD".into()) };
        assert_eq!(format_price_range(&[cad]).as_deref(), Some("30 CAD - 60 CAD"));

        let partial = PriceRange { min: Some(30.0), max: None, currency: None };
        assert_eq!(format_price_range(&[partial]), None);
        assert_eq!(format_price_range(&[]), None);
    }

    #[test]
    fn test_format_address_fallbacks() {
        let mut event = Event::default();
        assert_eq!(format_address(&event), NO_LOCATION_TEXT);

        event.venues.push(Venue {
            id: "v".to_string(),
            address: Address {
                line1: Some("911 Pine St".into()),
                city: Some("Seattle".into()),
                state: Some("Washington".into()),
                ..Default::default()
            },
            ..Default::default()
        });
        assert_eq!(format_address(&event), "911 Pine St, Seattle, Washington");

        // An incomplete place does not hide the venue address
        event.place = Some(Address { city: Some("Tacoma".into()), ..Default::default() });
        assert_eq!(format_address(&event), "911 Pine St, Seattle, Washington");
    }
}
