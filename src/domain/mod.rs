//! Domain data shapes shared across layers

pub mod event;
pub mod filter;
pub mod resource;

pub use event::{
    Address, Attraction, Classification, ClassificationItem, Event, EventDates, EventImage,
    EventStart, GeoPoint, PriceRange, Venue,
};
pub use filter::{
    DistanceUnit, FilterPreferences, Genre, LocationPreference, Segment, SortOption, SortType,
    Subgenre,
};
pub use resource::{PaginationState, Resource};
