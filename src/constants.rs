/// Constants shared by the controllers, the API adapter and the display helpers

// External events API
pub const DEFAULT_API_BASE_URL: &str = "https://app.ticketmaster.com/discovery/v2";

// Page sizes
pub const DISCOVER_PAGE_SIZE: u32 = 20;
pub const EVENT_LIST_PAGE_SIZE: u32 = 20;

// Discover categories
pub const EVENTS_NEAR_YOU_RADIUS: &str = "50";
pub const SORT_DISTANCE_ASC: &str = "distance,asc";
pub const MUSIC_SEGMENT_NAME: &str = "Music";
pub const SPORTS_SEGMENT_NAME: &str = "Sports";
pub const ARTS_SEGMENT_NAME: &str = "Arts & Theatre";

// Wire date-time format expected by the API
pub const API_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

// Image selection defaults
pub const DEFAULT_IMAGE_RATIO: &str = "16_9";
pub const DEFAULT_MIN_IMAGE_WIDTH: u32 = 1080;

// Display fallbacks
pub const NO_START_DATE_TEXT: &str = "No Start Date Provided";
pub const NO_DISTANCE_TEXT: &str = "No Distance Provided";
pub const NO_LOCATION_TEXT: &str = "Location not provided";
pub const FREE_TEXT: &str = "Free";

// Search history
pub const SEARCH_HISTORY_LIMIT: usize = 10;

// Geohash precision used for the geoPoint parameter
pub const GEOHASH_PRECISION: usize = 9;
