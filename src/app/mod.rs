pub mod display;
pub mod geo;
pub mod get_events_use_case;
pub mod ports;
pub mod preferences;
pub mod update_filter_preference_use_case;

pub use get_events_use_case::GetEventsUseCase;
pub use preferences::PreferencesStore;
pub use update_filter_preference_use_case::{
    FilterRemoval, FilterUpdate, UpdateFilterPreferenceUseCase,
};
