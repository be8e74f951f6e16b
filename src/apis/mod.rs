pub mod dto;
pub mod query;

pub use dto::EventPage;
pub use query::EventQuery;
