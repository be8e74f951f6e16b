pub mod apis;
pub mod app;
pub mod config;
pub mod constants;
pub mod controllers;
pub mod error;
pub mod infra;
pub mod logging;
pub mod observability;

// Domain data shapes shared across layers
pub mod domain;

pub use error::{LineupError, Result};
