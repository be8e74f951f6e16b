// Observability: metrics counters (logging setup lives in crate::logging)

pub mod metrics;
