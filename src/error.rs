use thiserror::Error;

#[derive(Error, Debug)]
pub enum LineupError {
    #[error("Network request failed: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response payload: {0}")]
    Mapping(String),

    #[error("Local storage error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for LineupError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LineupError::Mapping(err.to_string())
        } else if let Some(status) = err.status() {
            LineupError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            LineupError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LineupError {
    fn from(err: serde_json::Error) -> Self {
        LineupError::Mapping(err.to_string())
    }
}

impl From<rusqlite::Error> for LineupError {
    fn from(err: rusqlite::Error) -> Self {
        LineupError::Persistence(err.to_string())
    }
}

impl From<toml::de::Error> for LineupError {
    fn from(err: toml::de::Error) -> Self {
        LineupError::Config(err.to_string())
    }
}

impl From<std::io::Error> for LineupError {
    fn from(err: std::io::Error) -> Self {
        LineupError::Config(err.to_string())
    }
}

impl LineupError {
    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            LineupError::Network(_) => "network",
            LineupError::Api { .. } => "api",
            LineupError::Mapping(_) => "mapping",
            LineupError::Persistence(_) => "persistence",
            LineupError::Config(_) => "config",
        }
    }
}

pub type Result<T> = std::result::Result<T, LineupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_errors_are_mapping_failures() {
        let err: LineupError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), "mapping");
        assert!(err.to_string().starts_with("Unexpected response payload"));
    }

    #[test]
    fn test_api_error_message_includes_status() {
        let err = LineupError::Api {
            status: 401,
            message: "Invalid ApiKey".to_string(),
        };
        assert_eq!(err.to_string(), "API error (401): Invalid ApiKey");
    }
}
