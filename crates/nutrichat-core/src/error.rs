use reqwest::StatusCode;
use thiserror::Error;

/// Failures talking to the nutrition backend
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error! status: {0}")]
    Status(StatusCode),

    #[error("invalid JSON response from server: {0}")]
    MalformedBody(#[source] serde_json::Error),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message() {
        let err = TransportError::Status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "HTTP error! status: 500 Internal Server Error");
    }

    #[test]
    fn test_malformed_body_message() {
        let parse_err = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        let err = TransportError::MalformedBody(parse_err);
        assert!(err.to_string().starts_with("invalid JSON response from server"));
    }
}
