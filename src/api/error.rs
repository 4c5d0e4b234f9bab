//! Errors returned by the sales API client.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Cannot connect to the sales API at {url}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {endpoint} timed out after {timeout:?}")]
    Timeout { endpoint: String, timeout: Duration },

    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API error {status} from {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Well-formed response with `success: false`.
    #[error("{0}")]
    Application(String),

    #[error("Failed to parse response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// Transport-level failure: the server was never heard from.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::Connect { .. } | ApiError::Timeout { .. } | ApiError::Transport { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ApiError::Status {
            endpoint: "/api/stores".to_string(),
            status: 502,
            body: "Bad Gateway".to_string(),
        };
        assert_eq!(err.to_string(), "API error 502 from /api/stores: Bad Gateway");
        assert!(!err.is_transport());

        let err = ApiError::Timeout {
            endpoint: "/api/orders".to_string(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "Request to /api/orders timed out after 30s");
        assert!(err.is_transport());

        assert_eq!(
            ApiError::Application("Database unavailable".to_string()).to_string(),
            "Database unavailable"
        );
    }
}
