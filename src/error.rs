//! Error types for the links client.

use reqwest::StatusCode;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single request attempt below the HTTP status level.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The attempt did not finish before the per-call timeout.
    #[error("request timed out after {} ms", .0.as_millis())]
    Timeout(Duration),
    /// The HTTP stack failed to send the request or read the response.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Connection-level failure reported by a non-reqwest transport.
    #[error("connection failed: {0}")]
    Connection(String),
}

#[derive(Debug, Error)]
/// Error type for all client operations.
pub enum Error {
    /// No credential is configured.
    #[error("no API token configured")]
    MissingToken,
    /// The credential's expiry claim is in the past.
    #[error("API token has expired")]
    TokenExpired,
    /// The server rejected the credential (HTTP 401).
    #[error("authentication required")]
    AuthRequired,
    /// Every attempt failed at the transport level.
    #[error("network error after {attempts} attempt(s): {source}")]
    Network {
        attempts: u32,
        #[source]
        source: TransportError,
    },
    /// HTTP response returned a non-success status.
    #[error("request failed with status {status}: {message}")]
    Api { status: StatusCode, message: String },
    /// Underlying HTTP client construction error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// JSON encoding or decoding error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// Response body did not have the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
    /// A URL could not be built or parsed.
    #[error("invalid url: {0}")]
    Url(String),
    #[error("failed to read config file at {path:?}")]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file at {path:?}")]
    ParseConfig {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to write config file at {path:?}: {message}")]
    WriteConfig { path: PathBuf, message: String },
    /// Configuration values are out of range.
    #[error("{message}")]
    Validation { message: String },
}

impl Error {
    /// True for failures that mean "the user has to log in again".
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            Error::MissingToken | Error::TokenExpired | Error::AuthRequired
        )
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_classification() {
        assert!(Error::MissingToken.is_auth());
        assert!(Error::TokenExpired.is_auth());
        assert!(Error::AuthRequired.is_auth());
        assert!(!Error::Parse("x".into()).is_auth());
        assert!(!Error::Api {
            status: StatusCode::FORBIDDEN,
            message: "nope".into()
        }
        .is_auth());
    }

    #[test]
    fn network_error_names_attempts() {
        let err = Error::Network {
            attempts: 4,
            source: TransportError::Timeout(Duration::from_millis(5000)),
        };
        assert_eq!(
            err.to_string(),
            "network error after 4 attempt(s): request timed out after 5000 ms"
        );
    }
}
