//! Error types and handling for geocomplete.
//!
//! Every variant describes a failure talking to the geocoding provider or
//! setting it up. Soft conditions met while normalizing a suggestion are not
//! errors; see [`crate::normalizer::NormalizationWarning`].

/// Result type alias for geocomplete operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for geocoding operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request could not be sent or the connection failed
    #[error("Transport error: {message}")]
    Transport {
        /// Error message from the transport
        message: String,
    },

    /// The provider answered with a non-success status
    #[error("Provider returned HTTP {status} for {url}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Request URL with the access token redacted
        url: String,
    },

    /// The response body was not the JSON shape we expect
    #[error("Invalid provider response: {message}")]
    InvalidResponse {
        /// Error message
        message: String,
    },

    /// The provider base URL is not usable
    #[error("Invalid URL: {message}")]
    InvalidUrl {
        /// Error message
        message: String,
    },

    /// Configuration is missing or unusable
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a new transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new HTTP status error
    pub fn http_status(status: u16, url: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
        }
    }

    /// Create a new invalid response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create a new invalid URL error
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::http_status(401, "https://example.test/paris.json");
        assert_eq!(
            err.to_string(),
            "Provider returned HTTP 401 for https://example.test/paris.json"
        );

        let err = Error::transport("connection reset");
        assert_eq!(err.to_string(), "Transport error: connection reset");
    }
}
