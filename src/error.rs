//! Error types for fetching and exporting end-of-life data.
//!
//! Configuration errors live with the configuration loader in
//! [`crate::config`]; everything that can go wrong after startup is here.

use std::fmt;

/// Error type for a failed product fetch.
///
/// Any of these aborts the whole registration pass: there is no per-product
/// isolation, a failing product stops the remaining ones.
#[derive(Debug)]
pub enum FetchError {
    /// The configured base URL is not a valid URL
    InvalidBaseUrl {
        /// The offending base URL
        url: String,
        /// The underlying parse error
        source: url::ParseError,
    },

    /// The request could not be sent or the connection failed
    Transport {
        /// The URL that was being fetched
        url: String,
        /// The underlying client error
        source: reqwest::Error,
    },

    /// The upstream API answered with a non-success status
    UnexpectedStatus {
        /// The URL that was being fetched
        url: String,
        /// The HTTP status code received
        status: u16,
    },

    /// The response body was not valid JSON or did not match the record schema
    Decode {
        /// The URL that was being fetched
        url: String,
        /// The underlying deserialization error
        source: serde_json::Error,
    },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBaseUrl { url, source } => {
                write!(f, "Invalid base URL '{}': {}", url, source)
            }
            Self::Transport { url, source } => {
                write!(
                    f,
                    "Failed to fetch {}: {}. Verify the upstream API is reachable from this host.",
                    url, source
                )
            }
            Self::UnexpectedStatus { url, status } => {
                write!(f, "Received non-success response code {} from {}", status, url)
            }
            Self::Decode { url, source } => {
                write!(f, "Failed to decode response from {}: {}", url, source)
            }
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidBaseUrl { source, .. } => Some(source),
            Self::Transport { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            Self::UnexpectedStatus { .. } => None,
        }
    }
}

/// Top-level error returned by the exporter pipeline.
#[derive(Debug)]
pub enum ExporterError {
    /// Fetching EOL data for a product failed during the registration pass
    Fetch {
        /// The underlying fetch error
        source: FetchError,
    },

    /// The metrics HTTP server could not be started
    Server {
        /// Why the server failed
        reason: String,
    },
}

impl fmt::Display for ExporterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch { source } => write!(f, "Error fetching EOL data: {}", source),
            Self::Server { reason } => write!(f, "Metrics server failed: {}", reason),
        }
    }
}

impl std::error::Error for ExporterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch { source } => Some(source),
            Self::Server { .. } => None,
        }
    }
}

impl From<FetchError> for ExporterError {
    fn from(source: FetchError) -> Self {
        Self::Fetch { source }
    }
}
