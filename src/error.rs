// Error taxonomy for the flight search core. Transport failures are typed so
// the UI boundary can pick a user-facing message per category; normalization
// failures stay local to the offer that caused them.

use thiserror::Error;

/// Categorized failure from the third-party flight API. Never retried here;
/// retry policy, if any, belongs to the caller.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: check your search parameters")]
    BadRequest,

    #[error("Unauthorized: check your API key")]
    Unauthorized,

    #[error("Forbidden: API key may not have required permissions")]
    Forbidden,

    #[error("Rate limit exceeded: try again later")]
    RateLimited,

    #[error("Request timed out after {0}ms")]
    Timeout(u64),

    #[error("Server error: {status}")]
    Server { status: u16 },

    #[error("Unexpected status {status}: {message}")]
    Unexpected { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Failed to decode response body: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Map an HTTP status to its category. Statuses without a dedicated
    /// category become `Unexpected`.
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            400 => ApiError::BadRequest,
            401 => ApiError::Unauthorized,
            403 => ApiError::Forbidden,
            429 => ApiError::RateLimited,
            s if s >= 500 => ApiError::Server { status: s },
            s => ApiError::Unexpected {
                status: s,
                message: message.into(),
            },
        }
    }
}

/// Raised only when a raw object cannot be identified as a flight offer at
/// all. Missing or malformed optional fields fall back to defaults instead.
#[derive(Error, Debug, PartialEq)]
pub enum NormalizeError {
    #[error("object has no resolvable price or route information")]
    Unrecognized,

    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
}
