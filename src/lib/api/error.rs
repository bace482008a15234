//! Error types of the API client.

use thiserror::Error;

/// Errors that can occur while talking to the scheduling backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never completed
    #[error("Network error: {message}")]
    Network { message: String },

    /// Backend answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Backend answered 401; the session has already been reset
    #[error("Authentication required: {body}")]
    Auth { body: String },

    /// Body did not match the expected shape
    #[error("Invalid response body: {message}")]
    Decode { message: String },

    /// Base URL or path could not be joined
    #[error("URL error: {message}")]
    Url { message: String },
}

impl ApiError {
    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Auth { .. } => Some(401),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode {
                message: err.to_string(),
            }
        } else {
            ApiError::Network {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::Url {
            message: err.to_string(),
        }
    }
}
