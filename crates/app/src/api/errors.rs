//! API client errors.

use reqwest::StatusCode;
use sanisidro::promotions::PromotionRecordError;
use thiserror::Error;

/// Errors that can occur when talking to the restaurant API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured base URL cannot have paths appended to it.
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// An HTTP transport or body decoding error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The resource does not exist.
    #[error("not found")]
    NotFound,

    /// The API refused the credentials.
    #[error("{0}")]
    Unauthorized(String),

    /// The API answered with an unexpected status.
    #[error("unexpected response from API ({status}): {body}")]
    UnexpectedResponse {
        /// Response status
        status: StatusCode,

        /// Response body, as text
        body: String,
    },

    /// A promotion from the API could not be understood.
    #[error("invalid promotion from API: {0}")]
    Promotion(#[from] PromotionRecordError),
}

impl ApiError {
    /// Returns `true` for [`ApiError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
