//! Restaurant API client.

use std::time::Duration;

use clap::Args;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

mod errors;

pub use errors::ApiError;

const UNAUTHORIZED_FALLBACK: &str = "Credenciales inválidas";

/// API connection settings.
#[derive(Debug, Clone, Args)]
pub struct ApiConfig {
    /// Base URL of the restaurant API
    #[arg(long, env = "SANISIDRO_API_URL", default_value = "http://localhost:8080/api")]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "SANISIDRO_API_TIMEOUT", default_value_t = 15u64)]
    pub timeout_secs: u64,
}

/// HTTP client bound to the API base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    http: Client,
}

impl ApiClient {
    /// Create a client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is malformed or the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let base = Url::parse(&config.api_url)
            .map_err(|error| ApiError::InvalidBaseUrl(format!("{}: {error}", config.api_url)))?;

        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(config.api_url.clone()));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { base, http })
    }

    /// Build the URL for `segments` below the base URL, percent-encoding each one.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidBaseUrl`] if the base URL cannot take path segments.
    pub fn url<I>(&self, segments: I) -> Result<Url, ApiError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut url = self.base.clone();

        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// `GET` a JSON resource.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status or an undecodable body.
    pub async fn get<T, I>(&self, segments: I) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let url = self.url(segments)?;

        Self::send(self.http.get(url)).await
    }

    /// `POST` a JSON body and decode the JSON answer.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status or an undecodable body.
    pub async fn post<B, T, I>(&self, segments: I, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let url = self.url(segments)?;

        Self::send(self.http.post(url).json(body)).await
    }

    /// `PUT` a JSON body and decode the JSON answer.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status or an undecodable body.
    pub async fn put<B, T, I>(&self, segments: I, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let url = self.url(segments)?;

        Self::send(self.http.put(url).json(body)).await
    }

    /// `DELETE` a resource, ignoring any body.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or a non-2xx status.
    pub async fn delete<I>(&self, segments: I) -> Result<(), ApiError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let url = self.url(segments)?;
        let response = Self::checked(self.http.delete(url)).await?;

        debug!(status = %response.status(), "api.delete");

        Ok(())
    }

    async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ApiError> {
        let response = Self::checked(request).await?;

        Ok(response.json().await?)
    }

    async fn checked(request: RequestBuilder) -> Result<reqwest::Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        debug!(%status, url = %response.url(), "api.response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();

        Err(match status {
            StatusCode::NOT_FOUND => ApiError::NotFound,
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(
                error_message(&body).unwrap_or_else(|| UNAUTHORIZED_FALLBACK.to_string()),
            ),
            _ => ApiError::UnexpectedResponse { status, body },
        })
    }
}

/// Pull a human-readable message out of an error body.
///
/// The API answers errors either as plain text or as an object carrying the text under
/// `message`, `mensaje` or `error`.
fn error_message(body: &str) -> Option<String> {
    let body = body.trim();

    if body.is_empty() {
        return None;
    }

    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(fields)) => ["message", "mensaje", "error"]
            .iter()
            .find_map(|key| fields.get(*key).and_then(Value::as_str))
            .map(ToString::to_string),
        Ok(Value::String(text)) => Some(text),
        _ => Some(body.to_string()),
    }
}
