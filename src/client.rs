//! HTTP client for the spreadsheet bridge.
//!
//! The bridge exposes the shared spreadsheet as named collections of
//! records: `GET /collections/{name}` returns every record of a
//! worksheet, `POST /collections/{name}/records` appends one row. This
//! client is deliberately thin; caching, retries, and degradation
//! live in [`crate::catalog`].

use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};

use crate::error::{FairPosError, Result};
use crate::models::Row;

/// Path prefix for collection endpoints.
const COLLECTIONS_PATH: &str = "/collections";

/// Wire shape of a collection read.
#[derive(Debug, serde::Deserialize)]
struct RecordsResponse {
    /// The collection's records, one map per spreadsheet row.
    records: Vec<Row>,
}

/// Builder for constructing a [`SheetsClient`].
#[derive(Debug, Default)]
pub struct SheetsClientBuilder {
    /// Bearer token for bridge authentication.
    token: Option<SecretString>,
    /// Base URL of the bridge.
    base_url: Option<String>,
}

impl SheetsClientBuilder {
    /// Sets the access token for bridge authentication.
    #[inline]
    #[must_use]
    pub fn token<T: Into<String>>(mut self, token: T) -> Self {
        self.token = Some(SecretString::from(token.into()));
        self
    }

    /// Sets the bridge base URL (point this at a mock server in tests).
    #[inline]
    #[must_use]
    pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`FairPosError::MissingConfig`] if the token or base URL
    /// was not provided, or [`FairPosError::Http`] if the HTTP client
    /// fails to build.
    #[inline]
    #[tracing::instrument(skip_all)]
    pub fn build(self) -> Result<SheetsClient> {
        let token = self.token.ok_or(FairPosError::MissingConfig("api token"))?;
        let base_url = self
            .base_url
            .ok_or(FairPosError::MissingConfig("base url"))?;
        tracing::debug!(base_url = %base_url, "building client");
        let http = reqwest::Client::builder().build()?;

        Ok(SheetsClient {
            http,
            token,
            base_url,
        })
    }
}

/// Client for the spreadsheet bridge.
///
/// Use [`SheetsClient::builder()`] to construct an instance.
#[derive(Debug)]
pub struct SheetsClient {
    /// Underlying HTTP client.
    http: reqwest::Client,
    /// Bearer access token.
    token: SecretString,
    /// Bridge base URL.
    base_url: String,
}

impl SheetsClient {
    /// Creates a new builder for configuring the client.
    #[inline]
    #[must_use]
    pub fn builder() -> SheetsClientBuilder {
        SheetsClientBuilder::default()
    }

    /// Fetches every record of the named collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails, the bridge returns a
    /// non-success status, or the response cannot be deserialized.
    #[tracing::instrument(skip_all, fields(collection = %collection))]
    pub async fn records(&self, collection: &str) -> Result<Vec<Row>> {
        let url = format!("{}{COLLECTIONS_PATH}/{collection}", self.base_url);
        tracing::trace!(url = %url, "sending GET request");
        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, self.bearer())
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");
        if status.is_success() {
            let body = response.text().await?;
            tracing::trace!(body_len = body.len(), "parsing response body");
            let parsed: RecordsResponse = serde_json::from_str(&body)?;
            Ok(parsed.records)
        } else {
            Err(read_api_error(response).await)
        }
    }

    /// Appends one record to the named collection as a new row.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request fails or the bridge returns
    /// a non-success status.
    #[tracing::instrument(skip_all, fields(collection = %collection))]
    pub async fn append_record(&self, collection: &str, record: &Row) -> Result<()> {
        let url = format!("{}{COLLECTIONS_PATH}/{collection}/records", self.base_url);
        tracing::trace!(url = %url, "sending POST request");
        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, self.bearer())
            .json(record)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!(status = %status, "received response");
        if status.is_success() {
            Ok(())
        } else {
            Err(read_api_error(response).await)
        }
    }

    /// Formats the bearer authorization header value.
    fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }
}

/// Converts a non-success response into an [`FairPosError::Api`],
/// reading as much of the body as possible for the message.
async fn read_api_error(response: reqwest::Response) -> FairPosError {
    let status = response.status();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_owned());
    tracing::debug!(status = status.as_u16(), message = %message, "API error");
    FairPosError::Api {
        status: status.as_u16(),
        message,
    }
}
