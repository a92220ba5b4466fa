//! HTTP Fetcher
//!
//! Performs authenticated JSON GET requests against the Tornium API.

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetch::Payload;

// == HTTP Fetcher ==
/// JSON client for `{base_url}/{endpoint}`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>, access_token: Option<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, access_token)
    }

    /// Uses a preconfigured `reqwest::Client` (proxy, timeouts, TLS).
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        access_token: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            access_token,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_base_url.clone(), config.api_access_token.clone())
    }

    /// Full URL for an endpoint path such as `user/1/stat`.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    // == Fetch ==
    /// GETs `endpoint` and classifies the JSON body.
    ///
    /// A body with an `error` field means the token was rejected and yields
    /// `Error::Unauthorized`. Bodies with a `code` field come back as
    /// `Payload::Failure` whatever the HTTP status.
    pub async fn fetch(&self, endpoint: &str) -> Result<Payload> {
        let url = self.url(endpoint);
        let mut request = self
            .client
            .get(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body: Value = response.json().await?;
        debug!(%url, %status, "fetched");

        if let Some(error) = body.get("error") {
            let description = body
                .get("error_description")
                .and_then(Value::as_str)
                .or_else(|| error.as_str())
                .unwrap_or("access token rejected")
                .to_owned();
            warn!(%url, %description, "authorization failed");
            return Err(Error::Unauthorized(description));
        }

        Ok(Payload::classify(body))
    }
}
