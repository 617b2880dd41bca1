use crate::error::truncate_chars;
use crate::{Error, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Url};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

pub(crate) const GOOGLE_API_HOST: &str = "generativelanguage.googleapis.com";

/// Provider error bodies are cut to this many characters before logging or
/// returning them to callers.
const DETAIL_MAX_CHARS: usize = 700;

/// Lightweight `generateContent` REST client shared by the image and text
/// clients.
pub struct GeminiHttpClient {
    pub(crate) client: Client,
    provider: &'static str,
    url: String,
    headers: HeaderMap,
    timeout: Duration,
}

impl GeminiHttpClient {
    pub fn new_with_client(
        provider: &'static str,
        url: String,
        mut headers: HeaderMap,
        timeout: Duration,
        client: Client,
    ) -> Self {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Self {
            client,
            provider,
            url,
            headers,
            timeout,
        }
    }

    pub fn provider(&self) -> &'static str {
        self.provider
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// POST a request and return the JSON body.
    ///
    /// A non-success status becomes [`Error::ProviderStatus`] carrying the
    /// (truncated) response text.
    pub async fn generate_content<Req: Serialize>(&self, request: &Req) -> Result<Value> {
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to {}: {}", self.provider, e);
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let detail = truncate_chars(&detail, DETAIL_MAX_CHARS);
            tracing::error!(
                "{} API error (status {}): {}",
                self.provider,
                status,
                detail
            );
            return Err(Error::ProviderStatus {
                provider: self.provider.to_string(),
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                "Failed to parse {} response: {}\nBody: {}",
                self.provider,
                e,
                truncate_chars(&body, DETAIL_MAX_CHARS)
            );
            Error::Serialization(e)
        })
    }
}

/// Append `key=<api_key>` to Google endpoints that do not carry one yet.
pub fn with_api_key_query_if_google(url: &str, api_key: Option<&str>) -> Result<String> {
    let Some(api_key) = api_key.filter(|k| !k.is_empty()) else {
        return Ok(url.to_string());
    };
    if !url.contains(GOOGLE_API_HOST) || url.contains("key=") {
        return Ok(url.to_string());
    }
    with_api_key_query(url, api_key)
}

/// Append `key=<api_key>` as a query parameter.
pub fn with_api_key_query(url: &str, api_key: &str) -> Result<String> {
    let mut parsed = Url::parse(url)
        .map_err(|e| Error::Config(format!("Invalid provider URL '{}': {}", url, e)))?;
    parsed.query_pairs_mut().append_pair("key", api_key);
    Ok(parsed.into())
}
