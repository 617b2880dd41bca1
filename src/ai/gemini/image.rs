use super::client::{with_api_key_query_if_google, GeminiHttpClient, GOOGLE_API_HOST};
use super::types::{Content, GenerateContentRequest, GenerationConfig, InlineData, Part};
use crate::ai::{ImageGenerationService, ImageRequest};
use crate::models::ImageProviderConfig;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use std::time::Duration;

pub const IMAGE_PROVIDER_NAME: &str = "nanobananapro";

const INPUT_IMAGE_REJECTED: &str = "unable to process input image";

/// Client for the Gemini-compatible image endpoint.
pub struct GeminiImageClient {
    http: GeminiHttpClient,
}

impl GeminiImageClient {
    /// `fallback_api_key` is used for the `key=` query on Google endpoints
    /// when the image provider has no key of its own.
    pub fn new_with_client(
        config: &ImageProviderConfig,
        endpoint: &str,
        fallback_api_key: Option<&str>,
        client: reqwest::Client,
    ) -> Result<Self> {
        let query_key = config.api_key.as_deref().or(fallback_api_key);
        let url = with_api_key_query_if_google(endpoint, query_key)?;
        let headers = build_headers(config, url.contains(GOOGLE_API_HOST))?;

        Ok(Self {
            http: GeminiHttpClient::new_with_client(
                IMAGE_PROVIDER_NAME,
                url,
                headers,
                Duration::from_secs(120),
                client,
            ),
        })
    }

    fn build_request(request: &ImageRequest, include_image: bool) -> GenerateContentRequest {
        let prompt_part = Part::Text {
            text: request.prompt.clone(),
        };

        // Image editing endpoints expect the reference image before the
        // instruction.
        let parts = match request.input_image.as_ref().filter(|_| include_image) {
            Some(image) => vec![
                Part::InlineData {
                    inline_data: InlineData::from(image),
                },
                prompt_part,
            ],
            None => vec![prompt_part],
        };

        GenerateContentRequest {
            system_instruction: None,
            contents: vec![Content::user(parts)],
            generation_config: GenerationConfig {
                temperature: None,
                response_mime_type: None,
                response_modalities: Some(vec!["IMAGE".to_string(), "TEXT".to_string()]),
            },
        }
    }
}

fn build_headers(config: &ImageProviderConfig, google_endpoint: bool) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    if let Some(api_key) = config.api_key.as_deref() {
        // Google endpoints authenticate through the query string.
        if !google_endpoint {
            let value = if config.auth_scheme.is_empty() {
                api_key.to_string()
            } else {
                format!("{} {}", config.auth_scheme, api_key)
                    .trim()
                    .to_string()
            };
            insert_header(&mut headers, &config.auth_header, &value)?;
        }
    }

    for (name, value) in &config.extra_headers {
        // Google endpoints never carry the auth header, even from extras.
        if google_endpoint && name.eq_ignore_ascii_case(&config.auth_header) {
            continue;
        }
        insert_header(&mut headers, name, value)?;
    }

    Ok(headers)
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    let name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| Error::Config(format!("Invalid header name '{}': {}", name, e)))?;
    let value = HeaderValue::from_str(value)
        .map_err(|e| Error::Config(format!("Invalid value for header '{}': {}", name, e)))?;
    headers.insert(name, value);
    Ok(())
}

/// Whether the provider refused the reference photo rather than the request.
fn rejects_input_image(status: u16, detail: &str) -> bool {
    status == 400 && detail.to_lowercase().contains(INPUT_IMAGE_REJECTED)
}

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate_image(&self, request: &ImageRequest) -> Result<Value> {
        let body = Self::build_request(request, true);

        match self.http.generate_content(&body).await {
            Err(Error::ProviderStatus { status, detail, .. })
                if request.input_image.is_some() && rejects_input_image(status, &detail) =>
            {
                tracing::warn!(
                    "{} rejected the input image, retrying without it",
                    self.http.provider()
                );
                let prompt_only = Self::build_request(request, false);
                self.http.generate_content(&prompt_only).await
            }
            other => other,
        }
    }
}
