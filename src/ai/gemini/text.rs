use super::client::{with_api_key_query, GeminiHttpClient};
use super::types::{Content, GenerateContentRequest, GenerationConfig, Part};
use crate::ai::{TextGenerationService, TextRequest};
use crate::Result;
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::time::Duration;

pub const TEXT_PROVIDER_NAME: &str = "Gemini";

/// Gemini `generateContent` client asking for JSON output.
pub struct GeminiTextClient {
    http: GeminiHttpClient,
}

impl GeminiTextClient {
    pub fn new_with_client(endpoint: &str, api_key: &str, client: reqwest::Client) -> Result<Self> {
        Ok(Self {
            http: GeminiHttpClient::new_with_client(
                TEXT_PROVIDER_NAME,
                with_api_key_query(endpoint, api_key)?,
                HeaderMap::new(),
                Duration::from_secs(30),
                client,
            ),
        })
    }

    fn build_request(request: &TextRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            system_instruction: Some(Content::system(request.system.clone())),
            contents: vec![Content::user(vec![Part::Text {
                text: request.user.clone(),
            }])],
            generation_config: GenerationConfig {
                temperature: Some(request.temperature),
                response_mime_type: Some("application/json".to_string()),
                response_modalities: None,
            },
        }
    }
}

#[async_trait]
impl TextGenerationService for GeminiTextClient {
    async fn generate_content(&self, request: &TextRequest) -> Result<Value> {
        tracing::debug!("Sending structured text request to {}", self.http.provider());
        self.http
            .generate_content(&Self::build_request(request))
            .await
    }
}
