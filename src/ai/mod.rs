//! Generative-AI provider integration
//!
//! Transport clients for the image and text providers sit behind the service
//! traits below; `response` and `data_url` hold the pure normalization logic
//! applied to whatever those providers return.

pub mod data_url;
pub mod gemini;
pub mod mock;
pub mod response;

pub use data_url::DataUrl;
pub use gemini::{GeminiImageClient, GeminiTextClient};
pub use mock::{MockImageClient, MockTextClient};
pub use response::{extract_text, normalize_image_response};

use crate::Result;
use async_trait::async_trait;
use serde_json::Value;

/// One image-generation call: the full instruction plus an optional
/// reference photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub input_image: Option<DataUrl>,
}

/// One structured text-generation call expecting a JSON answer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest {
    pub system: String,
    pub user: String,
    pub temperature: f64,
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Returns the provider's raw JSON response.
    async fn generate_image(&self, request: &ImageRequest) -> Result<Value>;
}

#[async_trait]
pub trait TextGenerationService: Send + Sync {
    /// Returns the provider's raw `generateContent` response.
    async fn generate_content(&self, request: &TextRequest) -> Result<Value>;
}
