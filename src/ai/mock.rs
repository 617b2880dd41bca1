use super::gemini::{IMAGE_PROVIDER_NAME, TEXT_PROVIDER_NAME};
use super::{ImageGenerationService, ImageRequest, TextGenerationService, TextRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Canned result for a mocked provider call.
#[derive(Debug, Clone)]
enum MockOutcome {
    Respond(Value),
    Fail { status: u16, detail: String },
}

impl MockOutcome {
    fn resolve(&self, provider: &str) -> Result<Value> {
        match self {
            MockOutcome::Respond(value) => Ok(value.clone()),
            MockOutcome::Fail { status, detail } => Err(Error::ProviderStatus {
                provider: provider.to_string(),
                status: *status,
                detail: detail.clone(),
            }),
        }
    }
}

fn next_outcome(outcomes: &Mutex<Vec<MockOutcome>>, count: usize) -> Option<MockOutcome> {
    let outcomes = outcomes.lock().unwrap();
    if outcomes.is_empty() {
        None
    } else {
        Some(outcomes[(count - 1) % outcomes.len()].clone())
    }
}

pub struct MockImageClient {
    outcomes: Arc<Mutex<Vec<MockOutcome>>>,
    requests: Arc<Mutex<Vec<ImageRequest>>>,
}

impl MockImageClient {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_response(self, response: Value) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push(MockOutcome::Respond(response));
        self
    }

    pub fn with_error(self, status: u16, detail: &str) -> Self {
        self.outcomes.lock().unwrap().push(MockOutcome::Fail {
            status,
            detail: detail.to_string(),
        });
        self
    }

    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for MockImageClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockImageClient {
    fn clone(&self) -> Self {
        Self {
            outcomes: Arc::clone(&self.outcomes),
            requests: Arc::clone(&self.requests),
        }
    }
}

#[async_trait]
impl ImageGenerationService for MockImageClient {
    async fn generate_image(&self, request: &ImageRequest) -> Result<Value> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        match next_outcome(&self.outcomes, count) {
            Some(outcome) => outcome.resolve(IMAGE_PROVIDER_NAME),
            // A 1x1 transparent PNG in the Gemini inline-data shape.
            None => Ok(json!({
                "candidates": [{
                    "content": {
                        "parts": [{
                            "inlineData": {
                                "mimeType": "image/png",
                                "data": "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg=="
                            }
                        }]
                    }
                }]
            })),
        }
    }
}

pub struct MockTextClient {
    outcomes: Arc<Mutex<Vec<MockOutcome>>>,
    requests: Arc<Mutex<Vec<TextRequest>>>,
}

impl MockTextClient {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Respond with `text` wrapped in a single-candidate envelope.
    pub fn with_text_response(self, text: &str) -> Self {
        self.with_response(json!({
            "candidates": [{ "content": { "parts": [{ "text": text }] } }]
        }))
    }

    pub fn with_response(self, response: Value) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .push(MockOutcome::Respond(response));
        self
    }

    pub fn with_error(self, status: u16, detail: &str) -> Self {
        self.outcomes.lock().unwrap().push(MockOutcome::Fail {
            status,
            detail: detail.to_string(),
        });
        self
    }

    pub fn requests(&self) -> Vec<TextRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for MockTextClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for MockTextClient {
    fn clone(&self) -> Self {
        Self {
            outcomes: Arc::clone(&self.outcomes),
            requests: Arc::clone(&self.requests),
        }
    }
}

#[async_trait]
impl TextGenerationService for MockTextClient {
    async fn generate_content(&self, request: &TextRequest) -> Result<Value> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        match next_outcome(&self.outcomes, count) {
            Some(outcome) => outcome.resolve(TEXT_PROVIDER_NAME),
            None => Ok(json!({
                "candidates": [{ "content": { "parts": [{ "text": "{}" }] } }]
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{extract_text, normalize_image_response};

    #[tokio::test]
    async fn test_mock_image_client_default_response_normalizes() {
        let client = MockImageClient::new();
        let request = ImageRequest {
            prompt: "p".to_string(),
            input_image: None,
        };

        let response = client.generate_image(&request).await.unwrap();
        assert!(normalize_image_response(&response).starts_with("data:image/png;base64,iVBOR"));
        assert_eq!(client.get_call_count(), 1);
        assert_eq!(client.requests()[0], request);
    }

    #[tokio::test]
    async fn test_mock_text_client_cycles_responses() {
        let client = MockTextClient::new()
            .with_text_response("first")
            .with_error(500, "down");
        let request = TextRequest {
            system: String::new(),
            user: String::new(),
            temperature: 0.7,
        };

        let first = client.generate_content(&request).await.unwrap();
        assert_eq!(extract_text(&first), "first");

        let err = client.generate_content(&request).await.unwrap_err();
        assert!(matches!(err, Error::ProviderStatus { status: 500, .. }));

        // Should cycle back
        let third = client.generate_content(&request).await.unwrap();
        assert_eq!(extract_text(&third), "first");
        assert_eq!(client.get_call_count(), 3);
    }
}
