//! Application wiring: provider clients, shared state, and the HTTP router.

use crate::ai::gemini::{GeminiImageClient, GeminiTextClient};
use crate::ai::{ImageGenerationService, TextGenerationService};
use crate::handlers;
use crate::models::{Config, MAX_BODY_BYTES};
use crate::{Error, Result};
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

/// Shared per-process state handed to every request handler.
#[derive(Clone)]
pub struct App {
    image_gen: Option<Arc<dyn ImageGenerationService>>,
    text_gen: Option<Arc<dyn TextGenerationService>>,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
///
/// A `None` service is reported as not configured.
#[derive(Default)]
pub struct AppServices {
    pub image_gen: Option<Arc<dyn ImageGenerationService>>,
    pub text_gen: Option<Arc<dyn TextGenerationService>>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices) -> Self {
        Self {
            image_gen: services.image_gen,
            text_gen: services.text_gen,
        }
    }

    /// Construct provider clients for whatever the configuration enables.
    pub fn from_config(config: &Config) -> Result<Self> {
        // Reuse one HTTP connection pool across provider clients.
        let http_client = reqwest::Client::new();

        let image_gen = match config.image.endpoint.as_deref() {
            Some(endpoint) => {
                info!(
                    "Image provider: {} (model: {})",
                    endpoint, config.image.model
                );
                let client = GeminiImageClient::new_with_client(
                    &config.image,
                    endpoint,
                    config.text.api_key.as_deref(),
                    http_client.clone(),
                )?;
                Some(Arc::new(client) as Arc<dyn ImageGenerationService>)
            }
            None => None,
        };

        let text_gen = match config.text.api_key.as_deref() {
            Some(api_key) => {
                info!("Text provider: Gemini (model: {})", config.text.model);
                let client =
                    GeminiTextClient::new_with_client(&config.text.endpoint, api_key, http_client)?;
                Some(Arc::new(client) as Arc<dyn TextGenerationService>)
            }
            None => None,
        };

        Ok(Self::with_services(AppServices {
            image_gen,
            text_gen,
        }))
    }

    pub fn image_configured(&self) -> bool {
        self.image_gen.is_some()
    }

    pub fn text_configured(&self) -> bool {
        self.text_gen.is_some()
    }

    pub(crate) fn image_gen(&self) -> Result<&dyn ImageGenerationService> {
        self.image_gen
            .as_deref()
            .ok_or_else(|| Error::NotConfigured("NANOBANANA_ENDPOINT".to_string()))
    }

    pub(crate) fn text_gen(&self) -> Result<&dyn TextGenerationService> {
        self.text_gen
            .as_deref()
            .ok_or_else(|| Error::NotConfigured("GEMINI_API_KEY".to_string()))
    }

    pub fn router(self) -> Router {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO));

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/image/generate", post(handlers::generate_image))
            .route("/api/text/generate", post(handlers::generate_text))
            .route("/api/article/generate", post(handlers::generate_article))
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(trace_layer)
            .layer(CorsLayer::permissive())
            .with_state(self)
    }
}
