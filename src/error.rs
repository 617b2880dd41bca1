//! Error handling and custom error types
//!
//! Provides unified error handling across the gateway using thiserror. The
//! response-normalization core never returns these; they cover configuration,
//! provider transport and the HTTP surface.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0} is not configured in .env")]
    NotConfigured(String),

    #[error("{provider} request failed (status {status}): {detail}")]
    ProviderStatus {
        provider: String,
        status: u16,
        detail: String,
    },

    #[error("{provider} response did not include a usable image")]
    NoImage { provider: String, sample: String },

    #[error("{provider} response was not valid JSON")]
    InvalidJson { provider: String, raw: String },

    #[error("Invalid request body: {detail}")]
    InvalidBody { status: u16, detail: String },
}

pub type Result<T> = std::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Error::NotConfigured(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "ok": false, "error": self.to_string() }),
            ),
            Error::ProviderStatus {
                provider,
                status,
                detail,
            } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "ok": false,
                    "error": format!("{} request failed", provider),
                    "provider_status": status,
                    "provider_detail": detail,
                }),
            ),
            Error::NoImage { sample, .. } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "ok": false,
                    "error": self.to_string(),
                    "provider_payload_sample": sample,
                }),
            ),
            Error::InvalidBody { status, .. } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_REQUEST),
                json!({ "ok": false, "error": self.to_string() }),
            ),
            Error::InvalidJson { raw, .. } => (
                StatusCode::BAD_GATEWAY,
                json!({ "ok": false, "error": self.to_string(), "raw": raw }),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "ok": false, "error": self.to_string() }),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Keep at most `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
