//! HTTP handlers for the gateway endpoints.

use crate::ai::gemini::{IMAGE_PROVIDER_NAME, TEXT_PROVIDER_NAME};
use crate::ai::{extract_text, normalize_image_response, DataUrl, ImageRequest, TextRequest};
use crate::app::App;
use crate::article;
use crate::error::truncate_chars;
use crate::models::{
    Article, ArticleInput, ImageGenerateBody, TextGenerateBody, DEFAULT_TEMPERATURE, SERVICE_NAME,
};
use crate::{prompts, Error, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, error, info};

const PAYLOAD_SAMPLE_CHARS: usize = 500;
const RAW_TEXT_SAMPLE_CHARS: usize = 700;

pub async fn health(State(app): State<App>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "service": SERVICE_NAME,
        "providers": {
            "nanobananaproConfigured": app.image_configured(),
            "geminiConfigured": app.text_configured(),
        }
    }))
}

#[tracing::instrument(skip_all)]
pub async fn generate_image(
    State(app): State<App>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
    let image_gen = app.image_gen()?;
    let body: ImageGenerateBody = read_body(body)?;

    let request = ImageRequest {
        prompt: prompts::image_prompt(&body.prompts.unwrap_or_default()),
        input_image: body
            .input_image_data_url
            .as_deref()
            .and_then(DataUrl::parse),
    };

    let response = image_gen.generate_image(&request).await?;

    let image_data_url = normalize_image_response(&response);
    if image_data_url.is_empty() {
        let sample = truncate_chars(&response.to_string(), PAYLOAD_SAMPLE_CHARS);
        error!("No image in provider response, sample: {}", sample);
        return Err(Error::NoImage {
            provider: IMAGE_PROVIDER_NAME.to_string(),
            sample,
        });
    }

    match DataUrl::parse(&image_data_url) {
        Some(url) => info!(
            "Generated inline image (~{} bytes)",
            url.decoded_len_estimate()
        ),
        None => info!("Generated image reference (not inline base64)"),
    }

    Ok(Json(json!({
        "ok": true,
        "imageDataUrl": image_data_url,
    })))
}

#[tracing::instrument(skip_all)]
pub async fn generate_text(
    State(app): State<App>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>> {
    let text_gen = app.text_gen()?;
    let body: TextGenerateBody = read_body(body)?;
    let temperature = body.temperature();
    let prompts = body.prompts.unwrap_or_default();

    let request = TextRequest {
        system: prompts.system.unwrap_or_default(),
        user: prompts.user.unwrap_or_default(),
        temperature,
    };

    let response = text_gen.generate_content(&request).await?;
    Ok(Json(parse_generated_json(&response)?))
}

#[tracing::instrument(skip_all)]
pub async fn generate_article(
    State(app): State<App>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<Json<Article>> {
    let text_gen = app.text_gen()?;
    let input: ArticleInput = read_body(body)?;
    let prompt = prompts::article_prompt(&input);

    let request = TextRequest {
        system: prompt.system,
        user: prompt.user,
        temperature: DEFAULT_TEMPERATURE,
    };

    let response = text_gen.generate_content(&request).await?;
    let draft = parse_generated_json(&response)?;

    if !article::is_valid_article(&draft) {
        info!("Generated article failed schema validation, using fallback");
    }
    Ok(Json(article::sanitize(&draft)))
}

/// Read a request body leniently. A body sent without a JSON content type, or
/// one that is not an object, is treated as empty. Other rejections keep
/// their status but answer with the JSON error envelope.
fn read_body<T>(body: std::result::Result<Json<Value>, JsonRejection>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    match body {
        Ok(Json(value @ Value::Object(_))) => Ok(serde_json::from_value(value)?),
        Ok(_) => Ok(T::default()),
        Err(JsonRejection::MissingJsonContentType(_)) => {
            debug!("Request body has no JSON content type, reading it as empty");
            Ok(T::default())
        }
        Err(rejection) => Err(Error::InvalidBody {
            status: rejection.status().as_u16(),
            detail: rejection.body_text(),
        }),
    }
}

/// Parse the provider's text output as JSON. Unparseable or falsy output is
/// reported with a sample of the raw text.
fn parse_generated_json(response: &Value) -> Result<Value> {
    let raw = extract_text(response);

    match serde_json::from_str::<Value>(&raw) {
        Ok(parsed) if !is_falsy(&parsed) => Ok(parsed),
        _ => Err(Error::InvalidJson {
            provider: TEXT_PROVIDER_NAME.to_string(),
            raw: truncate_chars(&raw, RAW_TEXT_SAMPLE_CHARS),
        }),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) | Value::Bool(true) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(text: &str) -> Value {
        json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
    }

    #[test]
    fn test_read_body_treats_non_objects_as_empty() {
        let input: ArticleInput = read_body(Ok(Json(json!(["future_job"])))).unwrap();
        assert!(input.future_job.is_none());

        let input: ArticleInput = read_body(Ok(Json(json!({ "future_job": 7 })))).unwrap();
        assert_eq!(input.future_job.as_deref(), Some("7"));
    }

    #[test]
    fn test_parse_generated_json_accepts_objects() {
        let parsed = parse_generated_json(&envelope(r#"{"a":1}"#)).unwrap();
        assert_eq!(parsed, json!({ "a": 1 }));
    }

    #[test]
    fn test_parse_generated_json_rejects_falsy_and_garbage() {
        for text in ["not json", "null", "false", "0", "\"\"", ""] {
            let err = parse_generated_json(&envelope(text)).unwrap_err();
            assert!(matches!(err, Error::InvalidJson { .. }), "{}", text);
        }
    }

    #[test]
    fn test_parse_generated_json_truncates_raw_sample() {
        let long = "x".repeat(1000);
        match parse_generated_json(&envelope(&long)).unwrap_err() {
            Error::InvalidJson { raw, .. } => assert_eq!(raw.len(), 700),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
