//! Normalization of provider responses.
//!
//! Image providers answer in a handful of incompatible dialects; every
//! extractor here probes one of them and the first that matches wins. Nothing
//! in this module fails: an unrecognized shape yields an empty string.

use super::data_url::{DataUrl, DEFAULT_IMAGE_MIME};
use serde_json::Value;

type Extractor = fn(&Value) -> Option<String>;

/// Extraction rules in precedence order.
const IMAGE_EXTRACTORS: &[Extractor] = &[
    top_level_image_data_url,
    top_level_image_data_url_snake,
    top_level_url,
    result_image_data_url,
    result_url,
    data_url,
    data_b64_json,
    output_url,
    output_b64_json,
    output_base64,
    top_level_base64,
    candidate_inline_data,
    candidate_inline_data_snake,
];

/// Locate the generated image in an arbitrary provider response.
///
/// Returns a `data:` URL (or a passthrough URL) or `""` when no known shape
/// matches.
pub fn normalize_image_response(response: &Value) -> String {
    if !response.is_object() {
        return String::new();
    }

    IMAGE_EXTRACTORS
        .iter()
        .find_map(|extract| extract(response))
        .unwrap_or_default()
}

/// First `text` part of `candidates[0].content.parts`, or `""`.
pub fn extract_text(response: &Value) -> String {
    candidate_parts(response)
        .and_then(|parts| {
            parts
                .iter()
                .find_map(|part| part.get("text").and_then(Value::as_str))
        })
        .unwrap_or_default()
        .to_string()
}

fn string_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value.get(key).and_then(Value::as_str)
}

fn non_empty_string_field<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    string_field(value, key).filter(|s| !s.is_empty())
}

fn first_element<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    value.get(key).and_then(Value::as_array)?.first()
}

fn mime_or_default(value: &Value, key: &str) -> String {
    non_empty_string_field(value, key)
        .unwrap_or(DEFAULT_IMAGE_MIME)
        .to_string()
}

fn wrap_png(data: &str) -> String {
    DataUrl::new(DEFAULT_IMAGE_MIME, data).to_string()
}

fn candidate_parts(response: &Value) -> Option<&Vec<Value>> {
    response
        .get("candidates")
        .and_then(Value::as_array)?
        .first()?
        .get("content")?
        .get("parts")?
        .as_array()
}

fn top_level_image_data_url(response: &Value) -> Option<String> {
    non_empty_string_field(response, "imageDataUrl").map(str::to_string)
}

fn top_level_image_data_url_snake(response: &Value) -> Option<String> {
    non_empty_string_field(response, "image_data_url").map(str::to_string)
}

fn top_level_url(response: &Value) -> Option<String> {
    non_empty_string_field(response, "url").map(str::to_string)
}

// The nested rules below match on type alone, so an empty string still
// terminates the search.
fn result_image_data_url(response: &Value) -> Option<String> {
    string_field(response.get("result")?, "imageDataUrl").map(str::to_string)
}

fn result_url(response: &Value) -> Option<String> {
    string_field(response.get("result")?, "url").map(str::to_string)
}

fn data_url(response: &Value) -> Option<String> {
    string_field(first_element(response, "data")?, "url").map(str::to_string)
}

fn data_b64_json(response: &Value) -> Option<String> {
    string_field(first_element(response, "data")?, "b64_json").map(wrap_png)
}

fn output_url(response: &Value) -> Option<String> {
    string_field(first_element(response, "output")?, "url").map(str::to_string)
}

fn output_b64_json(response: &Value) -> Option<String> {
    string_field(first_element(response, "output")?, "b64_json").map(wrap_png)
}

fn output_base64(response: &Value) -> Option<String> {
    let first = first_element(response, "output")?;
    let data = string_field(first, "base64")?;
    Some(DataUrl::new(mime_or_default(first, "mime_type"), data).to_string())
}

fn top_level_base64(response: &Value) -> Option<String> {
    let data = non_empty_string_field(response, "base64")?;
    Some(DataUrl::new(mime_or_default(response, "mime_type"), data).to_string())
}

fn inline_image(parts: &[Value], container: &str, mime_key: &str) -> Option<String> {
    parts.iter().find_map(|part| {
        let inline = part.get(container)?;
        let data = non_empty_string_field(inline, "data")?;
        Some(DataUrl::new(mime_or_default(inline, mime_key), data).to_string())
    })
}

fn candidate_inline_data(response: &Value) -> Option<String> {
    inline_image(candidate_parts(response)?, "inlineData", "mimeType")
}

fn candidate_inline_data_snake(response: &Value) -> Option<String> {
    inline_image(candidate_parts(response)?, "inline_data", "mime_type")
}
