//! Data models and structures
//!
//! Defines the article shape returned to the front-end, the inbound request
//! bodies, and the environment-driven gateway configuration.

use crate::article::coerce_to_string;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const SERVICE_NAME: &str = "mirai-news-api";
pub const DEFAULT_PORT: u16 = 8899;
pub const MAX_BODY_BYTES: usize = 30 * 1024 * 1024;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SideNoteCategory {
    FutureStock,
    FutureWeather,
    FutureAd,
}

impl SideNoteCategory {
    /// Accepts only the exact wire literals.
    pub fn from_literal(value: &str) -> Option<Self> {
        match value {
            "future_stock" => Some(Self::FutureStock),
            "future_weather" => Some(Self::FutureWeather),
            "future_ad" => Some(Self::FutureAd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SideNote {
    pub category: SideNoteCategory,
    pub title: String,
    pub body: String,
}

/// A schema-conforming "future newspaper" article.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub article_title: String,
    pub h1_title: String,
    pub lead: String,
    pub h2_titles: [String; 2],
    pub sections: [Section; 2],
    pub side_notes: Vec<SideNote>,
}

/// Front-end prompts. Fields accept any JSON value and are read loosely.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptSet {
    #[serde(default, deserialize_with = "loose_string")]
    pub system: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub user: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub negative: Option<String>,
}

/// Body of `POST /api/image/generate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageGenerateBody {
    #[serde(default, deserialize_with = "loose_prompts")]
    pub prompts: Option<PromptSet>,
    #[serde(default, deserialize_with = "loose_string")]
    pub input_image_data_url: Option<String>,
}

/// Body of `POST /api/text/generate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextGenerateBody {
    #[serde(default, deserialize_with = "loose_prompts")]
    pub prompts: Option<PromptSet>,
    #[serde(default)]
    pub temperature: Option<Value>,
}

impl TextGenerateBody {
    /// The requested temperature when it is a finite number, else 0.7.
    pub fn temperature(&self) -> f64 {
        self.temperature
            .as_ref()
            .and_then(|t| t.as_f64())
            .filter(|t| t.is_finite())
            .unwrap_or(DEFAULT_TEMPERATURE)
    }
}

/// Body of `POST /api/article/generate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArticleInput {
    #[serde(default, deserialize_with = "loose_string")]
    pub future_job: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub likes: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub solve_issue: Option<String>,
    #[serde(default, deserialize_with = "loose_string")]
    pub template_type: Option<String>,
    // Compared against the literal "female", so only real strings count.
    #[serde(default, deserialize_with = "strict_string")]
    pub gender: Option<String>,
}

/// Falsy values are absent; anything else is stringified.
fn loose_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = coerce_to_string(&Value::deserialize(deserializer)?);
    Ok(Some(text).filter(|t| !t.is_empty()))
}

fn strict_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

/// A non-object `prompts` reads as no prompts at all.
fn loose_prompts<'de, D>(deserializer: D) -> Result<Option<PromptSet>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => PromptSet::deserialize(value)
            .map(Some)
            .map_err(de::Error::custom),
        _ => Ok(None),
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct ImageProviderConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub auth_header: String,
    pub auth_scheme: String,
    pub extra_headers: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct TextProviderConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub image: ImageProviderConfig,
    pub text: TextProviderConfig,
}

impl Config {
    /// Load `.env` when present, then read the process environment. A
    /// missing file is fine; a malformed one is an error.
    pub fn from_env() -> crate::Result<Self> {
        load_dotenv(dotenvy::dotenv())?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| crate::Error::Config(format!("Invalid PORT '{}'", raw)))?,
            None => DEFAULT_PORT,
        };

        let extra_headers = var("NANOBANANA_EXTRA_HEADERS_JSON")
            .map(|raw| parse_extra_headers(&raw))
            .unwrap_or_default();

        let gemini_model = var("GEMINI_MODEL").unwrap_or_else(|| "gemini-3-flash".to_string());
        let gemini_endpoint = var("GEMINI_ENDPOINT").unwrap_or_else(|| {
            format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                gemini_model
            )
        });

        Ok(Self {
            port,
            image: ImageProviderConfig {
                endpoint: var("NANOBANANA_ENDPOINT"),
                api_key: var("NANOBANANA_API_KEY"),
                model: var("NANOBANANA_MODEL").unwrap_or_else(|| "nanobananapro".to_string()),
                auth_header: var("NANOBANANA_AUTH_HEADER")
                    .unwrap_or_else(|| "Authorization".to_string()),
                // An explicitly empty scheme means "send the bare key".
                auth_scheme: lookup("NANOBANANA_AUTH_SCHEME")
                    .unwrap_or_else(|| "Bearer".to_string()),
                extra_headers,
            },
            text: TextProviderConfig {
                api_key: var("GEMINI_API_KEY"),
                model: gemini_model,
                endpoint: gemini_endpoint,
            },
        })
    }

    pub fn image_configured(&self) -> bool {
        self.image.endpoint.is_some()
    }

    pub fn text_configured(&self) -> bool {
        self.text.api_key.is_some()
    }
}

fn load_dotenv<T>(result: dotenvy::Result<T>) -> crate::Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn parse_extra_headers(raw: &str) -> BTreeMap<String, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map
            .into_iter()
            .map(|(name, value)| {
                let value = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (name, value)
            })
            .collect(),
        _ => {
            tracing::warn!("NANOBANANA_EXTRA_HEADERS_JSON is not a JSON object, ignoring");
            BTreeMap::new()
        }
    }
}
