use std::fmt;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

/// Default `OpenRouter` model when none is configured
pub const DEFAULT_OPENROUTER_MODEL: &str = "google/gemini-2.5-flash-image-preview";

/// Upper bound for inline `data:` reference images sent to `OpenRouter`
pub const DEFAULT_MAX_INSPIRATION_BYTES: u64 = 4_500_000;

/// Thumbnail broker configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThumbnailConfig {
    /// Provider used when a request does not name one
    #[serde(default)]
    pub default_provider: ProviderKind,
    /// Largest estimated decoded size for an inline reference image
    #[serde(default = "default_max_inspiration_bytes")]
    pub max_inspiration_bytes: u64,
    /// Google image API settings
    #[serde(default)]
    pub google: GoogleConfig,
    /// `OpenRouter` settings
    #[serde(default)]
    pub openrouter: OpenRouterConfig,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            default_provider: ProviderKind::default(),
            max_inspiration_bytes: DEFAULT_MAX_INSPIRATION_BYTES,
            google: GoogleConfig::default(),
            openrouter: OpenRouterConfig::default(),
        }
    }
}

/// Upstream image providers the broker can route to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Google Imagen / Vertex AI image endpoints
    #[default]
    Google,
    /// `OpenRouter` chat completions with image output
    Openrouter,
}

impl ProviderKind {
    /// Wire name of the provider
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Openrouter => "openrouter",
        }
    }

    /// Parse a provider tag as sent by callers
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "google" => Some(Self::Google),
            "openrouter" => Some(Self::Openrouter),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Google image API configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoogleConfig {
    /// API key, appended to the endpoint as `key=`
    #[serde(default, deserialize_with = "non_empty_secret")]
    pub api_key: Option<SecretString>,
    /// Full endpoint URL, may already carry a query string
    #[serde(default, deserialize_with = "non_empty_string")]
    pub api_url: Option<String>,
    /// Payload shape to send
    #[serde(default)]
    pub mode: GoogleApiMode,
}

impl GoogleConfig {
    /// Settings that must be provided before the Google path can be used
    pub fn missing_settings(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api_key.is_none() {
            missing.push("GOOGLE_API_KEY");
        }
        if self.api_url.is_none() {
            missing.push("GOOGLE_IMAGE_API_URL");
        }
        missing
    }

    /// Whether both the key and the endpoint are present
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some() && self.api_url.is_some()
    }
}

/// Request shape used for the Google endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoogleApiMode {
    /// `{prompt: {text}, imageGenerationConfig: {...}}`
    #[default]
    Imagen,
    /// `{instances: [{prompt}], parameters: {...}}`
    Vertex,
}

/// `OpenRouter` configuration
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenRouterConfig {
    /// API key sent as a bearer token
    #[serde(default, deserialize_with = "non_empty_secret")]
    pub api_key: Option<SecretString>,
    /// Default model identifier
    #[serde(default = "default_openrouter_model")]
    pub model: String,
    /// Base URL override
    #[serde(default, deserialize_with = "non_empty_url")]
    pub base_url: Option<Url>,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_openrouter_model(),
            base_url: None,
        }
    }
}

impl OpenRouterConfig {
    /// Whether an API key is present
    pub const fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_max_inspiration_bytes() -> u64 {
    DEFAULT_MAX_INSPIRATION_BYTES
}

fn default_openrouter_model() -> String {
    DEFAULT_OPENROUTER_MODEL.to_string()
}

/// Expanded `{{ env.VAR | default("") }}` placeholders leave empty strings behind
fn non_empty_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn non_empty_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(non_empty_string(deserializer)?.map(SecretString::from))
}

fn non_empty_url<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
where
    D: Deserializer<'de>,
{
    non_empty_string(deserializer)?
        .map(|raw| Url::parse(&raw).map_err(serde::de::Error::custom))
        .transpose()
}
