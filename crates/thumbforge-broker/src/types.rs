use serde::{Deserialize, Serialize};
use thumbforge_config::ProviderKind;

/// Aspect ratio used when a request does not carry one
pub const DEFAULT_RATIO: &str = "16:9";

/// Creative thumbnail request as submitted by callers
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailRequest {
    /// Free-text creative direction, required
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Aspect ratio such as `16:9`
    #[serde(default)]
    pub ratio: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub mood: Option<String>,
    #[serde(default)]
    pub brand_color: Option<String>,
    #[serde(default)]
    pub accent_color: Option<String>,
    /// Accepted for the caller's benefit, not used for generation
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Explicit provider tag, falls back to the configured default
    #[serde(default)]
    pub provider: Option<String>,
    /// Reference image as a data URI or hosted URL
    #[serde(default)]
    pub inspiration_image: Option<String>,
    /// Request an upscale of `inspiration_image`
    #[serde(default)]
    pub enhance: Option<bool>,
    #[serde(default)]
    pub image_size: Option<ImageSize>,
    /// Per-request `OpenRouter` model override
    #[serde(default)]
    pub openrouter_model: Option<String>,
}

impl ThumbnailRequest {
    /// Aspect ratio with the default applied
    pub fn ratio(&self) -> &str {
        non_empty(self.ratio.as_deref()).unwrap_or(DEFAULT_RATIO)
    }

    /// Reference image, if a non-empty one was sent
    pub fn inspiration_image(&self) -> Option<&str> {
        non_empty(self.inspiration_image.as_deref())
    }
}

/// Requested output resolution
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageSize {
    #[default]
    #[serde(rename = "1K")]
    Standard,
    #[serde(rename = "4K")]
    Ultra,
}

impl ImageSize {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "1K",
            Self::Ultra => "4K",
        }
    }
}

/// Canonical generation result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailResponse {
    /// `data:` URI or upstream-hosted URL
    pub image_url: String,
    /// Compiled prompt that was sent upstream
    pub used_prompt: String,
    /// Provider that served the request
    pub provider: ProviderKind,
}

/// Configuration status reported by `GET /api/thumbnail`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub ok: bool,
    pub route: String,
    pub env_configured: bool,
    pub openrouter_configured: bool,
    pub default_provider: ProviderKind,
}

pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}
