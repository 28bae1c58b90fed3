pub(crate) mod google;
pub(crate) mod openrouter;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use thumbforge_config::ProviderKind;

use crate::{
    error::{BrokerError, Result},
    types::ImageSize,
};

/// Everything an adapter needs for one upstream call
#[derive(Debug, Clone, Copy)]
pub(crate) struct GenerationJob<'a> {
    /// Compiled prompt
    pub prompt: &'a str,
    /// Requested aspect ratio, not yet mapped to a provider whitelist
    pub ratio: &'a str,
    pub inspiration_image: Option<&'a str>,
    pub image_size: ImageSize,
    /// Whether the broker decided to honor the enhance flag
    pub enhance: bool,
    pub model_override: Option<&'a str>,
}

/// Image located in an upstream reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ProviderImage {
    /// Raw base64 PNG bytes
    Base64Png(String),
    /// Data URI or hosted URL, returned as-is
    Url(String),
}

impl ProviderImage {
    pub fn into_image_url(self) -> String {
        match self {
            Self::Base64Png(data) => format!("data:image/png;base64,{data}"),
            Self::Url(url) => url,
        }
    }
}

/// Upstream image generation adapter
#[async_trait]
pub(crate) trait ThumbnailProvider: Send + Sync {
    /// Provider this adapter serves
    fn kind(&self) -> ProviderKind;

    /// Fail with a configuration error when credentials are absent
    fn ensure_configured(&self) -> Result<()>;

    /// Send one request upstream and extract the image
    async fn generate(&self, job: &GenerationJob<'_>) -> Result<ProviderImage>;
}

/// A strategy that probes one location of an upstream reply
pub(crate) type Extractor = fn(&Value) -> Option<ProviderImage>;

/// Try each extractor in order and keep the first hit
pub(crate) fn extract_first(body: &Value, extractors: &[Extractor]) -> Option<ProviderImage> {
    extractors.iter().find_map(|extract| extract(body))
}

/// Non-empty string at a JSON pointer
pub(crate) fn string_at<'a>(body: &'a Value, pointer: &str) -> Option<&'a str> {
    body.pointer(pointer).and_then(Value::as_str).filter(|s| !s.is_empty())
}

/// Upstream reply with the body parsed leniently
pub(crate) struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

/// Send a prepared request and read the body as JSON
///
/// Bodies that are not JSON are treated as an empty object so that
/// status handling and extraction stay uniform.
pub(crate) async fn send(request: RequestBuilder, kind: ProviderKind) -> Result<UpstreamReply> {
    // Google carries its key in the query string, keep URLs out of messages
    let response = request.send().await.map_err(|e| {
        let e = e.without_url();
        tracing::error!(provider = %kind, error = %e, "thumbnail request failed");
        BrokerError::Connection(format!("Failed to reach {kind}: {e}"))
    })?;

    let status = response.status();

    let bytes = response.bytes().await.map_err(|e| {
        let e = e.without_url();
        tracing::error!(provider = %kind, error = %e, "failed to read upstream response");
        BrokerError::Connection(format!("Failed to read {kind} response: {e}"))
    })?;

    let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::Object(serde_json::Map::new()));

    Ok(UpstreamReply { status, body })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn never(_: &Value) -> Option<ProviderImage> {
        None
    }

    fn from_a(body: &Value) -> Option<ProviderImage> {
        string_at(body, "/a").map(|s| ProviderImage::Url(s.to_string()))
    }

    fn from_b(body: &Value) -> Option<ProviderImage> {
        string_at(body, "/b").map(|s| ProviderImage::Base64Png(s.to_string()))
    }

    #[test]
    fn first_matching_extractor_wins() {
        let body = json!({"a": "first", "b": "second"});
        assert_eq!(
            extract_first(&body, &[never, from_a, from_b]),
            Some(ProviderImage::Url("first".into()))
        );
    }

    #[test]
    fn empty_strings_do_not_match() {
        let body = json!({"a": "", "b": "AAA"});
        assert_eq!(
            extract_first(&body, &[from_a, from_b]),
            Some(ProviderImage::Base64Png("AAA".into()))
        );
        assert_eq!(extract_first(&json!({}), &[from_a, from_b]), None);
    }

    #[test]
    fn base64_is_wrapped_as_png_data_uri() {
        assert_eq!(
            ProviderImage::Base64Png("AAA".into()).into_image_url(),
            "data:image/png;base64,AAA"
        );
        assert_eq!(
            ProviderImage::Url("https://cdn.example/x.png".into()).into_image_url(),
            "https://cdn.example/x.png"
        );
    }
}
