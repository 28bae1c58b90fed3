use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use thumbforge_config::{OpenRouterConfig, ProviderKind};

use super::{Extractor, GenerationJob, ProviderImage, ThumbnailProvider, extract_first, send, string_at};
use crate::error::{BrokerError, Result};

/// Default `OpenRouter` API base URL
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

const REQUEST_FAILED: &str = "OpenRouter request failed.";
const NO_IMAGE: &str =
    "Model did not return an image. Ensure the model supports image output and include modalities/image_config.";

const DATA_IMAGE_PREFIX: &str = "data:image";

/// Aspect ratios `OpenRouter` image models accept
const SUPPORTED_RATIOS: [&str; 10] = [
    "1:1", "2:3", "3:2", "3:4", "4:3", "4:5", "5:4", "9:16", "16:9", "21:9",
];

const FALLBACK_RATIO: &str = "16:9";

const EXTRACTORS: &[Extractor] = &[first_image_url, content_parts, content_string];

/// Upscale replies sometimes carry a bare `url` on the first image
const ENHANCE_EXTRACTORS: &[Extractor] = &[first_image_url, first_image_bare_url, content_parts, content_string];

/// `OpenRouter` chat-completions adapter
pub(crate) struct OpenRouterProvider {
    client: Client,
    api_key: Option<SecretString>,
    model: String,
    base_url: String,
}

impl OpenRouterProvider {
    pub fn new(client: Client, config: &OpenRouterConfig) -> Self {
        let base_url = config
            .base_url
            .as_ref()
            .map_or(DEFAULT_BASE_URL, url::Url::as_str)
            .trim_end_matches('/')
            .to_string();

        Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            base_url,
        }
    }

    fn api_key(&self) -> Result<&SecretString> {
        self.api_key
            .as_ref()
            .ok_or_else(|| BrokerError::Configuration("OPENROUTER_API_KEY is not configured.".to_string()))
    }
}

/// Wire format for the chat-completions request
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    modalities: &'static [&'static str],
    image_config: ImageConfig<'a>,
    messages: [ChatMessage<'a>; 1],
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ImageConfig<'a> {
    aspect_ratio: &'static str,
    image_size: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    super_resolution_references: Option<[SuperResolutionReference<'a>; 1]>,
}

#[derive(Debug, Serialize)]
struct SuperResolutionReference<'a> {
    url: &'a str,
    weight: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

/// Image parts carry both spellings of the URL field
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text {
        text: &'a str,
    },
    ImageUrl {
        image_url: ImageRef<'a>,
        #[serde(rename = "imageUrl")]
        image_url_camel: ImageRef<'a>,
    },
}

#[derive(Debug, Clone, Copy, Serialize)]
struct ImageRef<'a> {
    url: &'a str,
}

fn resolve_aspect_ratio(ratio: &str) -> &'static str {
    SUPPORTED_RATIOS
        .iter()
        .find(|supported| **supported == ratio)
        .copied()
        .unwrap_or(FALLBACK_RATIO)
}

fn modalities_for(model: &str) -> &'static [&'static str] {
    if model.contains("gemini") {
        &["image", "text"]
    } else {
        &["image"]
    }
}

fn build_payload<'a>(model: &'a str, job: &GenerationJob<'a>) -> ChatRequest<'a> {
    let mut content = vec![ContentPart::Text { text: job.prompt }];

    if let Some(url) = job.inspiration_image {
        let reference = ImageRef { url };
        content.push(ContentPart::ImageUrl {
            image_url: reference,
            image_url_camel: reference,
        });
    }

    let super_resolution_references = job
        .inspiration_image
        .filter(|_| job.enhance)
        .map(|url| [SuperResolutionReference { url, weight: 1.0 }]);

    ChatRequest {
        model,
        modalities: modalities_for(model),
        image_config: ImageConfig {
            aspect_ratio: resolve_aspect_ratio(job.ratio),
            image_size: job.image_size.as_str(),
            super_resolution_references,
        },
        messages: [ChatMessage { role: "user", content }],
        stream: false,
    }
}

fn error_message(body: &Value) -> String {
    if let Some(message) = string_at(body, "/error/message") {
        return message.to_string();
    }

    match body.get("error") {
        Some(Value::String(message)) if !message.is_empty() => message.clone(),
        Some(error) if !error.is_null() && !error.is_string() => error.to_string(),
        _ => REQUEST_FAILED.to_string(),
    }
}

fn first_image_url(body: &Value) -> Option<ProviderImage> {
    string_at(body, "/choices/0/message/images/0/image_url/url")
        .or_else(|| string_at(body, "/choices/0/message/images/0/imageUrl/url"))
        .map(|url| ProviderImage::Url(url.to_string()))
}

fn first_image_bare_url(body: &Value) -> Option<ProviderImage> {
    string_at(body, "/choices/0/message/images/0/url").map(|url| ProviderImage::Url(url.to_string()))
}

fn content_parts(body: &Value) -> Option<ProviderImage> {
    let parts = body.pointer("/choices/0/message/content")?.as_array()?;

    parts.iter().find_map(|part| {
        ["/image_url/url", "/imageUrl/url", "/text"]
            .iter()
            .filter_map(|pointer| string_at(part, pointer))
            .find(|candidate| candidate.starts_with(DATA_IMAGE_PREFIX))
            .map(|url| ProviderImage::Url(url.to_string()))
    })
}

fn content_string(body: &Value) -> Option<ProviderImage> {
    string_at(body, "/choices/0/message/content")
        .filter(|content| content.starts_with(DATA_IMAGE_PREFIX))
        .map(|content| ProviderImage::Url(content.to_string()))
}

#[async_trait]
impl ThumbnailProvider for OpenRouterProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Openrouter
    }

    fn ensure_configured(&self) -> Result<()> {
        self.api_key().map(|_| ())
    }

    async fn generate(&self, job: &GenerationJob<'_>) -> Result<ProviderImage> {
        let api_key = self.api_key()?;
        let model = job.model_override.unwrap_or(self.model.as_str());
        let payload = build_payload(model, job);
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(
            provider = "openrouter",
            model = %model,
            enhance = job.enhance,
            "sending thumbnail request"
        );

        let request = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", api_key.expose_secret()))
            .json(&payload);

        let reply = send(request, self.kind()).await?;

        if !reply.status.is_success() {
            tracing::warn!(provider = "openrouter", status = %reply.status, "OpenRouter API error");

            return Err(BrokerError::Upstream {
                status: reply.status.as_u16(),
                message: error_message(&reply.body),
                debug: None,
            });
        }

        let extractors = if job.enhance { ENHANCE_EXTRACTORS } else { EXTRACTORS };

        match extract_first(&reply.body, extractors) {
            Some(image) => Ok(image),
            None => {
                tracing::warn!(provider = "openrouter", model = %model, "no image found in OpenRouter response");
                Err(BrokerError::no_image(NO_IMAGE, Some(reply.body)))
            }
        }
    }
}
