use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::Value;
use thumbforge_config::{GoogleApiMode, GoogleConfig, ProviderKind};

use super::{Extractor, GenerationJob, ProviderImage, ThumbnailProvider, extract_first, send, string_at};
use crate::error::{BrokerError, Result};

const REQUEST_FAILED: &str = "Google API request failed.";
const NO_IMAGE: &str = "No image returned from Google API.";

/// Response locations that may hold the generated image, in priority order
const EXTRACTORS: &[Extractor] = &[
    generated_images,
    predictions,
    candidate_inline_data,
    images_data,
    openai_style_b64,
];

/// Google Imagen / Vertex AI adapter
pub(crate) struct GoogleProvider {
    client: Client,
    credentials: Option<(String, SecretString)>,
    missing: Vec<&'static str>,
    mode: GoogleApiMode,
}

impl GoogleProvider {
    pub fn new(client: Client, config: &GoogleConfig) -> Self {
        let credentials = config.api_url.clone().zip(config.api_key.clone());

        Self {
            client,
            credentials,
            missing: config.missing_settings(),
            mode: config.mode,
        }
    }

    /// Endpoint URL with the API key appended
    fn endpoint(&self) -> Result<String> {
        self.credentials
            .as_ref()
            .map(|(url, key)| endpoint_with_key(url, key.expose_secret()))
            .ok_or_else(|| BrokerError::Configuration(format!("Missing {}", self.missing.join(", "))))
    }
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GooglePayload<'a> {
    Vertex {
        instances: [VertexInstance<'a>; 1],
        parameters: ImageParameters<'a>,
    },
    Imagen {
        prompt: ImagenPrompt<'a>,
        #[serde(rename = "imageGenerationConfig")]
        image_generation_config: ImageParameters<'a>,
    },
}

#[derive(Debug, Serialize)]
struct VertexInstance<'a> {
    prompt: &'a str,
}

#[derive(Debug, Serialize)]
struct ImagenPrompt<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageParameters<'a> {
    number_of_images: u32,
    aspect_ratio: &'a str,
}

fn build_payload<'a>(mode: GoogleApiMode, job: &GenerationJob<'a>) -> GooglePayload<'a> {
    let parameters = ImageParameters {
        number_of_images: 1,
        aspect_ratio: job.ratio,
    };

    match mode {
        GoogleApiMode::Vertex => GooglePayload::Vertex {
            instances: [VertexInstance { prompt: job.prompt }],
            parameters,
        },
        GoogleApiMode::Imagen => GooglePayload::Imagen {
            prompt: ImagenPrompt { text: job.prompt },
            image_generation_config: parameters,
        },
    }
}

fn endpoint_with_key(url: &str, key: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}key={key}")
}

fn error_message(body: &Value) -> String {
    string_at(body, "/error/message").unwrap_or(REQUEST_FAILED).to_string()
}

fn generated_images(body: &Value) -> Option<ProviderImage> {
    base64_at(body, "/generatedImages/0/image/imageBytes")
}

fn predictions(body: &Value) -> Option<ProviderImage> {
    base64_at(body, "/predictions/0/bytesBase64Encoded")
}

fn candidate_inline_data(body: &Value) -> Option<ProviderImage> {
    base64_at(body, "/candidates/0/content/parts/0/inlineData/data")
}

fn images_data(body: &Value) -> Option<ProviderImage> {
    base64_at(body, "/images/0/data")
}

fn openai_style_b64(body: &Value) -> Option<ProviderImage> {
    base64_at(body, "/data/0/b64_json")
}

fn base64_at(body: &Value, pointer: &str) -> Option<ProviderImage> {
    string_at(body, pointer).map(|data| ProviderImage::Base64Png(data.to_string()))
}

#[async_trait]
impl ThumbnailProvider for GoogleProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Google
    }

    fn ensure_configured(&self) -> Result<()> {
        self.endpoint().map(|_| ())
    }

    async fn generate(&self, job: &GenerationJob<'_>) -> Result<ProviderImage> {
        let url = self.endpoint()?;
        let payload = build_payload(self.mode, job);

        tracing::debug!(provider = "google", mode = ?self.mode, ratio = %job.ratio, "sending thumbnail request");

        let reply = send(self.client.post(url).json(&payload), self.kind()).await?;

        if !reply.status.is_success() {
            tracing::warn!(provider = "google", status = %reply.status, "Google image API error");

            return Err(BrokerError::Upstream {
                status: reply.status.as_u16(),
                message: error_message(&reply.body),
                debug: None,
            });
        }

        extract_first(&reply.body, EXTRACTORS).ok_or_else(|| {
            tracing::warn!(provider = "google", "no image found in Google response");
            BrokerError::no_image(NO_IMAGE, None)
        })
    }
}
