use std::time::Instant;

use thumbforge_config::{ProviderKind, ThumbnailConfig};
use thumbforge_telemetry::GenerationMetrics;

use crate::{
    error::{BrokerError, Result},
    http_client::http_client,
    prompt::{PromptFields, compile},
    provider::{GenerationJob, ThumbnailProvider, google::GoogleProvider, openrouter::OpenRouterProvider},
    types::{StatusResponse, ThumbnailRequest, ThumbnailResponse, non_empty},
};

/// Thumbnail broker that compiles prompts and routes them to a provider
pub struct Broker {
    default_provider: ProviderKind,
    max_inspiration_bytes: u64,
    providers: Vec<Box<dyn ThumbnailProvider>>,
    metrics: GenerationMetrics,
}

impl Broker {
    /// Generate one thumbnail
    ///
    /// Each call makes at most one upstream request and never retries.
    pub async fn generate(&self, request: &ThumbnailRequest) -> Result<ThumbnailResponse> {
        let start = Instant::now();
        let label = self.resolve_provider(request).map_or("unknown", ProviderKind::as_str);

        let result = self.dispatch(request).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.outcome(),
        };
        self.metrics.record(label, outcome, start);

        result
    }

    /// Report which providers are usable without contacting any of them
    pub fn status(&self) -> StatusResponse {
        StatusResponse {
            ok: true,
            route: "thumbnail".to_string(),
            env_configured: self.is_configured(ProviderKind::Google),
            openrouter_configured: self.is_configured(ProviderKind::Openrouter),
            default_provider: self.default_provider,
        }
    }

    async fn dispatch(&self, request: &ThumbnailRequest) -> Result<ThumbnailResponse> {
        let prompt = non_empty(request.prompt.as_deref())
            .ok_or_else(|| BrokerError::Validation("Prompt is required.".to_string()))?;

        let kind = self.resolve_provider(request)?;
        let provider = self
            .provider(kind)
            .ok_or_else(|| BrokerError::Configuration(format!("Provider '{kind}' is not available.")))?;

        provider.ensure_configured()?;

        let inspiration_image = request.inspiration_image();
        let enhance = resolve_enhance(kind, request);

        // Enhance resubmits a prior result, which is often a large data URI
        if kind == ProviderKind::Openrouter
            && !enhance
            && let Some(image) = inspiration_image
        {
            self.check_inline_size(image)?;
        }

        let used_prompt = compile(&PromptFields::from_request(request, prompt));

        let job = GenerationJob {
            prompt: &used_prompt,
            ratio: request.ratio(),
            inspiration_image,
            image_size: request.image_size.unwrap_or_default(),
            enhance,
            model_override: non_empty(request.openrouter_model.as_deref()),
        };

        tracing::debug!(provider = %kind, enhance, "dispatching thumbnail generation");

        let image = provider.generate(&job).await?;

        tracing::debug!(provider = %kind, "thumbnail generation complete");

        Ok(ThumbnailResponse {
            image_url: image.into_image_url(),
            used_prompt,
            provider: kind,
        })
    }

    fn resolve_provider(&self, request: &ThumbnailRequest) -> Result<ProviderKind> {
        match non_empty(request.provider.as_deref()).map(str::trim) {
            None => Ok(self.default_provider),
            Some(tag) => ProviderKind::from_tag(tag).ok_or_else(|| {
                BrokerError::Configuration(format!("Unknown provider '{tag}'. Expected 'google' or 'openrouter'."))
            }),
        }
    }

    fn provider(&self, kind: ProviderKind) -> Option<&dyn ThumbnailProvider> {
        self.providers.iter().find(|p| p.kind() == kind).map(AsRef::as_ref)
    }

    fn is_configured(&self, kind: ProviderKind) -> bool {
        self.provider(kind).is_some_and(|p| p.ensure_configured().is_ok())
    }

    /// Reject inline `data:` references that `OpenRouter` would refuse anyway
    fn check_inline_size(&self, image: &str) -> Result<()> {
        if !image.starts_with("data:") {
            return Ok(());
        }

        let estimated = estimated_decoded_bytes(image);
        if estimated > self.max_inspiration_bytes {
            tracing::debug!(estimated, limit = self.max_inspiration_bytes, "inline reference image too large");

            return Err(BrokerError::Validation(format!(
                "Image too large for OpenRouter (limit {} bytes). Use a hosted image URL instead of uploading.",
                self.max_inspiration_bytes
            )));
        }

        Ok(())
    }
}

/// Enhancement is only meaningful for `OpenRouter` with a reference image
fn resolve_enhance(kind: ProviderKind, request: &ThumbnailRequest) -> bool {
    if !request.enhance.unwrap_or(false) {
        return false;
    }

    let honored = kind == ProviderKind::Openrouter && request.inspiration_image().is_some();
    if !honored {
        tracing::debug!(provider = %kind, "enhance ignored, treating as plain generation");
    }

    honored
}

fn estimated_decoded_bytes(data: &str) -> u64 {
    u64::try_from(data.len()).unwrap_or(u64::MAX).saturating_mul(3).div_ceil(4)
}

/// Builder for constructing the broker from configuration
pub struct BrokerBuilder<'a> {
    config: &'a ThumbnailConfig,
}

impl<'a> BrokerBuilder<'a> {
    pub fn new(config: &'a ThumbnailConfig) -> Self {
        Self { config }
    }

    pub fn build(self) -> Broker {
        let client = http_client();

        let providers: Vec<Box<dyn ThumbnailProvider>> = vec![
            Box::new(GoogleProvider::new(client.clone(), &self.config.google)),
            Box::new(OpenRouterProvider::new(client, &self.config.openrouter)),
        ];

        for provider in &providers {
            if provider.ensure_configured().is_err() {
                tracing::debug!(provider = %provider.kind(), "thumbnail provider not configured");
            }
        }

        tracing::debug!(default_provider = %self.config.default_provider, "thumbnail broker initialized");

        Broker {
            default_provider: self.config.default_provider,
            max_inspiration_bytes: self.config.max_inspiration_bytes,
            providers,
            metrics: GenerationMetrics::new(),
        }
    }
}
