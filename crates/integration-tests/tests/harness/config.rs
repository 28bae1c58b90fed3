//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use secrecy::SecretString;
use thumbforge_config::{
    Config, GoogleApiMode, GoogleConfig, OpenRouterConfig, ProviderKind, ServerConfig, ThumbnailConfig,
};

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with no provider credentials
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    ..ServerConfig::default()
                },
                thumbnail: ThumbnailConfig::default(),
                telemetry: None,
            },
        }
    }

    /// Point the Google path at a mock endpoint
    pub fn with_google(mut self, api_url: &str, mode: GoogleApiMode) -> Self {
        self.config.thumbnail.google = GoogleConfig {
            api_key: Some(SecretString::from("google-test-key")),
            api_url: Some(api_url.to_owned()),
            mode,
        };
        self
    }

    /// Point the OpenRouter path at a mock endpoint
    pub fn with_openrouter(mut self, base_url: &str) -> Self {
        self.config.thumbnail.openrouter = OpenRouterConfig {
            api_key: Some(SecretString::from("openrouter-test-key")),
            base_url: Some(base_url.parse().expect("valid URL")),
            ..OpenRouterConfig::default()
        };
        self
    }

    /// Override the configured OpenRouter model
    pub fn with_openrouter_model(mut self, model: &str) -> Self {
        self.config.thumbnail.openrouter.model = model.to_owned();
        self
    }

    /// Provider used when requests do not name one
    pub fn default_provider(mut self, kind: ProviderKind) -> Self {
        self.config.thumbnail.default_provider = kind;
        self
    }

    /// Limit for inline reference images
    pub fn max_inspiration_bytes(mut self, limit: u64) -> Self {
        self.config.thumbnail.max_inspiration_bytes = limit;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
