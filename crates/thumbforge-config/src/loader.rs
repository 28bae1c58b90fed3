use std::path::Path;

use secrecy::SecretString;

use crate::{
    Config, GoogleApiMode, GoogleConfig, OpenRouterConfig, ProviderKind, ServerConfig, ThumbnailConfig,
    thumbnail::DEFAULT_OPENROUTER_MODEL,
};

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        Self::parse(&raw)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if expansion, parsing, or validation fails
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let expanded =
            crate::env::expand_env(raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Build configuration from well-known environment variables
    ///
    /// `GOOGLE_IMAGE_API_MODE=vertex` selects the Vertex payload shape and
    /// `GOOGLE_IMAGE_API_MODE=openrouter` makes `OpenRouter` the default
    /// provider. Missing credentials are left unset and reported per request.
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable holds an unparseable value
    pub fn from_env() -> anyhow::Result<Self> {
        let mode = env_var("GOOGLE_IMAGE_API_MODE").unwrap_or_else(|| "imagen".to_string());

        let default_provider = if mode == "openrouter" {
            ProviderKind::Openrouter
        } else {
            ProviderKind::Google
        };

        let google_mode = if mode == "vertex" {
            GoogleApiMode::Vertex
        } else {
            GoogleApiMode::Imagen
        };

        let base_url = env_var("OPENROUTER_BASE_URL")
            .map(|raw| raw.parse::<url::Url>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("invalid OPENROUTER_BASE_URL: {e}"))?;

        let listen_address = env_var("THUMBFORGE_LISTEN")
            .map(|raw| raw.parse::<std::net::SocketAddr>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("invalid THUMBFORGE_LISTEN: {e}"))?;

        let config = Self {
            server: ServerConfig {
                listen_address,
                ..ServerConfig::default()
            },
            thumbnail: ThumbnailConfig {
                default_provider,
                google: GoogleConfig {
                    api_key: env_var("GOOGLE_API_KEY").map(SecretString::from),
                    api_url: env_var("GOOGLE_IMAGE_API_URL"),
                    mode: google_mode,
                },
                openrouter: OpenRouterConfig {
                    api_key: env_var("OPENROUTER_API_KEY").map(SecretString::from),
                    model: env_var("OPENROUTER_MODEL").unwrap_or_else(|| DEFAULT_OPENROUTER_MODEL.to_string()),
                    base_url,
                },
                ..ThumbnailConfig::default()
            },
            telemetry: None,
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// Absent provider credentials are not an error here: the broker
    /// reports them on the requests that need them.
    ///
    /// # Errors
    ///
    /// Returns an error if limits or URLs are out of range
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.thumbnail.max_inspiration_bytes == 0 {
            anyhow::bail!("thumbnail.max_inspiration_bytes must be greater than 0");
        }

        if let Some(ref base_url) = self.thumbnail.openrouter.base_url
            && !matches!(base_url.scheme(), "http" | "https")
        {
            anyhow::bail!("thumbnail.openrouter.base_url must be an http(s) URL, got '{base_url}'");
        }

        if let Some(ref telemetry) = self.telemetry
            && !(0.0..=1.0).contains(&telemetry.sampling_rate)
        {
            anyhow::bail!("telemetry.sampling_rate must be between 0.0 and 1.0");
        }

        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}
