use std::path::PathBuf;

use clap::Parser;

/// Thumbforge thumbnail broker
#[derive(Debug, Parser)]
#[command(name = "thumbforge", about = "Thumbnail generation broker for Google and OpenRouter image models")]
pub struct Args {
    /// Path to configuration file, environment variables are used when it is absent
    #[arg(short, long, default_value = "thumbforge.toml", env = "THUMBFORGE_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "THUMBFORGE_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,

    /// Log filter directive
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    pub log_filter: String,
}
