#![allow(
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_const_for_fn,
    clippy::module_name_repetitions
)]

//! Thumbnail provider broker
//!
//! Compiles structured creative requests into a single prompt, calls one
//! upstream image provider and normalizes its reply.

mod broker;
mod error;
mod http_client;
mod prompt;
mod provider;
mod request;
mod types;

use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::get};

pub use broker::{Broker, BrokerBuilder};
pub use error::{BrokerError, Result};
pub use prompt::{PromptFields, compile};
pub use types::{DEFAULT_RATIO, ImageSize, StatusResponse, ThumbnailRequest, ThumbnailResponse};

use request::ExtractPayload;

/// Build the thumbnail broker from configuration
///
/// Missing provider credentials do not fail construction, they surface on
/// the requests that need them.
pub fn build_broker(config: &thumbforge_config::Config) -> Arc<Broker> {
    Arc::new(BrokerBuilder::new(&config.thumbnail).build())
}

/// Create the endpoint router for thumbnail generation
pub fn endpoint_router() -> Router<Arc<Broker>> {
    Router::new().route("/api/thumbnail", get(status).post(generate))
}

/// Handle thumbnail generation requests
async fn generate(
    State(broker): State<Arc<Broker>>,
    ExtractPayload(request): ExtractPayload<ThumbnailRequest>,
) -> Result<Json<ThumbnailResponse>> {
    tracing::debug!("Thumbnail handler called, provider: {:?}", request.provider);

    let response = broker.generate(&request).await?;

    Ok(Json(response))
}

/// Report provider configuration without contacting upstream
async fn status(State(broker): State<Arc<Broker>>) -> Json<StatusResponse> {
    Json(broker.status())
}
