use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, BrokerError>;

/// Thumbnail broker errors with their HTTP mapping
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Missing or malformed caller input
    #[error("{0}")]
    Validation(String),

    /// Credentials or endpoints absent, or an unknown provider tag
    #[error("{0}")]
    Configuration(String),

    /// Provider answered with a failure or a payload without an image
    #[error("{message}")]
    Upstream {
        status: u16,
        message: String,
        /// Raw upstream body, only attached when no image could be located
        debug: Option<Value>,
    },

    /// Transport failure before any upstream response
    #[error("{0}")]
    Connection(String),
}

impl BrokerError {
    /// Error for a successful upstream reply that carried no usable image
    pub(crate) fn no_image(message: impl Into<String>, debug: Option<Value>) -> Self {
        Self::Upstream {
            status: StatusCode::BAD_GATEWAY.as_u16(),
            message: message.into(),
            debug,
        }
    }

    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Configuration(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { status, .. } => StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            Self::Connection(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Short label used for logs and metric attributes
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Configuration(_) => "configuration_error",
            Self::Upstream { .. } => "upstream_error",
            Self::Connection(_) => "connection_error",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    debug: Option<Value>,
}

impl IntoResponse for BrokerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = self.to_string();

        let debug = match self {
            Self::Upstream { debug, .. } => debug,
            _ => None,
        };

        (status, Json(ErrorBody { error, debug })).into_response()
    }
}
