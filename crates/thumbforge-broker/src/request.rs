use axum::{
    body::Body,
    extract::FromRequest,
    http::{self, StatusCode},
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;

use crate::error::BrokerError;

/// Body limit for generation requests
///
/// Inline reference images are capped separately by the broker, this only
/// keeps pathological bodies out of memory.
const BODY_LIMIT_BYTES: usize = 16 << 20;

/// JSON body extractor that answers in the broker's `{error}` shape
pub(crate) struct ExtractPayload<T>(pub T);

impl<S, T: DeserializeOwned> FromRequest<S> for ExtractPayload<T>
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(request: http::Request<Body>, _state: &S) -> Result<Self, Self::Rejection> {
        let bytes = axum::body::to_bytes(request.into_body(), BODY_LIMIT_BYTES)
            .await
            .map_err(|err| {
                if std::error::Error::source(&err).is_some_and(|source| source.is::<http_body_util::LengthLimitError>())
                {
                    let message = format!("Request body is too large, limit is {BODY_LIMIT_BYTES} bytes");
                    (StatusCode::PAYLOAD_TOO_LARGE, axum::Json(serde_json::json!({ "error": message })))
                        .into_response()
                } else {
                    BrokerError::Validation(format!("Failed to read request body: {err}")).into_response()
                }
            })?;

        if bytes.is_empty() {
            return Err(BrokerError::Validation("Prompt is required.".to_string()).into_response());
        }

        serde_json::from_slice::<T>(&bytes)
            .map(ExtractPayload)
            .map_err(|e| BrokerError::Validation(format!("Invalid request body: {e}")).into_response())
    }
}
