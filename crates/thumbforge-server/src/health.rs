use axum::response::IntoResponse;
use http::StatusCode;

/// Liveness probe handler
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
