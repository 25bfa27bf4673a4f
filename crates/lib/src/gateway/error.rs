//! Gateway error responses.

use super::protocol::ErrorResponse;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Body was not valid JSON or missed required fields.
    #[error("malformed request: {0}")]
    MalformedClientRequest(String),
    #[error("Failed to get response from Komorebi")]
    CompletionUnavailable,
    /// Raw provider text, surfaced verbatim.
    #[error("{0}")]
    ImageGenerationFailed(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::MalformedClientRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::CompletionUnavailable => StatusCode::BAD_GATEWAY,
            GatewayError::ImageGenerationFailed(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            // Image failures are plain text so the client can tell them apart from a success payload.
            GatewayError::ImageGenerationFailed(raw) => (
                status,
                [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
                raw,
            )
                .into_response(),
            other => (
                status,
                Json(ErrorResponse {
                    error: other.to_string(),
                }),
            )
                .into_response(),
        }
    }
}
