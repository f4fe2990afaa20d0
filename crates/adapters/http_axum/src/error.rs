//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use afterglow_domain::error::AfterglowError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`AfterglowError`] to an HTTP response with appropriate status code.
pub struct ApiError(AfterglowError);

impl From<AfterglowError> for ApiError {
    fn from(err: AfterglowError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AfterglowError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AfterglowError::CapabilityUnsupported(err) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            AfterglowError::DeviceUnavailable(err) => {
                tracing::warn!(error = %err, "upstream device unavailable");
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            AfterglowError::StaleHandle(err) => {
                tracing::error!(error = %err, "stale handle leaked to the API layer");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
