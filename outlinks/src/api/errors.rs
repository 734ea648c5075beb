use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::service::OutLinkError;
use crate::types::ErrorBody;

#[derive(Debug)]
pub enum ApiError {
    OutLink(OutLinkError),
    BadRequest(String),
    PayloadTooLarge,
}

impl From<OutLinkError> for ApiError {
    fn from(err: OutLinkError) -> Self {
        ApiError::OutLink(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large".to_string(),
            ),
            ApiError::OutLink(
                err @ (OutLinkError::Validation(_) | OutLinkError::MissingParameter(_)),
            ) => (StatusCode::BAD_REQUEST, err.to_string()),
            ApiError::OutLink(err @ OutLinkError::NotFound) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            ApiError::OutLink(OutLinkError::Store(err)) => {
                tracing::error!(error = %err, "Outlink store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
