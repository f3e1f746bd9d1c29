use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use dashboard_types::api::ErrorResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Permission denied")]
    PermissionDenied,

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Unreadable request body: {0}")]
    UnreadableBody(axum::Error),

    #[error(transparent)]
    Rejected(#[from] JsonRejection),

    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] serde_json::Error),

    #[error("database error: {0:#}")]
    Database(#[from] anyhow::Error),

    #[error("spawn_blocking join error: {0}")]
    Blocking(#[from] tokio::task::JoinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::Rejected(rejection) => return rejection.into_response(),
            ApiError::PermissionDenied => StatusCode::FORBIDDEN,
            ApiError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::UnreadableBody(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Database(_) | ApiError::Blocking(_) => {
                error!("{}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Internal causes stay in the log.
        let message = match status {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::PermissionDenied.into_response().status(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::PayloadTooLarge.into_response().status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        let invalid = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        assert_eq!(
            ApiError::InvalidBody(invalid).into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ApiError::Database(anyhow::anyhow!("disk full")).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
