//! HTTP error mapping for the daemon.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rollcall_core::StoreError;
use rollcall_protocol::ErrorBody;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing name/status or an undecodable record.
    #[error("{0}")]
    BadRequest(String),

    #[error("Failed to read data")]
    ReadFailed,

    #[error("Failed to update status")]
    UpdateFailed,

    #[error("Failed to delete status")]
    DeleteFailed,
}

impl ApiError {
    /// Maps a store failure during a write; bad input stays a 400.
    pub fn from_write(err: StoreError, fallback: ApiError) -> Self {
        match err {
            StoreError::InvalidInput(message) => ApiError::BadRequest(message),
            StoreError::Unavailable(_) => fallback,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ReadFailed | ApiError::UpdateFailed | ApiError::DeleteFailed => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_failures_keep_bad_input_as_400() {
        let err = ApiError::from_write(
            StoreError::InvalidInput("Name and status are required".into()),
            ApiError::UpdateFailed,
        );
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Name and status are required");

        let err = ApiError::from_write(
            StoreError::Unavailable("disk full".into()),
            ApiError::DeleteFailed,
        );
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "Failed to delete status");
    }

    #[test]
    fn responses_carry_matching_status() {
        assert_eq!(
            ApiError::ReadFailed.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::BadRequest("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
