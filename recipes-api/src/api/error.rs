//! API error responses
//!
//! Every failure is answered as `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Recipe API errors
#[derive(Debug)]
pub enum ApiError {
    /// Request body could not be decoded
    BadRequest(String),
    /// No recipe has the requested id
    NotFound,
    /// Storage failure; message is safe to show the caller
    Storage(String),
    /// Failure whose details stay in the log
    Internal(&'static str),
}

impl From<recipes_common::Error> for ApiError {
    fn from(err: recipes_common::Error) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Recipe not found".to_string()),
            ApiError::Storage(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.to_string()),
        };

        let body = Json(json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::BadRequest("bad".into()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound, StatusCode::NOT_FOUND),
            (ApiError::Storage("down".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::Internal("oops"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_common_error_becomes_storage() {
        let err = ApiError::from(recipes_common::Error::Internal("disk full".into()));
        match err {
            ApiError::Storage(msg) => assert_eq!(msg, "Internal error: disk full"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
