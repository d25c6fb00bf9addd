use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

/// Status code of every rejected request.
pub const REJECTED: u16 = 210;

/// A failed request, rendered as `{"message": ...}`.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Invalid input or a constraint violation (status 210).
    #[error("{0}")]
    Rejected(String),

    /// Any other failure (status 500).
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Rejected(_) => StatusCode::from_u16(REJECTED).unwrap_or(StatusCode::BAD_REQUEST),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_use_210() {
        assert_eq!(ApiError::Rejected("no".to_string()).status().as_u16(), 210);
        assert_eq!(ApiError::Internal("db down".to_string()).status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
