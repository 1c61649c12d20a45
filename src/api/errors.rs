use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::query_engine::SearchError;
use crate::query_params::ValidationErrors;

use super::models::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidQuery(#[from] ValidationErrors),

    #[error(transparent)]
    Search(#[from] SearchError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::Search(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            ApiError::InvalidQuery(errors) => ErrorResponse {
                error: "Invalid query parameters".to_string(),
                fields: errors.fields,
            },
            ApiError::Search(_) => ErrorResponse {
                error: "Internal error".to_string(),
                fields: Vec::new(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let invalid = ApiError::from(ValidationErrors { fields: Vec::new() });
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(SearchError::Internal).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
