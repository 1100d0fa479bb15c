//! HTTP error mapping. Every failure body is `{"error": "..."}`.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use civic_proposal_core::{DocumentError, ProposalError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ProposalError),
    #[error("잘못된 요청 형식입니다: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(e) => {
                tracing::info!(field = e.field(), "request rejected");
                StatusCode::BAD_REQUEST
            }
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Document(e) => {
                tracing::error!(error = %e, "document rendering failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = match &self {
            ApiError::Document(_) => "제안서 파일을 생성하지 못했습니다.".to_string(),
            ApiError::Internal(_) => "서버 내부 오류가 발생했습니다.".to_string(),
            other => other.to_string(),
        };
        (status, Json(serde_json::json!({ "error": body }))).into_response()
    }
}
