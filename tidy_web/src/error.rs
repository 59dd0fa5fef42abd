use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tidy::domain::core::Rejection;

/// ハンドラが返すエラー。本文は `{error, code}` の JSON。
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// 予約の受付チェックに通らなかった
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::Rejected(rejection) if rejection.is_conflict() => {
                (StatusCode::CONFLICT, "CONFLICT")
            }
            ApiError::Rejected(_) => (StatusCode::UNPROCESSABLE_ENTITY, "REJECTED"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        };
        let body = json!({
            "error": self.to_string(),
            "code": code,
        });
        (status, Json(body)).into_response()
    }
}
