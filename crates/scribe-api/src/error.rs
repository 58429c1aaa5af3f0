use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),

    #[error("blocking task failed: {0}")]
    Blocking(#[from] JoinError),
}

impl ApiError {
    pub fn post_not_found(id: i64) -> Self {
        Self::NotFound(format!("Post {} not found", id))
    }

    pub fn comment_not_found(post_id: i64, comment_id: i64) -> Self {
        Self::NotFound(format!("Comment {} not found on post {}", comment_id, post_id))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Storage(_) | Self::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!("{}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
