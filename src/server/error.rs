use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

pub type AppResult<T> = Result<T, Error>;

/// Transport-level errors. Orchestrator failures never end up here, they are
/// folded into the scrape response body; this type only covers input
/// validation and anything the pipeline didn't anticipate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    UnprocessableEntity(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Anyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!("internal error surfaced to client: {}", self);
        }

        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
