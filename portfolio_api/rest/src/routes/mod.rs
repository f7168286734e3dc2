use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::models::ApiError;

pub mod contact;
pub mod health;
pub mod index;

pub fn internal_server_error(err: impl Into<anyhow::Error>) -> Response {
    let err = err.into();
    tracing::error!("internal server error: {err:#}");
    error(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error.")
}

fn error(code: StatusCode, error: impl Into<String>) -> Response {
    (
        code,
        Json(ApiError {
            error: error.into(),
            field: None,
        }),
    )
        .into_response()
}
