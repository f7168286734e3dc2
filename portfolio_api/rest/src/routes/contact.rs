use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse, Response},
    routing, Extension, Json, Router,
};
use portfolio_core_contact_contracts::{
    dispatch::ContactDispatchError, rate_limit::RateLimitStatus, ContactFeatureService,
    ContactSubmitError,
};
use tracing::debug;

use super::{error, internal_server_error};
use crate::{
    middlewares::client_ip::ClientIp,
    models::{
        contact::{ApiContactDispatchError, ApiContactSubmission, ApiContactSuccess},
        ApiError,
    },
};

pub fn router(service: Arc<impl ContactFeatureService>) -> Router<()> {
    Router::new()
        .route("/contact", routing::post(submit))
        .with_state(service)
}

async fn submit(
    service: State<Arc<impl ContactFeatureService>>,
    Extension(client_ip): Extension<ClientIp>,
    headers: HeaderMap,
    submission: Result<Json<ApiContactSubmission>, JsonRejection>,
) -> Response {
    let submission = match submission {
        Ok(Json(submission)) => submission,
        Err(err) => {
            debug!(client_ip = %client_ip.0, "Rejected malformed contact request: {err}");
            return error(StatusCode::BAD_REQUEST, "Invalid request format.");
        }
    };

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|origin| origin.to_str().ok())
        .map(Into::into);

    match service
        .submit(client_ip.0, submission.into(), origin)
        .await
    {
        Ok(receipt) => (
            rate_limit_headers(&receipt.rate_limit),
            Json(ApiContactSuccess {
                success: true,
                message: "Email sent successfully! Thank you for your message.",
                timestamp: receipt.timestamp,
                message_id: receipt.message_id,
            }),
        )
            .into_response(),
        Err(ContactSubmitError::RateLimited(status)) => (
            StatusCode::TOO_MANY_REQUESTS,
            rate_limit_headers(&status),
            AppendHeaders([(header::RETRY_AFTER, status.reset_after_secs().to_string())]),
            Json(ApiError {
                error: "Too many contact requests from this IP, please try again later.".into(),
                field: None,
            }),
        )
            .into_response(),
        Err(ContactSubmitError::Validation(err)) => (
            StatusCode::BAD_REQUEST,
            Json(ApiError {
                error: err.to_string(),
                field: Some(err.field.as_str()),
            }),
        )
            .into_response(),
        Err(ContactSubmitError::Dispatch { error, timestamp }) => (
            dispatch_status(error),
            Json(ApiContactDispatchError {
                success: false,
                error: error.to_string(),
                code: error.code(),
                timestamp,
            }),
        )
            .into_response(),
        Err(ContactSubmitError::Other(err)) => internal_server_error(err),
    }
}

fn rate_limit_headers(status: &RateLimitStatus) -> AppendHeaders<[(&'static str, String); 3]> {
    AppendHeaders([
        ("RateLimit-Limit", status.limit.to_string()),
        ("RateLimit-Remaining", status.remaining.to_string()),
        ("RateLimit-Reset", status.reset_after_secs().to_string()),
    ])
}

fn dispatch_status(error: ContactDispatchError) -> StatusCode {
    match error {
        ContactDispatchError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
        ContactDispatchError::ConnectionRefused => StatusCode::SERVICE_UNAVAILABLE,
        ContactDispatchError::AuthFailure => StatusCode::INTERNAL_SERVER_ERROR,
        ContactDispatchError::TransportTimeout => StatusCode::GATEWAY_TIMEOUT,
        ContactDispatchError::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
