use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

/// Headers of contact responses that browser clients may read.
const EXPOSE_HEADERS: [HeaderName; 5] = [
    HeaderName::from_static("ratelimit-limit"),
    HeaderName::from_static("ratelimit-remaining"),
    HeaderName::from_static("ratelimit-reset"),
    header::RETRY_AFTER,
    HeaderName::from_static("x-request-id"),
];

pub fn add<S: Clone + Send + Sync + 'static>(
    allowed_origins: &[HeaderValue],
) -> impl FnOnce(Router<S>) -> Router<S> {
    let allow_origin = if allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(allowed_origins.iter().cloned())
    };

    let layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers(EXPOSE_HEADERS);

    |router| router.layer(layer)
}
