use axum::{routing, Router};

pub fn router() -> Router<()> {
    Router::new().route("/", routing::get(index))
}

async fn index() -> &'static str {
    "Contact API is running."
}
