pub mod products;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn create_router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "Product Catalogue" }))
        .route("/health", get(health_check))
        .merge(products::routes(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
}

async fn health_check() -> &'static str {
    "OK"
}
