use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use crate::handlers::product::{
    destroy, edit, export, import, index, page_script, store, update,
};
use crate::state::AppState;

pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    let uploads = Router::new()
        .route("/products/import", post(import))
        .layer(DefaultBodyLimit::max(max_upload_bytes));

    Router::new()
        .route("/products", get(index))
        .route("/products/store", post(store))
        .route("/products/export", get(export))
        .route("/products/{id}/edit", get(edit))
        .route("/products/{id}/update", post(update))
        .route("/products/{id}/delete", post(destroy))
        .route("/assets/products.js", get(page_script))
        .merge(uploads)
}

#[cfg(test)]
#[path = "products_tests.rs"]
mod tests;
