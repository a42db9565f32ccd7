// src/state.rs
use std::sync::Arc;

use sqlx::PgPool;

use crate::repositories::product::{PgProductRepository, ProductRepository};

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
}

impl AppState {
    pub fn new(db_pool: PgPool) -> Self {
        Self::with_repository(Arc::new(PgProductRepository::new(db_pool)))
    }

    pub fn with_repository(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }
}
