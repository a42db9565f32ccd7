//! In-memory `ProductRepository` used by the handler tests.
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::AppError;
use crate::models::product::{NewProduct, Product, ProductChanges, ProductStatus};
use crate::repositories::product::ProductRepository;

#[derive(Default)]
pub struct InMemoryProductRepository {
    rows: Mutex<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw view of the table, soft-deleted rows included.
    pub fn snapshot(&self) -> Vec<Product> {
        self.rows.lock().expect("repository lock poisoned").clone()
    }

    fn insert(rows: &mut Vec<Product>, product: NewProduct) -> Product {
        let now = Utc::now();
        let created = Product {
            id: rows.last().map_or(1, |last| last.id + 1),
            name: product.name,
            description: product.description,
            price: product.price,
            status: product.status,
            created_by: Some(product.created_by),
            updated_by: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        };
        rows.push(created.clone());
        created
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.snapshot().into_iter().filter(|p| p.deleted_at.is_none()).collect())
    }

    async fn find(&self, id: i64) -> Result<Option<Product>, AppError> {
        Ok(self
            .snapshot()
            .into_iter()
            .find(|p| p.id == id && p.deleted_at.is_none()))
    }

    async fn create(&self, product: NewProduct) -> Result<Product, AppError> {
        let mut rows = self.rows.lock().expect("repository lock poisoned");
        Ok(Self::insert(&mut rows, product))
    }

    async fn create_many(&self, products: Vec<NewProduct>) -> Result<u64, AppError> {
        let mut rows = self.rows.lock().expect("repository lock poisoned");
        let count = products.len() as u64;
        for product in products {
            Self::insert(&mut rows, product);
        }
        Ok(count)
    }

    async fn update(&self, id: i64, changes: ProductChanges) -> Result<Option<Product>, AppError> {
        let mut rows = self.rows.lock().expect("repository lock poisoned");
        let Some(row) = rows.iter_mut().find(|p| p.id == id && p.deleted_at.is_none()) else {
            return Ok(None);
        };
        row.name = changes.name;
        row.description = changes.description;
        row.price = changes.price;
        row.status = changes.status;
        row.updated_by = Some(changes.updated_by);
        row.updated_at = Utc::now();
        Ok(Some(row.clone()))
    }

    async fn soft_delete(&self, id: i64, deleted_by: i32) -> Result<bool, AppError> {
        let mut rows = self.rows.lock().expect("repository lock poisoned");
        let Some(row) = rows.iter_mut().find(|p| p.id == id && p.deleted_at.is_none()) else {
            return Ok(false);
        };
        let now = Utc::now();
        row.status = ProductStatus::Deleted;
        row.updated_by = Some(deleted_by);
        row.deleted_at = Some(now);
        row.updated_at = now;
        Ok(true)
    }

    async fn all_including_trashed(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.snapshot())
    }
}
