// src/repositories/product.rs
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use crate::error::AppError;
use crate::models::product::{NewProduct, Product, ProductChanges, ProductStatus};

/// Data access for the `products` table.
///
/// Reads through `list`/`find` only see live rows; `all_including_trashed`
/// is the one query that also returns soft-deleted rows.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Live rows, ascending by id.
    async fn list(&self) -> Result<Vec<Product>, AppError>;

    async fn find(&self, id: i64) -> Result<Option<Product>, AppError>;

    async fn create(&self, product: NewProduct) -> Result<Product, AppError>;

    /// Inserts every row or none of them.
    async fn create_many(&self, products: Vec<NewProduct>) -> Result<u64, AppError>;

    /// Returns `None` when no live row has this id.
    async fn update(&self, id: i64, changes: ProductChanges) -> Result<Option<Product>, AppError>;

    /// Marks the row `deleted` and stamps `deleted_at`. Returns `false` when no live row matched.
    async fn soft_delete(&self, id: i64, deleted_by: i32) -> Result<bool, AppError>;

    /// Every row, tombstoned ones included, ascending by id.
    async fn all_including_trashed(&self) -> Result<Vec<Product>, AppError>;
}

const PRODUCT_COLUMNS: &str = "id, name, description, price, status, created_by, updated_by, \
                               deleted_at, created_at, updated_at";

pub struct PgProductRepository {
    db_pool: PgPool,
}

impl PgProductRepository {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    #[instrument(skip(self))]
    async fn list(&self) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE deleted_at IS NULL ORDER BY id ASC"
        ))
        .fetch_all(&self.db_pool)
        .await?;

        Ok(products)
    }

    #[instrument(skip(self))]
    async fn find(&self, id: i64) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(product)
    }

    #[instrument(skip(self, product))]
    async fn create(&self, product: NewProduct) -> Result<Product, AppError> {
        let created = sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, description, price, status, created_by)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.status)
        .bind(product.created_by)
        .fetch_one(&self.db_pool)
        .await?;

        Ok(created)
    }

    #[instrument(skip(self, products), fields(count = products.len()))]
    async fn create_many(&self, products: Vec<NewProduct>) -> Result<u64, AppError> {
        let mut tx = self.db_pool.begin().await?;
        let mut inserted = 0u64;

        for product in &products {
            let result = sqlx::query(
                "INSERT INTO products (name, description, price, status, created_by)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.status)
            .bind(product.created_by)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }

        tx.commit().await.map_err(AppError::db)?;
        Ok(inserted)
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, id: i64, changes: ProductChanges) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET
                 name = $1,
                 description = $2,
                 price = $3,
                 status = $4,
                 updated_by = $5,
                 updated_at = NOW()
             WHERE id = $6 AND deleted_at IS NULL
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&changes.name)
        .bind(&changes.description)
        .bind(changes.price)
        .bind(changes.status)
        .bind(changes.updated_by)
        .bind(id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(product)
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, id: i64, deleted_by: i32) -> Result<bool, AppError> {
        let mut tx = self.db_pool.begin().await?;

        let marked = sqlx::query(
            "UPDATE products SET status = $1, updated_by = $2, updated_at = NOW()
             WHERE id = $3 AND deleted_at IS NULL",
        )
        .bind(ProductStatus::Deleted)
        .bind(deleted_by)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if marked.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query("UPDATE products SET deleted_at = NOW(), updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn all_including_trashed(&self) -> Result<Vec<Product>, AppError> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id ASC"
        ))
        .fetch_all(&self.db_pool)
        .await?;

        Ok(products)
    }
}

#[cfg(test)]
#[path = "product_tests.rs"]
mod tests;
