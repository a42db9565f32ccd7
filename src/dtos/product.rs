// src/dtos/product.rs
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::imports::products::parse_price;
use crate::models::product::{normalize_price, Product, ProductStatus};

/// Body of the add/edit form. Fields stay optional so missing ones become
/// validation messages rather than extractor rejections.
#[derive(Debug, Default, Deserialize)]
pub struct ProductForm {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<String>,
    pub status: Option<String>,
}

/// Form input that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidProductForm {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub status: ProductStatus,
}

impl ProductForm {
    /// `name` required, `price` required and numeric, `status` one of active/inactive.
    pub fn validate(self) -> Result<ValidProductForm, AppError> {
        let mut errors = BTreeMap::new();

        let name = filled(self.name);
        if name.is_none() {
            errors.insert("name", "The name field is required.".to_string());
        }

        let price = match filled(self.price) {
            None => {
                errors.insert("price", "The price field is required.".to_string());
                None
            }
            Some(raw) => {
                let parsed = parse_price(&raw);
                if parsed.is_none() {
                    errors.insert("price", "The price field must be a number.".to_string());
                }
                parsed
            }
        };

        let status = match filled(self.status).as_deref() {
            None => {
                errors.insert("status", "The status field is required.".to_string());
                None
            }
            Some("active") => Some(ProductStatus::Active),
            Some("inactive") => Some(ProductStatus::Inactive),
            Some(_) => {
                errors.insert("status", "The selected status is invalid.".to_string());
                None
            }
        };

        match (name, price, status) {
            (Some(name), Some(price), Some(status)) if errors.is_empty() => Ok(ValidProductForm {
                name,
                description: filled(self.description),
                price: normalize_price(price),
                status,
            }),
            _ => Err(AppError::invalid_fields(errors)),
        }
    }
}

/// Trimmed value, with empty strings treated as absent.
fn filled(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub status: ProductStatus,
    pub created_by: Option<i32>,
    pub updated_by: Option<i32>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Convert from Model to Response DTO
impl From<Product> for ProductResponse {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            status: product.status,
            created_by: product.created_by,
            updated_by: product.updated_by,
            deleted_at: product.deleted_at,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    pub flash: Option<String>,
}
