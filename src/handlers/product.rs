// src/handlers/product.rs
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{Html, IntoResponse, Redirect},
    Form, Json,
};
use http::header;
use tracing::{error, info, instrument};

use crate::dtos::product::{DeleteResponse, FlashQuery, ProductForm, ProductResponse};
use crate::error::AppError;
use crate::exports::products::{write_products_xlsx, EXPORT_FILE_NAME, XLSX_CONTENT_TYPE};
use crate::imports::products::products_from_rows;
use crate::models::product::{NewProduct, ProductChanges, SYSTEM_USER_ID};
use crate::spreadsheet::{read_rows, SheetFormat};
use crate::state::AppState;
use crate::views::products::{render_index, PAGE_SCRIPT};

const UPLOAD_FIELD: &str = "file";

/// Ids that are not integers can never match a row.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse().map_err(|_| AppError::not_found("Product not found"))
}

// GET /products - Catalogue page
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<FlashQuery>,
) -> Result<Html<String>, AppError> {
    let products: Vec<ProductResponse> = state
        .products
        .list()
        .await?
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    let page = render_index(&products, query.flash.as_deref())
        .map_err(|e| AppError::internal(format!("Failed to render catalogue: {e}")))?;

    Ok(Html(page))
}

// GET /assets/products.js - Page script
pub async fn page_script() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/javascript; charset=utf-8")], PAGE_SCRIPT)
}

// POST /products/store - Create product from the add form
#[instrument(skip(state, form))]
pub async fn store(
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Redirect, AppError> {
    let valid = form.validate()?;

    let product = state
        .products
        .create(NewProduct {
            name: valid.name,
            description: valid.description,
            price: valid.price,
            status: valid.status,
            created_by: SYSTEM_USER_ID,
        })
        .await?;

    info!(id = product.id, "Product created");
    Ok(Redirect::to("/products?flash=created"))
}

// GET /products/{id}/edit - Fetch a single product as JSON
#[instrument(skip(state))]
pub async fn edit(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ProductResponse>, AppError> {
    let id = parse_id(&id)?;
    let product = state
        .products
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    Ok(Json(ProductResponse::from(product)))
}

// POST /products/{id}/update - Overwrite the editable fields
#[instrument(skip(state, form))]
pub async fn update(
    Path(id): Path<String>,
    State(state): State<AppState>,
    Form(form): Form<ProductForm>,
) -> Result<Redirect, AppError> {
    let id = parse_id(&id)?;

    // Missing rows answer 404 before the form is looked at.
    state
        .products
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    let valid = form.validate()?;

    state
        .products
        .update(
            id,
            ProductChanges {
                name: valid.name,
                description: valid.description,
                price: valid.price,
                status: valid.status,
                updated_by: SYSTEM_USER_ID,
            },
        )
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    info!(id, "Product updated");
    Ok(Redirect::to("/products?flash=updated"))
}

// POST /products/{id}/delete - Soft delete
#[instrument(skip(state))]
pub async fn destroy(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = parse_id(&id)?;

    if !state.products.soft_delete(id, SYSTEM_USER_ID).await? {
        return Err(AppError::not_found("Product not found"));
    }

    info!(id, "Product soft-deleted");
    Ok(Json(DeleteResponse { success: true }))
}

// POST /products/import - Bulk create from an uploaded .xlsx/.csv file
#[instrument(skip(state, multipart))]
pub async fn import(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = upload
        .filter(|(_, bytes)| !bytes.is_empty())
        .ok_or_else(|| file_error("The file field is required."))?;
    let format = SheetFormat::from_file_name(&file_name)
        .ok_or_else(|| file_error("The file field must be a file of type: xlsx, csv."))?;

    let rows = tokio::task::spawn_blocking(move || read_rows(format, &bytes))
        .await
        .map_err(|e| AppError::internal(format!("Import task failed: {e}")))?
        .map_err(|e| {
            error!(error = %e, file = %file_name, "Failed to read uploaded spreadsheet");
            AppError::validation(format!("The file could not be read: {e}"))
        })?;

    let products = products_from_rows(&rows).map_err(|e| AppError::validation(e.to_string()))?;
    let imported = state.products.create_many(products).await?;

    info!(imported, "Products imported");
    Ok(Redirect::to("/products?flash=imported"))
}

fn file_error(message: &str) -> AppError {
    AppError::invalid_fields([(UPLOAD_FIELD, message.to_string())].into())
}

// GET /products/export - Download every row as products.xlsx
#[instrument(skip(state))]
pub async fn export(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = state.products.all_including_trashed().await?;
    let count = products.len();

    let bytes = tokio::task::spawn_blocking(move || write_products_xlsx(&products))
        .await
        .map_err(|e| AppError::internal(format!("Export task failed: {e}")))?
        .map_err(|e| AppError::internal(format!("Failed to build workbook: {e}")))?;

    info!(rows = count, "Products exported");
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
            ),
        ],
        bytes,
    ))
}
