// src/exports/products.rs
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::models::product::Product;

pub const EXPORT_FILE_NAME: &str = "products.xlsx";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Column headings, in the order the fields are written.
pub const HEADINGS: [&str; 9] = [
    "ID",
    "Name",
    "Description",
    "Price",
    "Status",
    "Created By",
    "Updated By",
    "Created At",
    "Updated At",
];

mod cols {
    pub const ID: u16 = 0;
    pub const NAME: u16 = 1;
    pub const DESCRIPTION: u16 = 2;
    pub const PRICE: u16 = 3;
    pub const STATUS: u16 = 4;
    pub const CREATED_BY: u16 = 5;
    pub const UPDATED_BY: u16 = 6;
    pub const CREATED_AT: u16 = 7;
    pub const UPDATED_AT: u16 = 8;
}

/// Renders every given product under the fixed headings and returns the `.xlsx` bytes.
pub fn write_products_xlsx(products: &[Product]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Products")?;

    let heading = Format::new().set_bold();
    for (col, title) in (0u16..).zip(HEADINGS) {
        worksheet.write_string_with_format(0, col, title, &heading)?;
    }

    let money = Format::new().set_num_format("0.00");
    for (row, product) in (1u32..).zip(products) {
        write_product(worksheet, row, product, &money)?;
    }

    workbook.save_to_buffer()
}

fn write_product(ws: &mut Worksheet, row: u32, product: &Product, money: &Format) -> Result<(), XlsxError> {
    ws.write_number(row, cols::ID, product.id as f64)?;
    ws.write_string(row, cols::NAME, &product.name)?;
    if let Some(description) = &product.description {
        ws.write_string(row, cols::DESCRIPTION, description)?;
    }
    match product.price.to_f64() {
        Some(price) => ws.write_number_with_format(row, cols::PRICE, price, money)?,
        None => ws.write_string(row, cols::PRICE, product.price.to_string())?,
    };
    ws.write_string(row, cols::STATUS, product.status.as_str())?;
    if let Some(created_by) = product.created_by {
        ws.write_number(row, cols::CREATED_BY, f64::from(created_by))?;
    }
    if let Some(updated_by) = product.updated_by {
        ws.write_number(row, cols::UPDATED_BY, f64::from(updated_by))?;
    }
    ws.write_string(row, cols::CREATED_AT, product.created_at.to_rfc3339())?;
    ws.write_string(row, cols::UPDATED_AT, product.updated_at.to_rfc3339())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use calamine::{Data, Reader, Xlsx};
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use crate::models::product::ProductStatus;

    fn product(id: i64, name: &str, status: ProductStatus, trashed: bool) -> Product {
        let stamp = Utc.with_ymd_and_hms(2025, 12, 19, 6, 15, 23).unwrap();
        Product {
            id,
            name: name.to_string(),
            description: None,
            price: Decimal::new(1250, 2),
            status,
            created_by: Some(1),
            updated_by: trashed.then_some(1),
            deleted_at: trashed.then_some(stamp),
            created_at: stamp,
            updated_at: stamp,
        }
    }

    fn read_back(bytes: Vec<u8>) -> Vec<Vec<Data>> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).expect("export should be a workbook");
        let range = workbook
            .worksheet_range_at(0)
            .expect("export should have a sheet")
            .expect("sheet should be readable");
        range.rows().map(|r| r.to_vec()).collect()
    }

    #[test]
    fn export_has_exactly_the_nine_fixed_columns_in_order() {
        let bytes = write_products_xlsx(&[]).expect("export should render");
        let rows = read_back(bytes);

        let headings: Vec<String> = rows[0].iter().map(|c| c.to_string()).collect();
        assert_eq!(headings, HEADINGS.map(str::to_string).to_vec());
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn export_writes_trashed_and_deleted_rows_too() {
        let products = vec![
            product(1, "Milk", ProductStatus::Active, false),
            product(2, "Cream", ProductStatus::Deleted, true),
        ];

        let rows = read_back(write_products_xlsx(&products).expect("export should render"));

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1][cols::ID as usize], Data::Float(1.0));
        assert_eq!(rows[1][cols::NAME as usize], Data::String("Milk".into()));
        assert_eq!(rows[1][cols::PRICE as usize], Data::Float(12.5));
        assert_eq!(rows[2][cols::STATUS as usize], Data::String("deleted".into()));
        assert_eq!(rows[2][cols::UPDATED_BY as usize], Data::Float(1.0));
        assert_eq!(
            rows[2][cols::CREATED_AT as usize],
            Data::String("2025-12-19T06:15:23+00:00".into())
        );
    }
}
