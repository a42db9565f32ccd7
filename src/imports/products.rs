// src/imports/products.rs
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::models::product::{normalize_price, NewProduct, ProductStatus, SYSTEM_USER_ID};
use crate::spreadsheet::{HeadingRow, SheetRow};

/// A row the typed model cannot hold.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Row {}: {}", self.line, self.message)
    }
}

/// Builds a new product from one heading-keyed row.
///
/// `name` and `description` pass through, `price` defaults to `0`, `status`
/// defaults to `active`. Any other heading is ignored.
pub fn product_from_row(row: &HeadingRow) -> Result<NewProduct, String> {
    let name = row
        .get("name")
        .map(|v| v.trim().to_string())
        .ok_or("name is missing")?;

    let price = match row.get("price") {
        Some(raw) => parse_price(raw).ok_or_else(|| format!("price '{raw}' is not a number"))?,
        None => Decimal::ZERO,
    };

    let status = match row.get("status") {
        Some(raw) => ProductStatus::from_str(raw.trim().to_ascii_lowercase().as_str())?,
        None => ProductStatus::Active,
    };

    Ok(NewProduct {
        name,
        description: row.get("description").map(|v| v.trim().to_string()),
        price: normalize_price(price),
        status,
        created_by: SYSTEM_USER_ID,
    })
}

/// Maps every row, stopping at the first one that cannot be stored.
pub fn products_from_rows(rows: &[SheetRow]) -> Result<Vec<NewProduct>, RowError> {
    rows.iter()
        .map(|row| {
            product_from_row(&row.cells).map_err(|message| RowError {
                line: row.line,
                message,
            })
        })
        .collect()
}

/// Accepts plain decimals and scientific notation (spreadsheets emit `1E3`).
pub fn parse_price(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if !is_numeric_literal(trimmed) {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// `[+-]digits[.digits][e[+-]digits]`, with either side of the point allowed to be empty
/// but not both. `Decimal::from_str` alone also takes digit separators like `1_000`.
fn is_numeric_literal(s: &str) -> bool {
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(at) => (&s[..at], Some(&s[at + 1..])),
        None => (s, None),
    };

    let unsigned = mantissa.strip_prefix(['+', '-']).unwrap_or(mantissa);
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) || !all_digits(fraction) || whole.len() + fraction.len() == 0 {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
            !digits.is_empty() && all_digits(digits)
        }
    }
}
