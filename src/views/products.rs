// src/views/products.rs
use crate::dtos::product::ProductResponse;

const PAGE_TEMPLATE: &str = include_str!("../../assets/products.html");
pub const PAGE_SCRIPT: &str = include_str!("../../assets/products.js");

/// Message shown above the catalogue after a redirect, keyed by the `flash` query code.
pub fn flash_message(code: &str) -> Option<&'static str> {
    match code {
        "created" => Some("Product Created Successfully"),
        "updated" => Some("Product Updated Successfully"),
        "imported" => Some("Products Imported Successfully"),
        _ => None,
    }
}

/// Renders the catalogue page with the rows embedded for the page script.
pub fn render_index(products: &[ProductResponse], flash: Option<&str>) -> Result<String, serde_json::Error> {
    let products_json = script_safe_json(&serde_json::to_string(products)?);

    let flash_html = flash
        .and_then(flash_message)
        .map(|msg| format!(r#"<div class="alert alert-success">{msg}</div>"#))
        .unwrap_or_default();

    Ok(PAGE_TEMPLATE
        .replace("{{flash}}", &flash_html)
        .replace("{{products_json}}", &products_json))
}

/// Keeps embedded JSON from closing the surrounding `<script>` element.
fn script_safe_json(json: &str) -> String {
    json.replace('<', "\\u003c")
}
