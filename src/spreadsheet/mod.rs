//! Reading uploaded spreadsheets into heading-keyed rows.
//!
//! The first row of the first sheet holds the headings. Each heading is
//! slugged (`"Created By"` becomes `created_by`) and every later row becomes a
//! map from slugged heading to the cell's text. Empty cells are left out of
//! the map, so callers see them as absent.
//!
//! Line numbers are the sheet's own: an xlsx whose used range starts below
//! row 1 reports its rows where the spreadsheet program shows them.

use std::collections::HashMap;
use std::fmt;
use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

/// One data row, keyed by slugged heading.
pub type HeadingRow = HashMap<String, String>;

/// A data row together with its 1-based position in the sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub line: usize,
    pub cells: HeadingRow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Xlsx,
    Csv,
}

impl SheetFormat {
    /// Accepted upload types, matched on the file name's extension.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, extension) = file_name.rsplit_once('.')?;
        match extension.to_ascii_lowercase().as_str() {
            "xlsx" => Some(SheetFormat::Xlsx),
            "csv" => Some(SheetFormat::Csv),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum SheetError {
    Xlsx(calamine::XlsxError),
    Csv(csv::Error),
    NoWorksheet,
}

impl fmt::Display for SheetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SheetError::Xlsx(e) => write!(f, "unreadable xlsx file: {e}"),
            SheetError::Csv(e) => write!(f, "unreadable csv file: {e}"),
            SheetError::NoWorksheet => f.write_str("workbook has no worksheets"),
        }
    }
}

impl std::error::Error for SheetError {}

impl From<calamine::XlsxError> for SheetError {
    fn from(err: calamine::XlsxError) -> Self {
        SheetError::Xlsx(err)
    }
}

impl From<csv::Error> for SheetError {
    fn from(err: csv::Error) -> Self {
        SheetError::Csv(err)
    }
}

pub fn read_rows(format: SheetFormat, bytes: &[u8]) -> Result<Vec<SheetRow>, SheetError> {
    let (header_line, grid) = match format {
        SheetFormat::Xlsx => read_xlsx_grid(bytes)?,
        SheetFormat::Csv => (1, read_csv_grid(bytes)?),
    };
    Ok(keyed_rows(header_line, grid))
}

/// Returns the 1-based sheet row of the used range's first row with the grid.
fn read_xlsx_grid(bytes: &[u8]) -> Result<(usize, Vec<Vec<String>>), SheetError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::NoWorksheet)??;

    let first_row = range.start().map_or(0, |(row, _)| row as usize);
    let grid = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    Ok((first_row + 1, grid))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn read_csv_grid(bytes: &[u8]) -> Result<Vec<Vec<String>>, SheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(str::to_string).collect());
    }
    Ok(grid)
}

fn keyed_rows(header_line: usize, grid: Vec<Vec<String>>) -> Vec<SheetRow> {
    let mut lines = grid.into_iter();
    let Some(header) = lines.next() else {
        return Vec::new();
    };
    let headings: Vec<String> = header.iter().map(|h| slug_heading(h)).collect();

    lines
        .enumerate()
        .filter_map(|(offset, cells)| {
            let keyed: HeadingRow = headings
                .iter()
                .zip(cells)
                .filter(|(heading, value)| !heading.is_empty() && !value.trim().is_empty())
                .map(|(heading, value)| (heading.clone(), value))
                .collect();

            (!keyed.is_empty()).then(|| SheetRow {
                line: header_line + offset + 1,
                cells: keyed,
            })
        })
        .collect()
}

/// Lower-cases a heading and joins its words with `_`, dropping punctuation.
///
/// Letters outside ASCII are kept as they are (`"Prix Unité"` becomes
/// `prix_unité`), so such headings match no product column.
pub fn slug_heading(heading: &str) -> String {
    let mut slug = String::with_capacity(heading.len());
    let mut pending_separator = false;

    for ch in heading.trim_start_matches('\u{feff}').chars() {
        if ch == '@' {
            if !slug.is_empty() {
                slug.push('_');
            }
            slug.push_str("at");
            pending_separator = true;
        } else if ch.is_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('_');
            }
            pending_separator = false;
            slug.extend(ch.to_lowercase());
        } else if ch.is_whitespace() || ch == '_' || ch == '-' {
            pending_separator = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("name", "name")]
    #[case("Name", "name")]
    #[case("Created By", "created_by")]
    #[case("  Updated   At ", "updated_at")]
    #[case("unit-price", "unit_price")]
    #[case("Price ($)", "price")]
    #[case("\u{feff}ID", "id")]
    #[case("contact@home", "contact_at_home")]
    #[case("Prix Unité", "prix_unité")]
    #[case("", "")]
    fn headings_are_slugged(#[case] heading: &str, #[case] expected: &str) {
        assert_eq!(slug_heading(heading), expected);
    }

    #[rstest]
    #[case("products.xlsx", Some(SheetFormat::Xlsx))]
    #[case("PRODUCTS.CSV", Some(SheetFormat::Csv))]
    #[case("archive.tar.csv", Some(SheetFormat::Csv))]
    #[case("products.xls", None)]
    #[case("products", None)]
    fn upload_formats_follow_the_extension(#[case] file_name: &str, #[case] expected: Option<SheetFormat>) {
        assert_eq!(SheetFormat::from_file_name(file_name), expected);
    }

    #[test]
    fn csv_rows_are_keyed_by_heading_and_skip_blank_cells() {
        let csv = "Name,Description,Price\nMilk,,1.20\n,,\nButter,Salted\n";
        let rows = read_rows(SheetFormat::Csv, csv.as_bytes()).expect("csv should parse");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line, 2);
        assert_eq!(rows[0].cells.get("name").map(String::as_str), Some("Milk"));
        assert_eq!(rows[0].cells.get("price").map(String::as_str), Some("1.20"));
        assert!(!rows[0].cells.contains_key("description"));

        assert_eq!(rows[1].line, 4);
        assert_eq!(rows[1].cells.get("description").map(String::as_str), Some("Salted"));
        assert!(!rows[1].cells.contains_key("price"));
    }

    #[test]
    fn header_only_file_yields_no_rows() {
        let rows = read_rows(SheetFormat::Csv, b"name,price\n").expect("csv should parse");
        assert!(rows.is_empty());
    }

    #[test]
    fn xlsx_rows_are_read_from_the_first_sheet() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "Name").unwrap();
        sheet.write_string(0, 1, "Price").unwrap();
        sheet.write_string(1, 0, "Cheese").unwrap();
        sheet.write_number(1, 1, 4.5).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let rows = read_rows(SheetFormat::Xlsx, &bytes).expect("xlsx should parse");

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells.get("name").map(String::as_str), Some("Cheese"));
        assert_eq!(rows[0].cells.get("price").map(String::as_str), Some("4.5"));
    }

    #[test]
    fn xlsx_lines_follow_the_used_range_start() {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(2, 0, "Name").unwrap();
        sheet.write_string(2, 1, "Price").unwrap();
        sheet.write_string(3, 0, "Milk").unwrap();
        sheet.write_string(5, 0, "Cream").unwrap();
        sheet.write_string(5, 1, "lots").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let rows = read_rows(SheetFormat::Xlsx, &bytes).expect("xlsx should parse");

        // Header sits on sheet row 3.
        let lines: Vec<usize> = rows.iter().map(|row| row.line).collect();
        assert_eq!(lines, vec![4, 6]);
        assert_eq!(rows[1].cells.get("price").map(String::as_str), Some("lots"));
    }

    #[test]
    fn garbage_bytes_are_not_a_workbook() {
        assert!(read_rows(SheetFormat::Xlsx, b"not a zip archive").is_err());
    }
}
