use std::collections::HashSet;
use std::io::Cursor;

use actix_web::HttpResponse;
use actix_web::http::header;
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use chrono::{NaiveDateTime, NaiveTime};
use derive_more::Display;
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use serde_json::Value;

use crate::utils::db_utils::Record;

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// One cell of a hand-built table sheet.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Blank,
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Number(v as f64)
    }
}

/// Column set of a record sheet: every key seen, in order of first appearance.
pub fn columns(records: &[Record]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }
    columns
}

/// ===============================
/// Workbook writer
/// ===============================
pub struct XlsxExport {
    workbook: Workbook,
}

impl Default for XlsxExport {
    fn default() -> Self {
        Self::new()
    }
}

impl XlsxExport {
    pub fn new() -> Self {
        Self {
            workbook: Workbook::new(),
        }
    }

    /// Header row of column names, then one row per record. Missing keys and
    /// nulls stay blank.
    pub fn records_sheet(&mut self, name: &str, records: &[Record]) -> Result<&mut Self, XlsxError> {
        let mut sheet = Worksheet::new();
        sheet.set_name(name)?;

        let columns = columns(records);
        for (col, column) in columns.iter().enumerate() {
            sheet.write_string(0, col as u16, column)?;
        }
        for (index, record) in records.iter().enumerate() {
            let row = index as u32 + 1;
            for (col, column) in columns.iter().enumerate() {
                if let Some(value) = record.get(column) {
                    write_value(&mut sheet, row, col as u16, value)?;
                }
            }
        }

        self.workbook.push_worksheet(sheet);
        Ok(self)
    }

    /// Rows written as given; an empty row leaves a blank separator line.
    pub fn table_sheet(&mut self, name: &str, rows: &[Vec<Cell>]) -> Result<&mut Self, XlsxError> {
        let mut sheet = Worksheet::new();
        sheet.set_name(name)?;

        for (r, cells) in rows.iter().enumerate() {
            for (c, cell) in cells.iter().enumerate() {
                let (row, col) = (r as u32, c as u16);
                match cell {
                    Cell::Text(text) => {
                        sheet.write_string(row, col, text)?;
                    }
                    Cell::Number(number) => {
                        sheet.write_number(row, col, *number)?;
                    }
                    Cell::Blank => {}
                }
            }
        }

        self.workbook.push_worksheet(sheet);
        Ok(self)
    }

    pub fn into_bytes(mut self) -> Result<Vec<u8>, XlsxError> {
        self.workbook.save_to_buffer()
    }
}

fn write_value(sheet: &mut Worksheet, row: u32, col: u16, value: &Value) -> Result<(), XlsxError> {
    match value {
        Value::Null => {}
        Value::Bool(b) => {
            sheet.write_boolean(row, col, *b)?;
        }
        Value::Number(n) => match n.as_f64() {
            Some(f) => {
                sheet.write_number(row, col, f)?;
            }
            None => {
                sheet.write_string(row, col, n.to_string())?;
            }
        },
        Value::String(s) => {
            sheet.write_string(row, col, s)?;
        }
        other => {
            sheet.write_string(row, col, other.to_string())?;
        }
    }
    Ok(())
}

/// `companies_2025-01-01_2025-12-31_customer_4.xlsx`
pub fn file_name(parts: &[&str], customer_id: Option<u64>, location_id: Option<u64>) -> String {
    let mut name: Vec<String> = parts
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.to_string())
        .collect();
    if let Some(id) = customer_id {
        name.push(format!("customer_{id}"));
    }
    if let Some(id) = location_id {
        name.push(format!("location_{id}"));
    }
    format!("{}.xlsx", name.join("_"))
}

/// Binary attachment response for a finished workbook.
pub fn attachment(file_name: &str, bytes: Vec<u8>) -> HttpResponse {
    HttpResponse::Ok()
        .content_type(XLSX_CONTENT_TYPE)
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        ))
        .body(bytes)
}

/// ===============================
/// Upload reader
/// ===============================
#[derive(Debug, Display, PartialEq)]
pub enum UploadError {
    #[display(fmt = "Uploaded file is not a readable Excel workbook.")]
    Unreadable,
    #[display(fmt = "Uploaded workbook has no sheets.")]
    NoSheets,
    #[display(fmt = "Uploaded sheet is empty.")]
    EmptySheet,
}

/// Reads the first sheet: the first row names the columns, every later
/// non-blank row becomes a record of display strings (empty cells are `""`).
pub fn read_first_sheet(bytes: Vec<u8>) -> Result<Vec<Record>, UploadError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|_| UploadError::Unreadable)?;

    let first = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(UploadError::NoSheets)?;
    let range = workbook
        .worksheet_range(&first)
        .map_err(|_| UploadError::Unreadable)?;

    let mut rows = range.rows();
    let header = match rows.next() {
        Some(cells) => header_names(cells),
        None => return Err(UploadError::EmptySheet),
    };

    let records: Vec<Record> = rows
        .filter(|cells| cells.iter().any(|c| !cell_text(c).is_empty()))
        .map(|cells| {
            header
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let text = cells.get(i).map(cell_text).unwrap_or_default();
                    (name.clone(), Value::String(text))
                })
                .collect()
        })
        .collect();

    if records.is_empty() {
        return Err(UploadError::EmptySheet);
    }
    Ok(records)
}

/// Column names from the header row. Blank headers become `ColumnN`, and a
/// repeated name gets a `_1`, `_2`, ... suffix so no column is lost.
fn header_names(cells: &[Data]) -> Vec<String> {
    let mut seen = HashSet::new();
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let base = match cell_text(cell) {
                name if name.is_empty() => format!("Column{}", i + 1),
                name => name,
            };
            let mut name = base.clone();
            let mut n = 1;
            while !seen.insert(name.clone()) {
                name = format!("{base}_{n}");
                n += 1;
            }
            name
        })
        .collect()
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::DateTime(dt) if dt.is_datetime() => match dt.as_datetime() {
            Some(value) => date_text(value),
            None => dt.to_string(),
        },
        other => other.to_string().trim().to_string(),
    }
}

/// Date-only cells as `2025-01-01`, anything with a time of day as
/// `2025-01-01 08:30:00`.
fn date_text(value: NaiveDateTime) -> String {
    if value.time() == NaiveTime::MIN {
        value.format("%Y-%m-%d").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
