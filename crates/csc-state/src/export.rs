//! Renderers for the TXT, CSV and XLSX exports.

use std::path::Path;

use csc_core::TabularRow;
use rust_xlsxwriter::Workbook;

use crate::schema::AppState;
use crate::{PersistResult, PersistenceError, legacy};

const TABLE_HEADER: [&str; 3] = ["Formula", "Molar Mass", "Mass"];

/// Plain-text body of a TXT export.
///
/// Older snapshots carry the serialized result in `results`; its details are
/// exported instead of the raw JSON.
pub fn text_report(state: &AppState) -> PersistResult<String> {
    let results = state.results.as_deref().unwrap_or_default();
    let text = match legacy::embedded_result(results) {
        Some(result) if result.success => result.details,
        _ => results.to_string(),
    };
    if text.trim().is_empty() {
        return Err(PersistenceError::MissingResults);
    }
    Ok(text)
}

pub fn csv_table(rows: &[TabularRow]) -> String {
    let mut out = TABLE_HEADER.join(",");
    out.push('\n');
    for row in rows {
        out.push_str(&csv_field(&row.formula));
        out.push(',');
        out.push_str(&row.molar.to_string());
        out.push(',');
        out.push_str(&row.masses.to_string());
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Write the table to a single-sheet workbook.
pub fn write_xlsx(rows: &[TabularRow], path: &Path) -> PersistResult<()> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("Sheet1")?;

    for (col, title) in (0u16..).zip(TABLE_HEADER) {
        sheet.write_string(0, col, title)?;
    }
    for (row_idx, row) in (1u32..).zip(rows) {
        sheet.write_string(row_idx, 0, &row.formula)?;
        sheet.write_number(row_idx, 1, row.molar)?;
        sheet.write_number(row_idx, 2, row.masses)?;
    }

    workbook.save(path)?;
    Ok(())
}

/// Table rows to export, falling back to a legacy embedded result.
pub fn table_rows(state: &AppState) -> Vec<TabularRow> {
    if !state.tabular.is_empty() {
        return state.tabular.clone();
    }
    state
        .results
        .as_deref()
        .and_then(legacy::embedded_result)
        .filter(|result| result.success)
        .map(|result| result.tabular)
        .unwrap_or_default()
}
