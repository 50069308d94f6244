#![cfg(feature = "excel")]

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::{LoadError, LoadResult};
use crate::types::{format_number, CellValue, RawRow, RawTable};

/// Read one sheet of a workbook (`.xlsx`, `.xls`, `.ods`, ...) into a [`RawTable`].
///
/// Behavior:
/// - Picks `sheet_name` if provided; otherwise uses the first sheet in the workbook
/// - Treats the first non-empty row as the header row
/// - Numeric cells stay numeric; date cells become ISO text
pub fn read_excel_from_path(path: impl AsRef<Path>, sheet_name: Option<&str>) -> LoadResult<RawTable> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet = match sheet_name {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| LoadError::format("workbook has no sheets"))?,
    };

    let range = workbook.worksheet_range(&sheet)?;
    table_from_range(&sheet, &range)
}

fn table_from_range(sheet: &str, range: &calamine::Range<Data>) -> LoadResult<RawTable> {
    let mut rows_iter = range
        .rows()
        .skip_while(|row| row.iter().all(|c| matches!(c, Data::Empty)));

    let header: Vec<String> = rows_iter
        .next()
        .ok_or_else(|| {
            LoadError::format(format!(
                "sheet '{sheet}' has no non-empty rows (no header row found)"
            ))
        })?
        .iter()
        .map(cell_to_header_string)
        .collect();

    let rows = rows_iter
        .map(|row| {
            RawRow::from_pairs(
                header
                    .iter()
                    .zip(row.iter())
                    .filter(|(h, _)| !h.is_empty())
                    .map(|(h, c)| (h.clone(), convert_cell(c))),
            )
        })
        .collect();

    Ok(RawTable::new(header, rows))
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => d.date().format("%Y-%m-%d").to_string(),
            None => dt.to_string(),
        },
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn convert_cell(c: &Data) -> CellValue {
    match c {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::from_text(s.as_str()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => CellValue::Text(d.date().format("%Y-%m-%d").to_string()),
            None => CellValue::Empty,
        },
        Data::DateTimeIso(s) => CellValue::from_text(s.as_str()),
        other => CellValue::from_text(other.to_string()),
    }
}
