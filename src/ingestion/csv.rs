//! CSV ingestion implementation.

use std::path::Path;

use crate::error::{LoadError, LoadResult};
use crate::types::{CellValue, RawRow, RawTable};

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    // Exports often end with footnote lines that have fewer fields than the header.
    builder.has_headers(true).flexible(true);
    builder
}

/// Read a CSV file into a [`RawTable`].
///
/// Rules:
///
/// - The first record is the header.
/// - Records may be shorter than the header; missing trailing cells read as empty.
/// - Cells are kept as text; blank cells become [`CellValue::Empty`].
pub fn read_csv_from_path(path: impl AsRef<Path>) -> LoadResult<RawTable> {
    let mut rdr = reader_builder().from_path(path)?;
    read_csv_from_reader(&mut rdr)
}

/// Read CSV text held in memory.
pub fn read_csv_from_str(input: &str) -> LoadResult<RawTable> {
    let mut rdr = reader_builder().from_reader(input.as_bytes());
    read_csv_from_reader(&mut rdr)
}

/// Read CSV data from an existing CSV reader (configured by the caller).
pub fn read_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> LoadResult<RawTable> {
    let header: Vec<String> = rdr.headers()?.iter().map(str::to_owned).collect();
    if header.iter().all(|h| h.trim().is_empty()) {
        return Err(LoadError::format("csv input has no header row"));
    }

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let row = RawRow::from_pairs(
            header
                .iter()
                .zip(record.iter())
                .map(|(h, cell)| (h.clone(), CellValue::from_text(cell))),
        );
        rows.push(row);
    }

    Ok(RawTable::new(header, rows))
}

#[cfg(test)]
mod tests {
    use super::read_csv_from_str;
    use crate::types::CellValue;

    #[test]
    fn short_footnote_records_are_tolerated() {
        let table = read_csv_from_str("city,date,index\nX,2021-01,50\nSource: FHFA\n").unwrap();
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[1].get("city"), &CellValue::Text("Source: FHFA".to_string()));
        assert!(table.rows[1].get("index").is_empty());
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = read_csv_from_str("").unwrap_err();
        assert!(err.to_string().contains("no header row"));
    }
}
