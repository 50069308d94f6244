//! Parquet ingestion implementation.

use std::path::Path;

use chrono::{Days, NaiveDate};
use parquet::file::reader::{ChunkReader, FileReader};
use parquet::file::serialized_reader::SerializedFileReader;
use parquet::record::Field;

use crate::error::LoadResult;
use crate::types::{CellValue, RawRow, RawTable};

/// Read a Parquet file into a [`RawTable`].
///
/// Notes:
/// - The header is the list of leaf column paths, in schema order
/// - Numeric columns become [`CellValue::Number`], strings and dates become text
/// - Uses the Parquet record API (`RowIter`)
pub fn read_parquet_from_path(path: impl AsRef<Path>) -> LoadResult<RawTable> {
    let reader = SerializedFileReader::try_from(path.as_ref())?;
    let header = parquet_leaf_column_paths(&reader);

    let mut rows = Vec::new();
    for row_res in reader.into_iter() {
        let row = row_res?;
        rows.push(RawRow::from_pairs(
            row.get_column_iter()
                .map(|(name, field)| (name.clone(), convert_parquet_field(field))),
        ));
    }

    Ok(RawTable::new(header, rows))
}

fn parquet_leaf_column_paths<R: ChunkReader + 'static>(reader: &SerializedFileReader<R>) -> Vec<String> {
    reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .columns()
        .iter()
        .map(|c| c.path().string())
        .collect()
}

fn convert_parquet_field(f: &Field) -> CellValue {
    match f {
        Field::Null => CellValue::Empty,
        Field::Str(s) => CellValue::from_text(s.as_str()),
        Field::Byte(v) => CellValue::Number(f64::from(*v)),
        Field::Short(v) => CellValue::Number(f64::from(*v)),
        Field::Int(v) => CellValue::Number(f64::from(*v)),
        Field::Long(v) => CellValue::Number(*v as f64),
        Field::UByte(v) => CellValue::Number(f64::from(*v)),
        Field::UShort(v) => CellValue::Number(f64::from(*v)),
        Field::UInt(v) => CellValue::Number(f64::from(*v)),
        Field::ULong(v) => CellValue::Number(*v as f64),
        Field::Float(v) => CellValue::Number(f64::from(*v)),
        Field::Double(v) => CellValue::Number(*v),
        Field::Date(days) => date_from_epoch_days(*days).map_or(CellValue::Empty, |d| {
            CellValue::Text(d.format("%Y-%m-%d").to_string())
        }),
        other => CellValue::from_text(other.to_string()),
    }
}

/// Parquet `DATE` is days since 1970-01-01.
fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    if days >= 0 {
        epoch.checked_add_days(Days::new(u64::from(days.unsigned_abs())))
    } else {
        epoch.checked_sub_days(Days::new(u64::from(days.unsigned_abs())))
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::date_from_epoch_days;

    #[test]
    fn epoch_days_convert_both_directions() {
        assert_eq!(date_from_epoch_days(0), NaiveDate::from_ymd_opt(1970, 1, 1));
        assert_eq!(date_from_epoch_days(18262), NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(date_from_epoch_days(-1), NaiveDate::from_ymd_opt(1969, 12, 31));
    }
}
