use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Date32Type, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::temporal_conversions::date32_to_datetime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::error::LoadError;
use super::model::{CellValue, HouseTable, REQUIRED_COLUMNS, Row};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the house table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line (the usual export)
/// * `.json`    – `[{ "id": ..., "price": ..., ... }, ...]`
/// * `.parquet` – one column per attribute
///
/// Every column listed in [`REQUIRED_COLUMNS`] must be present.
pub fn load_table(path: &Path) -> Result<HouseTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        _ => {
            return Err(LoadError::UnsupportedFormat {
                path: path.to_path_buf(),
            })
        }
    };

    if let Some(missing) = REQUIRED_COLUMNS.iter().find(|c| !table.has_column(c)) {
        return Err(LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: missing.to_string(),
        });
    }

    if table.is_empty() {
        log::warn!("{} has a header but no records", path.display());
    }
    log::info!(
        "Loaded {} records with {} columns from {}",
        table.len(),
        table.column_names.len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
/// Cell types are guessed per cell (integer, float, bool, text; empty = null).
fn load_csv(path: &Path) -> Result<HouseTable, LoadError> {
    let csv_err = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(csv_err)?;
        let row: Row = record.iter().map(guess_cell_type).collect();
        rows.push(row);
    }

    Ok(HouseTable::from_rows(headers, rows))
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return float_cell(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

/// `nan` and `inf` carry no value for any report; they load as nulls.
fn float_cell(f: f64) -> CellValue {
    if f.is_finite() {
        CellValue::Float(f)
    } else {
        CellValue::Null
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, one object per house):
///
/// ```json
/// [
///   { "id": 7129300520, "date": "20141013T000000", "price": 221900.0, ... },
///   ...
/// ]
/// ```
///
/// Columns are taken from the first record; keys missing in later records
/// become nulls.
fn load_json(path: &Path) -> Result<HouseTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text).map_err(|source| LoadError::Json {
        path: path.display().to_string(),
        source,
    })?;

    let shape_err = |reason: String| LoadError::InvalidTable {
        path: path.to_path_buf(),
        reason,
    };

    let records = root
        .as_array()
        .ok_or_else(|| shape_err("expected top-level JSON array".into()))?;

    let column_names: Vec<String> = match records.first() {
        Some(JsonValue::Object(obj)) => obj.keys().cloned().collect(),
        Some(_) => return Err(shape_err("row 0 is not a JSON object".into())),
        None => Vec::new(),
    };

    let mut rows = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| shape_err(format!("row {i} is not a JSON object")))?;
        let row: Row = column_names
            .iter()
            .map(|col| obj.get(col).map(json_to_cell).unwrap_or(CellValue::Null))
            .collect();
        rows.push(row);
    }

    Ok(HouseTable::from_rows(column_names, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one scalar column per attribute.
///
/// `Date32` columns become dates; nested types are kept as their type name.
fn load_parquet(path: &Path) -> Result<HouseTable, LoadError> {
    let parquet_err = |reason: String| LoadError::Parquet {
        path: path.to_path_buf(),
        reason,
    };

    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(|e| parquet_err(format!("reading parquet metadata: {e}")))?;
    let column_names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder
        .build()
        .map_err(|e| parquet_err(format!("building parquet reader: {e}")))?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|e| parquet_err(format!("reading record batch: {e}")))?;
        for row in 0..batch.num_rows() {
            let cells: Row = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect();
            rows.push(cells);
        }
    }

    Ok(HouseTable::from_rows(column_names, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 => CellValue::String(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::Float32 => float_cell(col.as_primitive::<Float32Type>().value(row) as f64),
        DataType::Float64 => float_cell(col.as_primitive::<Float64Type>().value(row)),
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        DataType::Date32 => date32_to_datetime(col.as_primitive::<Date32Type>().value(row))
            .map(|dt| CellValue::Date(dt.date()))
            .unwrap_or(CellValue::Null),
        other => CellValue::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;
    use crate::data::model::columns;

    const HEADER: &str = "id,date,price,bedrooms,bathrooms,sqft_living,sqft_lot,floors,waterfront,view,condition,grade,sqft_above,sqft_basement,yr_built,yr_renovated,zipcode,lat,long,sqft_living15,sqft_lot15";

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_csv_infers_types() {
        let dir = TempDir::new().unwrap();
        let body = format!(
            "{HEADER}\n\
             7129300520,20141013T000000,221900.0,3,1,1180,5650,1,0,0,3,7,1180,0,1955,0,98178,47.5112,-122.257,1340,5650\n\
             6414100192,20141209T000000,538000,3,2.25,2570,7242,2,0,0,3,7,2170,400,1951,1991,98125,47.721,-122.319,1690,7639\n"
        );
        let path = write_file(&dir, "houses.csv", &body);

        let table = load_table(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_names.len(), 21);
        assert_eq!(table.column_names[0], columns::ID);

        let prices: Vec<_> = table.column(columns::PRICE).cloned().collect();
        assert_eq!(prices, vec![CellValue::Float(221900.0), CellValue::Integer(538000)]);
        let dates: Vec<_> = table.column(columns::DATE).cloned().collect();
        assert!(matches!(dates[0], CellValue::String(_)));
        assert_eq!(
            dates[0].as_date(),
            chrono::NaiveDate::from_ymd_opt(2014, 10, 13)
        );
    }

    #[test]
    fn test_load_csv_empty_cells_are_null() {
        let dir = TempDir::new().unwrap();
        let body = format!(
            "{HEADER}\n1,20140502T000000,100,3,1,1000,0,1,0,0,3,7,1000,0,2000,0,98001,,,1000,5000\n"
        );
        let path = write_file(&dir, "houses.csv", &body);
        let table = load_table(&path).unwrap();
        assert_eq!(table.column(columns::LAT).next(), Some(&CellValue::Null));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_table(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }), "got {err:?}");
    }

    #[test]
    fn test_missing_required_column() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "houses.csv", "id,price\n1,100\n");
        let err = load_table(&path).unwrap_err();
        match err {
            LoadError::MissingColumn { column, .. } => assert_eq!(column, columns::DATE),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_ragged_csv_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "houses.csv", &format!("{HEADER}\n1,2,3\n"));
        let err = load_table(&path).unwrap_err();
        assert!(matches!(err, LoadError::Csv { .. }), "got {err:?}");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "houses.xlsx", "");
        assert!(matches!(
            load_table(&path),
            Err(LoadError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_load_json_records() {
        let dir = TempDir::new().unwrap();
        let record = REQUIRED_COLUMNS
            .iter()
            .map(|c| format!("\"{c}\": 1"))
            .collect::<Vec<_>>()
            .join(", ");
        let path = write_file(&dir, "houses.json", &format!("[{{{record}}}, {{\"id\": 2}}]"));

        let table = load_table(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_names, REQUIRED_COLUMNS);
        assert_eq!(table.column(columns::PRICE).nth(1), Some(&CellValue::Null));
        assert_eq!(table.column(columns::ID).nth(1), Some(&CellValue::Integer(2)));
    }

    #[test]
    fn test_load_parquet_columns() {
        use arrow::array::{ArrayRef, Date32Array, Float64Array};
        use arrow::datatypes::{Field, Schema};
        use arrow::record_batch::RecordBatch;
        use parquet::arrow::ArrowWriter;

        let mut fields = Vec::new();
        let mut arrays: Vec<ArrayRef> = Vec::new();
        for &name in REQUIRED_COLUMNS {
            if name == columns::DATE {
                fields.push(Field::new(name, DataType::Date32, true));
                arrays.push(Arc::new(Date32Array::from(vec![16_192, 16_193])));
            } else {
                fields.push(Field::new(name, DataType::Float64, true));
                arrays.push(Arc::new(Float64Array::from(vec![Some(1.5), None])));
            }
        }
        let schema = Arc::new(Schema::new(fields));
        let batch = RecordBatch::try_new(schema.clone(), arrays).unwrap();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("houses.parquet");
        let file = std::fs::File::create(&path).unwrap();
        let mut writer = ArrowWriter::try_new(file, schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let table = load_table(&path).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column_names.len(), REQUIRED_COLUMNS.len());
        let prices: Vec<_> = table.column(columns::PRICE).cloned().collect();
        assert_eq!(prices, vec![CellValue::Float(1.5), CellValue::Null]);
        assert_eq!(
            table.column(columns::DATE).next(),
            Some(&CellValue::Date(chrono::NaiveDate::from_ymd_opt(2014, 5, 2).unwrap()))
        );
    }

    #[test]
    fn test_load_json_keeps_key_order() {
        let dir = TempDir::new().unwrap();
        let mut names: Vec<&str> = REQUIRED_COLUMNS.to_vec();
        names.reverse();
        let record = names
            .iter()
            .map(|c| format!("\"{c}\": 1"))
            .collect::<Vec<_>>()
            .join(", ");
        let path = write_file(&dir, "houses.json", &format!("[{{{record}}}]"));

        let table = load_table(&path).unwrap();
        assert_eq!(table.column_names, names);
        assert_eq!(table.column_names[0], columns::LONG);
    }

    #[test]
    fn test_non_finite_floats_are_null() {
        let dir = TempDir::new().unwrap();
        let body = format!(
            "{HEADER}\n1,20140502T000000,NaN,3,1,1000,5000,1,0,0,3,7,1000,0,2000,0,98001,inf,-122.2,1000,5000\n"
        );
        let path = write_file(&dir, "houses.csv", &body);
        let table = load_table(&path).unwrap();
        assert_eq!(table.column(columns::PRICE).next(), Some(&CellValue::Null));
        assert_eq!(table.column(columns::LAT).next(), Some(&CellValue::Null));
        assert_eq!(
            table.column(columns::LONG).next(),
            Some(&CellValue::Float(-122.2))
        );
    }

    #[test]
    fn test_load_json_rejects_non_array() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "houses.json", "{\"id\": 1}");
        assert!(matches!(
            load_table(&path),
            Err(LoadError::InvalidTable { .. })
        ));
    }
}
