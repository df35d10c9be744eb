use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{BatteryRecord, CellValue, Dataset};

/// Identifier column required by the data contract.
const ID_COLUMN: &str = "battery_id";
/// Categorical column expanded to one-hot indicators before use.
const WORKING_ION_COLUMN: &str = "working_ion";
/// Rows with a negative value here are dropped at load time.
const ENERGY_COLUMN: &str = "energy_grav";

/// One parsed but not yet prepared row: column_name → value, id included.
type RawRow = BTreeMap<String, CellValue>;

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load and prepare a battery dataset from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with column names, one battery per row
/// * `.json`    – `[{ "battery_id": "...", ...columns }, ...]`
/// * `.parquet` – flat scalar columns (string / int / float / bool)
///
/// Preparation applied to every format, in order:
/// 1. a non-null `battery_id` is required on every row,
/// 2. rows with `energy_grav < 0` (or null) are dropped,
/// 3. the categorical `working_ion` column is expanded into
///    `working_ion_<Symbol>` 0/1 indicator columns and removed.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "csv" => {
            let (_, rows) = read_csv_table(path)?;
            rows
        }
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    prepare(rows)
}

// ---------------------------------------------------------------------------
// Preparation
// ---------------------------------------------------------------------------

fn prepare(rows: Vec<RawRow>) -> Result<Dataset> {
    if !rows.iter().any(|r| r.contains_key(ENERGY_COLUMN)) {
        bail!("dataset missing {ENERGY_COLUMN:?} column");
    }
    if !rows.iter().any(|r| r.contains_key(WORKING_ION_COLUMN)) {
        bail!("dataset missing {WORKING_ION_COLUMN:?} column");
    }

    // Gravimetric energy must be non-negative before any further use.
    // A null value fails the comparison and drops the row, as in the source
    // data pipeline.
    let total = rows.len();
    let mut rows: Vec<RawRow> = rows
        .into_iter()
        .filter(|r| {
            r.get(ENERGY_COLUMN)
                .and_then(CellValue::as_f64)
                .is_some_and(|v| v >= 0.0)
        })
        .collect();
    if rows.len() < total {
        log::info!(
            "dropped {} of {total} rows with negative or missing {ENERGY_COLUMN}",
            total - rows.len()
        );
    }

    // One-hot expand the working ion. A null ion yields an all-zero row.
    let ions: BTreeSet<String> = rows
        .iter()
        .filter_map(|r| match r.get(WORKING_ION_COLUMN) {
            Some(CellValue::Text(s)) => Some(s.clone()),
            _ => None,
        })
        .collect();
    for row in &mut rows {
        let ion = match row.remove(WORKING_ION_COLUMN) {
            Some(CellValue::Text(s)) => Some(s),
            _ => None,
        };
        for sym in &ions {
            let hot = ion.as_deref() == Some(sym.as_str());
            row.insert(format!("working_ion_{sym}"), CellValue::Integer(hot as i64));
        }
    }

    let records = rows
        .into_iter()
        .enumerate()
        .map(|(i, mut row)| {
            let battery_id = match row.remove(ID_COLUMN) {
                Some(CellValue::Text(s)) => s,
                Some(CellValue::Integer(n)) => n.to_string(),
                _ => bail!("Row {i}: missing or null {ID_COLUMN:?}"),
            };
            Ok(BatteryRecord {
                battery_id,
                values: row,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Dataset::from_records(records))
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Read a delimited flat table: header row, one record per line, cells
/// type-guessed. Shared with the projection-file loader.
pub(crate) fn read_csv_table(path: &Path) -> Result<(Vec<String>, Vec<RawRow>)> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(col, cell)| (col.clone(), guess_cell_value(cell)))
            .collect();
        rows.push(row);
    }
    Ok((headers, rows))
}

fn guess_cell_value(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    CellValue::Text(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
/// a top-level array of flat objects.
fn load_json(path: &Path) -> Result<Vec<RawRow>> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let obj = rec
                .as_object()
                .with_context(|| format!("Row {i} is not a JSON object"))?;
            Ok(obj
                .iter()
                .map(|(col, val)| (col.clone(), json_to_cell(val)))
                .collect())
        })
        .collect()
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Integer(*b as i64),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet
// ---------------------------------------------------------------------------

/// Flat scalar schema only: every column is string, int, float or bool.
/// Works with files written by both Pandas and Polars.
fn load_parquet(path: &Path) -> Result<Vec<RawRow>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        for row in 0..batch.num_rows() {
            let cells: RawRow = schema
                .fields()
                .iter()
                .enumerate()
                .map(|(col_idx, field)| {
                    let value = extract_cell(batch.column(col_idx), row);
                    (field.name().clone(), value)
                })
                .collect();
            rows.push(cells);
        }
    }
    Ok(rows)
}

/// Extract a single scalar cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            use arrow::array::AsArray;
            if let Some(s) = col.as_string_opt::<i32>() {
                CellValue::Text(s.value(row).to_string())
            } else {
                CellValue::Text(col.as_string::<i64>().value(row).to_string())
            }
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            CellValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            CellValue::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            CellValue::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            CellValue::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            CellValue::Integer(arr.value(row) as i64)
        }
        _ => CellValue::Text(format!("{:?}", col.data_type())),
    }
}
