use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the battery table
// ---------------------------------------------------------------------------

/// A dynamically-typed table cell. The source CSV mixes continuous features,
/// integer indicator columns and a handful of text columns, so cells keep
/// their parsed type rather than forcing everything to `f64` up front.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Float(f64),
    Integer(i64),
    Text(String),
    Null,
}

impl CellValue {
    /// Interpret the value as an `f64` for aggregation; `None` for text and
    /// nulls, which the aggregator skips.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

// ---------------------------------------------------------------------------
// BatteryRecord – one row of the table
// ---------------------------------------------------------------------------

/// A single battery (one row of the source table).
#[derive(Debug, Clone)]
pub struct BatteryRecord {
    /// Unique Materials Project identifier, e.g. `"mp-1234_Li"`.
    pub battery_id: String,
    /// Feature columns: column_name → value. Excludes `battery_id`.
    pub values: BTreeMap<String, CellValue>,
}

impl BatteryRecord {
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.values.get(column)
    }

    /// Numeric view of a column, `None` when absent, null or text.
    pub fn numeric(&self, column: &str) -> Option<f64> {
        self.values.get(column).and_then(CellValue::as_f64)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// Suffix of the per-element discharge-indicator columns.
pub const ELEMENT_COLUMN_SUFFIX: &str = "_formula_discharge";

/// The full prepared dataset. Immutable once built: every page-level
/// operation works on row-index subsets of this table, never on copies.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All batteries (rows), in source-file order.
    pub records: Vec<BatteryRecord>,
    /// Sorted list of feature column names (excludes `battery_id`).
    pub column_names: Vec<String>,
}

impl Dataset {
    /// Build the column index from prepared records.
    pub fn from_records(records: Vec<BatteryRecord>) -> Self {
        let mut column_set: BTreeSet<String> = BTreeSet::new();
        for rec in &records {
            for col in rec.values.keys() {
                column_set.insert(col.clone());
            }
        }
        Dataset {
            records,
            column_names: column_set.into_iter().collect(),
        }
    }

    /// Number of batteries.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_names.iter().any(|c| c == column)
    }

    /// Every row index, in source order. The identity row subset.
    pub fn all_indices(&self) -> Vec<usize> {
        (0..self.records.len()).collect()
    }

    /// All battery ids, in source order.
    pub fn battery_ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.battery_id.as_str()).collect()
    }

    /// Look up a battery by id.
    pub fn record_for(&self, battery_id: &str) -> Option<&BatteryRecord> {
        self.records.iter().find(|r| r.battery_id == battery_id)
    }

    /// Non-null numeric values of `column` over the given row subset, in row
    /// order. Rows where the column is absent, null or text are skipped.
    pub fn numeric_column(&self, column: &str, rows: &[usize]) -> Vec<f64> {
        rows.iter()
            .filter_map(|&i| self.records.get(i))
            .filter_map(|rec| rec.numeric(column))
            .collect()
    }

    /// Element symbols derived from the discharge-indicator columns, in
    /// column order (e.g. `"Li_formula_discharge"` → `"Li"`).
    pub fn elements(&self) -> Vec<&str> {
        self.column_names
            .iter()
            .filter_map(|c| c.strip_suffix(ELEMENT_COLUMN_SUFFIX))
            .collect()
    }
}
