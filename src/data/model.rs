use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

// ---------------------------------------------------------------------------
// Column names used by the reports
// ---------------------------------------------------------------------------

/// Source column names consumed by the reports.
pub mod columns {
    pub const ID: &str = "id";
    pub const DATE: &str = "date";
    pub const PRICE: &str = "price";
    pub const BEDROOMS: &str = "bedrooms";
    pub const BATHROOMS: &str = "bathrooms";
    pub const SQFT_LIVING: &str = "sqft_living";
    pub const SQFT_LOT: &str = "sqft_lot";
    pub const FLOORS: &str = "floors";
    pub const WATERFRONT: &str = "waterfront";
    pub const YR_BUILT: &str = "yr_built";
    pub const ZIPCODE: &str = "zipcode";
    pub const LAT: &str = "lat";
    pub const LONG: &str = "long";
    /// Derived: `price / sqft_lot`.
    pub const PRICE_PER_AREA: &str = "price_per_area";
}

/// Columns a loaded file must provide.
pub const REQUIRED_COLUMNS: &[&str] = &[
    columns::ID,
    columns::DATE,
    columns::PRICE,
    columns::BEDROOMS,
    columns::BATHROOMS,
    columns::SQFT_LIVING,
    columns::SQFT_LOT,
    columns::FLOORS,
    columns::WATERFRONT,
    columns::YR_BUILT,
    columns::ZIPCODE,
    columns::LAT,
    columns::LONG,
];

// ---------------------------------------------------------------------------
// CellValue – a single cell of the house table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a CSV reader infers.
/// Used as a `BTreeMap` / `BTreeSet` key for grouping, so it must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Only produced by typed sources (Parquet `Date32`); CSV dates stay text.
    Date(NaiveDate),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) | Float(_) => 2,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            // Mixed numeric columns (e.g. `bathrooms` = 1 and 2.25) sort by value.
            (Integer(a), Float(b)) => (*a as f64).total_cmp(b).then(std::cmp::Ordering::Less),
            (Float(a), Integer(b)) => a.total_cmp(&(*b as f64)).then(std::cmp::Ordering::Greater),
            (String(a), String(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell; `None` for text, dates and nulls.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) if !v.is_nan() => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Calendar date of the cell, parsing text on demand.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::String(s) => parse_sale_date(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }

    /// Join key used against boundary `ZIP` properties.
    ///
    /// Integral floats (`98001.0`) render without the fraction so they match
    /// the integer spelling a boundary document uses.
    pub fn zip_key(&self) -> Option<String> {
        match self {
            CellValue::Integer(i) => Some(i.to_string()),
            CellValue::Float(v) if v.fract() == 0.0 && v.is_finite() => {
                Some(format!("{}", *v as i64))
            }
            CellValue::Float(v) => Some(v.to_string()),
            CellValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }
}

/// Parse a sale date in any of the spellings the source files use.
pub fn parse_sale_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y%m%dT%H%M%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y", "%Y%m%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// HouseTable – the loaded dataset
// ---------------------------------------------------------------------------

/// One record: cells in the same order as [`HouseTable::column_names`].
pub type Row = Vec<CellValue>;

/// Row-oriented table that keeps the source column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HouseTable {
    pub column_names: Vec<String>,
    pub rows: Vec<Row>,
}

impl HouseTable {
    /// Build a table, padding short rows with nulls.
    pub fn from_rows(column_names: Vec<String>, rows: Vec<Row>) -> Self {
        let width = column_names.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();
        HouseTable { column_names, rows }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cells of one column, top to bottom. Empty when the column is absent.
    pub fn column<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a CellValue> + 'a {
        let idx = self.column_index(name);
        self.rows
            .iter()
            .filter_map(move |row| idx.and_then(|i| row.get(i)))
    }

    /// Non-null numeric cells of a column.
    pub fn numeric_values(&self, name: &str) -> Vec<f64> {
        self.column(name).filter_map(CellValue::as_f64).collect()
    }

    /// Sorted distinct non-null values of a column.
    pub fn unique_values(&self, name: &str) -> BTreeSet<CellValue> {
        self.column(name)
            .filter(|v| !v.is_null())
            .cloned()
            .collect()
    }

    /// Columns whose non-null cells are all numeric (at least one cell required).
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.column_names
            .iter()
            .enumerate()
            .filter(|(i, _)| {
                let mut seen = false;
                for row in &self.rows {
                    match &row[*i] {
                        CellValue::Null => {}
                        v if v.is_numeric() => seen = true,
                        _ => return false,
                    }
                }
                seen
            })
            .map(|(_, name)| name.as_str())
            .collect()
    }

    /// New table holding the given rows, in the given order.
    pub fn take_rows(&self, indices: &[usize]) -> HouseTable {
        HouseTable {
            column_names: self.column_names.clone(),
            rows: indices
                .iter()
                .filter_map(|&i| self.rows.get(i).cloned())
                .collect(),
        }
    }

    /// Append (or overwrite) a column. `values` must have one cell per row.
    pub fn set_column(&mut self, name: &str, values: Vec<CellValue>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row[idx] = v;
                }
            }
            None => {
                self.column_names.push(name.to_string());
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
    }
}
