use std::collections::BTreeMap;

use super::model::{CellValue, HouseTable};

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// Mean of the values per key. Missing values are skipped; a key whose
/// values are all missing maps to `None`.
pub fn mean_by<K: Ord>(
    pairs: impl IntoIterator<Item = (K, Option<f64>)>,
) -> BTreeMap<K, Option<f64>> {
    let mut sums: BTreeMap<K, (f64, usize)> = BTreeMap::new();
    for (key, value) in pairs {
        let entry = sums.entry(key).or_insert((0.0, 0));
        if let Some(v) = value {
            entry.0 += v;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(k, (sum, n))| (k, (n > 0).then(|| sum / n as f64)))
        .collect()
}

/// `(key, value)` cells of two columns, skipping rows whose key is null.
fn key_value_cells<'a>(
    table: &'a HouseTable,
    key: &str,
    value: &str,
) -> impl Iterator<Item = (&'a CellValue, &'a CellValue)> + 'a {
    let indices = table.column_index(key).zip(table.column_index(value));
    table.rows.iter().filter_map(move |row| {
        let (k, v) = indices?;
        (!row[k].is_null()).then(|| (&row[k], &row[v]))
    })
}

/// Number of non-null `value` cells per `key`.
pub fn group_count(table: &HouseTable, key: &str, value: &str) -> BTreeMap<CellValue, usize> {
    let mut counts = BTreeMap::new();
    for (k, v) in key_value_cells(table, key, value) {
        let count = counts.entry(k.clone()).or_insert(0);
        if !v.is_null() {
            *count += 1;
        }
    }
    counts
}

/// Mean of numeric `value` per `key`.
pub fn group_mean(table: &HouseTable, key: &str, value: &str) -> BTreeMap<CellValue, Option<f64>> {
    mean_by(key_value_cells(table, key, value).map(|(k, v)| (k.clone(), v.as_f64())))
}

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// Summary of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub attribute: String,
    pub max: f64,
    pub min: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std: f64,
}

impl ColumnStats {
    /// `None` when `values` is empty.
    pub fn from_values(attribute: &str, values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        let median = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] + sorted[mid]) / 2.0
        } else {
            sorted[mid]
        };

        Some(ColumnStats {
            attribute: attribute.to_string(),
            max: sorted[sorted.len() - 1],
            min: sorted[0],
            mean,
            median,
            std: variance.sqrt(),
        })
    }
}

/// Statistics for every numeric column of `table`, in column order.
pub fn describe(table: &HouseTable) -> Vec<ColumnStats> {
    table
        .numeric_columns()
        .into_iter()
        .filter_map(|col| ColumnStats::from_values(col, &table.numeric_values(col)))
        .collect()
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Uniform-width histogram. Always holds exactly the requested number of bins.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub start: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bucket `values` into `bins` equal-width bins spanning their range.
    ///
    /// The maximum lands in the last bin. With no values the bins span
    /// `[0, 1]`; with a single distinct value they span `v ± 0.5`.
    pub fn new(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let finite = values.iter().copied().filter(|v| v.is_finite());
        let (min, max) = finite.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
        let (start, end) = if min > max {
            (0.0, 1.0)
        } else if min == max {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };
        let bin_width = (end - start) / bins as f64;

        let mut counts = vec![0usize; bins];
        for v in values.iter().copied().filter(|v| v.is_finite()) {
            let idx = (((v - start) / bin_width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }
        Histogram {
            start,
            bin_width,
            counts,
        }
    }

    /// `(lower edge, upper edge, count)` per bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.counts.iter().enumerate().map(|(i, &count)| {
            let lo = self.start + i as f64 * self.bin_width;
            (lo, lo + self.bin_width, count)
        })
    }

    /// Number of values counted.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}
