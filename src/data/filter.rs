use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::error::FilterError;
use super::model::{CellValue, HouseTable};

// ---------------------------------------------------------------------------
// Row predicates: each returns the indices of the rows that pass
// ---------------------------------------------------------------------------

/// Rows whose `column` value is one of `selected`.
///
/// An absent column matches nothing.
pub fn rows_with_values(
    table: &HouseTable,
    column: &str,
    selected: &BTreeSet<CellValue>,
) -> Vec<usize> {
    let Some(idx) = table.column_index(column) else {
        return Vec::new();
    };
    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| selected.contains(&row[idx]))
        .map(|(i, _)| i)
        .collect()
}

/// Rows whose numeric `column` value is strictly below `threshold`.
///
/// The boundary value itself is excluded; nulls never pass.
pub fn rows_below(table: &HouseTable, column: &str, threshold: f64) -> Vec<usize> {
    rows_where(table, column, |v| v.as_f64().is_some_and(|x| x < threshold))
}

/// Rows whose date `column` (parsed on demand) is strictly before `threshold`.
pub fn rows_before(table: &HouseTable, column: &str, threshold: NaiveDate) -> Vec<usize> {
    rows_where(table, column, |v| v.as_date().is_some_and(|d| d < threshold))
}

/// Rows whose numeric `column` value equals `target`.
pub fn rows_equal(table: &HouseTable, column: &str, target: f64) -> Vec<usize> {
    rows_where(table, column, |v| v.as_f64() == Some(target))
}

fn rows_where(
    table: &HouseTable,
    column: &str,
    predicate: impl Fn(&CellValue) -> bool,
) -> Vec<usize> {
    let Some(idx) = table.column_index(column) else {
        return Vec::new();
    };
    table
        .rows
        .iter()
        .enumerate()
        .filter(|(_, row)| predicate(&row[idx]))
        .map(|(i, _)| i)
        .collect()
}

// ---------------------------------------------------------------------------
// Column projection
// ---------------------------------------------------------------------------

/// Keep only `names`, in the order given.
pub fn project_columns(table: &HouseTable, names: &[String]) -> Result<HouseTable, FilterError> {
    let indices = names
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .ok_or_else(|| FilterError::UnknownColumn(name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(HouseTable {
        column_names: names.to_vec(),
        rows: table
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect(),
    })
}

// ---------------------------------------------------------------------------
// Selector choices
// ---------------------------------------------------------------------------

/// Sorted distinct non-null values of `column`, as offered by a dropdown.
pub fn choices(table: &HouseTable, column: &str) -> Vec<CellValue> {
    table.unique_values(column).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{columns, tests::sample_table};

    fn years() -> HouseTable {
        sample_table(&[
            (98001, 100.0, 1000, 2000),
            (98001, 200.0, 1000, 2001),
            (98002, 300.0, 1000, 2002),
        ])
    }

    #[test]
    fn test_rows_below_is_strict() {
        let table = years();
        assert_eq!(rows_below(&table, columns::YR_BUILT, 2001.0), vec![0]);
        assert_eq!(rows_below(&table, columns::YR_BUILT, 2000.0), Vec::<usize>::new());
        assert_eq!(rows_below(&table, columns::YR_BUILT, 3000.0), vec![0, 1, 2]);
    }

    #[test]
    fn test_rows_before_date_is_strict() {
        // sample dates are 2014-05-01, 2014-05-02, 2014-05-03
        let table = years();
        let cutoff = NaiveDate::from_ymd_opt(2014, 5, 2).unwrap();
        assert_eq!(rows_before(&table, columns::DATE, cutoff), vec![0]);
    }

    #[test]
    fn test_rows_with_values() {
        let table = years();
        let selected: BTreeSet<_> = [CellValue::Integer(98001)].into();
        assert_eq!(rows_with_values(&table, columns::ZIPCODE, &selected), vec![0, 1]);
        assert!(rows_with_values(&table, "missing", &selected).is_empty());
    }

    #[test]
    fn test_rows_equal() {
        let table = years();
        assert_eq!(rows_equal(&table, columns::PRICE, 300.0), vec![2]);
    }

    #[test]
    fn test_project_columns_keeps_order_and_rejects_unknown() {
        let table = years();
        let projected =
            project_columns(&table, &[columns::PRICE.to_string(), columns::ID.to_string()])
                .unwrap();
        assert_eq!(projected.column_names, vec!["price", "id"]);
        assert_eq!(projected.rows[0], vec![CellValue::Float(100.0), CellValue::Integer(1)]);

        let err = project_columns(&table, &["nope".to_string()]).unwrap_err();
        assert_eq!(err, FilterError::UnknownColumn("nope".into()));
    }

    #[test]
    fn test_choices_sorted_distinct() {
        let mut table = sample_table(&[(1, 1.0, 1, 1); 5]);
        let idx = table.column_index(columns::YR_BUILT).unwrap();
        for (row, v) in table.rows.iter_mut().zip([1, 2, 3, 3, 4]) {
            row[idx] = CellValue::Integer(v);
        }
        let values: Vec<_> = choices(&table, columns::YR_BUILT);
        assert_eq!(
            values,
            [1, 2, 3, 4].map(CellValue::Integer).to_vec()
        );
    }
}
