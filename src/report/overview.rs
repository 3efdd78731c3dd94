use std::collections::BTreeSet;

use crate::data::aggregate::{ColumnStats, describe, group_count, group_mean};
use crate::data::error::FilterError;
use crate::data::filter::{project_columns, rows_with_values};
use crate::data::model::{CellValue, HouseTable, columns};

/// Headers of the per-zipcode averages table.
pub const AVERAGE_HEADERS: [&str; 5] =
    ["ZIPCODE", "TOTAL_HOUSES", "PRICE", "SQRT_LIVING", "PRICE_M2"];

/// Headers of the descriptive statistics table.
pub const STATISTICS_HEADERS: [&str; 6] = ["attributes", "max", "min", "mean", "median", "std"];

/// Sidebar selections of the overview. Empty means "not supplied".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverviewFilters {
    pub columns: Vec<String>,
    pub zipcodes: BTreeSet<CellValue>,
}

/// Which of the four restrictions a set of filters asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restriction {
    RowsAndColumns,
    RowsOnly,
    ColumnsOnly,
    Nothing,
}

impl OverviewFilters {
    pub fn restriction(&self) -> Restriction {
        match (!self.zipcodes.is_empty(), !self.columns.is_empty()) {
            (true, true) => Restriction::RowsAndColumns,
            (true, false) => Restriction::RowsOnly,
            (false, true) => Restriction::ColumnsOnly,
            (false, false) => Restriction::Nothing,
        }
    }
}

/// One row of the averages table.
#[derive(Debug, Clone, PartialEq)]
pub struct ZipcodeSummary {
    pub zipcode: CellValue,
    pub total_houses: usize,
    pub price: Option<f64>,
    pub sqft_living: Option<f64>,
    pub price_per_area: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverviewReport {
    /// The filtered table shown in full.
    pub table: HouseTable,
    pub averages: Vec<ZipcodeSummary>,
    pub statistics: Vec<ColumnStats>,
}

fn restrict_rows(table: &HouseTable, filters: &OverviewFilters) -> HouseTable {
    match filters.restriction() {
        Restriction::RowsAndColumns | Restriction::RowsOnly => {
            table.take_rows(&rows_with_values(table, columns::ZIPCODE, &filters.zipcodes))
        }
        Restriction::ColumnsOnly | Restriction::Nothing => table.clone(),
    }
}

fn restrict_columns(
    table: HouseTable,
    filters: &OverviewFilters,
) -> Result<HouseTable, FilterError> {
    match filters.restriction() {
        Restriction::RowsAndColumns | Restriction::ColumnsOnly => {
            project_columns(&table, &filters.columns)
        }
        Restriction::RowsOnly | Restriction::Nothing => Ok(table),
    }
}

/// Count, mean price, mean living area and mean price per area per zipcode.
///
/// The four groupings are inner-joined on zipcode.
pub fn zipcode_averages(table: &HouseTable) -> Vec<ZipcodeSummary> {
    let counts = group_count(table, columns::ZIPCODE, columns::ID);
    let prices = group_mean(table, columns::ZIPCODE, columns::PRICE);
    let living = group_mean(table, columns::ZIPCODE, columns::SQFT_LIVING);
    let per_area = group_mean(table, columns::ZIPCODE, columns::PRICE_PER_AREA);

    counts
        .into_iter()
        .filter_map(|(zipcode, total_houses)| {
            Some(ZipcodeSummary {
                total_houses,
                price: *prices.get(&zipcode)?,
                sqft_living: *living.get(&zipcode)?,
                price_per_area: *per_area.get(&zipcode)?,
                zipcode,
            })
        })
        .collect()
}

/// Build the overview: filtered table, per-zipcode averages, statistics.
///
/// Averages come from the zipcode-restricted rows before any column
/// projection, so they survive a column selection without `zipcode` or
/// `price`. Statistics follow the projected table.
pub fn overview_report(
    table: &HouseTable,
    filters: &OverviewFilters,
) -> Result<OverviewReport, FilterError> {
    let rows = restrict_rows(table, filters);
    let averages = zipcode_averages(&rows);
    let table = restrict_columns(rows, filters)?;
    let statistics = describe(&table);
    Ok(OverviewReport {
        table,
        averages,
        statistics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::derive::add_price_per_area;
    use crate::data::model::tests::sample_table;

    fn houses() -> HouseTable {
        add_price_per_area(sample_table(&[
            (98001, 100.0, 1000, 2000),
            (98001, 200.0, 2000, 2001),
            (98002, 300.0, 1500, 2002),
        ]))
    }

    fn filter_table(table: &HouseTable, filters: &OverviewFilters) -> HouseTable {
        overview_report(table, filters).unwrap().table
    }

    fn zipcodes(values: &[i64]) -> BTreeSet<CellValue> {
        values.iter().copied().map(CellValue::Integer).collect()
    }

    #[test]
    fn test_restriction_branches() {
        let mut filters = OverviewFilters::default();
        assert_eq!(filters.restriction(), Restriction::Nothing);
        filters.columns.push(columns::PRICE.into());
        assert_eq!(filters.restriction(), Restriction::ColumnsOnly);
        filters.zipcodes = zipcodes(&[98001]);
        assert_eq!(filters.restriction(), Restriction::RowsAndColumns);
        filters.columns.clear();
        assert_eq!(filters.restriction(), Restriction::RowsOnly);
    }

    #[test]
    fn test_rows_and_columns() {
        let filters = OverviewFilters {
            columns: vec![columns::PRICE.into()],
            zipcodes: zipcodes(&[98001]),
        };
        let filtered = filter_table(&houses(), &filters);
        assert_eq!(filtered.column_names, vec![columns::PRICE]);
        assert_eq!(filtered.numeric_values(columns::PRICE), vec![100.0, 200.0]);
    }

    #[test]
    fn test_rows_only_keeps_all_columns() {
        let table = houses();
        let filters = OverviewFilters {
            zipcodes: zipcodes(&[98002]),
            ..Default::default()
        };
        let filtered = filter_table(&table, &filters);
        assert_eq!(filtered.column_names, table.column_names);
        assert_eq!(filtered.len(), 1);
    }

    #[test]
    fn test_columns_only_keeps_all_rows() {
        let filters = OverviewFilters {
            columns: vec![columns::ZIPCODE.into(), columns::PRICE.into()],
            ..Default::default()
        };
        let filtered = filter_table(&houses(), &filters);
        assert_eq!(filtered.len(), 3);
        assert_eq!(filtered.column_names, vec![columns::ZIPCODE, columns::PRICE]);
    }

    #[test]
    fn test_nothing_selected_is_a_copy() {
        let table = houses();
        assert_eq!(filter_table(&table, &OverviewFilters::default()), table);
    }

    #[test]
    fn test_zipcode_averages() {
        let averages = zipcode_averages(&houses());
        assert_eq!(averages.len(), 2);
        let a = &averages[0];
        assert_eq!(a.zipcode, CellValue::Integer(98001));
        assert_eq!(a.total_houses, 2);
        assert_eq!(a.price, Some(150.0));
        assert_eq!(a.sqft_living, Some(1500.0));
        // price / (4 * living): 100 / 4000 and 200 / 8000
        assert_eq!(a.price_per_area, Some(0.025));
        let b = &averages[1];
        assert_eq!(b.total_houses, 1);
        assert_eq!(b.price, Some(300.0));
    }

    #[test]
    fn test_report_with_projection_keeps_averages() {
        let filters = OverviewFilters {
            columns: vec![columns::SQFT_LIVING.into()],
            zipcodes: zipcodes(&[98001]),
        };
        let report = overview_report(&houses(), &filters).unwrap();
        assert_eq!(report.averages.len(), 1);
        assert_eq!(report.statistics.len(), 1);
        assert_eq!(report.statistics[0].attribute, columns::SQFT_LIVING);
        assert_eq!(report.statistics[0].mean, 1500.0);
    }

    #[test]
    fn test_empty_selection_propagates_empty_tables() {
        let filters = OverviewFilters {
            zipcodes: zipcodes(&[11111]),
            ..Default::default()
        };
        let report = overview_report(&houses(), &filters).unwrap();
        assert!(report.table.is_empty());
        assert!(report.averages.is_empty());
        assert!(report.statistics.is_empty());
    }

    #[test]
    fn test_unknown_column_is_an_error() {
        let filters = OverviewFilters {
            columns: vec!["garage".into()],
            ..Default::default()
        };
        assert_eq!(
            overview_report(&houses(), &filters).unwrap_err(),
            FilterError::UnknownColumn("garage".into())
        );
    }
}
