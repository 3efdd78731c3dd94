use crate::data::aggregate::Histogram;
use crate::data::filter::{choices, rows_below, rows_equal};
use crate::data::model::{HouseTable, columns};

/// Bins of the bedroom, bathroom and floor histograms.
pub const COUNT_HISTOGRAM_BINS: usize = 19;

/// Bins of the waterfront histogram (two populated bars in practice).
pub const WATERFRONT_HISTOGRAM_BINS: usize = 10;

/// Dropdown choices: sorted distinct values of each column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeChoices {
    pub bedrooms: Vec<f64>,
    pub bathrooms: Vec<f64>,
    pub floors: Vec<f64>,
}

fn numeric_choices(table: &HouseTable, column: &str) -> Vec<f64> {
    let mut values: Vec<f64> = choices(table, column)
        .iter()
        .filter_map(|v| v.as_f64())
        .collect();
    // Integer(2) and Float(2.0) are distinct cells but one choice.
    values.dedup();
    values
}

impl AttributeChoices {
    pub fn from_table(table: &HouseTable) -> Self {
        AttributeChoices {
            bedrooms: numeric_choices(table, columns::BEDROOMS),
            bathrooms: numeric_choices(table, columns::BATHROOMS),
            floors: numeric_choices(table, columns::FLOORS),
        }
    }
}

/// Selections of the attribute sidebar. Maxima are exclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeFilters {
    pub max_bedrooms: f64,
    pub max_bathrooms: f64,
    pub max_floors: f64,
    pub waterfront_only: bool,
}

impl From<&AttributeChoices> for AttributeFilters {
    /// Each dropdown starts on its first (smallest) choice.
    fn from(choices: &AttributeChoices) -> Self {
        AttributeFilters {
            max_bedrooms: choices.bedrooms.first().copied().unwrap_or(0.0),
            max_bathrooms: choices.bathrooms.first().copied().unwrap_or(0.0),
            max_floors: choices.floors.first().copied().unwrap_or(0.0),
            waterfront_only: false,
        }
    }
}

/// Histogram of `column` over the houses whose `column` is below `max`.
pub fn count_histogram(table: &HouseTable, column: &str, max: f64) -> Histogram {
    let rows = table.take_rows(&rows_below(table, column, max));
    Histogram::new(&rows.numeric_values(column), COUNT_HISTOGRAM_BINS)
}

/// Histogram of the waterfront flag, optionally over waterfront houses only.
pub fn waterfront_histogram(table: &HouseTable, waterfront_only: bool) -> Histogram {
    let values = if waterfront_only {
        table
            .take_rows(&rows_equal(table, columns::WATERFRONT, 1.0))
            .numeric_values(columns::WATERFRONT)
    } else {
        table.numeric_values(columns::WATERFRONT)
    };
    Histogram::new(&values, WATERFRONT_HISTOGRAM_BINS)
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttributeReport {
    pub bedrooms: Histogram,
    pub bathrooms: Histogram,
    pub floors: Histogram,
    pub waterfront: Histogram,
}

pub fn attribute_report(table: &HouseTable, filters: &AttributeFilters) -> AttributeReport {
    AttributeReport {
        bedrooms: count_histogram(table, columns::BEDROOMS, filters.max_bedrooms),
        bathrooms: count_histogram(table, columns::BATHROOMS, filters.max_bathrooms),
        floors: count_histogram(table, columns::FLOORS, filters.max_floors),
        waterfront: waterfront_histogram(table, filters.waterfront_only),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    /// Rows of `(bedrooms, bathrooms, floors, waterfront)`.
    fn houses(rows: &[(i64, f64, f64, i64)]) -> HouseTable {
        let column_names = [
            columns::BEDROOMS,
            columns::BATHROOMS,
            columns::FLOORS,
            columns::WATERFRONT,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let rows = rows
            .iter()
            .map(|&(bed, bath, floors, water)| {
                vec![
                    CellValue::Integer(bed),
                    CellValue::Float(bath),
                    CellValue::Float(floors),
                    CellValue::Integer(water),
                ]
            })
            .collect();
        HouseTable::from_rows(column_names, rows)
    }

    fn sample() -> HouseTable {
        houses(&[
            (1, 1.0, 1.0, 0),
            (2, 1.5, 1.0, 0),
            (3, 2.25, 2.0, 1),
            (3, 2.25, 2.0, 0),
            (4, 3.0, 3.5, 1),
        ])
    }

    #[test]
    fn test_choices_are_sorted_distinct() {
        let choices = AttributeChoices::from_table(&sample());
        assert_eq!(choices.bedrooms, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(choices.bathrooms, vec![1.0, 1.5, 2.25, 3.0]);
        assert_eq!(choices.floors, vec![1.0, 2.0, 3.5]);
    }

    #[test]
    fn test_mixed_integer_and_float_choices_merge() {
        let mut table = sample();
        table.rows[1][1] = CellValue::Integer(1);
        let choices = AttributeChoices::from_table(&table);
        assert_eq!(choices.bathrooms, vec![1.0, 2.25, 3.0]);
    }

    #[test]
    fn test_single_value_column_has_one_choice() {
        let table = houses(&[(2, 1.0, 1.0, 0), (2, 1.0, 1.0, 0)]);
        let choices = AttributeChoices::from_table(&table);
        assert_eq!(choices.bedrooms, vec![2.0]);
        let filters = AttributeFilters::from(&choices);
        assert_eq!(filters.max_bedrooms, 2.0);
        assert_eq!(attribute_report(&table, &filters).bedrooms.total(), 0);
    }

    #[test]
    fn test_defaults_pick_first_choice() {
        let filters = AttributeFilters::from(&AttributeChoices::from_table(&sample()));
        assert_eq!(filters.max_bedrooms, 1.0);
        assert_eq!(filters.max_bathrooms, 1.0);
        assert_eq!(filters.max_floors, 1.0);
        assert!(!filters.waterfront_only);
    }

    #[test]
    fn test_count_histograms_are_exclusive() {
        let filters = AttributeFilters {
            max_bedrooms: 3.0,
            max_bathrooms: 2.25,
            max_floors: 3.5,
            waterfront_only: false,
        };
        let report = attribute_report(&sample(), &filters);
        assert_eq!(report.bedrooms.total(), 2);
        assert_eq!(report.bathrooms.total(), 2);
        assert_eq!(report.floors.total(), 4);
        for hist in [&report.bedrooms, &report.bathrooms, &report.floors] {
            assert_eq!(hist.counts.len(), COUNT_HISTOGRAM_BINS);
        }
    }

    #[test]
    fn test_waterfront_toggle() {
        let table = sample();
        let all = waterfront_histogram(&table, false);
        assert_eq!(all.counts.len(), WATERFRONT_HISTOGRAM_BINS);
        assert_eq!(all.total(), 5);
        assert_eq!(all.counts[0], 3);
        assert_eq!(all.counts[WATERFRONT_HISTOGRAM_BINS - 1], 2);

        let only = waterfront_histogram(&table, true);
        assert_eq!(only.total(), 2);
    }
}
