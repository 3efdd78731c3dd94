use chrono::NaiveDate;

use crate::data::aggregate::{Histogram, mean_by};
use crate::data::filter::{rows_before, rows_below};
use crate::data::model::{HouseTable, columns};

/// Bins of the price distribution.
pub const PRICE_HISTOGRAM_BINS: usize = 50;

/// Bounds and starting value of a slider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange<T> {
    pub min: T,
    pub max: T,
    pub default: T,
}

/// Slider ranges of the commercial sidebar, derived from the full table.
///
/// Each range is `None` when its column has no usable value; the other
/// views still render.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CommercialBounds {
    /// Defaults to the oldest year.
    pub year_built: Option<SliderRange<i64>>,
    /// Defaults to the first sale date.
    pub date: Option<SliderRange<NaiveDate>>,
    /// Defaults to the (truncated) mean price.
    pub price: Option<SliderRange<i64>>,
}

impl CommercialBounds {
    pub fn from_table(table: &HouseTable) -> Self {
        let years = table.numeric_values(columns::YR_BUILT);
        let prices = table.numeric_values(columns::PRICE);

        let year_built = min_max(&years).map(|(min, max)| SliderRange {
            min: min as i64,
            max: max as i64,
            default: min as i64,
        });

        let mut dates = table.column(columns::DATE).filter_map(|v| v.as_date());
        let date = dates.next().map(|first| {
            let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
            SliderRange {
                min,
                max,
                default: min,
            }
        });

        let price = min_max(&prices).map(|(min, max)| {
            let mean = prices.iter().sum::<f64>() / prices.len() as f64;
            SliderRange {
                min: min as i64,
                max: max as i64,
                default: mean as i64,
            }
        });

        CommercialBounds {
            year_built,
            date,
            price,
        }
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Thresholds chosen in the commercial sidebar. All are exclusive; a view
/// without a threshold is not computed.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CommercialFilters {
    pub max_year_built: Option<i64>,
    pub max_date: Option<NaiveDate>,
    pub max_price: Option<f64>,
}

impl From<&CommercialBounds> for CommercialFilters {
    fn from(bounds: &CommercialBounds) -> Self {
        CommercialFilters {
            max_year_built: bounds.year_built.map(|r| r.default),
            max_date: bounds.date.map(|r| r.default),
            max_price: bounds.price.map(|r| r.default as f64),
        }
    }
}

/// Mean price per construction year, for houses built before `max_year`.
pub fn price_by_year_built(table: &HouseTable, max_year: i64) -> Vec<(i64, f64)> {
    let rows = table.take_rows(&rows_below(table, columns::YR_BUILT, max_year as f64));
    let (Some(year), Some(price)) = (
        rows.column_index(columns::YR_BUILT),
        rows.column_index(columns::PRICE),
    ) else {
        return Vec::new();
    };
    mean_by(rows.rows.iter().filter_map(|row| {
        let y = row[year].as_f64()? as i64;
        Some((y, row[price].as_f64()))
    }))
    .into_iter()
    .filter_map(|(y, mean)| Some((y, mean?)))
    .collect()
}

/// Mean price per sale date, for sales strictly before `max_date`.
pub fn price_by_date(table: &HouseTable, max_date: NaiveDate) -> Vec<(NaiveDate, f64)> {
    let rows = table.take_rows(&rows_before(table, columns::DATE, max_date));
    let (Some(date), Some(price)) = (
        rows.column_index(columns::DATE),
        rows.column_index(columns::PRICE),
    ) else {
        return Vec::new();
    };
    mean_by(
        rows.rows
            .iter()
            .filter_map(|row| Some((row[date].as_date()?, row[price].as_f64()))),
    )
    .into_iter()
    .filter_map(|(d, mean)| Some((d, mean?)))
    .collect()
}

/// Distribution of prices strictly below `max_price`, in 50 bins.
pub fn price_histogram(table: &HouseTable, max_price: f64) -> Histogram {
    let prices: Vec<f64> = table
        .numeric_values(columns::PRICE)
        .into_iter()
        .filter(|&p| p < max_price)
        .collect();
    Histogram::new(&prices, PRICE_HISTOGRAM_BINS)
}

/// The three views are independent: each is `None` only when its own
/// threshold is missing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommercialReport {
    pub by_year_built: Option<Vec<(i64, f64)>>,
    pub by_date: Option<Vec<(NaiveDate, f64)>>,
    pub price_distribution: Option<Histogram>,
}

pub fn commercial_report(table: &HouseTable, filters: &CommercialFilters) -> CommercialReport {
    CommercialReport {
        by_year_built: filters
            .max_year_built
            .map(|year| price_by_year_built(table, year)),
        by_date: filters.max_date.map(|date| price_by_date(table, date)),
        price_distribution: filters
            .max_price
            .map(|price| price_histogram(table, price)),
    }
}
