use super::model::{CellValue, HouseTable, columns};

/// Append `price_per_area = price / sqft_lot` to every record.
///
/// A record with a zero or missing lot size (or a missing price) gets a null
/// cell instead of an infinite ratio; nulls are skipped by every aggregate.
pub fn add_price_per_area(mut table: HouseTable) -> HouseTable {
    let price_idx = table.column_index(columns::PRICE);
    let lot_idx = table.column_index(columns::SQFT_LOT);

    let mut sentinels = 0usize;
    let values: Vec<CellValue> = table
        .rows
        .iter()
        .map(|row| {
            let price = price_idx.and_then(|i| row[i].as_f64());
            let lot = lot_idx.and_then(|i| row[i].as_f64());
            match (price, lot) {
                (Some(price), Some(lot)) if lot != 0.0 => CellValue::Float(price / lot),
                _ => {
                    sentinels += 1;
                    CellValue::Null
                }
            }
        })
        .collect();

    if sentinels > 0 {
        log::warn!(
            "{sentinels} of {} records have no usable {}/{}; {} left null",
            table.len(),
            columns::PRICE,
            columns::SQFT_LOT,
            columns::PRICE_PER_AREA
        );
    }

    table.set_column(columns::PRICE_PER_AREA, values);
    table
}
