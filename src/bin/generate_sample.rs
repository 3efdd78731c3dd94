//! Writes a synthetic King County style portfolio to `datasets/`:
//! `kc_house_data.csv`, `kc_house_data.parquet` and `zip_codes.geojson`.

use std::fs::{self, File};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Array, ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Duration, NaiveDate};
use parquet::arrow::ArrowWriter;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde_json::json;

const OUTPUT_DIR: &str = "datasets";
const HOUSES: usize = 2_000;
const REGION_HALF_WIDTH: f64 = 0.03;

/// (zipcode, centre lat, centre long, price level)
const NEIGHBOURHOODS: [(i64, f64, f64, f64); 6] = [
    (98001, 47.31, -122.27, 280_000.0),
    (98004, 47.62, -122.20, 1_350_000.0),
    (98033, 47.68, -122.19, 800_000.0),
    (98052, 47.68, -122.12, 650_000.0),
    (98103, 47.67, -122.34, 585_000.0),
    (98118, 47.54, -122.27, 420_000.0),
];

const COLUMNS: [&str; 21] = [
    "id",
    "date",
    "price",
    "bedrooms",
    "bathrooms",
    "sqft_living",
    "sqft_lot",
    "floors",
    "waterfront",
    "view",
    "condition",
    "grade",
    "sqft_above",
    "sqft_basement",
    "yr_built",
    "yr_renovated",
    "zipcode",
    "lat",
    "long",
    "sqft_living15",
    "sqft_lot15",
];

struct House {
    id: i64,
    date: NaiveDate,
    price: f64,
    bedrooms: i64,
    bathrooms: f64,
    sqft_living: i64,
    sqft_lot: i64,
    floors: f64,
    waterfront: i64,
    view: i64,
    condition: i64,
    grade: i64,
    sqft_above: i64,
    sqft_basement: i64,
    yr_built: i64,
    yr_renovated: i64,
    zipcode: i64,
    lat: f64,
    long: f64,
    sqft_living15: i64,
    sqft_lot15: i64,
}

impl House {
    fn random(rng: &mut ChaCha8Rng, index: usize, first_sale: NaiveDate) -> Self {
        let (zipcode, lat, long, level) = NEIGHBOURHOODS[rng.gen_range(0..NEIGHBOURHOODS.len())];
        let bedrooms: i64 = rng.gen_range(1..=6);
        let bathrooms = f64::from(rng.gen_range(2..=10_u8)) * 0.25;
        let sqft_living: i64 = 400 + bedrooms * rng.gen_range(250..=550);
        let sqft_basement = if rng.gen_bool(0.4) { sqft_living / 3 } else { 0 };
        let waterfront = i64::from(rng.gen_bool(0.05));
        let yr_built: i64 = rng.gen_range(1900..=2015);
        let size_factor = sqft_living as f64 / 2_000.0;
        let mut price = level * size_factor * rng.gen_range(0.8..1.2);
        if waterfront == 1 {
            price *= 1.8;
        }

        Self {
            id: 7_129_300_520 + index as i64 * 7_919,
            date: first_sale + Duration::days(rng.gen_range(0..390)),
            price: (price / 100.0).round() * 100.0,
            bedrooms,
            bathrooms,
            sqft_living,
            sqft_lot: rng.gen_range(2..=12) * sqft_living,
            floors: [1.0, 1.5, 2.0, 2.5, 3.0][rng.gen_range(0..5)],
            waterfront,
            view: if waterfront == 1 { 4 } else { rng.gen_range(0..=3) },
            condition: rng.gen_range(1..=5),
            grade: rng.gen_range(5..=11),
            sqft_above: sqft_living - sqft_basement,
            sqft_basement,
            yr_built,
            yr_renovated: if rng.gen_bool(0.1) { rng.gen_range(yr_built..=2015) } else { 0 },
            zipcode,
            lat: lat + rng.gen_range(-REGION_HALF_WIDTH..REGION_HALF_WIDTH),
            long: long + rng.gen_range(-REGION_HALF_WIDTH..REGION_HALF_WIDTH),
            sqft_living15: (sqft_living as f64 * rng.gen_range(0.8..1.2)) as i64,
            sqft_lot15: rng.gen_range(2..=12) * sqft_living,
        }
    }

    /// Sale dates are written the way the county export writes them.
    fn sale_date(&self) -> String {
        self.date.format("%Y%m%dT000000").to_string()
    }

    fn csv_record(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.sale_date(),
            self.price.to_string(),
            self.bedrooms.to_string(),
            self.bathrooms.to_string(),
            self.sqft_living.to_string(),
            self.sqft_lot.to_string(),
            self.floors.to_string(),
            self.waterfront.to_string(),
            self.view.to_string(),
            self.condition.to_string(),
            self.grade.to_string(),
            self.sqft_above.to_string(),
            self.sqft_basement.to_string(),
            self.yr_built.to_string(),
            self.yr_renovated.to_string(),
            self.zipcode.to_string(),
            format!("{:.4}", self.lat),
            format!("{:.4}", self.long),
            self.sqft_living15.to_string(),
            self.sqft_lot15.to_string(),
        ]
    }
}

fn write_csv(houses: &[House], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(COLUMNS)?;
    for house in houses {
        writer.write_record(house.csv_record())?;
    }
    writer.flush()?;
    Ok(())
}

fn int_column(houses: &[House], f: fn(&House) -> i64) -> ArrayRef {
    Arc::new(Int64Array::from(houses.iter().map(f).collect::<Vec<_>>()))
}

fn float_column(houses: &[House], f: fn(&House) -> f64) -> ArrayRef {
    Arc::new(Float64Array::from(houses.iter().map(f).collect::<Vec<_>>()))
}

fn write_parquet(houses: &[House], path: &Path) -> Result<()> {
    let dates: ArrayRef = Arc::new(StringArray::from(
        houses.iter().map(House::sale_date).collect::<Vec<_>>(),
    ));

    let arrays: Vec<ArrayRef> = vec![
        int_column(houses, |h| h.id),
        dates,
        float_column(houses, |h| h.price),
        int_column(houses, |h| h.bedrooms),
        float_column(houses, |h| h.bathrooms),
        int_column(houses, |h| h.sqft_living),
        int_column(houses, |h| h.sqft_lot),
        float_column(houses, |h| h.floors),
        int_column(houses, |h| h.waterfront),
        int_column(houses, |h| h.view),
        int_column(houses, |h| h.condition),
        int_column(houses, |h| h.grade),
        int_column(houses, |h| h.sqft_above),
        int_column(houses, |h| h.sqft_basement),
        int_column(houses, |h| h.yr_built),
        int_column(houses, |h| h.yr_renovated),
        int_column(houses, |h| h.zipcode),
        float_column(houses, |h| h.lat),
        float_column(houses, |h| h.long),
        int_column(houses, |h| h.sqft_living15),
        int_column(houses, |h| h.sqft_lot15),
    ];
    let fields: Vec<Field> = COLUMNS
        .iter()
        .zip(&arrays)
        .map(|(name, array)| Field::new(*name, array.data_type().clone(), false))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let batch = RecordBatch::try_new(schema.clone(), arrays).context("building record batch")?;
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

/// One square polygon per neighbourhood, keyed by the `ZIP` property.
fn write_boundaries(path: &Path) -> Result<()> {
    let features: Vec<_> = NEIGHBOURHOODS
        .iter()
        .map(|&(zip, lat, long, _)| {
            let (w, e) = (long - REGION_HALF_WIDTH, long + REGION_HALF_WIDTH);
            let (s, n) = (lat - REGION_HALF_WIDTH, lat + REGION_HALF_WIDTH);
            json!({
                "type": "Feature",
                "properties": { "ZIP": zip.to_string() },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[w, s], [e, s], [e, n], [w, n], [w, s]]]
                }
            })
        })
        .collect();
    let collection = json!({ "type": "FeatureCollection", "features": features });

    let text = serde_json::to_string_pretty(&collection)?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let first_sale = NaiveDate::from_ymd_opt(2014, 5, 2).context("invalid first sale date")?;
    let houses: Vec<House> = (0..HOUSES)
        .map(|i| House::random(&mut rng, i, first_sale))
        .collect();

    let dir = Path::new(OUTPUT_DIR);
    fs::create_dir_all(dir).with_context(|| format!("creating {OUTPUT_DIR}"))?;
    write_csv(&houses, &dir.join("kc_house_data.csv"))?;
    write_parquet(&houses, &dir.join("kc_house_data.parquet"))?;
    write_boundaries(&dir.join("zip_codes.geojson"))?;

    println!(
        "Wrote {} houses across {} zipcodes to {OUTPUT_DIR}/",
        houses.len(),
        NEIGHBOURHOODS.len()
    );
    Ok(())
}
