use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;

use crate::data::aggregate::group_mean;
use crate::data::boundary::{BoundaryCollection, Polygon};
use crate::data::model::{CellValue, HouseTable, columns};

/// Markers drawn on the point map.
pub const MARKER_SAMPLE_SIZE: usize = 100;

/// Legend title of the choropleth.
pub const CHOROPLETH_LEGEND: &str = "AVG PRICE";

// ---------------------------------------------------------------------------
// Point map
// ---------------------------------------------------------------------------

/// One sold house on the point map.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseMarker {
    pub lat: f64,
    pub long: f64,
    pub popup: String,
}

/// Markers falling into the same grid cell, drawn as one bubble.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerCluster {
    pub lat: f64,
    pub long: f64,
    pub markers: Vec<HouseMarker>,
}

impl MarkerCluster {
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Mean latitude/longitude of the table, used to centre both maps.
pub fn map_center(table: &HouseTable) -> Option<[f64; 2]> {
    let lats = table.numeric_values(columns::LAT);
    let longs = table.numeric_values(columns::LONG);
    if lats.is_empty() || longs.is_empty() {
        return None;
    }
    Some([
        lats.iter().sum::<f64>() / lats.len() as f64,
        longs.iter().sum::<f64>() / longs.len() as f64,
    ])
}

fn popup_text(table: &HouseTable, row: &[CellValue]) -> String {
    let cell = |name: &str| {
        table
            .column_index(name)
            .map(|i| row[i].to_string())
            .unwrap_or_default()
    };
    format!(
        "Sold ${} on: {}. Features: {} sqft, {} bedrooms, {} bathrooms, year built: {}",
        cell(columns::PRICE),
        cell(columns::DATE),
        cell(columns::SQFT_LIVING),
        cell(columns::BEDROOMS),
        cell(columns::BATHROOMS),
        cell(columns::YR_BUILT),
    )
}

/// Draw up to `size` houses at random among those with coordinates.
///
/// Houses without a latitude or longitude are never drawn. A table shorter
/// than `size` yields all of its located houses.
pub fn sample_markers<R: Rng + ?Sized>(
    table: &HouseTable,
    size: usize,
    rng: &mut R,
) -> Vec<HouseMarker> {
    let (Some(lat), Some(long)) = (
        table.column_index(columns::LAT),
        table.column_index(columns::LONG),
    ) else {
        return Vec::new();
    };

    let located: Vec<(usize, f64, f64)> = table
        .rows
        .iter()
        .enumerate()
        .filter_map(|(i, row)| Some((i, row[lat].as_f64()?, row[long].as_f64()?)))
        .collect();

    let amount = size.min(located.len());
    rand::seq::index::sample(rng, located.len(), amount)
        .into_iter()
        .map(|pick| {
            let (row, lat, long) = located[pick];
            HouseMarker {
                lat,
                long,
                popup: popup_text(table, &table.rows[row]),
            }
        })
        .collect()
}

/// Group markers on a `cell_degrees` lat/long grid.
///
/// Clusters come out in grid order with their centroid as position. A
/// non-positive cell size puts each marker in its own cluster.
pub fn cluster_markers(markers: &[HouseMarker], cell_degrees: f64) -> Vec<MarkerCluster> {
    if !(cell_degrees > 0.0) {
        return markers
            .iter()
            .map(|m| MarkerCluster {
                lat: m.lat,
                long: m.long,
                markers: vec![m.clone()],
            })
            .collect();
    }

    let mut cells: BTreeMap<(i64, i64), Vec<HouseMarker>> = BTreeMap::new();
    for m in markers {
        let key = (
            (m.lat / cell_degrees).floor() as i64,
            (m.long / cell_degrees).floor() as i64,
        );
        cells.entry(key).or_default().push(m.clone());
    }

    cells
        .into_values()
        .map(|markers| {
            let n = markers.len() as f64;
            MarkerCluster {
                lat: markers.iter().map(|m| m.lat).sum::<f64>() / n,
                long: markers.iter().map(|m| m.long).sum::<f64>() / n,
                markers,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Choropleth
// ---------------------------------------------------------------------------

/// A boundary region shaded by the mean price of its houses.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethRegion {
    pub zip: String,
    pub mean_price: f64,
    pub polygons: Vec<Polygon>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Choropleth {
    pub regions: Vec<ChoroplethRegion>,
    /// `(min, max)` of the shaded values; `None` when nothing is shaded.
    pub value_range: Option<(f64, f64)>,
    /// Bounding box of the shaded regions, `([min_lon, min_lat], [max_lon, max_lat])`.
    pub extent: Option<([f64; 2], [f64; 2])>,
}

/// Mean price per zipcode joined onto the boundary regions.
///
/// Regions without houses are dropped, as are zipcodes without a region.
pub fn price_choropleth(table: &HouseTable, boundaries: &BoundaryCollection) -> Choropleth {
    let mean_prices: BTreeMap<String, f64> = group_mean(table, columns::ZIPCODE, columns::PRICE)
        .into_iter()
        .filter_map(|(zip, mean)| Some((zip.zip_key()?, mean?)))
        .collect();
    let keys: BTreeSet<String> = mean_prices.keys().cloned().collect();

    let matched = boundaries.restrict_to(&keys);
    let extent = matched.bounds();
    let regions: Vec<ChoroplethRegion> = matched
        .regions
        .into_iter()
        .filter_map(|region| {
            Some(ChoroplethRegion {
                mean_price: *mean_prices.get(&region.zip)?,
                zip: region.zip,
                polygons: region.polygons,
            })
        })
        .collect();

    let value_range = regions.iter().map(|r| r.mean_price).fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
    });

    Choropleth {
        regions,
        value_range,
        extent,
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DensityReport {
    pub center: Option<[f64; 2]>,
    pub clusters: Vec<MarkerCluster>,
    pub choropleth: Choropleth,
}

/// Point map sample plus price choropleth.
pub fn density_report<R: Rng + ?Sized>(
    table: &HouseTable,
    boundaries: &BoundaryCollection,
    sample_size: usize,
    cell_degrees: f64,
    rng: &mut R,
) -> DensityReport {
    let markers = sample_markers(table, sample_size, rng);
    DensityReport {
        center: map_center(table),
        clusters: cluster_markers(&markers, cell_degrees),
        choropleth: price_choropleth(table, boundaries),
    }
}
