use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};

use super::error::LoadError;

/// Property holding the join key of each region.
pub const ZIP_PROPERTY: &str = "ZIP";

/// Upper bound on the size of a downloaded boundary document.
const MAX_DOWNLOAD_BYTES: u64 = 64 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Region boundaries
// ---------------------------------------------------------------------------

/// Closed ring of `[longitude, latitude]` points (GeoJSON axis order).
pub type Ring = Vec<[f64; 2]>;

/// Polygon: outer ring first, then holes.
pub type Polygon = Vec<Ring>;

/// One named region of the boundary document.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// Join key (`ZIP` property), normalised to text.
    pub zip: String,
    pub polygons: Vec<Polygon>,
}

/// All regions of a boundary document, in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundaryCollection {
    pub regions: Vec<Region>,
}

impl BoundaryCollection {
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Keep only regions whose key is in `keys`.
    pub fn restrict_to(&self, keys: &BTreeSet<String>) -> BoundaryCollection {
        BoundaryCollection {
            regions: self
                .regions
                .iter()
                .filter(|r| keys.contains(&r.zip))
                .cloned()
                .collect(),
        }
    }

    /// Bounding box as `([min_lon, min_lat], [max_lon, max_lat])`.
    pub fn bounds(&self) -> Option<([f64; 2], [f64; 2])> {
        let mut points = self
            .regions
            .iter()
            .flat_map(|r| r.polygons.iter())
            .flat_map(|p| p.iter())
            .flat_map(|ring| ring.iter())
            .peekable();
        points.peek()?;
        let mut min = [f64::INFINITY; 2];
        let mut max = [f64::NEG_INFINITY; 2];
        for p in points {
            for axis in 0..2 {
                min[axis] = min[axis].min(p[axis]);
                max[axis] = max[axis].max(p[axis]);
            }
        }
        Some((min, max))
    }
}

// ---------------------------------------------------------------------------
// GeoJSON document shape
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct FeatureCollectionDoc {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<FeatureDoc>,
}

#[derive(Deserialize)]
struct FeatureDoc {
    #[serde(default)]
    properties: Option<Map<String, JsonValue>>,
    #[serde(default)]
    geometry: Option<GeometryDoc>,
}

/// Positions may carry a third (altitude) value, which is dropped.
#[derive(Deserialize)]
#[serde(tag = "type")]
enum GeometryDoc {
    Polygon {
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    #[serde(other)]
    Unsupported,
}

fn to_ring(positions: Vec<Vec<f64>>) -> Ring {
    positions
        .into_iter()
        .filter(|p| p.len() >= 2)
        .map(|p| [p[0], p[1]])
        .collect()
}

fn to_polygon(rings: Vec<Vec<Vec<f64>>>) -> Polygon {
    rings.into_iter().map(to_ring).collect()
}

fn zip_from_property(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        JsonValue::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Some(i.to_string()),
            (None, Some(f)) if f.fract() == 0.0 => Some(format!("{}", f as i64)),
            _ => Some(n.to_string()),
        },
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Load a boundary document from a URL (`http://`, `https://`) or a path.
pub fn load_boundaries(source: &str) -> Result<BoundaryCollection, LoadError> {
    let text = if source.starts_with("http://") || source.starts_with("https://") {
        fetch(source)?
    } else {
        std::fs::read_to_string(Path::new(source)).map_err(|e| LoadError::Io {
            path: source.into(),
            source: e,
        })?
    };
    let collection = parse_boundaries(&text, source)?;
    log::info!("Loaded {} boundary regions from {source}", collection.len());
    Ok(collection)
}

fn fetch(url: &str) -> Result<String, LoadError> {
    log::info!("Downloading boundaries from {url}");
    let network_err = |reason: String| LoadError::Network {
        url: url.to_string(),
        reason,
    };
    let response = ureq::get(url)
        .call()
        .map_err(|err| network_err(format!("request failed: {err}")))?;
    let mut body = response.into_body();
    body.with_config()
        .limit(MAX_DOWNLOAD_BYTES)
        .read_to_string()
        .map_err(|err| network_err(format!("reading response body: {err}")))
}

/// Parse a GeoJSON `FeatureCollection` into regions keyed by [`ZIP_PROPERTY`].
///
/// Features without a key or without polygon geometry are skipped.
pub fn parse_boundaries(text: &str, source_name: &str) -> Result<BoundaryCollection, LoadError> {
    let doc: FeatureCollectionDoc =
        serde_json::from_str(text).map_err(|source| LoadError::Json {
            path: source_name.to_string(),
            source,
        })?;
    if doc.kind != "FeatureCollection" {
        return Err(LoadError::InvalidGeometry {
            source_name: source_name.to_string(),
            reason: format!("expected a FeatureCollection, found '{}'", doc.kind),
        });
    }

    let mut regions = Vec::with_capacity(doc.features.len());
    let mut skipped = 0usize;
    for feature in doc.features {
        let zip = feature
            .properties
            .as_ref()
            .and_then(|props| props.get(ZIP_PROPERTY))
            .and_then(zip_from_property);
        let polygons = match feature.geometry {
            Some(GeometryDoc::Polygon { coordinates }) => vec![to_polygon(coordinates)],
            Some(GeometryDoc::MultiPolygon { coordinates }) => {
                coordinates.into_iter().map(to_polygon).collect()
            }
            Some(GeometryDoc::Unsupported) | None => Vec::new(),
        };
        match zip {
            Some(zip) if !polygons.is_empty() => regions.push(Region { zip, polygons }),
            _ => skipped += 1,
        }
    }
    if skipped > 0 {
        log::warn!(
            "{source_name}: skipped {skipped} features without a {ZIP_PROPERTY} key or polygon geometry"
        );
    }

    Ok(BoundaryCollection { regions })
}
