use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::report::density::MARKER_SAMPLE_SIZE;

/// Environment variable overriding [`DashboardConfig::sample_seed`].
pub const SEED_ENV_VAR: &str = "HOUSE_INSIGHTS_SEED";

/// Where the data comes from and how the point map is sampled.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardConfig {
    /// House table (`.csv`, `.json` or `.parquet`).
    pub dataset_path: PathBuf,
    /// Zip-code boundaries: URL or path to a GeoJSON document.
    pub boundary_source: String,
    /// Seed of the point-map sampler.
    pub sample_seed: u64,
    /// Markers drawn on the point map.
    pub marker_sample_size: usize,
    /// Grid cell (degrees) used to cluster nearby markers.
    pub cluster_cell_degrees: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            dataset_path: PathBuf::from("datasets/kc_house_data.csv"),
            boundary_source:
                "https://opendata.arcgis.com/datasets/83fc2e72903343aabff6de8cb445b81c_2.geojson"
                    .to_string(),
            sample_seed: 42,
            marker_sample_size: MARKER_SAMPLE_SIZE,
            cluster_cell_degrees: 0.02,
        }
    }
}

impl DashboardConfig {
    /// Defaults overridden by positional arguments (`[dataset] [boundaries]`)
    /// and the seed environment variable.
    pub fn from_args_and_env(
        args: impl IntoIterator<Item = String>,
        seed: Option<String>,
    ) -> Result<Self> {
        let mut config = Self::default();
        let mut args = args.into_iter();
        if let Some(dataset) = args.next() {
            config.dataset_path = PathBuf::from(dataset);
        }
        if let Some(boundaries) = args.next() {
            config.boundary_source = boundaries;
        }
        if let Some(seed) = seed {
            config.sample_seed = seed
                .trim()
                .parse()
                .with_context(|| format!("{SEED_ENV_VAR}='{seed}' is not an unsigned integer"))?;
        }
        Ok(config)
    }
}
