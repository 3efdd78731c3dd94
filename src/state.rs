use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::config::DashboardConfig;
use crate::data::boundary::{BoundaryCollection, load_boundaries};
use crate::data::cache::LoadCache;
use crate::data::derive::add_price_per_area;
use crate::data::filter::choices;
use crate::data::loader::load_table;
use crate::data::model::{CellValue, HouseTable, columns};
use crate::report::attributes::{
    AttributeChoices, AttributeFilters, AttributeReport, attribute_report,
};
use crate::report::commercial::{
    CommercialBounds, CommercialFilters, CommercialReport, commercial_report,
};
use crate::report::density::{DensityReport, density_report};
use crate::report::overview::{OverviewFilters, OverviewReport, overview_report};

// ---------------------------------------------------------------------------
// Report tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportTab {
    #[default]
    Overview,
    Density,
    Commercial,
    Attributes,
}

impl ReportTab {
    pub const ALL: [ReportTab; 4] = [
        ReportTab::Overview,
        ReportTab::Density,
        ReportTab::Commercial,
        ReportTab::Attributes,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ReportTab::Overview => "Data Overview",
            ReportTab::Density => "Region Overview",
            ReportTab::Commercial => "Commercial Attributes",
            ReportTab::Attributes => "House Attributes",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Loading goes through the caches; every filter change re-runs only the
/// affected report from the shared, already-derived table.
pub struct AppState {
    pub config: DashboardConfig,

    /// Derived tables, keyed by path.
    tables: LoadCache<HouseTable>,
    /// Boundary documents, keyed by URL or path.
    boundary_cache: LoadCache<BoundaryCollection>,

    /// Loaded, derived house table (None until a load succeeds).
    pub dataset: Option<Arc<HouseTable>>,
    /// Loaded boundary regions (None until a load succeeds).
    pub boundaries: Option<Arc<BoundaryCollection>>,

    pub active_tab: ReportTab,

    // -- Sidebar selections and their choices --
    pub overview_filters: OverviewFilters,
    pub zipcode_choices: Vec<CellValue>,
    pub commercial_bounds: CommercialBounds,
    pub commercial_filters: CommercialFilters,
    pub attribute_choices: AttributeChoices,
    pub attribute_filters: AttributeFilters,

    /// Bumped by "Resample" so the point map draws a new sample.
    pub sample_draw: u64,

    // -- Latest report outputs --
    pub overview: Option<OverviewReport>,
    pub density: Option<DensityReport>,
    pub commercial: Option<CommercialReport>,
    pub attributes: Option<AttributeReport>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let attribute_choices = AttributeChoices::default();
        Self {
            config,
            tables: LoadCache::new(),
            boundary_cache: LoadCache::new(),
            dataset: None,
            boundaries: None,
            active_tab: ReportTab::default(),
            overview_filters: OverviewFilters::default(),
            zipcode_choices: Vec::new(),
            commercial_bounds: CommercialBounds::default(),
            commercial_filters: CommercialFilters::default(),
            attribute_filters: AttributeFilters::from(&attribute_choices),
            attribute_choices,
            sample_draw: 0,
            overview: None,
            density: None,
            commercial: None,
            attributes: None,
            status_message: None,
        }
    }

    /// Load both configured sources, reporting failures in the status line.
    pub fn load_configured_sources(&mut self) {
        let dataset_path = self.config.dataset_path.clone();
        let boundary_source = self.config.boundary_source.clone();
        let result = self
            .load_dataset(&dataset_path)
            .and_then(|_| self.load_boundaries(&boundary_source));
        if let Err(e) = result {
            self.report_error(e);
        }
    }

    /// Drop the cached configured sources and read them again.
    pub fn reload_configured_sources(&mut self) {
        self.tables.invalidate(&self.config.dataset_path.display().to_string());
        self.boundary_cache.invalidate(&self.config.boundary_source);
        self.load_configured_sources();
    }

    /// Load (or fetch from cache) a house table and make it current.
    pub fn load_dataset(&mut self, path: &Path) -> Result<()> {
        let key = path.display().to_string();
        let table = self
            .tables
            .get_or_load(&key, |k| load_table(Path::new(k)).map(add_price_per_area))
            .with_context(|| format!("loading dataset {key}"))?;
        self.config.dataset_path = path.to_path_buf();
        self.set_dataset(table);
        Ok(())
    }

    /// Load (or fetch from cache) a boundary document and make it current.
    pub fn load_boundaries(&mut self, source: &str) -> Result<()> {
        let boundaries = self
            .boundary_cache
            .get_or_load(source, load_boundaries)
            .with_context(|| format!("loading boundaries {source}"))?;
        self.config.boundary_source = source.to_string();
        self.boundaries = Some(boundaries);
        self.refresh_density();
        Ok(())
    }

    /// Ingest a derived table: rebuild choices and default selections, then
    /// every report.
    pub fn set_dataset(&mut self, table: Arc<HouseTable>) {
        self.overview_filters = OverviewFilters::default();
        self.zipcode_choices = choices(&table, columns::ZIPCODE);
        self.commercial_bounds = CommercialBounds::from_table(&table);
        self.commercial_filters = CommercialFilters::from(&self.commercial_bounds);
        self.attribute_choices = AttributeChoices::from_table(&table);
        self.attribute_filters = AttributeFilters::from(&self.attribute_choices);

        self.dataset = Some(table);
        self.status_message = None;
        self.refresh_all();
    }

    pub fn refresh_all(&mut self) {
        self.refresh_overview();
        self.refresh_density();
        self.refresh_commercial();
        self.refresh_attributes();
    }

    pub fn refresh_overview(&mut self) {
        let Some(table) = &self.dataset else { return };
        match overview_report(table, &self.overview_filters) {
            Ok(report) => self.overview = Some(report),
            Err(e) => {
                self.overview = None;
                self.report_error(anyhow::Error::new(e).context("building overview"));
            }
        }
    }

    /// The point map needs only the table; the choropleth also needs boundaries.
    pub fn refresh_density(&mut self) {
        let Some(table) = &self.dataset else { return };
        let empty = BoundaryCollection::default();
        let boundaries = self.boundaries.as_deref().unwrap_or(&empty);
        let seed = self.config.sample_seed.wrapping_add(self.sample_draw);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        self.density = Some(density_report(
            table,
            boundaries,
            self.config.marker_sample_size,
            self.config.cluster_cell_degrees,
            &mut rng,
        ));
    }

    pub fn refresh_commercial(&mut self) {
        let Some(table) = &self.dataset else { return };
        self.commercial = Some(commercial_report(table, &self.commercial_filters));
    }

    pub fn refresh_attributes(&mut self) {
        let Some(table) = &self.dataset else { return };
        self.attributes = Some(attribute_report(table, &self.attribute_filters));
    }

    /// Draw a new point-map sample.
    pub fn resample(&mut self) {
        self.sample_draw = self.sample_draw.wrapping_add(1);
        self.refresh_density();
    }

    /// Toggle a zipcode in the overview selection.
    pub fn toggle_zipcode(&mut self, zipcode: &CellValue) {
        let selected = &mut self.overview_filters.zipcodes;
        if !selected.remove(zipcode) {
            selected.insert(zipcode.clone());
        }
        self.refresh_overview();
    }

    /// Toggle a column in the overview selection, keeping selection order.
    pub fn toggle_column(&mut self, column: &str) {
        let selected = &mut self.overview_filters.columns;
        match selected.iter().position(|c| c == column) {
            Some(i) => {
                selected.remove(i);
            }
            None => selected.push(column.to_string()),
        }
        self.refresh_overview();
    }

    pub fn clear_overview_filters(&mut self) {
        self.overview_filters = OverviewFilters::default();
        self.refresh_overview();
    }

    pub fn report_error(&mut self, e: anyhow::Error) {
        log::error!("{e:#}");
        self.status_message = Some(format!("Error: {e:#}"));
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use tempfile::TempDir;

    use super::*;
    use crate::data::boundary::tests::TWO_REGIONS;

    fn write_sources(dir: &TempDir) -> (PathBuf, PathBuf) {
        let csv = dir.path().join("houses.csv");
        std::fs::write(
            &csv,
            "id,date,price,bedrooms,bathrooms,sqft_living,sqft_lot,floors,waterfront,yr_built,zipcode,lat,long\n\
             1,20140502T000000,100,2,1,1000,5000,1,0,1950,98001,47.30,-122.25\n\
             2,20140601T000000,300,3,2.25,2000,0,2,1,1990,98001,47.31,-122.26\n\
             3,20150101T000000,500,4,3,2500,8000,1.5,0,2005,98002,47.25,-122.05\n",
        )
        .unwrap();
        let geojson = dir.path().join("zips.geojson");
        std::fs::write(&geojson, TWO_REGIONS).unwrap();
        (csv, geojson)
    }

    fn loaded_state(dir: &TempDir) -> AppState {
        let (csv, geojson) = write_sources(dir);
        let config = DashboardConfig {
            dataset_path: csv,
            boundary_source: geojson.display().to_string(),
            ..DashboardConfig::default()
        };
        let mut state = AppState::new(config);
        state.load_configured_sources();
        state
    }

    #[test]
    fn test_load_builds_every_report() {
        let dir = TempDir::new().unwrap();
        let state = loaded_state(&dir);
        assert_eq!(state.status_message, None);

        let table = state.dataset.as_ref().unwrap();
        assert!(table.has_column(columns::PRICE_PER_AREA));
        assert_eq!(state.zipcode_choices.len(), 2);

        let overview = state.overview.as_ref().unwrap();
        assert_eq!(overview.table.len(), 3);
        assert_eq!(overview.averages.len(), 2);

        let density = state.density.as_ref().unwrap();
        assert_eq!(density.choropleth.regions.len(), 2);
        assert_eq!(density.clusters.iter().map(|c| c.len()).sum::<usize>(), 3);

        // Defaults: oldest year and first date select nothing.
        let commercial = state.commercial.as_ref().unwrap();
        assert_eq!(commercial.by_year_built, Some(Vec::new()));
        assert_eq!(commercial.by_date, Some(Vec::new()));
        assert_eq!(commercial.price_distribution.as_ref().map(|h| h.total()), Some(1));

        assert!(state.attributes.is_some());
    }

    #[test]
    fn test_reloading_same_path_reuses_instance() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded_state(&dir);
        let first = Arc::clone(state.dataset.as_ref().unwrap());
        let path = state.config.dataset_path.clone();
        state.load_dataset(&path).unwrap();
        assert!(Arc::ptr_eq(&first, state.dataset.as_ref().unwrap()));
    }

    #[test]
    fn test_reload_reads_sources_again() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded_state(&dir);
        let first = Arc::clone(state.dataset.as_ref().unwrap());
        state.reload_configured_sources();
        let second = state.dataset.as_ref().unwrap();
        assert!(!Arc::ptr_eq(&first, second));
        assert_eq!(first.as_ref(), second.as_ref());
    }

    #[test]
    fn test_missing_dataset_sets_status() {
        let dir = TempDir::new().unwrap();
        let config = DashboardConfig {
            dataset_path: dir.path().join("missing.csv"),
            ..DashboardConfig::default()
        };
        let mut state = AppState::new(config);
        state.load_configured_sources();
        assert!(state.dataset.is_none());
        let message = state.status_message.unwrap();
        assert!(message.contains("missing.csv"), "{message}");
    }

    #[test]
    fn test_overview_toggles_refresh_report() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded_state(&dir);
        state.toggle_zipcode(&CellValue::Integer(98002));
        state.toggle_column(columns::PRICE);
        let overview = state.overview.as_ref().unwrap();
        assert_eq!(overview.table.column_names, vec![columns::PRICE]);
        assert_eq!(overview.table.len(), 1);

        state.toggle_zipcode(&CellValue::Integer(98002));
        assert_eq!(state.overview.as_ref().unwrap().table.len(), 3);
        state.clear_overview_filters();
        assert_eq!(state.overview.as_ref().unwrap().table.column_names.len(), 14);
    }

    #[test]
    fn test_commercial_threshold_change() {
        let dir = TempDir::new().unwrap();
        let mut state = loaded_state(&dir);
        state.commercial_filters.max_year_built = Some(2006);
        state.refresh_commercial();
        let commercial = state.commercial.as_ref().unwrap();
        assert_eq!(commercial.by_year_built.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn test_commercial_views_survive_unparseable_dates() {
        let dir = TempDir::new().unwrap();
        let csv = dir.path().join("houses.csv");
        std::fs::write(
            &csv,
            "id,date,price,bedrooms,bathrooms,sqft_living,sqft_lot,floors,waterfront,yr_built,zipcode,lat,long\n\
             1,unknown,100,2,1,1000,5000,1,0,1950,98001,47.30,-122.25\n\
             2,unknown,300,3,2,2000,4000,2,0,1990,98001,47.31,-122.26\n",
        )
        .unwrap();
        let mut state = AppState::new(DashboardConfig::default());
        state.load_dataset(&csv).unwrap();

        assert!(state.commercial_bounds.date.is_none());
        let commercial = state.commercial.as_ref().unwrap();
        assert_eq!(commercial.by_date, None);
        assert_eq!(commercial.by_year_built, Some(Vec::new()));
        let histogram = commercial.price_distribution.as_ref().unwrap();
        assert_eq!(histogram.total(), 1);
    }

    #[test]
    fn test_resample_is_deterministic_per_draw() {
        let dir = TempDir::new().unwrap();
        let mut a = loaded_state(&dir);
        let mut b = loaded_state(&dir);
        a.resample();
        b.resample();
        assert_eq!(a.density, b.density);
    }
}
