use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::model::CellValue;
use crate::state::{AppState, ReportTab};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets of the active report
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.active_tab {
            ReportTab::Overview => overview_filters(ui, state),
            ReportTab::Density => density_options(ui, state),
            ReportTab::Commercial => commercial_filters(ui, state),
            ReportTab::Attributes => attribute_filters(ui, state),
        });
}

fn overview_filters(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset.clone() else {
        return;
    };

    if ui.small_button("Clear selection").clicked() {
        state.clear_overview_filters();
    }

    let n_columns = state.overview_filters.columns.len();
    egui::CollapsingHeader::new(
        RichText::new(format!(
            "Enter columns  ({n_columns}/{})",
            dataset.column_names.len()
        ))
        .strong(),
    )
    .id_salt("overview_columns")
    .default_open(false)
    .show(ui, |ui: &mut Ui| {
        for col in &dataset.column_names {
            let mut checked = state.overview_filters.columns.contains(col);
            if ui.checkbox(&mut checked, col.as_str()).changed() {
                state.toggle_column(col);
            }
        }
    });

    let zipcodes = state.zipcode_choices.clone();
    let n_zipcodes = state.overview_filters.zipcodes.len();
    egui::CollapsingHeader::new(
        RichText::new(format!("Enter zipcode  ({n_zipcodes}/{})", zipcodes.len())).strong(),
    )
    .id_salt("overview_zipcodes")
    .default_open(false)
    .show(ui, |ui: &mut Ui| {
        for zip in &zipcodes {
            let mut checked = state.overview_filters.zipcodes.contains(zip);
            if ui.checkbox(&mut checked, zip.to_string()).changed() {
                state.toggle_zipcode(zip);
            }
        }
    });
}

fn density_options(ui: &mut Ui, state: &mut AppState) {
    ui.label(format!(
        "Point map: random sample of {} houses (seed {}, draw {}).",
        state.config.marker_sample_size, state.config.sample_seed, state.sample_draw
    ));
    if ui.button("Resample").clicked() {
        state.resample();
    }
    ui.separator();
    match &state.boundaries {
        Some(b) => ui.label(format!("{} boundary regions loaded.", b.len())),
        None => ui.label(RichText::new("No boundaries loaded.").color(Color32::YELLOW)),
    };
}

fn commercial_filters(ui: &mut Ui, state: &mut AppState) {
    let bounds = state.commercial_bounds;
    let mut filters = state.commercial_filters;

    ui.strong("Commercial Options");

    ui.label("Select Max Year Built");
    match (bounds.year_built, filters.max_year_built.as_mut()) {
        (Some(range), Some(year)) => {
            ui.add(egui::Slider::new(year, range.min..=range.max).text("Year Built"));
        }
        _ => unavailable(ui, "No year built values."),
    }

    ui.label("Select Max Date");
    match (bounds.date, filters.max_date.as_mut()) {
        (Some(range), Some(date)) => {
            ui.add(DatePickerButton::new(date).id_salt("max_date"));
            *date = (*date).clamp(range.min, range.max);
        }
        _ => unavailable(ui, "No parseable sale dates."),
    }

    ui.label("Select Max Price");
    match (bounds.price, filters.max_price.as_mut()) {
        (Some(range), Some(price)) => {
            let mut max_price = *price as i64;
            ui.add(egui::Slider::new(&mut max_price, range.min..=range.max).text("Price"));
            *price = max_price as f64;
        }
        _ => unavailable(ui, "No price values."),
    }

    if filters != state.commercial_filters {
        state.commercial_filters = filters;
        state.refresh_commercial();
    }
}

fn unavailable(ui: &mut Ui, message: &str) {
    ui.label(RichText::new(message).italics().color(Color32::GRAY));
}

fn value_dropdown(ui: &mut Ui, id: &str, label: &str, choices: &[f64], selected: &mut f64) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(CellValue::Float(*selected).to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for &choice in choices {
                ui.selectable_value(selected, choice, CellValue::Float(choice).to_string());
            }
        });
    ui.label(label);
}

fn attribute_filters(ui: &mut Ui, state: &mut AppState) {
    let choices = state.attribute_choices.clone();
    let mut filters = state.attribute_filters;

    ui.strong("Attributes Options");
    ui.horizontal(|ui: &mut Ui| {
        value_dropdown(
            ui,
            "max_bedrooms",
            "Max number of bedrooms",
            &choices.bedrooms,
            &mut filters.max_bedrooms,
        );
    });
    ui.horizontal(|ui: &mut Ui| {
        value_dropdown(
            ui,
            "max_bathrooms",
            "Max number of bathrooms",
            &choices.bathrooms,
            &mut filters.max_bathrooms,
        );
    });
    ui.horizontal(|ui: &mut Ui| {
        value_dropdown(
            ui,
            "max_floors",
            "Max number of floor",
            &choices.floors,
            &mut filters.max_floors,
        );
    });
    ui.checkbox(&mut filters.waterfront_only, "Only Houses with Water View");

    if filters != state.attribute_filters {
        state.attribute_filters = filters;
        state.refresh_attributes();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open dataset…").clicked() {
                open_dataset_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open boundaries…").clicked() {
                open_boundaries_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload configured sources").clicked() {
                state.reload_configured_sources();
                ui.close_menu();
            }
        });

        ui.separator();

        for tab in ReportTab::ALL {
            ui.selectable_value(&mut state.active_tab, tab, tab.label());
        }

        ui.separator();

        if let Some(ds) = &state.dataset {
            let visible = state.overview.as_ref().map_or(0, |o| o.table.len());
            ui.label(format!("{} houses loaded, {} in overview", ds.len(), visible));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_dataset_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open house dataset")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.load_dataset(&path) {
            state.report_error(e);
        }
    }
}

pub fn open_boundaries_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open zip-code boundaries")
        .add_filter("GeoJSON", &["geojson", "json"])
        .pick_file();

    if let Some(path) = file {
        let source = path.display().to_string();
        if let Err(e) = state.load_boundaries(&source) {
            state.report_error(e);
        }
    }
}
