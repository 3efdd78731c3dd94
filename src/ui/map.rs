use eframe::egui::{self, Color32, RichText, Stroke, Ui};
use egui_plot::{Plot, PlotPoints, Points, Polygon};

use crate::color::ColorScale;
use crate::report::density::{CHOROPLETH_LEGEND, DensityReport};
use crate::state::AppState;

const MAP_HEIGHT: f32 = 420.0;
const MARKER_COLOR: Color32 = Color32::from_rgb(49, 130, 189);

/// Plot aspect that keeps a degree of longitude its true width at `lat`.
fn map_aspect(center: Option<[f64; 2]>) -> f32 {
    center
        .map(|[lat, _]| (1.0 / lat.to_radians().cos()) as f32)
        .filter(|a| a.is_finite() && *a > 0.0)
        .unwrap_or(1.0)
}

/// A lat/long plot around the map centre, widened to `extent` when given.
fn base_map(
    id: &str,
    report: &DensityReport,
    extent: Option<([f64; 2], [f64; 2])>,
) -> Plot<'static> {
    let mut plot = Plot::new(id)
        .height(MAP_HEIGHT)
        .data_aspect(map_aspect(report.center))
        .x_axis_label("long")
        .y_axis_label("lat")
        .show_grid(false);
    if let Some([lat, long]) = report.center {
        plot = plot.include_x(long).include_y(lat);
    }
    if let Some(([min_lon, min_lat], [max_lon, max_lat])) = extent {
        plot = plot
            .include_x(min_lon)
            .include_x(max_lon)
            .include_y(min_lat)
            .include_y(max_lat);
    }
    plot
}

fn point_map(ui: &mut Ui, report: &DensityReport) {
    base_map("portfolio_density", report, None).show(ui, |plot_ui| {
        for cluster in report.clusters.iter().filter(|c| !c.is_empty()) {
            let radius = 3.0 + (cluster.len() as f32).sqrt() * 2.5;
            let label = if cluster.len() == 1 {
                cluster.markers[0].popup.clone()
            } else {
                format!("{} houses", cluster.len())
            };
            plot_ui.points(
                Points::new(PlotPoints::from(vec![[cluster.long, cluster.lat]]))
                    .radius(radius)
                    .color(MARKER_COLOR)
                    .name(label),
            );
        }
    });

    egui::CollapsingHeader::new("Sampled houses")
        .id_salt("sampled_houses")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            for marker in report.clusters.iter().flat_map(|c| c.markers.iter()) {
                ui.label(&marker.popup);
            }
        });
}

fn choropleth_map(ui: &mut Ui, report: &DensityReport) {
    let Some((min, max)) = report.choropleth.value_range else {
        ui.label("No boundary region matches a zipcode of the dataset.");
        return;
    };
    let scale = ColorScale::yl_or_rd(CHOROPLETH_LEGEND, min, max);

    base_map("price_density", report, report.choropleth.extent).show(ui, |plot_ui| {
        for region in &report.choropleth.regions {
            let fill = scale.fill_for(region.mean_price);
            for polygon in &region.polygons {
                let Some(outer) = polygon.first() else { continue };
                let points: Vec<[f64; 2]> = outer.clone();
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(points))
                        .fill_color(fill)
                        .stroke(Stroke::new(0.5, Color32::from_black_alpha(50)))
                        .name(format!("{}: {:.0}", region.zip, region.mean_price)),
                );
            }
        }
    });

    ui.horizontal_wrapped(|ui: &mut Ui| {
        ui.strong(&scale.title);
        for (label, color) in scale.legend_entries(6) {
            ui.label(RichText::new("■").color(color));
            ui.label(label);
        }
    });
}

/// Render the density maps in the central panel.
pub fn density(ui: &mut Ui, state: &AppState) {
    ui.heading("Region Overview");
    let Some(report) = &state.density else {
        return;
    };

    ui.columns(2, |cols| {
        cols[0].heading("Portfolio Density");
        point_map(&mut cols[0], report);

        cols[1].heading("Price Density");
        match &state.boundaries {
            Some(b) if !b.is_empty() => choropleth_map(&mut cols[1], report),
            Some(_) => {
                let message = RichText::new("Boundary document has no regions.");
                cols[1].label(message.color(Color32::YELLOW));
            }
            None => {
                cols[1].label(RichText::new("Boundaries not loaded.").color(Color32::YELLOW));
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_aspect() {
        assert_eq!(map_aspect(None), 1.0);
        assert_eq!(map_aspect(Some([0.0, 0.0])), 1.0);
        let seattle = map_aspect(Some([47.5, -122.2]));
        assert!((seattle - 1.48).abs() < 0.01);
    }
}
