use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Line, Plot, PlotPoints};

use crate::data::aggregate::Histogram;
use crate::state::AppState;

const LINE_COLOR: Color32 = Color32::LIGHT_BLUE;
const BAR_COLOR: Color32 = Color32::from_rgb(99, 110, 250);

// ---------------------------------------------------------------------------
// Chart helpers
// ---------------------------------------------------------------------------

/// Line chart of `(x, y)` points.
fn line_chart(
    ui: &mut Ui,
    id: &str,
    x_label: &str,
    y_label: &str,
    points: Vec<[f64; 2]>,
    height: f32,
) {
    Plot::new(id)
        .height(height)
        .x_axis_label(x_label)
        .y_axis_label(y_label)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(Line::new(PlotPoints::from(points)).color(LINE_COLOR).width(1.5));
        });
}

/// Bar chart with one bar per histogram bin.
fn histogram_chart(ui: &mut Ui, id: &str, x_label: &str, histogram: &Histogram, height: f32) {
    let bars: Vec<Bar> = histogram
        .bins()
        .map(|(lo, hi, count)| {
            Bar::new((lo + hi) / 2.0, count as f64)
                .width(hi - lo)
                .fill(BAR_COLOR)
        })
        .collect();

    ui.small(format!("{} houses", histogram.total()));
    Plot::new(id)
        .height(height)
        .x_axis_label(x_label)
        .y_axis_label("count")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR));
        });
}

/// Days since the Unix epoch, the x axis of date charts.
fn date_to_x(date: NaiveDate) -> f64 {
    (date.num_days_from_ce() - 719_163) as f64
}

fn x_to_date(x: f64) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32 + 719_163)
}

// ---------------------------------------------------------------------------
// Commercial report
// ---------------------------------------------------------------------------

/// Render the commercial charts in the central panel.
pub fn commercial(ui: &mut Ui, state: &AppState) {
    ui.heading("Commercial Attributes");
    let Some(report) = &state.commercial else {
        return;
    };

    ui.add_space(4.0);
    ui.strong("Average Price per Year Built");
    match &report.by_year_built {
        Some(series) => {
            let points = series
                .iter()
                .map(|&(year, price)| [year as f64, price])
                .collect();
            line_chart(ui, "price_per_year", "yr_built", "price", points, 240.0);
        }
        None => missing(ui, "yr_built"),
    }

    ui.add_space(4.0);
    ui.strong("Average Price per Day");
    match &report.by_date {
        Some(series) => {
            let points: Vec<[f64; 2]> = series
                .iter()
                .map(|&(date, price)| [date_to_x(date), price])
                .collect();
            Plot::new("price_per_day")
                .height(240.0)
                .x_axis_label("date")
                .y_axis_label("price")
                .allow_scroll(false)
                .x_axis_formatter(|mark, _range| {
                    x_to_date(mark.value)
                        .map(|d| d.format("%Y-%m-%d").to_string())
                        .unwrap_or_default()
                })
                .show(ui, |plot_ui| {
                    plot_ui.line(Line::new(PlotPoints::from(points)).color(LINE_COLOR).width(1.5));
                });
        }
        None => missing(ui, "date"),
    }

    ui.add_space(4.0);
    ui.strong("Price Distribution");
    match &report.price_distribution {
        Some(histogram) => histogram_chart(ui, "price_distribution", "price", histogram, 240.0),
        None => missing(ui, "price"),
    }
}

fn missing(ui: &mut Ui, column: &str) {
    ui.label(format!("No usable `{column}` values to chart."));
}

// ---------------------------------------------------------------------------
// Attribute report
// ---------------------------------------------------------------------------

/// Render the attribute histograms in the central panel, two per row.
pub fn attributes(ui: &mut Ui, state: &AppState) {
    ui.heading("House Attributes");
    let Some(report) = &state.attributes else {
        return;
    };

    ui.columns(2, |cols| {
        cols[0].strong("Houses per Bedrooms");
        histogram_chart(&mut cols[0], "per_bedrooms", "bedrooms", &report.bedrooms, 220.0);
        cols[1].strong("Houses per Bathrooms");
        histogram_chart(&mut cols[1], "per_bathrooms", "bathrooms", &report.bathrooms, 220.0);
    });
    ui.add_space(8.0);
    ui.columns(2, |cols| {
        cols[0].strong("Houses per floor");
        histogram_chart(&mut cols[0], "per_floor", "floors", &report.floors, 220.0);
        cols[1].strong("Houses per Water View");
        histogram_chart(&mut cols[1], "per_waterfront", "waterfront", &report.waterfront, 220.0);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_axis_round_trip() {
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(date_to_x(epoch), 0.0);
        let sale = NaiveDate::from_ymd_opt(2014, 10, 13).unwrap();
        assert_eq!(x_to_date(date_to_x(sale)), Some(sale));
    }
}
