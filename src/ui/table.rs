use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::HouseTable;
use crate::report::overview::{AVERAGE_HEADERS, OverviewReport, STATISTICS_HEADERS};
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

/// Render `n_rows` rows under `headers` as a striped, scrollable table.
///
/// `cells` is only called for rows scrolled into view.
fn grid(
    ui: &mut Ui,
    id: &str,
    height: f32,
    headers: &[&str],
    n_rows: usize,
    cells: impl Fn(usize) -> Vec<String>,
) {
    ui.push_id(id, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(height)
            .columns(Column::auto().at_least(60.0), headers.len())
            .header(ROW_HEIGHT + 2.0, |mut header| {
                for h in headers {
                    header.col(|ui: &mut Ui| {
                        ui.strong(*h);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, n_rows, |mut row| {
                    for cell in cells(row.index()) {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
    });
}

/// Display strings of one table row.
fn row_cells(table: &HouseTable, index: usize) -> Vec<String> {
    table
        .rows
        .get(index)
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .unwrap_or_default()
}

fn optional(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{v:.2}"))
}

fn overview_sections(ui: &mut Ui, report: &OverviewReport) {
    let headers: Vec<&str> = report.table.column_names.iter().map(String::as_str).collect();
    let table = &report.table;
    grid(ui, "overview_table", 300.0, &headers, table.len(), |i| row_cells(table, i));

    ui.add_space(8.0);
    ui.columns(2, |cols| {
        cols[0].heading("Average Values");
        let averages: Vec<Vec<String>> = report
            .averages
            .iter()
            .map(|a| {
                vec![
                    a.zipcode.to_string(),
                    a.total_houses.to_string(),
                    optional(a.price),
                    optional(a.sqft_living),
                    optional(a.price_per_area),
                ]
            })
            .collect();
        let n = averages.len();
        grid(&mut cols[0], "average_values", 600.0, &AVERAGE_HEADERS, n, |i| {
            averages[i].clone()
        });

        cols[1].heading("Descriptive Analysis");
        let statistics: Vec<Vec<String>> = report
            .statistics
            .iter()
            .map(|s| {
                vec![
                    s.attribute.clone(),
                    format!("{:.2}", s.max),
                    format!("{:.2}", s.min),
                    format!("{:.2}", s.mean),
                    format!("{:.2}", s.median),
                    format!("{:.2}", s.std),
                ]
            })
            .collect();
        let n = statistics.len();
        grid(&mut cols[1], "descriptive_analysis", 600.0, &STATISTICS_HEADERS, n, |i| {
            statistics[i].clone()
        });
    });
}

/// Render the overview report in the central panel.
pub fn overview(ui: &mut Ui, state: &AppState) {
    ui.heading("Data Overview");
    match &state.overview {
        Some(report) => overview_sections(ui, report),
        None => {
            let message = egui::RichText::new("Overview unavailable for the current selection.");
            ui.label(message.italics());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::sample_table;

    #[test]
    fn test_row_cells_formats_one_row() {
        let table = sample_table(&[(98001, 100.0, 1000, 1990), (98002, 250.5, 1500, 2001)]);
        let cells = row_cells(&table, 1);
        assert_eq!(cells.len(), table.column_names.len());
        let price = table.column_index(crate::data::model::columns::PRICE).unwrap();
        assert_eq!(cells[price], "250.5");
        assert!(row_cells(&table, 2).is_empty());
    }
}
