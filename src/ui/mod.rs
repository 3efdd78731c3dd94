//! egui rendering: sidebar filters, overview tables, maps and charts.

pub mod map;
pub mod panels;
pub mod plot;
pub mod table;
