//! The four report views. Each is a pure function of the derived house
//! table (plus boundaries for the density maps) and its sidebar filters.

pub mod attributes;
pub mod commercial;
pub mod density;
pub mod overview;
