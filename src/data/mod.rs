/// Data layer: core types, loading, derived features, filtering and grouping.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet        .geojson (path or URL)
///        │                              │
///        ▼                              ▼
///   ┌──────────┐                  ┌──────────┐
///   │  loader   │                  │ boundary  │
///   └──────────┘                  └──────────┘
///        │        both memoized by      │
///        │        cache::LoadCache      │
///        ▼                              │
///   ┌──────────┐                        │
///   │  derive   │  + price_per_area     │
///   └──────────┘                        │
///        │                              │
///        ▼                              ▼
///   ┌────────────────────────────────────────┐
///   │ filter + aggregate → crate::report::*   │
///   └────────────────────────────────────────┘
/// ```

pub mod aggregate;
pub mod boundary;
pub mod cache;
pub mod derive;
pub mod error;
pub mod filter;
pub mod loader;
pub mod model;
