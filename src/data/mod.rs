/// Data layer: core types, loading, projection, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file, clean price → ListingTable
///   └──────────┘
///        │
///        ├──────────────────────┐
///        ▼                      ▼
///   ┌──────────┐          ┌──────────┐
///   │ project   │          │  filter   │  sidebar predicates → row indices
///   └──────────┘          └──────────┘
///        │  Vec<ProjectedListing>
///        ▼
///     charts
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod project;
