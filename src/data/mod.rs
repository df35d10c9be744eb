/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + prepare → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<BatteryRecord>, column index
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  element-containment predicate → row indices
///   └──────────┘
/// ```
pub mod filter;
pub mod loader;
pub mod model;
