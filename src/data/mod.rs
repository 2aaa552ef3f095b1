/// Data layer: core types, loading/cleaning, and filtering.
///
/// Architecture:
/// ```text
///  Cars.csv / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → raw Dataset, clean → deduped/coerced view
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Row>, schema order, unique-value index
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  FilterSpec → filtered view + column-type partition
///   └──────────┘
/// ```
pub mod filter;
pub mod loader;
pub mod model;
