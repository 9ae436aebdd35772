/// Data layer: core types, loading, filtering, statistics and CSV output.
///
/// Architecture:
/// ```text
///  .csv / .dat / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  Table    │  Vec<Column>, each cell a CellValue
///   └──────────┘
///        │
///        ├──► filter   numeric range predicates → row indices
///        ├──► stats    describe() per numeric column
///        ▼
///   ┌──────────┐
///   │  writer   │  Table → .csv (loaded cells written verbatim)
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod stats;
pub mod writer;

pub use model::{CellValue, Column, Table, TableError};
