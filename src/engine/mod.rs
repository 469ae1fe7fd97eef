//! Dump and export engines
//!
//! Both engines take an already-connected [`DataSource`](crate::core::DataSource)
//! and never read process-wide settings.

pub mod artifact;
pub mod dump;
pub mod encode;
pub mod enumerate;
pub mod export;

#[cfg(test)]
pub(crate) mod testing;

pub use dump::{DumpArtifact, DumpEngine, DumpOptions, TableSummary};
pub use encode::ValueEncoder;
pub use enumerate::{list_tables, require_table};
pub use export::{ExportArtifact, TabularExporter};
