//! Tabular I/O for the churn scoring pipeline.
//!
//! Loads arbitrary user uploads (CSV/TSV) into a [`churn_model::RawTable`]
//! and writes scored results back out as CSV.

mod error;
mod export;
mod reader;

pub use error::{IngestError, Result};
pub use export::write_scored_csv;
pub use reader::{read_table, read_table_from_reader};
