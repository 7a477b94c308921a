//! Core data model for the churn scoring pipeline.
//!
//! Defines the canonical field catalogue, the raw/mapped table
//! representation, field mappings, validated account records, and the
//! risk output types shared by every pipeline stage.

pub mod field;
pub mod mapping;
pub mod record;
pub mod risk;
pub mod table;
pub mod value;

pub use field::{Field, OPTIONAL_FIELDS, REQUIRED_FIELDS};
pub use mapping::FieldMapping;
pub use record::ValidatedRow;
pub use risk::{ChurnTimeline, RiskTier, ScoredAccount};
pub use table::RawTable;
pub use value::{format_numeric, parse_f64, parse_i64};
