//! Schema negotiation for arbitrary customer-level uploads.
//!
//! Three concerns live here, in pipeline order:
//!
//! 1. [`apply_mapping`] materializes canonical columns from a confirmed
//!    field mapping while passing unmapped user columns through.
//! 2. [`validate_and_coerce`] types the mapped table into
//!    [`churn_model::ValidatedRow`] records, collecting missing required
//!    fields and advisory warnings.
//! 3. [`fingerprint`]/[`cache_key`] derive the cheap content signature that
//!    gates re-scoring of repeat submissions.

mod fingerprint;
mod mapper;
mod validate;

pub use fingerprint::{cache_key, fingerprint};
pub use mapper::apply_mapping;
pub use validate::{SchemaResult, coerce_bool_token, validate_and_coerce};
