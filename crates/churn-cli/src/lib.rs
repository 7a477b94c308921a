//! Shared CLI infrastructure for the churn scorer binary.

pub mod logging;
