//! Error types for the scoring transaction.

use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions of the scoring transaction.
///
/// Coercion anomalies and underivable features never appear here; they
/// degrade to warnings or neutral defaults upstream. An error from this
/// enum aborts the whole transaction with no partial result.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Required canonical fields are unmapped or absent after mapping.
    /// Carries the exact wire names so a caller can offer a fix.
    #[error("missing required fields after mapping: {}", .fields.join(", "))]
    MissingRequiredFields { fields: Vec<String> },

    /// No persisted model at the configured location. Deployment issue;
    /// never silently substituted with a default model.
    #[error("model not found at {path}; train it first with `churn-scorer train`")]
    ModelUnavailable { path: PathBuf },

    /// Model file exists but could not be read.
    #[error("failed to read model artifact {path}: {source}")]
    ArtifactRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Model file is not a valid artifact.
    #[error("invalid model artifact {path}: {source}")]
    ArtifactFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to persist a trained artifact.
    #[error("failed to write model artifact {path}: {source}")]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact's feature contract disagrees with this build's
    /// canonical feature list.
    #[error("model/feature contract mismatch: {reason}")]
    ContractMismatch { reason: String },

    /// Training input unusable (empty table, label problems).
    #[error("training failed: {reason}")]
    Training { reason: String },
}

/// Result type for scoring operations.
pub type Result<T> = std::result::Result<T, ScoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_listed_verbatim() {
        let err = ScoreError::MissingRequiredFields {
            fields: vec!["account_id".to_string(), "plan_tier".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "missing required fields after mapping: account_id, plan_tier"
        );
    }
}
