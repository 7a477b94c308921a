//! Persisted model artifact and probability inference.
//!
//! The artifact is a versionless JSON file produced by [`crate::fit`]. It
//! records the canonical feature list it was fit against; loading verifies
//! that list against this build so a stale artifact can never silently
//! consume a reordered feature vector.

use std::path::Path;

use churn_features::{FEATURE_COLUMNS, FeatureRow, NUMERIC_FEATURE_COUNT};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, ScoreError};

/// Default location of the persisted model.
pub const DEFAULT_MODEL_PATH: &str = "models/churn_risk_model.json";

/// A trained binary probability model.
///
/// Logistic regression over the canonical feature vector: NaN inputs are
/// imputed with training medians, numeric features standardized with
/// training means/stds, and the plan tier one-hot encoded against the
/// training categories (first category dropped, unknown tiers encode as
/// all zeros).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Canonical feature list this model was fit against.
    pub feature_columns: Vec<String>,
    /// Sorted plan-tier categories observed at training time.
    pub plan_tiers: Vec<String>,
    /// Per-numeric-feature imputation value (training median).
    pub medians: Vec<f64>,
    /// Per-numeric-feature standardization mean.
    pub means: Vec<f64>,
    /// Per-numeric-feature standardization deviation (1.0 for constants).
    pub stds: Vec<f64>,
    /// Coefficients: numeric features first, then one-hot tier columns.
    pub weights: Vec<f64>,
    pub intercept: f64,
    /// RFC 3339 timestamp of the training run.
    pub trained_at: String,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

impl ModelArtifact {
    /// Width of the encoded input vector.
    pub fn encoded_width(&self) -> usize {
        NUMERIC_FEATURE_COUNT + self.plan_tiers.len().saturating_sub(1)
    }

    /// Check internal consistency and the feature contract against this
    /// build's canonical list.
    pub fn validate(&self) -> Result<()> {
        if self.feature_columns != FEATURE_COLUMNS {
            return Err(ScoreError::ContractMismatch {
                reason: format!(
                    "artifact was fit against [{}]",
                    self.feature_columns.join(", ")
                ),
            });
        }
        for (name, len) in [
            ("medians", self.medians.len()),
            ("means", self.means.len()),
            ("stds", self.stds.len()),
        ] {
            if len != NUMERIC_FEATURE_COUNT {
                return Err(ScoreError::ContractMismatch {
                    reason: format!("{name} has {len} entries, expected {NUMERIC_FEATURE_COUNT}"),
                });
            }
        }
        if self.weights.len() != self.encoded_width() {
            return Err(ScoreError::ContractMismatch {
                reason: format!(
                    "{} weights for an encoded width of {}",
                    self.weights.len(),
                    self.encoded_width()
                ),
            });
        }
        Ok(())
    }

    /// Load an artifact from disk.
    ///
    /// A missing file is [`ScoreError::ModelUnavailable`], kept distinct
    /// from a malformed file.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ScoreError::ModelUnavailable {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path).map_err(|source| ScoreError::ArtifactRead {
            path: path.to_path_buf(),
            source,
        })?;
        let artifact: ModelArtifact =
            serde_json::from_str(&contents).map_err(|source| ScoreError::ArtifactFormat {
                path: path.to_path_buf(),
                source,
            })?;
        artifact.validate()?;
        info!(path = %path.display(), trained_at = %artifact.trained_at, "loaded model artifact");
        Ok(artifact)
    }

    /// Persist the artifact, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| ScoreError::ArtifactWrite {
                path: path.to_path_buf(),
                source,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ScoreError::ArtifactFormat {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| ScoreError::ArtifactWrite {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "saved model artifact");
        Ok(())
    }

    /// Encode one feature row: impute, standardize, one-hot the tier.
    pub(crate) fn encode(&self, row: &FeatureRow) -> Vec<f64> {
        let mut encoded = Vec::with_capacity(self.encoded_width());
        for (idx, value) in row.numeric_features().into_iter().enumerate() {
            let imputed = if value.is_nan() { self.medians[idx] } else { value };
            let std = if self.stds[idx] == 0.0 { 1.0 } else { self.stds[idx] };
            encoded.push((imputed - self.means[idx]) / std);
        }
        for tier in self.plan_tiers.iter().skip(1) {
            encoded.push(if row.plan_tier == *tier { 1.0 } else { 0.0 });
        }
        encoded
    }

    /// One probability per input row, in input order. Pure and total.
    pub fn predict_probability(&self, rows: &[FeatureRow]) -> Vec<f64> {
        rows.iter()
            .map(|row| {
                let encoded = self.encode(row);
                let z: f64 = self
                    .weights
                    .iter()
                    .zip(&encoded)
                    .map(|(weight, x)| weight * x)
                    .sum::<f64>()
                    + self.intercept;
                sigmoid(z)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_artifact() -> ModelArtifact {
        ModelArtifact {
            feature_columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            plan_tiers: vec!["Basic".to_string(), "Pro".to_string()],
            medians: vec![0.0; NUMERIC_FEATURE_COUNT],
            means: vec![0.0; NUMERIC_FEATURE_COUNT],
            stds: vec![1.0; NUMERIC_FEATURE_COUNT],
            weights: vec![0.0; NUMERIC_FEATURE_COUNT + 1],
            intercept: 0.0,
            trained_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn feature_row(usage_delta: f64, plan_tier: &str) -> FeatureRow {
        FeatureRow {
            account_id: "A1".to_string(),
            usage_delta,
            tickets_delta: 0.0,
            seats_current: 0.0,
            arr_current: 0.0,
            usage_drop_flag: 0,
            subscription_end_in_quarter: 0,
            satisfaction_missing_flag: 0,
            contract_missing_flag: 0,
            avg_satisfaction: f64::NAN,
            plan_tier: plan_tier.to_string(),
            seats_delta: 0.0,
            arr_delta: 0.0,
            mrr_delta: 0.0,
            seats_pct_change: 0.0,
            arr_pct_change: 0.0,
            mrr_pct_change: 0.0,
            usage_pct_change: 0.0,
            tickets_pct_change: 0.0,
            tickets_spike_flag: 0,
            contract_ending_soon_flag: 0,
            downsell_flag: 0,
        }
    }

    #[test]
    fn sigmoid_midpoint_and_saturation() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
    }

    #[test]
    fn zero_model_predicts_even_odds() {
        let artifact = test_artifact();
        let probabilities = artifact.predict_probability(&[feature_row(0.0, "Pro")]);
        assert!((probabilities[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn nan_inputs_are_imputed_with_medians() {
        let mut artifact = test_artifact();
        artifact.weights[0] = 1.0;
        artifact.medians[0] = -2.0;
        let probabilities = artifact.predict_probability(&[feature_row(f64::NAN, "Pro")]);
        assert!((probabilities[0] - sigmoid(-2.0)).abs() < 1e-12);
    }

    #[test]
    fn unknown_tier_encodes_as_zeros() {
        let artifact = test_artifact();
        let encoded = artifact.encode(&feature_row(0.0, "Enterprise"));
        assert_eq!(encoded.len(), artifact.encoded_width());
        assert_eq!(encoded[NUMERIC_FEATURE_COUNT], 0.0);
        let encoded_pro = artifact.encode(&feature_row(0.0, "Pro"));
        assert_eq!(encoded_pro[NUMERIC_FEATURE_COUNT], 1.0);
    }

    #[test]
    fn missing_file_is_model_unavailable() {
        let err = ModelArtifact::load(Path::new("/no/such/model.json")).unwrap_err();
        assert!(matches!(err, ScoreError::ModelUnavailable { .. }));
    }

    #[test]
    fn save_load_round_trip_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("churn_risk_model.json");
        let artifact = test_artifact();
        artifact.save(&path).unwrap();
        let loaded = ModelArtifact::load(&path).unwrap();
        assert_eq!(loaded.feature_columns, artifact.feature_columns);
        assert_eq!(loaded.weights, artifact.weights);
    }

    #[test]
    fn contract_mismatch_is_rejected_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let mut artifact = test_artifact();
        artifact.feature_columns.swap(0, 1);
        artifact.save(&path).unwrap();
        let err = ModelArtifact::load(&path).unwrap_err();
        assert!(matches!(err, ScoreError::ContractMismatch { .. }));
    }
}
