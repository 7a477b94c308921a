//! Model fitting: logistic regression by full-batch gradient descent.
//!
//! Fitting computes the imputation/standardization statistics from the
//! training rows, encodes them exactly as inference will, and optimizes a
//! class-weighted logistic loss. Everything recorded in the artifact is
//! finite, so the JSON round trip is lossless.

use std::collections::BTreeSet;

use churn_features::{FEATURE_COLUMNS, FeatureRow, NUMERIC_FEATURE_COUNT};
use tracing::info;

use crate::error::{Result, ScoreError};
use crate::model::ModelArtifact;

/// Optimizer knobs. Defaults are sized for the small tables this tool
/// handles, not for large-scale training.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub learning_rate: f64,
    pub epochs: usize,
    /// L2 penalty on the weights; the intercept is never penalized.
    pub l2: f64,
}

impl Default for TrainOptions {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            epochs: 500,
            l2: 1e-3,
        }
    }
}

/// Summary of one training run.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub rows: usize,
    pub positives: usize,
    pub epochs: usize,
    pub plan_tiers: usize,
}

fn median(values: &mut Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Fit a model against derived features and binary churn labels.
///
/// Labels must contain both classes; classes are re-weighted to balance so
/// a rare churn class still moves the decision boundary. Statistics ignore
/// NaN cells the same way inference imputes them.
pub fn fit(
    features: &[FeatureRow],
    labels: &[i64],
    options: &TrainOptions,
) -> Result<(ModelArtifact, TrainReport)> {
    if features.is_empty() {
        return Err(ScoreError::Training {
            reason: "no training rows".to_string(),
        });
    }
    if features.len() != labels.len() {
        return Err(ScoreError::Training {
            reason: format!(
                "{} feature rows but {} labels",
                features.len(),
                labels.len()
            ),
        });
    }
    let positives = labels.iter().filter(|&&label| label != 0).count();
    if positives == 0 || positives == labels.len() {
        return Err(ScoreError::Training {
            reason: "labels contain a single class; need churned and retained examples".to_string(),
        });
    }

    let mut medians = vec![0.0; NUMERIC_FEATURE_COUNT];
    let mut means = vec![0.0; NUMERIC_FEATURE_COUNT];
    let mut stds = vec![0.0; NUMERIC_FEATURE_COUNT];
    for idx in 0..NUMERIC_FEATURE_COUNT {
        let mut finite: Vec<f64> = features
            .iter()
            .map(|row| row.numeric_features()[idx])
            .filter(|value| value.is_finite())
            .collect();
        if finite.is_empty() {
            continue; // all-missing column: impute 0, identity scaling
        }
        let mean = finite.iter().sum::<f64>() / finite.len() as f64;
        let variance =
            finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / finite.len() as f64;
        means[idx] = mean;
        stds[idx] = variance.sqrt();
        medians[idx] = median(&mut finite);
    }

    let tiers: BTreeSet<String> = features.iter().map(|row| row.plan_tier.clone()).collect();

    let mut artifact = ModelArtifact {
        feature_columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
        plan_tiers: tiers.into_iter().collect(),
        medians,
        means,
        stds,
        weights: Vec::new(),
        intercept: 0.0,
        trained_at: chrono::Utc::now().to_rfc3339(),
    };
    artifact.weights = vec![0.0; artifact.encoded_width()];

    let encoded: Vec<Vec<f64>> = features.iter().map(|row| artifact.encode(row)).collect();
    let n = features.len() as f64;
    let weight_positive = n / (2.0 * positives as f64);
    let weight_negative = n / (2.0 * (features.len() - positives) as f64);

    for _ in 0..options.epochs {
        let mut gradient = vec![0.0; artifact.weights.len()];
        let mut gradient_intercept = 0.0;
        for (x, &label) in encoded.iter().zip(labels) {
            let z: f64 = artifact
                .weights
                .iter()
                .zip(x)
                .map(|(w, v)| w * v)
                .sum::<f64>()
                + artifact.intercept;
            let y = if label != 0 { 1.0 } else { 0.0 };
            let class_weight = if label != 0 {
                weight_positive
            } else {
                weight_negative
            };
            let residual = class_weight * (sigmoid(z) - y);
            for (g, v) in gradient.iter_mut().zip(x) {
                *g += residual * v;
            }
            gradient_intercept += residual;
        }
        for (w, g) in artifact.weights.iter_mut().zip(&gradient) {
            *w -= options.learning_rate * (g / n + options.l2 * *w);
        }
        artifact.intercept -= options.learning_rate * gradient_intercept / n;
    }

    if !artifact.intercept.is_finite() || artifact.weights.iter().any(|w| !w.is_finite()) {
        return Err(ScoreError::Training {
            reason: "optimization diverged; lower the learning rate".to_string(),
        });
    }

    let report = TrainReport {
        rows: features.len(),
        positives,
        epochs: options.epochs,
        plan_tiers: artifact.plan_tiers.len(),
    };
    info!(
        rows = report.rows,
        positives = report.positives,
        epochs = report.epochs,
        "fitted churn model"
    );
    Ok((artifact, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(usage_delta: f64, tier: &str) -> FeatureRow {
        FeatureRow {
            account_id: "A".to_string(),
            usage_delta,
            tickets_delta: 0.0,
            seats_current: 10.0,
            arr_current: 1000.0,
            usage_drop_flag: i64::from(usage_delta < 0.0),
            subscription_end_in_quarter: 0,
            satisfaction_missing_flag: 0,
            contract_missing_flag: 0,
            avg_satisfaction: f64::NAN,
            plan_tier: tier.to_string(),
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

    fn separable() -> (Vec<FeatureRow>, Vec<i64>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..10 {
            rows.push(row(-50.0 - f64::from(i), "Basic"));
            labels.push(1);
            rows.push(row(40.0 + f64::from(i), "Pro"));
            labels.push(0);
        }
        (rows, labels)
    }

    #[test]
    fn separable_data_separates() {
        let (rows, labels) = separable();
        let (artifact, report) = fit(&rows, &labels, &TrainOptions::default()).unwrap();
        artifact.validate().unwrap();
        assert_eq!(report.rows, 20);
        assert_eq!(report.positives, 10);
        assert_eq!(report.plan_tiers, 2);

        let probabilities = artifact.predict_probability(&[row(-60.0, "Basic"), row(50.0, "Pro")]);
        assert!(probabilities[0] > 0.5, "at-risk got {}", probabilities[0]);
        assert!(probabilities[1] < 0.5, "healthy got {}", probabilities[1]);
    }

    #[test]
    fn artifact_values_are_finite() {
        let (rows, labels) = separable();
        let (artifact, _) = fit(&rows, &labels, &TrainOptions::default()).unwrap();
        assert!(artifact.intercept.is_finite());
        for values in [&artifact.medians, &artifact.means, &artifact.stds, &artifact.weights] {
            assert!(values.iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn nan_columns_fall_back_to_identity_statistics() {
        let (rows, labels) = separable();
        // avg_satisfaction is NaN on every row (index 8)
        let (artifact, _) = fit(&rows, &labels, &TrainOptions::default()).unwrap();
        assert_eq!(artifact.medians[8], 0.0);
        assert_eq!(artifact.means[8], 0.0);
        assert_eq!(artifact.stds[8], 0.0);
    }

    #[test]
    fn single_class_is_rejected() {
        let rows = vec![row(1.0, "Pro"), row(2.0, "Pro")];
        let err = fit(&rows, &[0, 0], &TrainOptions::default()).unwrap_err();
        assert!(matches!(err, ScoreError::Training { .. }));
    }

    #[test]
    fn empty_and_mismatched_inputs_are_rejected() {
        assert!(matches!(
            fit(&[], &[], &TrainOptions::default()),
            Err(ScoreError::Training { .. })
        ));
        let rows = vec![row(1.0, "Pro")];
        assert!(matches!(
            fit(&rows, &[0, 1], &TrainOptions::default()),
            Err(ScoreError::Training { .. })
        ));
    }

    #[test]
    fn median_of_even_and_odd_sets() {
        assert_eq!(median(&mut vec![3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut vec![4.0, 1.0, 2.0, 3.0]), 2.5);
        assert_eq!(median(&mut Vec::new()), 0.0);
    }
}
