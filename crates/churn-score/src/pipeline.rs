//! The scoring orchestrator: one upload in, one ranked account table out.

use std::path::Path;
use std::sync::Arc;

use churn_features::build_features;
use churn_map::{apply_mapping, cache_key, validate_and_coerce};
use churn_model::{
    ChurnTimeline, FieldMapping, RawTable, REQUIRED_FIELDS, RiskTier, ScoredAccount,
};
use tracing::{info, warn};

use crate::cache::ScoreCache;
use crate::error::{Result, ScoreError};
use crate::explain::explain;
use crate::model::ModelArtifact;

/// Result of scoring one upload: ranked accounts plus the advisory
/// warnings collected along the way.
#[derive(Debug, Clone)]
pub struct ScoreOutcome {
    /// Scored accounts, stably sorted by descending churn probability.
    pub accounts: Vec<ScoredAccount>,
    pub warnings: Vec<String>,
}

/// Scoring orchestrator bound to one loaded model.
#[derive(Debug)]
pub struct Scorer {
    model: ModelArtifact,
}

impl Scorer {
    pub fn new(model: ModelArtifact) -> Self {
        Self { model }
    }

    /// Load the model artifact and build a scorer around it.
    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self::new(ModelArtifact::load(path)?))
    }

    pub fn model(&self) -> &ModelArtifact {
        &self.model
    }

    /// Run the full transaction: map, validate, derive, predict, explain,
    /// rank. Fails before touching the model when required fields are
    /// missing; everything after validation is total.
    pub fn score(&self, table: &RawTable, mapping: &FieldMapping) -> Result<ScoreOutcome> {
        let mapped = apply_mapping(table, mapping);
        let schema = validate_and_coerce(&mapped, &REQUIRED_FIELDS);
        if !schema.missing_required.is_empty() {
            return Err(ScoreError::MissingRequiredFields {
                fields: schema.missing_required,
            });
        }
        for warning in &schema.warnings {
            warn!("{warning}");
        }

        let features = build_features(&schema.rows);
        let probabilities = self.model.predict_probability(&features);

        let has = |column: &str| schema.columns.iter().any(|c| c == column);
        let has_plan_tier = has("plan_tier");
        let has_industry = has("industry");
        let has_company_size = has("company_size");
        let has_seats = has("seats_current");
        let has_arr = has("arr_current");

        let mut accounts: Vec<ScoredAccount> = features
            .iter()
            .zip(&schema.rows)
            .zip(&probabilities)
            .map(|((feature_row, validated), &probability)| {
                let tier = RiskTier::from_probability(probability);
                let (top_drivers, recommended_actions) = explain(feature_row);
                ScoredAccount {
                    account_id: feature_row.account_id.clone(),
                    plan_tier: has_plan_tier.then(|| feature_row.plan_tier.clone()),
                    industry: has_industry
                        .then(|| validated.extra("industry").unwrap_or_default().to_string()),
                    company_size: has_company_size
                        .then(|| validated.extra("company_size").unwrap_or_default().to_string()),
                    seats_current: (has_seats && feature_row.seats_current.is_finite())
                        .then_some(feature_row.seats_current),
                    arr_current: (has_arr && feature_row.arr_current.is_finite())
                        .then_some(feature_row.arr_current),
                    churn_probability: probability,
                    risk_score: (probability * 100.0).round() as u8,
                    risk_tier: tier,
                    churn_timeline: ChurnTimeline::from_tier(tier),
                    top_drivers,
                    recommended_actions,
                }
            })
            .collect();

        // stable sort keeps input order among equal probabilities
        accounts.sort_by(|a, b| b.churn_probability.total_cmp(&a.churn_probability));

        info!(
            rows = accounts.len(),
            warnings = schema.warnings.len(),
            "scored upload"
        );
        Ok(ScoreOutcome {
            accounts,
            warnings: schema.warnings,
        })
    }

    /// Score through the cache: an identical (content, mapping) pair
    /// returns the previously computed outcome without re-running the
    /// pipeline.
    pub fn score_cached(
        &self,
        table: &RawTable,
        mapping: &FieldMapping,
        cache: &mut ScoreCache,
    ) -> Result<Arc<ScoreOutcome>> {
        let key = cache_key(table, mapping);
        if let Some(hit) = cache.get(&key) {
            return Ok(hit);
        }
        let outcome = self.score(table, mapping)?;
        Ok(cache.insert(key, outcome))
    }
}

#[cfg(test)]
mod tests {
    use churn_features::{FEATURE_COLUMNS, NUMERIC_FEATURE_COUNT};
    use churn_model::Field;

    use super::*;

    fn artifact() -> ModelArtifact {
        ModelArtifact {
            feature_columns: FEATURE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            plan_tiers: vec!["Basic".to_string(), "Pro".to_string()],
            medians: vec![0.0; NUMERIC_FEATURE_COUNT],
            means: vec![0.0; NUMERIC_FEATURE_COUNT],
            stds: vec![1.0; NUMERIC_FEATURE_COUNT],
            // probability driven down by usage_delta alone
            weights: {
                let mut w = vec![0.0; NUMERIC_FEATURE_COUNT + 1];
                w[0] = -0.05;
                w
            },
            intercept: 0.0,
            trained_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    fn upload() -> RawTable {
        let mut table = RawTable::new(
            ["cust", "tier", "seat_count", "yearly_rev", "uses_q1", "uses_q2", "tix_q1", "tix_q2"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
        );
        table.push_row(
            ["A1", "Pro", "12", "24000", "100", "40", "1", "5"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        );
        table.push_row(
            ["A2", "Basic", "5", "9000", "80", "90", "2", "2"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
        );
        table
    }

    fn mapping() -> FieldMapping {
        let mut mapping = FieldMapping::new();
        mapping.set(Field::AccountId, "cust");
        mapping.set(Field::PlanTier, "tier");
        mapping.set(Field::SeatsCurrent, "seat_count");
        mapping.set(Field::ArrCurrent, "yearly_rev");
        mapping.set(Field::UsageCountPrev, "uses_q1");
        mapping.set(Field::UsageCountCurrent, "uses_q2");
        mapping.set(Field::TicketsOpenedPrev, "tix_q1");
        mapping.set(Field::TicketsOpenedCurrent, "tix_q2");
        mapping
    }

    #[test]
    fn ranks_by_descending_probability() {
        let scorer = Scorer::new(artifact());
        let outcome = scorer.score(&upload(), &mapping()).unwrap();
        assert_eq!(outcome.accounts.len(), 2);
        // A1's usage collapsed (delta -60), A2 grew (delta +10)
        assert_eq!(outcome.accounts[0].account_id, "A1");
        assert!(
            outcome.accounts[0].churn_probability > outcome.accounts[1].churn_probability
        );
        assert_eq!(
            outcome.accounts[0].risk_score,
            (outcome.accounts[0].churn_probability * 100.0).round() as u8
        );
    }

    #[test]
    fn context_columns_follow_the_mapped_schema() {
        let scorer = Scorer::new(artifact());
        let outcome = scorer.score(&upload(), &mapping()).unwrap();
        let top = &outcome.accounts[0];
        assert_eq!(top.plan_tier.as_deref(), Some("Pro"));
        assert_eq!(top.industry, None); // never mapped
        assert_eq!(top.seats_current, Some(12.0));
        assert_eq!(top.arr_current, Some(24000.0));
    }

    #[test]
    fn missing_required_fields_abort_before_the_model() {
        let scorer = Scorer::new(artifact());
        let mut partial = FieldMapping::new();
        partial.set(Field::AccountId, "cust");
        let err = scorer.score(&upload(), &partial).unwrap_err();
        match err {
            ScoreError::MissingRequiredFields { fields } => {
                assert!(fields.contains(&"seats_current".to_string()));
                assert!(!fields.contains(&"account_id".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn cached_scoring_reuses_the_outcome() {
        let scorer = Scorer::new(artifact());
        let mut cache = ScoreCache::new();
        let table = upload();
        let first = scorer.score_cached(&table, &mapping(), &mut cache).unwrap();
        let second = scorer.score_cached(&table, &mapping(), &mut cache).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        // a different mapping is a different transaction
        let mut other = mapping();
        other.set(Field::PlanTier, "seat_count");
        let third = scorer.score_cached(&table, &other, &mut cache).unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
    }
}
