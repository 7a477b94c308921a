//! Typed account record produced by schema validation.

use std::collections::BTreeMap;

/// One account row after coercion.
///
/// Numeric fields use `f64::NAN` as the explicit unset sentinel: after
/// validation they are exact floats or NaN, never text. The boolean-like
/// subscription flag is an exact `{0, 1}` integer. Columns the pipeline
/// does not coerce (display context, external rule flags, precomputed
/// deltas) are carried verbatim in `extras` under their column names.
#[derive(Debug, Clone)]
pub struct ValidatedRow {
    pub account_id: String,
    /// Trimmed plan tier; empty when missing.
    pub plan_tier: String,

    pub seats_current: f64,
    pub seats_prev: f64,
    pub arr_current: f64,
    pub arr_prev: f64,
    pub mrr_current: f64,
    pub mrr_prev: f64,
    pub usage_count_current: f64,
    pub usage_count_prev: f64,
    pub tickets_opened_current: f64,
    pub tickets_opened_prev: f64,
    pub avg_satisfaction_current: f64,
    pub days_to_contract_end_current: f64,

    /// 0/1; defaults to 0 ("assume not ending") when unresolvable.
    pub subscription_end_in_current_period: i64,

    /// Pass-through columns that were not coerced, keyed by column name.
    pub extras: BTreeMap<String, String>,
}

impl Default for ValidatedRow {
    fn default() -> Self {
        Self {
            account_id: String::new(),
            plan_tier: String::new(),
            seats_current: f64::NAN,
            seats_prev: f64::NAN,
            arr_current: f64::NAN,
            arr_prev: f64::NAN,
            mrr_current: f64::NAN,
            mrr_prev: f64::NAN,
            usage_count_current: f64::NAN,
            usage_count_prev: f64::NAN,
            tickets_opened_current: f64::NAN,
            tickets_opened_prev: f64::NAN,
            avg_satisfaction_current: f64::NAN,
            days_to_contract_end_current: f64::NAN,
            subscription_end_in_current_period: 0,
            extras: BTreeMap::new(),
        }
    }
}

impl ValidatedRow {
    /// Pass-through value for a column, if present on this row.
    pub fn extra(&self, column: &str) -> Option<&str> {
        self.extras.get(column).map(String::as_str)
    }
}

/// Column names the validator coerces to numeric when present.
pub const NUMERIC_COLUMNS: [&str; 12] = [
    "seats_current",
    "seats_prev",
    "arr_current",
    "arr_prev",
    "mrr_current",
    "mrr_prev",
    "usage_count_current",
    "usage_count_prev",
    "tickets_opened_current",
    "tickets_opened_prev",
    "avg_satisfaction_current",
    "days_to_contract_end_current",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_fully_unset() {
        let row = ValidatedRow::default();
        assert!(row.seats_current.is_nan());
        assert!(row.days_to_contract_end_current.is_nan());
        assert_eq!(row.subscription_end_in_current_period, 0);
        assert!(row.extras.is_empty());
    }
}
