//! Rule-based driver and action attribution.
//!
//! Attribution is deliberately independent of the model: a rule fires on
//! the derived feature signals themselves, so an explanation never claims
//! more than the input data supports.

use churn_features::FeatureRow;

/// Upper bound on drivers/actions attached to one account.
pub const MAX_EXPLANATIONS: usize = 3;

const FALLBACK_DRIVER: &str = "No dominant trigger (monitor)";
const FALLBACK_ACTION: &str = "Continue monitoring; reassess if new signals appear";

type Predicate = fn(&FeatureRow) -> bool;

/// Ordered rule table: (driver, recommended action, predicate).
///
/// Order encodes priority. The first [`MAX_EXPLANATIONS`] firing rules win.
const RULES: [(&str, &str, Predicate); 4] = [
    (
        "Usage decline",
        "Run re-engagement campaign + in-product training",
        |row| row.usage_drop_flag == 1,
    ),
    (
        "Support pressure rising",
        "Proactive support outreach + escalation review",
        |row| row.tickets_spike_flag == 1 || row.tickets_pct_change > 0.3,
    ),
    (
        "Contract ending soon",
        "Start renewal outreach and confirm success plan",
        |row| row.contract_ending_soon_flag == 1,
    ),
    (
        "Commercial contraction",
        "Commercial check-in: seats/value alignment",
        |row| row.downsell_flag == 1,
    ),
];

/// Evaluate the rule table for one account.
///
/// Returns parallel driver/action lists, never empty: when no rule fires
/// the fallback pair stands in so every scored row carries an explanation.
pub fn explain(row: &FeatureRow) -> (Vec<String>, Vec<String>) {
    let mut drivers = Vec::new();
    let mut actions = Vec::new();
    for (driver, action, applies) in RULES {
        if drivers.len() == MAX_EXPLANATIONS {
            break;
        }
        if applies(row) {
            drivers.push(driver.to_string());
            actions.push(action.to_string());
        }
    }
    if drivers.is_empty() {
        drivers.push(FALLBACK_DRIVER.to_string());
        actions.push(FALLBACK_ACTION.to_string());
    }
    (drivers, actions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_row() -> FeatureRow {
        FeatureRow {
            account_id: "A1".to_string(),
            usage_delta: 0.0,
            tickets_delta: 0.0,
            seats_current: 0.0,
            arr_current: 0.0,
            usage_drop_flag: 0,
            subscription_end_in_quarter: 0,
            satisfaction_missing_flag: 0,
            contract_missing_flag: 0,
            avg_satisfaction: f64::NAN,
            plan_tier: "Pro".to_string(),
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
    fn quiet_account_gets_the_fallback() {
        let (drivers, actions) = explain(&quiet_row());
        assert_eq!(drivers, vec![FALLBACK_DRIVER.to_string()]);
        assert_eq!(actions, vec![FALLBACK_ACTION.to_string()]);
    }

    #[test]
    fn rules_fire_in_priority_order() {
        let mut row = quiet_row();
        row.downsell_flag = 1;
        row.usage_drop_flag = 1;
        let (drivers, _) = explain(&row);
        assert_eq!(drivers, vec!["Usage decline", "Commercial contraction"]);
    }

    #[test]
    fn ticket_growth_fires_without_the_spike_flag() {
        let mut row = quiet_row();
        row.tickets_pct_change = 0.31;
        let (drivers, _) = explain(&row);
        assert_eq!(drivers, vec!["Support pressure rising"]);

        row.tickets_pct_change = 0.3; // strictly-greater boundary
        let (drivers, _) = explain(&row);
        assert_eq!(drivers, vec![FALLBACK_DRIVER.to_string()]);
    }

    #[test]
    fn output_is_capped_at_three() {
        let mut row = quiet_row();
        row.usage_drop_flag = 1;
        row.tickets_spike_flag = 1;
        row.contract_ending_soon_flag = 1;
        row.downsell_flag = 1;
        let (drivers, actions) = explain(&row);
        assert_eq!(drivers.len(), MAX_EXPLANATIONS);
        assert_eq!(actions.len(), MAX_EXPLANATIONS);
        assert_eq!(
            drivers,
            vec![
                "Usage decline",
                "Support pressure rising",
                "Contract ending soon"
            ]
        );
    }
}
