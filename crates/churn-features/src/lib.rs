//! Deterministic feature derivation.
//!
//! Turns validated account rows into the fixed feature vector the model
//! was trained against. The builder is total: it never fails, and every
//! canonical feature is present in every output row, with neutral defaults
//! when a signal cannot be derived from the available columns.

use churn_model::{ValidatedRow, parse_f64};
use tracing::debug;

/// Canonical feature list shared by training and scoring.
///
/// Order matters: any encoder fit against this list depends on it. The
/// trained artifact records the list it was fit with and the adapter
/// rejects artifacts whose list disagrees.
pub const FEATURE_COLUMNS: [&str; 10] = [
    // ===== core behavioral deltas =====
    "usage_delta",
    "tickets_delta",
    // ===== commercial level =====
    "seats_current",
    "arr_current",
    // ===== risk flags =====
    "usage_drop_flag",
    "subscription_end_in_quarter",
    "satisfaction_missing_flag",
    "contract_missing_flag",
    // ===== optional numeric signal =====
    "avg_satisfaction",
    // ===== categorical =====
    "plan_tier",
];

/// Number of numeric entries in [`FEATURE_COLUMNS`] (everything but the
/// trailing categorical).
pub const NUMERIC_FEATURE_COUNT: usize = 9;

/// Fixed-shape feature vector for one account.
///
/// The canonical model features come first; the remaining fields are
/// auxiliary derived signals consumed by the explanation rules and kept
/// for display.
#[derive(Debug, Clone)]
pub struct FeatureRow {
    pub account_id: String,

    pub usage_delta: f64,
    pub tickets_delta: f64,
    pub seats_current: f64,
    pub arr_current: f64,
    pub usage_drop_flag: i64,
    pub subscription_end_in_quarter: i64,
    pub satisfaction_missing_flag: i64,
    pub contract_missing_flag: i64,
    pub avg_satisfaction: f64,
    /// Never empty; "Unknown" when underivable.
    pub plan_tier: String,

    pub seats_delta: f64,
    pub arr_delta: f64,
    pub mrr_delta: f64,
    pub seats_pct_change: f64,
    pub arr_pct_change: f64,
    pub mrr_pct_change: f64,
    pub usage_pct_change: f64,
    pub tickets_pct_change: f64,
    pub tickets_spike_flag: i64,
    pub contract_ending_soon_flag: i64,
    pub downsell_flag: i64,
}

impl FeatureRow {
    /// Numeric model inputs in canonical [`FEATURE_COLUMNS`] order.
    pub fn numeric_features(&self) -> [f64; NUMERIC_FEATURE_COUNT] {
        [
            self.usage_delta,
            self.tickets_delta,
            self.seats_current,
            self.arr_current,
            self.usage_drop_flag as f64,
            self.subscription_end_in_quarter as f64,
            self.satisfaction_missing_flag as f64,
            self.contract_missing_flag as f64,
            self.avg_satisfaction,
        ]
    }
}

/// `delta / prev` with a previous value of exactly 0 (or unset) treated as
/// "undefined change", never as infinite growth.
fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || denominator.is_nan() {
        f64::NAN
    } else {
        numerator / denominator
    }
}

fn nan_to_zero(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value }
}

/// True when any row carries the pass-through column.
fn column_supplied(rows: &[ValidatedRow], column: &str) -> bool {
    rows.iter().any(|row| row.extras.contains_key(column))
}

fn supplied_numeric(row: &ValidatedRow, column: &str) -> f64 {
    row.extra(column).and_then(parse_f64).unwrap_or(f64::NAN)
}

/// Flag coercion: numeric, missing treated as 0, cast to exact {0, 1}.
fn supplied_flag(row: &ValidatedRow, column: &str) -> i64 {
    match row.extra(column).and_then(parse_f64) {
        Some(value) if value != 0.0 => 1,
        _ => 0,
    }
}

struct ColumnPresence {
    seats_prev_unset: bool,
    arr_cur_unset: bool,
    arr_prev_unset: bool,
    mrr_cur_unset: bool,
    mrr_prev_unset: bool,
    supplied: SuppliedColumns,
}

/// Which derivable columns the upload already carries. Checked once per
/// table rather than per row.
#[derive(Default)]
struct SuppliedColumns {
    usage_delta: bool,
    tickets_delta: bool,
    seats_delta: bool,
    arr_delta: bool,
    mrr_delta: bool,
    seats_pct_change: bool,
    arr_pct_change: bool,
    mrr_pct_change: bool,
    usage_pct_change: bool,
    tickets_pct_change: bool,
    avg_satisfaction: bool,
    subscription_end_in_quarter: bool,
}

fn all_unset(rows: &[ValidatedRow], get: fn(&ValidatedRow) -> f64) -> bool {
    rows.iter().all(|row| get(row).is_nan())
}

/// Build the feature table for a validated upload.
///
/// Derivation order mirrors the training-side builder exactly:
/// previous-period default filling, flag normalization, delta derivation,
/// percent changes, canonical-list completion. Pass-through columns whose
/// names match a derived feature take precedence over derivation, so
/// pre-aggregated tables flow through unchanged.
pub fn build_features(rows: &[ValidatedRow]) -> Vec<FeatureRow> {
    // Previous-period defaults apply only when the column is wholly
    // absent/unset. A present-but-partial previous column keeps its gaps:
    // a delta against a real partial value may legitimately be non-zero,
    // and "current minus absent-treated-as-zero" would fake a delta.
    let presence = ColumnPresence {
        seats_prev_unset: all_unset(rows, |r| r.seats_prev),
        arr_cur_unset: all_unset(rows, |r| r.arr_current),
        arr_prev_unset: all_unset(rows, |r| r.arr_prev),
        mrr_cur_unset: all_unset(rows, |r| r.mrr_current),
        mrr_prev_unset: all_unset(rows, |r| r.mrr_prev),
        supplied: SuppliedColumns {
            usage_delta: column_supplied(rows, "usage_delta"),
            tickets_delta: column_supplied(rows, "tickets_delta"),
            seats_delta: column_supplied(rows, "seats_delta"),
            arr_delta: column_supplied(rows, "arr_delta"),
            mrr_delta: column_supplied(rows, "mrr_delta"),
            seats_pct_change: column_supplied(rows, "seats_pct_change"),
            arr_pct_change: column_supplied(rows, "arr_pct_change"),
            mrr_pct_change: column_supplied(rows, "mrr_pct_change"),
            usage_pct_change: column_supplied(rows, "usage_pct_change"),
            tickets_pct_change: column_supplied(rows, "tickets_pct_change"),
            avg_satisfaction: column_supplied(rows, "avg_satisfaction"),
            subscription_end_in_quarter: column_supplied(rows, "subscription_end_in_quarter"),
        },
    };

    let out: Vec<FeatureRow> = rows
        .iter()
        .map(|row| build_row(row, &presence))
        .collect();
    debug!(rows = out.len(), "built feature table");
    out
}

fn build_row(row: &ValidatedRow, presence: &ColumnPresence) -> FeatureRow {
    let supplied = &presence.supplied;
    let seats_prev = if presence.seats_prev_unset {
        row.seats_current
    } else {
        row.seats_prev
    };
    let arr_prev = if presence.arr_prev_unset {
        row.arr_current
    } else {
        row.arr_prev
    };
    let mrr_prev = if presence.mrr_prev_unset {
        row.mrr_current
    } else {
        row.mrr_prev
    };
    let arr_both_unset = presence.arr_cur_unset && presence.arr_prev_unset;
    let mrr_both_unset = presence.mrr_cur_unset && presence.mrr_prev_unset;

    let usage_delta = if supplied.usage_delta {
        supplied_numeric(row, "usage_delta")
    } else {
        row.usage_count_current - row.usage_count_prev
    };
    let tickets_delta = if supplied.tickets_delta {
        supplied_numeric(row, "tickets_delta")
    } else {
        row.tickets_opened_current - row.tickets_opened_prev
    };
    let seats_delta = if supplied.seats_delta {
        supplied_numeric(row, "seats_delta")
    } else {
        row.seats_current - seats_prev
    };
    // ARR/MRR deltas intentionally fill the missing side with zero instead
    // of propagating NaN the way the seats delta does. The asymmetry is
    // specified behavior, kept as-is.
    let arr_delta = if supplied.arr_delta {
        supplied_numeric(row, "arr_delta")
    } else if arr_both_unset {
        f64::NAN
    } else {
        nan_to_zero(row.arr_current) - nan_to_zero(arr_prev)
    };
    let mrr_delta = if supplied.mrr_delta {
        supplied_numeric(row, "mrr_delta")
    } else if mrr_both_unset {
        f64::NAN
    } else {
        nan_to_zero(row.mrr_current) - nan_to_zero(mrr_prev)
    };

    let seats_pct_change = if supplied.seats_pct_change {
        supplied_numeric(row, "seats_pct_change")
    } else {
        safe_div(seats_delta, seats_prev)
    };
    let arr_pct_change = if supplied.arr_pct_change {
        supplied_numeric(row, "arr_pct_change")
    } else {
        safe_div(arr_delta, arr_prev)
    };
    let mrr_pct_change = if supplied.mrr_pct_change {
        supplied_numeric(row, "mrr_pct_change")
    } else {
        safe_div(mrr_delta, mrr_prev)
    };
    let usage_pct_change = if supplied.usage_pct_change {
        supplied_numeric(row, "usage_pct_change")
    } else {
        safe_div(usage_delta, row.usage_count_prev)
    };
    let tickets_pct_change = if supplied.tickets_pct_change {
        supplied_numeric(row, "tickets_pct_change")
    } else {
        safe_div(tickets_delta, row.tickets_opened_prev)
    };

    let avg_satisfaction = if supplied.avg_satisfaction {
        supplied_numeric(row, "avg_satisfaction")
    } else {
        row.avg_satisfaction_current
    };

    let subscription_end_in_quarter = if supplied.subscription_end_in_quarter {
        supplied_flag(row, "subscription_end_in_quarter")
    } else {
        row.subscription_end_in_current_period
    };

    let plan_tier = if row.plan_tier.is_empty() {
        "Unknown".to_string()
    } else {
        row.plan_tier.clone()
    };

    FeatureRow {
        account_id: row.account_id.clone(),
        usage_delta,
        tickets_delta,
        seats_current: row.seats_current,
        arr_current: row.arr_current,
        usage_drop_flag: supplied_flag(row, "usage_drop_flag"),
        subscription_end_in_quarter,
        // missing flag columns mean 0, not "derive from the data"
        satisfaction_missing_flag: supplied_flag(row, "satisfaction_missing_flag"),
        contract_missing_flag: supplied_flag(row, "contract_missing_flag"),
        avg_satisfaction,
        plan_tier,
        seats_delta,
        arr_delta,
        mrr_delta,
        seats_pct_change,
        arr_pct_change,
        mrr_pct_change,
        usage_pct_change,
        tickets_pct_change,
        tickets_spike_flag: supplied_flag(row, "tickets_spike_flag"),
        contract_ending_soon_flag: supplied_flag(row, "contract_ending_soon_flag"),
        downsell_flag: supplied_flag(row, "downsell_flag"),
    }
}
