//! Validation and defensive coercion of a mapped table.

use churn_model::{Field, RawTable, ValidatedRow, parse_f64, record::NUMERIC_COLUMNS};
use tracing::debug;

const TRUE_TOKENS: [&str; 5] = ["true", "t", "1", "yes", "y"];
const FALSE_TOKENS: [&str; 5] = ["false", "f", "0", "no", "n"];

/// Outcome of schema validation.
///
/// Validation itself never fails; callers decide whether a non-empty
/// `missing_required` aborts the transaction.
#[derive(Debug, Clone)]
pub struct SchemaResult {
    /// Column names of the mapped table, for downstream presence checks.
    pub columns: Vec<String>,
    pub rows: Vec<ValidatedRow>,
    /// Required canonical fields absent after mapping, wire names.
    pub missing_required: Vec<String>,
    /// Advisory, non-fatal anomalies.
    pub warnings: Vec<String>,
}

/// Coerce one boolean-like token to `{0, 1}`.
///
/// Case-insensitive token match first; numeric fallback for anything
/// numeric-ish; everything else defaults to 0. The 0 default deliberately
/// reads "assume not ending" rather than "unknown".
pub fn coerce_bool_token(raw: &str) -> i64 {
    let token = raw.trim().to_ascii_lowercase();
    if TRUE_TOKENS.contains(&token.as_str()) {
        return 1;
    }
    if FALSE_TOKENS.contains(&token.as_str()) {
        return 0;
    }
    match parse_f64(raw) {
        Some(value) if value != 0.0 => 1,
        _ => 0,
    }
}

fn normalize_plan_tier(raw: &str) -> String {
    let trimmed = raw.trim();
    // pandas renders missing values as the literal "nan" once stringified
    if trimmed == "nan" {
        String::new()
    } else {
        trimmed.to_string()
    }
}

/// Check required fields and coerce the mapped table into typed rows.
///
/// `account_id` is treated as required even when omitted from
/// `required_fields`. Unparseable numeric cells become NaN and are reported
/// as warnings, never as errors; missing account ids keep the literal
/// `"nan"` placeholder the upstream tooling produced rather than being
/// silently repaired.
pub fn validate_and_coerce(table: &RawTable, required_fields: &[Field]) -> SchemaResult {
    let mut missing_required: Vec<String> = required_fields
        .iter()
        .filter(|field| table.column_index(field.wire_name()).is_none())
        .map(|field| field.wire_name().to_string())
        .collect();
    let account_wire = Field::AccountId.wire_name();
    if table.column_index(account_wire).is_none() && !missing_required.iter().any(|f| f == account_wire)
    {
        missing_required.push(account_wire.to_string());
    }

    let mut warnings: Vec<String> = Vec::new();
    let mut missing_account_ids = 0usize;
    let mut unparseable: Vec<(usize, usize)> = NUMERIC_COLUMNS
        .iter()
        .enumerate()
        .map(|(idx, _)| (idx, 0))
        .collect();

    let coerced_columns: Vec<&str> = {
        let mut names = vec![
            account_wire,
            Field::PlanTier.wire_name(),
            Field::SubscriptionEndInCurrentPeriod.wire_name(),
        ];
        names.extend(NUMERIC_COLUMNS);
        names
    };

    let mut rows = Vec::with_capacity(table.height());
    for row_idx in 0..table.height() {
        let mut row = ValidatedRow::default();

        if table.column_index(account_wire).is_some() {
            let raw = table.cell(row_idx, account_wire);
            if raw.is_empty() {
                missing_account_ids += 1;
                row.account_id = "nan".to_string();
            } else {
                row.account_id = raw.to_string();
            }
        }

        if table.column_index(Field::PlanTier.wire_name()).is_some() {
            row.plan_tier = normalize_plan_tier(table.cell(row_idx, Field::PlanTier.wire_name()));
        }

        for (col_idx, &name) in NUMERIC_COLUMNS.iter().enumerate() {
            if table.column_index(name).is_none() {
                continue;
            }
            let raw = table.cell(row_idx, name);
            let value = match parse_f64(raw) {
                Some(value) => value,
                None => {
                    if !raw.is_empty() {
                        unparseable[col_idx].1 += 1;
                    }
                    f64::NAN
                }
            };
            set_numeric(&mut row, name, value);
        }

        let flag_wire = Field::SubscriptionEndInCurrentPeriod.wire_name();
        if table.column_index(flag_wire).is_some() {
            row.subscription_end_in_current_period = coerce_bool_token(table.cell(row_idx, flag_wire));
        }

        for header in &table.headers {
            if coerced_columns.contains(&header.as_str()) {
                continue;
            }
            row.extras
                .insert(header.clone(), table.cell(row_idx, header).to_string());
        }

        rows.push(row);
    }

    if missing_account_ids > 0 {
        warnings.push(format!(
            "{missing_account_ids} account_id value(s) are missing; they are kept as literal 'nan' strings"
        ));
    }
    for (col_idx, count) in unparseable {
        if count > 0 {
            warnings.push(format!(
                "column '{}': {count} non-numeric value(s) coerced to missing",
                NUMERIC_COLUMNS[col_idx]
            ));
        }
    }
    debug!(
        rows = rows.len(),
        missing_required = missing_required.len(),
        warnings = warnings.len(),
        "validated mapped table"
    );

    SchemaResult {
        columns: table.headers.clone(),
        rows,
        missing_required,
        warnings,
    }
}

fn set_numeric(row: &mut ValidatedRow, name: &str, value: f64) {
    match name {
        "seats_current" => row.seats_current = value,
        "seats_prev" => row.seats_prev = value,
        "arr_current" => row.arr_current = value,
        "arr_prev" => row.arr_prev = value,
        "mrr_current" => row.mrr_current = value,
        "mrr_prev" => row.mrr_prev = value,
        "usage_count_current" => row.usage_count_current = value,
        "usage_count_prev" => row.usage_count_prev = value,
        "tickets_opened_current" => row.tickets_opened_current = value,
        "tickets_opened_prev" => row.tickets_opened_prev = value,
        "avg_satisfaction_current" => row.avg_satisfaction_current = value,
        "days_to_contract_end_current" => row.days_to_contract_end_current = value,
        _ => {}
    }
}
