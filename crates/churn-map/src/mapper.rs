//! Canonical column materialization from a confirmed mapping.

use std::collections::BTreeSet;

use churn_model::{Field, FieldMapping, RawTable};
use tracing::debug;

/// Rename mapped user columns to canonical wire names.
///
/// For each canonical field whose mapped user column exists in the input,
/// the column's values are copied under the wire name, preserving row order
/// and alignment. Fields mapped to empty or missing columns are skipped
/// silently; the validator reports them. Every user column not consumed by
/// the mapping is passed through verbatim under its original name, except
/// when that name would shadow a mapped canonical column: the mapped column
/// wins and the passthrough copy is dropped.
///
/// Pure transformation: identical inputs always produce identical output.
pub fn apply_mapping(table: &RawTable, mapping: &FieldMapping) -> RawTable {
    let mut headers: Vec<String> = Vec::new();
    let mut source_indices: Vec<usize> = Vec::new();

    for field in Field::all() {
        let Some(user_column) = mapping.user_column(field) else {
            continue;
        };
        let Some(idx) = table.column_index(user_column) else {
            debug!(field = %field, column = user_column, "mapped column absent from upload");
            continue;
        };
        headers.push(field.wire_name().to_string());
        source_indices.push(idx);
    }

    let used: BTreeSet<&str> = mapping.used_columns().into_iter().collect();
    let materialized: BTreeSet<String> = headers.iter().cloned().collect();
    for (idx, header) in table.headers.iter().enumerate() {
        if used.contains(header.as_str()) {
            continue;
        }
        // a passthrough column must not shadow a mapped canonical column
        if materialized.contains(header) {
            debug!(column = %header, "dropped passthrough column colliding with a mapped field");
            continue;
        }
        headers.push(header.clone());
        source_indices.push(idx);
    }

    let mut mapped = RawTable::new(headers);
    for row in &table.rows {
        mapped.push_row(
            source_indices
                .iter()
                .map(|&idx| row.get(idx).cloned().unwrap_or_default())
                .collect(),
        );
    }
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload() -> RawTable {
        let mut table = RawTable::new(vec![
            "cust".to_string(),
            "tier".to_string(),
            "region".to_string(),
        ]);
        table.push_row(vec![
            "A1".to_string(),
            "Pro".to_string(),
            "EMEA".to_string(),
        ]);
        table.push_row(vec![
            "A2".to_string(),
            "Basic".to_string(),
            "NA".to_string(),
        ]);
        table
    }

    #[test]
    fn renames_mapped_and_passes_through_rest() {
        let mut mapping = FieldMapping::new();
        mapping.set(Field::AccountId, "cust");
        mapping.set(Field::PlanTier, "tier");

        let mapped = apply_mapping(&upload(), &mapping);
        assert_eq!(mapped.headers, vec!["account_id", "plan_tier", "region"]);
        assert_eq!(mapped.column_values("account_id").unwrap(), vec!["A1", "A2"]);
        assert_eq!(mapped.column_values("region").unwrap(), vec!["EMEA", "NA"]);
    }

    #[test]
    fn skips_empty_and_absent_mappings() {
        let mut mapping = FieldMapping::new();
        mapping.set(Field::AccountId, "cust");
        mapping.set(Field::PlanTier, "");
        mapping.set(Field::SeatsCurrent, "no_such_column");

        let mapped = apply_mapping(&upload(), &mapping);
        assert_eq!(mapped.column_index("plan_tier"), None);
        assert_eq!(mapped.column_index("seats_current"), None);
        // unmapped user columns survive untouched
        assert!(mapped.column_index("tier").is_some());
        assert!(mapped.column_index("region").is_some());
    }

    #[test]
    fn colliding_passthrough_column_is_dropped() {
        let mut table = RawTable::new(vec!["cust".to_string(), "account_id".to_string()]);
        table.push_row(vec!["A1".to_string(), "stale".to_string()]);
        let mut mapping = FieldMapping::new();
        mapping.set(Field::AccountId, "cust");

        let mapped = apply_mapping(&table, &mapping);
        // the mapped column wins; no duplicate header survives
        assert_eq!(mapped.headers, vec!["account_id"]);
        assert_eq!(mapped.column_values("account_id").unwrap(), vec!["A1"]);
    }

    #[test]
    fn is_deterministic() {
        let mut mapping = FieldMapping::new();
        mapping.set(Field::AccountId, "cust");
        let table = upload();
        assert_eq!(
            apply_mapping(&table, &mapping),
            apply_mapping(&table, &mapping)
        );
    }
}
