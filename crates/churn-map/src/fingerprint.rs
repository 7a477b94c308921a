//! Cheap content signature for repeat-submission detection.

use churn_model::{FieldMapping, RawTable};
use sha2::Digest;

/// Fingerprint an uploaded table.
///
/// Built from shape, the ordered column names, and the first-5/last-5
/// `account_id` values when that column exists. The signature detects
/// "same file" re-submission without hashing every cell; the digest is
/// sha256 of it, hex-encoded.
pub fn fingerprint(table: &RawTable) -> String {
    let columns = table.headers.join("|");
    let mut boundary_ids = String::new();
    if let Some(ids) = table.column_values("account_id") {
        let head: Vec<&str> = ids.iter().take(5).copied().collect();
        let tail: Vec<&str> = ids.iter().rev().take(5).rev().copied().collect();
        boundary_ids = format!("{}|{}", head.join("|"), tail.join("|"));
    }
    let signature = format!(
        "{}x{}::{columns}::{boundary_ids}",
        table.height(),
        table.width()
    );
    let digest = sha2::Sha256::digest(signature.as_bytes());
    hex::encode(digest)
}

/// Cache key for one (content, mapping) pair.
///
/// Identical fingerprint and identical confirmed mapping produce an
/// identical key, so downstream filtering/sorting never re-triggers
/// scoring.
pub fn cache_key(table: &RawTable, mapping: &FieldMapping) -> String {
    format!("{}::{}", fingerprint(table), mapping.cache_token())
}

#[cfg(test)]
mod tests {
    use churn_model::Field;

    use super::*;

    fn table_with_ids(ids: &[&str]) -> RawTable {
        let mut table = RawTable::new(vec!["account_id".to_string(), "seats".to_string()]);
        for id in ids {
            table.push_row(vec![id.to_string(), "1".to_string()]);
        }
        table
    }

    #[test]
    fn identical_content_collides() {
        let a = table_with_ids(&["A1", "A2", "A3"]);
        let b = table_with_ids(&["A1", "A2", "A3"]);
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn boundary_ids_matter() {
        let a = table_with_ids(&["A1", "A2", "A3"]);
        let b = table_with_ids(&["A1", "A2", "B9"]);
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn shape_and_columns_matter() {
        let a = table_with_ids(&["A1"]);
        let mut b = table_with_ids(&["A1"]);
        b.headers[1] = "licenses".to_string();
        assert_ne!(fingerprint(&a), fingerprint(&b));

        let mut c = table_with_ids(&["A1"]);
        c.push_row(vec!["A2".to_string(), "1".to_string()]);
        assert_ne!(fingerprint(&a), fingerprint(&c));
    }

    #[test]
    fn middle_rows_are_not_inspected() {
        // 12 rows: row 6 differs, boundary ids identical
        let mut a = table_with_ids(&["A1"; 12]);
        let mut b = table_with_ids(&["A1"; 12]);
        a.rows[6][0] = "X".to_string();
        b.rows[6][0] = "Y".to_string();
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn cache_key_includes_mapping_choice() {
        let table = table_with_ids(&["A1"]);
        let mut mapping_a = FieldMapping::new();
        mapping_a.set(Field::AccountId, "account_id");
        let mut mapping_b = FieldMapping::new();
        mapping_b.set(Field::AccountId, "seats");
        assert_ne!(cache_key(&table, &mapping_a), cache_key(&table, &mapping_b));
        assert_eq!(cache_key(&table, &mapping_a), cache_key(&table, &mapping_a));
    }
}
