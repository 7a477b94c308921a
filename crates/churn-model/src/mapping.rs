//! Mapping from canonical fields to user column names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::field::Field;
use crate::table::RawTable;

/// Mapping of canonical field -> user column name.
///
/// Entries with empty column names count as unmapped; the validator is
/// responsible for flagging required fields left unmapped. Serializes as a
/// flat JSON object keyed by wire names, e.g.
/// `{"account_id": "cust", "plan_tier": "tier"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    entries: BTreeMap<Field, String>,
}

impl FieldMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, field: Field, user_column: impl Into<String>) {
        self.entries.insert(field, user_column.into());
    }

    /// The mapped user column for a field, treating empty entries as unmapped.
    pub fn user_column(&self, field: Field) -> Option<&str> {
        self.entries
            .get(&field)
            .map(String::as_str)
            .filter(|column| !column.is_empty())
    }

    /// Non-empty mapping entries in canonical field order.
    pub fn mapped_entries(&self) -> impl Iterator<Item = (Field, &str)> {
        self.entries
            .iter()
            .filter(|(_, column)| !column.is_empty())
            .map(|(field, column)| (*field, column.as_str()))
    }

    /// User columns consumed by this mapping.
    pub fn used_columns(&self) -> Vec<&str> {
        self.mapped_entries().map(|(_, column)| column).collect()
    }

    /// Guess a mapping by case-insensitive exact match of header names
    /// against canonical wire names. Intended as a starting point for a
    /// mapping UI, and as the identity mapping for canonical tables.
    pub fn guess(table: &RawTable) -> Self {
        let mut mapping = Self::new();
        for field in Field::all() {
            let wire = field.wire_name();
            if let Some(header) = table
                .headers
                .iter()
                .find(|header| header.eq_ignore_ascii_case(wire))
            {
                mapping.set(field, header.clone());
            }
        }
        mapping
    }

    /// Canonical serialization of the confirmed mapping, used as the
    /// mapping half of a cache key. Sorted, non-empty entries only.
    pub fn cache_token(&self) -> String {
        let parts: Vec<String> = self
            .mapped_entries()
            .map(|(field, column)| format!("{}={column}", field.wire_name()))
            .collect();
        parts.join("|")
    }
}
