//! Rectangular string table as uploaded by a user.

/// An untyped rectangular table of named columns.
///
/// Cells are stored as trimmed strings; the empty string is the missing
/// sentinel. No invariants are placed on column names or cell contents —
/// typing happens later in validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Number of data rows.
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.headers.len());
        self.rows.push(row);
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// All values of a column in row order, if the column exists.
    pub fn column_values(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }

    /// Cell value at (row, column name); empty string when out of range.
    pub fn cell(&self, row: usize, name: &str) -> &str {
        self.column_index(name)
            .and_then(|idx| self.rows.get(row).and_then(|r| r.get(idx)))
            .map(String::as_str)
            .unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawTable {
        let mut table = RawTable::new(vec!["cust".to_string(), "seats".to_string()]);
        table.push_row(vec!["A1".to_string(), "10".to_string()]);
        table.push_row(vec!["A2".to_string(), "".to_string()]);
        table
    }

    #[test]
    fn shape_and_lookup() {
        let table = sample();
        assert_eq!(table.height(), 2);
        assert_eq!(table.width(), 2);
        assert_eq!(table.column_index("seats"), Some(1));
        assert_eq!(table.column_index("missing"), None);
        assert_eq!(table.column_values("cust").unwrap(), vec!["A1", "A2"]);
        assert_eq!(table.cell(1, "seats"), "");
        assert_eq!(table.cell(9, "seats"), "");
    }
}
