//! Delimited file loading.

use std::io::Read;
use std::path::Path;

use churn_model::RawTable;
use tracing::debug;

use crate::error::{IngestError, Result};

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn delimiter_for(path: &Path) -> u8 {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}

/// Load a delimited file into a [`RawTable`].
///
/// The delimiter is taken from the extension (`.tsv` is tab-separated,
/// everything else comma-separated). Headers and cells are trimmed and
/// BOM-stripped; short records are padded with empty cells so the table
/// stays rectangular.
pub fn read_table(path: &Path) -> Result<RawTable> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = std::fs::File::open(path).map_err(|source| IngestError::FileAccess {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_with_delimiter(file, delimiter_for(path), path)?;
    debug!(
        rows = table.height(),
        columns = table.width(),
        path = %path.display(),
        "loaded upload table"
    );
    Ok(table)
}

/// Load comma-separated data from any reader. Mostly for tests.
pub fn read_table_from_reader<R: Read>(reader: R) -> Result<RawTable> {
    read_with_delimiter(reader, b',', Path::new("<reader>"))
}

fn read_with_delimiter<R: Read>(reader: R, delimiter: u8, path: &Path) -> Result<RawTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|source| IngestError::Parse {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    if headers.is_empty() {
        return Err(IngestError::EmptyTable {
            path: path.to_path_buf(),
        });
    }

    let mut table = RawTable::new(headers.iter().map(normalize_header).collect());
    for record in csv_reader.records() {
        let record = record.map_err(|source| IngestError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let mut row: Vec<String> = record.iter().map(normalize_cell).collect();
        row.resize(table.width(), String::new());
        table.push_row(row);
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_trimmed_rectangular_table() {
        let data = "cust , tier\n A1 ,Pro\nA2\n";
        let table = read_table_from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.headers, vec!["cust", "tier"]);
        assert_eq!(table.rows[0], vec!["A1", "Pro"]);
        // short record padded to table width
        assert_eq!(table.rows[1], vec!["A2", ""]);
    }

    #[test]
    fn strips_bom_from_first_header() {
        let data = "\u{feff}cust,tier\nA1,Pro\n";
        let table = read_table_from_reader(data.as_bytes()).unwrap();
        assert_eq!(table.headers[0], "cust");
    }

    #[test]
    fn missing_file_is_a_distinct_error() {
        let err = read_table(Path::new("/no/such/upload.csv")).unwrap_err();
        assert!(matches!(err, IngestError::FileNotFound { .. }));
    }

    #[test]
    fn tsv_extension_switches_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.tsv");
        std::fs::write(&path, "cust\ttier\nA1\tPro\n").unwrap();
        let table = read_table(&path).unwrap();
        assert_eq!(table.headers, vec!["cust", "tier"]);
        assert_eq!(table.rows[0], vec!["A1", "Pro"]);
    }
}
