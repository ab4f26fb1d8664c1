use std::path::Path;

use kasboek_core::{KasboekError, Result};
use serde::{Deserialize, Serialize};

/// How a statement export is encoded on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    Spreadsheet,
    Delimited,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xls" => Ok(FileKind::Spreadsheet),
            "csv" => Ok(FileKind::Delimited),
            _ => Err(KasboekError::UnsupportedFormat(format!(
                "unsupported file extension: .{ext} (only Excel and CSV files are supported)"
            ))),
        }
    }
}

/// Raw tabular dataset: one header row, every cell kept as text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Every cell of a column; short rows read as empty strings.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(idx).map(String::as_str).unwrap_or(""))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_kind_from_extension() {
        assert_eq!(FileKind::from_path(Path::new("a.XLSX")).unwrap(), FileKind::Spreadsheet);
        assert_eq!(FileKind::from_path(Path::new("a.xls")).unwrap(), FileKind::Spreadsheet);
        assert_eq!(FileKind::from_path(Path::new("dir/a.csv")).unwrap(), FileKind::Delimited);
        assert!(matches!(
            FileKind::from_path(Path::new("a.pdf")),
            Err(KasboekError::UnsupportedFormat(_))
        ));
        assert!(FileKind::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn test_ragged_rows_read_as_empty() {
        let table = RawTable::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into(), "2".into()], vec!["3".into()]],
        );
        assert_eq!(table.column("b").unwrap(), vec!["2", ""]);
        assert!(table.column("c").is_none());
    }
}
