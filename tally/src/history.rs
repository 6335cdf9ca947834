//! History Ledger
//!
//! Successful calculations in the order they happened, persisted as CSV with
//! the header `operation,operands,result`. Operands are stored as one field,
//! space separated.
//!
//! Two older layouts still load: `operation,num1,num2,result` for binary
//! calculations and `operation,numbers,result` with comma-joined numbers.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Column order of the saved file
pub const COLUMNS: [&str; 3] = ["operation", "operands", "result"];

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history index {index} is out of range (history has {len} records)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("history file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot access history file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed history file {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("history file {} has no '{column}' column", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// One successful calculation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub operation: String,
    pub operands: Vec<String>,
    pub result: String,
}

impl HistoryRecord {
    pub fn new(operation: impl Into<String>, operands: Vec<String>, result: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            operands,
            result: result.into(),
        }
    }

    /// Operands as stored in the `operands` column
    pub fn operands_text(&self) -> String {
        self.operands.join(" ")
    }
}

impl fmt::Display for HistoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) = {}", self.operation, self.operands.join(", "), self.result)
    }
}

/// Where each field lives in a loaded file
struct Layout {
    operation: usize,
    result: usize,
    operands: Option<usize>,
    numbers: Option<usize>,
    pair: Option<(usize, usize)>,
}

impl Layout {
    fn detect(path: &Path, headers: &csv::StringRecord) -> Result<Self, HistoryError> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |column: &'static str| {
            find(column).ok_or_else(|| HistoryError::MissingColumn {
                path: path.to_path_buf(),
                column,
            })
        };

        let layout = Self {
            operation: require("operation")?,
            result: require("result")?,
            operands: find("operands"),
            numbers: find("numbers"),
            pair: find("num1").zip(find("num2")),
        };

        if layout.operands.is_none() && layout.numbers.is_none() && layout.pair.is_none() {
            return Err(HistoryError::MissingColumn {
                path: path.to_path_buf(),
                column: "operands",
            });
        }
        Ok(layout)
    }

    fn operands(&self, row: &csv::StringRecord) -> Vec<String> {
        let field = |i: usize| row.get(i).unwrap_or("").trim();

        if let Some(i) = self.operands {
            return field(i).split_whitespace().map(str::to_string).collect();
        }
        if let Some(i) = self.numbers {
            let numbers = field(i);
            if !numbers.is_empty() {
                return numbers
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            }
        }
        match self.pair {
            Some((a, b)) => [field(a), field(b)]
                .into_iter()
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        }
    }

    fn record(&self, row: &csv::StringRecord) -> HistoryRecord {
        HistoryRecord {
            operation: row.get(self.operation).unwrap_or("").trim().to_string(),
            operands: self.operands(row),
            result: row.get(self.result).unwrap_or("").trim().to_string(),
        }
    }
}

/// Ordered list of calculation records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    records: Vec<HistoryRecord>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: HistoryRecord) {
        self.records.push(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Remove the record at `index` (0-based)
    pub fn remove(&mut self, index: usize) -> Result<HistoryRecord, HistoryError> {
        if index >= self.records.len() {
            return Err(HistoryError::IndexOutOfRange {
                index,
                len: self.records.len(),
            });
        }
        Ok(self.records.remove(index))
    }

    pub fn latest(&self) -> Option<&HistoryRecord> {
        self.records.last()
    }

    pub fn filter_by_operation<'a>(&'a self, operation: &'a str) -> impl Iterator<Item = (usize, &'a HistoryRecord)> + 'a {
        self.records
            .iter()
            .enumerate()
            .filter(move |(_, r)| r.operation == operation)
    }

    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write every record to `path`, creating parent directories
    pub fn save_csv(&self, path: &Path) -> Result<(), HistoryError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| HistoryError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let csv_err = |source| HistoryError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
        writer.write_record(COLUMNS).map_err(csv_err)?;
        for record in &self.records {
            writer
                .write_record([
                    record.operation.as_str(),
                    record.operands_text().as_str(),
                    record.result.as_str(),
                ])
                .map_err(csv_err)?;
        }
        writer.flush().map_err(|source| HistoryError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!(path = %path.display(), records = self.records.len(), "history saved");
        Ok(())
    }

    /// Read a history file written by [`History::save_csv`] or in a legacy layout
    pub fn load_csv(path: &Path) -> Result<Self, HistoryError> {
        if !path.exists() {
            return Err(HistoryError::NotFound(path.to_path_buf()));
        }

        let csv_err = |source| HistoryError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(csv_err)?;

        let headers = reader.headers().map_err(csv_err)?.clone();
        let layout = Layout::detect(path, &headers)?;
        debug!(path = %path.display(), columns = ?headers, "reading history");

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(csv_err)?;
            records.push(layout.record(&row));
        }

        info!(path = %path.display(), records = records.len(), "history loaded");
        Ok(Self { records })
    }

    /// Replace the in-memory records with the contents of `path`
    pub fn replace_from_csv(&mut self, path: &Path) -> Result<usize, HistoryError> {
        *self = Self::load_csv(path)?;
        Ok(self.records.len())
    }

    /// Plain-text table for display
    pub fn render(&self) -> String {
        render_rows(self.records.iter().enumerate())
    }
}

/// Render `(index, record)` rows as an aligned table
pub fn render_rows<'a>(rows: impl Iterator<Item = (usize, &'a HistoryRecord)>) -> String {
    let rows: Vec<[String; 4]> = rows
        .map(|(i, r)| [i.to_string(), r.operation.clone(), r.operands_text(), r.result.clone()])
        .collect();
    if rows.is_empty() {
        return "(no history)".to_string();
    }

    let header = ["#", "operation", "operands", "result"];
    let mut widths = header.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let line = |cells: [&str; 4]| {
        let padded: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{:<w$}", cell, w = w))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut out = line(header);
    for row in &rows {
        out.push('\n');
        out.push_str(&line([&row[0], &row[1], &row[2], &row[3]]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(op: &str, operands: &[&str], result: &str) -> HistoryRecord {
        HistoryRecord::new(op, operands.iter().map(|s| s.to_string()).collect(), result)
    }

    fn sample() -> History {
        let mut history = History::new();
        history.push(record("add", &["10", "5"], "15"));
        history.push(record("mean", &["1", "2", "3", "4"], "2.5"));
        history.push(record("add", &["-1", "1"], "0"));
        history
    }

    #[test]
    fn test_push_latest_and_len() {
        let history = sample();
        assert_eq!(history.len(), 3);
        assert_eq!(history.latest().unwrap().result, "0");
    }

    #[test]
    fn test_remove() {
        let mut history = sample();
        let removed = history.remove(1).unwrap();
        assert_eq!(removed.operation, "mean");
        assert_eq!(history.len(), 2);

        let err = history.remove(2).unwrap_err();
        assert!(matches!(err, HistoryError::IndexOutOfRange { index: 2, len: 2 }));
    }

    #[test]
    fn test_filter_keeps_original_indices() {
        let history = sample();
        let indices: Vec<usize> = history.filter_by_operation("add").map(|(i, _)| i).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(history.filter_by_operation("mode").count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut history = sample();
        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.render(), "(no history)");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/data/calculations.csv");

        let history = sample();
        history.save_csv(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("operation,operands,result\n"));
        assert!(text.contains("mean,1 2 3 4,2.5"));

        assert_eq!(History::load_csv(&path).unwrap(), history);
    }

    #[test]
    fn test_save_empty_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        History::new().save_csv(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap().trim_end(), "operation,operands,result");
        assert!(History::load_csv(&path).unwrap().is_empty());
    }

    #[test]
    fn test_load_binary_legacy_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.csv");
        fs::write(&path, "operation,num1,num2,result\nadd,10,5,15\ndivide,1,8,0.125\n").unwrap();

        let history = History::load_csv(&path).unwrap();
        assert_eq!(history.records()[0], record("add", &["10", "5"], "15"));
        assert_eq!(history.records()[1], record("divide", &["1", "8"], "0.125"));
    }

    #[test]
    fn test_load_numbers_legacy_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.csv");
        fs::write(&path, "operation,numbers,result\nmean,\"10, 20, 30\",20\n").unwrap();

        let history = History::load_csv(&path).unwrap();
        assert_eq!(history.records(), &[record("mean", &["10", "20", "30"], "20")]);
    }

    #[test]
    fn test_load_mixed_legacy_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.csv");
        fs::write(
            &path,
            "operation,num1,num2,result,numbers\nadd,1,2,3,\nmode,,,4,\"4,4,1\"\n",
        )
        .unwrap();

        let history = History::load_csv(&path).unwrap();
        assert_eq!(history.records()[0].operands, vec!["1", "2"]);
        assert_eq!(history.records()[1].operands, vec!["4", "4", "1"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = History::load_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, HistoryError::NotFound(_)));
    }

    #[test]
    fn test_load_unknown_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("odd.csv");
        fs::write(&path, "operation,value\nadd,1\n").unwrap();

        let err = History::load_csv(&path).unwrap_err();
        assert!(matches!(err, HistoryError::MissingColumn { column: "result", .. }));
    }

    #[test]
    fn test_replace_from_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("h.csv");
        sample().save_csv(&path).unwrap();

        let mut history = History::new();
        history.push(record("multiply", &["2", "3"], "6"));
        assert_eq!(history.replace_from_csv(&path).unwrap(), 3);
        assert_eq!(history, sample());
    }

    #[test]
    fn test_render_table() {
        let table = sample().render();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("#  operation"));
        assert!(lines[2].contains("1 2 3 4"));
    }

    #[test]
    fn test_record_display() {
        assert_eq!(record("add", &["10", "5"], "15").to_string(), "add(10, 5) = 15");
    }
}
