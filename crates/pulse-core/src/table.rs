//! In-memory tabular data exchanged between pipeline stages
//!
//! A [`Table`] is an ordered header plus rows of string cells, read from and
//! written to CSV. A cell counts as missing when it is empty or holds one of
//! the usual "not available" markers, so tables written by other tools
//! (`NaN`, `null`, `N/A`, ...) round-trip the same way as our own output.

use crate::error::{PipelineError, Result};
use std::io::{Read, Write};

/// Cell values treated as missing in addition to the empty string
const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Returns true when a cell should be treated as a missing value
pub fn is_missing(cell: &str) -> bool {
    let trimmed = cell.trim();
    trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed)
}

/// Rectangular table of string cells with named columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create an empty table with the given column names
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; its width must match the header
    pub fn push_row(&mut self, row: Vec<String>) -> Result<()> {
        if row.len() != self.headers.len() {
            return Err(PipelineError::Other(format!(
                "Row has {} cells but table has {} columns",
                row.len(),
                self.headers.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Column names in order
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// All rows in order
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the table has no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Check if a column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Position of a column, or `MissingColumn` naming the table
    pub fn require_column(&self, name: &str, table_name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| PipelineError::missing_column(name, table_name))
    }

    /// Rename a column; returns false if `from` does not exist
    ///
    /// Renaming onto an existing name is refused so a table never ends up
    /// with duplicate headers.
    pub fn rename_column(&mut self, from: &str, to: &str) -> bool {
        if from == to {
            return self.has_column(from);
        }
        if self.has_column(to) {
            return false;
        }
        match self.column_index(from) {
            Some(idx) => {
                self.headers[idx] = to.to_string();
                true
            }
            None => false,
        }
    }

    /// Drop every row containing a missing cell, returning how many were removed
    pub fn drop_incomplete_rows(&mut self) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !row.iter().any(|cell| is_missing(cell)));
        before - self.rows.len()
    }

    /// Replace a column's values, appending the column if it is new
    pub fn set_column(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        if values.len() != self.rows.len() {
            return Err(PipelineError::Other(format!(
                "Column '{name}' has {} values but table has {} rows",
                values.len(),
                self.rows.len()
            )));
        }

        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }

    /// Cell value at `row` in column `idx`, or `None` when missing
    pub fn cell(&self, row: usize, idx: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(idx))
            .map(String::as_str)
            .filter(|c| !is_missing(c))
    }

    /// Values of a column with missing cells mapped to `None`
    pub fn column(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let idx = self.column_index(name)?;
        Some(
            self.rows
                .iter()
                .map(|row| Some(row[idx].as_str()).filter(|c| !is_missing(c)))
                .collect(),
        )
    }

    /// Parse a table from CSV with a header row
    ///
    /// Short rows are padded with empty cells and long rows are truncated so
    /// the table stays rectangular.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(ToString::to_string).collect();
        let width = headers.len();
        let mut rows = Vec::new();
        let mut ragged = 0usize;

        for record in rdr.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(ToString::to_string).collect();
            if row.len() != width {
                ragged += 1;
                row.resize(width, String::new());
            }
            rows.push(row);
        }

        if ragged > 0 {
            tracing::warn!("Normalized {ragged} ragged CSV rows to {width} columns");
        }

        Ok(Self { headers, rows })
    }

    /// Parse a table from a CSV string
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_reader(content.as_bytes())
    }

    /// Write the table as CSV with `\n` line endings
    pub fn write_to<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);

        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Render the table as a CSV string
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        String::from_utf8(buf).map_err(|e| PipelineError::Other(format!("CSV is not UTF-8: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_csv_str(
            "Date,Open,Close\n\
             2024-01-01,1.0,2.0\n\
             2024-01-02,,3.0\n\
             2024-01-03,NaN,4.0\n\
             2024-01-04,5.0,6.0\n",
        )
        .unwrap()
    }

    #[test]
    fn test_parse_and_shape() {
        let table = sample();
        assert_eq!(table.headers(), &["Date", "Open", "Close"]);
        assert_eq!(table.len(), 4);
        assert!(table.has_column("Close"));
        assert!(!table.has_column("Volume"));
    }

    #[test]
    fn test_drop_incomplete_rows() {
        let mut table = sample();
        let dropped = table.drop_incomplete_rows();
        assert_eq!(dropped, 2);
        assert_eq!(table.len(), 2);
        assert!(table.rows().iter().flatten().all(|c| !is_missing(c)));
    }

    #[test]
    fn test_rename_column() {
        let mut table = sample();
        assert!(table.rename_column("Date", "date"));
        assert!(table.has_column("date"));
        assert!(!table.rename_column("Missing", "x"));
        // refuses to create duplicate headers
        assert!(!table.rename_column("Open", "Close"));
    }

    #[test]
    fn test_set_column_appends_and_replaces() {
        let mut table = sample();
        table
            .set_column("flag", vec!["a".into(), "b".into(), "c".into(), "d".into()])
            .unwrap();
        assert_eq!(table.headers().last().map(String::as_str), Some("flag"));

        table
            .set_column("flag", vec!["w".into(), "x".into(), "y".into(), "z".into()])
            .unwrap();
        assert_eq!(table.headers().len(), 4);
        let idx = table.column_index("flag").unwrap();
        assert_eq!(table.cell(3, idx), Some("z"));

        assert!(table.set_column("bad", vec!["only-one".into()]).is_err());
    }

    #[test]
    fn test_missing_cells_and_column_view() {
        let table = sample();
        let open = table.column("Open").unwrap();
        assert_eq!(open, vec![Some("1.0"), None, None, Some("5.0")]);
        assert!(table.column("Volume").is_none());
    }

    #[test]
    fn test_ragged_rows_are_padded() {
        let table = Table::from_csv_str("a,b,c\n1,2\n4,5,6\n").unwrap();
        assert_eq!(table.rows()[0], vec!["1", "2", ""]);
    }

    #[test]
    fn test_csv_output_is_stable() {
        let mut table = Table::new(["date", "text"]);
        table
            .push_row(vec!["2024-01-01".into(), "hello, world".into()])
            .unwrap();
        let csv = table.to_csv_string().unwrap();
        assert_eq!(csv, "date,text\n2024-01-01,\"hello, world\"\n");

        let reparsed = Table::from_csv_str(&csv).unwrap();
        assert_eq!(reparsed, table);
    }

    #[test]
    fn test_require_column_error() {
        let table = sample();
        let err = table.require_column("description", "raw/Apple_news.csv").unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { .. }));
    }
}
