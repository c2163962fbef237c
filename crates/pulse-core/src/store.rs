//! Storage for the tables handed from one stage to the next
//!
//! Stages never touch paths directly. They read and write named tables in a
//! [`DataArea`] through the [`TableStore`] trait, which keeps them testable
//! without a filesystem.

use crate::error::{PipelineError, Result};
use crate::table::Table;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix of price tables, prefixed by the ticker
pub const STOCK_FILE_SUFFIX: &str = "_stock_data.csv";

/// Suffix of news tables, prefixed by the company name
pub const NEWS_FILE_SUFFIX: &str = "_news.csv";

/// File name of a ticker's price table
pub fn stock_file_name(ticker: &str) -> String {
    format!("{ticker}{STOCK_FILE_SUFFIX}")
}

/// File name of a company's news table
pub fn news_file_name(company: &str) -> String {
    format!("{company}{NEWS_FILE_SUFFIX}")
}

/// Logical location of a table within the data root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataArea {
    /// Collector output
    Raw,
    /// Preprocessor output
    Processed,
    /// Sentiment scorer output
    ProcessedWithSentiment,
    /// Evaluator output
    Evaluation,
}

impl DataArea {
    /// All areas in pipeline order
    pub const ALL: [DataArea; 4] = [
        DataArea::Raw,
        DataArea::Processed,
        DataArea::ProcessedWithSentiment,
        DataArea::Evaluation,
    ];

    /// Directory name under the data root
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Processed => "processed",
            Self::ProcessedWithSentiment => "processed_with_sentiment",
            Self::Evaluation => "evaluation",
        }
    }
}

impl fmt::Display for DataArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Read/write access to named tables
pub trait TableStore: Send + Sync {
    /// Load a table; `MissingFile` when it does not exist
    fn read(&self, area: DataArea, name: &str) -> Result<Table>;

    /// Persist a table, replacing any previous content
    fn write(&self, area: DataArea, name: &str, table: &Table) -> Result<()>;

    /// Check whether a table exists
    fn exists(&self, area: DataArea, name: &str) -> bool;

    /// Names of all tables in an area, sorted; empty when the area is absent
    fn list(&self, area: DataArea) -> Result<Vec<String>>;

    /// Human readable location, used in log lines
    fn location(&self, area: DataArea, name: &str) -> String {
        format!("{}/{name}", area.dir_name())
    }
}

/// Tables stored as CSV files under a root directory
#[derive(Debug, Clone)]
pub struct FsTableStore {
    root: PathBuf,
}

impl FsTableStore {
    /// Create a store rooted at `root` (e.g. `data/`)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a table
    pub fn path_of(&self, area: DataArea, name: &str) -> PathBuf {
        self.root.join(area.dir_name()).join(name)
    }
}

impl TableStore for FsTableStore {
    fn read(&self, area: DataArea, name: &str) -> Result<Table> {
        let path = self.path_of(area, name);
        if !path.exists() {
            return Err(PipelineError::MissingFile(path.display().to_string()));
        }
        let file = fs::File::open(&path)?;
        Table::from_reader(file)
    }

    fn write(&self, area: DataArea, name: &str, table: &Table) -> Result<()> {
        let path = self.path_of(area, name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = fs::File::create(&path)?;
        table.write_to(file)
    }

    fn exists(&self, area: DataArea, name: &str) -> bool {
        self.path_of(area, name).is_file()
    }

    fn list(&self, area: DataArea) -> Result<Vec<String>> {
        let dir = self.root.join(area.dir_name());
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    fn location(&self, area: DataArea, name: &str) -> String {
        self.path_of(area, name).display().to_string()
    }
}

/// Tables kept in memory as CSV text
///
/// Tables are serialized on write and parsed on read, so a stage sees exactly
/// what it would see through [`FsTableStore`].
#[derive(Debug, Default)]
pub struct MemoryTableStore {
    tables: RwLock<BTreeMap<(DataArea, String), String>>,
}

impl MemoryTableStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table from raw CSV text
    pub fn insert_csv(&self, area: DataArea, name: impl Into<String>, csv: impl Into<String>) {
        self.tables.write().insert((area, name.into()), csv.into());
    }

    /// Raw CSV text of a stored table
    pub fn csv(&self, area: DataArea, name: &str) -> Option<String> {
        self.tables.read().get(&(area, name.to_string())).cloned()
    }

    /// Number of stored tables across all areas
    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.tables.read().is_empty()
    }
}

impl TableStore for MemoryTableStore {
    fn read(&self, area: DataArea, name: &str) -> Result<Table> {
        let content = self
            .csv(area, name)
            .ok_or_else(|| PipelineError::MissingFile(self.location(area, name)))?;
        Table::from_csv_str(&content)
    }

    fn write(&self, area: DataArea, name: &str, table: &Table) -> Result<()> {
        let content = table.to_csv_string()?;
        self.insert_csv(area, name, content);
        Ok(())
    }

    fn exists(&self, area: DataArea, name: &str) -> bool {
        self.tables.read().contains_key(&(area, name.to_string()))
    }

    fn list(&self, area: DataArea) -> Result<Vec<String>> {
        Ok(self
            .tables
            .read()
            .keys()
            .filter(|(a, _)| *a == area)
            .map(|(_, name)| name.clone())
            .collect())
    }
}
