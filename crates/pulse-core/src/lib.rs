//! Core types for pulse-rs
//!
//! This crate defines what the pipeline stages exchange: the [`Table`] handed
//! between stages, the [`TableStore`] it is persisted through, the typed
//! records decoded from it, the run configuration and the error taxonomy.

pub mod config;
pub mod dates;
pub mod error;
pub mod records;
pub mod stage;
pub mod store;
pub mod table;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use records::{ArticleRecord, Company, MergedRecord, PriceRecord};
pub use stage::{Stage, StageReport};
pub use store::{DataArea, FsTableStore, MemoryTableStore, TableStore};
pub use table::Table;
