//! FDM extractor - consolidates FDM tax-assessment forms into one workbook
//!
//! Each input workbook is read with a fixed field catalog (static cells,
//! keyword scans and an anchor-relative block), and the results are written
//! to a new workbook with two sheets:
//!
//! - **Results**: one row per file; extracted values as literals, every
//!   derived figure as a formula
//! - **Summary**: two editable scenario parameters and sector aggregates of
//!   the simulated 2026 tax
//!
//! # Example
//!
//! ```no_run
//! use fdm_extractor::batch::{BatchProcessor, FileJob};
//! use fdm_extractor::config::Config;
//! use fdm_extractor::excel::{deliver, OutputComposer};
//! use std::path::Path;
//!
//! let config = Config::default();
//! let jobs = vec![FileJob::new("FDM_PT_Sawit.xlsx")];
//!
//! let outcome = BatchProcessor::new(&config)?.run(jobs, |_| {})?;
//! let output = OutputComposer::new(&config)?.compose(outcome.require_records()?)?;
//! let path = deliver(output, Path::new("."), &config.output.file_prefix, chrono::Local::now())?;
//! println!("{}", path.display());
//! # Ok::<(), fdm_extractor::error::FdmError>(())
//! ```

pub mod batch;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod excel;
pub mod types;

// Re-export commonly used types
pub use catalog::{Column, FieldDefinition, FIELD_CATALOG};
pub use config::Config;
pub use error::{FdmError, FdmResult};
pub use types::{ExtractedRecord, FieldValue, Missing};
