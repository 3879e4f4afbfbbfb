//! Workbook reading and writing
//!
//! - Read: source FDM forms (.xlsx / .xlsm) via calamine, sheet resolution,
//!   bounded scans and per-file extraction
//! - Write: the consolidated Results + Summary workbook via rust_xlsxwriter,
//!   with generated formulas checked before they are written

pub mod address;
mod composer;
pub mod delivery;
mod extractor;
pub mod formula_check;
pub mod formulas;
mod source;

pub use composer::{OutputComposer, OutputWorkbook};
pub use delivery::{deliver, is_output_file_name, output_file_name};
pub use extractor::FileExtractor;
pub use formula_check::{check_formula, FormulaChecker};
pub use formulas::{FormulaBuilder, RESULTS_SHEET, SUMMARY_SHEET};
pub use source::{cell_number, cell_text, Sheet, SourceWorkbook};
